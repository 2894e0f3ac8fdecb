/// Decrementing h/m/s counter behind the promo countdown.
///
/// Ticks borrow from minutes, then hours, and saturate at `0h 0m 0s`.
use std::fmt;

pub const DEFAULT_HOURS: u32 = 10;
pub const DEFAULT_MINUTES: u8 = 4;
pub const DEFAULT_SECONDS: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
  hours: u32,
  minutes: u8,
  seconds: u8,
}

impl Default for Clock {
  fn default() -> Self {
    Self { hours: DEFAULT_HOURS, minutes: DEFAULT_MINUTES, seconds: DEFAULT_SECONDS }
  }
}

impl Clock {
  /// Returns `None` when minutes or seconds are out of 0..60.
  pub fn new(hours: u32, minutes: u8, seconds: u8) -> Option<Self> {
    if minutes > 59 || seconds > 59 {
      return None;
    }
    Some(Self { hours, minutes, seconds })
  }

  /// One second down. Returns false (and leaves the clock alone) once exhausted.
  pub fn tick(&mut self) -> bool {
    if self.seconds > 0 {
      self.seconds -= 1;
    } else if self.minutes > 0 {
      self.minutes -= 1;
      self.seconds = 59;
    } else if self.hours > 0 {
      self.hours -= 1;
      self.minutes = 59;
      self.seconds = 59;
    } else {
      return false;
    }
    true
  }

  pub fn is_exhausted(&self) -> bool {
    self.hours == 0 && self.minutes == 0 && self.seconds == 0
  }

  pub fn total_seconds(&self) -> u64 {
    self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64
  }

  pub fn is_low_time(&self, threshold_minutes: u32) -> bool {
    self.hours == 0 && (self.minutes as u32) < threshold_minutes
  }

  pub fn format(&self) -> String {
    self.to_string()
  }
}

impl fmt::Display for Clock {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_clock() {
    let clock = Clock::default();
    assert_eq!(clock.format(), "10h 4m 0s");
  }

  #[test]
  fn test_new_rejects_out_of_range() {
    assert!(Clock::new(1, 60, 0).is_none());
    assert!(Clock::new(1, 0, 60).is_none());
    assert!(Clock::new(0, 59, 59).is_some());
  }

  #[test]
  fn test_format_no_padding() {
    assert_eq!(Clock::new(9, 4, 0).unwrap().format(), "9h 4m 0s");
    assert_eq!(Clock::new(9, 59, 59).unwrap().format(), "9h 59m 59s");
  }

  #[test]
  fn test_tick_seconds() {
    let mut clock = Clock::new(0, 1, 5).unwrap();
    assert!(clock.tick());
    assert_eq!(clock, Clock::new(0, 1, 4).unwrap());
  }

  #[test]
  fn test_tick_borrows_minutes() {
    let mut clock = Clock::new(1, 1, 0).unwrap();
    clock.tick();
    assert_eq!(clock, Clock::new(1, 0, 59).unwrap());
  }

  #[test]
  fn test_tick_borrows_hours() {
    let mut clock = Clock::new(10, 0, 0).unwrap();
    clock.tick();
    assert_eq!(clock.format(), "9h 59m 59s");
  }

  #[test]
  fn test_tick_saturates_at_zero() {
    let mut clock = Clock::new(0, 0, 1).unwrap();
    assert!(clock.tick());
    assert!(clock.is_exhausted());
    assert!(!clock.tick());
    assert!(!clock.tick());
    assert_eq!(clock.format(), "0h 0m 0s");
  }

  #[test]
  fn test_full_sequence_reaches_zero() {
    for (h, m, s) in [(0, 0, 0), (0, 0, 59), (0, 2, 3), (1, 0, 0), (2, 30, 15)] {
      let mut clock = Clock::new(h, m, s).unwrap();
      let total = clock.total_seconds();
      let mut previous = total;
      for _ in 0..total {
        assert!(clock.tick());
        assert_eq!(clock.total_seconds(), previous - 1);
        previous = clock.total_seconds();
      }
      assert!(clock.is_exhausted());
      for _ in 0..3 {
        clock.tick();
        assert!(clock.is_exhausted());
      }
    }
  }

  #[test]
  fn test_low_time() {
    assert!(Clock::new(0, 4, 59).unwrap().is_low_time(5));
    assert!(Clock::new(0, 4, 0).unwrap().is_low_time(5));
    assert!(!Clock::new(0, 5, 0).unwrap().is_low_time(5));
    assert!(!Clock::new(1, 0, 0).unwrap().is_low_time(5));
  }
}
