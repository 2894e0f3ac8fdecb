/// Drives a `Clock` from a single repeating timer.
use std::time::Duration;

use crate::clock::Clock;
use crate::timer::{holds, Scheduler, TimerHandle, TimerId};

#[derive(Debug)]
pub struct Countdown {
  clock: Clock,
  period: Duration,
  low_time_minutes: u32,
  low_time: bool,
  ticker: Option<TimerHandle>,
  ticks: u64,
}

impl Countdown {
  pub fn new(clock: Clock, period: Duration, low_time_minutes: u32) -> Self {
    Self {
      clock,
      period,
      low_time_minutes,
      low_time: clock.is_low_time(low_time_minutes),
      ticker: None,
      ticks: 0,
    }
  }

  /// Starts ticking. A second call while running is ignored.
  pub fn start(&mut self, scheduler: &mut Scheduler) -> bool {
    if self.ticker.is_some() {
      debug!("Countdown already running, ignoring start");
      return false;
    }
    if self.clock.is_exhausted() {
      debug!("Countdown exhausted, not starting");
      return false;
    }
    info!("Countdown started at {} ({}s left, period {:?})", self.clock, self.clock.total_seconds(), self.period);
    self.ticker = Some(scheduler.every(self.period));
    true
  }

  /// Ticks already in flight for the old timer are ignored after this returns.
  pub fn stop(&mut self) -> bool {
    match self.ticker.take() {
      Some(ticker) => {
        ticker.cancel();
        info!("Countdown stopped at {} after {} ticks", self.clock, self.ticks);
        true
      }
      None => false,
    }
  }

  pub fn is_running(&self) -> bool {
    self.ticker.is_some()
  }

  /// Applies one tick if `id` belongs to the live ticker.
  pub fn handle_timer(&mut self, id: TimerId) -> bool {
    if !holds(&self.ticker, id) {
      return false;
    }
    self.clock.tick();
    self.ticks += 1;
    if !self.low_time && self.clock.is_low_time(self.low_time_minutes) {
      info!("Countdown entered low time at {}", self.clock);
      self.low_time = true;
    }
    if self.clock.is_exhausted() {
      self.stop();
    }
    true
  }

  pub fn current_display(&self) -> String {
    self.clock.format()
  }

  pub fn ticks(&self) -> u64 {
    self.ticks
  }

  /// Latched: once set it stays set for the rest of the run.
  pub fn is_low_time(&self) -> bool {
    self.low_time
  }
}
