/// Settings loaded from `tienda.ini`, section `[tienda]`.
///
/// Every key is optional. Bad values are logged and replaced by their
/// default so one typo never takes the whole storefront down.
use std::collections::HashMap;
use std::time::Duration;

use crate::clock::Clock;
use crate::modal::ModalTimings;

pub const CONF_FILE_NAME: &str = "tienda.ini";
pub const CONF_SECTION: &str = "tienda";

pub const DEFAULT_TICK_MS: u64 = 1000;
pub const DEFAULT_ANNOUNCE_MS: u64 = 1000;
pub const DEFAULT_SETTLE_MS: u64 = 10;
pub const DEFAULT_AUTO_CLOSE_MS: u64 = 3000;
pub const DEFAULT_FADE_MS: u64 = 300;
pub const DEFAULT_LOW_TIME_MINUTES: u32 = 5;

// Validation ranges
const MIN_TICK_MS: u64 = 10;
const MAX_MS: u64 = 60_000;
const MIN_LOW_TIME_MINUTES: u32 = 1;
const MAX_LOW_TIME_MINUTES: u32 = 59;
const COUNTDOWN_OFF: &str = "off";

pub type IniMap = HashMap<String, HashMap<String, Option<String>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  /// `None` when the countdown banner is switched off.
  pub countdown: Option<Clock>,
  pub low_time_minutes: u32,
  pub tick: Duration,
  pub announce: Duration,
  pub modal: ModalTimings,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      countdown: Some(Clock::default()),
      low_time_minutes: DEFAULT_LOW_TIME_MINUTES,
      tick: Duration::from_millis(DEFAULT_TICK_MS),
      announce: Duration::from_millis(DEFAULT_ANNOUNCE_MS),
      modal: ModalTimings {
        settle: Duration::from_millis(DEFAULT_SETTLE_MS),
        auto_close: Duration::from_millis(DEFAULT_AUTO_CLOSE_MS),
        fade: Duration::from_millis(DEFAULT_FADE_MS),
      },
    }
  }
}

/// Parse and validate a millisecond value
fn parse_ms_config(value: &str, config_name: &str, min: u64, default: u64) -> Duration {
  let ms = match value.trim().parse::<u64>() {
    Ok(ms) if (min..=MAX_MS).contains(&ms) => ms,
    Ok(ms) => {
      warn!("Config value '{}' = {} is out of valid range [{}, {}], using default {}",
            config_name, ms, min, MAX_MS, default);
      default
    }
    Err(e) => {
      warn!("Failed to parse config value '{}' = '{}': {}, using default {}",
            config_name, value, e, default);
      default
    }
  };
  Duration::from_millis(ms)
}

fn parse_low_time(value: &str) -> u32 {
  match value.trim().parse::<u32>() {
    Ok(m) if (MIN_LOW_TIME_MINUTES..=MAX_LOW_TIME_MINUTES).contains(&m) => m,
    _ => {
      warn!("Invalid lowtime value '{}', using default {}", value, DEFAULT_LOW_TIME_MINUTES);
      DEFAULT_LOW_TIME_MINUTES
    }
  }
}

/// `H:M:S` or `off`.
fn parse_countdown(value: &str) -> Option<Clock> {
  let value = value.trim();
  if value.eq_ignore_ascii_case(COUNTDOWN_OFF) {
    info!("Countdown disabled by config");
    return None;
  }
  let parts: Vec<&str> = value.split(':').map(str::trim).collect();
  let clock = match parts.as_slice() {
    [h, m, s] => match (h.parse::<u32>(), m.parse::<u8>(), s.parse::<u8>()) {
      (Ok(h), Ok(m), Ok(s)) => Clock::new(h, m, s),
      _ => None,
    },
    _ => None,
  };
  if clock.is_none() {
    warn!("Invalid countdown value '{}', using default {}", value, Clock::default());
  }
  Some(clock.unwrap_or_default())
}

impl Settings {
  pub fn from_ini(inimap: &IniMap) -> Self {
    let mut settings = Self::default();
    let Some(section) = inimap.get(CONF_SECTION) else {
      info!("No [{}] section, using default configuration", CONF_SECTION);
      return settings;
    };
    let get = |key: &str| section.get(key).and_then(|v| v.as_deref());

    if let Some(val) = get("countdown") {
      settings.countdown = parse_countdown(val);
    }
    if let Some(val) = get("lowtime") {
      settings.low_time_minutes = parse_low_time(val);
    }
    if let Some(val) = get("tickms") {
      settings.tick = parse_ms_config(val, "tickms", MIN_TICK_MS, DEFAULT_TICK_MS);
    }
    if let Some(val) = get("announcems") {
      settings.announce = parse_ms_config(val, "announcems", 0, DEFAULT_ANNOUNCE_MS);
    }
    if let Some(val) = get("settlems") {
      settings.modal.settle = parse_ms_config(val, "settlems", 0, DEFAULT_SETTLE_MS);
    }
    if let Some(val) = get("autoclosems") {
      settings.modal.auto_close = parse_ms_config(val, "autoclosems", 0, DEFAULT_AUTO_CLOSE_MS);
    }
    if let Some(val) = get("fadems") {
      settings.modal.fade = parse_ms_config(val, "fadems", 0, DEFAULT_FADE_MS);
    }
    info!("Settings: {:?}", settings);
    settings
  }

  /// Reads `tienda.ini`; a missing or broken file falls back to defaults.
  pub fn load() -> Self {
    info!("Reading config from {}", CONF_FILE_NAME);
    match ini!(safe CONF_FILE_NAME) {
      Ok(inimap) => Self::from_ini(&inimap),
      Err(error) => {
        eprintln!("Warning: Couldn't load config file '{}': {}", CONF_FILE_NAME, error);
        info!("Using default configuration");
        Self::default()
      }
    }
  }
}
