//! Engine settings surface and validation policy.
//!
//! # Responsibility
//! - Parse and validate the user-facing reset settings before they reach
//!   the engine.
//! - Keep malformed values out of the decision path entirely.
//!
//! # Invariants
//! - `reset_time` only accepts 24-hour `HH:MM` strings.
//! - `retention_days` is always within `[7, 365]` after construction.

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lower bound for the retention horizon, in days.
pub const RETENTION_DAYS_MIN: u32 = 7;
/// Upper bound for the retention horizon, in days.
pub const RETENTION_DAYS_MAX: u32 = 365;
/// Default retention horizon, in days.
pub const RETENTION_DAYS_DEFAULT: u32 = 30;
/// How far back carryforward looks for incomplete todos, in days.
pub const CARRY_WINDOW_DAYS: i64 = 7;
/// Inactivity span treated as a suspended session, in minutes.
pub const SESSION_GAP_MINUTES: i64 = 120;

static RESET_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("reset time pattern must compile")
});

/// Settings-boundary validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Input did not match the `HH:MM` 24-hour pattern.
    InvalidResetTime(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidResetTime(value) => {
                write!(f, "invalid reset time `{value}`; expected 24-hour HH:MM")
            }
        }
    }
}

impl Error for SettingsError {}

/// Validated settings snapshot consumed by the reset engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSettings {
    /// Time of day the tracker day rolls over.
    pub reset_time: NaiveTime,
    /// Age threshold for retention pruning, in days.
    pub retention_days: u32,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            reset_time: NaiveTime::MIN,
            retention_days: RETENTION_DAYS_DEFAULT,
        }
    }
}

impl ResetSettings {
    /// Builds a settings snapshot from raw user input.
    ///
    /// # Errors
    /// - Returns `SettingsError::InvalidResetTime` for malformed time input.
    ///
    /// Retention input is clamped to `[7, 365]` rather than rejected, so a
    /// stale or imported value can never widen the data-loss window.
    pub fn from_raw(reset_time: &str, retention_days: i64) -> Result<Self, SettingsError> {
        Ok(Self {
            reset_time: parse_reset_time(reset_time)?,
            retention_days: clamp_retention_days(retention_days),
        })
    }
}

/// Parses and validates a `HH:MM` 24-hour reset time string.
///
/// # Errors
/// - Returns `SettingsError::InvalidResetTime` when the input does not match
///   the accepted pattern.
pub fn parse_reset_time(value: &str) -> Result<NaiveTime, SettingsError> {
    let trimmed = value.trim();
    if !RESET_TIME_PATTERN.is_match(trimmed) {
        return Err(SettingsError::InvalidResetTime(value.to_string()));
    }

    // The pattern guarantees one colon with numeric fields on both sides.
    let (hours, minutes) = trimmed
        .split_once(':')
        .ok_or_else(|| SettingsError::InvalidResetTime(value.to_string()))?;
    let hours: u32 = hours
        .parse()
        .map_err(|_| SettingsError::InvalidResetTime(value.to_string()))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| SettingsError::InvalidResetTime(value.to_string()))?;

    NaiveTime::from_hms_opt(hours, minutes, 0)
        .ok_or_else(|| SettingsError::InvalidResetTime(value.to_string()))
}

/// Clamps a raw retention-days value into the supported `[7, 365]` range.
pub fn clamp_retention_days(value: i64) -> u32 {
    value.clamp(i64::from(RETENTION_DAYS_MIN), i64::from(RETENTION_DAYS_MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::{clamp_retention_days, parse_reset_time, ResetSettings, SettingsError};
    use chrono::NaiveTime;

    #[test]
    fn parse_reset_time_accepts_valid_inputs() {
        assert_eq!(
            parse_reset_time("04:30").unwrap(),
            NaiveTime::from_hms_opt(4, 30, 0).unwrap()
        );
        assert_eq!(
            parse_reset_time("4:05").unwrap(),
            NaiveTime::from_hms_opt(4, 5, 0).unwrap()
        );
        assert_eq!(
            parse_reset_time("23:59").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );
        assert_eq!(parse_reset_time(" 00:00 ").unwrap(), NaiveTime::MIN);
    }

    #[test]
    fn parse_reset_time_rejects_malformed_inputs() {
        for bad in ["24:00", "12:60", "noon", "12", "12:3", "-1:00", "12:00:00"] {
            assert!(
                matches!(parse_reset_time(bad), Err(SettingsError::InvalidResetTime(_))),
                "expected rejection for {bad}"
            );
        }
    }

    #[test]
    fn retention_days_are_clamped_to_supported_range() {
        assert_eq!(clamp_retention_days(0), 7);
        assert_eq!(clamp_retention_days(30), 30);
        assert_eq!(clamp_retention_days(10_000), 365);
        assert_eq!(clamp_retention_days(-5), 7);
    }

    #[test]
    fn from_raw_combines_both_validations() {
        let settings = ResetSettings::from_raw("06:15", 45).unwrap();
        assert_eq!(settings.reset_time, NaiveTime::from_hms_opt(6, 15, 0).unwrap());
        assert_eq!(settings.retention_days, 45);

        assert!(ResetSettings::from_raw("25:00", 45).is_err());
    }
}
