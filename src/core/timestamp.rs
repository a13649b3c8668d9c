//! Encodings for the optional `timestamp` record field
//!
//! Epoch variants are stored as JSON numbers, everything else as a string.

use super::error::{LoggerError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;

/// How `timestamp` is written when a logger stamps its records
///
/// # Examples
///
/// ```
/// use rust_channel_logger::TimestampFormat;
/// use chrono::Utc;
///
/// let value = TimestampFormat::UnixMillis.to_value(&Utc::now()).unwrap();
/// assert!(value.is_number());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`, the same shape JavaScript's `toISOString` gives
    #[default]
    Iso8601,
    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,
    /// `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,
    /// Epoch seconds
    Unix,
    /// Epoch milliseconds, the unit CloudWatch uses
    UnixMillis,
    UnixMicros,
    /// Any strftime pattern
    Custom(String),
}

impl TimestampFormat {
    /// Text form of `at`; epoch variants give their decimal digits
    pub fn format(&self, at: &DateTime<Utc>) -> Result<String> {
        Ok(match self.to_value(at)? {
            Value::String(text) => text,
            number => number.to_string(),
        })
    }

    /// Field value for `at`
    ///
    /// Fails with a formatter error when a custom pattern is not valid strftime.
    pub fn to_value(&self, at: &DateTime<Utc>) -> Result<Value> {
        Ok(match self {
            TimestampFormat::Unix => at.timestamp().into(),
            TimestampFormat::UnixMillis => at.timestamp_millis().into(),
            TimestampFormat::UnixMicros => at.timestamp_micros().into(),
            TimestampFormat::Iso8601 => at.to_rfc3339_opts(SecondsFormat::Millis, true).into(),
            TimestampFormat::Iso8601Micros => at.to_rfc3339_opts(SecondsFormat::Micros, true).into(),
            TimestampFormat::Rfc3339 => at.to_rfc3339().into(),
            TimestampFormat::Custom(pattern) => {
                let mut text = String::new();
                write!(text, "{}", at.format(pattern)).map_err(|_| {
                    LoggerError::formatter("timestamp", format!("invalid pattern '{}'", pattern))
                })?;
                text.into()
            }
        })
    }
}
