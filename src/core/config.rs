//! Logger configuration
//!
//! [`LoggerConfig`] is the fully resolved set of construction options.
//! [`EnvOverrides`] reads `LOG_FILTER`, `LOG_OVERRIDE` and `LOG_SAMPLE` once
//! and applies them on top of a config before the logger is built:
//!
//! - `LOG_FILTER=error,info` or `LOG_FILTER=default`
//! - `LOG_OVERRIDE=<expiry epoch ms>:debug,trace` (`indefinite` is accepted as expiry)
//! - `LOG_SAMPLE=<rate percent>:info,debug` (a trailing `%` is allowed)

use super::channel::{ChannelSpec, DEFAULT_FILTER};
use super::destination::Destination;
use super::error::{LoggerError, Result};
use super::filter::OverrideExpiry;
use super::output_format::OutputFormat;
use super::record::RedactFn;
use super::timestamp::TimestampFormat;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;

pub const LOG_FILTER: &str = "LOG_FILTER";
pub const LOG_OVERRIDE: &str = "LOG_OVERRIDE";
pub const LOG_SAMPLE: &str = "LOG_SAMPLE";

/// Channel → boolean field set to `true` on that channel's records
///
/// A single field name applies to the `error` channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    fields: HashMap<String, String>,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, channel: impl Into<String>, field: impl Into<String>) -> Self {
        self.fields.insert(channel.into(), field.into());
        self
    }

    pub fn field_for(&self, channel: &str) -> Option<&str> {
        self.fields.get(channel).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&str> for Flags {
    fn from(field: &str) -> Self {
        Flags::new().with("error", field)
    }
}

impl<K, V> From<HashMap<K, V>> for Flags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(map: HashMap<K, V>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Flags {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .fold(Flags::new(), |flags, (channel, field)| flags.with(channel, field))
    }
}

/// A destination together with its optional per-destination format
pub struct DestinationConfig {
    pub destination: Box<dyn Destination>,
    /// `None` uses the logger-wide format
    pub format: Option<OutputFormat>,
}

/// Fully resolved construction options
pub struct LoggerConfig {
    /// Default `@module` value
    pub name: String,
    pub filter: ChannelSpec,
    pub overrides: Vec<(ChannelSpec, Option<OverrideExpiry>)>,
    pub samples: Vec<(ChannelSpec, f64)>,
    pub flags: Flags,
    pub format: OutputFormat,
    pub timestamp: bool,
    pub timestamp_format: TimestampFormat,
    pub redact: Option<RedactFn>,
    /// Empty means a single JSON-to-stdout destination
    pub destinations: Vec<DestinationConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            filter: ChannelSpec::from(DEFAULT_FILTER),
            overrides: Vec::new(),
            samples: Vec::new(),
            flags: Flags::default(),
            format: OutputFormat::default(),
            timestamp: false,
            timestamp_format: TimestampFormat::default(),
            redact: None,
            destinations: Vec::new(),
        }
    }
}

impl std::fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("overrides", &self.overrides)
            .field("samples", &self.samples)
            .field("flags", &self.flags)
            .field("format", &self.format)
            .field("timestamp", &self.timestamp)
            .field("timestamp_format", &self.timestamp_format)
            .field("redact", &self.redact.is_some())
            .field(
                "destinations",
                &self
                    .destinations
                    .iter()
                    .map(|d| d.destination.name().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Filter settings taken from the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub filter: Option<ChannelSpec>,
    pub override_: Option<(ChannelSpec, OverrideExpiry)>,
    pub sample: Option<(ChannelSpec, f64)>,
}

impl EnvOverrides {
    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read variables through `lookup`; malformed values are reported and skipped
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides = Self {
            filter: lookup(LOG_FILTER).map(ChannelSpec::from),
            ..Default::default()
        };

        if let Some(value) = lookup(LOG_OVERRIDE) {
            match parse_override(&value) {
                Ok(parsed) => overrides.override_ = Some(parsed),
                Err(e) => eprintln!("[LOGGER WARNING] Ignoring {}: {}", LOG_OVERRIDE, e),
            }
        }
        if let Some(value) = lookup(LOG_SAMPLE) {
            match parse_sample(&value) {
                Ok(parsed) => overrides.sample = Some(parsed),
                Err(e) => eprintln!("[LOGGER WARNING] Ignoring {}: {}", LOG_SAMPLE, e),
            }
        }
        overrides
    }

    pub fn is_empty(&self) -> bool {
        self.filter.is_none() && self.override_.is_none() && self.sample.is_none()
    }

    /// Apply on top of `config`; the environment filter replaces the configured one
    pub fn apply(self, config: &mut LoggerConfig) {
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        if let Some((channels, expiry)) = self.override_ {
            config.overrides.push((channels, Some(expiry)));
        }
        if let Some((channels, rate)) = self.sample {
            config.samples.push((channels, rate));
        }
    }
}

fn parse_override(value: &str) -> Result<(ChannelSpec, OverrideExpiry)> {
    let (expiry, channels) = value
        .split_once(':')
        .ok_or_else(|| LoggerError::config(LOG_OVERRIDE, "expected <expiry>:<channels>"))?;
    let expiry = expiry.trim();
    let expiry = if expiry.eq_ignore_ascii_case("indefinite") {
        OverrideExpiry::Indefinite
    } else {
        let millis: i64 = expiry
            .parse()
            .map_err(|_| LoggerError::config(LOG_OVERRIDE, format!("invalid expiry '{}'", expiry)))?;
        let at = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| LoggerError::config(LOG_OVERRIDE, format!("expiry out of range '{}'", millis)))?;
        OverrideExpiry::Until(at)
    };
    Ok((ChannelSpec::from(channels), expiry))
}

fn parse_sample(value: &str) -> Result<(ChannelSpec, f64)> {
    let (rate, channels) = value
        .split_once(':')
        .ok_or_else(|| LoggerError::config(LOG_SAMPLE, "expected <rate>:<channels>"))?;
    let rate = rate.trim().trim_end_matches('%');
    let rate: f64 = rate
        .parse()
        .map_err(|_| LoggerError::config(LOG_SAMPLE, format!("invalid rate '{}'", rate)))?;
    Ok((ChannelSpec::from(channels), rate))
}
