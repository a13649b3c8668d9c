//! Channel names and channel-list arguments

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Channels enabled when no filter is configured
pub const DEFAULT_FILTER: [&str; 5] = ["fatal", "error", "metrics", "info", "warn"];

/// A named category of log record
///
/// Gating and routing are keyed on the channel name, so any string is a valid
/// channel. The well-known names get their own variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    Data,
    Debug,
    Error,
    Fatal,
    Info,
    Trace,
    Warn,
    Metrics,
    Assert,
    Custom(String),
}

impl Channel {
    pub fn as_str(&self) -> &str {
        match self {
            Channel::Data => "data",
            Channel::Debug => "debug",
            Channel::Error => "error",
            Channel::Fatal => "fatal",
            Channel::Info => "info",
            Channel::Trace => "trace",
            Channel::Warn => "warn",
            Channel::Metrics => "metrics",
            Channel::Assert => "assert",
            Channel::Custom(name) => name,
        }
    }

    /// Channels the console destination routes to stderr
    pub fn is_failure(&self) -> bool {
        matches!(self, Channel::Error | Channel::Fatal | Channel::Assert)
    }

    #[cfg(feature = "console")]
    pub fn color(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Channel::Trace => BrightBlack,
            Channel::Debug => Blue,
            Channel::Info => Green,
            Channel::Warn => Yellow,
            Channel::Error | Channel::Assert => Red,
            Channel::Fatal => BrightRed,
            Channel::Data | Channel::Metrics => Cyan,
            Channel::Custom(_) => Magenta,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Channel {
    fn from(name: &str) -> Self {
        match name {
            "data" => Channel::Data,
            "debug" => Channel::Debug,
            "error" => Channel::Error,
            "fatal" => Channel::Fatal,
            "info" => Channel::Info,
            "trace" => Channel::Trace,
            "warn" => Channel::Warn,
            "metrics" => Channel::Metrics,
            "assert" => Channel::Assert,
            other => Channel::Custom(other.to_string()),
        }
    }
}

impl From<String> for Channel {
    fn from(name: String) -> Self {
        Channel::from(name.as_str())
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.as_str().to_string()
    }
}

impl FromStr for Channel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Channel::from(s))
    }
}

/// Channel-list argument accepted by the filter, override and sample mutators
///
/// Strings are split on commas and trimmed; empty entries are ignored.
/// An empty string or `None` means "clear".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSpec {
    Clear,
    Default,
    List(Vec<String>),
}

impl ChannelSpec {
    /// Split a comma separated list, dropping empty entries
    pub fn parse_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|chan| !chan.is_empty())
            .map(String::from)
            .collect()
    }

    /// Resolve to concrete channel names, expanding `Default` with `defaults`
    ///
    /// Returns `None` for `Clear`.
    pub fn resolve<S: AsRef<str>>(&self, defaults: &[S]) -> Option<Vec<String>> {
        match self {
            ChannelSpec::Clear => None,
            ChannelSpec::Default => Some(defaults.iter().map(|d| d.as_ref().to_string()).collect()),
            ChannelSpec::List(list) => Some(list.clone()),
        }
    }
}

impl From<&str> for ChannelSpec {
    fn from(list: &str) -> Self {
        if list.is_empty() {
            ChannelSpec::Clear
        } else if list == "default" {
            ChannelSpec::Default
        } else {
            ChannelSpec::List(Self::parse_list(list))
        }
    }
}

impl From<String> for ChannelSpec {
    fn from(list: String) -> Self {
        ChannelSpec::from(list.as_str())
    }
}

impl From<&String> for ChannelSpec {
    fn from(list: &String) -> Self {
        ChannelSpec::from(list.as_str())
    }
}

impl From<Channel> for ChannelSpec {
    fn from(channel: Channel) -> Self {
        ChannelSpec::List(vec![channel.as_str().to_string()])
    }
}

fn from_items<S: AsRef<str>>(items: &[S]) -> ChannelSpec {
    ChannelSpec::List(
        items
            .iter()
            .map(|item| item.as_ref().trim())
            .filter(|chan| !chan.is_empty())
            .map(String::from)
            .collect(),
    )
}

impl From<&[&str]> for ChannelSpec {
    fn from(items: &[&str]) -> Self {
        from_items(items)
    }
}

impl<const N: usize> From<[&str; N]> for ChannelSpec {
    fn from(items: [&str; N]) -> Self {
        from_items(&items)
    }
}

impl From<Vec<&str>> for ChannelSpec {
    fn from(items: Vec<&str>) -> Self {
        from_items(&items)
    }
}

impl From<Vec<String>> for ChannelSpec {
    fn from(items: Vec<String>) -> Self {
        from_items(&items)
    }
}

impl<T: Into<ChannelSpec>> From<Option<T>> for ChannelSpec {
    fn from(spec: Option<T>) -> Self {
        spec.map(Into::into).unwrap_or(ChannelSpec::Clear)
    }
}
