//! Console destination for local development

use crate::core::logger::METRICS;
use crate::core::{Channel, Destination, Record, Result};
use colored::Colorize;
use std::io::{self, Write};

/// Colored console output
///
/// Records on the `error`, `fatal` and `assert` channels, and any record
/// carrying an `@exception`, go to stderr. Everything else goes to stdout.
/// Metrics payloads are written uncolored on any channel.
#[derive(Debug)]
pub struct ConsoleDestination {
    use_colors: bool,
}

impl ConsoleDestination {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn paint(&self, channel: &Channel, record: &Record, text: &str) -> String {
        if self.use_colors && *channel != Channel::Metrics && !record.contains_key(METRICS) {
            text.color(channel.color()).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleDestination {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a record belongs on stderr
fn is_failure(channel: &Channel, record: &Record) -> bool {
    channel.is_failure() || record.exception().is_some()
}

impl Destination for ConsoleDestination {
    fn write(&mut self, record: &Record, text: &str) -> Result<()> {
        let channel = Channel::from(record.channel());
        let output = self.paint(&channel, record, text);

        if is_failure(&channel, record) {
            writeln!(io::stderr().lock(), "{}", output)?;
        } else {
            writeln!(io::stdout().lock(), "{}", output)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
