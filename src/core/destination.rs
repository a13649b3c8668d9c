//! Destination trait for log output sinks

use super::{error::Result, record::Record};
use serde_json::Value;

/// What a buffering destination hands back on flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlushSelector {
    /// Buffered records as JSON objects
    #[default]
    Records,
    /// Buffered rendered texts as JSON strings
    Messages,
}

impl From<&str> for FlushSelector {
    fn from(what: &str) -> Self {
        match what {
            "message" | "messages" => FlushSelector::Messages,
            _ => FlushSelector::Records,
        }
    }
}

/// A sink for rendered records
///
/// Destinations are called while the tree's destination list is locked.
/// Log calls made from `write` or `flush` through the same tree fail with
/// [`LoggerError::DestinationError`](super::error::LoggerError::DestinationError).
pub trait Destination: Send + Sync {
    /// Accept a prepared record and its already rendered text
    fn write(&mut self, record: &Record, text: &str) -> Result<()>;

    /// Drain buffered output; non-buffering sinks return nothing
    fn flush(&mut self, _what: FlushSelector) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str;
}
