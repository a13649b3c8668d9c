//! In-memory capture destination
//!
//! Keeps every record and its rendered text until the logger is flushed.
//! Useful in tests and for handlers that ship their logs in a response.

use crate::core::{Destination, FlushSelector, Record, Result};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct CaptureDestination {
    buffer: Vec<(Record, String)>,
}

impl CaptureDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Destination for CaptureDestination {
    fn write(&mut self, record: &Record, text: &str) -> Result<()> {
        self.buffer.push((record.clone(), text.to_string()));
        Ok(())
    }

    /// Return the buffered output and empty the buffer
    fn flush(&mut self, what: FlushSelector) -> Result<Vec<Value>> {
        let drained = std::mem::take(&mut self.buffer).into_iter();
        Ok(match what {
            FlushSelector::Records => drained.map(|(record, _)| record.to_value()).collect(),
            FlushSelector::Messages => drained.map(|(_, text)| Value::String(text)).collect(),
        })
    }

    fn name(&self) -> &str {
        "capture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(message: &str) -> Record {
        let mut record = Record::new();
        record.insert("message", message);
        record
    }

    #[test]
    fn test_flush_records_drains() {
        let mut capture = CaptureDestination::new();
        capture.write(&record("one"), "text one").unwrap();
        capture.write(&record("two"), "text two").unwrap();
        assert_eq!(capture.len(), 2);

        let flushed = capture.flush(FlushSelector::Records).unwrap();
        assert_eq!(flushed, vec![json!({"message": "one"}), json!({"message": "two"})]);
        assert!(capture.is_empty());
        assert!(capture.flush(FlushSelector::Records).unwrap().is_empty());
    }

    #[test]
    fn test_flush_messages() {
        let mut capture = CaptureDestination::new();
        capture.write(&record("one"), "text one").unwrap();

        let flushed = capture.flush(FlushSelector::Messages).unwrap();
        assert_eq!(flushed, vec![json!("text one")]);
    }
}
