//! Standard output destination
//!
//! Writes each rendered record as one line. This is what the `json` and
//! `stdout` destination names resolve to; in a function runtime stdout is
//! collected by the platform log service.

use crate::core::{Destination, LoggerError, Record, Result};
use std::io::{self, Write};

#[derive(Debug, Default)]
pub struct StdoutDestination;

impl StdoutDestination {
    pub fn new() -> Self {
        Self
    }
}

impl Destination for StdoutDestination {
    fn write(&mut self, _record: &Record, text: &str) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{}", text)
            .map_err(|e| LoggerError::io_operation("writing to stdout", "cannot write record", e))
    }

    fn name(&self) -> &str {
        "stdout"
    }
}
