//! # Rust Channel Logger
//!
//! Channel-based structured logging for short-lived serverless request
//! handlers.
//!
//! ## Features
//!
//! - **Channels**: every record is logged on a named channel (`info`, `error`,
//!   `metrics` or any custom name)
//! - **Dynamic gating**: a static filter, time-bounded overrides and 1-in-N
//!   sampling decide which channels produce output
//! - **Structured records**: message, context and exceptions are normalized
//!   into one flat JSON object, merged with per-logger context
//! - **Formats and destinations**: JSON, human, TSV, key-value or custom
//!   rendering to stdout, the console or an in-memory capture buffer
//! - **CloudWatch EMF metrics** written straight to the function log
//!
//! ## Example
//!
//! ```
//! use rust_channel_logger::prelude::*;
//! use serde_json::json;
//!
//! let mut logger = Logger::builder()
//!     .name("orders")
//!     .destination_name("capture")
//!     .build();
//! logger.add_context(json!({"requestId": "abc"}));
//!
//! logger.info_with_context("Order placed", json!({"total": 42})).unwrap();
//! logger.debug("Not in the default filter").unwrap();
//!
//! let records = logger.flush().unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0]["requestId"], "abc");
//! assert_eq!(records[0]["@module"], "orders");
//! ```

pub mod core;
pub mod destinations;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        Channel, ChannelSpec, Context, Destination, EnvOverrides, Exception, FilterState, Flags,
        FlushSelector, LogContext, Logger, LoggerBuilder, LoggerConfig, LoggerError, Message,
        MetricsEvent, OutputFormat, OverrideExpiry, Record, Result, Sample, TimestampFormat,
        Truthy, DEFAULT_FILTER,
    };
    pub use crate::destinations::CaptureDestination;
}

#[cfg(feature = "console")]
pub use destinations::ConsoleDestination;
pub use destinations::{CaptureDestination, StdoutDestination};
pub use core::{
    Channel, ChannelSpec, Context, Destination, DestinationConfig, EnvOverrides, Exception,
    FilterState, Flags, FlushSelector, FormatFn, LogContext, Logger, LoggerBuilder, LoggerConfig,
    LoggerError, Message, MetricsEvent, OutputFormat, OverrideExpiry, Record, RecordOptions,
    RedactFn, Result, Sample, TimestampFormat, Truthy, DEFAULT_FILTER,
};
