//! Core logger types and traits

pub mod channel;
pub mod config;
pub mod destination;
pub mod error;
pub mod exception;
pub mod filter;
pub mod log_context;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod record;
pub mod timestamp;
pub mod truthy;

pub use channel::{Channel, ChannelSpec, DEFAULT_FILTER};
pub use config::{DestinationConfig, EnvOverrides, Flags, LoggerConfig};
pub use destination::{Destination, FlushSelector};
pub use error::{LoggerError, Result};
pub use exception::Exception;
pub use filter::{FilterState, OverrideExpiry, Sample};
pub use log_context::{Context, LogContext, Message};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::MetricsEvent;
pub use output_format::{FormatFn, OutputFormat};
pub use record::{Record, RecordOptions, RedactFn};
pub use timestamp::TimestampFormat;
pub use truthy::Truthy;
