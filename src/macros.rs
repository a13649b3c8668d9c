//! Logging macros for ergonomic log message formatting.
//!
//! These macros `format!` their arguments into the message and log it with
//! an empty call context. Each one evaluates to the `Result<()>` of the call.
//!
//! # Examples
//!
//! ```
//! use rust_channel_logger::prelude::*;
//! use rust_channel_logger::info;
//!
//! let logger = Logger::builder().destination_name("capture").build();
//!
//! // Basic logging
//! info!(logger, "Server started").unwrap();
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port).unwrap();
//!
//! let records = logger.flush().unwrap();
//! assert_eq!(records[1]["message"], "Server listening on port 8080");
//! ```

/// Log a formatted message on any channel.
///
/// # Examples
///
/// ```
/// # use rust_channel_logger::prelude::*;
/// # let logger = Logger::builder().destination_name("capture").filter("audit").build();
/// use rust_channel_logger::emit;
/// emit!(logger, "audit", "Simple message").unwrap();
/// emit!(logger, Channel::Custom("audit".into()), "Order {}", 500).unwrap();
/// assert_eq!(logger.flush().unwrap().len(), 2);
/// ```
#[macro_export]
macro_rules! emit {
    ($logger:expr, $channel:expr, $($arg:tt)+) => {
        $logger.emit($channel, format!($($arg)+), $crate::Context::empty())
    };
}

/// Log on the `trace` channel.
///
/// # Examples
///
/// ```
/// # use rust_channel_logger::prelude::*;
/// # let logger = Logger::builder().destination_name("capture").filter("trace").build();
/// use rust_channel_logger::trace;
/// trace!(logger, "Entering function: calculate()").unwrap();
/// trace!(logger, "Variable value: {}", 42).unwrap();
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Channel::Trace, $($arg)+)
    };
}

/// Log on the `debug` channel.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Channel::Debug, $($arg)+)
    };
}

/// Log on the `info` channel.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Channel::Info, $($arg)+)
    };
}

/// Log on the `warn` channel.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Channel::Warn, $($arg)+)
    };
}

/// Log on the `error` channel.
///
/// # Examples
///
/// ```
/// # use rust_channel_logger::prelude::*;
/// # let logger = Logger::builder().destination_name("capture").build();
/// use rust_channel_logger::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error").unwrap();
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Channel::Error, $($arg)+)
    };
}

/// Log on the `fatal` channel.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Channel::Fatal, $($arg)+)
    };
}

/// Log on the `data` channel.
#[macro_export]
macro_rules! data {
    ($logger:expr, $($arg:tt)+) => {
        $crate::emit!($logger, $crate::Channel::Data, $($arg)+)
    };
}
