//! Errors surfaced by log calls, destinations and configuration parsing

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A destination could not write to its stream
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Plain IO failure from a custom destination
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A record or metrics payload could not be serialized
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A required metrics argument was not supplied
    #[error("Missing metrics argument: {argument}")]
    MissingMetricsArgument { argument: String },

    /// A configuration value (such as an environment variable) is malformed
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A destination rejected a write or flush
    #[error("Destination '{name}' failed: {message}")]
    DestinationError { name: String, message: String },

    /// An output format could not render a record
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },
}

impl LoggerError {
    /// IO failure while `operation` was in progress
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn missing_metrics_argument(argument: impl Into<String>) -> Self {
        LoggerError::MissingMetricsArgument {
            argument: argument.into(),
        }
    }

    /// `component` names the setting, e.g. `LOG_SAMPLE`
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn destination(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::DestinationError {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }
}
