//! Per-call arguments: the message and the context fields
//!
//! This module provides:
//! - `Message`: text, an arbitrary JSON value, or an exception
//! - `LogContext`: builder for per-call fields, with an optional `err`
//! - `Context`: either a `LogContext` or a bare exception

use super::exception::Exception;
use serde_json::{Map, Value};

/// The message argument of a log call
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    /// Serialized to a JSON string unless it is a JSON string already
    Value(Value),
    /// The exception's message becomes the record message
    Exception(Exception),
}

impl Message {
    /// Message text for a record
    pub fn to_text(&self) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::Value(Value::String(text)) => text.clone(),
            Message::Value(value) => value.to_string(),
            Message::Exception(exception) => exception.message.clone(),
        }
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::Text(String::new())
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<&String> for Message {
    fn from(text: &String) -> Self {
        Message::Text(text.clone())
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Message::Value(value)
    }
}

impl From<Exception> for Message {
    fn from(exception: Exception) -> Self {
        Message::Exception(exception)
    }
}

/// Structured fields for a single log call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
    pub(crate) fields: Map<String, Value>,
    pub(crate) err: Option<Exception>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.insert(key.into(), value.into());
    }

    /// Attach an error under `err`
    ///
    /// The error is moved to `@exception` on the record. If it is the only
    /// thing in the context, its extra properties become the record fields.
    pub fn with_err(mut self, err: impl Into<Exception>) -> Self {
        self.err = Some(err.into());
        self
    }

    /// Ask for a stack trace of the call site under `@stack`
    pub fn with_stack(self) -> Self {
        self.with_field("@stack", true)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn err(&self) -> Option<&Exception> {
        self.err.as_ref()
    }

    /// Check if context has any fields or an error
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.err.is_none()
    }
}

impl From<Map<String, Value>> for LogContext {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields, err: None }
    }
}

impl From<()> for LogContext {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// Objects become fields; any other value is an empty context
impl From<Value> for LogContext {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => fields.into(),
            _ => Self::default(),
        }
    }
}

/// The context argument of a log call
#[derive(Debug, Clone, PartialEq)]
pub enum Context {
    Fields(LogContext),
    /// The whole context is an error; the record gets no extra fields from it
    Exception(Exception),
}

impl Context {
    pub fn empty() -> Self {
        Context::Fields(LogContext::new())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<()> for Context {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

impl From<LogContext> for Context {
    fn from(context: LogContext) -> Self {
        Context::Fields(context)
    }
}

impl From<Exception> for Context {
    fn from(exception: Exception) -> Self {
        Context::Exception(exception)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(fields: Map<String, Value>) -> Self {
        Context::Fields(fields.into())
    }
}

/// Objects become fields; any other value contributes nothing
impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Context::Fields(value.into())
    }
}
