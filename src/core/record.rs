//! Log records and the normalizer that builds them
//!
//! A [`Record`] is the flat field map handed to formats and destinations.
//! [`RecordOptions::prepare`] turns one log call (channel, message, context)
//! into a record: it pulls exceptions out of the message or context, coerces
//! the message to a string, stamps channel/module/timestamp/flag fields and
//! merges the result over the logger's accumulated context.

use super::config::Flags;
use super::error::Result;
use super::exception::{split_frames, Exception};
use super::log_context::{Context, Message};
use super::timestamp::TimestampFormat;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::Arc;

pub const MESSAGE: &str = "message";
pub const CHANNEL: &str = "@chan";
pub const MODULE: &str = "@module";
pub const EXCEPTION: &str = "@exception";
pub const STACK: &str = "@stack";
pub const ORIGINAL_MESSAGE: &str = "@message";
pub const TIMESTAMP: &str = "timestamp";

/// Redaction hook; returning `None` suppresses the record
pub type RedactFn = Arc<dyn Fn(Record) -> Option<Record> + Send + Sync>;

/// A normalized log record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message text; always present on records built by the logger
    pub fn message(&self) -> &str {
        self.get_str(MESSAGE).unwrap_or_default()
    }

    pub fn channel(&self) -> &str {
        self.get_str(CHANNEL).unwrap_or_default()
    }

    pub fn module(&self) -> &str {
        self.get_str(MODULE).unwrap_or_default()
    }

    pub fn exception(&self) -> Option<&Value> {
        self.fields.get(EXCEPTION)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// The channel a call is gated and recorded on
///
/// An explicit `@chan` string in the context takes precedence over the
/// channel the call was made on.
pub fn resolve_channel<'a>(channel: &'a str, context: &'a Context) -> &'a str {
    match context {
        Context::Fields(ctx) => ctx.fields.get(CHANNEL).and_then(Value::as_str).unwrap_or(channel),
        Context::Exception(_) => channel,
    }
}

/// Tree-wide settings that shape every record
#[derive(Clone, Default)]
pub struct RecordOptions {
    /// Default `@module` value
    pub name: String,
    pub timestamp: Option<TimestampFormat>,
    pub flags: Flags,
    pub redact: Option<RedactFn>,
}

impl std::fmt::Debug for RecordOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordOptions")
            .field("name", &self.name)
            .field("timestamp", &self.timestamp)
            .field("flags", &self.flags)
            .field("redact", &self.redact.is_some())
            .finish()
    }
}

impl RecordOptions {
    /// Build the record for a call that already passed the gate
    ///
    /// `base` is the calling node's accumulated context; per-call fields are
    /// merged over it. Returns `None` when the redact hook vetoes the record,
    /// and an error when the timestamp cannot be rendered.
    pub fn prepare(
        &self,
        base: &Map<String, Value>,
        channel: &str,
        message: Message,
        context: Context,
    ) -> Result<Option<Record>> {
        let (mut local, context_exception, err) = match context {
            Context::Exception(exception) => (Map::new(), Some(exception), None),
            Context::Fields(ctx) => (ctx.fields, None, ctx.err),
        };

        let mut text = message.to_text();
        let exception = match (context_exception, message) {
            (Some(exception), _) => Some(exception),
            (None, Message::Exception(exception)) => {
                if let Some(err) = err {
                    local.insert("err".to_string(), err.to_value());
                }
                Some(exception)
            }
            (None, _) => err.map(|err| {
                if local.is_empty() {
                    local = err.hoisted_fields();
                }
                err
            }),
        };

        local.insert(CHANNEL.to_string(), Value::String(channel.to_string()));
        if !local.get(MODULE).is_some_and(is_set) {
            local.insert(MODULE.to_string(), Value::String(self.name.clone()));
        }
        if let Some(format) = &self.timestamp {
            local.insert(TIMESTAMP.to_string(), format.to_value(&Utc::now())?);
        }
        if local.get(STACK) == Some(&Value::Bool(true)) {
            match capture_stack() {
                Some(frames) => local.insert(STACK.to_string(), frames),
                None => local.remove(STACK),
            };
        }
        if let Some(original) = local.get(MESSAGE).filter(|m| is_set(m)).cloned() {
            local.insert(ORIGINAL_MESSAGE.to_string(), original);
        }
        if let Some(exception) = &exception {
            local.insert(EXCEPTION.to_string(), exception.to_value());
            if text.is_empty() {
                text = exception.message.clone();
            }
        }
        local.insert(MESSAGE.to_string(), Value::String(text));
        if let Some(field) = self.flags.field_for(channel) {
            local.insert(field.to_string(), Value::Bool(true));
        }

        // `message` leads; the node's context goes under the call's fields
        let mut fields = Map::with_capacity(base.len() + local.len());
        if let Some(message) = local.get(MESSAGE) {
            fields.insert(MESSAGE.to_string(), message.clone());
        }
        fields.extend(base.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields.extend(local);
        let record = Record::from(fields);

        Ok(match &self.redact {
            Some(redact) => redact(record),
            None => Some(record),
        })
    }
}

/// Truthiness of a caller-supplied field
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Call-site stack as frame lines, or `None` if it cannot be captured
fn capture_stack() -> Option<Value> {
    let backtrace = Backtrace::force_capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return None;
    }
    let frames = split_frames(&format!("stack\n{}", backtrace));
    if frames.is_empty() {
        return None;
    }
    Some(Value::Array(frames.into_iter().map(Value::String).collect()))
}
