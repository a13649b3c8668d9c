//! Error objects attached to log records
//!
//! An [`Exception`] is the serializable form of an error: its name, message,
//! optional code and stack, plus any extra properties the caller attached.
//! It is what ends up under the `@exception` field of a record.

use serde_json::{Map, Value};
use std::backtrace::{Backtrace, BacktraceStatus};

/// Properties that live under `@exception` and never at the top of a record
const RESERVED_PROPERTIES: [&str; 3] = ["code", "message", "stack"];

#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    pub name: String,
    pub message: String,
    pub code: Option<Value>,
    /// Raw stack text; the first line is the `name: message` header
    pub stack: Option<String>,
    pub properties: Map<String, Value>,
}

impl Exception {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            code: None,
            stack: None,
            properties: Map::new(),
        }
    }

    /// Create an exception carrying a backtrace of the current call site
    pub fn capture(message: impl Into<String>) -> Self {
        let mut exception = Self::new(message);
        let backtrace = Backtrace::force_capture();
        if backtrace.status() == BacktraceStatus::Captured {
            exception.stack = Some(format!("{}: {}\n{}", exception.name, exception.message, backtrace));
        }
        exception
    }

    /// Convert any error, recording its `source()` chain under `causes`
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut exception = Self::new(err.to_string());
        exception.name = short_type_name(std::any::type_name::<E>());

        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(Value::String(cause.to_string()));
            source = cause.source();
        }
        if !causes.is_empty() {
            exception.properties.insert("causes".to_string(), Value::Array(causes));
        }
        exception
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<Value>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach an extra property
    ///
    /// `code`, `message` and `stack` set the matching field instead.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "code" => self.code = Some(value),
            "message" => self.message = plain_text(value),
            "stack" => self.stack = Some(plain_text(value)),
            _ => {
                self.properties.insert(key, value);
            }
        }
        self
    }

    /// Stack frames without the header line, trimmed, blank lines removed
    pub fn stack_frames(&self) -> Option<Vec<String>> {
        self.stack.as_deref().map(split_frames)
    }

    /// Fields that may be hoisted to the top level of a record
    pub fn hoisted_fields(&self) -> Map<String, Value> {
        self.properties
            .iter()
            .filter(|(key, _)| !RESERVED_PROPERTIES.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Serialize every part of the exception, stack split into frames
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(code) = &self.code {
            map.insert("code".to_string(), code.clone());
        }
        // a reserved name set straight on `properties` shows when its field is empty
        for (key, value) in &self.properties {
            let shadowed = match key.as_str() {
                "code" => self.code.is_some(),
                "stack" => self.stack.is_some(),
                "message" => true,
                _ => false,
            };
            if !shadowed {
                map.insert(key.clone(), value.clone());
            }
        }
        if let Some(frames) = self.stack_frames() {
            map.insert(
                "stack".to_string(),
                Value::Array(frames.into_iter().map(Value::String).collect()),
            );
        }
        Value::Object(map)
    }
}

impl<E: std::error::Error> From<E> for Exception {
    fn from(err: E) -> Self {
        Exception::from_error(&err)
    }
}

fn plain_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Split stack text into trimmed lines, dropping the header line
pub(crate) fn split_frames(stack: &str) -> Vec<String> {
    stack
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "request failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_from_error_records_name_and_causes() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timeout"));
        let exception = Exception::from(err);

        assert_eq!(exception.name, "Outer");
        assert_eq!(exception.message, "request failed");
        assert_eq!(exception.properties["causes"], json!(["socket timeout"]));
    }

    #[test]
    fn test_stack_frames_drop_header() {
        let exception = Exception::new("boom")
            .with_stack("Error: boom\n    at handler (index.js:10:5)\n\n    at main (index.js:1:1)");

        assert_eq!(
            exception.stack_frames().unwrap(),
            vec!["at handler (index.js:10:5)", "at main (index.js:1:1)"]
        );
    }

    #[test]
    fn test_to_value_includes_all_parts() {
        let exception = Exception::new("boom")
            .with_code("E_BOOM")
            .with_property("retryable", false)
            .with_stack("Error: boom\n  at a");

        let value = exception.to_value();
        assert_eq!(value["name"], "Error");
        assert_eq!(value["message"], "boom");
        assert_eq!(value["code"], "E_BOOM");
        assert_eq!(value["retryable"], false);
        assert_eq!(value["stack"], json!(["at a"]));
    }

    #[test]
    fn test_hoisted_fields_strip_reserved() {
        let exception = Exception::new("boom")
            .with_property("message", "shadow")
            .with_property("code", 7)
            .with_property("user", "alice");

        let hoisted = exception.hoisted_fields();
        assert_eq!(hoisted.len(), 1);
        assert_eq!(hoisted["user"], "alice");
    }

    #[test]
    fn test_reserved_properties_set_fields() {
        let exception = Exception::new("boom")
            .with_property("code", 7)
            .with_property("user", "alice");

        assert_eq!(exception.code, Some(json!(7)));
        let value = exception.to_value();
        assert_eq!(value["code"], 7);
        assert_eq!(value["user"], "alice");
    }

    #[test]
    fn test_raw_reserved_property_shows_when_field_empty() {
        let mut exception = Exception::new("boom");
        exception.properties.insert("code".to_string(), json!("E1"));
        assert_eq!(exception.to_value()["code"], "E1");

        let exception = exception.with_code("E2");
        assert_eq!(exception.to_value()["code"], "E2");
    }

    #[test]
    fn test_capture_has_frames() {
        let exception = Exception::capture("here");
        if let Some(frames) = exception.stack_frames() {
            assert!(!frames.is_empty());
            assert!(!frames[0].starts_with("Error: here"));
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("std::io::error::Error"), "Error");
        assert_eq!(short_type_name("my_crate::Wrapper<alloc::string::String>"), "Wrapper");
    }
}
