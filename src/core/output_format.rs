//! Output formats for log records
//!
//! A format renders a [`Record`] to the text handed to a destination:
//! - Json: one compact JSON object (default)
//! - Human: `HH:MM:SS: CHAN: message` followed by the remaining fields
//! - Tsv: field values separated by tabs
//! - KeyValue: `key=value` pairs separated by commas
//! - Custom: any `Fn(&Record) -> String`

use super::error::{LoggerError, Result};
use super::record::{Record, CHANNEL, EXCEPTION, MESSAGE, MODULE};
use chrono::Local;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Custom renderer
pub type FormatFn = Arc<dyn Fn(&Record) -> String + Send + Sync>;

const KEYVALUE_SEPARATOR: char = ',';

/// Output format for log records
#[derive(Clone, Default)]
pub enum OutputFormat {
    /// Compact JSON (default)
    ///
    /// Example: `{"message":"Request processed","@chan":"info","@module":"app"}`
    #[default]
    Json,

    /// Human-readable text with a local wall clock
    ///
    /// Example: `10:30:45: INFO: Request processed {"user":"alice"}`
    Human,

    /// Tab separated field values
    ///
    /// Example: `Request processed\tinfo\tapp`
    Tsv,

    /// Comma separated key=value pairs
    ///
    /// Example: `message="Request processed",@chan=info,@module=app`
    KeyValue,

    Custom(FormatFn),
}

impl OutputFormat {
    /// Look up a format by name; unknown names fall back to JSON
    pub fn named(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "human" => OutputFormat::Human,
            "tsv" => OutputFormat::Tsv,
            "keyvalue" | "key-value" | "kv" => OutputFormat::KeyValue,
            _ => OutputFormat::Json,
        }
    }

    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        OutputFormat::Custom(Arc::new(render))
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
            OutputFormat::Tsv => "tsv",
            OutputFormat::KeyValue => "keyvalue",
            OutputFormat::Custom(_) => "custom",
        }
    }

    /// Render a record according to this format
    pub fn render(&self, record: &Record) -> Result<String> {
        match self {
            OutputFormat::Json => serde_json::to_string(record)
                .map_err(|e| LoggerError::formatter("json", e.to_string())),
            OutputFormat::Human => Ok(format_human(record)),
            OutputFormat::Tsv => Ok(format_tsv(record)),
            OutputFormat::KeyValue => Ok(format_keyvalue(record)),
            OutputFormat::Custom(render) => Ok(render(record)),
        }
    }
}

impl fmt::Debug for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputFormat::{}", self.name())
    }
}

impl From<&str> for OutputFormat {
    fn from(name: &str) -> Self {
        OutputFormat::named(name)
    }
}

fn format_human(record: &Record) -> String {
    let mut line = format!(
        "{}: {}: {}",
        Local::now().format("%H:%M:%S"),
        record.channel().to_uppercase(),
        record.message()
    );

    if let Some(exception) = record.exception() {
        if let Some(message) = exception.get("message").and_then(Value::as_str) {
            line.push_str(": ");
            line.push_str(message);
        }
    }

    let extra: Map<String, Value> = record
        .fields()
        .iter()
        .filter(|(key, _)| ![MESSAGE, CHANNEL, MODULE, EXCEPTION].contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if !extra.is_empty() {
        line.push(' ');
        line.push_str(&Value::Object(extra).to_string());
    }
    line
}

fn format_tsv(record: &Record) -> String {
    record
        .fields()
        .values()
        .map(|value| {
            plain_value(value)
                .replace('\t', "\\t")
                .replace('\n', "\\n")
        })
        .collect::<Vec<_>>()
        .join("\t")
}

fn format_keyvalue(record: &Record) -> String {
    record
        .fields()
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                escape_key(key),
                escape_value(&plain_value(value))
            )
        })
        .collect::<Vec<_>>()
        .join(&KEYVALUE_SEPARATOR.to_string())
}

/// Strings without quotes, everything else as compact JSON
fn plain_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keep only characters that cannot break the pair syntax
fn escape_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '@' | '.'))
        .collect()
}

/// Quote a value if it contains a separator, quote or whitespace
fn escape_value(value: &str) -> String {
    if value.is_empty()
        || value
            .chars()
            .any(|c| c == KEYVALUE_SEPARATOR || c == '"' || c == '=' || c.is_whitespace())
    {
        quote_value(value)
    } else {
        value.to_string()
    }
}

fn quote_value(value: &str) -> String {
    format!(
        "\"{}\"",
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(fields) => Record::from(fields),
            _ => panic!("record must be an object"),
        }
    }

    fn sample() -> Record {
        record(json!({
            "message": "Hello World",
            "@chan": "info",
            "@module": "app",
        }))
    }

    #[test]
    fn test_json_format() {
        let text = OutputFormat::Json.render(&sample()).unwrap();
        assert!(text.starts_with('{'));
        assert_eq!(text, r#"{"message":"Hello World","@chan":"info","@module":"app"}"#);
    }

    #[test]
    fn test_human_format() {
        let text = OutputFormat::Human.render(&sample()).unwrap();
        let (clock, rest) = text.split_at(8);
        assert!(clock.chars().filter(|c| *c == ':').count() == 2);
        assert_eq!(rest, ": INFO: Hello World");
    }

    #[test]
    fn test_human_format_with_exception_and_fields() {
        let record = record(json!({
            "message": "Boom",
            "@chan": "error",
            "@module": "app",
            "@exception": {"name": "Error", "message": "inner"},
            "weather": "sunny",
        }));
        let text = OutputFormat::Human.render(&record).unwrap();
        assert!(text.ends_with(r#": ERROR: Boom: inner {"weather":"sunny"}"#));
    }

    #[test]
    fn test_tsv_format() {
        let text = OutputFormat::Tsv.render(&sample()).unwrap();
        assert_eq!(text.split('\t').collect::<Vec<_>>(), vec!["Hello World", "info", "app"]);
    }

    #[test]
    fn test_tsv_escapes_tabs() {
        let record = record(json!({"message": "a\tb", "count": 3}));
        assert_eq!(OutputFormat::Tsv.render(&record).unwrap(), "a\\tb\t3");
    }

    #[test]
    fn test_keyvalue_format() {
        let text = OutputFormat::KeyValue.render(&sample()).unwrap();
        assert_eq!(text, r#"message="Hello World",@chan=info,@module=app"#);
        assert!(text.split(',').all(|pair| pair.contains('=')));
    }

    #[test]
    fn test_keyvalue_quotes_separators() {
        let record = record(json!({"query": "a=1,b=2", "ok": true}));
        let text = OutputFormat::KeyValue.render(&record).unwrap();
        assert_eq!(text, r#"query="a=1,b=2",ok=true"#);
    }

    #[test]
    fn test_custom_format() {
        let format = OutputFormat::custom(|_| "CUSTOM".to_string());
        assert_eq!(format.render(&sample()).unwrap(), "CUSTOM");
        assert_eq!(format.name(), "custom");
    }

    #[test]
    fn test_named_formats() {
        assert_eq!(OutputFormat::named("human").name(), "human");
        assert_eq!(OutputFormat::named("TSV").name(), "tsv");
        assert_eq!(OutputFormat::named("keyvalue").name(), "keyvalue");
        assert_eq!(OutputFormat::named("unknown").name(), "json");
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default().name(), "json");
    }
}
