//! CloudWatch embedded metric format (EMF) payloads
//!
//! A [`MetricsEvent`] describes one metrics emission: a namespace, metric
//! values, optional dimension sets, units and extra properties. The payload
//! is a single JSON object that CloudWatch extracts metrics from when it is
//! written to the function log.
//!
//! # Example
//!
//! ```
//! use rust_channel_logger::MetricsEvent;
//!
//! let event = MetricsEvent::new("Acme/Rockets")
//!     .value("sessions", 1)
//!     .unit("sessions", "Count");
//!
//! let payload = event.payload(1736332245123).unwrap();
//! assert_eq!(payload["_aws"]["CloudWatchMetrics"][0]["Namespace"], "Acme/Rockets");
//! assert_eq!(payload["sessions"], 1);
//! ```

use super::error::{LoggerError, Result};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsEvent {
    namespace: String,
    values: Map<String, Value>,
    dimensions: Vec<Vec<String>>,
    units: HashMap<String, String>,
    properties: Map<String, Value>,
}

impl MetricsEvent {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            values: Map::new(),
            dimensions: vec![Vec::new()],
            units: HashMap::new(),
            properties: Map::new(),
        }
    }

    #[must_use]
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn values(mut self, values: Map<String, Value>) -> Self {
        self.values.extend(values);
        self
    }

    /// Dimension sets; keys of the first set are reported as dimensions, not metrics
    #[must_use]
    pub fn dimensions<I, D, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions = dimensions
            .into_iter()
            .map(|set| set.into_iter().map(Into::into).collect())
            .collect();
        if self.dimensions.is_empty() {
            self.dimensions.push(Vec::new());
        }
        self
    }

    #[must_use]
    pub fn unit(mut self, metric: impl Into<String>, unit: impl Into<String>) -> Self {
        self.units.insert(metric.into(), unit.into());
        self
    }

    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(LoggerError::missing_metrics_argument("namespace"));
        }
        if self.values.is_empty() {
            return Err(LoggerError::missing_metrics_argument("values"));
        }
        Ok(())
    }

    /// Value keys that are not dimensions of the first dimension set
    pub fn metric_names(&self) -> Vec<String> {
        let dimensions = self.dimensions.first();
        self.values
            .keys()
            .filter(|key| !dimensions.is_some_and(|set| set.contains(*key)))
            .cloned()
            .collect()
    }

    /// Build the EMF object stamped with `timestamp_ms`
    pub fn payload(&self, timestamp_ms: i64) -> Result<Value> {
        self.validate()?;

        let metrics: Vec<Value> = self
            .metric_names()
            .into_iter()
            .map(|name| match self.units.get(&name) {
                Some(unit) => json!({"Name": name, "Unit": unit}),
                None => json!({"Name": name}),
            })
            .collect();

        let mut payload = Map::new();
        payload.insert(
            "_aws".to_string(),
            json!({
                "Timestamp": timestamp_ms,
                "CloudWatchMetrics": [{
                    "Dimensions": self.dimensions,
                    "Namespace": self.namespace,
                    "Metrics": metrics,
                }],
            }),
        );
        for (key, value) in &self.values {
            payload.insert(key.clone(), value.clone());
        }
        for (key, value) in &self.properties {
            payload.insert(key.clone(), value.clone());
        }
        Ok(Value::Object(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = MetricsEvent::new("Acme/Rockets")
            .value("sessions", 1)
            .payload(42)
            .unwrap();

        let text = payload.to_string();
        assert!(text.starts_with(r#"{"_aws":"#));
        assert!(text.contains(r#""Namespace":"Acme/Rockets""#));
        assert!(text.contains(r#""Name":"sessions""#));
        assert_eq!(payload["_aws"]["Timestamp"], 42);
        assert_eq!(payload["_aws"]["CloudWatchMetrics"][0]["Dimensions"], json!([[]]));
    }

    #[test]
    fn test_dimensions_are_not_metrics() {
        let event = MetricsEvent::new("Acme/Rockets")
            .value("sessions", 3)
            .value("Rocket", "saturn")
            .dimensions([["Rocket"]]);

        assert_eq!(event.metric_names(), vec!["sessions"]);
        let payload = event.payload(0).unwrap();
        assert_eq!(payload["Rocket"], "saturn");
        assert_eq!(payload["_aws"]["CloudWatchMetrics"][0]["Dimensions"], json!([["Rocket"]]));
    }

    #[test]
    fn test_units_and_properties() {
        let payload = MetricsEvent::new("Acme/Rockets")
            .value("latency", 12.5)
            .unit("latency", "Milliseconds")
            .property("requestId", "abc")
            .payload(0)
            .unwrap();

        assert_eq!(
            payload["_aws"]["CloudWatchMetrics"][0]["Metrics"],
            json!([{"Name": "latency", "Unit": "Milliseconds"}])
        );
        assert_eq!(payload["requestId"], "abc");
    }

    #[test]
    fn test_missing_arguments() {
        let err = MetricsEvent::new("").value("a", 1).validate().unwrap_err();
        assert!(matches!(err, LoggerError::MissingMetricsArgument { .. }));

        let err = MetricsEvent::new("Acme").payload(0).unwrap_err();
        assert!(err.to_string().contains("values"));
    }
}
