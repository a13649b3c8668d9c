//! Channel gating: static filter, time-bounded overrides and 1-in-N sampling
//!
//! A channel is open for a given call when, checked in this order:
//!
//! 1. it is in the static filter,
//! 2. it has an unexpired override,
//! 3. its sample counter reaches the sample total.
//!
//! Sampling is deterministic: a rate of `R` percent opens the channel once
//! every `100 / R` checks. The counter advances even when the check closes
//! the channel, so every gated call must consult the gate exactly once.
//!
//! # Example
//!
//! ```
//! use rust_channel_logger::FilterState;
//!
//! let mut state = FilterState::new();
//! state.set_sample("info", 50.0);
//!
//! assert!(!state.enabled("info"));
//! assert!(state.enabled("info"));
//! assert!(!state.enabled("debug"));
//! ```

use super::channel::{ChannelSpec, DEFAULT_FILTER};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// When an override stops forcing its channel open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideExpiry {
    Until(DateTime<Utc>),
    Indefinite,
}

impl OverrideExpiry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            OverrideExpiry::Until(expiry) => *expiry < now,
            OverrideExpiry::Indefinite => false,
        }
    }
}

impl From<DateTime<Utc>> for OverrideExpiry {
    fn from(expiry: DateTime<Utc>) -> Self {
        OverrideExpiry::Until(expiry)
    }
}

/// Running 1-in-N counter for a sampled channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub count: u64,
    /// `100 / rate_percent`
    pub total: f64,
}

impl Sample {
    /// Create a counter for a rate in (0, 100]
    pub fn with_rate(rate_percent: f64) -> Self {
        Self {
            count: 0,
            total: 100.0 / rate_percent,
        }
    }

    /// Advance the counter and report whether this check opens the channel
    fn advance(&mut self, weight: u32) -> bool {
        self.count += u64::from(weight);
        if (self.count as f64) < self.total {
            return false;
        }
        self.count = 0;
        true
    }
}

/// Gating structures shared by every node of a logger tree
#[derive(Debug, Clone)]
pub struct FilterState {
    filter: Vec<String>,
    default_filter: Vec<String>,
    overrides: HashMap<String, Option<OverrideExpiry>>,
    samples: HashMap<String, Option<Sample>>,
}

impl FilterState {
    /// Create an empty state; `"default"` resolves to [`DEFAULT_FILTER`]
    pub fn new() -> Self {
        Self {
            filter: Vec::new(),
            default_filter: DEFAULT_FILTER.iter().map(|c| c.to_string()).collect(),
            overrides: HashMap::new(),
            samples: HashMap::new(),
        }
    }

    /// Remember the current static filter as the set `"default"` restores
    pub fn capture_default_filter(&mut self) {
        self.default_filter = self.filter.clone();
    }

    pub fn default_filter(&self) -> &[String] {
        &self.default_filter
    }

    /// Gate decision with a weight of one
    pub fn enabled(&mut self, channel: &str) -> bool {
        self.enabled_weighted(channel, 1)
    }

    /// Gate decision; advances the channel's sample counter by `weight`
    pub fn enabled_weighted(&mut self, channel: &str, weight: u32) -> bool {
        if self.filter.iter().any(|chan| chan == channel) {
            return true;
        }
        self.enabled_with_clock(channel, weight, Utc::now())
    }

    fn enabled_with_clock(&mut self, channel: &str, weight: u32, now: DateTime<Utc>) -> bool {
        if let Some(entry) = self.overrides.get_mut(channel) {
            if let Some(expiry) = *entry {
                if !expiry.is_expired(now) {
                    return true;
                }
                *entry = None;
            }
        }
        match self.samples.get_mut(channel) {
            Some(Some(sample)) => sample.advance(weight),
            _ => false,
        }
    }

    /// Union channels into the static filter
    pub fn add_filter(&mut self, spec: impl Into<ChannelSpec>) {
        let Some(channels) = spec.into().resolve(&self.default_filter) else {
            return;
        };
        for chan in channels {
            if !self.filter.contains(&chan) {
                self.filter.push(chan);
            }
        }
    }

    /// Replace the static filter wholesale; `Clear` empties it
    pub fn set_filter(&mut self, spec: impl Into<ChannelSpec>) {
        self.filter.clear();
        self.add_filter(spec);
    }

    pub fn filter(&self) -> &[String] {
        &self.filter
    }

    /// Force channels open until `expiry`
    ///
    /// A missing expiry means "now", so the override lapses on the first
    /// check that happens after this call. `Clear` removes all overrides.
    pub fn set_override(&mut self, spec: impl Into<ChannelSpec>, expiry: Option<OverrideExpiry>) {
        let Some(channels) = spec.into().resolve(&self.default_filter) else {
            self.overrides.clear();
            return;
        };
        let expiry = expiry.unwrap_or_else(|| OverrideExpiry::Until(Utc::now()));
        for chan in channels {
            self.overrides.insert(chan, Some(expiry));
        }
    }

    pub fn overrides(&self) -> &HashMap<String, Option<OverrideExpiry>> {
        &self.overrides
    }

    /// Sample channels at `rate_percent`, clamped to [0, 100]
    ///
    /// A rate of zero records an explicit `None`, which disables a channel
    /// that was previously sampled. `Clear` removes all samples.
    pub fn set_sample(&mut self, spec: impl Into<ChannelSpec>, rate_percent: f64) {
        let Some(channels) = spec.into().resolve(&self.default_filter) else {
            self.samples.clear();
            return;
        };
        let rate = if rate_percent.is_nan() {
            0.0
        } else {
            rate_percent.clamp(0.0, 100.0)
        };
        let sample = (rate > 0.0).then(|| Sample::with_rate(rate));
        for chan in channels {
            self.samples.insert(chan, sample);
        }
    }

    pub fn samples(&self) -> &HashMap<String, Option<Sample>> {
        &self.samples
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_closed_without_configuration() {
        let mut state = FilterState::new();
        for _ in 0..10 {
            assert!(!state.enabled("info"));
        }
    }

    #[test]
    fn test_static_filter_opens_without_mutation() {
        let mut state = FilterState::new();
        state.set_filter("error");
        state.set_sample("error", 10.0);

        assert!(state.enabled("error"));
        assert!(state.enabled("error"));
        // The sample counter is never consulted for statically enabled channels
        assert_eq!(state.samples()["error"].unwrap().count, 0);
    }

    #[test]
    fn test_set_filter_default() {
        let mut state = FilterState::new();
        state.set_filter(None::<&str>);
        assert!(state.filter().is_empty());

        state.set_filter("default");
        assert_eq!(state.filter(), DEFAULT_FILTER);
    }

    #[test]
    fn test_captured_default_filter() {
        let mut state = FilterState::new();
        state.set_filter("error,custom");
        state.capture_default_filter();

        state.set_filter("info");
        state.set_filter("default");
        assert_eq!(state.filter(), ["error", "custom"]);
    }

    #[test]
    fn test_add_filter_ignores_empty_and_duplicates() {
        let mut state = FilterState::new();
        state.set_filter("default");
        state.add_filter(None::<&str>);
        state.add_filter(Vec::<String>::new());
        state.add_filter(vec![""]);
        state.add_filter("info");
        assert_eq!(state.filter(), DEFAULT_FILTER);
    }

    #[test]
    fn test_set_filter_idempotent() {
        let mut once = FilterState::new();
        once.set_filter("error,info");

        let mut twice = FilterState::new();
        twice.set_filter("error,info");
        twice.set_filter("error,info");

        assert_eq!(once.filter(), twice.filter());
    }

    #[test]
    fn test_override_future_and_expired() {
        let mut state = FilterState::new();
        let now = Utc::now();

        state.set_override("error", Some((now + Duration::seconds(60)).into()));
        assert!(state.enabled("error"));
        assert!(!state.enabled("info"));

        state.set_override("error", Some((now - Duration::milliseconds(1)).into()));
        assert!(!state.enabled("error"));
        // Expired entries are lazily cleared but remain visible
        assert_eq!(state.overrides().get("error"), Some(&None));
    }

    #[test]
    fn test_override_expires_with_clock() {
        let mut state = FilterState::new();
        let now = Utc::now();
        state.set_override("debug", Some((now + Duration::seconds(30)).into()));

        assert!(state.enabled_with_clock("debug", 1, now));
        assert!(!state.enabled_with_clock("debug", 1, now + Duration::seconds(31)));
        assert_eq!(state.overrides().get("debug"), Some(&None));
    }

    #[test]
    fn test_override_falls_back_to_sample() {
        let mut state = FilterState::new();
        let now = Utc::now();
        state.set_sample("info", 100.0);
        state.set_override("info", Some((now - Duration::seconds(1)).into()));

        assert!(state.enabled("info"));
    }

    #[test]
    fn test_override_indefinite() {
        let mut state = FilterState::new();
        state.set_override("trace", Some(OverrideExpiry::Indefinite));
        let later = Utc::now() + Duration::days(365);
        assert!(state.enabled_with_clock("trace", 1, later));
    }

    #[test]
    fn test_override_without_expiry_lapses() {
        let mut state = FilterState::new();
        state.set_override("error", None);
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(!state.enabled("error"));
    }

    #[test]
    fn test_clear_overrides() {
        let mut state = FilterState::new();
        state.set_override("error", Some(OverrideExpiry::Indefinite));
        state.set_override(None::<&str>, None);
        assert!(state.overrides().is_empty());
        assert!(!state.enabled("error"));
    }

    #[test]
    fn test_sample_one_in_n() {
        let mut state = FilterState::new();
        state.set_sample("info", 10.0);

        let opened = (0..10).filter(|_| state.enabled("info")).count();
        assert_eq!(opened, 1);
        assert_eq!(state.samples()["info"].unwrap().count, 0);
    }

    #[test]
    fn test_sample_rate_bounds() {
        let mut state = FilterState::new();
        state.set_sample("info", 101.0);
        assert_eq!(state.samples()["info"].unwrap().total, 1.0);
        assert!(state.enabled("info"));

        state.set_sample("info", 0.0);
        assert_eq!(state.samples().get("info"), Some(&None));
        assert!(!state.enabled("info"));

        state.set_sample("info", -5.0);
        assert_eq!(state.samples().get("info"), Some(&None));
    }

    #[test]
    fn test_sample_weight() {
        let mut state = FilterState::new();
        state.set_sample("data", 25.0);
        assert!(!state.enabled_weighted("data", 3));
        assert!(state.enabled_weighted("data", 1));
    }

    #[test]
    fn test_clear_samples() {
        let mut state = FilterState::new();
        state.set_sample(["error", "info"], 100.0);
        assert_eq!(state.samples().len(), 2);

        state.set_sample(None::<&str>, 100.0);
        assert!(state.samples().is_empty());
    }
}
