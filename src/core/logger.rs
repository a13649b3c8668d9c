//! Main logger implementation
//!
//! A [`Logger`] is one node of a logger tree. Every node owns its own context
//! map and shares a single state object (filters, destinations and record
//! options) with the root it was derived from, so filter changes made through
//! any node apply to the whole tree.

use super::{
    channel::{Channel, ChannelSpec},
    config::{DestinationConfig, EnvOverrides, Flags, LoggerConfig},
    destination::{Destination, FlushSelector},
    error::{LoggerError, Result},
    exception::Exception,
    filter::{FilterState, OverrideExpiry, Sample},
    log_context::{Context, LogContext, Message},
    metrics::MetricsEvent,
    output_format::OutputFormat,
    record::{resolve_channel, Record, RecordOptions, CHANNEL, MESSAGE, MODULE},
    timestamp::TimestampFormat,
    truthy::Truthy,
};
use crate::destinations;
use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};
use serde_json::{Map, Value};
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const NAMESPACE: &str = "@namespace";
pub const METRICS: &str = "@metrics";

thread_local! {
    /// Set while this thread holds the destinations lock
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Clears [`DISPATCHING`] when dropped, including during unwinding
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Self {
        DISPATCHING.with(|flag| flag.set(true));
        DispatchGuard
    }

    fn active() -> bool {
        DISPATCHING.with(Cell::get)
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

struct DestinationEntry {
    destination: Box<dyn Destination>,
    /// `None` renders with the tree-wide format
    format: Option<OutputFormat>,
}

impl From<DestinationConfig> for DestinationEntry {
    fn from(config: DestinationConfig) -> Self {
        Self {
            destination: config.destination,
            format: config.format,
        }
    }
}

/// State shared by every node of a logger tree
struct SharedState {
    filters: Mutex<FilterState>,
    destinations: Mutex<Vec<DestinationEntry>>,
    options: RecordOptions,
    format: OutputFormat,
}

/// A node of a logger tree
///
/// Cloning a logger clones its context and shares the tree state, which is
/// the same as calling [`Logger::child`] without extra context.
#[derive(Clone)]
pub struct Logger {
    context: Map<String, Value>,
    top: Arc<SharedState>,
}

macro_rules! channel_methods {
    ($($chan:ident => $name:ident, $with_context:ident;)*) => {
        $(
            #[doc = concat!("Log on the `", stringify!($name), "` channel")]
            #[inline]
            pub fn $name(&self, message: impl Into<Message>) -> Result<()> {
                self.emit(Channel::$chan, message, Context::empty())
            }

            #[doc = concat!("Log on the `", stringify!($name), "` channel with call context")]
            #[inline]
            pub fn $with_context(
                &self,
                message: impl Into<Message>,
                context: impl Into<Context>,
            ) -> Result<()> {
                self.emit(Channel::$chan, message, context)
            }
        )*
    };
}

impl Logger {
    /// Build a root logger from a resolved configuration
    ///
    /// The static filter is applied after the configured overrides and
    /// samples, and then remembered as the set `"default"` refers to.
    #[must_use]
    pub fn new(config: LoggerConfig) -> Self {
        let mut filters = FilterState::new();
        for (channels, rate) in config.samples {
            filters.set_sample(channels, rate);
        }
        for (channels, expiry) in config.overrides {
            filters.set_override(channels, expiry);
        }
        filters.set_filter(config.filter);
        filters.capture_default_filter();

        let mut entries: Vec<DestinationEntry> =
            config.destinations.into_iter().map(Into::into).collect();
        if entries.is_empty() {
            entries.push(DestinationEntry {
                destination: destinations::named("json"),
                format: None,
            });
        }

        let options = RecordOptions {
            name: config.name,
            timestamp: config.timestamp.then_some(config.timestamp_format),
            flags: config.flags,
            redact: config.redact,
        };

        Self {
            context: Map::new(),
            top: Arc::new(SharedState {
                filters: Mutex::new(filters),
                destinations: Mutex::new(entries),
                options,
                format: config.format,
            }),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_channel_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .name("orders")
    ///     .filter("error,info")
    ///     .destination_name("capture")
    ///     .build();
    ///
    /// logger.info("Hello World").unwrap();
    /// assert_eq!(logger.flush().unwrap().len(), 1);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Module name stamped as the default `@module`
    pub fn name(&self) -> &str {
        &self.top.options.name
    }

    pub fn add_filter(&self, channels: impl Into<ChannelSpec>) {
        self.top.filters.lock().add_filter(channels);
    }

    pub fn set_filter(&self, channels: impl Into<ChannelSpec>) {
        self.top.filters.lock().set_filter(channels);
    }

    pub fn get_filter(&self) -> Vec<String> {
        self.top.filters.lock().filter().to_vec()
    }

    /// Force channels open until `expiry`; `None` expires immediately
    pub fn set_override(&self, channels: impl Into<ChannelSpec>, expiry: Option<OverrideExpiry>) {
        self.top.filters.lock().set_override(channels, expiry);
    }

    pub fn get_override(&self) -> HashMap<String, Option<OverrideExpiry>> {
        self.top.filters.lock().overrides().clone()
    }

    /// Open channels for `rate_percent` of their calls; zero disables
    pub fn set_sample(&self, channels: impl Into<ChannelSpec>, rate_percent: f64) {
        self.top.filters.lock().set_sample(channels, rate_percent);
    }

    pub fn get_sample(&self) -> HashMap<String, Option<Sample>> {
        self.top.filters.lock().samples().clone()
    }

    /// Gate decision for one call on `channel`
    ///
    /// Advances the channel's sample counter, so call it once per attempt.
    pub fn enabled(&self, channel: impl AsRef<str>) -> bool {
        self.top.filters.lock().enabled(channel.as_ref())
    }

    pub fn enabled_weighted(&self, channel: impl AsRef<str>, weight: u32) -> bool {
        self.top
            .filters
            .lock()
            .enabled_weighted(channel.as_ref(), weight)
    }

    /// Add a destination; `None` renders with the tree-wide format
    pub fn add_destination<D>(&self, destination: D, format: Option<OutputFormat>)
    where
        D: Destination + 'static,
    {
        if DispatchGuard::active() {
            eprintln!("[LOGGER WARNING] Ignoring add_destination from inside a destination");
            return;
        }
        self.top.destinations.lock().push(DestinationEntry {
            destination: Box::new(destination),
            format,
        });
    }

    /// Replace all destinations with `destination`
    pub fn set_destination<D>(&self, destination: D, format: Option<OutputFormat>)
    where
        D: Destination + 'static,
    {
        if DispatchGuard::active() {
            eprintln!("[LOGGER WARNING] Ignoring set_destination from inside a destination");
            return;
        }
        let mut destinations = self.top.destinations.lock();
        destinations.clear();
        destinations.push(DestinationEntry {
            destination: Box::new(destination),
            format,
        });
    }

    /// Derive a node that shares this tree's state
    ///
    /// The child starts with a copy of this node's context, overlaid with
    /// `context`. Later changes to either context are not seen by the other.
    #[must_use]
    pub fn child(&self, context: impl Into<LogContext>) -> Logger {
        let mut child = self.clone();
        child.add_context(context);
        child
    }

    /// Merge fields into this node's context; new keys win
    ///
    /// An `err` on the context is kept as a plain `err` field holding the
    /// serialized exception. Only a call's own `err` becomes `@exception`.
    pub fn add_context(&mut self, context: impl Into<LogContext>) {
        let LogContext { fields, err } = context.into();
        self.context.extend(fields);
        if let Some(err) = err {
            self.context.insert("err".to_string(), err.to_value());
        }
    }

    /// Merge several contexts in order
    pub fn add_contexts<I, C>(&mut self, contexts: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<LogContext>,
    {
        for context in contexts {
            self.add_context(context);
        }
    }

    /// Drop this node's context; ancestors and siblings are unaffected
    pub fn clear_context(&mut self) {
        self.context.clear();
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Log on any channel
    ///
    /// A `@chan` string in the context replaces `channel` for both the gate
    /// decision and the record. Returns the first destination error.
    pub fn emit(
        &self,
        channel: impl AsRef<str>,
        message: impl Into<Message>,
        context: impl Into<Context>,
    ) -> Result<()> {
        let context = context.into();
        let channel = resolve_channel(channel.as_ref(), &context).to_string();
        if !self.enabled(&channel) {
            return Ok(());
        }
        self.process(&channel, message.into(), context)
    }

    channel_methods! {
        Data => data, data_with_context;
        Debug => debug, debug_with_context;
        Error => error, error_with_context;
        Fatal => fatal, fatal_with_context;
        Info => info, info_with_context;
        Trace => trace, trace_with_context;
        Warn => warn, warn_with_context;
    }

    /// Log on the `assert` channel when `condition` is falsy
    ///
    /// The message is `"Assert failed"`, or `"Assert failed: <message>"`.
    pub fn assert(
        &self,
        condition: impl Truthy,
        message: Option<&str>,
        context: impl Into<Context>,
    ) -> Result<()> {
        if condition.is_truthy() {
            return Ok(());
        }
        let message = match message {
            Some(message) if !message.is_empty() => format!("Assert failed: {}", message),
            _ => "Assert failed".to_string(),
        };
        self.emit(Channel::Assert, message, context)
    }

    /// Emit a CloudWatch EMF metrics payload on `channel`
    ///
    /// The payload is written as-is to every destination, bypassing the
    /// format and the redact hook. Fails with `MissingMetricsArgument` when
    /// the event has no namespace or no values.
    pub fn metrics(
        &self,
        channel: impl AsRef<str>,
        message: &str,
        event: &MetricsEvent,
    ) -> Result<()> {
        let channel = channel.as_ref();
        if !self.enabled(channel) {
            return Ok(());
        }
        let payload = event.payload(Utc::now().timestamp_millis())?.to_string();

        let mut record = Record::new();
        record.insert(MESSAGE, format!("{} {}", message, payload));
        record.insert(CHANNEL, channel);
        record.insert(MODULE, self.name());
        record.insert(NAMESPACE, event.namespace());
        record.insert(METRICS, event.metric_names());

        let (mut destinations, _guard) = self.lock_destinations()?;
        for entry in destinations.iter_mut() {
            entry.destination.write(&record, &payload)?;
        }
        Ok(())
    }

    /// Drain buffered records from every destination
    pub fn flush(&self) -> Result<Vec<Value>> {
        self.flush_as(FlushSelector::Records)
    }

    /// Drain buffered output, concatenated in destination order
    pub fn flush_as(&self, what: impl Into<FlushSelector>) -> Result<Vec<Value>> {
        let what = what.into();
        let mut flushed = Vec::new();
        let (mut destinations, _guard) = self.lock_destinations()?;
        for entry in destinations.iter_mut() {
            flushed.extend(entry.destination.flush(what)?);
        }
        Ok(flushed)
    }

    /// Log panics on the `error` channel before the previous panic hook runs
    pub fn install_panic_hook(&self) {
        let logger = self.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            // a destination panicked mid-write; its lock is still held
            if DispatchGuard::active() {
                eprintln!("[LOGGER WARNING] Panic inside a destination: {}", info);
                previous(info);
                return;
            }
            let exception = Exception::new(info.to_string()).with_name("Panic");
            if let Err(e) = logger.error_with_context("Uncaught exception", exception) {
                eprintln!("[LOGGER WARNING] Failed to log panic: {}", e);
            }
            previous(info);
        }));
    }

    fn process(&self, channel: &str, message: Message, context: Context) -> Result<()> {
        let Some(record) = self
            .top
            .options
            .prepare(&self.context, channel, message, context)?
        else {
            return Ok(());
        };
        self.dispatch(&record)
    }

    /// Lock the destination list for one pass over it
    ///
    /// A destination that logs through its own tree would wait on the lock
    /// it is called under, so that case is an error instead.
    fn lock_destinations(&self) -> Result<(MutexGuard<'_, Vec<DestinationEntry>>, DispatchGuard)> {
        if DispatchGuard::active() {
            return Err(LoggerError::destination(
                "logger",
                "log call made from inside a destination",
            ));
        }
        Ok((self.top.destinations.lock(), DispatchGuard::enter()))
    }

    fn dispatch(&self, record: &Record) -> Result<()> {
        let (mut destinations, _guard) = self.lock_destinations()?;
        for entry in destinations.iter_mut() {
            let text = entry
                .format
                .as_ref()
                .unwrap_or(&self.top.format)
                .render(record)?;
            entry.destination.write(record, &text)?;
        }
        Ok(())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.top.options.name)
            .field("context", &self.context)
            .field("filters", &*self.top.filters.lock())
            .field("format", &self.top.format)
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_channel_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .name("checkout")
///     .filter("default")
///     .flag("FLAG_ERROR")
///     .format("keyvalue")
///     .timestamp(true)
///     .destination_name("capture")
///     .build();
///
/// logger.error("Payment declined").unwrap();
/// let text = logger.flush_as(FlushSelector::Messages).unwrap();
/// assert!(text[0].as_str().unwrap().contains("FLAG_ERROR=true"));
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    env: Option<EnvOverrides>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            env: None,
        }
    }

    /// Default `@module` value (`"app"` if unset)
    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Initial static filter
    #[must_use = "builder methods return a new value"]
    pub fn filter(mut self, channels: impl Into<ChannelSpec>) -> Self {
        self.config.filter = channels.into();
        self
    }

    /// Boolean field set on records of flagged channels
    #[must_use = "builder methods return a new value"]
    pub fn flag(mut self, flags: impl Into<Flags>) -> Self {
        self.config.flags = flags.into();
        self
    }

    /// Tree-wide output format; names that are not recognized mean JSON
    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: impl Into<OutputFormat>) -> Self {
        self.config.format = format.into();
        self
    }

    /// Stamp every record with a `timestamp` field
    #[must_use = "builder methods return a new value"]
    pub fn timestamp(mut self, enabled: bool) -> Self {
        self.config.timestamp = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    /// Rewrite records before dispatch; returning `None` drops the record
    #[must_use = "builder methods return a new value"]
    pub fn redact<F>(mut self, redact: F) -> Self
    where
        F: Fn(Record) -> Option<Record> + Send + Sync + 'static,
    {
        self.config.redact = Some(Arc::new(redact));
        self
    }

    /// Add a destination rendered with the tree-wide format
    #[must_use = "builder methods return a new value"]
    pub fn destination<D: Destination + 'static>(self, destination: D) -> Self {
        self.destination_with_format(destination, None)
    }

    #[must_use = "builder methods return a new value"]
    pub fn destination_with_format<D: Destination + 'static>(
        mut self,
        destination: D,
        format: Option<OutputFormat>,
    ) -> Self {
        self.config.destinations.push(DestinationConfig {
            destination: Box::new(destination),
            format,
        });
        self
    }

    /// Add a built-in destination: `json`, `stdout`, `console` or `capture`
    #[must_use = "builder methods return a new value"]
    pub fn destination_name(mut self, name: &str) -> Self {
        self.config.destinations.push(DestinationConfig {
            destination: destinations::named(name),
            format: None,
        });
        self
    }

    /// Initial override, applied before the static filter
    #[must_use = "builder methods return a new value"]
    pub fn override_channels(
        mut self,
        channels: impl Into<ChannelSpec>,
        expiry: Option<OverrideExpiry>,
    ) -> Self {
        self.config.overrides.push((channels.into(), expiry));
        self
    }

    /// Initial sample rate, applied before the static filter
    #[must_use = "builder methods return a new value"]
    pub fn sample_channels(mut self, channels: impl Into<ChannelSpec>, rate_percent: f64) -> Self {
        self.config.samples.push((channels.into(), rate_percent));
        self
    }

    /// Apply `LOG_FILTER`, `LOG_OVERRIDE` and `LOG_SAMPLE` from the process environment
    #[must_use = "builder methods return a new value"]
    pub fn with_env(self) -> Self {
        self.env(EnvOverrides::from_env())
    }

    /// Apply already parsed environment settings
    #[must_use = "builder methods return a new value"]
    pub fn env(mut self, env: EnvOverrides) -> Self {
        self.env = Some(env);
        self
    }

    /// The configuration `build` would use
    pub fn into_config(self) -> LoggerConfig {
        let mut config = self.config;
        if let Some(env) = self.env {
            env.apply(&mut config);
        }
        config
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger::new(self.into_config())
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
