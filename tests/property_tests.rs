//! Property-based tests for rust_channel_logger using proptest

use proptest::prelude::*;
use rust_channel_logger::prelude::*;
use serde_json::{json, Value};

fn silent_logger() -> Logger {
    Logger::builder().filter("").destination_name("capture").build()
}

fn channel_name() -> impl Strategy<Value = String> {
    "[a-z]{3,10}".prop_filter("not a default channel", |chan| {
        !DEFAULT_FILTER.contains(&chan.as_str()) && chan != "default"
    })
}

// ============================================================================
// Channel list parsing
// ============================================================================

proptest! {
    /// Padding and empty entries never change the parsed list
    #[test]
    fn test_channel_list_trims_and_drops_empty(
        names in prop::collection::vec("[a-z]{1,8}", 1..6),
        padding in " {0,3}",
    ) {
        let list = names
            .iter()
            .map(|name| format!("{padding}{name}{padding}"))
            .collect::<Vec<_>>()
            .join(",,");

        prop_assert_eq!(ChannelSpec::parse_list(&list), names);
    }

    /// A channel name survives a string round trip through `Channel`
    #[test]
    fn test_channel_name_roundtrip(name in "[a-z]{1,12}") {
        let channel = Channel::from(name.as_str());
        prop_assert_eq!(channel.as_str(), name.as_str());
    }
}

// ============================================================================
// Gating
// ============================================================================

proptest! {
    /// Channels outside the default filter produce nothing
    #[test]
    fn test_unconfigured_channel_is_closed(channel in channel_name()) {
        let logger = Logger::builder().destination_name("capture").build();
        prop_assert!(!logger.enabled(&channel));

        logger.emit(&channel, "dropped", ()).unwrap();
        prop_assert!(logger.flush().unwrap().is_empty());
    }

    /// Setting the same filter twice leaves the same state
    #[test]
    fn test_set_filter_is_idempotent(names in prop::collection::vec(channel_name(), 0..6)) {
        let list = names.join(",");
        let logger = silent_logger();

        logger.set_filter(list.as_str());
        let first = logger.get_filter();
        logger.set_filter(list.as_str());
        prop_assert_eq!(&logger.get_filter(), &first);

        let mut unique = names.clone();
        unique.dedup();
        prop_assert!(first.len() <= unique.len());
        for name in &names {
            prop_assert!(first.contains(name));
        }
    }

    /// A channel sampled at R percent opens once every ceil(100 / R) checks
    #[test]
    fn test_sample_opens_once_per_period(rate in 1u32..=100, periods in 1usize..4) {
        let logger = silent_logger();
        logger.set_sample("probe", f64::from(rate));

        let period = (100.0 / f64::from(rate)).ceil() as usize;
        let opened: Vec<usize> = (1..=period * periods)
            .filter(|_| logger.enabled("probe"))
            .collect();

        let expected: Vec<usize> = (1..=periods).map(|n| n * period).collect();
        prop_assert_eq!(opened, expected);
        prop_assert_eq!(logger.get_sample()["probe"].unwrap().count, 0);
    }

    /// An unexpired override opens the channel regardless of its sample
    #[test]
    fn test_override_beats_sample(rate in 0.0f64..=100.0, checks in 1usize..20) {
        let logger = silent_logger();
        logger.set_sample("probe", rate);
        logger.set_override("probe", Some(OverrideExpiry::Indefinite));

        for _ in 0..checks {
            prop_assert!(logger.enabled("probe"));
        }
    }
}

// ============================================================================
// Records
// ============================================================================

proptest! {
    /// Non-string messages are stored as their compact JSON text
    #[test]
    fn test_value_message_stringified(number in any::<i64>(), flag in any::<bool>(), text in ".*") {
        let logger = Logger::builder().destination_name("capture").build();
        let values = [json!(number), json!({"n": number, "ok": flag}), json!([text.clone()])];

        for value in &values {
            logger.info(value.clone()).unwrap();
        }
        logger.info(Value::String(text.clone())).unwrap();

        let records = logger.flush().unwrap();
        for (record, value) in records.iter().zip(&values) {
            prop_assert_eq!(&record["message"], &Value::String(value.to_string()));
        }
        prop_assert_eq!(&records[3]["message"], &Value::String(text));
    }

    /// The call context wins over the logger context for shared keys
    #[test]
    fn test_call_context_wins(
        key in "k_[a-z]{1,8}",
        base in any::<i32>(),
        local in any::<i32>(),
    ) {
        let mut logger = Logger::builder().destination_name("capture").build();
        logger.add_context(json!({ key.clone(): base, "kept": true }));

        logger.info_with_context("m", json!({ key.clone(): local })).unwrap();

        let records = logger.flush().unwrap();
        prop_assert_eq!(&records[0][key.as_str()], &json!(local));
        prop_assert_eq!(&records[0]["kept"], &json!(true));
        prop_assert_eq!(&records[0]["message"], &json!("m"));
    }

    /// Line-oriented formats never split a record across lines
    #[test]
    fn test_line_formats_stay_on_one_line(message in ".*", extra in ".*") {
        let mut record = Record::new();
        record.insert("message", message);
        record.insert("@chan", "info");
        record.insert("extra", extra);

        for format in [OutputFormat::Tsv, OutputFormat::KeyValue, OutputFormat::Json] {
            let text = format.render(&record).unwrap();
            prop_assert!(!text.contains('\n'), "{} output spans lines: {:?}", format.name(), text);
        }
    }
}

// ============================================================================
// Assertions
// ============================================================================

proptest! {
    /// Truthy conditions never log, falsy ones always do
    #[test]
    fn test_assert_follows_truthiness(number in any::<i64>(), text in "[a-z]{0,6}") {
        let logger = Logger::builder().filter("assert").destination_name("capture").build();

        logger.assert(number, None, ()).unwrap();
        logger.assert(text.as_str(), Some("text"), ()).unwrap();

        let expected = usize::from(number == 0) + usize::from(text.is_empty() || text == "false");
        prop_assert_eq!(logger.flush().unwrap().len(), expected);
    }
}
