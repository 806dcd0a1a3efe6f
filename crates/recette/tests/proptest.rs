//! Property-based tests for the derived fields and the record transforms.

use proptest::prelude::*;
use recette::generators::CHARTS;
use recette::{
    default_record, extract, migrate, percent, populate_str, DefectSummary, Record,
};
use serde_json::{json, Value};

// ============================================================================
// Strategies
// ============================================================================

fn field_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("project_name".to_string()),
        Just("sprint".to_string()),
        Just("package_version".to_string()),
        Just("defauts_low".to_string()),
        "[a-z]{1,8}(_[a-z]{1,6})?",
    ]
}

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 .]{0,10}".prop_map(Value::from),
        (0u64..10_000).prop_map(Value::from),
    ]
}

fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::vec((field_name(), scalar_value()), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn legacy_record() -> impl Strategy<Value = Record> {
    (
        record_strategy(),
        prop::option::of("[0-9]{1,2}(\\.[0-9]{1,2})?"),
        prop::option::of("[0-9]\\.[0-9]\\.[0-9]"),
    )
        .prop_map(|(mut record, version, package)| {
            if let Some(version) = version {
                record.set("package_version", version);
            }
            if let Some(package) = package {
                record.set("package", package);
            }
            record
        })
}

// ============================================================================
// Derived values
// ============================================================================

proptest! {
    #[test]
    fn percent_matches_rounded_ratio(d in 1u64..1_000_000, n_ratio in 0.0f64..=1.0) {
        let n = ((d as f64) * n_ratio).floor() as u64;
        let n = n.min(d);
        let expected = (100.0 * n as f64 / d as f64 + 0.5).floor() as u64;
        prop_assert_eq!(percent(n, d), expected);
    }

    #[test]
    fn percent_of_zero_denominator(n in any::<u64>()) {
        prop_assert_eq!(percent(n, 0), 0);
    }

    #[test]
    fn percent_stays_in_range(n in any::<u64>(), d in any::<u64>()) {
        prop_assert!(percent(n, d) <= 100);
    }

    #[test]
    fn defect_invariants(
        critical in 0u64..1000,
        high in 0u64..1000,
        medium in 0u64..1000,
        low in 0u64..1000,
        closed in 0u64..5000,
    ) {
        let summary = DefectSummary::compute(critical, high, medium, low, closed);
        prop_assert_eq!(summary.identified, critical + high + medium + low);
        prop_assert_eq!(summary.resolved, closed);
        prop_assert_eq!(summary.active, summary.identified as i64 - closed as i64);
        if summary.identified == 0 {
            prop_assert_eq!(summary.resolution_rate, 0);
        } else {
            prop_assert_eq!(summary.resolution_rate, percent(closed, summary.identified));
        }
    }

    #[test]
    fn chart_labels_do_not_depend_on_data(record in record_strategy()) {
        for chart in CHARTS {
            let config = chart.config(&record);
            prop_assert_eq!(config.labels.iter().map(String::as_str).collect::<Vec<_>>(), chart.labels());
            prop_assert_eq!(config.values.len(), config.labels.len());
        }
    }
}

// ============================================================================
// Record transforms
// ============================================================================

proptest! {
    #[test]
    fn migrate_is_idempotent(record in legacy_record()) {
        let once = migrate(record);
        prop_assert_eq!(migrate(once.clone()), once);
    }

    #[test]
    fn merge_keeps_loaded_and_default_fields(record in record_strategy()) {
        let merged = record.clone().merged_onto_defaults();
        for (name, value) in record.iter() {
            prop_assert_eq!(merged.get(name), Some(value));
        }
        for name in default_record().names() {
            prop_assert!(merged.contains(name));
        }
    }

    #[test]
    fn counts_round_trip_through_markup(count in 0u64..1_000_000) {
        let record: Record = [("defauts_medium".to_string(), json!(count))].into_iter().collect();
        let html = populate_str(r#"<td data-field="defauts_medium">0</td>"#, &record);
        let extracted = extract(&html);
        prop_assert_eq!(extracted.get("defauts_medium"), Some(&json!(count)));
    }

    #[test]
    fn rates_round_trip_through_markup(closed in 0u64..500, low in 1u64..500) {
        let record: Record = [
            ("defauts_low".to_string(), json!(low)),
            ("defauts_closed".to_string(), json!(closed)),
        ]
        .into_iter()
        .collect();
        let html = populate_str(r#"<td data-field="taux_resolution">0%</td>"#, &record);
        let expected = percent(closed, low) as f64;
        let extracted = extract(&html);
        prop_assert_eq!(extracted.get("taux_resolution"), Some(&json!(expected)));
    }

    #[test]
    fn text_round_trips_through_markup(text in "[a-zA-Z0-9 &<>\"'.,-]{0,24}") {
        let record: Record = [("author".to_string(), json!(text.clone()))].into_iter().collect();
        let html = populate_str(r#"<span data-field="author"></span>"#, &record);
        let extracted = extract(&html);
        prop_assert_eq!(extracted.get("author"), Some(&json!(text.trim())));
    }
}
