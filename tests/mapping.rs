//! Tests for value resolution, mapping, formatting and state classification.
mod common;
use common::*;
use serde_json::json;
use sld_engine::mapping::ValueResolver;
use sld_engine::mapping::formatter::MISSING_VALUE;
use sld_engine::prelude::*;

#[cfg(test)]
mod resolver_tests {
    use super::*;

    #[test]
    fn test_resolves_through_point_metadata() {
        let table = points(&[("p1", DataType::Double)]);
        let primary = live(&[("p1", json!(1.5))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&primary);

        assert_eq!(snapshot.value("p1"), Some(&json!(1.5)));
        assert!(snapshot.value("unknown").is_none());
    }

    #[test]
    fn test_first_source_wins() {
        let table = points(&[("p1", DataType::Double), ("p2", DataType::Double)]);
        let primary = live(&[("p1", json!(1))]);
        let secondary = live(&[("p1", json!(2)), ("p2", json!(3))]);

        let found = ValueResolver::resolve("p1", &table, &[&primary, &secondary]);
        assert_eq!(found, Some(&json!(1)));

        let fallback = ValueResolver::resolve("p2", &table, &[&primary, &secondary]);
        assert_eq!(fallback, Some(&json!(3)));
    }

    #[test]
    fn test_unreported_point_is_absent() {
        let table = points(&[("p1", DataType::Double)]);
        let empty = LiveValues::new();
        let snapshot = TelemetrySnapshot::new(&table).with_source(&empty);
        assert!(snapshot.value("p1").is_none());
        assert!(snapshot.meta("p1").is_some());
    }
}

#[cfg(test)]
mod mapper_tests {
    use super::*;

    #[test]
    fn test_no_match_without_default_passes_raw_through() {
        let mapping = ValueMapping::new(MappingKind::Exact, vec![MappingRule::exact("a", "A")]);
        assert_eq!(ValueMapper::map(Some(&json!("b")), &mapping), Some(json!("b")));
        assert_eq!(ValueMapper::map(Some(&json!(7)), &mapping), Some(json!(7)));
    }

    #[test]
    fn test_exact_match_compares_display_strings() {
        let mapping = ValueMapping::new(
            MappingKind::Exact,
            vec![MappingRule::exact(1, "ONE"), MappingRule::exact("2", "TWO")],
        );
        assert_eq!(ValueMapper::map(Some(&json!("1")), &mapping), Some(json!("ONE")));
        assert_eq!(ValueMapper::map(Some(&json!(2)), &mapping), Some(json!("TWO")));
    }

    #[test]
    fn test_range_upper_bound_is_exclusive() {
        let mapping = ValueMapping::new(
            MappingKind::Range,
            vec![MappingRule::range(Some(0.0), Some(10.0), "LOW")],
        );
        assert_eq!(ValueMapper::map(Some(&json!(0)), &mapping), Some(json!("LOW")));
        assert_eq!(ValueMapper::map(Some(&json!(9.99)), &mapping), Some(json!("LOW")));

        let at_max = ValueMapper::map(Some(&json!(10)), &mapping);
        assert_ne!(at_max, Some(json!("LOW")));
        assert_eq!(at_max, Some(json!(10)));
    }

    #[test]
    fn test_range_with_open_bounds() {
        let mapping = ValueMapping::new(
            MappingKind::Range,
            vec![
                MappingRule::range(None, Some(0.0), "NEG"),
                MappingRule::range(Some(100.0), None, "HIGH"),
            ],
        )
        .with_default("MID");
        assert_eq!(ValueMapper::map(Some(&json!(-5)), &mapping), Some(json!("NEG")));
        assert_eq!(ValueMapper::map(Some(&json!(250)), &mapping), Some(json!("HIGH")));
        assert_eq!(ValueMapper::map(Some(&json!(50)), &mapping), Some(json!("MID")));
    }

    #[test]
    fn test_threshold_first_satisfied_rule_wins() {
        let mapping = ValueMapping::new(
            MappingKind::Threshold,
            vec![MappingRule::threshold(5.0, "A"), MappingRule::threshold(10.0, "B")],
        );
        assert_eq!(ValueMapper::map(Some(&json!(12)), &mapping), Some(json!("A")));
        assert_eq!(ValueMapper::map(Some(&json!(3)), &mapping), Some(json!(3)));
    }

    #[test]
    fn test_boolean_mapping_uses_first_two_rules() {
        let mapping = ValueMapping::new(
            MappingKind::Boolean,
            vec![MappingRule::value("CLOSED"), MappingRule::value("OPEN")],
        );
        assert_eq!(ValueMapper::map(Some(&json!(true)), &mapping), Some(json!("CLOSED")));
        assert_eq!(ValueMapper::map(Some(&json!(1)), &mapping), Some(json!("CLOSED")));
        assert_eq!(ValueMapper::map(Some(&json!("0")), &mapping), Some(json!("OPEN")));
        assert_eq!(ValueMapper::map(Some(&json!(false)), &mapping), Some(json!("OPEN")));
    }

    #[test]
    fn test_boolean_mapping_with_fewer_than_two_rules() {
        let single = ValueMapping::new(MappingKind::Boolean, vec![MappingRule::exact(true, "ON")]);
        assert_eq!(ValueMapper::map(Some(&json!(true)), &single), Some(json!("ON")));
        assert_eq!(ValueMapper::map(Some(&json!(false)), &single), Some(json!(false)));

        let empty = ValueMapping::new(MappingKind::Boolean, vec![]).with_default("n/a");
        assert_eq!(ValueMapper::map(Some(&json!(true)), &empty), Some(json!("n/a")));
    }

    #[test]
    fn test_default_substitutes_passthrough_token() {
        let mapping = ValueMapping::new(MappingKind::Exact, vec![MappingRule::exact("x", "X")])
            .with_default("Value: {passthrough_value}");
        assert_eq!(
            ValueMapper::map(Some(&json!(42)), &mapping),
            Some(json!("Value: 42"))
        );
        assert_eq!(ValueMapper::map(None, &mapping), Some(json!("Value: ")));
    }

    #[test]
    fn test_missing_value_uses_default_or_stays_absent() {
        let with_default =
            ValueMapping::new(MappingKind::Exact, vec![]).with_default("unknown");
        assert_eq!(ValueMapper::map(None, &with_default), Some(json!("unknown")));
        assert_eq!(
            ValueMapper::map(Some(&json!(null)), &with_default),
            Some(json!("unknown"))
        );

        let without_default = ValueMapping::new(MappingKind::Exact, vec![]);
        assert_eq!(ValueMapper::map(None, &without_default), None);
    }

    #[test]
    fn test_malformed_bound_degrades_to_default() {
        let rule = MappingRule {
            min: Some(json!("abc")),
            value: json!("X"),
            ..MappingRule::default()
        };
        let mapping = ValueMapping::new(MappingKind::Range, vec![rule]).with_default("ERR");
        assert_eq!(ValueMapper::map(Some(&json!(5)), &mapping), Some(json!("ERR")));
    }

    #[test]
    fn test_unknown_mapping_kind_deserializes_and_falls_back() {
        let mapping: ValueMapping = serde_json::from_value(json!({
            "type": "regex",
            "mapping": [{ "match": ".*", "value": "ANY" }],
            "defaultValue": "fallback"
        }))
        .expect("mapping should deserialize");
        assert_eq!(mapping.kind, MappingKind::Unknown);
        assert_eq!(ValueMapper::map(Some(&json!("z")), &mapping), Some(json!("fallback")));
    }
}

#[cfg(test)]
mod formatter_tests {
    use super::*;

    fn formatter() -> ValueFormatter {
        ValueFormatter::new(FormatSettings::default())
    }

    #[test]
    fn test_missing_value_renders_dash() {
        let f = formatter();
        assert_eq!(f.format(None, None, None), MISSING_VALUE);
        assert_eq!(f.format(Some(&json!(null)), Some(&FormatDescriptor::number(2)), None), "-");
    }

    #[test]
    fn test_number_precision_grouping_and_suffix() {
        let f = formatter();
        let descriptor = FormatDescriptor::number(2).with_suffix(" kW");
        assert_eq!(
            f.format(Some(&json!(1234.5)), Some(&descriptor), None),
            "1,234.50 kW"
        );
        assert_eq!(
            f.format(
                Some(&json!(-1234567.891)),
                Some(&FormatDescriptor::number(1)),
                None
            ),
            "-1,234,567.9"
        );
    }

    #[test]
    fn test_number_default_fraction_digits_trim_zeros() {
        let f = formatter();
        assert_eq!(f.format(Some(&json!(3.14159)), None, None), "3.142");
        assert_eq!(f.format(Some(&json!(2.5)), None, None), "2.5");
        assert_eq!(f.format(Some(&json!(1000)), None, None), "1,000");
    }

    #[test]
    fn test_integer_point_type_implies_zero_precision() {
        let f = formatter();
        let meta = DataPointMeta::new("count", "plc.count", DataType::Int32);
        assert_eq!(f.format(Some(&json!(1234.4)), None, Some(&meta)), "1,234");
    }

    #[test]
    fn test_point_precision_applies_without_descriptor_precision() {
        let f = formatter();
        let mut meta = DataPointMeta::new("v", "plc.v", DataType::Double);
        meta.precision = Some(1);
        let descriptor = FormatDescriptor::of(FormatKind::Number).with_suffix(" V");
        assert_eq!(
            f.format(Some(&json!(229.96)), Some(&descriptor), Some(&meta)),
            "230.0 V"
        );
    }

    #[test]
    fn test_custom_separators() {
        let settings = FormatSettings {
            group_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            ..FormatSettings::default()
        };
        let f = ValueFormatter::new(settings);
        assert_eq!(
            f.format(Some(&json!(1234.5)), Some(&FormatDescriptor::number(1)), None),
            "1.234,5"
        );
    }

    #[test]
    fn test_boolean_labels() {
        let f = formatter();
        let descriptor = FormatDescriptor {
            true_label: Some("Closed".to_string()),
            false_label: Some("Open".to_string()),
            ..FormatDescriptor::of(FormatKind::Boolean)
        };
        assert_eq!(f.format(Some(&json!(true)), Some(&descriptor), None), "Closed");
        assert_eq!(f.format(Some(&json!(0)), Some(&descriptor), None), "Open");
        assert_eq!(f.format(Some(&json!(true)), None, None), "True");
    }

    #[test]
    fn test_date_time_pattern_and_unparseable_input() {
        let f = formatter();
        let descriptor = FormatDescriptor {
            date_time_format: Some("%Y-%m-%d %H:%M".to_string()),
            ..FormatDescriptor::of(FormatKind::DateTime)
        };
        assert_eq!(
            f.format(Some(&json!("2024-03-05T10:20:30Z")), Some(&descriptor), None),
            "2024-03-05 10:20"
        );
        assert_eq!(f.format(Some(&json!("soon")), Some(&descriptor), None), "soon");
    }

    #[test]
    fn test_unformattable_number_degrades_to_plain_text() {
        let f = formatter();
        assert_eq!(
            f.format(Some(&json!("n/a")), Some(&FormatDescriptor::number(2)), None),
            "n/a"
        );
    }

    #[test]
    fn test_string_kind_applies_affixes() {
        let f = formatter();
        let descriptor = FormatDescriptor::of(FormatKind::String).with_prefix("Mode: ");
        assert_eq!(f.format(Some(&json!("AUTO")), Some(&descriptor), None), "Mode: AUTO");
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    #[test]
    fn test_classifies_status_vocabulary() {
        assert_eq!(StandardState::classify(&json!("Tripped")), StandardState::Fault);
        assert_eq!(StandardState::classify(&json!("derating")), StandardState::Warning);
        assert_eq!(StandardState::classify(&json!("nominal")), StandardState::Energized);
        assert_eq!(StandardState::classify(&json!(true)), StandardState::Energized);
        assert_eq!(StandardState::classify(&json!(false)), StandardState::Standby);
        assert_eq!(StandardState::classify(&json!("weird")), StandardState::Unknown);
    }

    #[test]
    fn test_fault_palette_pulses() {
        let palette = StandardState::Fault.palette();
        assert!(palette.pulse);
        assert!(!StandardState::Energized.palette().pulse);
        assert_eq!(StandardState::Offline.to_string(), "offline");
    }
}
