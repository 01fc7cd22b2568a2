//! Tests for style derivation, display text, animation precedence and edge flow.
mod common;
use common::*;
use serde_json::json;
use sld_engine::animation::EffectiveAnimation;
use sld_engine::model::FlowSpeed;
use sld_engine::prelude::*;

#[cfg(test)]
mod style_tests {
    use super::*;

    #[test]
    fn test_derive_maps_links_to_style_properties() {
        let table = points(&[
            ("temp", DataType::Double),
            ("load", DataType::Double),
            ("shown", DataType::String),
            ("blink", DataType::Boolean),
        ]);
        let values = live(&[
            ("temp", json!(85)),
            ("load", json!(1.7)),
            ("shown", json!("visible")),
            ("blink", json!(true)),
        ]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let links = vec![
            DataPointLink::new("temp", "backgroundColor").with_mapping(ValueMapping::new(
                MappingKind::Threshold,
                vec![
                    MappingRule::threshold(80.0, "#ef4444"),
                    MappingRule::threshold(60.0, "#f59e0b"),
                ],
            )),
            DataPointLink::new("load", "opacity"),
            DataPointLink::new("shown", "visible"),
            DataPointLink::new("blink", "blink"),
        ];

        let patch = StyleDeriver::default().derive(&links, &snapshot);
        assert_eq!(patch.background_color.as_deref(), Some("#ef4444"));
        assert_eq!(patch.opacity, Some(1.0));
        assert_eq!(patch.visibility, Some(Visibility::Shown));
        assert_eq!(patch.custom_property("blink"), Some(&json!(true)));
    }

    #[test]
    fn test_visibility_and_opacity_ignore_display_format() {
        let table = points(&[
            ("closed", DataType::Boolean),
            ("count", DataType::Int32),
            ("dim", DataType::Double),
        ]);
        let values = live(&[
            ("closed", json!(true)),
            ("count", json!(2)),
            ("dim", json!(0.25)),
        ]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let deriver = StyleDeriver::default();

        let boolean = [DataPointLink::new("closed", "visible")
            .with_format(FormatDescriptor::of(FormatKind::Boolean))];
        assert_eq!(
            deriver.derive(&boolean, &snapshot).visibility,
            Some(Visibility::Shown)
        );

        let numeric = [DataPointLink::new("count", "visibility").with_format(FormatDescriptor::number(0))];
        assert_eq!(
            deriver.derive(&numeric, &snapshot).visibility,
            Some(Visibility::Shown)
        );

        let opacity = [DataPointLink::new("dim", "opacity")
            .with_format(FormatDescriptor::number(2).with_suffix("%"))];
        assert_eq!(deriver.derive(&opacity, &snapshot).opacity, Some(0.25));
    }

    #[test]
    fn test_color_links_still_use_format() {
        let table = points(&[("level", DataType::Double)]);
        let values = live(&[("level", json!(3))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let links = [DataPointLink::new("level", "textColor")
            .with_format(FormatDescriptor::number(1).with_prefix("level-"))];
        let patch = StyleDeriver::default().derive(&links, &snapshot);
        assert_eq!(patch.text_color.as_deref(), Some("level-3.0"));
    }

    #[test]
    fn test_unresolved_and_null_values_leave_patch_empty() {
        let table = points(&[("mode", DataType::String)]);
        let values = live(&[("mode", json!("x"))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let links = vec![
            DataPointLink::new("missing", "backgroundColor"),
            DataPointLink::new("mode", "textColor").with_mapping(ValueMapping::new(
                MappingKind::Exact,
                vec![MappingRule::exact("x", serde_json::Value::Null)],
            )),
        ];
        assert!(StyleDeriver::default().derive(&links, &snapshot).is_empty());
    }

    #[test]
    fn test_falsy_visibility_hides() {
        let table = points(&[("flag", DataType::Boolean)]);
        let values = live(&[("flag", json!(0))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let patch =
            StyleDeriver::default().derive(&[DataPointLink::new("flag", "visible")], &snapshot);
        assert_eq!(patch.visibility, Some(Visibility::Hidden));
    }

    #[test]
    fn test_display_text_formats_numbers() {
        let table = points(&[("power", DataType::Double)]);
        let values = live(&[("power", json!(12.345))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let links = vec![
            DataPointLink::new("power", "value")
                .with_format(FormatDescriptor::number(1).with_suffix(" kW")),
        ];
        let text = StyleDeriver::default().display_text(&links, &snapshot, "value");
        assert_eq!(text.as_deref(), Some("12.3 kW"));
    }

    #[test]
    fn test_display_text_keeps_mapped_labels_verbatim() {
        let table = points(&[("closed", DataType::Boolean)]);
        let values = live(&[("closed", json!(true))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let links = vec![
            DataPointLink::new("closed", "value")
                .with_mapping(ValueMapping::new(
                    MappingKind::Boolean,
                    vec![MappingRule::value("ON"), MappingRule::value("OFF")],
                ))
                .with_format(FormatDescriptor::of(FormatKind::Boolean)),
        ];
        let text = StyleDeriver::default().display_text(&links, &snapshot, "value");
        assert_eq!(text.as_deref(), Some("ON"));
    }

    #[test]
    fn test_display_text_for_missing_value_is_dash() {
        let table = points(&[("power", DataType::Double)]);
        let snapshot = TelemetrySnapshot::new(&table);
        let deriver = StyleDeriver::default();
        let links = vec![DataPointLink::new("power", "value")];
        assert_eq!(deriver.display_text(&links, &snapshot, "value").as_deref(), Some("-"));
        assert!(deriver.display_text(&links, &snapshot, "text").is_none());
    }

    #[test]
    fn test_status_prefers_link_over_fallback() {
        let table = points(&[("state", DataType::String)]);
        let values = live(&[("state", json!("fault"))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let deriver = StyleDeriver::default();
        let links = vec![DataPointLink::new("state", "status")];

        assert_eq!(deriver.status(&links, Some("nominal"), &snapshot), StandardState::Fault);
        assert_eq!(deriver.status(&[], Some("nominal"), &snapshot), StandardState::Energized);
        assert_eq!(deriver.status(&[], None, &snapshot), StandardState::Unknown);
    }
}

#[cfg(test)]
mod animation_tests {
    use super::*;

    fn global(animation_type: &str) -> GlobalAnimationSettings {
        GlobalAnimationSettings::enabled(AnimationSettings::of_type(animation_type))
    }

    fn effective_type(effective: Option<EffectiveAnimation>) -> Option<String> {
        effective
            .and_then(|e| e.settings.animation_type)
            .map(|t| t.as_str().to_string())
    }

    #[test]
    fn test_edge_set_to_none_inherits_global() {
        let global = global("flow");
        let edge = AnimationSettings::of_type("none");
        let effective = AnimationSettingsResolver::resolve(Some(&global), Some(&edge));
        assert!(effective.as_ref().is_some_and(|e| e.inherited));
        assert_eq!(effective_type(effective).as_deref(), Some("flow"));
    }

    #[test]
    fn test_edge_override_wins_over_global() {
        let global = global("flow");
        let edge = AnimationSettings::of_type("reverse");
        let effective = AnimationSettingsResolver::resolve(Some(&global), Some(&edge));
        assert_eq!(effective_type(effective).as_deref(), Some("reverse"));
    }

    #[test]
    fn test_disabled_global_is_not_inherited() {
        let mut global = global("flow");
        global.is_enabled = Some(false);
        let edge = AnimationSettings::of_type("none");
        let effective = AnimationSettingsResolver::resolve(Some(&global), Some(&edge));
        assert!(effective.as_ref().is_some_and(|e| !e.inherited));
        assert_eq!(effective_type(effective).as_deref(), Some("none"));

        assert!(AnimationSettingsResolver::resolve(Some(&global), None).is_none());
    }

    #[test]
    fn test_global_without_real_type_is_ignored() {
        let global = global("none");
        assert!(AnimationSettingsResolver::resolve(Some(&global), None).is_none());
        assert!(AnimationSettingsResolver::resolve(None, None).is_none());
    }

    #[test]
    fn test_global_invert_flag_only_travels_when_inherited() {
        let mut global = global("dynamic_power_flow");
        global.globally_invert_default_flow_for_all_edges = Some(true);

        let inherited = AnimationSettingsResolver::resolve(Some(&global), None);
        assert!(inherited.is_some_and(|e| e.globally_inverted));

        let own = AnimationSettings::of_type(AnimationType::ConstantUnidirectional);
        let overridden = AnimationSettingsResolver::resolve(Some(&global), Some(&own));
        assert!(overridden.is_some_and(|e| !e.globally_inverted));
    }
}

#[cfg(test)]
mod flow_tests {
    use super::*;

    fn dynamic(grid_point: &str, multiplier: Option<f64>) -> AnimationSettings {
        AnimationSettings {
            grid_net_flow_data_point_id: Some(grid_point.to_string()),
            speed_multiplier: multiplier,
            ..AnimationSettings::of_type(AnimationType::DynamicPowerFlow)
        }
    }

    fn evaluate(edge: &Edge, global: Option<&GlobalAnimationSettings>, snapshot: &TelemetrySnapshot<'_>) -> EdgeFlow {
        let effective = AnimationSettingsResolver::resolve_edge(global, edge);
        EdgeFlow::evaluate(edge, effective.as_ref(), &StyleDeriver::default(), snapshot)
    }

    #[test]
    fn test_export_reverses_flow_and_speeds_up() {
        let table = points(&[("net", DataType::Double)]);
        let values = live(&[("net", json!(2.0))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let edge = Edge::new("e1", "a", "b").with_animation(dynamic("net", Some(5.0)));

        let flow = evaluate(&edge, None, &snapshot);
        assert!(flow.active);
        assert!(flow.animated);
        assert_eq!(flow.direction, FlowDirection::Reverse);
        assert_eq!(flow.duration_secs, 5.0);
    }

    #[test]
    fn test_small_import_runs_slowly_forward() {
        let table = points(&[("net", DataType::Double)]);
        let values = live(&[("net", json!(-0.1))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let edge = Edge::new("e1", "a", "b").with_animation(dynamic("net", None));

        let flow = evaluate(&edge, None, &snapshot);
        assert_eq!(flow.direction, FlowDirection::Normal);
        assert!((flow.duration_secs - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_net_flow_is_still() {
        let table = points(&[("net", DataType::Double)]);
        let values = live(&[("net", json!(0))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let edge = Edge::new("e1", "a", "b").with_animation(dynamic("net", None));

        let flow = evaluate(&edge, None, &snapshot);
        assert!(flow.active);
        assert!(!flow.animated);
    }

    #[test]
    fn test_generation_minus_usage_and_invert_flags() {
        let table = points(&[("gen", DataType::Double), ("use", DataType::Double)]);
        let values = live(&[("gen", json!(3)), ("use", json!(5))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let settings = AnimationSettings {
            generation_data_point_id: Some("gen".to_string()),
            usage_data_point_id: Some("use".to_string()),
            invert_flow_direction: Some(true),
            ..AnimationSettings::of_type(AnimationType::DynamicPowerFlow)
        };
        let edge = Edge::new("e1", "a", "b").with_animation(settings);
        assert_eq!(evaluate(&edge, None, &snapshot).direction, FlowDirection::Reverse);
    }

    #[test]
    fn test_global_inversion_applies_to_inheriting_edges() {
        let table = points(&[("net", DataType::Double)]);
        let values = live(&[("net", json!(2.0))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let mut global = GlobalAnimationSettings::enabled(dynamic("net", None));
        global.globally_invert_default_flow_for_all_edges = Some(true);
        let edge = Edge::new("e1", "a", "b");

        let flow = evaluate(&edge, Some(&global), &snapshot);
        assert_eq!(flow.direction, FlowDirection::Normal);
    }

    #[test]
    fn test_constant_flow_speed_and_activation() {
        let table = points(&[("run", DataType::Boolean)]);
        let on = live(&[("run", json!(true))]);
        let off = live(&[("run", json!(false))]);
        let settings = AnimationSettings {
            constant_flow_direction: Some("reverse".to_string()),
            constant_flow_speed: Some(FlowSpeed::Preset("fast".to_string())),
            constant_flow_activation_data_point_id: Some("run".to_string()),
            ..AnimationSettings::of_type(AnimationType::ConstantUnidirectional)
        };
        let edge = Edge::new("e1", "a", "b").with_animation(settings);

        let running = evaluate(&edge, None, &TelemetrySnapshot::new(&table).with_source(&on));
        assert!(running.animated);
        assert_eq!(running.direction, FlowDirection::Reverse);
        assert_eq!(running.duration_secs, 1.0);

        let stopped = evaluate(&edge, None, &TelemetrySnapshot::new(&table).with_source(&off));
        assert!(!stopped.active);
        assert!(!stopped.animated);
    }

    #[test]
    fn test_constant_flow_numeric_speed_is_clamped() {
        let table = points(&[]);
        let settings = AnimationSettings {
            constant_flow_speed: Some(FlowSpeed::Seconds(30.0)),
            ..AnimationSettings::of_type(AnimationType::ConstantUnidirectional)
        };
        let edge = Edge::new("e1", "a", "b").with_animation(settings);
        let flow = evaluate(&edge, None, &TelemetrySnapshot::new(&table));
        assert_eq!(flow.duration_secs, 15.0);
    }

    #[test]
    fn test_energized_edge_stops_on_fault() {
        let table = points(&[]);
        let snapshot = TelemetrySnapshot::new(&table);
        let mut edge = Edge::new("e1", "a", "b");
        edge.data.is_energized = Some(true);

        let flow = evaluate(&edge, None, &snapshot);
        assert!(flow.animated);
        assert_eq!(flow.duration_secs, 5.0);

        edge.data.status = Some("fault".to_string());
        let faulted = evaluate(&edge, None, &snapshot);
        assert_eq!(faulted.state, StandardState::Fault);
        assert!(!faulted.animated);
    }

    #[test]
    fn test_energized_link_is_mapped() {
        let table = points(&[("breaker", DataType::String)]);
        let values = live(&[("breaker", json!("CLOSED"))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);
        let mut edge = Edge::new("e1", "a", "b");
        edge.data.data_point_links.push(
            DataPointLink::new("breaker", "isEnergized").with_mapping(ValueMapping::new(
                MappingKind::Exact,
                vec![MappingRule::exact("CLOSED", true), MappingRule::exact("OPEN", false)],
            )),
        );
        assert!(evaluate(&edge, None, &snapshot).active);
    }
}

#[cfg(test)]
mod diagram_tests {
    use super::*;

    #[test]
    fn test_compute_covers_every_real_element() {
        let mut doc = feeder_layout("feeder");
        doc.nodes.push(sld_engine::model::Node::placeholder("feeder"));
        doc.nodes[2] = doc.nodes[2]
            .clone()
            .with_link(DataPointLink::new("inv-power", "value").with_format(
                FormatDescriptor::number(0).with_suffix(" W"),
            ));

        let table = points(&[("breaker-state", DataType::String), ("inv-power", DataType::Double)]);
        let values = live(&[("breaker-state", json!("tripped")), ("inv-power", json!(1500))]);
        let snapshot = TelemetrySnapshot::new(&table).with_source(&values);

        let view = DiagramPresentation::compute(&doc, &StyleDeriver::default(), &snapshot);
        assert_eq!(view.nodes.len(), 3);
        assert_eq!(view.edges.len(), 2);
        assert_eq!(view.node("breaker").map(|n| n.state), Some(StandardState::Fault));
        assert_eq!(
            view.node("inverter").and_then(|n| n.text.as_deref()),
            Some("1,500 W")
        );
        assert!(view.node("grid").is_some_and(|n| n.text.is_none()));
        assert!(view.edge("e-grid-breaker").is_some_and(|e| e.animation.is_none()));
    }
}
