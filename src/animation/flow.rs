use super::EffectiveAnimation;
use crate::mapping::value::is_truthy_flag;
use crate::mapping::{StandardState, StyleDeriver, TelemetrySnapshot, ValueMapper};
use crate::model::{AnimationSettings, AnimationType, Edge, FlowSpeed};

const DEFAULT_DURATION_SECS: f64 = 5.0;
const DEFAULT_SPEED_MULTIPLIER: f64 = 10.0;
const SPEED_ADJUSTMENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Normal,
    Reverse,
}

impl FlowDirection {
    fn flipped(self) -> Self {
        match self {
            FlowDirection::Normal => FlowDirection::Reverse,
            FlowDirection::Reverse => FlowDirection::Normal,
        }
    }
}

/// What an edge renderer needs to draw the flow along one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFlow {
    /// The connection is conceptually carrying power or signal.
    pub active: bool,
    /// Dashes should move along the edge.
    pub animated: bool,
    pub direction: FlowDirection,
    /// Seconds per dash cycle.
    pub duration_secs: f64,
    pub state: StandardState,
}

impl EdgeFlow {
    pub fn evaluate(
        edge: &Edge,
        effective: Option<&EffectiveAnimation>,
        deriver: &StyleDeriver,
        snapshot: &TelemetrySnapshot<'_>,
    ) -> EdgeFlow {
        let mut flow = match effective.and_then(|e| e.settings.animation_type.as_ref().map(|t| (e, t))) {
            Some((e, AnimationType::DynamicPowerFlow)) => {
                dynamic_power_flow(&e.settings, e.globally_inverted, snapshot)
            }
            Some((e, AnimationType::ConstantUnidirectional)) => {
                constant_flow(&e.settings, snapshot)
            }
            _ => energized_flow(edge, snapshot),
        };

        flow.state = deriver.status(
            &edge.data.data_point_links,
            edge.data.status.as_deref(),
            snapshot,
        );
        if flow.state == StandardState::Fault || !flow.active {
            flow.animated = false;
        }
        flow
    }
}

fn numeric(snapshot: &TelemetrySnapshot<'_>, reference: Option<&String>) -> Option<f64> {
    reference
        .and_then(|id| snapshot.value(id))
        .and_then(|v| v.as_f64())
        .filter(|n| !n.is_nan())
}

fn dynamic_power_flow(
    settings: &AnimationSettings,
    globally_inverted: bool,
    snapshot: &TelemetrySnapshot<'_>,
) -> EdgeFlow {
    let net = if settings.grid_net_flow_data_point_id.is_some() {
        numeric(snapshot, settings.grid_net_flow_data_point_id.as_ref()).unwrap_or(0.0)
    } else if settings.generation_data_point_id.is_some() && settings.usage_data_point_id.is_some()
    {
        let generation =
            numeric(snapshot, settings.generation_data_point_id.as_ref()).unwrap_or(0.0);
        let usage = numeric(snapshot, settings.usage_data_point_id.as_ref()).unwrap_or(0.0);
        generation - usage
    } else {
        0.0
    };

    // Surplus generation flows back toward the source.
    let mut direction = if net > 0.0 {
        FlowDirection::Reverse
    } else {
        FlowDirection::Normal
    };
    let animated = net != 0.0;
    if animated && globally_inverted {
        direction = direction.flipped();
    }
    if animated && settings.invert_flow_direction == Some(true) {
        direction = direction.flipped();
    }

    let mut duration_secs = DEFAULT_DURATION_SECS;
    if animated {
        let multiplier = settings
            .speed_multiplier
            .unwrap_or(DEFAULT_SPEED_MULTIPLIER)
            .max(0.1);
        let speed_factor = net.abs() * multiplier * SPEED_ADJUSTMENT;
        duration_secs = if speed_factor > 0.001 {
            (30.0 / speed_factor.clamp(0.02, 200.0)).clamp(5.0, 80.0)
        } else {
            80.0
        };
    }

    EdgeFlow {
        active: true,
        animated,
        direction,
        duration_secs,
        state: StandardState::Unknown,
    }
}

fn constant_flow(settings: &AnimationSettings, snapshot: &TelemetrySnapshot<'_>) -> EdgeFlow {
    let direction = match settings.constant_flow_direction.as_deref() {
        Some("reverse") => FlowDirection::Reverse,
        _ => FlowDirection::Normal,
    };
    let duration_secs = match &settings.constant_flow_speed {
        Some(FlowSpeed::Preset(name)) if name == "slow" => 4.0,
        Some(FlowSpeed::Preset(name)) if name == "medium" => 2.0,
        Some(FlowSpeed::Preset(name)) if name == "fast" => 1.0,
        Some(FlowSpeed::Seconds(secs)) if *secs > 0.0 => secs.clamp(0.2, 15.0),
        _ => 2.0,
    };
    let active = match &settings.constant_flow_activation_data_point_id {
        Some(id) => snapshot.value(id).is_some_and(is_truthy_flag),
        None => true,
    };
    EdgeFlow {
        active,
        animated: active,
        direction,
        duration_secs,
        state: StandardState::Unknown,
    }
}

fn energized_flow(edge: &Edge, snapshot: &TelemetrySnapshot<'_>) -> EdgeFlow {
    let active = match edge
        .data
        .data_point_links
        .iter()
        .find(|link| link.target_property == "isEnergized")
    {
        Some(link) => {
            let raw = snapshot.value(&link.data_point_id);
            let value = match &link.value_mapping {
                Some(mapping) => ValueMapper::map(raw, mapping),
                None => raw.cloned(),
            };
            value.as_ref().is_some_and(is_truthy_flag)
        }
        None => edge.data.is_energized.unwrap_or(false),
    };
    EdgeFlow {
        active,
        animated: active,
        direction: FlowDirection::Normal,
        duration_secs: DEFAULT_DURATION_SECS,
        state: StandardState::Unknown,
    }
}
