//! Effective edge animation: global/edge precedence and flow evaluation.

pub mod flow;

pub use flow::{EdgeFlow, FlowDirection};

use crate::model::{AnimationSettings, Edge, GlobalAnimationSettings};

/// Animation parameters in force for one edge after precedence is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveAnimation {
    pub settings: AnimationSettings,
    /// Global "invert default flow" flag, carried only when inherited.
    pub globally_inverted: bool,
    /// True when `settings` is a copy of the global configuration.
    pub inherited: bool,
}

/// Merges the diagram-wide animation configuration with per-edge overrides.
pub struct AnimationSettingsResolver;

impl AnimationSettingsResolver {
    /// An edge inherits the global settings only when the global configuration
    /// is not explicitly disabled, names a real animation type, and the edge
    /// has no settings of its own or has opted for `none`. Otherwise the
    /// edge's settings stand, including staying unset.
    pub fn resolve(
        global: Option<&GlobalAnimationSettings>,
        edge: Option<&AnimationSettings>,
    ) -> Option<EffectiveAnimation> {
        let inheritable = global.filter(|g| {
            g.is_enabled != Some(false)
                && g.settings
                    .animation_type
                    .as_ref()
                    .is_some_and(|t| !t.is_none())
        });
        let edge_is_inert = edge.is_none_or(AnimationSettings::is_inert);

        match (inheritable, edge) {
            (Some(global), _) if edge_is_inert => Some(EffectiveAnimation {
                settings: global.settings.clone(),
                globally_inverted: global
                    .globally_invert_default_flow_for_all_edges
                    .unwrap_or(false),
                inherited: true,
            }),
            (_, Some(own)) => Some(EffectiveAnimation {
                settings: own.clone(),
                globally_inverted: false,
                inherited: false,
            }),
            (_, None) => None,
        }
    }

    pub fn resolve_edge(
        global: Option<&GlobalAnimationSettings>,
        edge: &Edge,
    ) -> Option<EffectiveAnimation> {
        Self::resolve(global, edge.data.animation_settings.as_ref())
    }
}
