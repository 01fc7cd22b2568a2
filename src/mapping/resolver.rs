use crate::model::{DataPointMeta, LiveValues, PointTable};
use serde_json::Value;

/// Looks up live values through the point-metadata indirection.
pub struct ValueResolver;

impl ValueResolver {
    /// Returns the value of `reference` from the first source holding its physical key.
    ///
    /// Absence is a normal outcome for points that have not reported yet.
    pub fn resolve<'a>(
        reference: &str,
        points: &'a PointTable,
        sources: &[&'a LiveValues],
    ) -> Option<&'a Value> {
        let meta = points.get(reference)?;
        sources.iter().find_map(|source| source.get(&meta.node_id))
    }
}

/// A read-only view of point metadata and live sources, in priority order,
/// taken once per recomputation.
#[derive(Debug, Clone)]
pub struct TelemetrySnapshot<'a> {
    points: &'a PointTable,
    sources: Vec<&'a LiveValues>,
}

impl<'a> TelemetrySnapshot<'a> {
    pub fn new(points: &'a PointTable) -> Self {
        Self {
            points,
            sources: Vec::new(),
        }
    }

    /// Appends a source with lower priority than those already added.
    pub fn with_source(mut self, source: &'a LiveValues) -> Self {
        self.sources.push(source);
        self
    }

    pub fn value(&self, reference: &str) -> Option<&'a Value> {
        ValueResolver::resolve(reference, self.points, &self.sources)
    }

    pub fn meta(&self, reference: &str) -> Option<&'a DataPointMeta> {
        self.points.get(reference)
    }

    pub fn sources(&self) -> &[&'a LiveValues] {
        &self.sources
    }
}
