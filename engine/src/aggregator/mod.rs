//! Command aggregation
//!
//! Merges a drained batch of cleaning requests into a single execution
//! plan: the deduplicated union of every requested segment, plus a resolved
//! mode. Pure — no I/O, no clock, no device; the coordinator calls it
//! exactly once per fired window and hands the result to the dispatcher.

use crate::registry::ZoneRegistry;
use sdk::errors::EngineError;
use sdk::types::{CleaningMode, SegmentId};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// A single "clean this zone" request as accepted by intake.
///
/// Consumed exactly once by [`aggregate`]; never mutated after creation.
#[derive(Debug, Clone)]
pub struct CleaningRequest {
    /// Zone identifier, checked against the registry at intake time
    pub zone: String,

    /// Overrides the zone's default mode when present
    pub mode_override: Option<CleaningMode>,

    /// Arrival time, for queue-latency logging
    pub received_at: Instant,
}

impl CleaningRequest {
    /// Create a request arriving now.
    pub fn new(zone: impl Into<String>, mode_override: Option<CleaningMode>) -> Self {
        Self {
            zone: zone.into(),
            mode_override,
            received_at: Instant::now(),
        }
    }
}

/// Resolved mode of an execution plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// Every request in the batch resolved to this one mode
    Uniform(CleaningMode),

    /// The batch mixed modes; per-segment preferences must be configured
    /// on the device before the combined start is issued
    Customized,
}

/// One cleaning job derived from a fired batch. Ephemeral: constructed and
/// consumed within a single aggregation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Effective mode per planned segment. The keys are the deduplicated
    /// union of all resolved segment sets.
    pub segment_modes: BTreeMap<SegmentId, CleaningMode>,

    /// Resolved batch mode
    pub mode: PlanMode,
}

impl ExecutionPlan {
    /// The deduplicated segment union, ascending.
    pub fn segments(&self) -> BTreeSet<SegmentId> {
        self.segment_modes.keys().copied().collect()
    }

    /// Whether dispatch must configure per-segment preferences before the
    /// combined start.
    pub fn requires_customized_cleaning(&self) -> bool {
        matches!(self.mode, PlanMode::Customized)
    }
}

/// Merge a batch into one execution plan.
///
/// Each request resolves to its zone's segments and effective mode
/// (override when present, zone default otherwise). A batch resolving to
/// exactly one distinct mode yields a uniform plan; anything else yields a
/// customized plan. A single-request batch takes the same path as a grouped
/// one. When overlapping zones disagree about a shared segment's mode, the
/// later request in the batch wins.
pub fn aggregate(
    registry: &ZoneRegistry,
    batch: &[CleaningRequest],
) -> Result<ExecutionPlan, EngineError> {
    if batch.is_empty() {
        return Err(EngineError::Internal(
            "aggregate called with an empty batch".to_string(),
        ));
    }

    let mut segment_modes = BTreeMap::new();
    let mut distinct_modes = BTreeSet::new();

    for request in batch {
        let zone = registry.resolve(&request.zone)?;
        let effective = request.mode_override.unwrap_or(zone.default_mode);
        distinct_modes.insert(effective);
        for segment in &zone.segments {
            segment_modes.insert(*segment, effective);
        }
    }

    let mode = if distinct_modes.len() == 1 {
        // len() == 1, so the iterator yields exactly one element
        let only = distinct_modes
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Internal("mode set empty after resolution".to_string()))?;
        PlanMode::Uniform(only)
    } else {
        PlanMode::Customized
    };

    Ok(ExecutionPlan {
        segment_modes,
        mode,
    })
}
