//! Vacuum capability trait
//!
//! The engine drives the physical robot exclusively through the
//! [`VacuumDevice`] trait, so the same dispatch sequence works against a
//! Home Assistant instance, a recording stand-in, or anything else that can
//! acknowledge the five commands below.

use crate::types::{Ack, ActivityState, CleaningMode, SegmentId};
use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

/// Result type for device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Errors returned by a vacuum capability implementation
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The device received the command and explicitly refused it
    #[error("device rejected command: {0}")]
    Rejected(String),

    /// The device (or the bridge in front of it) could not be reached
    #[error("device unavailable: {0}")]
    Unavailable(String),

    /// Transport-level failure between the engine and the device bridge
    #[error("transport error: {0}")]
    Transport(String),

    /// The device answered with something we could not interpret
    #[error("invalid device response: {0}")]
    InvalidResponse(String),
}

/// Commands the engine can issue against the physical vacuum.
///
/// Implementations must be shareable across tasks. The dispatcher is the
/// only caller and issues commands strictly one at a time; acknowledgment
/// waits are bounded by the dispatcher, not by implementations.
#[async_trait]
pub trait VacuumDevice: Send + Sync {
    /// Current activity state as reported by the robot.
    async fn activity(&self) -> Result<ActivityState>;

    /// Stop the current job. Resolves once the robot acknowledges the stop.
    async fn stop(&self) -> Result<Ack>;

    /// Record a per-segment mode preference for the next customized job.
    async fn set_segment_mode(&self, segment: SegmentId, mode: CleaningMode) -> Result<Ack>;

    /// Toggle the customized-cleaning capability flag.
    async fn set_customized_cleaning(&self, enabled: bool) -> Result<Ack>;

    /// Start cleaning the given segments in one combined job.
    ///
    /// `mode` is `None` for customized jobs, where per-segment preferences
    /// were configured beforehand.
    async fn start_cleaning(
        &self,
        segments: &BTreeSet<SegmentId>,
        mode: Option<CleaningMode>,
    ) -> Result<Ack>;
}
