//! Error types and handling
//!
//! This module provides the error types used throughout the sweepd engine.
//! All errors implement the `SweepdErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable.
//!
//! The dispatch variants carry the step of the device command sequence that
//! failed, because a half-completed sequence is never rolled back or
//! retried: the device's own state is the source of truth afterwards, and
//! the operator needs to know how far the sequence got.

use crate::device::DeviceError;
use std::fmt;
use thiserror::Error;

/// Trait for sweepd error extensions
///
/// Provides additional context for errors: a hint safe to show to end
/// users, and whether the error is recoverable. Recoverable errors can be
/// retried by issuing a new request; non-recoverable ones require fixing
/// the installation before restarting.
pub trait SweepdErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    fn is_recoverable(&self) -> bool;
}

/// Phase of the dispatch sequence, for error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStep {
    /// Reading the robot's activity state
    QueryActivity,

    /// Stopping a job already in progress
    Stop,

    /// Writing a per-segment mode preference
    ConfigureSegment,

    /// Toggling the customized-cleaning flag
    SetCustomized,

    /// The combined start-cleaning command
    Start,
}

impl fmt::Display for DispatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchStep::QueryActivity => "activity query",
            DispatchStep::Stop => "stop",
            DispatchStep::ConfigureSegment => "segment preference configuration",
            DispatchStep::SetCustomized => "customized-cleaning toggle",
            DispatchStep::Start => "start command",
        };
        f.write_str(name)
    }
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: malformed config or zone table, fatal at startup
/// - **Intake**: a request referenced a zone the registry does not know
/// - **Dispatch**: a device command failed or its acknowledgment timed out
/// - **Listener**: the intake HTTP surface could not start
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Intake errors
    #[error("Unknown zone: {0}")]
    UnknownZone(String),

    // Dispatch errors
    #[error("Device acknowledgment timed out during {step}")]
    DeviceTimeout { step: DispatchStep },

    #[error("Dispatch failed during {step}: {source}")]
    Dispatch {
        step: DispatchStep,
        #[source]
        source: DeviceError,
    },

    // Intake listener errors
    #[error("Intake listener error: {0}")]
    Intake(String),

    // Anything that indicates a bug rather than an environment problem
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SweepdErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            EngineError::Config(_) => "Fix the configuration file and restart",
            EngineError::UnknownZone(_) => "Check the zone name against `sweepd zones`",
            EngineError::DeviceTimeout { .. } => {
                "The robot did not acknowledge in time; check that it is powered and reachable"
            }
            EngineError::Dispatch { .. } => {
                "The robot refused a command; its own state is authoritative, issue a new request"
            }
            EngineError::Intake(_) => "Check the intake listen address and that the port is free",
            EngineError::Internal(_) => "This is a bug in sweepd; please report it",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            EngineError::Config(_) => false,
            EngineError::UnknownZone(_) => true,
            EngineError::DeviceTimeout { .. } => true,
            EngineError::Dispatch { .. } => true,
            EngineError::Intake(_) => false,
            EngineError::Internal(_) => false,
        }
    }
}
