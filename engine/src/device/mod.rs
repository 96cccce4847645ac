//! Vacuum device adapters
//!
//! The engine drives the robot through the [`VacuumDevice`] trait. This
//! module provides the shipped implementations and the config-driven
//! selector between them.

pub mod hass;
pub mod recorder;

use crate::config::Config;
use sdk::device::VacuumDevice;
use std::sync::Arc;

/// Build the device capability selected by configuration.
///
/// `device.test_mode = true` substitutes the in-memory recorder so the full
/// pipeline can be exercised without moving a physical robot.
pub fn from_config(config: &Config) -> Arc<dyn VacuumDevice> {
    if config.device.test_mode {
        tracing::warn!("device test mode enabled; commands are recorded, not executed");
        Arc::new(recorder::RecordingVacuum::new())
    } else {
        Arc::new(hass::HassVacuum::from_config(&config.device))
    }
}
