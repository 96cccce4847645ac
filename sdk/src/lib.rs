//! Sweepd SDK
//!
//! Shared vocabulary between the sweepd engine and device adapters:
//! cleaning modes, segment addressing, activity states, the vacuum
//! capability trait, and error types.

pub mod device;
pub mod errors;
pub mod types;

pub use device::{DeviceError, VacuumDevice};
pub use errors::{DispatchStep, EngineError, SweepdErrorExt};
pub use types::{Ack, ActivityState, CleaningMode, SegmentId};
