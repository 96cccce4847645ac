//! In-memory recording device
//!
//! Substitutes the physical vacuum in test mode: every command is appended
//! to an ordered log, the reported activity state is scriptable, and
//! acknowledgments can be delayed or made to fail to exercise the
//! dispatcher's timeout and error paths.

use async_trait::async_trait;
use sdk::device::{DeviceError, Result, VacuumDevice};
use sdk::types::{Ack, ActivityState, CleaningMode, SegmentId};
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

/// One recorded device command, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    /// `stop()`
    Stop,

    /// `set_segment_mode(segment, mode)`
    SetSegmentMode {
        segment: SegmentId,
        mode: CleaningMode,
    },

    /// `set_customized_cleaning(enabled)`
    SetCustomizedCleaning { enabled: bool },

    /// `start_cleaning(segments, mode)`
    StartCleaning {
        segments: BTreeSet<SegmentId>,
        mode: Option<CleaningMode>,
    },
}

/// Recording stand-in for the physical vacuum.
#[derive(Debug, Default)]
pub struct RecordingVacuum {
    calls: Mutex<Vec<DeviceCall>>,
    activity: Mutex<ActivityState>,
    ack_delay: Mutex<Duration>,
    fail_next: Mutex<Option<DeviceError>>,
}

impl RecordingVacuum {
    /// Create a recorder reporting a docked, idle robot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the activity state reported to the dispatcher.
    pub fn set_activity(&self, state: ActivityState) {
        *self.activity.lock().expect("recorder mutex poisoned") = state;
    }

    /// Delay every command acknowledgment by `delay`.
    pub fn set_ack_delay(&self, delay: Duration) {
        *self.ack_delay.lock().expect("recorder mutex poisoned") = delay;
    }

    /// Make the next command fail with `error` instead of acknowledging.
    pub fn inject_failure(&self, error: DeviceError) {
        *self.fail_next.lock().expect("recorder mutex poisoned") = Some(error);
    }

    /// Ordered log of commands issued so far.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().expect("recorder mutex poisoned").clone()
    }

    /// Clear the command log.
    pub fn reset(&self) {
        self.calls.lock().expect("recorder mutex poisoned").clear();
    }

    /// Record a command, honoring injected failures and ack delays.
    ///
    /// The command lands in the log before the (possibly delayed) ack, the
    /// way a real robot receives a command before acknowledging it — a
    /// timed-out caller still sees the command as issued.
    async fn command(&self, call: DeviceCall) -> Result<Ack> {
        if let Some(error) = self
            .fail_next
            .lock()
            .expect("recorder mutex poisoned")
            .take()
        {
            return Err(error);
        }

        self.calls.lock().expect("recorder mutex poisoned").push(call);

        let delay = *self.ack_delay.lock().expect("recorder mutex poisoned");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(Ack)
    }
}

#[async_trait]
impl VacuumDevice for RecordingVacuum {
    async fn activity(&self) -> Result<ActivityState> {
        Ok(*self.activity.lock().expect("recorder mutex poisoned"))
    }

    async fn stop(&self) -> Result<Ack> {
        self.command(DeviceCall::Stop).await
    }

    async fn set_segment_mode(&self, segment: SegmentId, mode: CleaningMode) -> Result<Ack> {
        self.command(DeviceCall::SetSegmentMode { segment, mode })
            .await
    }

    async fn set_customized_cleaning(&self, enabled: bool) -> Result<Ack> {
        self.command(DeviceCall::SetCustomizedCleaning { enabled })
            .await
    }

    async fn start_cleaning(
        &self,
        segments: &BTreeSet<SegmentId>,
        mode: Option<CleaningMode>,
    ) -> Result<Ack> {
        self.command(DeviceCall::StartCleaning {
            segments: segments.clone(),
            mode,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_commands_in_order() {
        let recorder = RecordingVacuum::new();
        recorder.stop().await.unwrap();
        recorder
            .set_segment_mode(3, CleaningMode::Sweeping)
            .await
            .unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                DeviceCall::Stop,
                DeviceCall::SetSegmentMode {
                    segment: 3,
                    mode: CleaningMode::Sweeping,
                },
            ]
        );

        recorder.reset();
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn injected_failure_fails_exactly_once() {
        let recorder = RecordingVacuum::new();
        recorder.inject_failure(DeviceError::Rejected("busy".to_string()));

        assert!(recorder.stop().await.is_err());
        assert!(recorder.stop().await.is_ok());
        // the failed command never made it into the log
        assert_eq!(recorder.calls(), vec![DeviceCall::Stop]);
    }

    #[tokio::test]
    async fn activity_is_scriptable() {
        let recorder = RecordingVacuum::new();
        assert_eq!(recorder.activity().await.unwrap(), ActivityState::Docked);

        recorder.set_activity(ActivityState::Cleaning);
        assert_eq!(recorder.activity().await.unwrap(), ActivityState::Cleaning);
    }
}
