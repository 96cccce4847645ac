//! Plan dispatch
//!
//! Turns one execution plan into the ordered command sequence against the
//! vacuum capability: query activity, stop if the robot is busy, configure
//! per-segment preferences for customized plans, then issue the single
//! combined start. Every acknowledgment wait is bounded; a failed or
//! timed-out step aborts the sequence with no retry and no rollback — the
//! device's own state is the source of truth afterwards, and the next
//! batch starts from a fresh plan.

use crate::aggregator::{ExecutionPlan, PlanMode};
use sdk::device::{self, VacuumDevice};
use sdk::errors::{DispatchStep, EngineError};
use sdk::types::Ack;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Executes plans one at a time against a single physical device.
///
/// The coordinator awaits each dispatch before reading the next intake
/// message, so two plans can never race against the same robot.
pub struct Dispatcher {
    device: Arc<dyn VacuumDevice>,
    stop_timeout: Duration,
    ack_timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with explicit acknowledgment budgets.
    pub fn new(
        device: Arc<dyn VacuumDevice>,
        stop_timeout: Duration,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            device,
            stop_timeout,
            ack_timeout,
        }
    }

    /// Run the full command sequence for one plan.
    ///
    /// Step order is a device protocol requirement: preferences are
    /// configured strictly before the start command, and a busy robot is
    /// stopped (and has acknowledged the stop) before anything else is
    /// issued.
    pub async fn dispatch(&self, plan: &ExecutionPlan) -> Result<Ack, EngineError> {
        let activity = self
            .bounded(
                DispatchStep::QueryActivity,
                self.ack_timeout,
                self.device.activity(),
            )
            .await?;

        if activity.is_active() {
            info!(?activity, "device busy, stopping current job first");
            self.bounded(DispatchStep::Stop, self.stop_timeout, self.device.stop())
                .await?;
        }

        let segments = plan.segments();
        match plan.mode {
            PlanMode::Customized => {
                for (segment, mode) in &plan.segment_modes {
                    debug!(segment, %mode, "configuring segment preference");
                    self.bounded(
                        DispatchStep::ConfigureSegment,
                        self.ack_timeout,
                        self.device.set_segment_mode(*segment, *mode),
                    )
                    .await?;
                }
                self.bounded(
                    DispatchStep::SetCustomized,
                    self.ack_timeout,
                    self.device.set_customized_cleaning(true),
                )
                .await?;

                info!(segments = segments.len(), "starting customized cleaning");
                self.bounded(
                    DispatchStep::Start,
                    self.ack_timeout,
                    self.device.start_cleaning(&segments, None),
                )
                .await
            }
            PlanMode::Uniform(mode) => {
                // A previous customized job must not leak per-segment
                // preferences into this one.
                self.bounded(
                    DispatchStep::SetCustomized,
                    self.ack_timeout,
                    self.device.set_customized_cleaning(false),
                )
                .await?;

                info!(segments = segments.len(), %mode, "starting cleaning");
                self.bounded(
                    DispatchStep::Start,
                    self.ack_timeout,
                    self.device.start_cleaning(&segments, Some(mode)),
                )
                .await
            }
        }
    }

    async fn bounded<T>(
        &self,
        step: DispatchStep,
        budget: Duration,
        call: impl Future<Output = device::Result<T>>,
    ) -> Result<T, EngineError> {
        match tokio::time::timeout(budget, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                warn!(%step, %source, "device call failed");
                Err(EngineError::Dispatch { step, source })
            }
            Err(_) => {
                warn!(%step, budget_ms = budget.as_millis() as u64, "device acknowledgment timed out");
                Err(EngineError::DeviceTimeout { step })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recorder::{DeviceCall, RecordingVacuum};
    use sdk::types::{ActivityState, CleaningMode};
    use std::collections::BTreeMap;

    fn dispatcher(recorder: &Arc<RecordingVacuum>) -> Dispatcher {
        Dispatcher::new(
            Arc::clone(recorder) as Arc<dyn VacuumDevice>,
            Duration::from_secs(2),
            Duration::from_secs(2),
        )
    }

    fn uniform_plan() -> ExecutionPlan {
        let mut segment_modes = BTreeMap::new();
        segment_modes.insert(1, CleaningMode::Sweeping);
        segment_modes.insert(2, CleaningMode::Sweeping);
        ExecutionPlan {
            segment_modes,
            mode: PlanMode::Uniform(CleaningMode::Sweeping),
        }
    }

    fn customized_plan() -> ExecutionPlan {
        let mut segment_modes = BTreeMap::new();
        segment_modes.insert(1, CleaningMode::Sweeping);
        segment_modes.insert(4, CleaningMode::DeepCleaning);
        ExecutionPlan {
            segment_modes,
            mode: PlanMode::Customized,
        }
    }

    #[tokio::test]
    async fn uniform_plan_starts_without_preferences() {
        let recorder = Arc::new(RecordingVacuum::new());
        dispatcher(&recorder).dispatch(&uniform_plan()).await.unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                DeviceCall::SetCustomizedCleaning { enabled: false },
                DeviceCall::StartCleaning {
                    segments: [1, 2].into_iter().collect(),
                    mode: Some(CleaningMode::Sweeping),
                },
            ]
        );
    }

    #[tokio::test]
    async fn customized_plan_configures_before_start() {
        let recorder = Arc::new(RecordingVacuum::new());
        dispatcher(&recorder)
            .dispatch(&customized_plan())
            .await
            .unwrap();

        assert_eq!(
            recorder.calls(),
            vec![
                DeviceCall::SetSegmentMode {
                    segment: 1,
                    mode: CleaningMode::Sweeping,
                },
                DeviceCall::SetSegmentMode {
                    segment: 4,
                    mode: CleaningMode::DeepCleaning,
                },
                DeviceCall::SetCustomizedCleaning { enabled: true },
                DeviceCall::StartCleaning {
                    segments: [1, 4].into_iter().collect(),
                    mode: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn busy_device_is_stopped_first() {
        let recorder = Arc::new(RecordingVacuum::new());
        recorder.set_activity(ActivityState::Cleaning);
        dispatcher(&recorder).dispatch(&uniform_plan()).await.unwrap();

        assert_eq!(recorder.calls().first(), Some(&DeviceCall::Stop));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_timeout_aborts_without_start() {
        let recorder = Arc::new(RecordingVacuum::new());
        recorder.set_activity(ActivityState::Cleaning);
        recorder.set_ack_delay(Duration::from_secs(30));

        let result = dispatcher(&recorder).dispatch(&uniform_plan()).await;
        assert!(matches!(
            result,
            Err(EngineError::DeviceTimeout {
                step: DispatchStep::Stop,
            })
        ));
        // The stop was issued but nothing after it
        assert_eq!(recorder.calls(), vec![DeviceCall::Stop]);
    }

    #[tokio::test]
    async fn rejection_surfaces_the_failing_step() {
        let recorder = Arc::new(RecordingVacuum::new());
        recorder.inject_failure(sdk::device::DeviceError::Rejected(
            "invalid segment".to_string(),
        ));

        let result = dispatcher(&recorder).dispatch(&uniform_plan()).await;
        assert!(matches!(
            result,
            Err(EngineError::Dispatch {
                step: DispatchStep::SetCustomized,
                ..
            })
        ));
    }
}
