//! Request coordination
//!
//! A single actor task owns the request batch and the grouping window. All
//! intake goes through a bounded channel, so appending a request and
//! draining a fired batch can never interleave: window expiry is just
//! another branch of the actor loop, and dispatch runs inline before the
//! next message is read. Requests arriving while a plan dispatches queue in
//! the channel and open a fresh batch afterwards — nothing is lost, and
//! nothing merges into a batch that already fired.

use crate::aggregator::{aggregate, CleaningRequest};
use crate::config::WindowAnchor;
use crate::dispatcher::Dispatcher;
use crate::registry::ZoneRegistry;
use sdk::errors::SweepdErrorExt;
use sdk::types::CleaningMode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Channel capacity for intake commands. Voice commands are human-paced;
/// the bound keeps memory flat rather than shedding load.
const COMMAND_BUFFER_SIZE: usize = 64;

/// Messages accepted by the coordinator task.
enum Command {
    Clean {
        zone: String,
        mode_override: Option<CleaningMode>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Cloneable intake handle to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
    registry: Arc<ZoneRegistry>,
}

impl CoordinatorHandle {
    /// Queue a cleaning request for the given zone.
    ///
    /// Fire-and-forget: the caller never learns about dispatch results.
    /// Unknown zones are logged and dropped here, before they can enter a
    /// batch; a coordinator that is already gone logs and drops too.
    pub async fn request_clean(&self, zone: &str, mode_override: Option<CleaningMode>) {
        if self.registry.resolve(zone).is_err() {
            warn!(zone, "ignoring request for unknown zone");
            return;
        }

        let command = Command::Clean {
            zone: zone.to_string(),
            mode_override,
        };
        if self.tx.send(command).await.is_err() {
            warn!(zone, "coordinator is gone, dropping request");
        }
    }

    /// Registry backing this coordinator, for listing surfaces.
    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Stop the coordinator. Any pending batch is dropped without
    /// dispatch; waits until the actor task has acknowledged.
    pub async fn shutdown(&self) {
        let (done, done_rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown { done }).await.is_ok() {
            done_rx.await.ok();
        }
    }
}

/// The coordinator actor and its spawn configuration.
pub struct Coordinator {
    registry: Arc<ZoneRegistry>,
    dispatcher: Dispatcher,
    window: Duration,
    anchor: WindowAnchor,
}

impl Coordinator {
    /// Create a coordinator over the given registry and dispatcher.
    pub fn new(
        registry: Arc<ZoneRegistry>,
        dispatcher: Dispatcher,
        window: Duration,
        anchor: WindowAnchor,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            window,
            anchor,
        }
    }

    /// Spawn the actor task, returning the intake handle and the task's
    /// join handle.
    pub fn spawn(self) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let handle = CoordinatorHandle {
            tx,
            registry: Arc::clone(&self.registry),
        };
        let join = tokio::spawn(self.run(rx));
        (handle, join)
    }

    async fn run(self, mut rx: mpsc::Receiver<Command>) {
        let mut batch: Vec<CleaningRequest> = Vec::new();
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                message = rx.recv() => match message {
                    Some(Command::Clean { zone, mode_override }) => {
                        debug!(zone = %zone, queued = batch.len(), "request joins batch");
                        batch.push(CleaningRequest::new(zone, mode_override));

                        // With the default first-request anchor the window
                        // never extends once armed; the quiet-period anchor
                        // re-arms it on every request.
                        if deadline.is_none() || self.anchor == WindowAnchor::LastRequest {
                            deadline = Some(Instant::now() + self.window);
                        }
                    }
                    Some(Command::Shutdown { done }) => {
                        if !batch.is_empty() {
                            info!(pending = batch.len(), "shutdown requested, dropping pending batch");
                        }
                        let _ = done.send(());
                        return;
                    }
                    None => {
                        if !batch.is_empty() {
                            info!(pending = batch.len(), "all handles dropped, discarding pending batch");
                        }
                        return;
                    }
                },
                _ = wait_for(deadline) => {
                    // Drain atomically; a request racing this expiry sits in
                    // the channel and opens the next batch.
                    let fired = std::mem::take(&mut batch);
                    deadline = None;
                    self.execute(fired).await;
                }
            }
        }
    }

    /// Aggregate and dispatch one fired batch.
    async fn execute(&self, batch: Vec<CleaningRequest>) {
        let queued_for = batch
            .first()
            .map(|request| request.received_at.elapsed())
            .unwrap_or_default();

        match aggregate(&self.registry, &batch) {
            Ok(plan) => {
                info!(
                    requests = batch.len(),
                    segments = plan.segment_modes.len(),
                    customized = plan.requires_customized_cleaning(),
                    queued_for = ?queued_for,
                    "grouping window fired, dispatching plan"
                );
                if let Err(error) = self.dispatcher.dispatch(&plan).await {
                    warn!(%error, hint = error.user_hint(), "dispatch failed");
                }
            }
            Err(error) => warn!(%error, "failed to aggregate batch"),
        }
    }
}

/// Sleep until the window deadline, or forever while no window is armed.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
