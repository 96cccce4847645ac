//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - start: run the coordinator daemon in the foreground
//! - check: validate configuration
//! - zones: list configured zones
//! - clean: queue zones through the normal pipeline and dispatch once

use anyhow::{Context, Result};
use sdk::device::VacuumDevice;
use sdk::types::CleaningMode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{aggregate, CleaningRequest, PlanMode};
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::device;
use crate::device::recorder::RecordingVacuum;
use crate::dispatcher::Dispatcher;
use crate::intake::IntakeServer;
use crate::registry::ZoneRegistry;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

fn dispatcher_from(config: &Config, device: Arc<dyn VacuumDevice>) -> Dispatcher {
    Dispatcher::new(
        device,
        Duration::from_secs(config.device.stop_timeout_secs),
        Duration::from_secs(config.device.ack_timeout_secs),
    )
}

/// Validate the configuration and report the result.
///
/// Loading already validated the file; building the registry re-checks the
/// zone table through the exact path the daemon uses at startup.
pub fn handle_check(config: &Config, format: OutputFormat) -> Result<()> {
    let registry = ZoneRegistry::from_config(config)?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "ok": true, "zones": registry.len(), "test_mode": config.device.test_mode })
        ),
        OutputFormat::Text => {
            println!("Configuration OK ({} zones)", registry.len());
            if config.device.test_mode {
                println!("Device test mode is enabled; no robot will move.");
            }
        }
    }
    Ok(())
}

/// List configured zones with their segments and default modes.
pub fn handle_zones(config: &Config, format: OutputFormat) -> Result<()> {
    let registry = ZoneRegistry::from_config(config)?;

    match format {
        OutputFormat::Json => {
            let mut zones = Vec::new();
            for id in registry.zone_ids() {
                let zone = registry.resolve(id)?;
                zones.push(json!({
                    "id": id,
                    "name": zone.name,
                    "segments": zone.segments.iter().collect::<Vec<_>>(),
                    "default_mode": zone.default_mode,
                }));
            }
            println!("{}", json!(zones));
        }
        OutputFormat::Text => {
            for id in registry.zone_ids() {
                let zone = registry.resolve(id)?;
                let segments: Vec<String> =
                    zone.segments.iter().map(|s| s.to_string()).collect();
                println!(
                    "{:<20} segments=[{}] mode={}",
                    id,
                    segments.join(", "),
                    zone.default_mode
                );
            }
        }
    }
    Ok(())
}

/// Queue the given zones as one batch and dispatch the combined plan.
///
/// Runs the same aggregate-then-dispatch pipeline as the daemon; the
/// grouping window is skipped because the whole batch is already known.
/// Unlike daemon intake, a typoed zone fails fast here.
pub async fn handle_clean(
    zones: &[String],
    mode: Option<CleaningMode>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let registry = ZoneRegistry::from_config(config)?;
    for zone in zones {
        registry.resolve(zone).with_context(|| format!("zone '{}'", zone))?;
    }

    let batch: Vec<CleaningRequest> = zones
        .iter()
        .map(|zone| CleaningRequest::new(zone.clone(), mode))
        .collect();
    let plan = aggregate(&registry, &batch)?;
    let segments = plan.segments();

    if config.device.test_mode {
        let recorder = Arc::new(RecordingVacuum::new());
        dispatcher_from(config, Arc::clone(&recorder) as Arc<dyn VacuumDevice>)
            .dispatch(&plan)
            .await?;
        report_clean(&plan.mode, segments.len(), format);
        for call in recorder.calls() {
            println!("recorded: {:?}", call);
        }
    } else {
        let device = device::from_config(config);
        dispatcher_from(config, device).dispatch(&plan).await?;
        report_clean(&plan.mode, segments.len(), format);
    }

    Ok(())
}

fn report_clean(mode: &PlanMode, segment_count: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mode_value = match mode {
                PlanMode::Uniform(mode) => json!(mode),
                PlanMode::Customized => json!("customized"),
            };
            println!(
                "{}",
                json!({ "started": true, "segments": segment_count, "mode": mode_value })
            );
        }
        OutputFormat::Text => match mode {
            PlanMode::Uniform(mode) => {
                println!("Cleaning started: {} segments, mode {}", segment_count, mode)
            }
            PlanMode::Customized => println!(
                "Cleaning started: {} segments, customized per-segment modes",
                segment_count
            ),
        },
    }
}

/// Run the coordinator daemon in the foreground until ctrl-c.
pub async fn handle_start(config: &Config) -> Result<()> {
    let registry = Arc::new(ZoneRegistry::from_config(config)?);
    let device = device::from_config(config);
    let dispatcher = dispatcher_from(config, device);

    let coordinator = Coordinator::new(
        Arc::clone(&registry),
        dispatcher,
        Duration::from_millis(config.grouping.window_ms),
        config.grouping.anchor,
    );
    let (handle, join) = coordinator.spawn();

    let intake = IntakeServer::start(&config.intake.listen, handle.clone()).await?;
    tracing::info!(
        addr = %intake.addr(),
        zones = registry.len(),
        window_ms = config.grouping.window_ms,
        "sweepd ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");

    // Stop taking requests, then cancel the window; a pending batch is
    // dropped rather than half-dispatched.
    intake.shutdown();
    handle.shutdown().await;
    join.await.ok();

    Ok(())
}
