//! Integration tests for the HTTP intake listener
//!
//! These run against real sockets, so they use a short real-time grouping
//! window instead of paused time.

use sdk::device::VacuumDevice;
use sdk::types::CleaningMode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use sweepd_engine::config::{Config, WindowAnchor};
use sweepd_engine::coordinator::{Coordinator, CoordinatorHandle};
use sweepd_engine::device::recorder::{DeviceCall, RecordingVacuum};
use sweepd_engine::dispatcher::Dispatcher;
use sweepd_engine::intake::IntakeServer;
use sweepd_engine::registry::ZoneRegistry;
use tokio::time::sleep;

const WINDOW: Duration = Duration::from_millis(100);

fn test_registry() -> Arc<ZoneRegistry> {
    let config: Config = toml::from_str(
        r#"
[device]
test_mode = true

[zones.kitchen]
segments = [1]

[zones.hallway]
name = "Hallway and entry"
segments = [2, 3]
"#,
    )
    .expect("fixture must parse");
    Arc::new(ZoneRegistry::from_config(&config).expect("fixture must validate"))
}

async fn start_stack() -> (Arc<RecordingVacuum>, CoordinatorHandle, IntakeServer) {
    let recorder = Arc::new(RecordingVacuum::new());
    let dispatcher = Dispatcher::new(
        Arc::clone(&recorder) as Arc<dyn VacuumDevice>,
        Duration::from_secs(1),
        Duration::from_secs(1),
    );
    let (handle, _join) = Coordinator::new(
        test_registry(),
        dispatcher,
        WINDOW,
        WindowAnchor::FirstRequest,
    )
    .spawn();

    let server = IntakeServer::start("127.0.0.1:0", handle.clone())
        .await
        .expect("intake must bind");
    (recorder, handle, server)
}

fn start_calls(recorder: &RecordingVacuum) -> Vec<DeviceCall> {
    recorder
        .calls()
        .into_iter()
        .filter(|call| matches!(call, DeviceCall::StartCleaning { .. }))
        .collect()
}

#[tokio::test]
async fn clean_request_flows_through_to_the_device() {
    let (recorder, _handle, server) = start_stack().await;
    let base = format!("http://{}", server.addr());
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/zones/kitchen/clean", base))
        .json(&json!({ "mode": "deep_cleaning" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    sleep(WINDOW * 5).await;
    let starts = start_calls(&recorder);
    assert_eq!(starts.len(), 1);
    assert_eq!(
        starts[0],
        DeviceCall::StartCleaning {
            segments: [1].into_iter().collect(),
            mode: Some(CleaningMode::DeepCleaning),
        }
    );
}

#[tokio::test]
async fn missing_body_falls_back_to_the_zone_default() {
    let (recorder, _handle, server) = start_stack().await;
    let base = format!("http://{}", server.addr());
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/zones/hallway/clean", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    sleep(WINDOW * 5).await;
    let starts = start_calls(&recorder);
    assert_eq!(starts.len(), 1);
    assert_eq!(
        starts[0],
        DeviceCall::StartCleaning {
            segments: [2, 3].into_iter().collect(),
            mode: Some(CleaningMode::Sweeping),
        }
    );
}

#[tokio::test]
async fn unknown_zone_is_rejected_at_the_edge() {
    let (recorder, _handle, server) = start_stack().await;
    let base = format!("http://{}", server.addr());
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/zones/garage/clean", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    sleep(WINDOW * 5).await;
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn zones_are_listed_with_their_segments() {
    let (_recorder, _handle, server) = start_stack().await;
    let base = format!("http://{}", server.addr());

    let zones: serde_json::Value = reqwest::get(format!("{}/api/zones", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let zones = zones.as_array().expect("zones must be an array");
    assert_eq!(zones.len(), 2);

    let hallway = zones
        .iter()
        .find(|zone| zone["id"] == "hallway")
        .expect("hallway must be listed");
    assert_eq!(hallway["name"], "Hallway and entry");
    assert_eq!(hallway["segments"], json!([2, 3]));
    assert_eq!(hallway["default_mode"], "sweeping");
}

#[tokio::test]
async fn status_reports_liveness() {
    let (_recorder, _handle, server) = start_stack().await;
    let base = format!("http://{}", server.addr());

    let status: serde_json::Value = reqwest::get(format!("{}/api/status", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "ok");
}

#[tokio::test]
async fn shutdown_stops_accepting_requests() {
    let (_recorder, _handle, server) = start_stack().await;
    let base = format!("http://{}", server.addr());
    server.shutdown();

    // give the listener a moment to wind down
    sleep(Duration::from_millis(200)).await;

    let result = reqwest::Client::new()
        .post(format!("{}/api/zones/kitchen/clean", base))
        .send()
        .await;
    assert!(result.is_err());
}
