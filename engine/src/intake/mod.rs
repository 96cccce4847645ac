//! HTTP intake listener
//!
//! The transport the (external) voice-assistant and virtual-entity layers
//! call into. One route per operation: queue a cleaning request, list the
//! configured zones, report liveness. A request is accepted (202) as soon
//! as it is queued — completion is never reported back, matching the
//! fire-and-forget intake contract.
//!
//! # Endpoints
//!
//! - POST /api/zones/{zone}/clean - Queue a cleaning request
//! - GET /api/zones - List configured zones
//! - GET /api/status - Daemon liveness and version

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sdk::errors::EngineError;
use sdk::types::{CleaningMode, SegmentId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::coordinator::CoordinatorHandle;

/// Request body for POST /api/zones/{zone}/clean
#[derive(Debug, Default, Deserialize)]
struct CleanRequestBody {
    /// Overrides the zone's default cleaning mode
    mode: Option<CleaningMode>,
}

/// Zone summary returned by GET /api/zones
#[derive(Debug, Serialize)]
struct ZoneSummary {
    id: String,
    name: String,
    segments: Vec<SegmentId>,
    default_mode: CleaningMode,
}

/// Running intake listener.
pub struct IntakeServer {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
}

impl IntakeServer {
    /// Bind `listen` and serve the intake routes on a spawned task.
    pub async fn start(listen: &str, handle: CoordinatorHandle) -> Result<Self, EngineError> {
        let listener = TcpListener::bind(listen)
            .await
            .map_err(|e| EngineError::Intake(format!("failed to bind {}: {}", listen, e)))?;

        let addr = listener
            .local_addr()
            .map_err(|e| EngineError::Intake(format!("failed to read local address: {}", e)))?;

        let app = router(handle);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            tracing::info!(%addr, "intake listening");
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(error) = serve.await {
                tracing::error!(%error, "intake server error");
            }
        });

        Ok(Self { addr, shutdown_tx })
    }

    /// Address actually bound (relevant when configured with port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting requests.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn router(handle: CoordinatorHandle) -> Router {
    Router::new()
        .route("/api/zones", get(list_zones))
        .route("/api/zones/:zone/clean", post(request_clean))
        .route("/api/status", get(status))
        .with_state(handle)
}

/// POST /api/zones/{zone}/clean
///
/// Unknown zones get a 404 here, at the edge; past this point intake is
/// fire-and-forget and the caller learns nothing more.
async fn request_clean(
    State(handle): State<CoordinatorHandle>,
    Path(zone): Path<String>,
    body: Option<Json<CleanRequestBody>>,
) -> Response {
    if handle.registry().resolve(&zone).is_err() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown zone '{}'", zone) })),
        )
            .into_response();
    }

    let mode = body.and_then(|Json(body)| body.mode);
    handle.request_clean(&zone, mode).await;

    (StatusCode::ACCEPTED, Json(json!({ "queued": zone }))).into_response()
}

/// GET /api/zones
async fn list_zones(State(handle): State<CoordinatorHandle>) -> Json<Vec<ZoneSummary>> {
    let registry = handle.registry();
    let zones = registry
        .zone_ids()
        .into_iter()
        .filter_map(|id| {
            registry.resolve(id).ok().map(|zone| ZoneSummary {
                id: id.to_string(),
                name: zone.name.clone(),
                segments: zone.segments.iter().copied().collect(),
                default_mode: zone.default_mode,
            })
        })
        .collect();
    Json(zones)
}

/// GET /api/status
async fn status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
