//! Home Assistant device adapter
//!
//! Drives the physical vacuum through a Home Assistant instance: activity
//! comes from the vacuum entity's state, commands go out as service calls.
//! CleanGenius modes (`routine_cleaning`, `deep_cleaning`) are selected
//! through the CleanGenius selector; the plain modes turn CleanGenius off
//! and use the cleaning-mode selector, matching how the robot's own app
//! switches between the two.
//!
//! Entity naming follows the integration convention: the selectors and the
//! customized-cleaning switch are derived from the vacuum entity id, e.g.
//! `vacuum.x40_ultra_complete` owns `select.x40_ultra_complete_cleangenius`
//! and `switch.x40_ultra_complete_customized_cleaning`.

use async_trait::async_trait;
use reqwest::Client;
use sdk::device::{DeviceError, Result, VacuumDevice};
use sdk::types::{Ack, ActivityState, CleaningMode, SegmentId};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::DeviceConfig;

/// REST adapter for a vacuum supervised by Home Assistant.
#[derive(Debug, Clone)]
pub struct HassVacuum {
    /// Base URL of the Home Assistant instance
    base_url: String,

    /// Long-lived access token
    token: String,

    /// Vacuum entity id, e.g. "vacuum.x40_ultra_complete"
    entity_id: String,

    /// Integration domain providing the segment services
    service_domain: String,

    /// HTTP client for API requests
    client: Client,
}

/// Entity state payload returned by /api/states/{entity_id}
#[derive(Debug, Deserialize)]
struct StateResponse {
    state: ActivityState,
}

impl HassVacuum {
    /// Create an adapter from the device section of the configuration.
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            entity_id: config.entity_id.clone(),
            service_domain: config.service_domain.clone(),
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Vacuum entity id without its domain prefix, the stem the sibling
    /// select/switch entities are named after.
    fn device_slug(&self) -> &str {
        self.entity_id
            .strip_prefix("vacuum.")
            .unwrap_or(&self.entity_id)
    }

    fn select_entity(&self, suffix: &str) -> String {
        format!("select.{}_{}", self.device_slug(), suffix)
    }

    fn switch_entity(&self, suffix: &str) -> String {
        format!("switch.{}_{}", self.device_slug(), suffix)
    }

    /// POST /api/services/{domain}/{service}
    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        payload: serde_json::Value,
    ) -> Result<Ack> {
        let url = format!("{}/api/services/{}/{}", self.base_url, domain, service);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeviceError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(Ack);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(DeviceError::Rejected(format!(
                "{}/{} returned {}: {}",
                domain, service, status, body
            )))
        } else {
            Err(DeviceError::Unavailable(format!(
                "{}/{} returned {}: {}",
                domain, service, status, body
            )))
        }
    }

    /// Set an option on one of the device's select entities.
    async fn select_option(&self, entity_id: String, option: &str) -> Result<Ack> {
        self.call_service(
            "select",
            "select_option",
            json!({
                "entity_id": entity_id,
                "option": option,
            }),
        )
        .await
    }

    /// Route the cleaning mode through the right selector before a start.
    async fn apply_mode(&self, mode: CleaningMode) -> Result<Ack> {
        if mode.is_clean_genius() {
            self.select_option(self.select_entity("cleangenius"), mode.as_str())
                .await?;
            self.select_option(self.select_entity("cleangenius_mode"), "vacuum_and_mop")
                .await
        } else {
            self.select_option(self.select_entity("cleangenius"), "off")
                .await?;
            self.select_option(self.select_entity("cleaning_mode"), mode.as_str())
                .await
        }
    }
}

#[async_trait]
impl VacuumDevice for HassVacuum {
    async fn activity(&self) -> Result<ActivityState> {
        let url = format!("{}/api/states/{}", self.base_url, self.entity_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DeviceError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DeviceError::Unavailable(format!(
                "entity {} not found",
                self.entity_id
            )));
        }
        if !status.is_success() {
            return Err(DeviceError::Unavailable(format!(
                "state query returned {}",
                status
            )));
        }

        let state: StateResponse = response
            .json()
            .await
            .map_err(|e| DeviceError::InvalidResponse(e.to_string()))?;

        Ok(state.state)
    }

    async fn stop(&self) -> Result<Ack> {
        self.call_service(
            "vacuum",
            "stop",
            json!({ "entity_id": self.entity_id }),
        )
        .await
    }

    async fn set_segment_mode(&self, segment: SegmentId, mode: CleaningMode) -> Result<Ack> {
        self.call_service(
            &self.service_domain,
            "vacuum_set_cleaning_mode",
            json!({
                "entity_id": self.entity_id,
                "segment": segment,
                "cleaning_mode": mode.as_str(),
            }),
        )
        .await
    }

    async fn set_customized_cleaning(&self, enabled: bool) -> Result<Ack> {
        let service = if enabled { "turn_on" } else { "turn_off" };
        self.call_service(
            "switch",
            service,
            json!({ "entity_id": self.switch_entity("customized_cleaning") }),
        )
        .await
    }

    async fn start_cleaning(
        &self,
        segments: &BTreeSet<SegmentId>,
        mode: Option<CleaningMode>,
    ) -> Result<Ack> {
        if let Some(mode) = mode {
            self.apply_mode(mode).await?;
        }

        self.call_service(
            &self.service_domain,
            "vacuum_clean_segment",
            json!({
                "entity_id": self.entity_id,
                "segments": segments.iter().collect::<Vec<_>>(),
            }),
        )
        .await
    }
}
