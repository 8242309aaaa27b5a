//! HTTP client for the release tracker

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use sgdeploy_core::{
    ComponentRecord, DeployError, DeployResult, ReleaseRecord, TrackerSettings,
};
use tracing::{debug, info, warn};

use crate::traits::ReleaseTracker;
use crate::wire::{ComponentPayload, ReleasePayload, COMPONENT_PATH, RELEASE_PATH};

/// Release tracker reached over its REST API
pub struct HttpReleaseTracker {
    base_url: String,
    token: String,
    settings: TrackerSettings,
    client: reqwest::Client,
}

impl HttpReleaseTracker {
    /// Create a client; `token` is sent verbatim as the `Authorization` header
    pub fn new(settings: TrackerSettings, token: String) -> DeployResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| DeployError::Tracker(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: settings.host.trim_end_matches('/').to_string(),
            token,
            settings,
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn put<T: Serialize>(&self, path: &str, body: &T) -> DeployResult<u16> {
        let url = self.url(path);

        if let Ok(json) = serde_json::to_string(body) {
            debug!(url = %url, body = %json, "Sending tracker request");
        }

        let response = self
            .client
            .put(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| DeployError::Tracker(format!("PUT {} failed: {}", url, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            url = %url,
            status = status.as_u16(),
            body = %body,
            "Tracker rejected request"
        );
        Err(DeployError::TrackerStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ReleaseTracker for HttpReleaseTracker {
    async fn upsert_component(&self, component: &ComponentRecord) -> DeployResult<u16> {
        info!(
            slug = %component.slug,
            display_name = %component.display_name,
            version = %component.current_version.name,
            "Upserting component"
        );

        let payload = ComponentPayload::new(component, &self.settings);
        self.put(COMPONENT_PATH, &payload).await
    }

    async fn upsert_release(&self, release: &ReleaseRecord) -> DeployResult<u16> {
        info!(
            slug = %release.component_slug,
            status = %release.status,
            step_status = %release.step.status,
            step_type = %release.step.step_type,
            ended = release.step.ended_at.is_some(),
            "Upserting release"
        );

        let payload = ReleasePayload::new(release, &self.settings);
        self.put(RELEASE_PATH, &payload).await
    }
}
