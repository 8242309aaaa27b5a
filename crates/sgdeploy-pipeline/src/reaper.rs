//! Cleanup of superseded hosting resources

use std::sync::Arc;

use serde::Serialize;
use sgdeploy_core::{DeployResult, ResourceSnapshot};
use sgdeploy_platform::HostingPlatform;
use tracing::info;

/// Names of the resources a reap deleted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReapReport {
    pub models: Vec<String>,
    pub endpoint_configs: Vec<String>,
}

impl ReapReport {
    pub fn total(&self) -> usize {
        self.models.len() + self.endpoint_configs.len()
    }
}

/// Deletes models and endpoint configs left behind by earlier rollouts
pub struct ResourceReaper {
    platform: Arc<dyn HostingPlatform>,
}

impl ResourceReaper {
    pub fn new(platform: Arc<dyn HostingPlatform>) -> Self {
        Self { platform }
    }

    /// Delete every snapshotted model and endpoint config whose name contains
    /// `model_name`, except those named in `keep`. The first failed delete
    /// aborts the reap.
    pub async fn reap(
        &self,
        model_name: &str,
        snapshot: &ResourceSnapshot,
        keep: &[&str],
    ) -> DeployResult<ReapReport> {
        let mut report = ReapReport::default();
        let stale = |name: &str| name.contains(model_name) && !keep.contains(&name);

        for model in snapshot.models.iter().filter(|m| stale(&m.name)) {
            self.platform.delete_model(&model.name).await?;
            info!(model = %model.name, "Deleted model");
            report.models.push(model.name.clone());
        }

        for config in snapshot.endpoint_configs.iter().filter(|c| stale(&c.name)) {
            self.platform.delete_endpoint_config(&config.name).await?;
            info!(endpoint_config = %config.name, "Deleted endpoint config");
            report.endpoint_configs.push(config.name.clone());
        }

        Ok(report)
    }
}
