//! Latest approved artifact lookup

use std::sync::Arc;

use sgdeploy_core::{ApprovalStatus, DeployError, DeployResult, ModelArtifact};
use sgdeploy_platform::HostingPlatform;
use tracing::info;

/// Finds the model package a rollout should serve
pub struct ArtifactResolver {
    platform: Arc<dyn HostingPlatform>,
}

impl ArtifactResolver {
    pub fn new(platform: Arc<dyn HostingPlatform>) -> Self {
        Self { platform }
    }

    /// Most recently created approved package in `group_name`.
    ///
    /// Fails with `NoApprovedArtifact` when the group has none. Ties on
    /// creation time go to the package the platform listed first.
    pub async fn resolve(&self, group_name: &str) -> DeployResult<ModelArtifact> {
        let packages = self
            .platform
            .list_model_packages(group_name, ApprovalStatus::Approved)
            .await?;

        let artifact = packages
            .into_iter()
            .filter(|p| p.approval_status == ApprovalStatus::Approved)
            .reduce(|best, p| if p.created_at > best.created_at { p } else { best })
            .ok_or_else(|| DeployError::NoApprovedArtifact(group_name.to_string()))?;

        info!(
            group = group_name,
            artifact = %artifact.arn,
            created_at = %artifact.created_at,
            "Resolved latest approved model package"
        );

        Ok(artifact)
    }
}
