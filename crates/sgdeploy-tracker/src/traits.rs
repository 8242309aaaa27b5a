//! Release tracker trait definitions

use async_trait::async_trait;
use sgdeploy_core::{ComponentRecord, DeployResult, ReleaseRecord};

/// Release tracker operations. Both are idempotent upserts; a non-2xx
/// answer is returned as `DeployError::TrackerStatus`.
#[async_trait]
pub trait ReleaseTracker: Send + Sync {
    /// Register or replace a component and its current version
    async fn upsert_component(&self, component: &ComponentRecord) -> DeployResult<u16>;

    /// Record a release attempt
    async fn upsert_release(&self, release: &ReleaseRecord) -> DeployResult<u16>;
}
