//! In-memory release tracker

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use sgdeploy_core::{
    CallJournal, ComponentRecord, DeployError, DeployResult, ReleaseRecord, ReleaseStatus,
};
use tokio::sync::RwLock;

use crate::traits::ReleaseTracker;

#[derive(Debug, Default)]
struct TrackerState {
    components: HashMap<String, ComponentRecord>,
    releases: Vec<ReleaseRecord>,
    release_failures: VecDeque<u16>,
    component_failures: VecDeque<u16>,
    rejected_statuses: HashMap<ReleaseStatus, u16>,
    strict: bool,
}

/// Release tracker backed by process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTracker {
    state: Arc<RwLock<TrackerState>>,
    journal: CallJournal,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls into a shared journal
    pub fn with_journal(journal: CallJournal) -> Self {
        Self {
            state: Arc::default(),
            journal,
        }
    }

    /// Reject releases for unregistered components with HTTP 400, the way
    /// the hosted tracker does
    pub async fn require_registered_components(&self) {
        self.state.write().await.strict = true;
    }

    /// Answer the next release upsert with `status`
    pub async fn fail_next_release(&self, status: u16) {
        self.state.write().await.release_failures.push_back(status);
    }

    /// Answer the next component upsert with `status`
    pub async fn fail_next_component(&self, status: u16) {
        self.state.write().await.component_failures.push_back(status);
    }

    /// Answer every release carrying `release_status` with `status`
    pub async fn reject_releases(&self, release_status: ReleaseStatus, status: u16) {
        let mut state = self.state.write().await;
        state.rejected_statuses.insert(release_status, status);
    }

    /// Accepted releases in arrival order
    pub async fn releases(&self) -> Vec<ReleaseRecord> {
        self.state.read().await.releases.clone()
    }

    /// Current registry entry for a slug
    pub async fn component(&self, slug: &str) -> Option<ComponentRecord> {
        self.state.read().await.components.get(slug).cloned()
    }
}

fn rejected(status: u16, body: &str) -> DeployError {
    DeployError::TrackerStatus {
        status,
        body: body.to_string(),
    }
}

#[async_trait]
impl ReleaseTracker for MemoryTracker {
    async fn upsert_component(&self, component: &ComponentRecord) -> DeployResult<u16> {
        let mut state = self.state.write().await;
        self.journal.record(format!(
            "upsert_component {} {}",
            component.slug, component.current_version.name
        ));

        if let Some(status) = state.component_failures.pop_front() {
            return Err(rejected(status, "injected component failure"));
        }

        state
            .components
            .insert(component.slug.clone(), component.clone());
        Ok(200)
    }

    async fn upsert_release(&self, release: &ReleaseRecord) -> DeployResult<u16> {
        let mut state = self.state.write().await;
        self.journal.record(format!(
            "upsert_release {} {}",
            release.status, release.component_slug
        ));

        if let Some(status) = state.release_failures.pop_front() {
            return Err(rejected(status, "injected release failure"));
        }
        if let Some(status) = state.rejected_statuses.get(&release.status) {
            return Err(rejected(*status, "injected release failure"));
        }
        if state.strict && !state.components.contains_key(&release.component_slug) {
            return Err(rejected(400, "component not found"));
        }

        state.releases.push(release.clone());
        Ok(200)
    }
}
