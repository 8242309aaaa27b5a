//! Release tracker reporting for a rollout

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sgdeploy_core::{
    component_slug, ComponentRecord, DeployResult, Endpoint, HostedModel, ReleaseRecord,
    ReleaseStatus, StepStatus, StepType, VersionDescriptor,
};
use sgdeploy_tracker::ReleaseTracker;
use tracing::{error, info, warn};

use crate::clock::Clock;

/// Version name and image used when a component is first registered
const INITIAL_VERSION: &str = "initialize";

/// Announces rollout progress to the release tracker
pub struct DeploymentReporter {
    tracker: Arc<dyn ReleaseTracker>,
    clock: Arc<dyn Clock>,
    model_name: String,
    slug: String,
    description: String,
    started_at: DateTime<Utc>,
}

impl DeploymentReporter {
    pub fn new(
        tracker: Arc<dyn ReleaseTracker>,
        clock: Arc<dyn Clock>,
        model_name: &str,
        description: &str,
    ) -> Self {
        let started_at = clock.now();
        Self {
            tracker,
            clock,
            model_name: model_name.to_string(),
            slug: component_slug(model_name),
            description: description.to_string(),
            started_at,
        }
    }

    fn release(
        &self,
        status: ReleaseStatus,
        step_status: StepStatus,
        images: Vec<String>,
    ) -> ReleaseRecord {
        ReleaseRecord::new(
            self.slug.as_str(),
            status,
            step_status,
            StepType::WaitingForAvailability,
            VersionDescriptor::new(self.model_name.as_str(), images),
            self.started_at,
        )
        .with_step_config(self.description.as_str())
    }

    /// Announce that the rollout is running.
    ///
    /// The tracker answers 400 for releases of components it does not know.
    /// In that case the component is registered with a placeholder version
    /// and the announcement is retried once. Any other failure is returned.
    pub async fn announce_running(&self, model: &HostedModel) -> DeployResult<()> {
        let release = self.release(
            ReleaseStatus::Running,
            StepStatus::Running,
            vec![format!("modelArn: {}", model.arn)],
        );

        info!(slug = %self.slug, "Announcing rollout as RUNNING");

        match self.tracker.upsert_release(&release).await {
            Ok(_) => Ok(()),
            Err(err) if err.tracker_status() == Some(400) => {
                warn!(
                    slug = %self.slug,
                    "Tracker rejected release, registering component and retrying"
                );
                let component = ComponentRecord::new(
                    self.slug.as_str(),
                    self.slug.as_str(),
                    INITIAL_VERSION,
                    INITIAL_VERSION,
                );
                self.tracker.upsert_component(&component).await?;
                self.tracker.upsert_release(&release).await?;
                Ok(())
            }
            Err(err) => {
                error!(slug = %self.slug, error = %err, "Failed to announce rollout");
                Err(err)
            }
        }
    }

    /// Announce that the endpoint is serving `model`; the step is closed at
    /// the current time
    pub async fn announce_success(
        &self,
        model: &HostedModel,
        endpoint: &Endpoint,
    ) -> DeployResult<()> {
        let release = self
            .release(
                ReleaseStatus::Success,
                StepStatus::Success,
                vec![
                    format!("modelArn: {}", model.arn),
                    format!("endpointArn: {}", endpoint.arn),
                ],
            )
            .with_end_time(self.clock.now());

        info!(slug = %self.slug, "Announcing rollout as SUCCESS");
        self.tracker.upsert_release(&release).await?;
        Ok(())
    }

    /// Close the RUNNING release after a rollout failure
    pub async fn announce_failure(&self, model: &HostedModel) -> DeployResult<()> {
        let release = self
            .release(
                ReleaseStatus::Failed,
                StepStatus::Failed,
                vec![format!("modelArn: {}", model.arn)],
            )
            .with_end_time(self.clock.now());

        info!(slug = %self.slug, "Announcing rollout as FAILED");
        self.tracker.upsert_release(&release).await?;
        Ok(())
    }

    /// Point the component's current version at the new model and endpoint
    pub async fn register_final(
        &self,
        model: &HostedModel,
        endpoint: &Endpoint,
    ) -> DeployResult<()> {
        let component = ComponentRecord::new(
            self.slug.as_str(),
            self.slug.as_str(),
            model.name.as_str(),
            endpoint.arn.as_str(),
        );

        info!(slug = %self.slug, version = %model.name, "Registering current version");
        self.tracker.upsert_component(&component).await?;
        Ok(())
    }
}
