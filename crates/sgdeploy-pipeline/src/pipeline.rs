//! End-to-end rollout of the latest approved model package
//!
//! A run walks through a fixed sequence of stages:
//!
//! 1. Resolve the newest approved package in the model package group
//! 2. Snapshot existing models, create a new timestamped model
//! 3. Snapshot existing endpoint configs, create one for the new model
//! 4. Announce the release as RUNNING
//! 5. Create or update the stable endpoint and wait for `InService`
//! 6. Announce the release as SUCCESS and register the new current version
//! 7. Delete the snapshotted resources that were superseded
//!
//! Any failure before step 6 aborts the run. Failures after the RUNNING
//! announcement are reported to the tracker as FAILED on a best-effort basis.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use sgdeploy_core::{
    DeployConfig, DeployResult, Endpoint, EndpointAction, EndpointConfiguration, HostedModel,
    ModelArtifact, ResourceSnapshot,
};
use sgdeploy_platform::HostingPlatform;
use sgdeploy_tracker::ReleaseTracker;
use tracing::{info, warn};

use crate::clock::{Clock, Sleeper};
use crate::poller::AvailabilityPoller;
use crate::provisioner::{EndpointRollout, ResourceProvisioner};
use crate::reaper::{ReapReport, ResourceReaper};
use crate::reporter::DeploymentReporter;
use crate::resolver::ArtifactResolver;

/// Stage a rollout is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeploymentStage {
    Init,
    Resolving,
    CreatingResources,
    AnnouncingRunning,
    ProvisioningEndpoint,
    Polling,
    AnnouncingSuccess,
    RegisteringFinal,
    Reaping,
    Done,
}

impl fmt::Display for DeploymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStage::Init => write!(f, "init"),
            DeploymentStage::Resolving => write!(f, "resolving"),
            DeploymentStage::CreatingResources => write!(f, "creating_resources"),
            DeploymentStage::AnnouncingRunning => write!(f, "announcing_running"),
            DeploymentStage::ProvisioningEndpoint => write!(f, "provisioning_endpoint"),
            DeploymentStage::Polling => write!(f, "polling"),
            DeploymentStage::AnnouncingSuccess => write!(f, "announcing_success"),
            DeploymentStage::RegisteringFinal => write!(f, "registering_final"),
            DeploymentStage::Reaping => write!(f, "reaping"),
            DeploymentStage::Done => write!(f, "done"),
        }
    }
}

/// Result of a successful rollout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentOutcome {
    pub artifact: ModelArtifact,
    pub model: HostedModel,
    pub endpoint_config: EndpointConfiguration,
    pub endpoint: Endpoint,
    pub action: EndpointAction,
    pub reaped: ReapReport,
}

/// Runs one rollout against a hosting platform and a release tracker
pub struct DeploymentPipeline {
    config: DeployConfig,
    platform: Arc<dyn HostingPlatform>,
    clock: Arc<dyn Clock>,
    resolver: ArtifactResolver,
    provisioner: ResourceProvisioner,
    poller: AvailabilityPoller,
    reporter: DeploymentReporter,
    reaper: ResourceReaper,
    stage: DeploymentStage,
}

impl DeploymentPipeline {
    pub fn new(
        config: DeployConfig,
        platform: Arc<dyn HostingPlatform>,
        tracker: Arc<dyn ReleaseTracker>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let resolver = ArtifactResolver::new(platform.clone());
        let provisioner =
            ResourceProvisioner::new(platform.clone(), config.settings.platform.clone());
        let poller = AvailabilityPoller::new(platform.clone(), sleeper, &config.settings.poll);
        let reporter = DeploymentReporter::new(
            tracker,
            clock.clone(),
            &config.model_name,
            &config.model_description,
        );
        let reaper = ResourceReaper::new(platform.clone());

        Self {
            config,
            platform,
            clock,
            resolver,
            provisioner,
            poller,
            reporter,
            reaper,
            stage: DeploymentStage::Init,
        }
    }

    /// Current stage
    pub fn stage(&self) -> DeploymentStage {
        self.stage
    }

    fn enter(&mut self, stage: DeploymentStage) {
        info!(from = %self.stage, to = %stage, "Rollout stage");
        self.stage = stage;
    }

    /// Roll the latest approved package out to the model's endpoint
    pub async fn run(&mut self) -> DeployResult<DeploymentOutcome> {
        let model_name = self.config.model_name.clone();
        info!(
            model = %model_name,
            platform = self.platform.name(),
            "Starting rollout"
        );

        self.enter(DeploymentStage::Resolving);
        let artifact = self.resolver.resolve(&model_name).await?;

        self.enter(DeploymentStage::CreatingResources);
        let mut snapshot = ResourceSnapshot {
            models: self.provisioner.existing_models(&model_name).await?,
            ..Default::default()
        };
        let model = self
            .provisioner
            .create_model(
                &model_name,
                &artifact.arn,
                &self.config.execution_role_arn,
                self.clock.now(),
            )
            .await?;
        snapshot.endpoint_configs = self.provisioner.existing_endpoint_configs(&model_name).await?;
        let endpoint_config = self
            .provisioner
            .create_endpoint_config(&model.name, &model)
            .await?;

        self.enter(DeploymentStage::AnnouncingRunning);
        self.reporter.announce_running(&model).await?;

        let rollout = match self.roll_out_endpoint(&model_name, &endpoint_config).await {
            Ok(rollout) => rollout,
            Err(err) => {
                if let Err(report_err) = self.reporter.announce_failure(&model).await {
                    warn!(error = %report_err, "Failed to announce rollout failure");
                }
                return Err(err);
            }
        };

        self.enter(DeploymentStage::AnnouncingSuccess);
        self.reporter
            .announce_success(&model, &rollout.endpoint)
            .await?;

        self.enter(DeploymentStage::RegisteringFinal);
        if let Err(err) = self
            .reporter
            .register_final(&model, &rollout.endpoint)
            .await
        {
            warn!(error = %err, "Failed to register current version");
        }

        self.enter(DeploymentStage::Reaping);
        let reaped = self
            .reaper
            .reap(
                &model_name,
                &snapshot,
                &[model.name.as_str(), endpoint_config.name.as_str()],
            )
            .await?;

        self.enter(DeploymentStage::Done);
        info!(
            model = %model.name,
            endpoint = %rollout.endpoint.name,
            action = %rollout.action,
            reaped = reaped.total(),
            "Rollout complete"
        );

        Ok(DeploymentOutcome {
            artifact,
            model,
            endpoint_config,
            endpoint: rollout.endpoint,
            action: rollout.action,
            reaped,
        })
    }

    async fn roll_out_endpoint(
        &mut self,
        endpoint_name: &str,
        endpoint_config: &EndpointConfiguration,
    ) -> DeployResult<EndpointRollout> {
        self.enter(DeploymentStage::ProvisioningEndpoint);
        let rollout = self
            .provisioner
            .upsert_endpoint(endpoint_name, endpoint_config)
            .await?;

        self.enter(DeploymentStage::Polling);
        self.poller.wait_until_in_service(endpoint_name).await?;

        Ok(rollout)
    }
}
