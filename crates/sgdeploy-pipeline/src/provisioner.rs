//! Model, endpoint configuration and endpoint provisioning

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sgdeploy_core::{
    timestamped_name, DeployResult, Endpoint, EndpointAction, EndpointConfigRequest,
    EndpointConfiguration, HostedModel, PlatformSettings, ResourceSummary,
};
use sgdeploy_platform::HostingPlatform;
use tracing::{debug, info};

/// Endpoint after a create or update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointRollout {
    pub endpoint: Endpoint,
    pub action: EndpointAction,
}

/// Creates the hosting resources for one rollout
pub struct ResourceProvisioner {
    platform: Arc<dyn HostingPlatform>,
    settings: PlatformSettings,
}

impl ResourceProvisioner {
    pub fn new(platform: Arc<dyn HostingPlatform>, settings: PlatformSettings) -> Self {
        Self { platform, settings }
    }

    /// Models that already exist under `name_contains`
    pub async fn existing_models(
        &self,
        name_contains: &str,
    ) -> DeployResult<Vec<ResourceSummary>> {
        let models = self.platform.list_models(name_contains).await?;
        debug!(count = models.len(), "Listed existing models");
        Ok(models)
    }

    /// Endpoint configurations that already exist under `name_contains`
    pub async fn existing_endpoint_configs(
        &self,
        name_contains: &str,
    ) -> DeployResult<Vec<ResourceSummary>> {
        let configs = self.platform.list_endpoint_configs(name_contains).await?;
        debug!(count = configs.len(), "Listed existing endpoint configs");
        Ok(configs)
    }

    /// Create a new model named `{name_prefix}-{timestamp}`
    pub async fn create_model(
        &self,
        name_prefix: &str,
        artifact_arn: &str,
        execution_role_arn: &str,
        at: DateTime<Utc>,
    ) -> DeployResult<HostedModel> {
        let name = timestamped_name(name_prefix, at);
        let model = self
            .platform
            .create_model(&name, artifact_arn, execution_role_arn)
            .await?;

        info!(model = %model.name, arn = %model.arn, "Created model");
        Ok(model)
    }

    /// Create an endpoint configuration serving `model` with a single,
    /// fully-weighted production variant
    pub async fn create_endpoint_config(
        &self,
        name: &str,
        model: &HostedModel,
    ) -> DeployResult<EndpointConfiguration> {
        let request = EndpointConfigRequest {
            name: name.to_string(),
            model_name: model.name.clone(),
            variant_name: self.settings.variant_name.clone(),
            instance_type: self.settings.instance_type.clone(),
            instance_count: self.settings.instance_count,
            variant_weight: self.settings.variant_weight,
        };
        let config = self.platform.create_endpoint_config(&request).await?;

        info!(
            endpoint_config = %config.name,
            arn = %config.arn,
            instance_type = %request.instance_type,
            instance_count = request.instance_count,
            "Created endpoint config"
        );
        Ok(config)
    }

    /// Point the endpoint named `endpoint_name` at `config`, creating the
    /// endpoint if it does not exist yet. Existence is decided from a listing
    /// taken right before the call.
    pub async fn upsert_endpoint(
        &self,
        endpoint_name: &str,
        config: &EndpointConfiguration,
    ) -> DeployResult<EndpointRollout> {
        let existing = self.platform.list_endpoints(endpoint_name).await?;
        let exists = existing.iter().any(|e| e.name == endpoint_name);

        let (endpoint, action) = if exists {
            let endpoint = self
                .platform
                .update_endpoint(endpoint_name, &config.name)
                .await?;
            (endpoint, EndpointAction::Updated)
        } else {
            let endpoint = self
                .platform
                .create_endpoint(endpoint_name, &config.name)
                .await?;
            (endpoint, EndpointAction::Created)
        };

        info!(
            endpoint = %endpoint.name,
            arn = %endpoint.arn,
            endpoint_config = %config.name,
            action = %action,
            "Endpoint rollout started"
        );

        Ok(EndpointRollout { endpoint, action })
    }
}
