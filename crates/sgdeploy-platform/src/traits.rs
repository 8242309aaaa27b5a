//! Hosting platform trait definitions

use async_trait::async_trait;
use sgdeploy_core::{
    ApprovalStatus, DeployResult, Endpoint, EndpointConfigRequest, EndpointConfiguration,
    EndpointDescription, HostedModel, ModelArtifact, ResourceSummary,
};

/// Operations the rollout needs from a managed model-hosting platform
#[async_trait]
pub trait HostingPlatform: Send + Sync {
    /// List packages in a model package group with the given approval status,
    /// newest first
    async fn list_model_packages(
        &self,
        group_name: &str,
        approval: ApprovalStatus,
    ) -> DeployResult<Vec<ModelArtifact>>;

    /// Create a model serving `package_arn` under `execution_role_arn`
    async fn create_model(
        &self,
        name: &str,
        package_arn: &str,
        execution_role_arn: &str,
    ) -> DeployResult<HostedModel>;

    /// List models whose name contains `name_contains`
    async fn list_models(&self, name_contains: &str) -> DeployResult<Vec<ResourceSummary>>;

    /// Create an endpoint configuration with a single production variant
    async fn create_endpoint_config(
        &self,
        request: &EndpointConfigRequest,
    ) -> DeployResult<EndpointConfiguration>;

    /// List endpoint configurations whose name contains `name_contains`
    async fn list_endpoint_configs(
        &self,
        name_contains: &str,
    ) -> DeployResult<Vec<ResourceSummary>>;

    /// List endpoints whose name contains `name_contains`
    async fn list_endpoints(&self, name_contains: &str) -> DeployResult<Vec<ResourceSummary>>;

    /// Create an endpoint backed by `config_name`
    async fn create_endpoint(&self, name: &str, config_name: &str) -> DeployResult<Endpoint>;

    /// Point an existing endpoint at `config_name`
    async fn update_endpoint(&self, name: &str, config_name: &str) -> DeployResult<Endpoint>;

    /// Fetch an endpoint's current status
    async fn describe_endpoint(&self, name: &str) -> DeployResult<EndpointDescription>;

    /// Delete a model
    async fn delete_model(&self, name: &str) -> DeployResult<()>;

    /// Delete an endpoint configuration
    async fn delete_endpoint_config(&self, name: &str) -> DeployResult<()>;

    /// Get the platform name
    fn name(&self) -> &'static str;
}
