//! SageMaker platform implementation
//!
//! Talks to the SageMaker control plane through the AWS SDK. Credentials
//! come from the default AWS provider chain.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sagemaker::error::DisplayErrorContext;
use aws_sdk_sagemaker::primitives::DateTime as SdkDateTime;
use aws_sdk_sagemaker::types::{
    ContainerDefinition, ModelApprovalStatus, ModelPackageSortBy, ProductionVariant,
    ProductionVariantInstanceType, SortOrder,
};
use aws_sdk_sagemaker::Client;
use chrono::{DateTime, Utc};
use sgdeploy_core::{
    ApprovalStatus, DeployError, DeployResult, Endpoint, EndpointConfigRequest,
    EndpointConfiguration, EndpointDescription, EndpointStatus, HostedModel, ModelArtifact,
    ResourceSummary,
};
use tracing::{debug, info};

use crate::traits::HostingPlatform;

/// SageMaker-backed hosting platform
pub struct SageMakerPlatform {
    client: Client,
}

impl SageMakerPlatform {
    /// Wrap an existing SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for `region` from the default AWS configuration
    pub async fn from_region(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        info!(region = region, "SageMaker client initialized");

        Self::new(Client::new(&config))
    }
}

/// Accessors on SDK shapes return `&T` for members modeled as required and
/// `Option<&T>` otherwise; this folds both into `Option<&T>`.
trait SdkField<'a, T: ?Sized> {
    fn field(self) -> Option<&'a T>;
}

impl<'a, T: ?Sized> SdkField<'a, T> for &'a T {
    fn field(self) -> Option<&'a T> {
        Some(self)
    }
}

impl<'a, T: ?Sized> SdkField<'a, T> for Option<&'a T> {
    fn field(self) -> Option<&'a T> {
        self
    }
}

fn sdk_error<E: std::error::Error>(operation: &str, err: E) -> DeployError {
    DeployError::Platform(format!("{} failed: {}", operation, DisplayErrorContext(err)))
}

fn missing_field(operation: &str, field: &str) -> DeployError {
    DeployError::Platform(format!("{} response is missing {}", operation, field))
}

fn to_chrono(value: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

fn approval_from_sdk(value: Option<&ModelApprovalStatus>) -> ApprovalStatus {
    match value {
        Some(ModelApprovalStatus::Approved) => ApprovalStatus::Approved,
        Some(ModelApprovalStatus::Rejected) => ApprovalStatus::Rejected,
        _ => ApprovalStatus::PendingManualApproval,
    }
}

#[async_trait]
impl HostingPlatform for SageMakerPlatform {
    async fn list_model_packages(
        &self,
        group_name: &str,
        approval: ApprovalStatus,
    ) -> DeployResult<Vec<ModelArtifact>> {
        let summaries = self
            .client
            .list_model_packages()
            .model_package_group_name(group_name)
            .model_approval_status(ModelApprovalStatus::from(approval.as_str()))
            .sort_by(ModelPackageSortBy::CreationTime)
            .sort_order(SortOrder::Descending)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(|e| sdk_error("ListModelPackages", e))?;

        let artifacts: Vec<ModelArtifact> = summaries
            .iter()
            .filter_map(|summary| {
                let arn = summary.model_package_arn().field()?.to_string();
                let created_at = summary.creation_time().field().and_then(to_chrono)?;
                Some(ModelArtifact {
                    arn,
                    approval_status: approval_from_sdk(summary.model_approval_status()),
                    created_at,
                })
            })
            .collect();

        debug!(
            group = group_name,
            count = artifacts.len(),
            "Listed model packages"
        );

        Ok(artifacts)
    }

    async fn create_model(
        &self,
        name: &str,
        package_arn: &str,
        execution_role_arn: &str,
    ) -> DeployResult<HostedModel> {
        let container = ContainerDefinition::builder()
            .model_package_name(package_arn)
            .build();

        let output = self
            .client
            .create_model()
            .model_name(name)
            .execution_role_arn(execution_role_arn)
            .containers(container)
            .send()
            .await
            .map_err(|e| sdk_error("CreateModel", e))?;

        let arn = output
            .model_arn()
            .field()
            .ok_or_else(|| missing_field("CreateModel", "ModelArn"))?;

        Ok(HostedModel {
            name: name.to_string(),
            arn: arn.to_string(),
        })
    }

    async fn list_models(&self, name_contains: &str) -> DeployResult<Vec<ResourceSummary>> {
        let models = self
            .client
            .list_models()
            .name_contains(name_contains)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(|e| sdk_error("ListModels", e))?;

        Ok(models
            .iter()
            .filter_map(|m| {
                Some(ResourceSummary {
                    name: m.model_name().field()?.to_string(),
                    arn: m.model_arn().field().map(str::to_string),
                })
            })
            .collect())
    }

    async fn create_endpoint_config(
        &self,
        request: &EndpointConfigRequest,
    ) -> DeployResult<EndpointConfiguration> {
        let variant = ProductionVariant::builder()
            .variant_name(&request.variant_name)
            .model_name(&request.model_name)
            .instance_type(ProductionVariantInstanceType::from(
                request.instance_type.as_str(),
            ))
            .initial_instance_count(request.instance_count)
            .initial_variant_weight(request.variant_weight)
            .build();

        let output = self
            .client
            .create_endpoint_config()
            .endpoint_config_name(&request.name)
            .production_variants(variant)
            .send()
            .await
            .map_err(|e| sdk_error("CreateEndpointConfig", e))?;

        let arn = output
            .endpoint_config_arn()
            .field()
            .ok_or_else(|| missing_field("CreateEndpointConfig", "EndpointConfigArn"))?;

        Ok(EndpointConfiguration {
            name: request.name.clone(),
            arn: arn.to_string(),
            model_name: request.model_name.clone(),
        })
    }

    async fn list_endpoint_configs(
        &self,
        name_contains: &str,
    ) -> DeployResult<Vec<ResourceSummary>> {
        let configs = self
            .client
            .list_endpoint_configs()
            .name_contains(name_contains)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(|e| sdk_error("ListEndpointConfigs", e))?;

        Ok(configs
            .iter()
            .filter_map(|c| {
                Some(ResourceSummary {
                    name: c.endpoint_config_name().field()?.to_string(),
                    arn: c.endpoint_config_arn().field().map(str::to_string),
                })
            })
            .collect())
    }

    async fn list_endpoints(&self, name_contains: &str) -> DeployResult<Vec<ResourceSummary>> {
        let endpoints = self
            .client
            .list_endpoints()
            .name_contains(name_contains)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(|e| sdk_error("ListEndpoints", e))?;

        Ok(endpoints
            .iter()
            .filter_map(|e| {
                Some(ResourceSummary {
                    name: e.endpoint_name().field()?.to_string(),
                    arn: e.endpoint_arn().field().map(str::to_string),
                })
            })
            .collect())
    }

    async fn create_endpoint(&self, name: &str, config_name: &str) -> DeployResult<Endpoint> {
        let output = self
            .client
            .create_endpoint()
            .endpoint_name(name)
            .endpoint_config_name(config_name)
            .send()
            .await
            .map_err(|e| sdk_error("CreateEndpoint", e))?;

        let arn = output
            .endpoint_arn()
            .field()
            .ok_or_else(|| missing_field("CreateEndpoint", "EndpointArn"))?;

        Ok(Endpoint {
            name: name.to_string(),
            arn: arn.to_string(),
        })
    }

    async fn update_endpoint(&self, name: &str, config_name: &str) -> DeployResult<Endpoint> {
        let output = self
            .client
            .update_endpoint()
            .endpoint_name(name)
            .endpoint_config_name(config_name)
            .send()
            .await
            .map_err(|e| sdk_error("UpdateEndpoint", e))?;

        let arn = output
            .endpoint_arn()
            .field()
            .ok_or_else(|| missing_field("UpdateEndpoint", "EndpointArn"))?;

        Ok(Endpoint {
            name: name.to_string(),
            arn: arn.to_string(),
        })
    }

    async fn describe_endpoint(&self, name: &str) -> DeployResult<EndpointDescription> {
        let output = self
            .client
            .describe_endpoint()
            .endpoint_name(name)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeEndpoint", e))?;

        let status = output
            .endpoint_status()
            .field()
            .map(|s| EndpointStatus::parse(s.as_str()))
            .ok_or_else(|| missing_field("DescribeEndpoint", "EndpointStatus"))?;

        Ok(EndpointDescription {
            name: name.to_string(),
            arn: output
                .endpoint_arn()
                .field()
                .map(str::to_string)
                .unwrap_or_default(),
            status,
            failure_reason: output.failure_reason().map(str::to_string),
        })
    }

    async fn delete_model(&self, name: &str) -> DeployResult<()> {
        self.client
            .delete_model()
            .model_name(name)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteModel", e))?;
        Ok(())
    }

    async fn delete_endpoint_config(&self, name: &str) -> DeployResult<()> {
        self.client
            .delete_endpoint_config()
            .endpoint_config_name(name)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteEndpointConfig", e))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sagemaker"
    }
}
