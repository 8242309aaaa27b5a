//! Hosting resource type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format of the timestamp suffix on per-run resource names
pub const NAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Build a per-run resource name: `{prefix}-{timestamp}`
pub fn timestamped_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, at.format(NAME_TIMESTAMP_FORMAT))
}

/// Approval state of a model package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    Approved,
    Rejected,
    PendingManualApproval,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
            ApprovalStatus::PendingManualApproval => "PendingManualApproval",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A versioned model package produced by the training pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Model package ARN
    pub arn: String,
    /// Approval status
    pub approval_status: ApprovalStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A model bound to an artifact and execution role for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedModel {
    /// Timestamp-suffixed model name
    pub name: String,
    /// Model ARN
    pub arn: String,
}

/// Request to create an endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfigRequest {
    /// Configuration name
    pub name: String,
    /// Model served by the single production variant
    pub model_name: String,
    /// Production variant name
    pub variant_name: String,
    /// Instance type
    pub instance_type: String,
    /// Initial instance count
    pub instance_count: i32,
    /// Initial traffic weight
    pub variant_weight: f32,
}

/// A created endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfiguration {
    /// Configuration name, identical to the model name
    pub name: String,
    /// Configuration ARN
    pub arn: String,
    /// Model served by this configuration
    pub model_name: String,
}

/// The stably-named serving resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint name (the model group name)
    pub name: String,
    /// Endpoint ARN
    pub arn: String,
}

/// Whether an endpoint was freshly created or repointed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointAction {
    Created,
    Updated,
}

impl std::fmt::Display for EndpointAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointAction::Created => write!(f, "created"),
            EndpointAction::Updated => write!(f, "updated"),
        }
    }
}

/// Endpoint lifecycle status as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointStatus {
    OutOfService,
    Creating,
    Updating,
    SystemUpdating,
    RollingBack,
    InService,
    Deleting,
    Failed,
    UpdateRollbackFailed,
    Unknown(String),
}

impl EndpointStatus {
    /// Parse the platform's status string
    pub fn parse(value: &str) -> Self {
        match value {
            "OutOfService" => EndpointStatus::OutOfService,
            "Creating" => EndpointStatus::Creating,
            "Updating" => EndpointStatus::Updating,
            "SystemUpdating" => EndpointStatus::SystemUpdating,
            "RollingBack" => EndpointStatus::RollingBack,
            "InService" => EndpointStatus::InService,
            "Deleting" => EndpointStatus::Deleting,
            "Failed" => EndpointStatus::Failed,
            "UpdateRollbackFailed" => EndpointStatus::UpdateRollbackFailed,
            other => EndpointStatus::Unknown(other.to_string()),
        }
    }

    /// Only `InService` counts as healthy
    pub fn is_in_service(&self) -> bool {
        matches!(self, EndpointStatus::InService)
    }

    /// States the endpoint will not leave without operator action
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            EndpointStatus::Failed | EndpointStatus::UpdateRollbackFailed
        )
    }
}

impl std::fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointStatus::OutOfService => write!(f, "OutOfService"),
            EndpointStatus::Creating => write!(f, "Creating"),
            EndpointStatus::Updating => write!(f, "Updating"),
            EndpointStatus::SystemUpdating => write!(f, "SystemUpdating"),
            EndpointStatus::RollingBack => write!(f, "RollingBack"),
            EndpointStatus::InService => write!(f, "InService"),
            EndpointStatus::Deleting => write!(f, "Deleting"),
            EndpointStatus::Failed => write!(f, "Failed"),
            EndpointStatus::UpdateRollbackFailed => write!(f, "UpdateRollbackFailed"),
            EndpointStatus::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Result of describing an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescription {
    pub name: String,
    pub arn: String,
    pub status: EndpointStatus,
    /// Platform-supplied reason when the endpoint failed
    pub failure_reason: Option<String>,
}

/// Name and ARN of a listed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub name: String,
    pub arn: Option<String>,
}

impl ResourceSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arn: None,
        }
    }
}

/// Resources that existed under a model name before this run created anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub models: Vec<ResourceSummary>,
    pub endpoint_configs: Vec<ResourceSummary>,
}
