//! Release tracker record types

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Component slug and display name for a hosted model
pub fn component_slug(model_name: &str) -> String {
    format!("sagemaker.{}", model_name)
}

/// Timestamp in the tracker's format (RFC 3339, UTC, `Z` suffix)
pub fn tracker_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Overall status of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReleaseStatus {
    Running,
    Success,
    Failed,
    Unknown,
    Canceled,
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseStatus::Running => write!(f, "RUNNING"),
            ReleaseStatus::Success => write!(f, "SUCCESS"),
            ReleaseStatus::Failed => write!(f, "FAILED"),
            ReleaseStatus::Unknown => write!(f, "UNKNOWN"),
            ReleaseStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// Status of a single release step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepStatus {
    Pending,
    Paused,
    Running,
    Success,
    Failed,
    Canceled,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "PENDING"),
            StepStatus::Paused => write!(f, "PAUSED"),
            StepStatus::Running => write!(f, "RUNNING"),
            StepStatus::Success => write!(f, "SUCCESS"),
            StepStatus::Failed => write!(f, "FAILED"),
            StepStatus::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// Kind of work a release step represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    WaitingForAvailability,
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepType::WaitingForAvailability => write!(f, "WAITING_FOR_AVAILABILITY"),
        }
    }
}

/// A named version and the images (ARNs) backing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    pub name: String,
    pub images: Vec<String>,
}

impl VersionDescriptor {
    pub fn new(name: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            name: name.into(),
            images,
        }
    }
}

/// Registry entry for a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub slug: String,
    pub display_name: String,
    pub current_version: VersionDescriptor,
}

impl ComponentRecord {
    pub fn new(
        slug: impl Into<String>,
        display_name: impl Into<String>,
        version_name: impl Into<String>,
        version_image: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            display_name: display_name.into(),
            current_version: VersionDescriptor::new(version_name, vec![version_image.into()]),
        }
    }
}

/// The single step carried by a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStep {
    pub status: StepStatus,
    pub step_type: StepType,
    /// Free-form step configuration
    pub config: String,
    pub started_at: DateTime<Utc>,
    /// Set only when the step has finished
    pub ended_at: Option<DateTime<Utc>>,
}

/// One deployment attempt as seen by the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub component_slug: String,
    pub status: ReleaseStatus,
    pub detected_at: DateTime<Utc>,
    pub step: ReleaseStep,
    pub target_version: VersionDescriptor,
}

impl ReleaseRecord {
    /// Create a release whose step started at `started_at` and has not ended
    pub fn new(
        component_slug: impl Into<String>,
        status: ReleaseStatus,
        step_status: StepStatus,
        step_type: StepType,
        target_version: VersionDescriptor,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            component_slug: component_slug.into(),
            status,
            detected_at: started_at,
            step: ReleaseStep {
                status: step_status,
                step_type,
                config: String::new(),
                started_at,
                ended_at: None,
            },
            target_version,
        }
    }

    /// Mark the step as ended at `at`
    pub fn with_end_time(mut self, at: DateTime<Utc>) -> Self {
        self.step.ended_at = Some(at);
        self
    }

    /// Attach free-form step configuration
    pub fn with_step_config(mut self, config: impl Into<String>) -> Self {
        self.step.config = config.into();
        self
    }
}
