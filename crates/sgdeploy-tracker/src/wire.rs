//! JSON payloads for the release tracker API

use serde::{Deserialize, Serialize};
use sgdeploy_core::{
    tracker_timestamp, ComponentRecord, ReleaseRecord, ReleaseStatus, StepStatus, StepType,
    TrackerSettings, VersionDescriptor,
};
use uuid::Uuid;

/// Path of the component upsert API
pub const COMPONENT_PATH: &str = "release-agent/v1/component";
/// Path of the release upsert API
pub const RELEASE_PATH: &str = "release-agent/v1/release";

/// Version block shared by components and releases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionPayload {
    pub desired_replicas: u32,
    pub images: Vec<String>,
    pub job_number: u64,
    pub name: String,
    pub pipeline_id: String,
    pub workflow_id: String,
}

impl VersionPayload {
    pub fn new(version: &VersionDescriptor, settings: &TrackerSettings) -> Self {
        Self {
            desired_replicas: settings.desired_replicas,
            images: version.images.clone(),
            job_number: settings.job_number,
            name: version.name.clone(),
            pipeline_id: settings.pipeline_id.clone(),
            workflow_id: settings.workflow_id.clone(),
        }
    }
}

/// Body of `PUT /release-agent/v1/component`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentPayload {
    pub current_versions: Vec<VersionPayload>,
    /// Display name
    pub name: String,
    pub project_id: String,
    pub slug: String,
}

impl ComponentPayload {
    pub fn new(component: &ComponentRecord, settings: &TrackerSettings) -> Self {
        Self {
            current_versions: vec![VersionPayload::new(&component.current_version, settings)],
            name: component.display_name.clone(),
            project_id: settings.project_id.clone(),
            slug: component.slug.clone(),
        }
    }
}

/// A release step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPayload {
    pub config: String,
    pub number: u32,
    pub started_at: String,
    pub status: StepStatus,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
}

/// Body of `PUT /release-agent/v1/release`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasePayload {
    pub command_id: Uuid,
    pub component_slug: String,
    pub detected_at: String,
    pub status: ReleaseStatus,
    pub steps: Vec<StepPayload>,
    pub target_version: VersionPayload,
    #[serde(rename = "type")]
    pub release_type: String,
}

impl ReleasePayload {
    pub fn new(release: &ReleaseRecord, settings: &TrackerSettings) -> Self {
        let step = &release.step;
        Self {
            command_id: Uuid::nil(),
            component_slug: release.component_slug.clone(),
            detected_at: tracker_timestamp(release.detected_at),
            status: release.status,
            steps: vec![StepPayload {
                config: step.config.clone(),
                number: 0,
                started_at: tracker_timestamp(step.started_at),
                status: step.status,
                step_type: step.step_type,
                ended_at: step.ended_at.map(tracker_timestamp),
            }],
            target_version: VersionPayload::new(&release.target_version, settings),
            release_type: "DEPLOYMENT".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn release(end: bool) -> ReleaseRecord {
        let start = Utc.with_ymd_and_hms(2023, 11, 5, 6, 31, 42).unwrap();
        let record = ReleaseRecord::new(
            "sagemaker.abalone-predictor",
            ReleaseStatus::Running,
            StepStatus::Running,
            StepType::WaitingForAvailability,
            VersionDescriptor::new(
                "abalone-predictor",
                vec!["modelArn: arn:aws:sagemaker:model/abalone".to_string()],
            ),
            start,
        )
        .with_step_config("Predicts abalone age");
        if end {
            record.with_end_time(Utc.with_ymd_and_hms(2023, 11, 5, 6, 45, 0).unwrap())
        } else {
            record
        }
    }

    #[test]
    fn test_release_payload_shape() {
        let payload = ReleasePayload::new(&release(false), &TrackerSettings::default());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["command_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["component_slug"], "sagemaker.abalone-predictor");
        assert_eq!(json["status"], "RUNNING");
        assert_eq!(json["type"], "DEPLOYMENT");
        assert_eq!(json["steps"][0]["type"], "WAITING_FOR_AVAILABILITY");
        assert_eq!(json["steps"][0]["number"], 0);
        assert_eq!(json["steps"][0]["config"], "Predicts abalone age");
        assert_eq!(json["steps"][0]["started_at"], "2023-11-05T06:31:42.000Z");
        assert!(json["steps"][0].get("ended_at").is_none());
        assert_eq!(json["target_version"]["name"], "abalone-predictor");
        assert_eq!(json["target_version"]["job_number"], 7);
        assert_eq!(
            json["target_version"]["images"][0],
            "modelArn: arn:aws:sagemaker:model/abalone"
        );
    }

    #[test]
    fn test_release_payload_end_time() {
        let payload = ReleasePayload::new(&release(true), &TrackerSettings::default());
        assert_eq!(
            payload.steps[0].ended_at.as_deref(),
            Some("2023-11-05T06:45:00.000Z")
        );
    }

    #[test]
    fn test_component_payload_shape() {
        let component = ComponentRecord::new(
            "sagemaker.abalone-predictor",
            "sagemaker.abalone-predictor",
            "initialize",
            "initialize",
        );
        let settings = TrackerSettings::default();
        let json = serde_json::to_value(ComponentPayload::new(&component, &settings)).unwrap();

        assert_eq!(json["slug"], "sagemaker.abalone-predictor");
        assert_eq!(json["name"], "sagemaker.abalone-predictor");
        assert_eq!(json["project_id"], settings.project_id.as_str());
        assert_eq!(json["current_versions"][0]["name"], "initialize");
        assert_eq!(json["current_versions"][0]["images"][0], "initialize");
        assert_eq!(json["current_versions"][0]["desired_replicas"], 1);
    }
}
