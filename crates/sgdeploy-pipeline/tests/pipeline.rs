//! Full rollouts against the in-memory platform and tracker

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sgdeploy_core::{
    ApprovalStatus, CallJournal, DeployConfig, DeployError, DeploySettings, EndpointAction,
    EndpointStatus, ModelArtifact, ReleaseStatus,
};
use sgdeploy_pipeline::{DeploymentPipeline, FixedClock, RecordingSleeper};
use sgdeploy_platform::{HostingPlatform, MemoryPlatform};
use sgdeploy_tracker::MemoryTracker;

const MODEL: &str = "abalone-predictor";
const SLUG: &str = "sagemaker.abalone-predictor";

struct Harness {
    journal: CallJournal,
    platform: MemoryPlatform,
    tracker: MemoryTracker,
    sleeper: Arc<RecordingSleeper>,
}

impl Harness {
    async fn new() -> Self {
        let journal = CallJournal::new();
        let platform = MemoryPlatform::with_journal(journal.clone());
        platform
            .add_package(
                MODEL,
                ModelArtifact {
                    arn: "pkg-v6".to_string(),
                    approval_status: ApprovalStatus::Approved,
                    created_at: Utc.with_ymd_and_hms(2024, 4, 6, 0, 0, 0).unwrap(),
                },
            )
            .await;
        platform
            .add_package(
                MODEL,
                ModelArtifact {
                    arn: "pkg-v7".to_string(),
                    approval_status: ApprovalStatus::Approved,
                    created_at: Utc.with_ymd_and_hms(2024, 4, 7, 0, 0, 0).unwrap(),
                },
            )
            .await;

        Self {
            platform,
            tracker: MemoryTracker::with_journal(journal.clone()),
            journal,
            sleeper: Arc::new(RecordingSleeper::new()),
        }
    }

    fn pipeline_at(&self, at: DateTime<Utc>) -> DeploymentPipeline {
        let config = DeployConfig {
            model_name: MODEL.to_string(),
            model_description: "Predicts the age of abalone".to_string(),
            execution_role_arn: "arn:aws:iam::000000000000:role/sagemaker".to_string(),
            tracker_token: "token".to_string(),
            settings: DeploySettings::default(),
        };
        DeploymentPipeline::new(
            config,
            Arc::new(self.platform.clone()),
            Arc::new(self.tracker.clone()),
            Arc::new(FixedClock(at)),
            self.sleeper.clone(),
        )
    }

    /// Mutating calls in the order they happened
    fn mutations(&self) -> Vec<String> {
        self.journal
            .entries()
            .into_iter()
            .filter(|e| !e.starts_with("list_") && !e.starts_with("describe_endpoint"))
            .collect()
    }

    fn count(&self, prefix: &str) -> usize {
        self.journal
            .entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

fn first_run() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

fn second_run() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap()
}

#[tokio::test]
async fn test_first_rollout_creates_endpoint() {
    let harness = Harness::new().await;

    let outcome = harness.pipeline_at(first_run()).run().await.unwrap();

    assert_eq!(outcome.artifact.arn, "pkg-v7");
    assert_eq!(outcome.action, EndpointAction::Created);
    assert_eq!(outcome.reaped.total(), 0);
    assert_eq!(
        harness.mutations(),
        vec![
            "create_model abalone-predictor-2024-05-01-08-00-00",
            "create_endpoint_config abalone-predictor-2024-05-01-08-00-00",
            "upsert_release RUNNING sagemaker.abalone-predictor",
            "create_endpoint abalone-predictor",
            "upsert_release SUCCESS sagemaker.abalone-predictor",
            "upsert_component sagemaker.abalone-predictor abalone-predictor-2024-05-01-08-00-00",
        ]
    );
    assert_eq!(harness.count("describe_endpoint"), 2);
    assert_eq!(harness.sleeper.sleeps(), vec![Duration::from_secs(30)]);

    let releases = harness.tracker.releases().await;
    let success = &releases[1];
    assert_eq!(
        success.target_version.images,
        vec![
            format!("modelArn: {}", outcome.model.arn),
            format!("endpointArn: {}", outcome.endpoint.arn),
        ]
    );
    assert!(success.step.ended_at.is_some());

    let component = harness.tracker.component(SLUG).await.unwrap();
    assert_eq!(component.current_version.images, vec![outcome.endpoint.arn]);
}

#[tokio::test]
async fn test_rollout_over_stale_resources_updates_and_reaps() {
    let harness = Harness::new().await;
    let stale = "abalone-predictor-2024-04-01-00-00-00";
    harness.platform.seed_model(stale).await;
    harness.platform.seed_endpoint_config(stale, stale).await;
    harness.platform.seed_endpoint(MODEL, stale).await;
    let endpoint_arn = harness.platform.list_endpoints(MODEL).await.unwrap()[0]
        .arn
        .clone();

    let outcome = harness.pipeline_at(first_run()).run().await.unwrap();

    assert_eq!(outcome.action, EndpointAction::Updated);
    assert_eq!(Some(outcome.endpoint.arn.clone()), endpoint_arn);
    assert_eq!(outcome.reaped.models, vec![stale]);
    assert_eq!(outcome.reaped.endpoint_configs, vec![stale]);
    assert_eq!(
        harness.mutations(),
        vec![
            "create_model abalone-predictor-2024-05-01-08-00-00",
            "create_endpoint_config abalone-predictor-2024-05-01-08-00-00",
            "upsert_release RUNNING sagemaker.abalone-predictor",
            "update_endpoint abalone-predictor",
            "upsert_release SUCCESS sagemaker.abalone-predictor",
            "upsert_component sagemaker.abalone-predictor abalone-predictor-2024-05-01-08-00-00",
            "delete_model abalone-predictor-2024-04-01-00-00-00",
            "delete_endpoint_config abalone-predictor-2024-04-01-00-00-00",
        ]
    );
    assert_eq!(
        harness.platform.model_names().await,
        vec!["abalone-predictor-2024-05-01-08-00-00"]
    );
    assert_eq!(
        harness.platform.endpoint_config_of(MODEL).await.as_deref(),
        Some("abalone-predictor-2024-05-01-08-00-00")
    );
}

#[tokio::test]
async fn test_rerun_after_success_reaps_previous_generation() {
    let harness = Harness::new().await;

    harness.pipeline_at(first_run()).run().await.unwrap();
    let outcome = harness.pipeline_at(second_run()).run().await.unwrap();

    assert_eq!(outcome.action, EndpointAction::Updated);
    assert_eq!(
        outcome.reaped.models,
        vec!["abalone-predictor-2024-05-01-08-00-00"]
    );
    assert_eq!(
        harness.platform.model_names().await,
        vec!["abalone-predictor-2024-05-02-08-00-00"]
    );
    assert_eq!(
        harness.platform.endpoint_config_names().await,
        vec!["abalone-predictor-2024-05-02-08-00-00"]
    );
}

#[tokio::test]
async fn test_unregistered_component_is_registered_during_rollout() {
    let harness = Harness::new().await;
    harness.tracker.require_registered_components().await;

    harness.pipeline_at(first_run()).run().await.unwrap();

    let tracker_calls: Vec<String> = harness
        .mutations()
        .into_iter()
        .filter(|e| e.starts_with("upsert_"))
        .collect();
    assert_eq!(
        tracker_calls,
        vec![
            "upsert_release RUNNING sagemaker.abalone-predictor",
            "upsert_component sagemaker.abalone-predictor initialize",
            "upsert_release RUNNING sagemaker.abalone-predictor",
            "upsert_release SUCCESS sagemaker.abalone-predictor",
            "upsert_component sagemaker.abalone-predictor abalone-predictor-2024-05-01-08-00-00",
        ]
    );
}

#[tokio::test]
async fn test_failed_endpoint_is_announced_and_nothing_is_reaped() {
    let harness = Harness::new().await;
    let stale = "abalone-predictor-2024-04-01-00-00-00";
    harness.platform.seed_model(stale).await;
    harness
        .platform
        .script_next_rollout(vec![EndpointStatus::Creating, EndpointStatus::Failed])
        .await;

    let err = harness.pipeline_at(first_run()).run().await.unwrap_err();

    assert!(matches!(err, DeployError::EndpointFailed { .. }));
    let statuses: Vec<ReleaseStatus> = harness
        .tracker
        .releases()
        .await
        .iter()
        .map(|r| r.status)
        .collect();
    assert_eq!(statuses, vec![ReleaseStatus::Running, ReleaseStatus::Failed]);
    assert_eq!(harness.count("delete_"), 0);
    assert_eq!(harness.count("upsert_component"), 0);
    assert_eq!(harness.platform.model_names().await.len(), 2);
}

#[tokio::test]
async fn test_missing_artifact_touches_nothing() {
    let harness = Harness::new().await;
    let config = DeployConfig {
        model_name: "unknown-model".to_string(),
        model_description: String::new(),
        execution_role_arn: "arn:role".to_string(),
        tracker_token: "token".to_string(),
        settings: DeploySettings::default(),
    };
    let mut pipeline = DeploymentPipeline::new(
        config,
        Arc::new(harness.platform.clone()),
        Arc::new(harness.tracker.clone()),
        Arc::new(FixedClock(first_run())),
        harness.sleeper.clone(),
    );

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, DeployError::NoApprovedArtifact(_)));
    assert!(harness.mutations().is_empty());
}

#[tokio::test]
async fn test_tracker_error_on_running_stops_before_endpoint() {
    let harness = Harness::new().await;
    harness.tracker.fail_next_release(500).await;

    let err = harness.pipeline_at(first_run()).run().await.unwrap_err();

    assert_eq!(err.tracker_status(), Some(500));
    assert_eq!(harness.count("create_endpoint "), 0);
    assert_eq!(harness.count("update_endpoint"), 0);
    assert_eq!(harness.count("upsert_component"), 0);
}

#[tokio::test]
async fn test_rejected_failure_announcement_keeps_endpoint_error() {
    let harness = Harness::new().await;
    let stale = "abalone-predictor-2024-04-01-00-00-00";
    harness.platform.seed_model(stale).await;
    harness.platform.fail_operation("create_endpoint").await;
    harness
        .tracker
        .reject_releases(ReleaseStatus::Failed, 503)
        .await;

    let err = harness.pipeline_at(first_run()).run().await.unwrap_err();

    assert!(matches!(err, DeployError::Platform(_)));
    let statuses: Vec<ReleaseStatus> = harness
        .tracker
        .releases()
        .await
        .iter()
        .map(|r| r.status)
        .collect();
    assert_eq!(statuses, vec![ReleaseStatus::Running]);
    assert_eq!(harness.count("upsert_release FAILED"), 1);
    assert_eq!(harness.count("delete_"), 0);
    assert_eq!(harness.platform.model_names().await.len(), 2);
}
