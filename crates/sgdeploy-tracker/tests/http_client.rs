//! HTTP client tests against a local stand-in for the release tracker

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::put;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use sgdeploy_core::{
    ComponentRecord, DeployError, ReleaseRecord, ReleaseStatus, StepStatus, StepType,
    TrackerSettings, VersionDescriptor,
};
use sgdeploy_tracker::{HttpReleaseTracker, ReleaseTracker};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    accept: Option<String>,
    body: Value,
}

struct ServerState {
    requests: Mutex<Vec<Captured>>,
    status: StatusCode,
}

async fn capture(
    State(state): State<Arc<ServerState>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        accept: header("accept"),
        body,
    });

    (state.status, "tracker says no".to_string())
}

async fn start_server(status: StatusCode) -> (String, Arc<ServerState>) {
    let state = Arc::new(ServerState {
        requests: Mutex::new(Vec::new()),
        status,
    });

    let router = Router::new()
        .route("/release-agent/v1/component", put(capture))
        .route("/release-agent/v1/release", put(capture))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    (format!("http://{}/", addr), state)
}

fn tracker(host: String) -> HttpReleaseTracker {
    let settings = TrackerSettings {
        host,
        ..TrackerSettings::default()
    };
    HttpReleaseTracker::new(settings, "cci-token".to_string()).unwrap()
}

fn running_release() -> ReleaseRecord {
    ReleaseRecord::new(
        "sagemaker.abalone-predictor",
        ReleaseStatus::Running,
        StepStatus::Running,
        StepType::WaitingForAvailability,
        VersionDescriptor::new(
            "abalone-predictor",
            vec!["modelArn: arn:aws:sagemaker:us-east-1:1:model/abalone".to_string()],
        ),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    )
}

#[tokio::test]
async fn test_upsert_release_sends_headers_and_body() {
    let (host, state) = start_server(StatusCode::OK).await;
    let tracker = tracker(host);

    let status = tracker.upsert_release(&running_release()).await.unwrap();
    assert_eq!(status, 200);

    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/release-agent/v1/release");
    assert_eq!(request.authorization.as_deref(), Some("cci-token"));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(request.accept.as_deref(), Some("application/json"));
    assert_eq!(request.body["status"], "RUNNING");
    assert_eq!(request.body["component_slug"], "sagemaker.abalone-predictor");
    assert!(request.body["steps"][0].get("ended_at").is_none());
}

#[tokio::test]
async fn test_upsert_release_with_end_time_marks_step_ended() {
    let (host, state) = start_server(StatusCode::OK).await;
    let tracker = tracker(host);

    let end = Utc.with_ymd_and_hms(2024, 5, 1, 12, 20, 0).unwrap();
    let mut release = running_release().with_end_time(end);
    release.status = ReleaseStatus::Success;
    release.step.status = StepStatus::Success;

    tracker.upsert_release(&release).await.unwrap();

    let requests = state.requests.lock().unwrap().clone();
    let step = &requests[0].body["steps"][0];
    assert_eq!(step["ended_at"], "2024-05-01T12:20:00.000Z");
    assert_eq!(step["status"], "SUCCESS");
}

#[tokio::test]
async fn test_upsert_component_sends_registry_entry() {
    let (host, state) = start_server(StatusCode::CREATED).await;
    let tracker = tracker(host);

    let component = ComponentRecord::new(
        "sagemaker.abalone-predictor",
        "sagemaker.abalone-predictor",
        "abalone-predictor-2024-05-01-12-00-00",
        "arn:aws:sagemaker:us-east-1:1:endpoint/abalone-predictor",
    );
    let status = tracker.upsert_component(&component).await.unwrap();
    assert_eq!(status, 201);

    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests[0].path, "/release-agent/v1/component");
    let body = &requests[0].body;
    assert_eq!(body["slug"], "sagemaker.abalone-predictor");
    assert_eq!(
        body["current_versions"][0]["name"],
        "abalone-predictor-2024-05-01-12-00-00"
    );
    assert_eq!(
        body["current_versions"][0]["images"][0],
        "arn:aws:sagemaker:us-east-1:1:endpoint/abalone-predictor"
    );
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let (host, _state) = start_server(StatusCode::BAD_REQUEST).await;
    let tracker = tracker(host);

    let err = tracker.upsert_release(&running_release()).await.unwrap_err();
    match err {
        DeployError::TrackerStatus { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "tracker says no");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unreachable_tracker_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let tracker = tracker(format!("http://{}", addr));
    let err = tracker.upsert_release(&running_release()).await.unwrap_err();
    assert!(matches!(err, DeployError::Tracker(_)));
}
