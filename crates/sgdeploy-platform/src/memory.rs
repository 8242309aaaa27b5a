//! In-memory hosting platform
//!
//! Keeps models, endpoint configs and endpoints in process memory and
//! records every call into a [`CallJournal`]. Endpoint status transitions
//! are scripted so polling behavior can be exercised without a real backend.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use sgdeploy_core::{
    ApprovalStatus, CallJournal, DeployError, DeployResult, Endpoint, EndpointConfigRequest,
    EndpointConfiguration, EndpointDescription, EndpointStatus, HostedModel, ModelArtifact,
    ResourceSummary,
};
use tokio::sync::RwLock;

const ARN_PREFIX: &str = "arn:aws:sagemaker:us-east-1:000000000000";

#[derive(Debug, Clone)]
struct EndpointState {
    arn: String,
    config_name: String,
    script: VecDeque<EndpointStatus>,
}

#[derive(Debug, Default)]
struct PlatformState {
    packages: HashMap<String, Vec<ModelArtifact>>,
    models: Vec<HostedModel>,
    configs: Vec<EndpointConfiguration>,
    endpoints: HashMap<String, EndpointState>,
    next_script: Option<Vec<EndpointStatus>>,
    failing: HashSet<String>,
}

/// Hosting platform backed by process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPlatform {
    state: Arc<RwLock<PlatformState>>,
    journal: CallJournal,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls into a shared journal
    pub fn with_journal(journal: CallJournal) -> Self {
        Self {
            state: Arc::default(),
            journal,
        }
    }

    pub fn journal(&self) -> &CallJournal {
        &self.journal
    }

    /// Register a package in a model package group
    pub async fn add_package(&self, group_name: &str, artifact: ModelArtifact) {
        let mut state = self.state.write().await;
        state
            .packages
            .entry(group_name.to_string())
            .or_default()
            .push(artifact);
    }

    /// Seed a model left over from an earlier run
    pub async fn seed_model(&self, name: &str) {
        let mut state = self.state.write().await;
        state.models.push(HostedModel {
            name: name.to_string(),
            arn: format!("{}:model/{}", ARN_PREFIX, name),
        });
    }

    /// Seed an endpoint configuration left over from an earlier run
    pub async fn seed_endpoint_config(&self, name: &str, model_name: &str) {
        let mut state = self.state.write().await;
        state.configs.push(EndpointConfiguration {
            name: name.to_string(),
            arn: format!("{}:endpoint-config/{}", ARN_PREFIX, name),
            model_name: model_name.to_string(),
        });
    }

    /// Seed a healthy endpoint left over from an earlier run
    pub async fn seed_endpoint(&self, name: &str, config_name: &str) {
        let mut state = self.state.write().await;
        state.endpoints.insert(
            name.to_string(),
            EndpointState {
                arn: format!("{}:endpoint/{}", ARN_PREFIX, name),
                config_name: config_name.to_string(),
                script: VecDeque::from([EndpointStatus::InService]),
            },
        );
    }

    /// Statuses reported by the next created or updated endpoint, one per
    /// describe call; the last status repeats forever
    pub async fn script_next_rollout(&self, statuses: Vec<EndpointStatus>) {
        self.state.write().await.next_script = Some(statuses);
    }

    /// Make every call of `operation` fail with a platform error
    pub async fn fail_operation(&self, operation: &str) {
        self.state
            .write()
            .await
            .failing
            .insert(operation.to_string());
    }

    /// Names of the models currently present
    pub async fn model_names(&self) -> Vec<String> {
        let state = self.state.read().await;
        state.models.iter().map(|m| m.name.clone()).collect()
    }

    /// Names of the endpoint configurations currently present
    pub async fn endpoint_config_names(&self) -> Vec<String> {
        let state = self.state.read().await;
        state.configs.iter().map(|c| c.name.clone()).collect()
    }

    /// Configuration an endpoint currently points at
    pub async fn endpoint_config_of(&self, name: &str) -> Option<String> {
        let state = self.state.read().await;
        state.endpoints.get(name).map(|e| e.config_name.clone())
    }

    fn enter(&self, state: &PlatformState, operation: &str, target: &str) -> DeployResult<()> {
        self.journal.record(format!("{} {}", operation, target));
        if state.failing.contains(operation) {
            return Err(DeployError::Platform(format!(
                "{} failed: injected failure for {}",
                operation, target
            )));
        }
        Ok(())
    }
}

fn rollout_script(
    next: Option<Vec<EndpointStatus>>,
    initial: EndpointStatus,
) -> VecDeque<EndpointStatus> {
    match next {
        Some(script) if !script.is_empty() => script.into(),
        _ => VecDeque::from([initial, EndpointStatus::InService]),
    }
}

#[async_trait]
impl crate::traits::HostingPlatform for MemoryPlatform {
    async fn list_model_packages(
        &self,
        group_name: &str,
        approval: ApprovalStatus,
    ) -> DeployResult<Vec<ModelArtifact>> {
        let state = self.state.read().await;
        self.enter(&state, "list_model_packages", group_name)?;

        let mut artifacts: Vec<ModelArtifact> = state
            .packages
            .get(group_name)
            .map(|packages| {
                packages
                    .iter()
                    .filter(|p| p.approval_status == approval)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        artifacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(artifacts)
    }

    async fn create_model(
        &self,
        name: &str,
        _package_arn: &str,
        _execution_role_arn: &str,
    ) -> DeployResult<HostedModel> {
        let mut state = self.state.write().await;
        self.enter(&state, "create_model", name)?;

        if state.models.iter().any(|m| m.name == name) {
            return Err(DeployError::Platform(format!(
                "create_model failed: model {} already exists",
                name
            )));
        }

        let model = HostedModel {
            name: name.to_string(),
            arn: format!("{}:model/{}", ARN_PREFIX, name),
        };
        state.models.push(model.clone());

        Ok(model)
    }

    async fn list_models(&self, name_contains: &str) -> DeployResult<Vec<ResourceSummary>> {
        let state = self.state.read().await;
        self.enter(&state, "list_models", name_contains)?;

        Ok(state
            .models
            .iter()
            .filter(|m| m.name.contains(name_contains))
            .map(|m| ResourceSummary {
                name: m.name.clone(),
                arn: Some(m.arn.clone()),
            })
            .collect())
    }

    async fn create_endpoint_config(
        &self,
        request: &EndpointConfigRequest,
    ) -> DeployResult<EndpointConfiguration> {
        let mut state = self.state.write().await;
        self.enter(&state, "create_endpoint_config", &request.name)?;

        if !state.models.iter().any(|m| m.name == request.model_name) {
            return Err(DeployError::Platform(format!(
                "create_endpoint_config failed: model {} not found",
                request.model_name
            )));
        }
        if state.configs.iter().any(|c| c.name == request.name) {
            return Err(DeployError::Platform(format!(
                "create_endpoint_config failed: {} already exists",
                request.name
            )));
        }

        let config = EndpointConfiguration {
            name: request.name.clone(),
            arn: format!("{}:endpoint-config/{}", ARN_PREFIX, request.name),
            model_name: request.model_name.clone(),
        };
        state.configs.push(config.clone());

        Ok(config)
    }

    async fn list_endpoint_configs(
        &self,
        name_contains: &str,
    ) -> DeployResult<Vec<ResourceSummary>> {
        let state = self.state.read().await;
        self.enter(&state, "list_endpoint_configs", name_contains)?;

        Ok(state
            .configs
            .iter()
            .filter(|c| c.name.contains(name_contains))
            .map(|c| ResourceSummary {
                name: c.name.clone(),
                arn: Some(c.arn.clone()),
            })
            .collect())
    }

    async fn list_endpoints(&self, name_contains: &str) -> DeployResult<Vec<ResourceSummary>> {
        let state = self.state.read().await;
        self.enter(&state, "list_endpoints", name_contains)?;

        let mut endpoints: Vec<ResourceSummary> = state
            .endpoints
            .iter()
            .filter(|(name, _)| name.contains(name_contains))
            .map(|(name, e)| ResourceSummary {
                name: name.clone(),
                arn: Some(e.arn.clone()),
            })
            .collect();
        endpoints.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(endpoints)
    }

    async fn create_endpoint(&self, name: &str, config_name: &str) -> DeployResult<Endpoint> {
        let mut state = self.state.write().await;
        self.enter(&state, "create_endpoint", name)?;

        if state.endpoints.contains_key(name) {
            return Err(DeployError::Platform(format!(
                "create_endpoint failed: endpoint {} already exists",
                name
            )));
        }

        let arn = format!("{}:endpoint/{}", ARN_PREFIX, name);
        let script = rollout_script(state.next_script.take(), EndpointStatus::Creating);
        state.endpoints.insert(
            name.to_string(),
            EndpointState {
                arn: arn.clone(),
                config_name: config_name.to_string(),
                script,
            },
        );

        Ok(Endpoint {
            name: name.to_string(),
            arn,
        })
    }

    async fn update_endpoint(&self, name: &str, config_name: &str) -> DeployResult<Endpoint> {
        let mut state = self.state.write().await;
        self.enter(&state, "update_endpoint", name)?;

        let script = rollout_script(state.next_script.take(), EndpointStatus::Updating);
        let endpoint = state.endpoints.get_mut(name).ok_or_else(|| {
            DeployError::Platform(format!("update_endpoint failed: endpoint {} not found", name))
        })?;
        endpoint.config_name = config_name.to_string();
        endpoint.script = script;

        Ok(Endpoint {
            name: name.to_string(),
            arn: endpoint.arn.clone(),
        })
    }

    async fn describe_endpoint(&self, name: &str) -> DeployResult<EndpointDescription> {
        let mut state = self.state.write().await;
        self.enter(&state, "describe_endpoint", name)?;

        let endpoint = state.endpoints.get_mut(name).ok_or_else(|| {
            DeployError::Platform(format!(
                "describe_endpoint failed: endpoint {} not found",
                name
            ))
        })?;

        let status = if endpoint.script.len() > 1 {
            endpoint.script.pop_front()
        } else {
            endpoint.script.front().cloned()
        }
        .unwrap_or(EndpointStatus::InService);

        let failure_reason = status
            .is_terminal_failure()
            .then(|| "scripted failure".to_string());

        Ok(EndpointDescription {
            name: name.to_string(),
            arn: endpoint.arn.clone(),
            status,
            failure_reason,
        })
    }

    async fn delete_model(&self, name: &str) -> DeployResult<()> {
        let mut state = self.state.write().await;
        self.enter(&state, "delete_model", name)?;

        let before = state.models.len();
        state.models.retain(|m| m.name != name);
        if state.models.len() == before {
            return Err(DeployError::Platform(format!(
                "delete_model failed: model {} not found",
                name
            )));
        }
        Ok(())
    }

    async fn delete_endpoint_config(&self, name: &str) -> DeployResult<()> {
        let mut state = self.state.write().await;
        self.enter(&state, "delete_endpoint_config", name)?;

        let before = state.configs.len();
        state.configs.retain(|c| c.name != name);
        if state.configs.len() == before {
            return Err(DeployError::Platform(format!(
                "delete_endpoint_config failed: {} not found",
                name
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
