//! Configuration types for sgdeploy

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{DeployError, DeployResult};

/// Environment variable holding the model package group name
pub const ENV_MODEL_NAME: &str = "MODEL_NAME";
/// Environment variable holding the human-readable model description
pub const ENV_MODEL_DESC: &str = "MODEL_DESC";
/// Environment variable holding the SageMaker execution role ARN
pub const ENV_EXECUTION_ROLE_ARN: &str = "SAGEMAKER_EXECUTION_ROLE_ARN";
/// Environment variable holding the release tracker token
pub const ENV_TRACKER_TOKEN: &str = "CCI_INTEGRATION_TOKEN";

/// Immutable run configuration, read once at startup
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Model package group name; also the stable endpoint name
    pub model_name: String,
    /// Human-readable description of the model
    pub model_description: String,
    /// Execution role the hosted model runs as
    pub execution_role_arn: String,
    /// Authorization token for the release tracker
    pub tracker_token: String,
    /// Tunables from the optional settings file
    pub settings: DeploySettings,
}

impl DeployConfig {
    /// Build the configuration from the process environment
    pub fn from_env(settings: DeploySettings) -> DeployResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), settings)
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Every required variable is checked before failing, so the error
    /// names all of the missing ones at once. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F, settings: DeploySettings) -> DeployResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut require = |key: &str| -> String {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(value) => value,
                None => {
                    missing.push(key.to_string());
                    String::new()
                }
            }
        };

        let model_name = require(ENV_MODEL_NAME);
        let model_description = require(ENV_MODEL_DESC);
        let execution_role_arn = require(ENV_EXECUTION_ROLE_ARN);
        let tracker_token = require(ENV_TRACKER_TOKEN);

        if !missing.is_empty() {
            return Err(DeployError::MissingConfig(missing));
        }

        Ok(Self {
            model_name,
            model_description,
            execution_role_arn,
            tracker_token,
            settings,
        })
    }
}

/// Tunables loaded from an optional TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    /// Hosting platform settings
    pub platform: PlatformSettings,
    /// Availability polling settings
    pub poll: PollSettings,
    /// Release tracker settings
    pub tracker: TrackerSettings,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl DeploySettings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> DeployResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeployError::Config(format!("Failed to read config file: {}", e))
        })?;
        toml::from_str(&content)
            .map_err(|e| DeployError::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Hosting platform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// AWS region
    pub region: String,
    /// Instance type for the production variant
    pub instance_type: String,
    /// Initial instance count for the production variant
    pub instance_count: i32,
    /// Production variant name
    pub variant_name: String,
    /// Initial traffic weight of the production variant
    pub variant_weight: f32,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            instance_type: "ml.t2.medium".to_string(),
            instance_count: 1,
            variant_name: "AllTraffic".to_string(),
            variant_weight: 1.0,
        }
    }
}

/// Availability polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Seconds between endpoint status checks
    pub interval_secs: u64,
    /// Give up after this many status checks (unbounded when unset)
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            max_attempts: None,
        }
    }
}

/// Release tracker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Base URL of the release tracker
    pub host: String,
    /// Project the component belongs to
    pub project_id: String,
    /// Pipeline that produced the deployment
    pub pipeline_id: String,
    /// Workflow that produced the deployment
    pub workflow_id: String,
    /// Job number that produced the deployment
    pub job_number: u64,
    /// Replica count reported for versions
    pub desired_replicas: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            host: "https://internal.circleci.com/".to_string(),
            project_id: "ba4168c3-1b78-4ecf-9e33-39f9174337ed".to_string(),
            pipeline_id: "fe37088f-9907-4172-b298-dfcbca78fb65".to_string(),
            workflow_id: "b9944239-8e68-448b-a7f9-d51e49deff8f".to_string(),
            job_number: 7,
            desired_replicas: 1,
            timeout_secs: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
