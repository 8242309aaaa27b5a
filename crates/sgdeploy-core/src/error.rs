//! Error types for sgdeploy

use thiserror::Error;

/// Main error type for sgdeploy
#[derive(Error, Debug)]
pub enum DeployError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more required configuration values are absent
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    /// The model package group has no approved package
    #[error("No approved model package found in group: {0}")]
    NoApprovedArtifact(String),

    /// Hosting platform API error
    #[error("Platform error: {0}")]
    Platform(String),

    /// Release tracker transport error
    #[error("Release tracker error: {0}")]
    Tracker(String),

    /// Release tracker answered with a non-2xx status
    #[error("Release tracker returned HTTP {status}: {body}")]
    TrackerStatus { status: u16, body: String },

    /// Endpoint reached a terminal failure state while polling
    #[error("Endpoint {name} entered {status}: {reason}")]
    EndpointFailed {
        name: String,
        status: String,
        reason: String,
    },

    /// Polling gave up before the endpoint became healthy
    #[error("Endpoint {name} not InService after {attempts} attempts")]
    PollExhausted { name: String, attempts: u32 },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for sgdeploy operations
pub type DeployResult<T> = Result<T, DeployError>;

impl DeployError {
    /// HTTP status of a tracker rejection, if this is one
    pub fn tracker_status(&self) -> Option<u16> {
        match self {
            DeployError::TrackerStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DeployError {
    fn from(err: serde_json::Error) -> Self {
        DeployError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DeployError {
    fn from(err: toml::de::Error) -> Self {
        DeployError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeployError::Config("invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: invalid config");
    }

    #[test]
    fn test_missing_config_lists_every_field() {
        let err = DeployError::MissingConfig(vec![
            "MODEL_NAME".to_string(),
            "CCI_INTEGRATION_TOKEN".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required configuration: MODEL_NAME, CCI_INTEGRATION_TOKEN"
        );
    }

    #[test]
    fn test_tracker_status() {
        let err = DeployError::TrackerStatus {
            status: 400,
            body: "bad request".to_string(),
        };
        assert_eq!(err.tracker_status(), Some(400));
        assert_eq!(DeployError::Tracker("timeout".into()).tracker_status(), None);
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DeployError = io_err.into();
        assert!(matches!(err, DeployError::Io(_)));
    }
}
