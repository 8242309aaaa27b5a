//! Endpoint availability polling

use std::sync::Arc;
use std::time::Duration;

use sgdeploy_core::{DeployError, DeployResult, EndpointDescription, PollSettings};
use sgdeploy_platform::HostingPlatform;
use tracing::{info, warn};

use crate::clock::Sleeper;

/// Waits for an endpoint to report `InService`
pub struct AvailabilityPoller {
    platform: Arc<dyn HostingPlatform>,
    sleeper: Arc<dyn Sleeper>,
    interval: Duration,
    max_attempts: Option<u32>,
}

impl AvailabilityPoller {
    pub fn new(
        platform: Arc<dyn HostingPlatform>,
        sleeper: Arc<dyn Sleeper>,
        settings: &PollSettings,
    ) -> Self {
        Self {
            platform,
            sleeper,
            interval: Duration::from_secs(settings.interval_secs),
            max_attempts: settings.max_attempts,
        }
    }

    /// Poll at a fixed interval until the endpoint is `InService`.
    ///
    /// `Failed` and `UpdateRollbackFailed` end the wait with an error. Without
    /// `max_attempts` there is no upper bound on the wait.
    pub async fn wait_until_in_service(
        &self,
        endpoint_name: &str,
    ) -> DeployResult<EndpointDescription> {
        let mut attempts: u32 = 0;

        loop {
            let description = self.platform.describe_endpoint(endpoint_name).await?;
            attempts += 1;

            if description.status.is_in_service() {
                info!(
                    endpoint = endpoint_name,
                    attempts = attempts,
                    "Endpoint is InService"
                );
                return Ok(description);
            }

            if description.status.is_terminal_failure() {
                warn!(
                    endpoint = endpoint_name,
                    status = %description.status,
                    "Endpoint rollout failed"
                );
                return Err(DeployError::EndpointFailed {
                    name: endpoint_name.to_string(),
                    status: description.status.to_string(),
                    reason: description
                        .failure_reason
                        .unwrap_or_else(|| "no failure reason reported".to_string()),
                });
            }

            info!(
                endpoint = endpoint_name,
                status = %description.status,
                attempt = attempts,
                "Waiting for endpoint"
            );

            if let Some(max) = self.max_attempts {
                if attempts >= max {
                    return Err(DeployError::PollExhausted {
                        name: endpoint_name.to_string(),
                        attempts,
                    });
                }
            }

            self.sleeper.sleep(self.interval).await;
        }
    }
}
