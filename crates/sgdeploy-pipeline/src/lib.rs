//! sgdeploy-pipeline: Model rollout stages
//!
//! This crate sequences a rollout of the latest approved model package:
//! - Artifact resolution
//! - Model, endpoint config and endpoint provisioning
//! - Availability polling
//! - Release tracker reporting
//! - Cleanup of superseded resources

pub mod clock;
pub mod pipeline;
pub mod poller;
pub mod provisioner;
pub mod reaper;
pub mod reporter;
pub mod resolver;

pub use clock::{Clock, FixedClock, RecordingSleeper, Sleeper, SystemClock, TokioSleeper};
pub use pipeline::{DeploymentOutcome, DeploymentPipeline, DeploymentStage};
pub use poller::AvailabilityPoller;
pub use provisioner::{EndpointRollout, ResourceProvisioner};
pub use reaper::{ReapReport, ResourceReaper};
pub use reporter::DeploymentReporter;
pub use resolver::ArtifactResolver;
