//! sgdeploy-platform: Hosting platform abstraction
//!
//! This crate provides the platform implementations a rollout runs against:
//! - SageMaker, through the AWS SDK
//! - An in-memory platform for tests

pub mod memory;
pub mod sagemaker;
pub mod traits;

pub use memory::MemoryPlatform;
pub use sagemaker::SageMakerPlatform;
pub use traits::HostingPlatform;
