//! sgdeploy-core: Core types for the sgdeploy model rollout tool
//!
//! This crate provides the fundamental types shared by every sgdeploy crate:
//! - Hosting resources (artifacts, models, endpoint configs, endpoints)
//! - Release tracker records
//! - Configuration types
//! - Error handling

pub mod config;
pub mod error;
pub mod journal;
pub mod model;
pub mod release;

pub use config::*;
pub use error::*;
pub use journal::CallJournal;
pub use model::*;
pub use release::*;
