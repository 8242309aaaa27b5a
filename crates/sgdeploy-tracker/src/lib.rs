//! sgdeploy-tracker: Release tracker integration
//!
//! This crate provides:
//! - The HTTP client for the release tracker's component and release APIs
//! - The JSON payloads those APIs accept
//! - An in-memory tracker for tests

pub mod client;
pub mod memory;
pub mod traits;
pub mod wire;

pub use client::HttpReleaseTracker;
pub use memory::MemoryTracker;
pub use traits::ReleaseTracker;
