//! sgdeploy CLI
//!
//! Rolls the latest approved model package out to its SageMaker endpoint
//! and reports the release to the release tracker.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sgdeploy_core::{DeployConfig, DeploySettings};
use sgdeploy_pipeline::{DeploymentPipeline, SystemClock, TokioSleeper};
use sgdeploy_platform::SageMakerPlatform;
use sgdeploy_tracker::HttpReleaseTracker;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// sgdeploy - deploy the latest approved SageMaker model package
#[derive(Parser, Debug)]
#[command(name = "sgdeploy")]
#[command(version, about, long_about = None)]
struct Args {
    /// Settings file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// AWS region
    #[arg(long)]
    region: Option<String>,

    /// Print the rollout outcome as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => DeploySettings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => DeploySettings::default(),
    };
    if let Some(region) = args.region {
        settings.platform.region = region;
    }

    let level = args
        .log_level
        .unwrap_or_else(|| settings.logging.level.clone());
    init_logging(&level);

    info!("Starting sgdeploy v{}", env!("CARGO_PKG_VERSION"));

    let config = DeployConfig::from_env(settings)?;
    let platform = SageMakerPlatform::from_region(&config.settings.platform.region).await;
    let tracker = HttpReleaseTracker::new(
        config.settings.tracker.clone(),
        config.tracker_token.clone(),
    )?;

    let mut pipeline = DeploymentPipeline::new(
        config,
        Arc::new(platform),
        Arc::new(tracker),
        Arc::new(SystemClock),
        Arc::new(TokioSleeper),
    );
    let outcome = pipeline.run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "{} {} serving {} ({})",
            outcome.endpoint.name, outcome.action, outcome.model.name, outcome.artifact.arn
        );
        if outcome.reaped.total() > 0 {
            println!(
                "Removed {} model(s) and {} endpoint config(s)",
                outcome.reaped.models.len(),
                outcome.reaped.endpoint_configs.len()
            );
        }
    }

    Ok(())
}
