//! Command handlers; each returns the process exit code

use super::commands::{HealthArgs, StackArgs};
use super::output::{HealthStatus, OutputFormat, OutputFormatter};
use crate::api::{ImmichClient, PhotoApi};
use crate::config::StackerConfig;
use crate::stacker::{RunReport, Stacker};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Applies `stack` flags on top of the environment configuration
pub fn apply_stack_args(config: &mut StackerConfig, args: &StackArgs) {
    if args.read_only {
        config.read_only = true;
    }
    if args.compare_created {
        config.compare_created = true;
    }
    if let Some(mode) = args.mode {
        config.stack_mode = mode.into();
    }
    if let Some(listing) = args.listing {
        config.listing = listing.into();
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
}

fn load_config() -> Result<StackerConfig> {
    let config = StackerConfig::from_env().context("Error loading config")?;
    Ok(config)
}

fn build_client(config: &StackerConfig) -> Result<Arc<dyn PhotoApi>> {
    if config.insecure_tls {
        warn!("Insecure TLS connections enabled");
    }

    let client = ImmichClient::new(&config.endpoint, &config.api_key, config.client_options())
        .context("Failed to create Immich client")?;
    Ok(Arc::new(client))
}

/// Runs a full stacking pass against `api` and renders the report
pub async fn run_stack(
    api: Arc<dyn PhotoApi>,
    config: &StackerConfig,
    format: OutputFormat,
) -> Result<(RunReport, String)> {
    let stacker = Stacker::from_config(api, config).context("Invalid matching patterns")?;
    let report = stacker.run().await?;
    let rendered = OutputFormatter::new(format).format_report(&report)?;
    Ok((report, rendered))
}

pub async fn handle_stack(args: &StackArgs) -> i32 {
    match stack(args).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

async fn stack(args: &StackArgs) -> Result<()> {
    let mut config = load_config()?;
    apply_stack_args(&mut config, args);
    config.validate().context("Invalid configuration")?;

    info!(version = crate::VERSION, "Starting immich-stacker");
    debug!("{}", config);
    info!(endpoint = %config.endpoint, "Connecting to Immich");

    let api = build_client(&config)?;
    let (_, rendered) = run_stack(api, &config, args.format.into()).await?;
    print!("{}", rendered);
    Ok(())
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    let config = match load_config().and_then(|config| {
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    let api = match build_client(&config) {
        Ok(api) => api,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    let health = check_health(api.as_ref(), &config.endpoint).await;
    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_health(&health) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    }

    if health.reachable {
        0
    } else {
        1
    }
}

pub async fn check_health(api: &dyn PhotoApi, endpoint: &str) -> HealthStatus {
    match api.server_version().await {
        Ok(version) => HealthStatus {
            endpoint: endpoint.to_string(),
            reachable: true,
            version: Some(version),
            error: None,
        },
        Err(e) => HealthStatus {
            endpoint: endpoint.to_string(),
            reachable: false,
            version: None,
            error: Some(e.to_string()),
        },
    }
}
