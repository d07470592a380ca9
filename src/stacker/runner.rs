//! One complete stacking run
//!
//! Version pre-flight, full asset fetch, candidate assembly, then
//! classification and apply. Failures before apply abort the run; apply
//! failures only show up in the statistics.

use super::assembler::StackAssembler;
use super::stats::RunStats;
use crate::api::{ApiError, PhotoApi, ServerVersion};
use crate::config::{ConfigError, StackerConfig};
use crate::source::{AssetSource, ListingStrategy, SourceError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Server version check failed: {0}")]
    VersionCheck(#[source] ApiError),

    #[error("Failed to fetch assets: {0}")]
    Fetch(#[from] SourceError),
}

/// Everything a finished run reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub server_version: ServerVersion,
    pub total_assets: usize,
    pub already_stacked: usize,
    pub matched: usize,
    pub ignored: usize,
    pub candidates: usize,
    pub parent_conflicts: usize,
    pub read_only: bool,
    pub mode: String,
    pub stats: RunStats,
}

pub struct Stacker {
    api: Arc<dyn PhotoApi>,
    assembler: StackAssembler,
    source: AssetSource,
    page_size: u32,
}

impl Stacker {
    pub fn new(
        api: Arc<dyn PhotoApi>,
        assembler: StackAssembler,
        listing: ListingStrategy,
        page_size: u32,
    ) -> Self {
        let source = AssetSource::new(api.clone(), listing);
        Self {
            api,
            assembler,
            source,
            page_size,
        }
    }

    /// Builds a stacker from configuration, compiling its patterns
    pub fn from_config(
        api: Arc<dyn PhotoApi>,
        config: &StackerConfig,
    ) -> Result<Self, ConfigError> {
        let rules = config.compile_rules()?;
        let assembler = StackAssembler::new(rules, config.stack_mode, config.read_only);
        Ok(Self::new(api, assembler, config.listing, config.page_size))
    }

    pub async fn check_version(&self) -> Result<ServerVersion, RunError> {
        let version = self
            .api
            .server_version()
            .await
            .map_err(RunError::VersionCheck)?;

        info!(
            major = version.major,
            minor = version.minor,
            patch = version.patch,
            "Server version"
        );

        Ok(version)
    }

    pub async fn run(&self) -> Result<RunReport, RunError> {
        let start = Instant::now();
        info!("Connecting to {}", self.api.describe());

        let server_version = self.check_version().await?;
        let listing = self.source.fetch_all(self.page_size).await?;
        let candidates = self.assembler.build_candidates(&listing.assets);
        let stats = self
            .assembler
            .classify_and_apply(self.api.as_ref(), &candidates)
            .await;

        info!(
            candidates = stats.candidates(),
            stackable = stats.stackable,
            success = stats.succeeded,
            failed = stats.failed,
            not_stackable = stats.not_stackable,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Finished"
        );

        Ok(RunReport {
            server_version,
            total_assets: listing.total_seen,
            already_stacked: listing.already_stacked,
            matched: candidates.matched,
            ignored: candidates.ignored,
            candidates: candidates.len(),
            parent_conflicts: candidates.parent_conflicts,
            read_only: self.assembler.is_read_only(),
            mode: self.assembler.mode().to_string(),
            stats,
        })
    }
}
