//! immich-stacker - groups Immich assets into stacks by filename patterns
//!
//! Burst shots and RAW+JPEG pairs share a filename once a camera-specific
//! suffix is stripped. This crate lists every unstacked asset on an Immich
//! server, groups assets by that stripped name, picks the primary asset of
//! each group with a second pattern, and asks the server to create the stacks.
//!
//! # Example Usage
//!
//! ```ignore
//! use immich_stacker::{ImmichClient, ClientOptions, StackerConfig, Stacker};
//! use std::sync::Arc;
//!
//! async fn stack_library() -> anyhow::Result<()> {
//!     let config = StackerConfig::from_env()?;
//!     let client = ImmichClient::new(&config.endpoint, &config.api_key, config.client_options())?;
//!
//!     let report = Stacker::from_config(Arc::new(client), &config)?.run().await?;
//!     println!("{}", report.stats);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`api`]: the `PhotoApi` seam, its HTTP client and a mock
//! - [`source`]: exhaustive asset listing
//! - [`stacker`]: key derivation, candidate assembly, apply and run report
//! - [`config`]: `IMMICH_*` environment configuration
//! - [`cli`]: command-line front end

pub mod api;
pub mod cli;
pub mod config;
pub mod source;
pub mod stacker;
pub mod util;

pub use api::{ApiError, ClientOptions, ImmichClient, PhotoApi};
pub use config::{ConfigError, StackerConfig};
pub use source::{Asset, AssetListing, AssetSource, ListingStrategy, SourceError};
pub use stacker::{
    CandidateSet, CandidateStack, MatchRules, RunError, RunReport, RunStats, StackAssembler,
    StackMode, Stacker,
};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
