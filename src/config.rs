//! Configuration for immich-stacker
//!
//! Settings are read from `IMMICH_*` environment variables. The CLI may
//! override individual values afterwards.
//!
//! # Environment Variables
//!
//! ## Required
//! - `IMMICH_API_KEY`: API key sent as `x-api-key`
//! - `IMMICH_ENDPOINT`: server URL including the `/api` prefix
//! - `IMMICH_MATCH`: regex selecting assets to group; its matches are stripped to form the key
//! - `IMMICH_PARENT`: regex selecting the primary asset of each group
//!
//! ## Optional
//! - `IMMICH_DEBUG_HTTP`: log HTTP bodies at debug level - default: false
//! - `IMMICH_COMPARE_CREATED`: add the creation time to the grouping key - default: false
//! - `IMMICH_INSECURE_TLS`: accept invalid TLS certificates - default: false
//! - `IMMICH_READ_ONLY`: never write stacks - default: false
//! - `IMMICH_STACK_MODE`: create|update - default: "create"
//! - `IMMICH_LISTING`: timeline|search - default: "timeline"
//! - `IMMICH_PAGE_SIZE`: search page size - default: 1000
//! - `IMMICH_REQUEST_TIMEOUT`: per-request timeout in seconds - default: 30
//!
//! `IMMICH_LOG_LEVEL` and `IMMICH_LOG_JSON` are read by
//! [`LoggingConfig`](crate::util::LoggingConfig), since logging starts before
//! this configuration is loaded.

use crate::api::ClientOptions;
use crate::source::ListingStrategy;
use crate::stacker::{MatchRules, StackMode};
use regex::Regex;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const ENV_PREFIX: &str = "IMMICH_";

const DEFAULT_PAGE_SIZE: u32 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_PAGE_SIZE: u32 = 1000;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Invalid {field} pattern: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Clone)]
pub struct StackerConfig {
    pub api_key: String,
    pub endpoint: String,
    pub match_pattern: String,
    pub parent_pattern: String,
    pub debug_http: bool,
    pub compare_created: bool,
    pub insecure_tls: bool,
    pub read_only: bool,
    pub stack_mode: StackMode,
    pub listing: ListingStrategy,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

fn var_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key)
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let name = var_name(key);
    lookup(&name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Parses a boolean setting; accepts true/false, 1/0, yes/no, on/off
pub(crate) fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::ParseError {
            field: field.to_string(),
            error: format!("'{}' is not a boolean", value),
        }),
    }
}

fn optional<F, T>(
    lookup: &F,
    key: &str,
    default: T,
    parse: impl Fn(&str, &str) -> Result<T, ConfigError>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let name = var_name(key);
    match lookup(&name) {
        Some(value) if !value.is_empty() => parse(&name, &value),
        _ => Ok(default),
    }
}

fn parse_from_str<T>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
        field: field.to_string(),
        error: e.to_string(),
    })
}

impl StackerConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, "API_KEY")?;
        let endpoint = required(&lookup, "ENDPOINT")?;
        let match_pattern = required(&lookup, "MATCH")?;
        let parent_pattern = required(&lookup, "PARENT")?;

        Ok(Self {
            api_key,
            endpoint,
            match_pattern,
            parent_pattern,
            debug_http: optional(&lookup, "DEBUG_HTTP", false, parse_bool)?,
            compare_created: optional(&lookup, "COMPARE_CREATED", false, parse_bool)?,
            insecure_tls: optional(&lookup, "INSECURE_TLS", false, parse_bool)?,
            read_only: optional(&lookup, "READ_ONLY", false, parse_bool)?,
            stack_mode: optional(&lookup, "STACK_MODE", StackMode::default(), parse_from_str)?,
            listing: optional(&lookup, "LISTING", ListingStrategy::default(), parse_from_str)?,
            page_size: optional(&lookup, "PAGE_SIZE", DEFAULT_PAGE_SIZE, parse_from_str)?,
            request_timeout_secs: optional(
                &lookup,
                "REQUEST_TIMEOUT",
                DEFAULT_REQUEST_TIMEOUT_SECS,
                parse_from_str,
            )?,
        })
    }

    /// Checks ranges and endpoint scheme
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(format!(
                "Endpoint must start with http:// or https://, got: {}",
                self.endpoint
            )));
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::ValidationFailed(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        Ok(())
    }

    /// Compiles the match and parent patterns
    pub fn compile_rules(&self) -> Result<MatchRules, ConfigError> {
        let compile = |field: &str, pattern: &str| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                field: field.to_string(),
                source,
            })
        };

        let match_pattern = compile("match", &self.match_pattern)?;
        let parent_pattern = compile("parent", &self.parent_pattern)?;

        Ok(MatchRules::new(match_pattern, parent_pattern)
            .with_compare_created(self.compare_created))
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.request_timeout_secs),
            insecure_tls: self.insecure_tls,
            debug_http: self.debug_http,
        }
    }
}

fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

impl fmt::Debug for StackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &mask(&self.api_key))
            .field("match_pattern", &self.match_pattern)
            .field("parent_pattern", &self.parent_pattern)
            .field("compare_created", &self.compare_created)
            .field("read_only", &self.read_only)
            .field("stack_mode", &self.stack_mode)
            .field("listing", &self.listing)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for StackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stacker Configuration:")?;
        writeln!(f, "  Endpoint: {}", self.endpoint)?;
        writeln!(f, "  API Key: {}", mask(&self.api_key))?;
        writeln!(f, "  Match: {}", self.match_pattern)?;
        writeln!(f, "  Parent: {}", self.parent_pattern)?;
        writeln!(f, "  Compare Created: {}", self.compare_created)?;
        writeln!(f, "  Read Only: {}", self.read_only)?;
        writeln!(f, "  Stack Mode: {}", self.stack_mode)?;
        writeln!(f, "  Listing: {}", self.listing)?;
        writeln!(f, "  Page Size: {}", self.page_size)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        Ok(())
    }
}
