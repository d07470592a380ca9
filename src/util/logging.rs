//! Structured logging setup
//!
//! Installs a `tracing` subscriber once per process. `RUST_LOG` takes
//! precedence when set; otherwise the crate logs at the configured level and
//! the HTTP stack is held at `warn`. Logs are written to stderr so the run
//! report on stdout stays machine-readable.

use crate::config::parse_bool;
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const CRATE_TARGET: &str = "immich_stacker";
const LOG_LEVEL_VAR: &str = "IMMICH_LOG_LEVEL";
const LOG_JSON_VAR: &str = "IMMICH_LOG_JSON";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's events
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,

    /// Include the module target in each line
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Level and format from `IMMICH_LOG_LEVEL` / `IMMICH_LOG_JSON`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Level and format through `lookup`, which maps a variable name to its value
    ///
    /// `IMMICH_LOG_JSON` accepts the same spellings as every other boolean
    /// setting. Invalid values fall back to the defaults with a warning on
    /// stderr, since no subscriber exists yet to report them.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup(LOG_LEVEL_VAR)
            .filter(|v| !v.is_empty())
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);

        let use_json = match lookup(LOG_JSON_VAR).filter(|v| !v.is_empty()) {
            Some(value) => parse_bool(LOG_JSON_VAR, &value).unwrap_or_else(|e| {
                eprintln!("{}, defaulting to plain text logs", e);
                false
            }),
            None => false,
        };

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

/// Parses a log level, falling back to INFO with a warning on stderr
///
/// ```
/// use immich_stacker::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let directives = [
        format!("{}={}", CRATE_TARGET, level),
        "h2=warn".to_string(),
        "hyper=warn".to_string(),
        "hyper_util=warn".to_string(),
        "reqwest=warn".to_string(),
    ];

    directives
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(EnvFilter::new("warn"), |filter, directive| {
            filter.add_directive(directive)
        })
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
