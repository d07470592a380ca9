use crate::source::ListingStrategy;
use crate::stacker::StackMode;
use clap::{Parser, Subcommand, ValueEnum};

/// Groups Immich burst and variant assets into stacks by filename patterns
#[derive(Parser, Debug)]
#[command(
    name = "immich-stacker",
    about = "Groups Immich burst and variant assets into stacks by filename patterns",
    version,
    long_about = "immich-stacker lists every asset on an Immich server, groups the ones whose \
                  filenames match IMMICH_MATCH by the name left after stripping the match, picks \
                  the asset matching IMMICH_PARENT as the primary of each group, and creates the \
                  stacks. Connection and pattern settings are read from IMMICH_* environment \
                  variables."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Group assets and create stacks",
        long_about = "Fetches all unstacked assets, builds candidate stacks from the configured \
                      patterns and creates every stack that has a parent and at least one member.\n\n\
                      Examples:\n  \
                      immich-stacker stack\n  \
                      immich-stacker stack --read-only\n  \
                      immich-stacker stack --compare-created --format json"
    )]
    Stack(StackArgs),

    #[command(
        about = "Check that the server is reachable",
        long_about = "Requests the server version with the configured endpoint and API key.\n\n\
                      Examples:\n  \
                      immich-stacker health\n  \
                      immich-stacker health --format json"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct StackArgs {
    #[arg(long, help = "Classify and count candidates without creating stacks")]
    pub read_only: bool,

    #[arg(long, help = "Only group assets created at the same time")]
    pub compare_created: bool,

    #[arg(long, value_enum, help = "Stacking protocol (overrides IMMICH_STACK_MODE)")]
    pub mode: Option<StackModeArg>,

    #[arg(long, value_enum, help = "How assets are listed (overrides IMMICH_LISTING)")]
    pub listing: Option<ListingArg>,

    #[arg(
        long,
        value_name = "N",
        help = "Assets per page for search listing (overrides IMMICH_PAGE_SIZE)"
    )]
    pub page_size: Option<u32>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Report format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackModeArg {
    Create,
    Update,
}

impl From<StackModeArg> for StackMode {
    fn from(arg: StackModeArg) -> Self {
        match arg {
            StackModeArg::Create => StackMode::Create,
            StackModeArg::Update => StackMode::Update,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingArg {
    Timeline,
    Search,
}

impl From<ListingArg> for ListingStrategy {
    fn from(arg: ListingArg) -> Self {
        match arg {
            ListingArg::Timeline => ListingStrategy::Timeline,
            ListingArg::Search => ListingStrategy::Search,
        }
    }
}
