pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, HealthArgs, StackArgs};
pub use output::{HealthStatus, OutputFormat, OutputFormatter};
