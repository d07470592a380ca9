use immich_stacker::cli::commands::{CliArgs, Commands};
use immich_stacker::cli::handlers::{handle_health, handle_stack};
use immich_stacker::util::{init_logging, parse_level, LoggingConfig};
use immich_stacker::VERSION;

use clap::Parser;
use tracing::{debug, warn, Level};

#[tokio::main]
async fn main() {
    // Variables already set in the environment take precedence over .env
    let dotenv = dotenvy::dotenv();

    let args = CliArgs::parse();
    init_logging(logging_from_args(&args));

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    debug!("immich-stacker v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Stack(stack_args) => handle_stack(stack_args).await,
        Commands::Health(health_args) => handle_health(health_args).await,
    };

    std::process::exit(exit_code);
}

fn logging_from_args(args: &CliArgs) -> LoggingConfig {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    config
}
