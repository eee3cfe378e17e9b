//! Rustible Inventory - inspect and convert Ansible inventories
//!
//! This is the main entry point for the `rustible-inventory` CLI.

mod cli;

use anyhow::Result;
use cli::commands::{CommandContext, Runnable};
use cli::{Cli, Commands};
use rustible_inventory::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {:#}", e);
        Config::default()
    });

    // Initialize logging based on verbosity, falling back to the configured level
    init_logging(cli.verbosity(), config.log_level());

    if cli.verbosity() >= 2 {
        eprintln!("rustible-inventory v{} by {}", VERSION, AUTHORS);
    }

    let mut ctx = CommandContext::new(&cli, config);

    let result = match &cli.command {
        Commands::List(args) => args.run(&mut ctx),
        Commands::Graph(args) => args.run(&mut ctx),
        Commands::Host(args) => args.run(&mut ctx),
        Commands::Hosts(args) => args.run(&mut ctx),
        Commands::Export(args) => args.run(&mut ctx),
        Commands::Probe(args) => args.run(&mut ctx),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            ctx.output.error(&format!("{:#}", e));
            1
        }
    };

    std::process::exit(exit_code);
}

/// Initialize logging on stderr based on verbosity level
fn init_logging(verbosity: u8, configured_level: &str) {
    let filter = match verbosity {
        0 => configured_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 3),
        )
        .with(env_filter)
        .init();
}
