//! CLI module for Rustible Inventory
//!
//! This module provides the command-line interface, including argument
//! parsing, configuration loading, and subcommand handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Rustible Inventory - inspect and convert Ansible inventories
#[derive(Parser, Debug, Clone)]
#[command(name = "rustible-inventory")]
#[command(author = "Rustible Contributors")]
#[command(version)]
#[command(about = "Inspect and convert Ansible inventories", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to inventory file or directory
    #[arg(short = 'i', long, global = true, env = "RUSTIBLE_INVENTORY")]
    pub inventory: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "RUSTIBLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the inventory as ansible-inventory --list JSON
    List(commands::inventory::ListArgs),

    /// Print the group tree
    Graph(commands::inventory::GraphArgs),

    /// Print the effective variables of one host
    Host(commands::inventory::HostArgs),

    /// List hosts matching a pattern
    Hosts(commands::inventory::HostsArgs),

    /// Write the inventory in INI format
    Export(commands::export::ExportArgs),

    /// Load an inventory and read one host variable of a group
    Probe(commands::probe::ProbeArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}
