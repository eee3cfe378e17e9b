//! Subcommands module for Rustible Inventory CLI
//!
//! This module contains all the subcommand implementations.

pub mod export;
pub mod inventory;
pub mod probe;

use crate::cli::output::OutputFormatter;
use anyhow::{Context, Result};
use rustible_inventory::config::Config;
use rustible_inventory::inventory::Inventory;
use std::path::PathBuf;
use tracing::debug;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Inventory path from the command line
    pub inventory_path: Option<PathBuf>,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.colors_enabled();
        let output = OutputFormatter::new(use_color, cli.output, cli.verbosity());

        Self {
            config,
            output,
            inventory_path: cli.inventory.clone(),
        }
    }

    /// Get the effective inventory path
    pub fn inventory(&self) -> Option<&PathBuf> {
        self.inventory_path
            .as_ref()
            .or(self.config.defaults.inventory.as_ref())
    }

    /// Load the effective inventory
    pub fn load_inventory(&self) -> Result<Inventory> {
        let path = self.inventory().context(
            "No inventory specified. Use -i or set defaults.inventory in rustible.cfg",
        )?;

        debug!(path = %path.display(), "loading inventory");
        let inventory = Inventory::load(path)
            .with_context(|| format!("Failed to load inventory: {}", path.display()))?;

        self.output.info(&format!(
            "Loaded {} hosts in {} groups from {}",
            inventory.host_count(),
            inventory.group_count(),
            path.display()
        ));
        Ok(inventory)
    }
}

/// Trait for runnable commands
pub trait Runnable {
    /// Execute the command, returning the process exit code
    fn run(&self, ctx: &mut CommandContext) -> Result<i32>;
}
