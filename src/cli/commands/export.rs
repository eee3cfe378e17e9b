//! Export command - write the loaded inventory in INI format

use super::{CommandContext, Runnable};
use anyhow::{Context, Result};
use clap::Parser;
use rustible_inventory::inventory::write_ini;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Arguments for export command
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output_file: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let inventory = ctx.load_inventory()?;

        match &self.output_file {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_ini(&inventory, BufWriter::new(file))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                ctx.output
                    .info(&format!("Inventory written to {}", path.display()));
            }
            None => {
                write_ini(&inventory, io::stdout().lock()).context("Failed to write inventory")?;
            }
        }

        Ok(0)
    }
}

impl Runnable for ExportArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}
