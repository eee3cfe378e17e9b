//! Probe command - load an inventory and read one host variable
//!
//! Prints `loading inventory`, loads the inventory, reads every host, looks
//! up the group, the host at the given index and that host's variable, then
//! prints `done loading inventory`. Anything missing is an error.

use super::{CommandContext, Runnable};
use anyhow::{bail, Context, Result};
use clap::Parser;
use rustible_inventory::inventory::format_value;

/// Arguments for probe command
#[derive(Parser, Debug, Clone)]
pub struct ProbeArgs {
    /// Group to look up
    #[arg(long, default_value = "lamp_db")]
    pub group: String,

    /// Position of the host within the group
    #[arg(long, default_value_t = 1)]
    pub index: usize,

    /// Variable to read from that host
    #[arg(long, default_value = "ansible_user")]
    pub var: String,
}

impl ProbeArgs {
    /// Execute the probe command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        ctx.output.plain("loading inventory");

        let inventory = ctx.load_inventory()?;

        let hosts: Vec<_> = inventory.hosts().collect();
        ctx.output.debug(&format!("{} hosts loaded", hosts.len()));

        let host = inventory.group_host_at(&self.group, self.index)?;
        let value = inventory
            .host_var(&host.name, &self.var)?
            .with_context(|| format!("Host {} has no variable {}", host.name, self.var))?;

        let rendered = format_value(&value);
        if rendered.is_empty() {
            bail!("Variable {} of host {} is empty", self.var, host.name);
        }
        ctx.output.debug(&format!(
            "{}[{}] = {} ({} = {})",
            self.group, self.index, host.name, self.var, rendered
        ));

        ctx.output.plain("done loading inventory");
        Ok(0)
    }
}

impl Runnable for ProbeArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}
