//! Inventory commands - list, graph, host and hosts
//!
//! These mirror `ansible-inventory --list`, `--graph` and `--host`, plus a
//! pattern query that prints matching host names.

use super::{CommandContext, Runnable};
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use clap::Parser;
use rustible_inventory::inventory::{format_value, Group, Inventory, Vars, ALL};
use serde_json::{json, Map, Value as JsonValue};

/// Arguments for list command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Show each host's own variables and include group variables
    #[arg(long)]
    pub export: bool,
}

/// Arguments for graph command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Group to start from
    #[arg(default_value = ALL)]
    pub group: String,

    /// Show variables in the graph
    #[arg(long)]
    pub vars: bool,
}

/// Arguments for host command
#[derive(Parser, Debug, Clone)]
pub struct HostArgs {
    /// Host name
    pub name: String,
}

/// Arguments for hosts command
#[derive(Parser, Debug, Clone)]
pub struct HostsArgs {
    /// Host pattern to match
    #[arg(default_value = ALL)]
    pub pattern: String,
}

fn vars_to_json(vars: &Vars) -> Result<JsonValue> {
    let mut map = Map::new();
    for (key, value) in vars {
        map.insert(key.clone(), serde_json::to_value(value)?);
    }
    Ok(JsonValue::Object(map))
}

/// Groups directly below `all`
fn top_level_groups(inventory: &Inventory) -> Vec<&Group> {
    inventory
        .groups()
        .filter(|g| g.name != ALL && g.parents.iter().all(|p| p == ALL))
        .collect()
}

/// Build the `ansible-inventory --list` document
pub fn list_document(inventory: &Inventory, export: bool) -> Result<JsonValue> {
    let mut hostvars = Map::new();
    for host in inventory.hosts() {
        let vars = if export {
            host.vars.clone()
        } else {
            inventory.host_vars(host)
        };
        hostvars.insert(host.name.clone(), vars_to_json(&vars)?);
    }

    let mut document = Map::new();
    document.insert("_meta".to_string(), json!({ "hostvars": hostvars }));

    for group in inventory.groups() {
        let mut entry = Map::new();

        let children: Vec<&str> = if group.name == ALL {
            top_level_groups(inventory)
                .into_iter()
                .map(|g| g.name.as_str())
                .collect()
        } else {
            group.children.iter().map(String::as_str).collect()
        };
        if !children.is_empty() {
            entry.insert("children".to_string(), json!(children));
        }

        if group.name != ALL && !group.hosts.is_empty() {
            entry.insert("hosts".to_string(), json!(group.hosts));
        }

        if export && !group.vars.is_empty() {
            entry.insert("vars".to_string(), vars_to_json(&group.vars)?);
        }

        if !entry.is_empty() || group.name == ALL {
            document.insert(group.name.clone(), JsonValue::Object(entry));
        }
    }

    Ok(JsonValue::Object(document))
}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let inventory = ctx.load_inventory()?;
        let document = list_document(&inventory, self.export)?;
        ctx.output.data(&document)?;
        Ok(0)
    }
}

impl GraphArgs {
    /// Execute the graph command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let inventory = ctx.load_inventory()?;
        let group = inventory
            .get_group(&self.group)
            .with_context(|| format!("Group not found: {}", self.group))?;

        self.graph_group(ctx, &inventory, group, 0);
        Ok(0)
    }

    fn graph_group(
        &self,
        ctx: &CommandContext,
        inventory: &Inventory,
        group: &Group,
        depth: usize,
    ) {
        ctx.output.group_label(&tree_prefix(depth), &group.name);
        if self.vars {
            for (key, value) in &group.vars {
                ctx.output
                    .var_label(&tree_prefix(depth + 1), key, &format_value(value));
            }
        }

        let children: Vec<&Group> = if group.name == ALL {
            top_level_groups(inventory)
        } else {
            group
                .children
                .iter()
                .filter_map(|c| inventory.get_group(c))
                .collect()
        };
        for child in children {
            self.graph_group(ctx, inventory, child, depth + 1);
        }

        if group.name == ALL {
            return;
        }

        for host in group.hosts.iter().filter_map(|h| inventory.get_host(h)) {
            ctx.output.host_label(&tree_prefix(depth + 1), &host.name);
            if self.vars {
                for (key, value) in &host.vars {
                    ctx.output
                        .var_label(&tree_prefix(depth + 2), key, &format_value(value));
                }
            }
        }
    }
}

/// `  |  |--` style indentation used by the graph output
fn tree_prefix(depth: usize) -> String {
    if depth == 0 {
        String::new()
    } else {
        format!("{}--", "  |".repeat(depth))
    }
}

impl HostArgs {
    /// Execute the host command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let inventory = ctx.load_inventory()?;
        let host = inventory
            .get_host(&self.name)
            .with_context(|| format!("Host not found: {}", self.name))?;

        ctx.output.data(&vars_to_json(&inventory.host_vars(host))?)?;
        Ok(0)
    }
}

impl HostsArgs {
    /// Execute the hosts command
    pub fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let inventory = ctx.load_inventory()?;
        let hosts = inventory.get_hosts(&self.pattern)?;

        if hosts.is_empty() {
            ctx.output
                .warning(&format!("No hosts matched pattern: {}", self.pattern));
            return Ok(0);
        }

        let names: Vec<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
        match ctx.output.format() {
            OutputFormat::Human => {
                for name in names {
                    ctx.output.plain(name);
                }
            }
            OutputFormat::Json | OutputFormat::Yaml => ctx.output.data(&names)?,
        }

        Ok(0)
    }
}

impl Runnable for ListArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

impl Runnable for GraphArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

impl Runnable for HostArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}

impl Runnable for HostsArgs {
    fn run(&self, ctx: &mut CommandContext) -> Result<i32> {
        self.execute(ctx)
    }
}
