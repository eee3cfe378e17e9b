//! # Rustible Inventory - Ansible inventory files for Rust
//!
//! Reads Ansible inventories (INI, YAML, or directories with `group_vars/` and
//! `host_vars/`) into a typed model of hosts, groups, and variables, resolves
//! host patterns, computes effective variables, and writes inventories back
//! out in INI format.
//!
//! ## Core Concepts
//!
//! - **Host**: a managed node with its own variables
//! - **Group**: a named set of hosts and child groups with shared variables
//! - **Effective variables**: group and host variables merged by precedence
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use rustible_inventory::prelude::*;
//!
//! fn main() -> InventoryResult<()> {
//!     let inventory = Inventory::load("inventories/vagrant")?;
//!
//!     for host in inventory.get_hosts("lamp_db:!lamp_www")? {
//!         let vars = inventory.host_vars(host);
//!         println!("{} -> {:?}", host.name, vars.get("ansible_user"));
//!     }
//!
//!     print!("{}", to_ini_string(&inventory));
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types.
    //!
    //! ```rust
    //! use rustible_inventory::prelude::*;
    //!
    //! let inventory = Inventory::from_ini("[web]\nweb1\n").unwrap();
    //! assert_eq!(inventory.host_count(), 1);
    //! ```

    pub use crate::inventory::{
        format_value, to_ini_string, write_ini, Group, GroupBuilder, GroupHierarchy, Host,
        Inventory, InventoryError, InventoryResult, Vars, ALL, UNGROUPED,
    };

    pub use crate::config::Config;
}

// ============================================================================
// Inventory
// ============================================================================

/// Host and group inventory management.
///
/// The inventory defines the target hosts and their groupings. This module
/// reads INI, YAML and JSON sources, directory layouts with `group_vars/`
/// and `host_vars/`, and writes INI back out.
pub mod inventory;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration loading from config files and environment variables.
pub mod config;
