//! Host definition for the inventory.
//!
//! A `Host` is a managed node: a name, its own variables and the names of
//! the groups it belongs to. Inherited group variables are resolved by the
//! [`Inventory`](super::Inventory), not stored here.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Default SSH port used when `ansible_port` is not set
pub const DEFAULT_PORT: u16 = 22;

/// A managed host in the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Host name (can be hostname, IP, or alias)
    pub name: String,

    /// Host-specific variables, in declaration order
    #[serde(default)]
    pub vars: IndexMap<String, serde_yaml::Value>,

    /// Groups this host belongs to
    #[serde(skip)]
    pub groups: IndexSet<String>,
}

impl Host {
    /// Create a new host with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: IndexMap::new(),
            groups: IndexSet::new(),
        }
    }

    /// Create a new host whose `ansible_host` points at `address`
    pub fn with_address(name: impl Into<String>, address: impl Into<String>) -> Self {
        let mut host = Self::new(name);
        host.set_var("ansible_host", serde_yaml::Value::String(address.into()));
        host
    }

    /// Get the actual address to connect to
    pub fn address(&self) -> &str {
        self.vars
            .get("ansible_host")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.name)
    }

    /// Port from `ansible_port`, accepting numbers and numeric strings
    pub fn port(&self) -> u16 {
        match self.vars.get("ansible_port") {
            Some(serde_yaml::Value::Number(n)) => n
                .as_u64()
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(DEFAULT_PORT),
            Some(serde_yaml::Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_PORT),
            _ => DEFAULT_PORT,
        }
    }

    /// Remote user from `ansible_user`
    pub fn user(&self) -> Option<&str> {
        self.vars.get("ansible_user").and_then(|v| v.as_str())
    }

    /// Set a variable on this host
    pub fn set_var(&mut self, key: impl Into<String>, value: serde_yaml::Value) {
        self.vars.insert(key.into(), value);
    }

    /// Get a variable from this host
    pub fn get_var(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.vars.get(key)
    }

    /// Check if host has a specific variable
    pub fn has_var(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Add this host to a group
    pub fn add_to_group(&mut self, group: impl Into<String>) {
        self.groups.insert(group.into());
    }

    /// Remove this host from a group
    pub fn remove_from_group(&mut self, group: &str) {
        self.groups.shift_remove(group);
    }

    /// Check if host belongs to a specific group
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Merge variables from another source (other takes precedence)
    pub fn merge_vars(&mut self, other: &IndexMap<String, serde_yaml::Value>) {
        for (key, value) in other {
            self.vars.insert(key.clone(), value.clone());
        }
    }
}

impl PartialEq for Host {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Host {}

impl std::hash::Hash for Host {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        let address = self.address();
        if address != self.name {
            write!(f, " ({})", address)?;
        }
        Ok(())
    }
}
