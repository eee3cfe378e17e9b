//! Group definition for the inventory.
//!
//! This module provides the `Group` structure representing a logical grouping
//! of hosts with shared variables and parent-child relationships.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Name of the implicit group containing every host
pub const ALL: &str = "all";

/// Name of the implicit group for hosts without any other group
pub const UNGROUPED: &str = "ungrouped";

/// Variable controlling the merge order of sibling groups
pub const PRIORITY_VAR: &str = "ansible_group_priority";

/// A group of hosts in the inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Group name
    pub name: String,

    /// Host names belonging to this group, in declaration order
    #[serde(default)]
    pub hosts: IndexSet<String>,

    /// Child group names
    #[serde(default)]
    pub children: IndexSet<String>,

    /// Parent group names (computed from children relationships)
    #[serde(skip)]
    pub parents: IndexSet<String>,

    /// Group-specific variables
    #[serde(default)]
    pub vars: IndexMap<String, serde_yaml::Value>,

    /// Priority for variable precedence among groups of equal depth
    #[serde(default)]
    pub priority: i32,
}

impl Group {
    /// Create a new group with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: IndexSet::new(),
            children: IndexSet::new(),
            parents: IndexSet::new(),
            vars: IndexMap::new(),
            priority: 0,
        }
    }

    /// Create the special "all" group
    pub fn all() -> Self {
        Self::new(ALL)
    }

    /// Create the special "ungrouped" group
    pub fn ungrouped() -> Self {
        Self::new(UNGROUPED)
    }

    /// Whether this is one of the two implicit groups
    pub fn is_implicit(&self) -> bool {
        self.name == ALL || self.name == UNGROUPED
    }

    /// Add a host to this group
    pub fn add_host(&mut self, host: impl Into<String>) {
        self.hosts.insert(host.into());
    }

    /// Check if a host belongs to this group
    pub fn has_host(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    /// Host name at `index` in declaration order
    pub fn host_at(&self, index: usize) -> Option<&str> {
        self.hosts.get_index(index).map(String::as_str)
    }

    /// Add a child group
    pub fn add_child(&mut self, child: impl Into<String>) {
        self.children.insert(child.into());
    }

    /// Check if a group is a child of this group
    pub fn has_child(&self, child: &str) -> bool {
        self.children.contains(child)
    }

    /// Add a parent group (internal use for reverse lookups)
    pub fn add_parent(&mut self, parent: impl Into<String>) {
        self.parents.insert(parent.into());
    }

    /// Check if a group is a parent of this group
    pub fn has_parent(&self, parent: &str) -> bool {
        self.parents.contains(parent)
    }

    /// Set a variable on this group
    ///
    /// `ansible_group_priority` also updates [`Group::priority`].
    pub fn set_var(&mut self, key: impl Into<String>, value: serde_yaml::Value) {
        let key = key.into();
        if key == PRIORITY_VAR {
            if let Some(priority) = parse_priority(&value) {
                self.priority = priority;
            }
        }
        self.vars.insert(key, value);
    }

    /// Get a variable from this group
    pub fn get_var(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.vars.get(key)
    }

    /// Check if group has a specific variable
    pub fn has_var(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Check if this group is empty (no hosts and no children)
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.children.is_empty()
    }

    /// Get the number of direct host members
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Get the number of child groups
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Merge variables from another source (other takes precedence)
    pub fn merge_vars(&mut self, other: &IndexMap<String, serde_yaml::Value>) {
        for (key, value) in other {
            self.set_var(key.clone(), value.clone());
        }
    }
}

fn parse_priority(value: &serde_yaml::Value) -> Option<i32> {
    match value {
        serde_yaml::Value::Number(n) => n.as_i64().and_then(|p| i32::try_from(p).ok()),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Group {}

impl std::hash::Hash for Group {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} hosts", self.name, self.hosts.len())?;
        if !self.children.is_empty() {
            write!(f, ", {} children", self.children.len())?;
        }
        write!(f, ")")
    }
}

/// Builder for creating groups with a fluent API
#[derive(Debug, Default)]
pub struct GroupBuilder {
    name: String,
    hosts: IndexSet<String>,
    children: IndexSet<String>,
    vars: IndexMap<String, serde_yaml::Value>,
}

impl GroupBuilder {
    /// Create a new group builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a host to the group
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.hosts.insert(host.into());
        self
    }

    /// Add multiple hosts to the group
    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Add a child group
    pub fn child(mut self, child: impl Into<String>) -> Self {
        self.children.insert(child.into());
        self
    }

    /// Add a variable
    pub fn var(mut self, key: impl Into<String>, value: serde_yaml::Value) -> Self {
        self.vars.insert(key.into(), value);
        self
    }

    /// Build the group
    pub fn build(self) -> Group {
        let mut group = Group::new(self.name);
        group.hosts = self.hosts;
        group.children = self.children;
        group.merge_vars(&self.vars);
        group
    }
}

/// Ordered list of groups used for variable inheritance
#[derive(Debug, Clone, Default)]
pub struct GroupHierarchy {
    /// Groups from least specific to most specific
    pub groups: Vec<String>,
}

impl GroupHierarchy {
    /// Create a new empty hierarchy
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Add a group to the hierarchy
    pub fn push(&mut self, group: impl Into<String>) {
        self.groups.push(group.into());
    }

    /// Groups in variable application order (later overrides earlier)
    pub fn parent_to_child(&self) -> impl Iterator<Item = &String> {
        self.groups.iter()
    }

    /// Groups from most specific to least specific
    pub fn child_to_parent(&self) -> impl Iterator<Item = &String> {
        self.groups.iter().rev()
    }

    /// Whether `group` is part of the hierarchy
    pub fn contains(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
