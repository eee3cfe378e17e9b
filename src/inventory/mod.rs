//! Inventory management.
//!
//! This module provides:
//! - Loading from INI, YAML and JSON sources, files or directories
//! - `group_vars/` and `host_vars/` merging for directory inventories
//! - Host pattern matching
//! - Group hierarchy and variable inheritance
//! - Writing an inventory back out in INI format

pub mod group;
pub mod host;
pub mod ini;
pub mod pattern;
pub mod vars;
pub mod writer;
pub mod yaml;

pub use group::{Group, GroupBuilder, GroupHierarchy, ALL, UNGROUPED};
pub use host::Host;
pub use writer::{format_value, to_ini_string, write_ini};

use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Variables keyed by name, in declaration order
pub type Vars = IndexMap<String, serde_yaml::Value>;

/// Errors that can occur during inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inventory path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("host not found: {0}")]
    HostNotFound(String),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("invalid host pattern: {0}")]
    InvalidPattern(String),

    #[error("adding group '{child}' to '{parent}' creates a dependency loop")]
    CircularDependency { parent: String, child: String },

    #[error("invalid INI format at line {line}: {message}")]
    InvalidIniFormat { line: usize, message: String },

    #[error("invalid inventory document: {0}")]
    InvalidFormat(String),

    #[error("invalid host range: {0}")]
    InvalidHostRange(String),

    #[error("invalid variables file '{}': {message}", path.display())]
    InvalidVarsFile { path: PathBuf, message: String },
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Inventory source file names probed inside a directory, in order
const DIRECTORY_SOURCES: [&str; 4] = ["hosts", "hosts.ini", "hosts.yml", "hosts.yaml"];

/// The main inventory structure holding all hosts and groups
#[derive(Debug, Clone)]
pub struct Inventory {
    /// All hosts indexed by name, in first-seen order
    hosts: IndexMap<String, Host>,

    /// All groups indexed by name, in first-seen order
    groups: IndexMap<String, Group>,

    /// Source file/directory path
    source: Option<PathBuf>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// Create a new empty inventory with default groups
    pub fn new() -> Self {
        let mut groups = IndexMap::new();
        groups.insert(ALL.to_string(), Group::all());
        groups.insert(UNGROUPED.to_string(), Group::ungrouped());

        Self {
            hosts: IndexMap::new(),
            groups,
            source: None,
        }
    }

    /// Load inventory from a file or directory
    pub fn load<P: AsRef<Path>>(path: P) -> InventoryResult<Self> {
        let path = path.as_ref();
        let mut inventory = Self::new();
        inventory.source = Some(path.to_path_buf());

        if path.is_dir() {
            inventory.load_directory(path)?;
        } else if path.is_file() {
            inventory.load_file(path)?;
        } else {
            return Err(InventoryError::NotFound(path.to_path_buf()));
        }

        inventory.finalize();
        debug!(
            source = %path.display(),
            hosts = inventory.host_count(),
            groups = inventory.group_count(),
            "inventory loaded"
        );

        Ok(inventory)
    }

    /// Parse an INI inventory from text
    pub fn from_ini(content: &str) -> InventoryResult<Self> {
        Self::from_lines(content.lines())
    }

    /// Parse an INI inventory from individual lines
    pub fn from_lines<I, S>(lines: I) -> InventoryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inventory = Self::new();
        ini::parse_lines(&mut inventory, lines)?;
        inventory.finalize();
        Ok(inventory)
    }

    /// Parse a YAML inventory from text
    pub fn from_yaml(content: &str) -> InventoryResult<Self> {
        let mut inventory = Self::new();
        yaml::parse_yaml(&mut inventory, content)?;
        inventory.finalize();
        Ok(inventory)
    }

    /// Load a single inventory file, choosing the format by extension
    fn load_file(&mut self, path: &Path) -> InventoryResult<()> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        debug!(path = %path.display(), format = %extension, "reading inventory source");

        match extension.as_str() {
            "yml" | "yaml" => yaml::parse_yaml(self, &content),
            "json" => yaml::parse_json(self, &content),
            _ => ini::parse_lines(self, content.lines()),
        }
    }

    /// Load inventory from a directory
    fn load_directory(&mut self, path: &Path) -> InventoryResult<()> {
        match DIRECTORY_SOURCES
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.is_file())
        {
            Some(hosts_file) => self.load_file(&hosts_file)?,
            None => warn!(path = %path.display(), "no hosts file found in inventory directory"),
        }

        // Membership must be settled before vars files are matched by name
        self.finalize();

        let group_vars = path.join("group_vars");
        if group_vars.is_dir() {
            vars::load_group_vars(self, &group_vars)?;
        }

        let host_vars = path.join("host_vars");
        if host_vars.is_dir() {
            vars::load_host_vars(self, &host_vars)?;
        }

        Ok(())
    }

    /// Create a group if it does not exist yet
    pub(crate) fn ensure_group(&mut self, name: &str) -> &mut Group {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| Group::new(name))
    }

    /// Add a host to `group_name` (and `all`), creating the host if needed
    /// and merging `vars` into it.
    pub(crate) fn attach_host(&mut self, host_name: &str, group_name: &str, vars: &Vars) {
        let host = self
            .hosts
            .entry(host_name.to_string())
            .or_insert_with(|| Host::new(host_name));
        host.merge_vars(vars);
        host.add_to_group(ALL);
        host.add_to_group(group_name);

        self.ensure_group(group_name).add_host(host_name);
        self.ensure_group(ALL).add_host(host_name);
    }

    /// Recompute parent links and `ungrouped` membership
    pub(crate) fn finalize(&mut self) {
        self.compute_group_parents();

        let mut ungrouped = IndexSet::new();
        for host in self.hosts.values_mut() {
            let grouped = host.groups.iter().any(|g| g != ALL && g != UNGROUPED);
            if grouped {
                host.remove_from_group(UNGROUPED);
            } else {
                host.add_to_group(UNGROUPED);
                ungrouped.insert(host.name.clone());
            }
        }

        self.ensure_group(UNGROUPED).hosts = ungrouped;
    }

    /// Compute parent group relationships from children
    fn compute_group_parents(&mut self) {
        let links: Vec<(String, String)> = self
            .groups
            .values()
            .flat_map(|g| g.children.iter().map(|c| (g.name.clone(), c.clone())))
            .collect();

        for group in self.groups.values_mut() {
            group.parents.clear();
        }

        for (parent, child) in links {
            if let Some(child) = self.groups.get_mut(&child) {
                child.add_parent(parent);
            }
        }
    }

    /// Add a host to the inventory
    ///
    /// The host's `groups` are honored; every group it names is created.
    pub fn add_host(&mut self, host: Host) -> InventoryResult<()> {
        let name = host.name.clone();
        let groups: Vec<String> = host.groups.iter().cloned().collect();
        let vars = host.vars.clone();

        self.attach_host(&name, ALL, &vars);
        for group in groups {
            self.attach_host(&name, &group, &IndexMap::new());
        }

        self.finalize();
        Ok(())
    }

    /// Add a group to the inventory, replacing a group with the same name
    ///
    /// Hosts and children named by the group must already exist.
    pub fn add_group(&mut self, group: Group) -> InventoryResult<()> {
        if let Some(missing) = group.hosts.iter().find(|h| !self.hosts.contains_key(*h)) {
            return Err(InventoryError::HostNotFound(missing.clone()));
        }
        if let Some(missing) = group.children.iter().find(|c| !self.groups.contains_key(*c)) {
            return Err(InventoryError::GroupNotFound(missing.clone()));
        }

        let name = group.name.clone();
        let children: Vec<String> = group.children.iter().cloned().collect();
        let mut stored = group;
        stored.children.clear();
        stored.parents.clear();

        for host_name in &stored.hosts {
            if let Some(host) = self.hosts.get_mut(host_name) {
                host.add_to_group(name.clone());
            }
        }
        self.groups.insert(name.clone(), stored);

        for child in children {
            self.add_child(&name, &child)?;
        }

        self.finalize();
        Ok(())
    }

    /// Make `child` a child group of `parent`
    pub fn add_child(&mut self, parent: &str, child: &str) -> InventoryResult<()> {
        if !self.groups.contains_key(parent) {
            return Err(InventoryError::GroupNotFound(parent.to_string()));
        }
        if !self.groups.contains_key(child) {
            return Err(InventoryError::GroupNotFound(child.to_string()));
        }
        if parent == child || self.is_descendant(parent, child) {
            return Err(InventoryError::CircularDependency {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }

        if let Some(group) = self.groups.get_mut(parent) {
            group.add_child(child);
        }
        if let Some(group) = self.groups.get_mut(child) {
            group.add_parent(parent);
        }
        Ok(())
    }

    /// Whether `candidate` is reachable from `group` through child links
    fn is_descendant(&self, candidate: &str, group: &str) -> bool {
        let mut stack = vec![group];
        let mut visited = HashSet::new();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(g) = self.groups.get(current) {
                for child in &g.children {
                    if child == candidate {
                        return true;
                    }
                    stack.push(child.as_str());
                }
            }
        }
        false
    }

    /// Get a host by name
    pub fn get_host(&self, name: &str) -> Option<&Host> {
        self.hosts.get(name)
    }

    /// Get a mutable reference to a host by name
    pub fn get_host_mut(&mut self, name: &str) -> Option<&mut Host> {
        self.hosts.get_mut(name)
    }

    /// Get a group by name
    pub fn get_group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Get a mutable reference to a group by name
    pub fn get_group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.get_mut(name)
    }

    /// Get all hosts, in first-seen order
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    /// Get all groups, in first-seen order (`all` and `ungrouped` first)
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Get all host names
    pub fn host_names(&self) -> impl Iterator<Item = &String> {
        self.hosts.keys()
    }

    /// Get all group names
    pub fn group_names(&self) -> impl Iterator<Item = &String> {
        self.groups.keys()
    }

    /// Count total hosts
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Count total groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Path the inventory was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Hosts of the group at `index` in declaration order
    pub fn group_host_at(&self, group: &str, index: usize) -> InventoryResult<&Host> {
        let group = self
            .get_group(group)
            .ok_or_else(|| InventoryError::GroupNotFound(group.to_string()))?;
        let name = group.host_at(index).ok_or_else(|| {
            InventoryError::HostNotFound(format!("{}[{}]", group.name, index))
        })?;
        self.get_host(name)
            .ok_or_else(|| InventoryError::HostNotFound(name.to_string()))
    }

    /// All hosts in a group, including hosts from descendant groups
    pub fn hosts_in_group(&self, name: &str) -> InventoryResult<Vec<&Host>> {
        let group = self
            .groups
            .get(name)
            .ok_or_else(|| InventoryError::GroupNotFound(name.to_string()))?;
        Ok(self.collect_group_hosts(group))
    }

    pub(crate) fn collect_group_hosts(&self, group: &Group) -> Vec<&Host> {
        let mut names: HashSet<&str> = HashSet::new();
        let mut stack = vec![group];
        let mut visited = HashSet::new();

        while let Some(current) = stack.pop() {
            if !visited.insert(current.name.as_str()) {
                continue;
            }
            names.extend(current.hosts.iter().map(String::as_str));
            stack.extend(current.children.iter().filter_map(|c| self.groups.get(c)));
        }

        self.hosts
            .values()
            .filter(|h| names.contains(h.name.as_str()))
            .collect()
    }

    /// Distance of every group from `all` (`all` is 0, top-level groups 1)
    fn group_depths(&self) -> HashMap<&str, usize> {
        fn depth<'a>(
            inventory: &'a Inventory,
            name: &'a str,
            memo: &mut HashMap<&'a str, usize>,
            visiting: &mut HashSet<&'a str>,
        ) -> usize {
            if name == ALL {
                return 0;
            }
            if let Some(d) = memo.get(name) {
                return *d;
            }
            if !visiting.insert(name) {
                return 1;
            }

            let d = inventory
                .groups
                .get(name)
                .map(|g| {
                    g.parents
                        .iter()
                        .map(|p| depth(inventory, p, memo, visiting) + 1)
                        .max()
                        .unwrap_or(1)
                })
                .unwrap_or(1);

            visiting.remove(name);
            memo.insert(name, d);
            d
        }

        let mut memo = HashMap::new();
        let mut visiting = HashSet::new();
        for name in self.groups.keys() {
            depth(self, name, &mut memo, &mut visiting);
        }
        memo.insert(ALL, 0);
        memo
    }

    /// Order `names` plus all their ancestors for variable application
    fn hierarchy_for<'a, I>(&self, names: I) -> GroupHierarchy
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut collected: IndexSet<&str> = IndexSet::new();
        collected.insert(ALL);

        let mut stack: Vec<&str> = names.into_iter().collect();
        while let Some(name) = stack.pop() {
            let Some((_, key, group)) = self.groups.get_full(name) else {
                continue;
            };
            if collected.insert(key.as_str()) {
                stack.extend(group.parents.iter().map(String::as_str));
            }
        }

        let depths = self.group_depths();
        let mut ordered: Vec<&Group> = collected
            .iter()
            .filter_map(|name| self.groups.get(*name))
            .collect();
        ordered.sort_by(|a, b| {
            let da = depths.get(a.name.as_str()).copied().unwrap_or(1);
            let db = depths.get(b.name.as_str()).copied().unwrap_or(1);
            da.cmp(&db)
                .then(a.priority.cmp(&b.priority))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut hierarchy = GroupHierarchy::new();
        for group in ordered {
            hierarchy.push(group.name.clone());
        }
        hierarchy
    }

    /// Get the group hierarchy for a host, least specific first
    pub fn host_group_hierarchy(&self, host: &Host) -> GroupHierarchy {
        self.hierarchy_for(host.groups.iter().map(String::as_str))
    }

    /// Get merged variables for a host (respecting group hierarchy)
    pub fn host_vars(&self, host: &Host) -> Vars {
        let mut vars = Vars::new();

        for group_name in self.host_group_hierarchy(host).parent_to_child() {
            if let Some(group) = self.groups.get(group_name) {
                vars.extend(group.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        vars.extend(host.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        vars
    }

    /// Look up one effective variable of a host
    pub fn host_var(&self, host_name: &str, key: &str) -> InventoryResult<Option<serde_yaml::Value>> {
        let host = self
            .get_host(host_name)
            .ok_or_else(|| InventoryError::HostNotFound(host_name.to_string()))?;
        Ok(self.host_vars(host).shift_remove(key))
    }

    /// Get merged variables for a group, including those inherited from ancestors
    pub fn group_vars(&self, name: &str) -> InventoryResult<Vars> {
        if !self.groups.contains_key(name) {
            return Err(InventoryError::GroupNotFound(name.to_string()));
        }

        let mut vars = Vars::new();
        for group_name in self.hierarchy_for([name]).parent_to_child() {
            if let Some(group) = self.groups.get(group_name) {
                vars.extend(group.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        Ok(vars)
    }
}

impl std::fmt::Display for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Inventory ({} hosts, {} groups)", self.hosts.len(), self.groups.len())?;

        for group in self.groups.values() {
            if group.name == ALL || group.hosts.is_empty() {
                continue;
            }
            writeln!(f, "  [{}]", group.name)?;
            for host_name in &group.hosts {
                if let Some(host) = self.hosts.get(host_name) {
                    writeln!(f, "    {}", host)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> serde_yaml::Value {
        serde_yaml::Value::String(value.to_string())
    }

    #[test]
    fn test_empty_inventory() {
        let inv = Inventory::new();
        assert_eq!(inv.host_count(), 0);
        let names: Vec<_> = inv.group_names().map(String::as_str).collect();
        assert_eq!(names, vec![ALL, UNGROUPED]);
    }

    #[test]
    fn test_add_host_goes_to_ungrouped() {
        let mut inv = Inventory::new();
        inv.add_host(Host::new("webserver1")).unwrap();

        assert_eq!(inv.host_count(), 1);
        assert!(inv.get_group(ALL).unwrap().has_host("webserver1"));
        assert!(inv.get_group(UNGROUPED).unwrap().has_host("webserver1"));
    }

    #[test]
    fn test_add_host_with_groups() {
        let mut inv = Inventory::new();
        let mut host = Host::new("web1");
        host.add_to_group("webservers");
        inv.add_host(host).unwrap();

        assert!(inv.get_group("webservers").unwrap().has_host("web1"));
        assert!(!inv.get_group(UNGROUPED).unwrap().has_host("web1"));
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut inv = Inventory::from_ini("[a]\n[b]\n[a:children]\nb\n").unwrap();
        let err = inv.add_child("b", "a").unwrap_err();
        assert!(matches!(err, InventoryError::CircularDependency { .. }));
        assert!(inv.add_child("a", "a").is_err());
        assert!(matches!(
            inv.add_child("a", "missing"),
            Err(InventoryError::GroupNotFound(_))
        ));
    }

    #[test]
    fn test_add_group_requires_known_members() {
        let mut inv = Inventory::new();
        let group = GroupBuilder::new("web").host("ghost").build();
        assert!(matches!(
            inv.add_group(group),
            Err(InventoryError::HostNotFound(_))
        ));

        inv.add_host(Host::new("web1")).unwrap();
        inv.add_group(GroupBuilder::new("web").host("web1").build()).unwrap();
        assert!(inv.get_host("web1").unwrap().in_group("web"));
        assert!(!inv.get_group(UNGROUPED).unwrap().has_host("web1"));
    }

    #[test]
    fn test_host_vars_precedence() {
        let inv = Inventory::from_ini(
            r#"
[web]
web1 role=host

[prod:children]
web

[all:vars]
role=all
env=dev
region=eu

[prod:vars]
role=prod
env=prod

[web:vars]
role=web
"#,
        )
        .unwrap();

        let host = inv.get_host("web1").unwrap();
        let vars = inv.host_vars(host);
        assert_eq!(vars.get("role"), Some(&s("host")));
        assert_eq!(vars.get("env"), Some(&s("prod")));
        assert_eq!(vars.get("region"), Some(&s("eu")));

        let hierarchy: Vec<_> = inv.host_group_hierarchy(host).parent_to_child().cloned().collect();
        assert_eq!(hierarchy, vec!["all", "prod", "web"]);
    }

    #[test]
    fn test_group_priority_breaks_ties() {
        let inv = Inventory::from_ini(
            r#"
[a]
h1
[b]
h1
[a:vars]
color=red
ansible_group_priority=10
[b:vars]
color=blue
"#,
        )
        .unwrap();

        assert_eq!(inv.host_var("h1", "color").unwrap(), Some(s("red")));
    }

    #[test]
    fn test_group_vars_include_ancestors() {
        let inv = Inventory::from_ini(
            "[db]\ndb1\n[lamp:children]\ndb\n[lamp:vars]\nansible_user=vagrant\n",
        )
        .unwrap();

        let vars = inv.group_vars("db").unwrap();
        assert_eq!(vars.get("ansible_user"), Some(&s("vagrant")));
        assert!(inv.get_group("db").unwrap().vars.is_empty());
        assert!(matches!(
            inv.group_vars("nope"),
            Err(InventoryError::GroupNotFound(_))
        ));
    }

    #[test]
    fn test_hosts_in_group_recursive() {
        let inv = Inventory::from_ini(
            "[a]\nh1\n[b]\nh2\n[c:children]\na\nb\n[d:children]\nc\n",
        )
        .unwrap();

        let names: Vec<_> = inv
            .hosts_in_group("d")
            .unwrap()
            .into_iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(names, vec!["h1", "h2"]);
    }

    #[test]
    fn test_group_host_at() {
        let inv = Inventory::from_ini("[lamp_db]\n192.168.2.5\n192.168.2.6\n").unwrap();
        assert_eq!(inv.group_host_at("lamp_db", 1).unwrap().name, "192.168.2.6");
        assert!(matches!(
            inv.group_host_at("lamp_db", 2),
            Err(InventoryError::HostNotFound(_))
        ));
        assert!(matches!(
            inv.group_host_at("lamp_web", 0),
            Err(InventoryError::GroupNotFound(_))
        ));
    }

    #[test]
    fn test_load_missing_path() {
        let err = Inventory::load("/definitely/not/here").unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }
}
