//! `group_vars/` and `host_vars/` loading for directory inventories.
//!
//! Files are matched to groups and hosts by exact name, so a host called
//! `192.168.2.6` picks up `host_vars/192.168.2.6` as well as
//! `host_vars/192.168.2.6.yml`.

use super::{yaml::mapping_to_vars, Inventory, InventoryError, InventoryResult, Vars};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions tried after the bare name, in order
const VARS_EXTENSIONS: [&str; 3] = ["yml", "yaml", "json"];

/// Merge `group_vars/<group>` files into known groups
pub(crate) fn load_group_vars(inventory: &mut Inventory, dir: &Path) -> InventoryResult<()> {
    report_unknown(dir, |name| inventory.get_group(name).is_some())?;

    let names: Vec<String> = inventory.group_names().cloned().collect();
    for name in names {
        let Some(vars) = vars_for(dir, &name)? else {
            continue;
        };
        if let Some(group) = inventory.get_group_mut(&name) {
            debug!(group = %name, count = vars.len(), "merging group_vars");
            group.merge_vars(&vars);
        }
    }
    Ok(())
}

/// Merge `host_vars/<host>` files into known hosts
pub(crate) fn load_host_vars(inventory: &mut Inventory, dir: &Path) -> InventoryResult<()> {
    report_unknown(dir, |name| inventory.get_host(name).is_some())?;

    let names: Vec<String> = inventory.host_names().cloned().collect();
    for name in names {
        let Some(vars) = vars_for(dir, &name)? else {
            continue;
        };
        if let Some(host) = inventory.get_host_mut(&name) {
            debug!(host = %name, count = vars.len(), "merging host_vars");
            host.merge_vars(&vars);
        }
    }
    Ok(())
}

/// Merged variables for `name`: plain files first, then the `name/` directory
fn vars_for(dir: &Path, name: &str) -> InventoryResult<Option<Vars>> {
    let mut found = false;
    let mut vars = Vars::new();

    for candidate in candidates(dir, name) {
        if candidate.is_file() {
            found = true;
            vars.extend(read_vars_file(&candidate)?);
        }
    }

    let nested = dir.join(name);
    if nested.is_dir() {
        found = true;
        vars.extend(read_vars_dir(&nested)?);
    }

    Ok(found.then_some(vars))
}

/// `N`, `N.yml`, `N.yaml`, `N.json` inside `dir`
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    let mut paths = vec![dir.join(name)];
    paths.extend(
        VARS_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", name, ext))),
    );
    paths
}

/// Load variables from a directory (multiple files merged in name order)
fn read_vars_dir(path: &Path) -> InventoryResult<Vars> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_vars_extension(p))
        .collect();
    entries.sort();

    let mut merged = Vars::new();
    for entry in entries {
        merged.extend(read_vars_file(&entry)?);
    }
    Ok(merged)
}

fn has_vars_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| VARS_EXTENSIONS.contains(&ext))
}

/// Read one vars file; it must hold a mapping (an empty file is an empty mapping)
pub fn read_vars_file(path: &Path) -> InventoryResult<Vars> {
    let content = std::fs::read_to_string(path)?;
    let invalid = |message: String| InventoryError::InvalidVarsFile {
        path: path.to_path_buf(),
        message,
    };

    let value: Value = serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    match value {
        Value::Null => Ok(Vars::new()),
        Value::Mapping(_) => Ok(mapping_to_vars(&value)),
        other => Err(invalid(format!(
            "expected a mapping, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Log vars entries that name nothing in the inventory
fn report_unknown<F>(dir: &Path, known: F) -> InventoryResult<()>
where
    F: Fn(&str) -> bool,
{
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }

        let name = if path.is_file() && has_vars_extension(&path) {
            path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name)
        } else {
            file_name
        };
        if !known(name) && !known(file_name) {
            debug!(path = %path.display(), "vars file does not match any inventory entry");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn s(value: &str) -> Value {
        Value::String(value.to_string())
    }

    #[test]
    fn test_read_vars_file_variants() {
        let dir = TempDir::new().unwrap();

        let empty = dir.path().join("empty.yml");
        fs::write(&empty, "").unwrap();
        assert!(read_vars_file(&empty).unwrap().is_empty());

        let list = dir.path().join("list.yml");
        fs::write(&list, "- a\n- b\n").unwrap();
        assert!(matches!(
            read_vars_file(&list),
            Err(InventoryError::InvalidVarsFile { .. })
        ));

        let map = dir.path().join("map.json");
        fs::write(&map, r#"{"port": 8080, "tags": ["a"]}"#).unwrap();
        let vars = read_vars_file(&map).unwrap();
        assert_eq!(vars.get("port"), Some(&Value::Number(8080.into())));
        assert!(vars.get("tags").unwrap().is_sequence());
    }

    #[test]
    fn test_dotted_host_name_matches_exactly() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("hosts"), "[db]\n192.168.2.5\n192.168.2.6\n").unwrap();
        let host_vars = root.path().join("host_vars");
        fs::create_dir(&host_vars).unwrap();
        fs::write(host_vars.join("192.168.2.6"), "ansible_user: vagrant\n").unwrap();

        let inv = Inventory::load(root.path()).unwrap();
        assert_eq!(inv.get_host("192.168.2.6").unwrap().user(), Some("vagrant"));
        assert_eq!(inv.get_host("192.168.2.5").unwrap().user(), None);
    }

    #[test]
    fn test_group_vars_file_and_directory_merge() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join("hosts.ini"),
            "[web]\nweb1 http_port=80\n[web:vars]\nenv=dev\n",
        )
        .unwrap();

        let group_vars = root.path().join("group_vars");
        fs::create_dir_all(group_vars.join("web")).unwrap();
        fs::write(group_vars.join("web.yml"), "env: prod\nregion: eu\n").unwrap();
        fs::write(group_vars.join("web").join("10-a.yml"), "region: us\n").unwrap();
        fs::write(group_vars.join("web").join("notes.txt"), "ignored").unwrap();
        fs::write(group_vars.join("missing.yml"), "x: 1\n").unwrap();

        let inv = Inventory::load(root.path()).unwrap();
        let web = inv.get_group("web").unwrap();
        assert_eq!(web.get_var("env"), Some(&s("prod")));
        assert_eq!(web.get_var("region"), Some(&s("us")));
        assert!(inv.get_group("missing").is_none());
    }

    #[test]
    fn test_invalid_vars_file_fails_load() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("hosts"), "[web]\nweb1\n").unwrap();
        let group_vars = root.path().join("group_vars");
        fs::create_dir(&group_vars).unwrap();
        fs::write(group_vars.join("web"), "just a string\n").unwrap();

        assert!(matches!(
            Inventory::load(root.path()),
            Err(InventoryError::InvalidVarsFile { .. })
        ));
    }
}
