//! YAML and JSON inventory formats.
//!
//! Both the nested Ansible YAML layout (`all: {hosts, children, vars}`) and
//! the flat `ansible-inventory --list` JSON layout (groups with host arrays
//! plus `_meta.hostvars`) are accepted.

use super::{
    group::ALL, ini::expand_host_range, Inventory, InventoryError, InventoryResult, Vars,
};
use serde_yaml::Value;
use tracing::{debug, warn};

const META: &str = "_meta";

/// Parse YAML inventory text into `inventory`
pub(crate) fn parse_yaml(inventory: &mut Inventory, content: &str) -> InventoryResult<()> {
    let data: Value = serde_yaml::from_str(content)?;
    parse_document(inventory, &data)
}

/// Parse JSON inventory text into `inventory`
pub(crate) fn parse_json(inventory: &mut Inventory, content: &str) -> InventoryResult<()> {
    let json: serde_json::Value = serde_json::from_str(content)?;
    let data = serde_yaml::to_value(json)?;
    parse_document(inventory, &data)
}

fn parse_document(inventory: &mut Inventory, data: &Value) -> InventoryResult<()> {
    let map = match data {
        Value::Null => return Ok(()),
        Value::Mapping(map) => map,
        _ => {
            return Err(InventoryError::InvalidFormat(
                "expected a mapping of groups".to_string(),
            ))
        }
    };

    for (key, value) in map {
        let Some(name) = key_to_string(key) else {
            warn!(?key, "skipping non-scalar group name");
            continue;
        };
        if name == META {
            continue;
        }
        parse_group(inventory, &name, value)?;
    }

    if let Some(hostvars) = map
        .get(META)
        .and_then(|meta| meta.get("hostvars"))
        .and_then(Value::as_mapping)
    {
        for (host_key, vars) in hostvars {
            let Some(host_name) = key_to_string(host_key) else {
                continue;
            };
            let vars = mapping_to_vars(vars);
            match inventory.get_host_mut(&host_name) {
                Some(host) => host.merge_vars(&vars),
                None => debug!(host = %host_name, "hostvars for unknown host ignored"),
            }
        }
    }

    Ok(())
}

/// Parse a group definition (hosts, children, vars)
fn parse_group(inventory: &mut Inventory, name: &str, value: &Value) -> InventoryResult<()> {
    inventory.ensure_group(name);

    // A bare list of host names
    if let Value::Sequence(hosts) = value {
        for host in hosts.iter().filter_map(key_to_string) {
            add_hosts(inventory, name, &host, &Vars::new())?;
        }
        return Ok(());
    }

    let Value::Mapping(map) = value else {
        return Ok(());
    };

    match map.get("hosts") {
        Some(Value::Mapping(hosts)) => {
            for (host_key, host_vars) in hosts {
                if let Some(host) = key_to_string(host_key) {
                    add_hosts(inventory, name, &host, &mapping_to_vars(host_vars))?;
                }
            }
        }
        Some(Value::Sequence(hosts)) => {
            for host in hosts.iter().filter_map(key_to_string) {
                add_hosts(inventory, name, &host, &Vars::new())?;
            }
        }
        _ => {}
    }

    match map.get("children") {
        Some(Value::Mapping(children)) => {
            for (child_key, child_value) in children {
                if let Some(child) = key_to_string(child_key) {
                    inventory.ensure_group(&child);
                    parse_group(inventory, &child, child_value)?;
                    link_child(inventory, name, &child)?;
                }
            }
        }
        Some(Value::Sequence(children)) => {
            for child in children.iter().filter_map(key_to_string) {
                inventory.ensure_group(&child);
                link_child(inventory, name, &child)?;
            }
        }
        _ => {}
    }

    if let Some(vars) = map.get("vars") {
        let vars = mapping_to_vars(vars);
        if let Some(group) = inventory.get_group_mut(name) {
            group.merge_vars(&vars);
        }
    }

    Ok(())
}

fn add_hosts(
    inventory: &mut Inventory,
    group: &str,
    pattern: &str,
    vars: &Vars,
) -> InventoryResult<()> {
    for host in expand_host_range(pattern)? {
        inventory.attach_host(&host, group, vars);
    }
    Ok(())
}

/// `all` lists its top-level groups as children; those links are implicit
fn link_child(inventory: &mut Inventory, parent: &str, child: &str) -> InventoryResult<()> {
    if parent == ALL {
        return Ok(());
    }
    inventory.add_child(parent, child)
}

/// Convert a scalar YAML key into a name
pub(crate) fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Variables of a YAML mapping; anything else yields no variables
pub(crate) fn mapping_to_vars(value: &Value) -> Vars {
    let mut vars = Vars::new();
    if let Value::Mapping(map) = value {
        for (key, value) in map {
            if let Some(key) = key_to_string(key) {
                vars.insert(key, value.clone());
            }
        }
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_yaml() {
        let inv = Inventory::from_yaml(
            r#"
all:
  hosts:
    localhost:
      ansible_connection: local
  children:
    webservers:
      hosts:
        web[1:2]:
          http_port: 80
    production:
      children:
        webservers:
      vars:
        env: prod
  vars:
    ntp: pool.ntp.org
"#,
        )
        .unwrap();

        assert_eq!(inv.host_count(), 3);
        assert!(inv.get_group("ungrouped").unwrap().has_host("localhost"));
        assert!(inv.get_group("webservers").unwrap().has_host("web2"));
        assert!(inv.get_group("production").unwrap().has_child("webservers"));
        assert_eq!(
            inv.get_host("web1").unwrap().get_var("http_port"),
            Some(&Value::Number(80.into()))
        );
        assert_eq!(
            inv.get_group("all").unwrap().get_var("ntp").and_then(Value::as_str),
            Some("pool.ntp.org")
        );
    }

    #[test]
    fn test_parse_list_json() {
        let mut inv = Inventory::new();
        parse_json(
            &mut inv,
            r#"{
                "_meta": {"hostvars": {"db1": {"ansible_user": "vagrant"}}},
                "all": {"children": ["ungrouped", "databases"]},
                "databases": {"hosts": ["db1", "db2"], "vars": {"port": 5432}}
            }"#,
        )
        .unwrap();
        inv.finalize();

        assert_eq!(inv.host_count(), 2);
        assert_eq!(inv.get_host("db1").unwrap().user(), Some("vagrant"));
        assert!(inv.get_group("databases").unwrap().has_var("port"));
        assert!(inv.get_group("all").unwrap().children.is_empty());
    }

    #[test]
    fn test_non_mapping_document_is_rejected() {
        assert!(Inventory::from_yaml("- just\n- a list\n").is_err());
        assert_eq!(Inventory::from_yaml("").unwrap().host_count(), 0);
    }
}
