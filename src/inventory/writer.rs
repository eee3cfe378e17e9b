//! INI writer.
//!
//! Renders an [`Inventory`] back into the INI format accepted by
//! [`Inventory::from_ini`]. Effective (inherited) variables are not
//! flattened into hosts; every host and group keeps only its own variables.

use super::{
    group::{ALL, UNGROUPED},
    ini::split_variables,
    Inventory, Vars,
};
use serde_yaml::Value;
use std::collections::HashSet;
use std::io::Write;

/// Render the inventory as INI text
pub fn to_ini_string(inventory: &Inventory) -> String {
    let mut sections: Vec<Vec<String>> = Vec::new();
    let mut written: HashSet<&str> = HashSet::new();

    if let Some(ungrouped) = inventory.get_group(UNGROUPED) {
        let lines: Vec<String> = ungrouped
            .hosts
            .iter()
            .map(|name| host_line(inventory, name, written.insert(name.as_str())))
            .collect();
        if !lines.is_empty() {
            sections.push(lines);
        }
    }

    for group in inventory.groups() {
        if group.name == ALL {
            continue;
        }

        let bare = group.is_empty() && group.vars.is_empty();
        if group.name != UNGROUPED && (!group.hosts.is_empty() || bare) {
            let mut lines = vec![format!("[{}]", group.name)];
            for name in &group.hosts {
                lines.push(host_line(inventory, name, written.insert(name.as_str())));
            }
            sections.push(lines);
        }

        if !group.children.is_empty() {
            let mut lines = vec![format!("[{}:children]", group.name)];
            lines.extend(group.children.iter().cloned());
            sections.push(lines);
        }

        if !group.vars.is_empty() {
            sections.push(vars_section(&group.name, &group.vars));
        }
    }

    if let Some(all) = inventory.get_group(ALL) {
        if !all.vars.is_empty() {
            sections.push(vars_section(ALL, &all.vars));
        }
    }

    let mut out = sections
        .into_iter()
        .map(|lines| lines.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// A host line; own variables only on the host's first appearance
fn host_line(inventory: &Inventory, name: &str, first: bool) -> String {
    let mut line = name.to_string();
    if let Some(host) = inventory.get_host(name).filter(|_| first) {
        for (key, value) in &host.vars {
            line.push(' ');
            line.push_str(&assignment(key, value));
        }
    }
    line
}

/// Write the inventory as INI text to `writer`
pub fn write_ini<W: Write>(inventory: &Inventory, mut writer: W) -> std::io::Result<()> {
    writer.write_all(to_ini_string(inventory).as_bytes())?;
    writer.flush()
}

fn vars_section(group: &str, vars: &Vars) -> Vec<String> {
    let mut lines = vec![format!("[{}:vars]", group)];
    lines.extend(vars.iter().map(|(key, value)| assignment(key, value)));
    lines
}

fn assignment(key: &str, value: &Value) -> String {
    format!("{}={}", key, format_value(value))
}

/// Format a variable value the way it is written to an INI file
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Sequence(_) => quote(&format!("'{}'", render_nested(value, '"'))),
        Value::Mapping(_) => quote(&render_nested(value, '\'')),
        Value::Tagged(tagged) => format_value(&tagged.value),
    }
}

/// Double backslashes and wrap in quotes when the value would not survive
/// [`split_variables`] as a single token.
///
/// `"` is tried before `'`; a value where both fail keeps `"`.
fn quote(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\");
    if splits_whole(&escaped) {
        return escaped;
    }
    let quote = ['"', '\'']
        .into_iter()
        .find(|q| splits_whole(&format!("{}{}{}", q, escaped, q)))
        .unwrap_or('"');
    format!("{}{}{}", quote, escaped, quote)
}

/// Whether `value` reads back as one token when more variables follow it
fn splits_whole(value: &str) -> bool {
    let assignment = format!("k={}", value);
    let tokens = split_variables(&format!("{} next=1", assignment));
    tokens.len() == 2 && tokens[0] == assignment
}

/// Inline rendering of structured values; `string_quote` wraps nested strings
fn render_nested(value: &Value, string_quote: char) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{}{}{}", string_quote, s, string_quote),
        Value::Sequence(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| render_nested(item, string_quote))
                .collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    format!("{}: {}", render_nested(k, '\''), render_nested(v, '\''))
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tagged(tagged) => render_nested(&tagged.value, string_quote),
    }
}
