//! Host pattern matching.
//!
//! Supported patterns:
//! - `all` or `*` - all hosts
//! - `hostname` - specific host
//! - `groupname` - all hosts in the group and its descendants
//! - `~regex` - regex match on host names
//! - `web*`, `db?`, `app[12]` - globs over host and group names
//! - `a:b` or `a,b` - union
//! - `a:&b` - intersection
//! - `a:!b` - exclusion
//!
//! Unions are applied first, then intersections, then exclusions. A pattern
//! that starts with `&` or `!` is applied to `all`.

use super::{group::ALL, Host, Inventory, InventoryError, InventoryResult};
use regex::Regex;
use std::collections::HashSet;
use tracing::trace;

impl Inventory {
    /// Resolve a host pattern to hosts, in inventory order
    pub fn get_hosts(&self, pattern: &str) -> InventoryResult<Vec<&Host>> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(Vec::new());
        }

        let parts: Vec<&str> = split_pattern(pattern)
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let mut included: HashSet<&str> = HashSet::new();
        let mut intersections = Vec::new();
        let mut exclusions = Vec::new();

        for part in &parts {
            if let Some(rest) = part.strip_prefix('&') {
                intersections.push(rest);
            } else if let Some(rest) = part.strip_prefix('!') {
                exclusions.push(rest);
            } else {
                included.extend(self.match_single(part)?);
            }
        }

        if parts.first().is_some_and(|p| p.starts_with(['&', '!'])) {
            included.extend(self.hosts.keys().map(String::as_str));
        }

        for part in intersections {
            let matched = self.match_single(part)?;
            included.retain(|name| matched.contains(name));
        }

        for part in exclusions {
            for name in self.match_single(part)? {
                included.remove(name);
            }
        }

        trace!(pattern, matched = included.len(), "resolved host pattern");

        Ok(self
            .hosts
            .values()
            .filter(|h| included.contains(h.name.as_str()))
            .collect())
    }

    /// Host names matched by one pattern element
    fn match_single(&self, pattern: &str) -> InventoryResult<HashSet<&str>> {
        if pattern == ALL || pattern == "*" {
            return Ok(self.hosts.keys().map(String::as_str).collect());
        }

        if let Some(expr) = pattern.strip_prefix('~') {
            let regex = Regex::new(expr)
                .map_err(|e| InventoryError::InvalidPattern(format!("{}: {}", pattern, e)))?;
            let matched: HashSet<&str> = self
                .hosts
                .keys()
                .map(String::as_str)
                .filter(|name| regex.is_match(name))
                .collect();
            return non_empty(matched, pattern);
        }

        if let Some(group) = self.groups.get(pattern) {
            return Ok(self
                .collect_group_hosts(group)
                .into_iter()
                .map(|h| h.name.as_str())
                .collect());
        }

        if let Some((name, _)) = self.hosts.get_key_value(pattern) {
            return Ok(HashSet::from([name.as_str()]));
        }

        if pattern.contains(['*', '?', '[']) {
            let regex = Regex::new(&glob_to_regex(pattern))
                .map_err(|e| InventoryError::InvalidPattern(format!("{}: {}", pattern, e)))?;

            let mut matched: HashSet<&str> = self
                .hosts
                .keys()
                .map(String::as_str)
                .filter(|name| regex.is_match(name))
                .collect();
            for group in self.groups.values().filter(|g| regex.is_match(&g.name)) {
                matched.extend(self.collect_group_hosts(group).into_iter().map(|h| h.name.as_str()));
            }
            return non_empty(matched, pattern);
        }

        Err(InventoryError::InvalidPattern(format!(
            "No hosts matched pattern: {}",
            pattern
        )))
    }
}

fn non_empty<'a>(matched: HashSet<&'a str>, pattern: &str) -> InventoryResult<HashSet<&'a str>> {
    if matched.is_empty() {
        Err(InventoryError::InvalidPattern(format!(
            "No hosts matched pattern: {}",
            pattern
        )))
    } else {
        Ok(matched)
    }
}

/// Split pattern by `:` or `,` but not inside brackets
fn split_pattern(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut bracket_depth: usize = 0;

    for (i, ch) in pattern.char_indices() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            ':' | ',' if bracket_depth == 0 => {
                parts.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.push(&pattern[start..]);
    parts
}

/// Convert a glob pattern to an anchored regex
fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::from("^");
    let mut in_class = false;

    for ch in pattern.chars() {
        match ch {
            '[' if !in_class => {
                in_class = true;
                regex.push('[');
            }
            ']' if in_class => {
                in_class = false;
                regex.push(']');
            }
            '!' if in_class && regex.ends_with('[') => regex.push('^'),
            '*' if !in_class => regex.push_str(".*"),
            '?' if !in_class => regex.push('.'),
            '(' | ')' | '{' | '}' | '.' | '+' | '^' | '$' | '|' | '\\' => {
                regex.push('\\');
                regex.push(ch);
            }
            _ => regex.push(ch),
        }
    }

    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Inventory {
        Inventory::from_ini(
            r#"
localhost

[webservers]
web1
web2
web3

[databases]
db1
db2

[staging]
web3
db2

[production:children]
webservers
databases
"#,
        )
        .unwrap()
    }

    fn names(hosts: Vec<&Host>) -> Vec<&str> {
        hosts.into_iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_all_and_star() {
        let inv = sample();
        assert_eq!(inv.get_hosts("all").unwrap().len(), 6);
        assert_eq!(inv.get_hosts("*").unwrap().len(), 6);
        assert!(inv.get_hosts("  ").unwrap().is_empty());
    }

    #[test]
    fn test_group_and_host() {
        let inv = sample();
        assert_eq!(names(inv.get_hosts("databases").unwrap()), vec!["db1", "db2"]);
        assert_eq!(names(inv.get_hosts("web2").unwrap()), vec!["web2"]);
        assert_eq!(inv.get_hosts("production").unwrap().len(), 5);
        assert_eq!(names(inv.get_hosts("ungrouped").unwrap()), vec!["localhost"]);
    }

    #[test]
    fn test_union_keeps_inventory_order() {
        let inv = sample();
        assert_eq!(
            names(inv.get_hosts("databases:web1").unwrap()),
            vec!["web1", "db1", "db2"]
        );
        assert_eq!(
            names(inv.get_hosts("db2,localhost").unwrap()),
            vec!["localhost", "db2"]
        );
    }

    #[test]
    fn test_intersection_and_exclusion() {
        let inv = sample();
        assert_eq!(names(inv.get_hosts("webservers:&staging").unwrap()), vec!["web3"]);
        assert_eq!(
            names(inv.get_hosts("production:!staging").unwrap()),
            vec!["web1", "web2", "db1"]
        );
        assert_eq!(
            names(inv.get_hosts("!production").unwrap()),
            vec!["localhost"]
        );
    }

    #[test]
    fn test_regex_and_glob() {
        let inv = sample();
        assert_eq!(names(inv.get_hosts("~^db\\d$").unwrap()), vec!["db1", "db2"]);
        assert_eq!(names(inv.get_hosts("web*").unwrap()), vec!["web1", "web2", "web3"]);
        assert_eq!(names(inv.get_hosts("web[13]").unwrap()), vec!["web1", "web3"]);
        assert_eq!(names(inv.get_hosts("db?").unwrap()), vec!["db1", "db2"]);
        assert_eq!(inv.get_hosts("prod*").unwrap().len(), 5);
    }

    #[test]
    fn test_no_match_is_error() {
        let inv = sample();
        assert!(matches!(
            inv.get_hosts("nothing"),
            Err(InventoryError::InvalidPattern(_))
        ));
        assert!(inv.get_hosts("zz*").is_err());
        assert!(inv.get_hosts("~(").is_err());
    }

    #[test]
    fn test_split_pattern_respects_brackets() {
        assert_eq!(split_pattern("a:b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_pattern("web[1:3]:db"), vec!["web[1:3]", "db"]);
    }

    #[test]
    fn test_glob_to_regex() {
        assert_eq!(glob_to_regex("web*.example.com"), "^web.*\\.example\\.com$");
        assert_eq!(glob_to_regex("db[!3]"), "^db[^3]$");
    }
}
