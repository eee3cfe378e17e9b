//! INI inventory format.
//!
//! Lines are first collected into blocks (`[group]`, `[group:children]`,
//! `[group:vars]`) and then applied to the inventory block kind by block
//! kind, so sections may refer to groups declared further down the file.

use super::{group::UNGROUPED, Inventory, InventoryError, InventoryResult, Vars};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use tracing::{trace, warn};

/// Most host names a single line may expand to
pub const MAX_RANGE_HOSTS: usize = 100_000;

/// Characters separating variables on a host line
const DELIMITERS: [char; 4] = [' ', '\t', '\r', '\x0c'];

/// `key = value` with blanks around the first `=` of the line
static SPACED_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^\s=]*)\s*=\s*(.*)$").expect("Invalid assignment regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Hosts,
    Children,
    Vars,
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    group: String,
    /// Non-empty, non-comment lines with their 1-based line number
    lines: Vec<(usize, String)>,
}

impl Block {
    fn new(kind: BlockKind, group: impl Into<String>) -> Self {
        Self {
            kind,
            group: group.into(),
            lines: Vec::new(),
        }
    }
}

/// Parse INI lines into `inventory`
pub(crate) fn parse_lines<I, S>(inventory: &mut Inventory, lines: I) -> InventoryResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let blocks = collect_blocks(lines)?;

    for block in &blocks {
        inventory.ensure_group(&block.group);
    }

    for block in blocks.iter().filter(|b| b.kind == BlockKind::Hosts) {
        apply_hosts(inventory, block)?;
    }

    for block in blocks.iter().filter(|b| b.kind == BlockKind::Children) {
        apply_children(inventory, block)?;
    }

    for block in blocks.iter().filter(|b| b.kind == BlockKind::Vars) {
        apply_vars(inventory, block)?;
    }

    Ok(())
}

fn collect_blocks<I, S>(lines: I) -> InventoryResult<Vec<Block>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut blocks = Vec::new();
    let mut current = Block::new(BlockKind::Hosts, UNGROUPED);

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line = normalize(raw.as_ref().trim());

        if line.is_empty() || is_comment(&line) {
            continue;
        }

        if line.starts_with('[') {
            let (group, kind) = parse_header(&line, line_no)?;
            trace!(line = line_no, group = %group, ?kind, "section");
            blocks.push(std::mem::replace(&mut current, Block::new(kind, group)));
            continue;
        }

        current.lines.push((line_no, line.into_owned()));
    }

    blocks.push(current);
    Ok(blocks)
}

/// Turn `foo = bar` into `foo=bar`
fn normalize(line: &str) -> Cow<'_, str> {
    SPACED_ASSIGNMENT.replace(line, "$1=$2")
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with(';')
}

fn parse_header(line: &str, line_no: usize) -> InventoryResult<(String, BlockKind)> {
    let inner = &line[1..];
    let end = inner.find(']').ok_or_else(|| InventoryError::InvalidIniFormat {
        line: line_no,
        message: format!("unterminated section header '{}'", line),
    })?;
    let section = inner[..end].trim();

    let (name, kind) = match section.rsplit_once(':') {
        Some((name, "vars")) => (name, BlockKind::Vars),
        Some((name, "children")) => (name, BlockKind::Children),
        Some((_, suffix)) => {
            return Err(InventoryError::InvalidIniFormat {
                line: line_no,
                message: format!("unknown section type '{}'", suffix),
            })
        }
        None => (section, BlockKind::Hosts),
    };

    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(InventoryError::InvalidIniFormat {
            line: line_no,
            message: format!("invalid group name in '{}'", line),
        });
    }

    Ok((name.to_string(), kind))
}

fn apply_hosts(inventory: &mut Inventory, block: &Block) -> InventoryResult<()> {
    for (line_no, line) in &block.lines {
        let (pattern, rest) = match line.split_once([' ', '\t']) {
            Some((name, rest)) => (name, rest),
            None => (line.as_str(), ""),
        };

        let mut vars = Vars::new();
        for token in split_variables(rest) {
            let (key, value) = parse_assignment(&token, *line_no)?;
            vars.insert(key, serde_yaml::Value::String(value));
        }

        for host_name in expand_host_range(pattern)? {
            inventory.attach_host(&host_name, &block.group, &vars);
        }
    }
    Ok(())
}

fn apply_children(inventory: &mut Inventory, block: &Block) -> InventoryResult<()> {
    for (line_no, child) in &block.lines {
        let child = child.trim();
        if inventory.get_group(child).is_none() {
            warn!(
                line = line_no,
                parent = %block.group,
                child = %child,
                "skipping unknown child group"
            );
            continue;
        }
        inventory.add_child(&block.group, child)?;
    }
    Ok(())
}

fn apply_vars(inventory: &mut Inventory, block: &Block) -> InventoryResult<()> {
    let group = inventory.ensure_group(&block.group);
    for (line_no, line) in &block.lines {
        let (key, value) = parse_assignment(line, *line_no)?;
        group.set_var(key, serde_yaml::Value::String(value));
    }
    Ok(())
}

/// Split `key=value` at the first `=` and undo backslash escaping
fn parse_assignment(token: &str, line_no: usize) -> InventoryResult<(String, String)> {
    let (key, value) = token
        .split_once('=')
        .ok_or_else(|| InventoryError::InvalidIniFormat {
            line: line_no,
            message: format!("expected key=value, found '{}'", token),
        })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(InventoryError::InvalidIniFormat {
            line: line_no,
            message: format!("missing variable name in '{}'", token),
        });
    }

    Ok((key.to_string(), value.replace("\\\\", "\\")))
}

fn is_delimiter(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if DELIMITERS.contains(&c))
}

/// Break `input` into words and single delimiter characters
fn tokenize(input: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;

    for (i, ch) in input.char_indices() {
        if DELIMITERS.contains(&ch) {
            if start < i {
                tokens.push(&input[start..i]);
            }
            let end = i + ch.len_utf8();
            tokens.push(&input[i..end]);
            start = end;
        }
    }

    if start < input.len() {
        tokens.push(&input[start..]);
    }
    tokens
}

/// Quote character of a `key="value` token whose value is not closed yet
fn open_quote(token: &str) -> Option<char> {
    let (_, value) = token.split_once('=')?;
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let closed = value.len() >= 2 && value.ends_with(quote);
    (!closed).then_some(quote)
}

/// Split the variable part of a host line into `key=value` tokens.
///
/// Quoted values may contain blanks: `a="x y" b=1` yields `a="x y"` and
/// `b=1`. The quotes stay part of the value. An unterminated quote runs to
/// the end of the line.
pub fn split_variables(vars: &str) -> Vec<String> {
    let tokens = tokenize(vars);
    let mut variables = Vec::new();
    let mut pending: Option<(String, char)> = None;

    for (i, token) in tokens.iter().enumerate() {
        let is_last = i + 1 == tokens.len();

        if let Some((mut buf, quote)) = pending.take() {
            buf.push_str(token);
            if is_last || (!is_delimiter(token) && token.ends_with(quote)) {
                variables.push(buf);
            } else {
                pending = Some((buf, quote));
            }
            continue;
        }

        if is_delimiter(token) {
            continue;
        }

        match open_quote(token) {
            Some(quote) if !is_last => pending = Some((token.to_string(), quote)),
            _ => variables.push(token.to_string()),
        }
    }

    variables
}

/// Expand `web[01:03].example.com` into one name per value.
///
/// Numeric bounds keep the zero padding of the start value; alphabetic
/// bounds must be single letters. An optional third field is the step.
/// Names without a `[a:b]` part are returned unchanged.
pub fn expand_host_range(pattern: &str) -> InventoryResult<Vec<String>> {
    let Some(open) = pattern.find('[') else {
        return Ok(vec![pattern.to_string()]);
    };
    let Some(close) = pattern[open..].find(']').map(|c| open + c) else {
        return Ok(vec![pattern.to_string()]);
    };

    let spec = &pattern[open + 1..close];
    if !spec.contains(':') {
        return Ok(vec![pattern.to_string()]);
    }

    let invalid = || InventoryError::InvalidHostRange(pattern.to_string());
    let prefix = &pattern[..open];
    let suffixes = expand_host_range(&pattern[close + 1..])?;

    let parts: Vec<&str> = spec.split(':').collect();
    let (start, end, step) = match parts.as_slice() {
        [start, end] => (*start, *end, 1usize),
        [start, end, step] => (*start, *end, step.parse::<usize>().map_err(|_| invalid())?),
        _ => return Err(invalid()),
    };
    if step == 0 {
        return Err(invalid());
    }

    let values: Vec<String> = if let (Ok(a), Ok(b)) = (start.parse::<u64>(), end.parse::<u64>()) {
        if a > b || (b - a) / step as u64 >= MAX_RANGE_HOSTS as u64 {
            return Err(invalid());
        }
        let width = if start.len() > 1 && start.starts_with('0') {
            start.len()
        } else {
            0
        };
        (a..=b)
            .step_by(step)
            .map(|n| format!("{:0width$}", n, width = width))
            .collect()
    } else {
        let mut a_chars = start.chars();
        let mut b_chars = end.chars();
        match (a_chars.next(), a_chars.next(), b_chars.next(), b_chars.next()) {
            (Some(a), None, Some(b), None)
                if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() && a <= b =>
            {
                (a..=b).step_by(step).map(String::from).collect()
            }
            _ => return Err(invalid()),
        }
    };

    let total = values
        .len()
        .checked_mul(suffixes.len())
        .filter(|n| *n <= MAX_RANGE_HOSTS)
        .ok_or_else(invalid)?;

    let mut names = Vec::with_capacity(total);
    for value in &values {
        for suffix in &suffixes {
            names.push(format!("{}{}{}", prefix, value, suffix));
        }
    }
    Ok(names)
}
