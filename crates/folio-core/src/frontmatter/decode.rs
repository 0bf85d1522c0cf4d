use std::sync::OnceLock;

use regex::Regex;

use super::{Frontmatter, FrontmatterValue};

static INTEGER_RE: OnceLock<Regex> = OnceLock::new();
static FLOAT_RE: OnceLock<Regex> = OnceLock::new();

fn integer_re() -> &'static Regex {
    INTEGER_RE.get_or_init(|| Regex::new(r"^-?\d+$").expect("valid integer pattern"))
}

fn float_re() -> &'static Regex {
    FLOAT_RE.get_or_init(|| Regex::new(r"^-?\d+\.\d+$").expect("valid float pattern"))
}

/// Decode a frontmatter block (without the `---` delimiters).
///
/// Never fails: lines that fit none of the grammar's shapes are skipped.
pub fn decode(text: &str) -> Frontmatter {
    let mut fm = Frontmatter::new();
    let mut open_list: Option<(String, Vec<String>)> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();

        if let Some(item) = list_item(trimmed) {
            match open_list.as_mut() {
                Some((_, items)) => items.push(parse_item(item)),
                None => tracing::debug!(line, "list item without a list key, skipped"),
            }
            continue;
        }

        if let Some((key, items)) = open_list.take() {
            close_list(&mut fm, key, items);
        }

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, rest)) = line.split_once(':') else {
            tracing::debug!(line, "not a key-value line, skipped");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            tracing::debug!(line, "empty key, skipped");
            continue;
        }

        match rest.trim() {
            "" => open_list = Some((key.to_string(), Vec::new())),
            "[]" => fm.insert(key, FrontmatterValue::List(Vec::new())),
            value => fm.insert(key, parse_scalar(value)),
        }
    }

    if let Some((key, items)) = open_list.take() {
        close_list(&mut fm, key, items);
    }

    fm
}

fn close_list(fm: &mut Frontmatter, key: String, items: Vec<String>) {
    // `key:` followed by no items is YAML null, not an empty list
    let value = if items.is_empty() {
        FrontmatterValue::Null
    } else {
        FrontmatterValue::List(items)
    };
    fm.insert(key, value);
}

fn list_item(trimmed: &str) -> Option<&str> {
    if trimmed == "-" {
        Some("")
    } else {
        trimmed.strip_prefix("- ")
    }
}

/// List items are always strings; only quoting is undone.
fn parse_item(item: &str) -> String {
    let item = item.trim();
    match unquote(item) {
        Some(s) => s,
        None => item.to_string(),
    }
}

fn parse_scalar(value: &str) -> FrontmatterValue {
    match unquote(value) {
        Some(s) => FrontmatterValue::String(s),
        None => interpret_bare(value),
    }
}

/// Strip and un-escape a quoted scalar; `None` when the value is bare.
fn unquote(value: &str) -> Option<String> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return Some(unescape_double(&value[1..value.len() - 1]));
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return Some(value[1..value.len() - 1].replace("''", "'"));
    }
    None
}

fn unescape_double(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Type a bare scalar the way the decoder reads it.
pub(super) fn interpret_bare(value: &str) -> FrontmatterValue {
    match value {
        "true" => return FrontmatterValue::Bool(true),
        "false" => return FrontmatterValue::Bool(false),
        "null" | "undefined" => return FrontmatterValue::Null,
        _ => {}
    }

    if integer_re().is_match(value) {
        if let Ok(i) = value.parse::<i64>() {
            return FrontmatterValue::Integer(i);
        }
    } else if float_re().is_match(value) {
        if let Ok(f) = value.parse::<f64>() {
            return FrontmatterValue::Float(f);
        }
    }

    FrontmatterValue::String(value.to_string())
}
