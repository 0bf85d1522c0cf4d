use std::fmt::Write as _;

use super::decode::interpret_bare;
use super::{Frontmatter, FrontmatterValue};

/// Characters that a YAML reader treats as indicators at the start of a
/// plain scalar.
const INDICATOR_CHARS: &[char] = &['[', ']', '{', '}', '&', '*', '!', '|', '>', '%', '@', '`', ','];

/// Encode a mapping as a frontmatter block, one entry per line.
///
/// The block ends with a newline unless the mapping is empty.
pub fn encode(fm: &Frontmatter) -> String {
    let mut out = String::new();
    for (key, value) in fm.iter() {
        encode_entry(&mut out, key, value);
    }
    out
}

fn encode_entry(out: &mut String, key: &str, value: &FrontmatterValue) {
    // Writing to a String cannot fail
    let _ = match value {
        FrontmatterValue::String(s) => writeln!(out, "{}: {}", key, scalar(s)),
        FrontmatterValue::Bool(b) => writeln!(out, "{}: {}", key, b),
        FrontmatterValue::Integer(i) => writeln!(out, "{}: {}", key, i),
        FrontmatterValue::Float(f) => writeln!(out, "{}: {}", key, float(*f)),
        FrontmatterValue::Null => writeln!(out, "{}: null", key),
        FrontmatterValue::List(items) if items.is_empty() => writeln!(out, "{}: []", key),
        FrontmatterValue::List(items) => {
            let _ = writeln!(out, "{}:", key);
            for item in items {
                let _ = writeln!(out, "  - {}", scalar(item));
            }
            Ok(())
        }
    };
}

fn float(f: f64) -> String {
    if !f.is_finite() {
        return "null".to_string();
    }
    let mut s = f.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// Render a string bare when that is unambiguous, double-quoted otherwise.
fn scalar(s: &str) -> String {
    if needs_quoting(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

pub(super) fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || s == "[]" {
        return true;
    }
    if s.contains(": ") || s.starts_with('#') || s.trim() != s {
        return true;
    }
    if s.contains(['\n', '\r', '"', '\'']) {
        return true;
    }
    if s.starts_with(INDICATOR_CHARS) || s.starts_with("- ") || s == "-" {
        return true;
    }
    // A bare form that would come back typed (bool, null, number)
    !matches!(interpret_bare(s), FrontmatterValue::String(_))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
