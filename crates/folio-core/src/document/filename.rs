use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

/// Longest slug kept before the `.md` extension
pub const MAX_SLUG_CHARS: usize = 100;

static DISALLOWED_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static HYPHENS_RE: OnceLock<Regex> = OnceLock::new();

fn disallowed_re() -> &'static Regex {
    DISALLOWED_RE.get_or_init(|| Regex::new(r"[^a-z0-9\s-]").expect("valid slug pattern"))
}

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

fn hyphens_re() -> &'static Regex {
    HYPHENS_RE.get_or_init(|| Regex::new(r"-+").expect("valid hyphen pattern"))
}

/// Derive a document file name from a record title.
///
/// Characters outside `a-z`, `0-9`, whitespace and `-` are removed rather
/// than transliterated, so `"Título"` becomes `"ttulo"`. A title with nothing
/// left falls back to `record-<epoch millis>.md`.
pub fn generate_file_name(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("record-{}.md", Utc::now().timestamp_millis())
    } else {
        format!("{}.md", slug)
    }
}

fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = disallowed_re().replace_all(&lower, "");
    let hyphenated = whitespace_re().replace_all(&kept, "-");
    let collapsed = hyphens_re().replace_all(&hyphenated, "-");

    let truncated: String = collapsed
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_CHARS)
        .collect();
    truncated.trim_matches('-').to_string()
}

/// Name for the `n`th document of a run that slugged to `file_name`
/// (`n` starts at 2).
pub fn disambiguate(file_name: &str, n: usize) -> String {
    match file_name.strip_suffix(".md") {
        Some(stem) => format!("{}-{}.md", stem, n),
        None => format!("{}-{}", file_name, n),
    }
}
