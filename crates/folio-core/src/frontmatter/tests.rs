use super::encode::needs_quoting;
use super::*;

fn tricky_mapping() -> Frontmatter {
    Frontmatter::new()
        .with("id", "abc-123")
        .with("title", "Meeting: notes for Q3")
        .with("hash", "#not-a-comment")
        .with("quoted", "she said \"hi\" and 'bye'")
        .with("padded", "  leading and trailing  ")
        .with("multiline", "line one\nline two\r\nline\tthree")
        .with("backslash", r"C:\Users\folio")
        .with("tags", vec!["a: b".to_string(), "#c".to_string(), " d ".to_string()])
        .with("empty_tags", Vec::<String>::new())
}

#[test]
fn test_round_trip_tricky_strings() {
    let fm = tricky_mapping();
    let decoded = decode(&encode(&fm));
    assert_eq!(decoded, fm);
}

#[test]
fn test_round_trip_typed_look_alikes_stay_strings() {
    let fm = Frontmatter::new()
        .with("t", "true")
        .with("f", "false")
        .with("n", "null")
        .with("u", "undefined")
        .with("i", "42")
        .with("neg", "-7")
        .with("x", "3.14")
        .with("brackets", "[]")
        .with("empty", "");
    let decoded = decode(&encode(&fm));
    assert_eq!(decoded, fm);
}

#[test]
fn test_round_trip_non_string_scalars() {
    let fm = Frontmatter::new()
        .with("flag", true)
        .with("count", 12i64)
        .with("negative", -3i64)
        .with("ratio", 0.5f64)
        .with("whole", 2.0f64)
        .with("nothing", FrontmatterValue::Null);
    let decoded = decode(&encode(&fm));
    assert_eq!(decoded, fm);
}

#[test]
fn test_round_trip_preserves_key_order() {
    let fm = tricky_mapping();
    let decoded = decode(&encode(&fm));
    assert_eq!(decoded.keys().collect::<Vec<_>>(), fm.keys().collect::<Vec<_>>());
}

#[test]
fn test_encode_layout() {
    let fm = Frontmatter::new()
        .with("id", "1")
        .with("title", "Hello World")
        .with("tags", vec!["a".to_string(), "b".to_string()])
        .with("none", Vec::<String>::new());
    assert_eq!(
        encode(&fm),
        "id: \"1\"\ntitle: Hello World\ntags:\n  - a\n  - b\nnone: []\n"
    );
}

#[test]
fn test_encode_ends_with_newline() {
    let fm = Frontmatter::new().with("title", "x");
    assert!(encode(&fm).ends_with('\n'));
}

#[test]
fn test_encode_escapes() {
    let fm = Frontmatter::new().with("v", "a\"b\\c\nd");
    assert_eq!(encode(&fm), "v: \"a\\\"b\\\\c\\nd\"\n");
}

#[test]
fn test_encode_float_keeps_fraction() {
    let fm = Frontmatter::new().with("v", 3.0f64);
    assert_eq!(encode(&fm), "v: 3.0\n");
    let fm = Frontmatter::new().with("v", f64::NAN);
    assert_eq!(encode(&fm), "v: null\n");
}

#[test]
fn test_absent_values_are_omitted() {
    let mut fm = Frontmatter::new().with("id", "x");
    fm.insert_opt("deletedAt", None::<String>);
    assert_eq!(encode(&fm), "id: x\n");
}

#[test]
fn test_needs_quoting_triggers() {
    for s in ["", "a: b", "#x", " x", "x ", "a\nb", "say \"x\"", "it's", "true", "12", "1.5", "[]", "- x"] {
        assert!(needs_quoting(s), "expected quoting for {:?}", s);
    }
    for s in ["plain", "a:b", "mid # hash", "1.2.3", "v1", "hello world"] {
        assert!(!needs_quoting(s), "unexpected quoting for {:?}", s);
    }
}

#[test]
fn test_decode_types_bare_scalars() {
    let fm = decode("a: true\nb: false\nc: null\nd: undefined\ne: 42\nf: -1.25\ng: hello world\nh: 1.2.3\n");
    assert_eq!(fm.get("a"), Some(&FrontmatterValue::Bool(true)));
    assert_eq!(fm.get("b"), Some(&FrontmatterValue::Bool(false)));
    assert_eq!(fm.get("c"), Some(&FrontmatterValue::Null));
    assert_eq!(fm.get("d"), Some(&FrontmatterValue::Null));
    assert_eq!(fm.get("e"), Some(&FrontmatterValue::Integer(42)));
    assert_eq!(fm.get("f"), Some(&FrontmatterValue::Float(-1.25)));
    assert_eq!(fm.get_str("g"), Some("hello world"));
    assert_eq!(fm.get_str("h"), Some("1.2.3"));
}

#[test]
fn test_decode_quoted_never_coerced() {
    let fm = decode("a: \"true\"\nb: '42'\nc: \"null\"\nd: 'it''s'\n");
    assert_eq!(fm.get_str("a"), Some("true"));
    assert_eq!(fm.get_str("b"), Some("42"));
    assert_eq!(fm.get_str("c"), Some("null"));
    assert_eq!(fm.get_str("d"), Some("it's"));
}

#[test]
fn test_decode_integer_overflow_stays_string() {
    let fm = decode("big: 99999999999999999999\n");
    assert_eq!(fm.get_str("big"), Some("99999999999999999999"));
}

#[test]
fn test_decode_list_accumulates_until_non_item() {
    let fm = decode("tags:\n  - one\n  - \"two: 2\"\n- three\ntitle: After\n");
    assert_eq!(
        fm.get("tags").and_then(FrontmatterValue::as_list),
        Some(&["one".to_string(), "two: 2".to_string(), "three".to_string()][..])
    );
    assert_eq!(fm.get_str("title"), Some("After"));
}

#[test]
fn test_decode_list_items_are_strings() {
    let fm = decode("tags:\n  - 42\n  - true\n");
    assert_eq!(
        fm.get("tags").and_then(FrontmatterValue::as_list),
        Some(&["42".to_string(), "true".to_string()][..])
    );
}

#[test]
fn test_decode_bare_key_without_items_is_null() {
    let fm = decode("tags:\ntitle: x\n");
    assert_eq!(fm.get("tags"), Some(&FrontmatterValue::Null));
}

#[test]
fn test_decode_skips_malformed_lines() {
    let fm = decode("just some text\n: no key\n- orphan item\n# comment\n\ntitle: ok\n");
    assert_eq!(fm.len(), 1);
    assert_eq!(fm.get_str("title"), Some("ok"));
}

#[test]
fn test_decode_duplicate_key_last_wins() {
    let fm = decode("title: first\nid: 1\ntitle: second\n");
    assert_eq!(fm.get_str("title"), Some("second"));
    assert_eq!(fm.keys().collect::<Vec<_>>(), ["title", "id"]);
}

#[test]
fn test_decode_unknown_escape_kept() {
    let fm = decode(r#"path: "a\qb""#);
    assert_eq!(fm.get_str("path"), Some(r"a\qb"));
}
