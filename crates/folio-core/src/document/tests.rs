use super::*;
use chrono::{TimeZone, Utc};

fn sample() -> Record {
    let t1 = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let t2 = Utc.timestamp_millis_opt(1_700_000_360_456).unwrap();
    Record::new("1", "Hello World", "some body text")
        .with_tags(["a", "b"])
        .with_timestamps(t1, t2)
}

#[test]
fn test_document_round_trip() {
    let converter = DocumentConverter::default();
    let original = sample();

    let parsed = converter.from_document(&converter.to_document(&original)).unwrap();
    assert_eq!(parsed.id, "1");
    assert_eq!(parsed.title, "Hello World");
    let mut tags = parsed.tags.clone();
    tags.sort();
    assert_eq!(tags, ["a", "b"]);
    assert!(!parsed.is_deleted);
    assert_eq!(parsed.content, "some body text");
    assert_eq!(parsed.created_at, original.created_at);
    assert_eq!(parsed.updated_at, original.updated_at);
}

#[test]
fn test_document_layout() {
    let text = DocumentConverter::default().to_document(&sample());
    assert_eq!(
        text,
        "---\n\
         id: \"1\"\n\
         title: Hello World\n\
         tags:\n  - a\n  - b\n\
         created: 2023-11-14T22:13:20.123Z\n\
         updated: 2023-11-14T22:19:20.456Z\n\
         ---\n\n\
         # Hello World\n\nsome body text"
    );
}

#[test]
fn test_deleted_record_keys() {
    let converter = DocumentConverter::default();
    let at = Utc.timestamp_millis_opt(1_700_000_500_000).unwrap();
    let record = sample().deleted(at);

    let text = converter.to_document(&record);
    assert!(text.contains("isDeleted: true\n"));
    assert!(text.contains("deletedAt: 2023-11-14T22:21:40.000Z\n"));

    let parsed = converter.from_document(&text).unwrap();
    assert!(parsed.is_deleted);
    assert_eq!(parsed.deleted_at, Some(at));
}

#[test]
fn test_active_record_omits_deletion_keys() {
    let text = DocumentConverter::default().to_document(&sample());
    assert!(!text.contains("isDeleted"));
    assert!(!text.contains("deletedAt"));
}

#[test]
fn test_heading_only_first_exact_line_stripped() {
    let converter = DocumentConverter::default();
    let mut record = sample();
    record.content = "# Hello World\nExtra # Hello World line".to_string();

    let text = converter.to_document(&record);
    assert_eq!(text.matches("# Hello World\n").count(), 1);

    let parsed = converter.from_document(&text).unwrap();
    assert_eq!(parsed.content, "Extra # Hello World line");
}

#[test]
fn test_near_miss_heading_is_kept() {
    assert_eq!(strip_title_heading("# Hello Worlds\nbody", "Hello World"), None);
    assert_eq!(strip_title_heading("## Hello World\nbody", "Hello World"), None);
    assert_eq!(strip_title_heading("text\n# Hello World\n", "Hello World"), None);
    assert_eq!(strip_title_heading("# Hello World", "Hello World"), Some(""));
    assert_eq!(
        strip_title_heading("# Hello World\n\n\nkept blank", "Hello World"),
        Some("\nkept blank")
    );
}

#[test]
fn test_content_with_different_heading_round_trips() {
    let converter = DocumentConverter::default();
    let mut record = sample();
    record.content = "# Hello Worldly\nbody".to_string();

    let parsed = converter.from_document(&converter.to_document(&record)).unwrap();
    assert_eq!(parsed.content, "# Hello Worldly\nbody");
}

#[test]
fn test_empty_content_body_is_heading() {
    let converter = DocumentConverter::default();
    let mut record = sample();
    record.content.clear();

    let text = converter.to_document(&record);
    assert!(text.ends_with("---\n\n# Hello World\n"));
    assert_eq!(converter.from_document(&text).unwrap().content, "");
}

#[test]
fn test_missing_delimiters_is_parse_error() {
    let converter = DocumentConverter::default();
    let err = converter
        .parse_document("note.md", "# Just markdown\n")
        .unwrap_err();
    assert!(matches!(err, FolioError::Parse { ref file, .. } if file == "note.md"));
    assert!(converter.from_document("---\nid: 1\nno closing\n").is_err());
}

#[test]
fn test_bad_fields_are_defaulted_not_fatal() {
    let text = "---\nid: 42\ntitle: true\ntags: nope\ncreated: someday\nupdated: 2024-01-01\n---\n\nbody";
    let parsed = DocumentConverter::default()
        .parse_document("odd.md", text)
        .unwrap();
    assert_eq!(parsed.record.id, "42");
    assert_eq!(parsed.record.title, "true");
    assert!(parsed.record.tags.is_empty());
    assert_eq!(parsed.record.content, "body");
    assert!(!parsed.fixes.is_empty());
}

#[test]
fn test_split_document_shapes() {
    assert_eq!(split_document("---\n---\n\nbody"), Some(("", "body")));
    assert_eq!(split_document("---\na: 1\n---"), Some(("a: 1\n", "")));
    assert_eq!(split_document("---\na: 1\n---\nbody"), Some(("a: 1\n", "body")));
    assert_eq!(split_document("no frontmatter"), None);
}

#[test]
fn test_validate_document_format() {
    let converter = DocumentConverter::default();
    let good = converter.to_document(&sample());
    assert!(converter.validate_document_format(&good).is_valid);

    let missing_title = "---\nid: x\ncreated: 2024-01-01\nupdated: 2024-01-01\n---\n\n";
    let check = converter.validate_document_format(missing_title);
    assert!(!check.is_valid);
    assert_eq!(check.error.as_deref(), Some("missing required field: title"));

    let bad_date = "---\nid: x\ntitle: T\ncreated: soon\nupdated: 2024-01-01\n---\n\n";
    let check = converter.validate_document_format(bad_date);
    assert_eq!(check.error.as_deref(), Some("created is not a valid date"));

    assert!(!converter.validate_document_format("plain text").is_valid);
}

#[test]
fn test_round_trip_at_the_last_representable_year() {
    let converter = DocumentConverter::default();
    let raw = serde_json::json!({
        "id": "far",
        "title": "Far future",
        "createdAt": 253_402_300_799_999i64,
        "updatedAt": 253_402_300_800_000i64,
    });
    let record = RecordCleaner::new().clean(&raw).record;

    let text = converter.to_document(&record);
    assert!(text.contains("created: 9999-12-31T23:59:59.999Z\n"));
    let parsed = converter.from_document(&text).unwrap();
    assert_eq!(parsed.created_at, record.created_at);
    assert_eq!(parsed.updated_at, record.updated_at);
}

#[test]
fn test_format_check_accepts_epoch_millis_like_parsing() {
    let converter = DocumentConverter::default();
    let text = "---\nid: e1\ntitle: Epoch\ncreated: 1700000000000\nupdated: 1700000000456\n---\n\nbody";

    let check = converter.validate_document_format(text);
    assert!(check.is_valid, "{:?}", check.error);
    let record = converter.from_document(text).unwrap();
    assert_eq!(record.created_at, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());

    let far = text.replace("1700000000000", "253402300800000");
    let check = converter.validate_document_format(&far);
    assert_eq!(check.error.as_deref(), Some("created is not a valid date"));
}
