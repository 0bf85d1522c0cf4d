use folio_core::backup::SnapshotKind;
use folio_core::format::OutputFormat;

/// Parse output format from string
pub fn parse_output_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}

/// Parse snapshot kind from string
pub fn parse_snapshot_kind(s: &str) -> std::result::Result<SnapshotKind, String> {
    s.parse::<SnapshotKind>().map_err(|e| e.to_string())
}
