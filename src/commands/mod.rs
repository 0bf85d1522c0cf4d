//! CLI commands for folio

pub mod backup;
pub mod check;
pub mod clean;
pub mod dispatch;
pub mod estimate;
pub mod format;
pub mod migrate;
pub mod restore;
pub mod test_migration;
pub mod verify;
