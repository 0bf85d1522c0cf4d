//! Folio Core Library
//!
//! Core domain logic for folio: the frontmatter codec, record cleaning,
//! document conversion, backups and the staged migration pipeline.

pub mod backup;
pub mod clean;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod frontmatter;
pub mod logging;
pub mod migration;
pub mod record;
pub mod source;
pub mod storage;
pub mod validate;
