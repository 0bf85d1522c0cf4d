//! Configuration for folio
//!
//! Read from an explicit path, or from `config.toml` in the folio config
//! directory (`$FOLIO_CONFIG_DIR`, else the platform config dir). A missing
//! file means defaults.

pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use crate::bail_invalid;
use crate::error::{FolioError, Result};

pub use types::{BackupConfig, FolioConfig, MigrationConfig, ValidationConfig};

const CONFIG_DIR: &str = "folio";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "FOLIO_CONFIG_DIR";

impl FolioConfig {
    /// Location of the global configuration file
    pub fn global_path() -> Result<PathBuf> {
        let config_dir = if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            PathBuf::from(env_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| {
                    FolioError::Other("unable to determine config directory".to_string())
                })?
                .join(CONFIG_DIR)
        };

        Ok(config_dir.join(CONFIG_FILE))
    }

    /// Load configuration, preferring an explicit path over the global file.
    ///
    /// An explicit path must exist; the global file may be absent.
    #[tracing::instrument]
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(FolioError::not_found("config file", path.display()));
            }
            return Self::load(path);
        }

        let path = Self::global_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FolioError::Other(format!(
                "failed to read config from {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: FolioConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let m = &self.migration;
        if m.notes_dir.trim().is_empty() {
            bail_invalid!("migration.notes_dir", "(empty)");
        }
        if m.trash_dir.trim().is_empty() {
            bail_invalid!("migration.trash_dir", "(empty)");
        }
        if m.notes_dir == m.trash_dir {
            bail_invalid!(
                "migration.trash_dir",
                format!("{} (must differ from notes_dir)", m.trash_dir)
            );
        }

        let v = &self.validation;
        if v.timestamp_tolerance_ms < 0 {
            bail_invalid!("validation.timestamp_tolerance_ms", v.timestamp_tolerance_ms);
        }
        for (name, ratio) in [
            ("validation.error_ratio", v.error_ratio),
            ("validation.warning_ratio", v.warning_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                bail_invalid!(name, ratio);
            }
        }
        if v.warning_ratio > v.error_ratio {
            bail_invalid!(
                "validation.warning_ratio",
                format!("{} (greater than error_ratio {})", v.warning_ratio, v.error_ratio)
            );
        }

        if self.backup.directory.trim().is_empty() {
            bail_invalid!("backup.directory", "(empty)");
        }
        Ok(())
    }
}
