//! Error types and exit codes for folio
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (including an unsuccessful migration)
//! - 2: Usage error (bad flags/args, invalid configuration)
//! - 3: Data error (unparseable document, invalid snapshot, unreadable source)

mod macros;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// Context information for an error occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed when the error occurred
    pub operation: String,
    /// Additional contextual key-value data
    pub metadata: Vec<(String, String)>,
}

impl ErrorContext {
    /// Create a new error context for an operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            metadata: Vec::new(),
        }
    }

    /// Add metadata key-value pair
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "operation": self.operation.clone(),
            "metadata": self
                .metadata
                .iter()
                .map(|(k, v)| serde_json::json!({"key": k, "value": v}))
                .collect::<Vec<_>>(),
        })
    }
}

/// A single entry in an error chain
#[derive(Debug, Clone)]
pub struct ErrorChainEntry {
    /// The error message
    pub message: String,
    /// Error type identifier
    pub error_type: String,
}

/// Exit codes for the folio binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - unparseable document, invalid snapshot (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Stable failure codes surfaced by storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageErrorCode {
    NotSupported,
    PermissionDenied,
    FileNotFound,
    DirectoryNotFound,
    WriteFailed,
    ReadFailed,
    Unknown,
}

impl StorageErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageErrorCode::NotSupported => "not-supported",
            StorageErrorCode::PermissionDenied => "permission-denied",
            StorageErrorCode::FileNotFound => "file-not-found",
            StorageErrorCode::DirectoryNotFound => "directory-not-found",
            StorageErrorCode::WriteFailed => "write-failed",
            StorageErrorCode::ReadFailed => "read-failed",
            StorageErrorCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by a storage backend, tagged with a stable code
/// and the entry it concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}{}: {message}", fmt_target(.target))]
pub struct StorageError {
    pub code: StorageErrorCode,
    pub target: Option<String>,
    pub message: String,
}

impl StorageError {
    pub fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            target: None,
            message: message.into(),
        }
    }

    pub fn with_target(mut self, target: impl fmt::Display) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn not_supported(operation: &str) -> Self {
        Self::new(
            StorageErrorCode::NotSupported,
            format!("{} is not supported by this backend", operation),
        )
    }
}

fn fmt_target(target: &Option<String>) -> String {
    target
        .as_ref()
        .map(|t| format!(" ({})", t))
        .unwrap_or_default()
}

/// Result type for storage backend calls
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during folio operations
#[derive(Error, Debug)]
pub enum FolioError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data errors (exit code 3)
    #[error("cannot parse document {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("cannot read source records from {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("validation found {errors} error(s)")]
    ValidationFailed { errors: usize },

    // Generic failures (exit code 1)
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("{0}")]
    Other(String),

    #[error("migration interrupted; documents written so far were kept")]
    Interrupted,

    /// Chained error with context and cause chain
    #[error("{message}")]
    Chained {
        message: String,
        error_type: String,
        chain: Arc<Vec<ErrorChainEntry>>,
        context: Option<ErrorContext>,
    },
}

impl FolioError {
    /// Create an error for a document that cannot be parsed at all
    pub fn parse(file: impl fmt::Display, reason: impl fmt::Display) -> Self {
        FolioError::Parse {
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl fmt::Display) -> Self {
        FolioError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl fmt::Display) -> Self {
        FolioError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a failed operation
    pub fn failed(operation: &str, error: impl fmt::Display) -> Self {
        FolioError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            FolioError::UnknownFormat(_)
            | FolioError::UsageError(_)
            | FolioError::InvalidValue { .. } => ExitCode::Usage,

            FolioError::Parse { .. }
            | FolioError::InvalidSnapshot { .. }
            | FolioError::SourceUnavailable { .. }
            | FolioError::NotFound { .. }
            | FolioError::ValidationFailed { .. } => ExitCode::Data,

            FolioError::Storage(_)
            | FolioError::Io(_)
            | FolioError::Json(_)
            | FolioError::Toml(_)
            | FolioError::FailedOperation { .. }
            | FolioError::Other(_)
            | FolioError::Interrupted => ExitCode::Failure,

            FolioError::Chained { error_type, .. } => match error_type.as_str() {
                "unknown_format" | "usage_error" | "invalid_value" => ExitCode::Usage,
                "parse_error" | "invalid_snapshot" | "source_unavailable" | "not_found"
                | "validation_failed" => {
                    ExitCode::Data
                }
                _ => ExitCode::Failure,
            },
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> String {
        match self {
            FolioError::UnknownFormat(_) => "unknown_format".to_string(),
            FolioError::UsageError(_) => "usage_error".to_string(),
            FolioError::InvalidValue { .. } => "invalid_value".to_string(),
            FolioError::Parse { .. } => "parse_error".to_string(),
            FolioError::InvalidSnapshot { .. } => "invalid_snapshot".to_string(),
            FolioError::SourceUnavailable { .. } => "source_unavailable".to_string(),
            FolioError::NotFound { .. } => "not_found".to_string(),
            FolioError::ValidationFailed { .. } => "validation_failed".to_string(),
            FolioError::Storage(e) => format!("storage_{}", e.code.as_str().replace('-', "_")),
            FolioError::Io(_) => "io_error".to_string(),
            FolioError::Json(_) => "json_error".to_string(),
            FolioError::Toml(_) => "toml_error".to_string(),
            FolioError::FailedOperation { .. } => "failed_operation".to_string(),
            FolioError::Other(_) => "other".to_string(),
            FolioError::Interrupted => "interrupted".to_string(),
            FolioError::Chained { error_type, .. } => error_type.clone(),
        }
    }

    /// Wrap this error with a higher-level message, keeping the original in
    /// the chain and its type for exit code purposes.
    pub fn chain(self, message: impl Into<String>, context: Option<ErrorContext>) -> Self {
        let error_type = self.error_type();

        let mut chain = match &self {
            FolioError::Chained { chain, .. } => (**chain).clone(),
            _ => Vec::new(),
        };
        chain.push(ErrorChainEntry {
            message: self.to_string(),
            error_type: error_type.clone(),
        });

        FolioError::Chained {
            message: message.into(),
            error_type,
            chain: Arc::new(chain),
            context,
        }
    }

    /// Get the error chain if this is a chained error
    pub fn error_chain(&self) -> Option<&[ErrorChainEntry]> {
        match self {
            FolioError::Chained { chain, .. } => Some(chain.as_ref()),
            _ => None,
        }
    }

    /// Get the error context if available
    pub fn error_context(&self) -> Option<&ErrorContext> {
        match self {
            FolioError::Chained { context, .. } => context.as_ref(),
            _ => None,
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        let mut error_obj = serde_json::json!({
            "code": self.exit_code() as i32,
            "type": self.error_type(),
            "message": self.to_string(),
        });

        if let FolioError::Storage(e) = self {
            error_obj["storage_code"] = serde_json::json!(e.code.as_str());
            if let Some(target) = &e.target {
                error_obj["target"] = serde_json::json!(target);
            }
        }

        if let FolioError::Chained { chain, context, .. } = self {
            let chain_array: Vec<serde_json::Value> = chain
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "type": entry.error_type.clone(),
                        "message": entry.message.clone(),
                    })
                })
                .collect();
            error_obj["chain"] = serde_json::json!(chain_array);

            if let Some(ctx) = context {
                error_obj["context"] = ctx.to_json();
            }
        }

        serde_json::json!({ "error": error_obj })
    }
}

/// Result type alias for folio operations
pub type Result<T> = std::result::Result<T, FolioError>;
