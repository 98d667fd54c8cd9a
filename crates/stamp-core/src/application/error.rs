//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the ports the
//! orchestrator drives, not business logic. Construction errors are
//! `DomainError` from `crate::domain`; a failed scaffold is a
//! `ScaffoldFailure`, which is a value and not an error of this layer.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Output directory already exists and overwriting was not requested.
    #[error("Output already exists at {path}")]
    OutputExists { path: PathBuf },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// In-memory adapter state could not be locked.
    #[error("Adapter state lock poisoned")]
    StoreLockError,

    /// Port/Adapter not configured.
    #[error("Required adapter not configured: {name}")]
    AdapterNotConfigured { name: &'static str },

    /// A template name would write outside the output root.
    #[error("Template name '{name}' is not a safe relative output path")]
    UnsafeOutputPath { name: String },

    /// An input file (parameters, rules, baselines, templates) could not be
    /// read.
    #[error("Failed to load {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    /// An input file was read but its contents are malformed.
    #[error("Failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::OutputExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Use --force to write into it anyway".into(),
                "Choose a different --output directory".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::StoreLockError => vec![
                "An adapter lock was poisoned by an earlier panic".into(),
                "Try again".into(),
            ],
            Self::AdapterNotConfigured { name } => vec![
                format!("Required component not configured: {}", name),
                "This is likely a configuration error".into(),
            ],
            Self::UnsafeOutputPath { name } => vec![
                format!("Rename template '{}'", name),
                "Template names must be relative and must not contain '..'".into(),
            ],
            Self::Load { source_name, .. } => vec![
                format!("Check that {} exists and is readable", source_name),
                "Parameters and rules may be TOML (.toml) or JSON (.json)".into(),
            ],
            Self::Parse { source_name, reason } => vec![
                format!("Fix {}: {}", source_name, reason),
                "Parameters and rules may be TOML (.toml) or JSON (.json)".into(),
            ],
            Self::RollbackFailed { path, .. } => vec![
                format!("Partial output may remain at {}", path.display()),
                "Remove it manually before retrying".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::OutputExists { .. } | Self::UnsafeOutputPath { .. } | Self::Parse { .. } => {
                ErrorCategory::Validation
            }
            Self::Load { .. } => ErrorCategory::NotFound,
            Self::AdapterNotConfigured { .. } => ErrorCategory::Configuration,
            Self::FilesystemError { .. } | Self::RollbackFailed { .. } | Self::StoreLockError => {
                ErrorCategory::Internal
            }
        }
    }
}
