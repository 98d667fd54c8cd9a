// ============================================================================
// domain/error.rs - DOMAIN CONSTRUCTION ERRORS
// ============================================================================

use thiserror::Error;

use super::entities::store::ResolveError;

/// Root domain error type.
///
/// These are errors raised while *building* domain objects (paths, stores,
/// rules, templates). Problems found while validating or rendering are not
/// errors in this sense: they are collected as `Violation`s and
/// `TokenError`s so the caller always sees the complete set.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Construction Errors
    // ========================================================================
    #[error("Invalid parameter path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Unknown value kind '{0}' (expected string, integer, boolean or record)")]
    UnknownValueKind(String),

    #[error("Field '{path}' declared more than once")]
    DuplicateDeclaration { path: String },

    #[error("Unsupported value at '{path}': {found}")]
    UnsupportedValue { path: String, found: String },

    // ========================================================================
    // Store Errors
    // ========================================================================
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPath { path, .. } => vec![
                format!("'{}' is not a valid dotted path", path),
                "Segments use letters, digits and '_', and cannot start with a digit".into(),
                "Example: AndroidApiVersion.b".into(),
            ],
            Self::InvalidRule { rule, reason } => vec![
                format!("Rule '{}' is malformed: {}", rule, reason),
                "Check the rules file".into(),
            ],
            Self::UnsupportedValue { path, .. } => vec![
                format!("Parameter '{}' has an unsupported type", path),
                "Parameters must be strings, integers, booleans or tables".into(),
            ],
            Self::Resolve(ResolveError::PathNotFound { missing, .. }) => vec![
                format!("Add '{}' to the parameters file", missing),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidPath { .. }
            | Self::InvalidRule { .. }
            | Self::InvalidTemplate(_)
            | Self::UnknownValueKind(_)
            | Self::DuplicateDeclaration { .. }
            | Self::UnsupportedValue { .. } => ErrorCategory::Validation,
            Self::Resolve(ResolveError::PathNotFound { .. }) => ErrorCategory::NotFound,
            Self::Resolve(ResolveError::TypeMismatch { .. }) => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
