//! Unified error handling for Stamp Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::{ApplicationError, ScaffoldFailure};
use crate::domain::DomainError;

/// Root error type for Stamp Core operations.
///
/// This enum wraps all possible errors that can occur when using stamp-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StampError {
    /// Errors from the domain layer (malformed paths, rules, stores).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and port failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// A scaffold that failed validation or rendering.
    #[error("Scaffold failed: {0}")]
    Scaffold(#[from] ScaffoldFailure),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl StampError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Scaffold(ScaffoldFailure::DuplicateTemplates { .. }) => vec![
                "Each template needs a unique name".into(),
                "Rename or remove the duplicates listed above".into(),
            ],
            Self::Scaffold(ScaffoldFailure::Validation { .. }) => vec![
                "Fix the parameter values listed above".into(),
                "Run: stamp check --params <FILE> to validate without rendering".into(),
            ],
            Self::Scaffold(ScaffoldFailure::Render { .. }) => vec![
                "Add the missing parameters or fix the tokens listed above".into(),
                "Run: stamp scan to list every token a template uses".into(),
            ],
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Scaffold(_) => ErrorCategory::Validation,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }

    /// The scaffold failure, if this error is one.
    pub fn as_scaffold_failure(&self) -> Option<&ScaffoldFailure> {
        match self {
            Self::Scaffold(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type StampResult<T> = Result<T, StampError>;
