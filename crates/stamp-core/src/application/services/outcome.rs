//! Result of one `materialize` call, and its flattened diagnostics.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    ParamPath, RenderFailure, RenderedTemplate, ScanError, Span, TemplateName, TokenError,
    Violation, ViolationKind,
};

/// Every rendered file from one store across all templates, in template
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scaffold {
    pub files: Vec<RenderedTemplate>,
}

impl Scaffold {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.name.as_str() == name)
            .map(|f| f.body.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedTemplate> {
        self.files.iter()
    }
}

/// Why a scaffold produced no output. Each variant carries the complete
/// set of problems found at the stage that stopped it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScaffoldFailure {
    #[error("duplicate template names: {}", join(.names))]
    DuplicateTemplates { names: Vec<TemplateName> },

    #[error("validation failed with {} violation(s)", .violations.len())]
    Validation { violations: Vec<Violation> },

    #[error("{} template(s) failed to render", .failures.len())]
    Render { failures: Vec<RenderFailure> },
}

fn join(names: &[TemplateName]) -> String {
    names
        .iter()
        .map(TemplateName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Ok` with every file, or `Err` with every problem. Never partial.
pub type Outcome = Result<Scaffold, ScaffoldFailure>;

impl ScaffoldFailure {
    /// Flatten into one record per problem, in report order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::DuplicateTemplates { names } => names
                .iter()
                .map(|name| Diagnostic {
                    kind: DiagnosticKind::DuplicateTemplate,
                    template: Some(name.clone()),
                    location: Location::Template,
                    message: format!("template '{name}' shares its output path with another template"),
                })
                .collect(),
            Self::Validation { violations } => violations.iter().map(Diagnostic::from).collect(),
            Self::Render { failures } => failures
                .iter()
                .flat_map(|failure| {
                    failure
                        .errors
                        .iter()
                        .map(|error| Diagnostic::from_token_error(&failure.name, error))
                })
                .collect(),
        }
    }

    /// Number of individual problems.
    pub fn count(&self) -> usize {
        match self {
            Self::DuplicateTemplates { names } => names.len(),
            Self::Validation { violations } => violations.len(),
            Self::Render { failures } => failures.iter().map(|f| f.errors.len()).sum(),
        }
    }
}

/// What went wrong, across every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    DuplicateTemplate,
    ScanError,
    UnresolvedToken,
    MissingRequiredField,
    TypeMismatch,
    RangeViolation,
    OrderingViolation,
    MonotonicViolation,
    FormatViolation,
}

impl From<ViolationKind> for DiagnosticKind {
    fn from(kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::MissingRequiredField => Self::MissingRequiredField,
            ViolationKind::TypeMismatch => Self::TypeMismatch,
            ViolationKind::RangeViolation => Self::RangeViolation,
            ViolationKind::OrderingViolation => Self::OrderingViolation,
            ViolationKind::MonotonicViolation => Self::MonotonicViolation,
            ViolationKind::FormatViolation => Self::FormatViolation,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// A parameter path (validation).
    Path(ParamPath),
    /// A byte range in a template body (scan errors).
    Span(Span),
    /// A token: its path and where it sits.
    Token { path: ParamPath, span: Span },
    /// The template as a whole.
    Template,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{path}"),
            Self::Span(span) => write!(f, "bytes {span}"),
            Self::Token { path, span } => write!(f, "{path} @ bytes {span}"),
            Self::Template => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateName>,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    fn from_token_error(template: &TemplateName, error: &TokenError) -> Self {
        let (kind, location) = match error {
            TokenError::Scan(scan) => (DiagnosticKind::ScanError, Location::Span(scan.span())),
            TokenError::Unresolved { path, span, .. } => (
                DiagnosticKind::UnresolvedToken,
                Location::Token {
                    path: path.clone(),
                    span: *span,
                },
            ),
        };
        Self {
            kind,
            template: Some(template.clone()),
            location,
            message: error.to_string(),
        }
    }

    /// A scan error found outside of rendering (`stamp scan`).
    pub fn from_scan_error(template: &TemplateName, error: &ScanError) -> Self {
        Self {
            kind: DiagnosticKind::ScanError,
            template: Some(template.clone()),
            location: Location::Span(error.span()),
            message: error.to_string(),
        }
    }
}

impl From<&Violation> for Diagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            kind: v.kind.into(),
            template: None,
            location: Location::Path(v.path.clone()),
            message: v.message.clone(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(template) = &self.template {
            write!(f, "{template}: ")?;
        }
        write!(f, "{} [{}] {}", self.kind, self.location, self.message)
    }
}
