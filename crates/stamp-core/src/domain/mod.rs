// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stamp.
//!
//! Pure logic: scanning template bodies, holding typed parameters,
//! evaluating rules and substituting tokens. Everything that touches the
//! outside world (files, baselines on disk, destination escaping) comes in
//! through traits.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Collect, don't abort**: scan errors, violations and unresolved
//!   tokens are gathered so callers see every problem at once
//! - **Immutable inputs**: the store and templates are read-only while
//!   validating and rendering
pub mod entities;
pub mod error;
pub mod render;
pub mod scanner;
pub mod validation;
pub mod value_objects;

pub use entities::{
    BaselineProvider, Constraint, Expected, FieldDecl, NoBaselines, Order, ParameterStore,
    ResolveError, Rule, ScalarRef, Schema, Template, TemplateName, Value, Violation,
    ViolationKind,
};
pub use error::{DomainError, ErrorCategory};
pub use render::{
    PlainStringifier, RenderFailure, RenderResult, RenderedTemplate, Renderer, Stringifier,
    TokenError,
};
pub use scanner::{PlaceholderToken, Scan, ScanError, ScanReport, scan};
pub use validation::Validator;
pub use value_objects::{ParamPath, Span, ValueKind};
