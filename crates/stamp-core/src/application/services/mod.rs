//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "validate these parameters" or "render this
//! template set".

pub mod outcome;
pub mod scaffold_service;

pub use outcome::{Diagnostic, DiagnosticKind, Location, Outcome, Scaffold, ScaffoldFailure};
pub use scaffold_service::ScaffoldService;
