//! Infrastructure adapters for Stamp.
//!
//! This crate implements the ports defined in `stamp-core::application::ports`
//! and the loaders that turn files on disk into domain values. It contains
//! all external dependencies and I/O operations.

pub mod baselines;
pub mod builtin_templates;
pub mod filesystem;
pub mod parameter_loader;
pub mod rules_loader;
pub mod stringifier;
pub mod template_loader;

// Re-export commonly used adapters
pub use baselines::{InMemoryBaselines, JsonFileBaselines};
pub use builtin_templates::Preset;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use parameter_loader::load_parameters;
pub use rules_loader::load_rules;
pub use stringifier::{Escape, KotlinStringifier, stringifier_for};
pub use template_loader::DirectoryTemplateLoader;
