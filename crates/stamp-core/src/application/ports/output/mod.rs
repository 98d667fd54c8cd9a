//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stamp-adapters` crate provides implementations.

use std::path::Path;

use crate::error::StampResult;

pub use crate::domain::render::Stringifier;
pub use crate::domain::entities::BaselineProvider;

/// Port for writing a rendered scaffold.
///
/// Implemented by:
/// - `stamp_adapters::filesystem::LocalFilesystem` (production)
/// - `stamp_adapters::filesystem::MemoryFilesystem` (testing, dry runs)
///
/// Paths handed to the port are already joined onto the output root.
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StampResult<()>;

    /// Write content to a file, replacing any existing file.
    fn write_file(&self, path: &Path, content: &str) -> StampResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> StampResult<()>;
}
