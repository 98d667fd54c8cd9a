//! Filesystem-based template loader.
//!
//! Every regular file under a directory is one template. Its name is the
//! path relative to that directory, with forward slashes, and becomes the
//! output path when the scaffold is written.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── app/
//! │   └── build.gradle.kts     → "app/build.gradle.kts"
//! ├── settings.gradle.kts      → "settings.gradle.kts"
//! └── .git/...                 (hidden entries are skipped)
//! ```
//!
//! Templates are returned sorted by name so the render order, and every
//! diagnostic that follows from it, is stable across platforms.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};
use walkdir::{DirEntry, WalkDir};

use stamp_core::{
    application::ApplicationError,
    domain::Template,
    error::StampResult,
};

/// Loads every file under a directory as a template.
///
/// # Example
///
/// ```rust,no_run
/// use stamp_adapters::template_loader::DirectoryTemplateLoader;
///
/// let loader = DirectoryTemplateLoader::new("./templates");
/// let templates = loader.load_all()?;
/// println!("Loaded {} templates", templates.len());
/// # Ok::<(), stamp_core::error::StampError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryTemplateLoader {
    templates_dir: PathBuf,
}

impl DirectoryTemplateLoader {
    /// Create a loader pointed at `templates_dir`.
    ///
    /// The directory does not need to exist yet; [`load_all`] will return an
    /// error if it is missing when called.
    ///
    /// [`load_all`]: DirectoryTemplateLoader::load_all
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Load every template found under the directory.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::Load`] if the directory is missing or a file
    ///   cannot be read.
    /// - [`ApplicationError::Parse`] if a file is not UTF-8.
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    pub fn load_all(&self) -> StampResult<Vec<Template>> {
        if !self.templates_dir.is_dir() {
            return Err(ApplicationError::Load {
                source_name: self.templates_dir.display().to_string(),
                reason: "templates directory not found".into(),
            }
            .into());
        }

        let mut templates = Vec::new();

        let walker = WalkDir::new(&self.templates_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| ApplicationError::Load {
                source_name: self.templates_dir.display().to_string(),
                reason: e.to_string(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let template = self.load_file(entry.path())?;
            debug!(name = %template.name(), bytes = template.body().len(), "loaded template");
            templates.push(template);
        }

        templates.sort_by(|a, b| a.name().cmp(b.name()));
        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }

    fn load_file(&self, path: &Path) -> StampResult<Template> {
        let source_name = path.display().to_string();

        let bytes = fs::read(path).map_err(|e| ApplicationError::Load {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        let body = String::from_utf8(bytes).map_err(|_| ApplicationError::Parse {
            source_name: source_name.clone(),
            reason: "template is not valid UTF-8".into(),
        })?;

        let relative = path
            .strip_prefix(&self.templates_dir)
            .unwrap_or(path)
            .to_string_lossy();

        Ok(Template::new(normalize_path(&relative), body)?)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Normalise a filesystem path to forward slashes so Windows and Unix paths
/// compare identically throughout the loader.
fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use stamp_core::error::StampError;
    use tempfile::TempDir;

    fn make_dir(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (rel_path, content) in files {
            let full = temp.path().join(rel_path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, content).unwrap();
        }
        temp
    }

    #[test]
    fn missing_dir_is_a_load_error() {
        let err = DirectoryTemplateLoader::new("/absolutely/does/not/exist")
            .load_all()
            .unwrap_err();
        assert!(matches!(
            err,
            StampError::Application(ApplicationError::Load { .. })
        ));
    }

    #[test]
    fn names_are_relative_and_sorted() {
        let temp = make_dir(&[
            ("settings.gradle.kts", "rootProject.name = \"{{AppName}}\""),
            ("app/build.gradle.kts", "minSdk = {{AndroidApiVersion.a}}"),
        ]);
        let templates = DirectoryTemplateLoader::new(temp.path()).load_all().unwrap();
        let names: Vec<_> = templates.iter().map(|t| t.name().as_str()).collect();
        assert_eq!(names, ["app/build.gradle.kts", "settings.gradle.kts"]);
        assert_eq!(templates[0].body(), "minSdk = {{AndroidApiVersion.a}}");
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let temp = make_dir(&[(".git/config", "x"), (".env", "y"), ("a.txt", "a")]);
        let templates = DirectoryTemplateLoader::new(temp.path()).load_all().unwrap();
        assert_eq!(templates.len(), 1);
    }

    #[test]
    fn non_utf8_file_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("bin.dat"), [0xff, 0xfe, 0x00]).unwrap();
        let err = DirectoryTemplateLoader::new(temp.path())
            .load_all()
            .unwrap_err();
        assert!(matches!(
            err,
            StampError::Application(ApplicationError::Parse { .. })
        ));
    }

    #[test]
    fn empty_dir_yields_no_templates() {
        let temp = TempDir::new().unwrap();
        assert!(
            DirectoryTemplateLoader::new(temp.path())
                .load_all()
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn normalize_path_replaces_backslashes() {
        assert_eq!(normalize_path(r"app\build.gradle.kts"), "app/build.gradle.kts");
    }
}
