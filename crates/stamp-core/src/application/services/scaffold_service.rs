//! Scaffold Service - main application orchestrator.
//!
//! This service coordinates the entire scaffolding workflow:
//! 1. Reject template sets whose names share an output path
//! 2. Validate the parameter store against every rule
//! 3. Render every template (in parallel with the `parallel` feature)
//! 4. Optionally write the scaffold through the `Filesystem` port
//!
//! Steps 1-3 are pure and all-or-nothing: `materialize` returns every file
//! or every problem, never a partial set.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{BaselineProvider, Filesystem, Stringifier},
    },
    domain::{
        NoBaselines, ParameterStore, PlainStringifier, RenderResult, Renderer, Rule, Template,
        TemplateName, Validator, Violation,
    },
    error::StampResult,
};

use super::outcome::{Outcome, Scaffold, ScaffoldFailure};

/// Main scaffolding service.
pub struct ScaffoldService {
    validator: Validator,
    renderer: Renderer,
    filesystem: Option<Box<dyn Filesystem>>,
    parallel: bool,
}

impl Default for ScaffoldService {
    fn default() -> Self {
        Self::new(Arc::new(PlainStringifier), Arc::new(NoBaselines))
    }
}

impl ScaffoldService {
    /// Create a service with the given stringifier and baseline source.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use stamp_core::application::ScaffoldService;
    /// use stamp_core::domain::{NoBaselines, ParameterStore, PlainStringifier, Rule, Template};
    ///
    /// let service = ScaffoldService::new(Arc::new(PlainStringifier), Arc::new(NoBaselines));
    /// let templates = [Template::new("id.txt", "{{ApplicationId}}")?];
    /// let store = ParameterStore::new().with("ApplicationId", "com.example.app")?;
    /// let rules = [Rule::identifier_format("id-format", "ApplicationId")?];
    ///
    /// let scaffold = service.materialize(&templates, &store, &rules)?;
    /// assert_eq!(scaffold.get("id.txt"), Some("com.example.app"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(stringifier: Arc<dyn Stringifier>, baselines: Arc<dyn BaselineProvider>) -> Self {
        Self {
            validator: Validator::new(baselines),
            renderer: Renderer::new(stringifier),
            filesystem: None,
            parallel: true,
        }
    }

    /// Attach the filesystem used by [`ScaffoldService::write`].
    pub fn with_filesystem(mut self, filesystem: Box<dyn Filesystem>) -> Self {
        self.filesystem = Some(filesystem);
        self
    }

    /// Render templates on worker threads. Has no effect without the
    /// `parallel` feature.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Validation only.
    pub fn check(&self, store: &ParameterStore, rules: &[Rule]) -> Vec<Violation> {
        self.validator.validate(store, rules)
    }

    /// Validate, then render every template.
    ///
    /// Fails fast between stages: a store with violations is never
    /// rendered. Within a stage every problem is collected.
    #[instrument(skip_all, fields(templates = templates.len(), rules = rules.len()))]
    pub fn materialize(
        &self,
        templates: &[Template],
        store: &ParameterStore,
        rules: &[Rule],
    ) -> Outcome {
        let duplicates = colliding_names(templates.iter().map(Template::name));
        if !duplicates.is_empty() {
            warn!(count = duplicates.len(), "duplicate template names");
            return Err(ScaffoldFailure::DuplicateTemplates { names: duplicates });
        }

        let violations = self.validator.validate(store, rules);
        if !violations.is_empty() {
            info!(count = violations.len(), "validation failed, nothing rendered");
            return Err(ScaffoldFailure::Validation { violations });
        }

        let mut files = Vec::with_capacity(templates.len());
        let mut failures = Vec::new();
        for result in self.render_all(templates, store) {
            match result {
                Ok(file) => files.push(file),
                Err(failure) => failures.push(failure),
            }
        }

        if !failures.is_empty() {
            info!(count = failures.len(), "templates failed to render");
            return Err(ScaffoldFailure::Render { failures });
        }

        info!(files = files.len(), "scaffold materialized");
        Ok(Scaffold { files })
    }

    #[cfg(feature = "parallel")]
    fn render_all(&self, templates: &[Template], store: &ParameterStore) -> Vec<RenderResult> {
        use rayon::prelude::*;

        if self.parallel {
            debug!("rendering on the rayon pool");
            // Indexed collect keeps template order.
            templates
                .par_iter()
                .map(|t| self.renderer.render(t, store))
                .collect()
        } else {
            self.render_serial(templates, store)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn render_all(&self, templates: &[Template], store: &ParameterStore) -> Vec<RenderResult> {
        self.render_serial(templates, store)
    }

    fn render_serial(&self, templates: &[Template], store: &ParameterStore) -> Vec<RenderResult> {
        templates
            .iter()
            .map(|t| self.renderer.render(t, store))
            .collect()
    }

    /// Write a scaffold under `root`, one file per template name.
    ///
    /// An existing `root` is refused unless `force` is set. If a write
    /// fails and this call created `root`, it is removed again.
    #[instrument(skip_all, fields(root = %root.display(), files = scaffold.len()))]
    pub fn write(&self, scaffold: &Scaffold, root: &Path, force: bool) -> StampResult<()> {
        let filesystem = self
            .filesystem
            .as_deref()
            .ok_or(ApplicationError::AdapterNotConfigured { name: "filesystem" })?;

        let targets = scaffold
            .iter()
            .map(|file| Ok((root.join(safe_relative(&file.name)?), file.body.as_str())))
            .collect::<StampResult<Vec<_>>>()?;

        let collisions = colliding_names(scaffold.files.iter().map(|file| &file.name));
        if !collisions.is_empty() {
            return Err(ScaffoldFailure::DuplicateTemplates { names: collisions }.into());
        }

        let existed = filesystem.exists(root);
        if existed && !force {
            return Err(ApplicationError::OutputExists {
                path: root.to_path_buf(),
            }
            .into());
        }

        match write_all(filesystem, root, &targets) {
            Ok(()) => {
                info!("Successfully wrote all files");
                Ok(())
            }
            Err(e) if existed => Err(e),
            Err(e) => {
                warn!(error = %e, "Write failed, attempting rollback");
                rollback(filesystem, root).map_err(|cleanup| ApplicationError::RollbackFailed {
                    path: root.to_path_buf(),
                    reason: format!("{cleanup} (after: {e})"),
                })?;
                Err(e)
            }
        }
    }
}

fn write_all(filesystem: &dyn Filesystem, root: &Path, targets: &[(PathBuf, &str)]) -> StampResult<()> {
    filesystem.create_dir_all(root)?;

    for (path, body) in targets {
        if let Some(parent) = path.parent() {
            filesystem.create_dir_all(parent)?;
        }
        filesystem.write_file(path, body)?;
        debug!(path = %path.display(), "wrote file");
    }

    Ok(())
}

/// Remove a root this call created.
fn rollback(filesystem: &dyn Filesystem, root: &Path) -> StampResult<()> {
    filesystem.remove_dir_all(root).inspect_err(|e| {
        warn!(error = %e, path = %root.display(), "Rollback failed");
    })?;
    info!("Rollback successful");
    Ok(())
}

/// A template name as a path that stays under the output root.
fn safe_relative(name: &TemplateName) -> StampResult<PathBuf> {
    let path = Path::new(name.as_str());
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ApplicationError::UnsafeOutputPath {
                    name: name.to_string(),
                }
                .into());
            }
        }
    }
    if out.as_os_str().is_empty() {
        return Err(ApplicationError::UnsafeOutputPath {
            name: name.to_string(),
        }
        .into());
    }
    Ok(out)
}

/// Where a name lands under the output root. Spellings of one path
/// (`a.txt`, `./a.txt`, `a//b` and `a/b`) share a key.
fn output_key(name: &TemplateName) -> PathBuf {
    Path::new(name.as_str())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Names whose output path is shared with another name, in first-seen
/// order, each listed once.
fn colliding_names<'a>(names: impl Iterator<Item = &'a TemplateName> + Clone) -> Vec<TemplateName> {
    let mut counts: HashMap<PathBuf, usize> = HashMap::new();
    for name in names.clone() {
        *counts.entry(output_key(name)).or_default() += 1;
    }

    let mut out: Vec<TemplateName> = Vec::new();
    for name in names {
        if counts[&output_key(name)] > 1 && !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}
