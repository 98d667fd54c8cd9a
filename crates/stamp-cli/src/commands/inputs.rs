//! Turning source flags into templates, rules and baselines.
//!
//! Shared by `render`, `check` and `scan` so the three commands resolve
//! presets, directories and the configured defaults the same way.

use std::{path::PathBuf, sync::Arc};

use tracing::{debug, info};

use stamp_adapters::{DirectoryTemplateLoader, JsonFileBaselines, Preset, load_rules};
use stamp_core::domain::{BaselineProvider, NoBaselines, Rule, Template};

use crate::{
    cli::{PresetArg, TemplateSourceArgs, ValidationArgs},
    config::AppConfig,
    error::{CliError, CliResult},
};

/// Where a template set was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Preset(Preset),
    Directory(PathBuf),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preset(p) => write!(f, "preset '{p}'"),
            Self::Directory(d) => write!(f, "{}", d.display()),
        }
    }
}

impl Source {
    pub fn preset(&self) -> Option<Preset> {
        match self {
            Self::Preset(p) => Some(*p),
            Self::Directory(_) => None,
        }
    }
}

/// `--templates` wins, then `--preset`, then `defaults.preset`.
pub fn resolve_source(args: &TemplateSourceArgs, config: &AppConfig) -> CliResult<Source> {
    if let Some(dir) = &args.templates {
        return Ok(Source::Directory(dir.clone()));
    }
    args.preset
        .map(Preset::from)
        .or(config.defaults.preset)
        .map(Source::Preset)
        .ok_or_else(|| CliError::InvalidInput {
            message: "no templates: pass --templates DIR or --preset".into(),
            source: None,
        })
}

pub fn load_templates(source: &Source) -> CliResult<Vec<Template>> {
    let templates = match source {
        Source::Preset(preset) => preset.templates()?,
        Source::Directory(dir) => {
            let templates = DirectoryTemplateLoader::new(dir).load_all()?;
            if templates.is_empty() {
                return Err(CliError::NoTemplates {
                    dir: dir.display().to_string(),
                });
            }
            templates
        }
    };
    info!(source = %source, count = templates.len(), "templates loaded");
    Ok(templates)
}

/// The preset's rules (if any) followed by the manifest's (if any).
pub fn load_rule_set(preset: Option<Preset>, inputs: &ValidationArgs) -> CliResult<Vec<Rule>> {
    let mut rules = match preset {
        Some(preset) => preset.rules()?,
        None => Vec::new(),
    };
    if let Some(path) = &inputs.rules {
        rules.extend(load_rules(path)?);
    }
    debug!(count = rules.len(), "rules loaded");
    Ok(rules)
}

/// Rules for `check`, which has no template source: `--preset`, else the
/// configured preset unless a manifest alone was given.
pub fn check_preset(
    arg: Option<PresetArg>,
    inputs: &ValidationArgs,
    config: &AppConfig,
) -> Option<Preset> {
    match arg {
        Some(p) => Some(p.into()),
        None if inputs.rules.is_some() => None,
        None => config.defaults.preset,
    }
}

pub fn load_baselines(inputs: &ValidationArgs) -> CliResult<Arc<dyn BaselineProvider>> {
    Ok(match &inputs.baseline {
        Some(path) => Arc::new(JsonFileBaselines::load(path)?),
        None => Arc::new(NoBaselines),
    })
}
