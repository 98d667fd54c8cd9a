//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `STAMP_` prefix, `__` between sections
//!    (`STAMP_DEFAULTS__ESCAPE=kotlin`)
//! 3. Config file: `--config FILE`, else the platform config file, else
//!    `.stamp.toml` in the current directory
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stamp_adapters::{Escape, Preset};

use crate::cli::OutputFormat;

/// Local config file name, looked up in the current directory.
pub const LOCAL_CONFIG: &str = ".stamp.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults for `render`, `check` and `scan`.
    pub defaults: Defaults,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Output settings.
    pub output: OutputConfig,

    /// File the values were read from, if any.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Preset used when neither `--templates` nor `--preset` is given.
    pub preset: Option<Preset>,
    /// Escaping used when `--escape` is not given.
    pub escape: Escape,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            preset: Some(Preset::Android),
            escape: Escape::Plain,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render templates on the rayon pool.
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

impl AppConfig {
    /// Load configuration from file and environment over the defaults.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let path = match config_file {
            Some(path) => Some(path.clone()),
            None => Self::discover(),
        };

        let mut builder = Config::builder();
        if let Some(path) = &path {
            debug!(path = %path.display(), "reading config file");
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("STAMP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        config.loaded_from = path;
        Ok(config)
    }

    /// First existing implicit config file.
    fn discover() -> Option<PathBuf> {
        [Self::config_path(), PathBuf::from(LOCAL_CONFIG)]
            .into_iter()
            .find(|p| p.is_file())
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stamp.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stamp", "stamp")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    /// The file this config came from, or where `stamp init` would write.
    pub fn active_path(&self) -> &Path {
        match &self.loaded_from {
            Some(path) => path,
            None => Path::new(LOCAL_CONFIG),
        }
    }

    /// Look up a dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        Some(match key {
            "defaults.preset" => self
                .defaults
                .preset
                .map(|p| p.to_string())
                .unwrap_or_default(),
            "defaults.escape" => self.defaults.escape.to_string(),
            "render.parallel" => self.render.parallel.to_string(),
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => format!("{:?}", self.output.format).to_lowercase(),
            _ => return None,
        })
    }

    pub const KEYS: &'static [&'static str] = &[
        "defaults.preset",
        "defaults.escape",
        "render.parallel",
        "output.no_color",
        "output.format",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_preset_is_android() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.defaults.preset, Some(Preset::Android));
        assert_eq!(cfg.defaults.escape, Escape::Plain);
    }

    #[test]
    fn default_no_color_is_false() {
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stamp.toml");
        fs::write(
            &path,
            "[defaults]\nescape = \"kotlin\"\n\n[render]\nparallel = false\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.defaults.escape, Escape::Kotlin);
        assert!(!cfg.render.parallel);
        assert_eq!(cfg.defaults.preset, Some(Preset::Android));
        assert_eq!(cfg.active_path(), path.as_path());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn invalid_value_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stamp.toml");
        fs::write(&path, "[defaults]\nescape = \"yaml\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn every_key_resolves() {
        let cfg = AppConfig::default();
        for key in AppConfig::KEYS {
            assert!(cfg.get(key).is_some(), "{key}");
        }
        assert_eq!(cfg.get("output.format").as_deref(), Some("auto"));
        assert!(cfg.get("does.not.exist").is_none());
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }

    #[test]
    fn defaults_serialise_to_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(text.contains("[defaults]"));
        assert!(text.contains("preset = \"android\""));
    }
}
