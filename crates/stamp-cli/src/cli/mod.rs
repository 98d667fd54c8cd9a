//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use stamp_adapters::{Escape, Preset};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stamp",
    bin_name = "stamp",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Typed placeholder scaffolding",
    long_about = "Stamp validates a typed parameter set against declared rules and \
                  renders {{Dotted.path}} templates into platform build files.",
    after_help = "EXAMPLES:\n\
        \x20 stamp render --preset android --params app.toml --output ./MyApp\n\
        \x20 stamp check  --preset android --params app.toml --baseline released.json\n\
        \x20 stamp scan   --templates ./templates\n\
        \x20 stamp completions bash > /usr/share/bash-completion/completions/stamp",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate parameters and render templates into a directory.
    #[command(
        visible_alias = "r",
        about = "Validate parameters and render templates",
        after_help = "EXAMPLES:\n\
            \x20 stamp render --preset android --params app.toml --output ./MyApp\n\
            \x20 stamp render --templates ./tpl --rules rules.toml --params p.json -o out\n\
            \x20 stamp render --preset android --params app.toml -o out --dry-run"
    )]
    Render(RenderArgs),

    /// Validate parameters without rendering.
    #[command(
        about = "Validate parameters only",
        after_help = "EXAMPLES:\n\
            \x20 stamp check --preset android --params app.toml\n\
            \x20 stamp check --rules rules.toml --params app.toml --baseline released.json"
    )]
    Check(CheckArgs),

    /// List the tokens every template uses and any malformed ones.
    #[command(
        about = "List template tokens",
        after_help = "EXAMPLES:\n\
            \x20 stamp scan --preset android\n\
            \x20 stamp scan --templates ./templates --output-format json"
    )]
    Scan(ScanArgs),

    /// Initialise a Stamp configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stamp init           # platform config location\n\
            \x20 stamp init --local   # .stamp.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stamp completions bash > ~/.local/share/bash-completion/completions/stamp\n\
            \x20 stamp completions zsh  > ~/.zfunc/_stamp\n\
            \x20 stamp completions fish > ~/.config/fish/completions/stamp.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Stamp configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stamp config get defaults.preset\n\
            \x20 stamp config list\n\
            \x20 stamp config path"
    )]
    Config(ConfigCommands),
}

// ── shared source selection ───────────────────────────────────────────────────

/// Where templates come from.  Without either flag the configured default
/// preset is used.
#[derive(Debug, Clone, Args)]
pub struct TemplateSourceArgs {
    /// Directory of template files.
    #[arg(
        short = 't',
        long = "templates",
        value_name = "DIR",
        conflicts_with = "preset",
        help = "Directory of template files"
    )]
    pub templates: Option<PathBuf>,

    /// Built-in preset.
    #[arg(
        short = 'p',
        long = "preset",
        value_name = "PRESET",
        value_enum,
        help = "Built-in preset (templates and rules)"
    )]
    pub preset: Option<PresetArg>,
}

/// Inputs shared by `render` and `check`.
#[derive(Debug, Clone, Args)]
pub struct ValidationArgs {
    /// Parameter file (TOML, or JSON by extension).
    #[arg(
        short = 'P',
        long = "params",
        value_name = "FILE",
        help = "Parameter file (.toml or .json)"
    )]
    pub params: PathBuf,

    /// Rule manifest; added to the preset's rules when both are given.
    #[arg(
        short = 'r',
        long = "rules",
        value_name = "FILE",
        help = "Rule manifest (.toml or .json)"
    )]
    pub rules: Option<PathBuf>,

    /// Previously released values for monotonic rules.
    #[arg(
        short = 'b',
        long = "baseline",
        value_name = "FILE",
        help = "Baseline JSON for monotonic rules"
    )]
    pub baseline: Option<PathBuf>,
}

// ── render ────────────────────────────────────────────────────────────────────

/// Arguments for `stamp render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: TemplateSourceArgs,

    #[command(flatten)]
    pub inputs: ValidationArgs,

    /// How string values are escaped when spliced in.
    #[arg(
        short = 'e',
        long = "escape",
        value_name = "MODE",
        value_enum,
        help = "String escaping (default: from config, else plain)"
    )]
    pub escape: Option<EscapeArg>,

    /// Output directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Directory to write rendered files into"
    )]
    pub output: PathBuf,

    /// Write into an existing directory.
    #[arg(long = "force", help = "Write into an existing directory")]
    pub force: bool,

    /// Render and list files without touching the disk.
    #[arg(long = "dry-run", help = "Show what would be written without writing")]
    pub dry_run: bool,
}

// ── check ─────────────────────────────────────────────────────────────────────

/// Arguments for `stamp check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Built-in preset whose rules to check against.
    #[arg(
        short = 'p',
        long = "preset",
        value_name = "PRESET",
        value_enum,
        help = "Built-in preset whose rules to use"
    )]
    pub preset: Option<PresetArg>,

    #[command(flatten)]
    pub inputs: ValidationArgs,
}

// ── scan ──────────────────────────────────────────────────────────────────────

/// Arguments for `stamp scan`.
#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: TemplateSourceArgs,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stamp init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.stamp.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stamp completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `stamp config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.preset`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum PresetArg {
    Android,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Android => Preset::Android,
        }
    }
}

/// String escaping modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum EscapeArg {
    Plain,
    /// Also accepted as `kts`.
    #[value(alias = "kts")]
    Kotlin,
}

impl From<EscapeArg> for Escape {
    fn from(arg: EscapeArg) -> Self {
        match arg {
            EscapeArg::Plain => Escape::Plain,
            EscapeArg::Kotlin => Escape::Kotlin,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_render_command() {
        let cli = Cli::parse_from([
            "stamp", "render", "--preset", "android", "--params", "app.toml", "--output", "out",
        ]);
        let Commands::Render(args) = cli.command else {
            panic!("expected Render command");
        };
        assert_eq!(args.source.preset, Some(PresetArg::Android));
        assert_eq!(args.inputs.params, PathBuf::from("app.toml"));
        assert!(!args.dry_run);
    }

    #[test]
    fn kts_alias() {
        let cli = Cli::parse_from([
            "stamp", "render", "-p", "android", "-P", "a.toml", "-o", "out", "-e", "kts",
        ]);
        if let Commands::Render(args) = cli.command {
            assert_eq!(args.escape, Some(EscapeArg::Kotlin));
        } else {
            panic!("expected Render command");
        }
    }

    #[test]
    fn templates_and_preset_conflict() {
        let result = Cli::try_parse_from([
            "stamp",
            "scan",
            "--templates",
            "tpl",
            "--preset",
            "android",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn render_requires_params_and_output() {
        assert!(Cli::try_parse_from(["stamp", "render", "--preset", "android"]).is_err());
    }

    #[test]
    fn check_accepts_rules_without_preset() {
        let cli = Cli::parse_from(["stamp", "check", "--rules", "r.toml", "--params", "p.toml"]);
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["stamp", "--quiet", "--verbose", "scan"]);
        assert!(result.is_err());
    }

    #[test]
    fn scan_has_no_ls_alias() {
        assert!(Cli::try_parse_from(["stamp", "ls"]).is_err());
        assert!(Cli::try_parse_from(["stamp", "scan"]).is_ok());
    }

    #[test]
    fn preset_arg_maps_to_adapter_preset() {
        assert_eq!(Preset::from(PresetArg::Android), Preset::Android);
        assert_eq!(Escape::from(EscapeArg::Plain), Escape::Plain);
    }
}
