//! Flags accepted before or after any subcommand.

use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Logging verbosity, stacked: `-v` info, `-vv` debug, `-vvv` trace.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "More log output (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Only errors and requested JSON documents are printed.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Print errors only"
    )]
    pub quiet: bool,

    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Disable colored output"
    )]
    pub no_color: bool,

    /// Read this config file instead of the discovered one. It must exist.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Configuration file path"
    )]
    pub config: Option<PathBuf>,

    /// Overrides `output.format` from the config.
    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        help = "auto, human, plain or json [default: auto]"
    )]
    pub output_format: Option<OutputFormat>,
}

/// `Auto` becomes `Human` on a terminal and `Plain` otherwise.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Auto,
    /// Colored, with status symbols.
    Human,
    Plain,
    /// One document per command on stdout; diagnostics included.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_reads_lowercase_from_config() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: OutputFormat,
        }
        let w: Wrapper = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(w.format, OutputFormat::Json);
    }
}
