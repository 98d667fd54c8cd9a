//! `stamp check`: validate parameters without rendering.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use stamp_adapters::load_parameters;
use stamp_core::application::{Diagnostic, ScaffoldFailure, ScaffoldService};
use stamp_core::domain::PlainStringifier;

use crate::{
    cli::CheckArgs,
    commands::inputs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct Report {
    valid: bool,
    rules: usize,
    diagnostics: Vec<Diagnostic>,
}

#[instrument(skip_all, fields(params = %args.inputs.params.display()))]
pub fn execute(args: CheckArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let preset = inputs::check_preset(args.preset, &args.inputs, &config);
    let rules = inputs::load_rule_set(preset, &args.inputs)?;
    if rules.is_empty() {
        return Err(CliError::InvalidInput {
            message: "no rules to check: pass --rules FILE or --preset".into(),
            source: None,
        });
    }

    let store = load_parameters(&args.inputs.params)?;
    let baselines = inputs::load_baselines(&args.inputs)?;
    let violations =
        ScaffoldService::new(Arc::new(PlainStringifier), baselines).check(&store, &rules);

    let failure = (!violations.is_empty()).then_some(ScaffoldFailure::Validation { violations });
    let diagnostics = failure
        .as_ref()
        .map(ScaffoldFailure::diagnostics)
        .unwrap_or_default();

    if output.is_json() {
        output.json(&Report {
            valid: failure.is_none(),
            rules: rules.len(),
            diagnostics,
        })?;
    } else if failure.is_some() {
        output.diagnostics(&diagnostics)?;
    } else {
        output.success(&format!(
            "{} passed {} rule(s)",
            args.inputs.params.display(),
            rules.len()
        ))?;
    }

    match failure {
        Some(failure) => Err(CliError::Core(failure.into())),
        None => Ok(()),
    }
}
