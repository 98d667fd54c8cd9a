//! `stamp scan`: list the tokens each template uses.
//!
//! Nothing is resolved here; the command only reports the token grammar's
//! view of each body, so it is useful for finding out which parameters a
//! template set needs before writing a parameter file.

use serde::Serialize;
use tracing::instrument;

use stamp_core::application::Diagnostic;
use stamp_core::domain::{PlaceholderToken, TemplateName};

use crate::{
    cli::ScanArgs,
    commands::inputs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct TemplateReport {
    template: TemplateName,
    tokens: Vec<PlaceholderToken>,
    errors: Vec<Diagnostic>,
}

#[instrument(skip_all)]
pub fn execute(args: ScanArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let source = inputs::resolve_source(&args.source, &config)?;
    let templates = inputs::load_templates(&source)?;

    let reports: Vec<TemplateReport> = templates
        .iter()
        .map(|template| {
            let scan = template.scan();
            TemplateReport {
                template: template.name().clone(),
                errors: scan
                    .errors
                    .iter()
                    .map(|e| Diagnostic::from_scan_error(template.name(), e))
                    .collect(),
                tokens: scan.tokens,
            }
        })
        .collect();
    let malformed: usize = reports.iter().map(|r| r.errors.len()).sum();

    if output.is_json() {
        output.json(&reports)?;
    } else {
        output.header(&format!("Templates from {source}"))?;
        for report in &reports {
            output.print(&format!(
                "{} ({} token(s))",
                report.template,
                report.tokens.len()
            ))?;
            for token in &report.tokens {
                output.print(&format!(
                    "  {{{{{}}}}}  bytes {}",
                    token.path(),
                    token.span()
                ))?;
            }
            output.diagnostics(&report.errors)?;
        }
    }

    if malformed > 0 {
        return Err(CliError::InvalidInput {
            message: format!("{malformed} malformed token(s)"),
            source: None,
        });
    }
    Ok(())
}
