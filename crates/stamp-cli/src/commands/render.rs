//! Implementation of the `stamp render` command.
//!
//! Responsibility: load templates, parameters, rules and baselines, call the
//! core scaffold service, and display results. No business logic lives here.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use stamp_adapters::{Escape, LocalFilesystem, MemoryFilesystem, load_parameters, stringifier_for};
use stamp_core::application::{Diagnostic, Scaffold, ScaffoldFailure, ScaffoldService};

use crate::{
    cli::RenderArgs,
    commands::inputs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct FileEntry {
    name: String,
    bytes: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report<'a> {
    Rendered {
        output: &'a Path,
        dry_run: bool,
        files: Vec<FileEntry>,
    },
    Failed {
        diagnostics: Vec<Diagnostic>,
    },
}

/// Execute the `stamp render` command.
///
/// Dispatch sequence:
/// 1. Resolve and load templates (directory, preset, or configured preset)
/// 2. Load parameters, rules and baselines
/// 3. Validate and render via `ScaffoldService::materialize`
/// 4. Write through `LocalFilesystem`, or `MemoryFilesystem` for `--dry-run`
/// 5. Report files written or every diagnostic
#[instrument(skip_all, fields(output = %args.output.display()))]
pub fn execute(args: RenderArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // 1. Templates
    let source = inputs::resolve_source(&args.source, &config)?;
    let templates = inputs::load_templates(&source)?;

    // 2. Parameters, rules, baselines
    let store = load_parameters(&args.inputs.params)?;
    let rules = inputs::load_rule_set(source.preset(), &args.inputs)?;
    let baselines = inputs::load_baselines(&args.inputs)?;
    let escape: Escape = args.escape.map(Into::into).unwrap_or(config.defaults.escape);

    let service = ScaffoldService::new(stringifier_for(escape), baselines)
        .parallel(config.render.parallel);

    // 3. Validate + render
    info!(source = %source, escape = %escape, "rendering");
    let scaffold = match service.materialize(&templates, &store, &rules) {
        Ok(scaffold) => scaffold,
        Err(failure) => return Err(report_failure(failure, &output)),
    };

    // 4. Write
    let files = if args.dry_run {
        let memory = MemoryFilesystem::new();
        service
            .with_filesystem(Box::new(memory.clone()))
            .write(&scaffold, &args.output, true)?;
        memory
            .list_files()
            .into_iter()
            .map(|(path, bytes)| FileEntry {
                name: relative_name(&path, &args.output),
                bytes,
            })
            .collect()
    } else {
        service
            .with_filesystem(Box::new(LocalFilesystem::new()))
            .write(&scaffold, &args.output, args.force)?;
        entries(&scaffold)
    };

    // 5. Report
    if output.is_json() {
        return output.json(&Report::Rendered {
            output: &args.output,
            dry_run: args.dry_run,
            files,
        });
    }

    if args.dry_run {
        output.info(&format!(
            "Dry run: would write {} file(s) to {}",
            files.len(),
            args.output.display()
        ))?;
    } else {
        output.success(&format!(
            "Rendered {} file(s) to {}",
            files.len(),
            args.output.display()
        ))?;
    }
    for file in &files {
        output.print(&format!("  {}  ({} bytes)", file.name, file.bytes))?;
    }

    Ok(())
}

/// Print every diagnostic, then turn the failure into the command's error.
fn report_failure(failure: ScaffoldFailure, output: &OutputManager) -> CliError {
    let diagnostics = failure.diagnostics();
    let printed = if output.is_json() {
        output.json(&Report::Failed { diagnostics })
    } else {
        output.diagnostics(&diagnostics).map_err(CliError::from)
    };
    match printed {
        Ok(()) => CliError::Core(failure.into()),
        Err(e) => e,
    }
}

fn entries(scaffold: &Scaffold) -> Vec<FileEntry> {
    scaffold
        .iter()
        .map(|file| FileEntry {
            name: file.name.to_string(),
            bytes: file.body.len(),
        })
        .collect()
}

fn relative_name(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stamp_core::domain::{ParameterStore, Template};

    #[test]
    fn relative_names_drop_the_root() {
        let root = Path::new("out");
        assert_eq!(
            relative_name(&root.join("app").join("build.gradle.kts"), root),
            "app/build.gradle.kts"
        );
    }

    #[test]
    fn entries_follow_scaffold_order() {
        let templates = [
            Template::new("b.txt", "bb").unwrap(),
            Template::new("a.txt", "a").unwrap(),
        ];
        let scaffold = ScaffoldService::default()
            .materialize(&templates, &ParameterStore::new(), &[])
            .unwrap();
        let names: Vec<_> = entries(&scaffold).into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["b.txt", "a.txt"]);
    }

    #[test]
    fn failure_report_is_tagged() {
        let report = Report::Failed {
            diagnostics: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
    }
}
