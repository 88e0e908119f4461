//! Shared output helpers for the table and rename commands.

use std::path::{Path, PathBuf};

use serde::Serialize;

use qpcollate_pipeline::{Diagnostic, PipelineConfig};

use crate::exit_codes::{EXIT_ERROR, EXIT_NO_INPUT, EXIT_ROWS_SKIPPED};
use crate::CliError;

/// Diagnostics printed before the rest are summarized as a count.
const MAX_PRINTED_DIAGNOSTICS: usize = 10;

/// Explicit `--output` wins; otherwise the default name lands in `dir`.
pub fn resolve_output(dir: &Path, explicit: Option<PathBuf>, default_name: &str) -> PathBuf {
    explicit.unwrap_or_else(|| dir.join(default_name))
}

/// File names this tool writes, so re-runs never read their own output.
pub fn known_outputs(config: &PipelineConfig, output: &Path) -> Vec<String> {
    let mut names: Vec<String> = config
        .collate
        .profile_names()
        .iter()
        .filter_map(|name| config.collate.profile(name).ok())
        .map(|profile| profile.output)
        .collect();
    names.push(config.sum.output.clone());
    if let Some(name) = output.file_name().and_then(|n| n.to_str()) {
        names.push(name.to_string());
    }
    names.sort();
    names.dedup();
    names
}

pub fn no_input(dir: &Path) -> CliError {
    CliError::new(EXIT_NO_INPUT, format!("no .csv files found in {}", dir.display()))
        .with_hint("pass --dir with the folder holding the exported measurement tables")
}

/// Print up to `MAX_PRINTED_DIAGNOSTICS` skip reasons to stderr.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics.iter().take(MAX_PRINTED_DIAGNOSTICS) {
        eprintln!("  skipped {diagnostic}");
    }
    if diagnostics.len() > MAX_PRINTED_DIAGNOSTICS {
        eprintln!("  ... and {} more", diagnostics.len() - MAX_PRINTED_DIAGNOSTICS);
    }
}

/// Print a JSON envelope around `report` to stdout.
pub fn print_json<T: Serialize>(
    command: &str,
    output: Option<&Path>,
    written: bool,
    report: &T,
) -> Result<(), CliError> {
    let envelope = serde_json::json!({
        "command": command,
        "engine_version": env!("CARGO_PKG_VERSION"),
        "run_at": chrono::Utc::now().to_rfc3339(),
        "output": output.map(|p| p.display().to_string()),
        "written": written,
        "report": report,
    });
    let text = serde_json::to_string_pretty(&envelope)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Map leftover diagnostics to the `--fail-on-skip` exit code.
pub fn check_skips(diagnostics: &[Diagnostic], fail_on_skip: bool) -> Result<(), CliError> {
    if fail_on_skip && !diagnostics.is_empty() {
        return Err(CliError::new(
            EXIT_ROWS_SKIPPED,
            format!("{} row(s) or file(s) skipped", diagnostics.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_inside_dir() {
        assert_eq!(
            resolve_output(Path::new("exports"), None, "Results.csv"),
            PathBuf::from("exports/Results.csv")
        );
        assert_eq!(
            resolve_output(Path::new("exports"), Some(PathBuf::from("merged.csv")), "Results.csv"),
            PathBuf::from("merged.csv")
        );
    }

    #[test]
    fn known_outputs_cover_all_tools() {
        let config = PipelineConfig::default();
        let names = known_outputs(&config, Path::new("out/custom.csv"));
        assert_eq!(
            names,
            vec!["Results.csv", "Results_positive_cell.csv", "custom.csv", "results.csv"]
        );
    }
}
