//! `qpcollate collate`: merge measurement tables through a column profile.

use qpcollate_io::csv::{discover_inputs, export, load_inputs};
use qpcollate_pipeline::{collate, CollateOptions, MalformedPolicy, PipelineConfig};

use crate::report::{check_skips, known_outputs, no_input, print_diagnostics, print_json, resolve_output};
use crate::{CliError, DelimiterArg, RunArgs};

pub fn cmd_collate(
    config: &PipelineConfig,
    profile_name: &str,
    run: RunArgs,
    delimiter: Option<DelimiterArg>,
    strict: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let profile = config.collate.profile(profile_name).map_err(|e| {
        CliError::pipeline(e).with_hint(format!(
            "available profiles: {}",
            config.collate.profile_names().join(", ")
        ))
    })?;

    let options = CollateOptions {
        delimiter: delimiter.map(Into::into).unwrap_or(config.collate.delimiter),
        policy: if strict { MalformedPolicy::Strict } else { config.collate.policy },
    };

    let output = resolve_output(&run.dir, run.output, &profile.output);
    let exclude = known_outputs(config, &output);
    let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();

    let paths = discover_inputs(&run.dir, &exclude).map_err(CliError::io)?;
    if paths.is_empty() {
        return Err(no_input(&run.dir));
    }
    let files = load_inputs(&paths).map_err(CliError::io)?;

    log::info!(
        "collating {} file(s) with profile '{profile_name}' ({} delimiter, {} policy)",
        files.len(),
        options.delimiter,
        options.policy
    );
    let report = collate(profile_name, &profile, &files, options)
        .map_err(|e| CliError::pipeline(e).with_hint(format!("{} was not written", output.display())))?;

    export(&report.table, &output).map_err(CliError::io)?;

    if run.json {
        print_json("collate", Some(output.as_path()), true, &report)?;
    }

    if !quiet {
        print_diagnostics(&report.diagnostics);
        eprintln!(
            "{profile_name}: {} row(s) from {} file(s), {} skipped -> {}",
            report.table.rows.len(),
            report.files.len(),
            report.diagnostics.len(),
            output.display(),
        );
    }

    check_skips(&report.diagnostics, run.fail_on_skip)
}
