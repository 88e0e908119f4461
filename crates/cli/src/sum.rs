//! `qpcollate sum`: total one measurement column per image across tables.

use qpcollate_io::csv::{discover_inputs, export, load_inputs};
use qpcollate_pipeline::{sum_grouped, PipelineConfig};

use crate::report::{check_skips, known_outputs, no_input, print_diagnostics, print_json, resolve_output};
use crate::{CliError, DelimiterArg, RunArgs};

pub fn cmd_sum(
    config: &PipelineConfig,
    run: RunArgs,
    id_column: Option<usize>,
    value_column: Option<usize>,
    delimiter: Option<DelimiterArg>,
    no_header: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let mut sum_config = config.sum.clone();
    if let Some(col) = id_column {
        sum_config.id_column = col;
    }
    if let Some(col) = value_column {
        sum_config.value_column = col;
    }
    if let Some(delimiter) = delimiter {
        sum_config.delimiter = delimiter.into();
    }
    if no_header {
        sum_config.skip_header = false;
    }
    if sum_config.id_column == sum_config.value_column {
        return Err(CliError::args(format!(
            "--id-column and --value-column are both {}",
            sum_config.id_column
        )));
    }

    let output = resolve_output(&run.dir, run.output, &sum_config.output);
    let exclude = known_outputs(config, &output);
    let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();

    let paths = discover_inputs(&run.dir, &exclude).map_err(CliError::io)?;
    if paths.is_empty() {
        return Err(no_input(&run.dir));
    }
    let files = load_inputs(&paths).map_err(CliError::io)?;

    log::info!(
        "summing column {} by column {} over {} file(s)",
        sum_config.value_column,
        sum_config.id_column,
        files.len()
    );
    let report = sum_grouped(&files, &sum_config);

    export(&report.to_table(), &output).map_err(CliError::io)?;

    if run.json {
        print_json("sum", Some(output.as_path()), true, &report)?;
    }

    if !quiet {
        print_diagnostics(&report.diagnostics);
        eprintln!(
            "summed {} row(s) into {} identifier(s) from {} file(s), {} skipped -> {}",
            report.rows_summed,
            report.totals.len(),
            report.files,
            report.diagnostics.len(),
            output.display(),
        );
    }

    check_skips(&report.diagnostics, run.fail_on_skip)
}
