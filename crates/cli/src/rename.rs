//! `qpcollate rename`: shorten image names inside a QuPath project.

use std::path::PathBuf;

use qpcollate_io::json::{load_document, save_document};
use qpcollate_pipeline::{rename_document, PipelineConfig};

use crate::report::print_json;
use crate::CliError;

pub fn cmd_rename(
    config: &PipelineConfig,
    project: PathBuf,
    strict_extension: bool,
    dry_run: bool,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let mut rename_config = config.rename.clone();
    rename_config.strict_extension |= strict_extension;

    let mut doc = load_document(&project).map_err(CliError::io)?;
    let report = rename_document(&mut doc, &rename_config)
        .map_err(|e| CliError::pipeline(e).with_hint(format!("{} was not modified", project.display())))?;

    // An unchanged project is left byte-for-byte as it was.
    let written = !dry_run && !report.is_noop();
    if written {
        save_document(&doc, &project).map_err(CliError::io)?;
    }

    if json {
        print_json("rename", Some(project.as_path()), written, &report)?;
    }

    if !quiet {
        for rename in &report.renamed {
            eprintln!("  {} -> {}", rename.from, rename.to);
        }
        let verb = if dry_run { "would rename" } else { "renamed" };
        eprintln!(
            "{verb} {} image(s), {} unchanged in {}",
            report.renamed.len(),
            report.unchanged,
            project.display(),
        );
    }

    Ok(())
}
