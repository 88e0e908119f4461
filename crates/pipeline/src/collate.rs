use crate::config::{ColumnProfile, DelimiterMode, MalformedPolicy};
use crate::error::PipelineError;
use crate::model::{CollateReport, Diagnostic, DiagnosticKind, FileSummary, InputFile, Table};
use crate::table::parse_records;

/// How input files are tokenized and what happens to malformed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollateOptions {
    pub delimiter: DelimiterMode,
    pub policy: MalformedPolicy,
}

/// Project every data row of every file through `profile` and concatenate.
///
/// Files are consumed in slice order; the first record of each file is its
/// header and is never emitted. Values are copied verbatim.
pub fn collate(
    profile_name: &str,
    profile: &ColumnProfile,
    files: &[InputFile],
    options: CollateOptions,
) -> Result<CollateReport, PipelineError> {
    let required = profile.required_fields();
    let mut report = CollateReport {
        profile: profile_name.to_string(),
        table: Table::new(profile.headers.clone()),
        files: Vec::with_capacity(files.len()),
        diagnostics: Vec::new(),
    };

    for file in files {
        let parsed = parse_records(&file.content, options.delimiter).and_then(|(mode, records)| {
            let header_width = records.first().map(|header| header.fields.len());
            match header_width {
                Some(width) if width < required => Err(format!(
                    "header has {width} field(s) with {mode} delimiter, profile needs {required}"
                )),
                _ => Ok((mode, records)),
            }
        });

        let (mode, records) = match parsed {
            Ok(parsed) => parsed,
            Err(detail) => {
                if options.policy == MalformedPolicy::Strict {
                    return Err(PipelineError::UnparseableFile {
                        file: file.name.clone(),
                        detail,
                    });
                }
                log::warn!("{}: skipped: {detail}", file.name);
                report.diagnostics.push(Diagnostic {
                    file: file.name.clone(),
                    line: 0,
                    kind: DiagnosticKind::UnparseableFile { detail },
                });
                continue;
            }
        };

        let mut summary = FileSummary {
            file: file.name.clone(),
            delimiter: mode.to_string(),
            rows: 0,
            skipped: 0,
        };

        for record in records.iter().skip(1) {
            if record.fields.len() < required {
                if options.policy == MalformedPolicy::Strict {
                    return Err(PipelineError::MalformedRow {
                        file: file.name.clone(),
                        line: record.line,
                        detail: format!(
                            "expected at least {required} fields, found {}",
                            record.fields.len()
                        ),
                    });
                }
                let diagnostic = Diagnostic {
                    file: file.name.clone(),
                    line: record.line,
                    kind: DiagnosticKind::MissingField {
                        required,
                        found: record.fields.len(),
                    },
                };
                log::debug!("{diagnostic}");
                report.diagnostics.push(diagnostic);
                summary.skipped += 1;
                continue;
            }

            let row = profile
                .columns
                .iter()
                .map(|&col| record.fields[col].clone())
                .collect();
            report.table.rows.push(row);
            summary.rows += 1;
        }

        log::debug!(
            "{}: {} row(s), {} skipped ({} delimiter)",
            summary.file,
            summary.rows,
            summary.skipped,
            summary.delimiter
        );
        report.files.push(summary);
    }

    log::info!(
        "collated {} row(s) from {} file(s) with profile '{}', {} diagnostic(s)",
        report.table.rows.len(),
        report.files.len(),
        profile_name,
        report.diagnostics.len()
    );
    Ok(report)
}
