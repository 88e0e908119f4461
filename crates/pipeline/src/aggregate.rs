use indexmap::IndexMap;

use crate::config::SumConfig;
use crate::model::{Diagnostic, DiagnosticKind, InputFile, SumReport};
use crate::table::{parse_records, Record};

/// Sum `value_column` grouped by `id_column` across every file.
///
/// Totals keep first-seen identifier order. Rows with a missing column or a
/// non-numeric value are skipped individually and reported; an unparseable
/// file is skipped whole and not counted in `files`. With `skip_header`, the
/// first line of a file is dropped only if it does not sum. Never fails.
pub fn sum_grouped(files: &[InputFile], config: &SumConfig) -> SumReport {
    let mut totals: IndexMap<String, f64> = IndexMap::new();
    let mut report = SumReport::default();
    let required = config.id_column.max(config.value_column) + 1;

    for file in files {
        let records = match parse_records(&file.content, config.delimiter) {
            Ok((_, records)) => records,
            Err(detail) => {
                log::warn!("{}: skipped: {detail}", file.name);
                report.diagnostics.push(Diagnostic {
                    file: file.name.clone(),
                    line: 0,
                    kind: DiagnosticKind::UnparseableFile { detail },
                });
                continue;
            }
        };

        let mut rows = records.iter().peekable();
        if config.skip_header {
            // A first line that already sums cleanly is data, not a header.
            if let Some(header) = rows.next_if(|record| row_value(record, config).is_none()) {
                log::debug!("{}:{}: treated as header", file.name, header.line);
            }
        }

        report.files += 1;
        let mut summed = 0usize;
        for record in rows {
            let kind = match (record.fields.get(config.id_column), record.fields.get(config.value_column)) {
                (Some(id), Some(raw)) => match parse_value(raw) {
                    Some(value) => {
                        *totals.entry(id.clone()).or_insert(0.0) += value;
                        summed += 1;
                        continue;
                    }
                    None => DiagnosticKind::NonNumeric {
                        column: config.value_column,
                        value: raw.clone(),
                    },
                },
                _ => DiagnosticKind::MissingField {
                    required,
                    found: record.fields.len(),
                },
            };
            let diagnostic = Diagnostic {
                file: file.name.clone(),
                line: record.line,
                kind,
            };
            log::debug!("{diagnostic}");
            report.diagnostics.push(diagnostic);
        }

        log::debug!("{}: summed {summed} row(s)", file.name);
        report.rows_summed += summed;
    }

    log::info!(
        "summed {} row(s) into {} identifier(s) from {} file(s), {} skipped",
        report.rows_summed,
        totals.len(),
        report.files,
        report.diagnostics.len()
    );
    report.totals = totals;
    report
}

fn row_value(record: &Record, config: &SumConfig) -> Option<f64> {
    record.fields.get(config.id_column)?;
    parse_value(record.fields.get(config.value_column)?)
}

/// Parse a measurement value: surrounding whitespace ignored, exponents and
/// `inf`/`nan` accepted.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, value: &str) -> String {
        let mut fields: Vec<String> = (0..14).map(|i| format!("f{i}")).collect();
        fields[0] = id.to_string();
        fields[13] = value.to_string();
        fields.join("\t")
    }

    fn file(name: &str, rows: &[(&str, &str)]) -> InputFile {
        let header: Vec<String> = (0..14).map(|i| format!("Col {i}")).collect();
        let mut content = header.join("\t");
        content.push('\n');
        for (id, value) in rows {
            content.push_str(&row(id, value));
            content.push('\n');
        }
        InputFile::new(name, content)
    }

    #[test]
    fn sums_across_files_in_first_seen_order() {
        let files = vec![
            file("a.csv", &[("s2", "1.5"), ("s1", "2"), ("s2", "0.5")]),
            file("b.csv", &[("s1", "3"), ("s3", "4e1")]),
        ];
        let report = sum_grouped(&files, &SumConfig::default());
        let ids: Vec<&str> = report.totals.keys().map(|k| k.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s1", "s3"]);
        assert!((report.totals["s2"] - 2.0).abs() < 1e-9);
        assert!((report.totals["s1"] - 5.0).abs() < 1e-9);
        assert!((report.totals["s3"] - 40.0).abs() < 1e-9);
        assert_eq!(report.rows_summed, 5);
        assert_eq!(report.files, 2);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn non_numeric_and_short_rows_skipped() {
        let mut f = file("a.csv", &[("s1", "10"), ("s1", "n/a"), ("s2", "")]);
        f.content.push_str("s1\tonly-two\n");
        let report = sum_grouped(&[f], &SumConfig::default());

        assert_eq!(report.totals.len(), 1);
        assert!((report.totals["s1"] - 10.0).abs() < 1e-9);
        assert!(!report.totals.contains_key("s2"));
        assert_eq!(report.diagnostics.len(), 3);
        assert_eq!(
            report.diagnostics[0].kind,
            DiagnosticKind::NonNumeric { column: 13, value: "n/a".into() }
        );
        assert_eq!(report.diagnostics[0].line, 3);
        assert_eq!(
            report.diagnostics[2].kind,
            DiagnosticKind::MissingField { required: 14, found: 2 }
        );
    }

    #[test]
    fn header_counted_when_not_skipped() {
        let config = SumConfig {
            skip_header: false,
            ..Default::default()
        };
        let report = sum_grouped(&[file("a.csv", &[("s1", "1")])], &config);
        assert_eq!(report.rows_summed, 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line, 1);
    }

    #[test]
    fn headerless_file_keeps_first_row() {
        let content = format!("{}\n{}\n", row("s1", "2"), row("s1", "3"));
        let report = sum_grouped(&[InputFile::new("a.csv", content)], &SumConfig::default());
        assert_eq!(report.rows_summed, 2);
        assert!((report.totals["s1"] - 5.0).abs() < 1e-9);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn short_header_line_skipped_silently() {
        let report = sum_grouped(
            &[InputFile::new("a.csv", format!("Image\tArea\n{}\n", row("s1", "4")))],
            &SumConfig::default(),
        );
        assert_eq!(report.rows_summed, 1);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn unparseable_file_not_counted() {
        let files = vec![
            file("a.csv", &[("s1", "1")]),
            InputFile::new("notes.csv", "just one column\nmore text\n"),
        ];
        let config = SumConfig {
            delimiter: crate::config::DelimiterMode::Detect,
            ..Default::default()
        };
        let report = sum_grouped(&files, &config);
        assert_eq!(report.files, 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line, 0);
    }

    #[test]
    fn custom_columns_and_delimiter() {
        let config = SumConfig {
            id_column: 1,
            value_column: 2,
            delimiter: crate::config::DelimiterMode::Comma,
            ..Default::default()
        };
        let files = vec![InputFile::new("a.csv", "x,id,v\n1,a, 2.5 \n2,a,0.25\n")];
        let report = sum_grouped(&files, &config);
        assert!((report.totals["a"] - 2.75).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_empty_report() {
        let report = sum_grouped(&[], &SumConfig::default());
        assert!(report.totals.is_empty());
        assert_eq!(report.files, 0);
    }

    #[test]
    fn parse_value_accepts_float_syntax() {
        assert_eq!(parse_value(" 12.5 "), Some(12.5));
        assert_eq!(parse_value("1e3"), Some(1000.0));
        assert!(parse_value("nan").is_some_and(f64::is_nan));
        assert_eq!(parse_value("12,5"), None);
        assert_eq!(parse_value(""), None);
    }
}
