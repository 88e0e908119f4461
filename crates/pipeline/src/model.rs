use indexmap::IndexMap;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One delimited text file, already read into memory.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Display name used in diagnostics (usually the file name).
    pub name: String,
    pub content: String,
}

impl InputFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Row had fewer fields than the highest required column.
    MissingField { required: usize, found: usize },
    /// Value at `column` did not parse as a number.
    NonNumeric { column: usize, value: String },
    /// Whole file skipped.
    UnparseableFile { detail: String },
}

/// A skipped row (or file, with `line == 0`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u64,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::MissingField { required, found } => write!(
                f,
                "{}:{}: expected at least {required} fields, found {found}",
                self.file, self.line
            ),
            DiagnosticKind::NonNumeric { column, value } => write!(
                f,
                "{}:{}: column {column} is not numeric: '{value}'",
                self.file, self.line
            ),
            DiagnosticKind::UnparseableFile { detail } => {
                write!(f, "{}: file skipped: {detail}", self.file)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output tables
// ---------------------------------------------------------------------------

/// Header row plus data rows, every row as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rename {
    pub index: usize,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenameReport {
    pub renamed: Vec<Rename>,
    pub unchanged: usize,
}

impl RenameReport {
    pub fn is_noop(&self) -> bool {
        self.renamed.is_empty()
    }
}

/// Per-file row counts for a collate run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub file: String,
    /// Delimiter actually used, as a display string (`tab`, `comma`, `either`).
    pub delimiter: String,
    pub rows: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollateReport {
    pub profile: String,
    pub table: Table,
    pub files: Vec<FileSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SumReport {
    /// Identifier → total, in first-seen order.
    pub totals: IndexMap<String, f64>,
    pub files: usize,
    pub rows_summed: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl SumReport {
    /// Render totals as the two-column summary table.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(vec!["ID".to_string(), "Result of Sum".to_string()]);
        for (id, total) in &self.totals {
            table.rows.push(vec![id.clone(), format_total(*total)]);
        }
        table
    }
}

/// Shortest round-trip float text, always with a fractional part for finite
/// integral values (`12.0`, `0.30000000000000004`).
///
/// Exponents have no sign or zero padding: `1e16` and `1e-5`, where Python's
/// `repr` writes `1e+16` and `1e-05`. Readers parsing the summary as floats
/// see the same values either way.
pub fn format_total(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_total_keeps_fraction() {
        assert_eq!(format_total(12.0), "12.0");
        assert_eq!(format_total(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_total(-3.5), "-3.5");
        assert_eq!(format_total(f64::NAN), "nan");
        assert_eq!(format_total(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn format_total_exponent_form() {
        assert_eq!(format_total(1e16), "1e16");
        assert_eq!(format_total(1e-5), "1e-5");
        assert_eq!(format_total(1234.5e10), "12345000000000.0");
    }

    #[test]
    fn sum_table_first_seen_order() {
        let mut report = SumReport::default();
        report.totals.insert("b".into(), 2.0);
        report.totals.insert("a".into(), 1.5);
        let table = report.to_table();
        assert_eq!(table.headers, vec!["ID", "Result of Sum"]);
        assert_eq!(table.rows[0], vec!["b", "2.0"]);
        assert_eq!(table.rows[1], vec!["a", "1.5"]);
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic {
            file: "a.csv".into(),
            line: 4,
            kind: DiagnosticKind::MissingField { required: 16, found: 3 },
        };
        assert_eq!(d.to_string(), "a.csv:4: expected at least 16 fields, found 3");
    }
}
