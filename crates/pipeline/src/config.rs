use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Optional TOML configuration. Every section falls back to the defaults the
/// QuPath export layouts need.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub rename: RenameConfig,
    #[serde(default)]
    pub collate: CollateConfig,
    #[serde(default)]
    pub sum: SumConfig,
}

// ---------------------------------------------------------------------------
// Shared enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimiterMode {
    Tab,
    Comma,
    /// Choose tab or comma per file from its first lines.
    #[default]
    Detect,
    /// Split every line on both tab and comma, no quoting.
    Either,
}

impl std::fmt::Display for DelimiterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tab => write!(f, "tab"),
            Self::Comma => write!(f, "comma"),
            Self::Detect => write!(f, "detect"),
            Self::Either => write!(f, "either"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Skip malformed rows and files, recording a diagnostic for each.
    #[default]
    Lenient,
    /// Abort on the first malformed row or file.
    Strict,
}

impl std::fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rename
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameConfig {
    #[serde(default = "default_array_field")]
    pub array_field: String,
    #[serde(default = "default_name_field")]
    pub name_field: String,
    /// Require a literal `.ndpi` suffix instead of any character + `ndpi`.
    #[serde(default)]
    pub strict_extension: bool,
}

fn default_array_field() -> String {
    "images".into()
}

fn default_name_field() -> String {
    "imageName".into()
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            array_field: default_array_field(),
            name_field: default_name_field(),
            strict_extension: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Collate
// ---------------------------------------------------------------------------

/// Positional column selection with its output labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnProfile {
    pub columns: Vec<usize>,
    pub headers: Vec<String>,
    pub output: String,
}

impl ColumnProfile {
    /// Minimum number of fields a row needs to be projected.
    pub fn required_fields(&self) -> usize {
        self.columns.iter().copied().max().map_or(0, |c| c + 1)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollateConfig {
    #[serde(default)]
    pub delimiter: DelimiterMode,
    #[serde(default)]
    pub policy: MalformedPolicy,
    /// Extra profiles; a name matching a built-in replaces it.
    #[serde(default)]
    pub profiles: BTreeMap<String, ColumnProfile>,
}

pub const COLLAGEN: &str = "collagen";
pub const POSITIVE_CELLS: &str = "positive-cells";

/// Built-in profiles for the QuPath measurement exports.
pub fn builtin_profile(name: &str) -> Option<ColumnProfile> {
    let (columns, headers, output): (&[usize], &[&str], &str) = match name {
        COLLAGEN => (
            &[0, 4, 10, 12, 14, 15],
            &["Image", "Region", "Collagenarea_um2", "Whitespace_um2", "Other_um2", "Area_um2"],
            "Results.csv",
        ),
        POSITIVE_CELLS => (
            &[0, 2, 8, 10, 11, 12],
            &["Image", "Region", "Detections", "Positive_cells", "Positive_perc", "Cells_per_area"],
            "Results_positive_cell.csv",
        ),
        _ => return None,
    };
    Some(ColumnProfile {
        columns: columns.to_vec(),
        headers: headers.iter().map(|h| h.to_string()).collect(),
        output: output.to_string(),
    })
}

impl CollateConfig {
    /// Resolve a profile by name, configured profiles first.
    pub fn profile(&self, name: &str) -> Result<ColumnProfile, PipelineError> {
        self.profiles
            .get(name)
            .cloned()
            .or_else(|| builtin_profile(name))
            .ok_or_else(|| PipelineError::UnknownProfile(name.to_string()))
    }

    /// Built-in and configured profile names, sorted and deduplicated.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [COLLAGEN, POSITIVE_CELLS]
            .iter()
            .map(|s| s.to_string())
            .chain(self.profiles.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

// ---------------------------------------------------------------------------
// Sum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SumConfig {
    #[serde(default)]
    pub id_column: usize,
    #[serde(default = "default_value_column")]
    pub value_column: usize,
    #[serde(default = "default_sum_delimiter")]
    pub delimiter: DelimiterMode,
    /// Drop the first line of each file when it does not sum (a header).
    #[serde(default = "default_true")]
    pub skip_header: bool,
    #[serde(default = "default_sum_output")]
    pub output: String,
}

fn default_value_column() -> usize {
    13
}

fn default_sum_delimiter() -> DelimiterMode {
    DelimiterMode::Tab
}

fn default_true() -> bool {
    true
}

fn default_sum_output() -> String {
    "results.csv".into()
}

impl Default for SumConfig {
    fn default() -> Self {
        Self {
            id_column: 0,
            value_column: default_value_column(),
            delimiter: default_sum_delimiter(),
            skip_header: true,
            output: default_sum_output(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.rename.array_field.is_empty() || self.rename.name_field.is_empty() {
            return Err(PipelineError::ConfigValidation(
                "rename.array_field and rename.name_field must be non-empty".into(),
            ));
        }

        for (name, profile) in &self.collate.profiles {
            validate_profile(name, profile)?;
        }

        if self.sum.id_column == self.sum.value_column {
            return Err(PipelineError::ConfigValidation(format!(
                "sum.id_column and sum.value_column are both {}",
                self.sum.id_column
            )));
        }
        if self.sum.output.is_empty() {
            return Err(PipelineError::ConfigValidation("sum.output must be non-empty".into()));
        }

        Ok(())
    }
}

pub fn validate_profile(name: &str, profile: &ColumnProfile) -> Result<(), PipelineError> {
    let invalid = |msg: String| PipelineError::ConfigValidation(format!("profile '{name}': {msg}"));

    if profile.columns.is_empty() {
        return Err(invalid("at least one column is required".into()));
    }
    if profile.columns.len() != profile.headers.len() {
        return Err(invalid(format!(
            "{} column(s) but {} header(s)",
            profile.columns.len(),
            profile.headers.len()
        )));
    }
    let mut seen = HashSet::new();
    for header in &profile.headers {
        if header.is_empty() {
            return Err(invalid("empty header name".into()));
        }
        if !seen.insert(header.as_str()) {
            return Err(invalid(format!("duplicate header '{header}'")));
        }
    }
    if profile.output.is_empty() {
        return Err(invalid("output must be non-empty".into()));
    }
    Ok(())
}
