//! Image-name normalization for QuPath project documents.
//!
//! Scanner file names look like `2023.03.03-SR149206_07_CD_CD20.ndpi`
//! (date, bioresource code, slide number, stain, condition). Projects are
//! easier to merge when every image is keyed by `<code>_<condition>` only,
//! so the rewrite keeps groups 2 and 5.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::RenameConfig;
use crate::error::PipelineError;
use crate::model::{Rename, RenameReport};

/// Any single character before `ndpi` is accepted, matching names exported
/// with a mangled extension separator.
const PERMISSIVE_PATTERN: &str = r"([^-]+)-([^_]+)_([^_]+)_([^_]+)_([^.]+).ndpi";
const LITERAL_PATTERN: &str = r"([^-]+)-([^_]+)_([^_]+)_([^_]+)_([^.]+)\.ndpi";
const REPLACEMENT: &str = "${2}_${5}";

static PERMISSIVE: Lazy<Regex> = Lazy::new(|| Regex::new(PERMISSIVE_PATTERN).unwrap());
static LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(LITERAL_PATTERN).unwrap());

#[derive(Debug, Clone, Copy)]
pub struct NameRule {
    pattern: &'static Regex,
}

impl NameRule {
    pub fn new(strict_extension: bool) -> Self {
        let pattern = if strict_extension { &*LITERAL } else { &*PERMISSIVE };
        Self { pattern }
    }

    /// Replace every match in `name`; names without a match come back borrowed.
    pub fn normalize<'a>(&self, name: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(name, REPLACEMENT)
    }
}

impl Default for NameRule {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Rewrite every image name in `doc` in place.
///
/// The document shape is checked before anything is mutated, so an error
/// leaves `doc` untouched.
pub fn rename_document(doc: &mut Value, config: &RenameConfig) -> Result<RenameReport, PipelineError> {
    let rule = NameRule::new(config.strict_extension);

    let root = doc
        .as_object_mut()
        .ok_or_else(|| PipelineError::Document("top-level value is not an object".into()))?;
    let items = root
        .get_mut(&config.array_field)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| PipelineError::MissingArray(config.array_field.clone()))?;

    for (index, item) in items.iter().enumerate() {
        if !item.get(&config.name_field).is_some_and(Value::is_string) {
            return Err(PipelineError::MissingName {
                index,
                field: config.name_field.clone(),
            });
        }
    }

    let mut report = RenameReport::default();
    for (index, item) in items.iter_mut().enumerate() {
        let Some(Value::String(name)) = item.get_mut(&config.name_field) else {
            continue;
        };
        let renamed = match rule.normalize(name.as_str()) {
            Cow::Owned(new_name) if new_name != *name => new_name,
            _ => {
                report.unchanged += 1;
                continue;
            }
        };
        log::debug!("image {index}: '{name}' -> '{renamed}'");
        report.renamed.push(Rename {
            index,
            from: std::mem::replace(name, renamed.clone()),
            to: renamed,
        });
    }

    log::info!(
        "renamed {} image(s), {} unchanged",
        report.renamed.len(),
        report.unchanged
    );
    Ok(report)
}
