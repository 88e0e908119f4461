use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    /// Project document is not a JSON object.
    Document(String),
    /// Configured array field is absent or not an array.
    MissingArray(String),
    /// An array element has no string name field.
    MissingName { index: usize, field: String },
    /// Row rejected under the strict malformed-row policy.
    MalformedRow { file: String, line: u64, detail: String },
    /// File could not be tokenized under the chosen delimiter mode.
    UnparseableFile { file: String, detail: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (header/column mismatch, etc.).
    ConfigValidation(String),
    /// Collate profile name not built in and not configured.
    UnknownProfile(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document(msg) => write!(f, "malformed project document: {msg}"),
            Self::MissingArray(field) => {
                write!(f, "project document has no array field '{field}'")
            }
            Self::MissingName { index, field } => {
                write!(f, "element {index} has no string field '{field}'")
            }
            Self::MalformedRow { file, line, detail } => {
                write!(f, "{file}:{line}: {detail}")
            }
            Self::UnparseableFile { file, detail } => {
                write!(f, "{file}: cannot parse: {detail}")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownProfile(name) => write!(f, "unknown collate profile: {name}"),
        }
    }
}

impl std::error::Error for PipelineError {}
