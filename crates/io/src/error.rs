use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum IoError {
    /// Input file could not be read.
    Read { path: String, msg: String },
    /// Output could not be written or moved into place.
    Write { path: String, msg: String },
    /// Input directory could not be listed.
    Discover { dir: String, msg: String },
    /// Project document is not valid JSON.
    Json { path: String, msg: String },
}

impl IoError {
    pub(crate) fn read(path: &Path, msg: impl fmt::Display) -> Self {
        Self::Read { path: path.display().to_string(), msg: msg.to_string() }
    }

    pub(crate) fn write(path: &Path, msg: impl fmt::Display) -> Self {
        Self::Write { path: path.display().to_string(), msg: msg.to_string() }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, msg } => write!(f, "cannot read {path}: {msg}"),
            Self::Write { path, msg } => write!(f, "cannot write {path}: {msg}"),
            Self::Discover { dir, msg } => write!(f, "cannot list {dir}: {msg}"),
            Self::Json { path, msg } => write!(f, "{path}: invalid JSON: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}
