// QuPath project documents (project.qpproj)

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::atomic::write_atomic;
use crate::error::IoError;

const INDENT: &[u8] = b"    ";

/// Parse a project document. Key order and numeric text are kept as written.
pub fn load_document(path: &Path) -> Result<Value, IoError> {
    let raw = std::fs::read_to_string(path).map_err(|e| IoError::read(path, e))?;
    serde_json::from_str(&raw).map_err(|e| IoError::Json {
        path: path.display().to_string(),
        msg: e.to_string(),
    })
}

/// Pretty-print with a 4-space indent; non-ASCII text is written literally.
pub fn to_pretty_string(doc: &Value) -> Result<String, String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    doc.serialize(&mut ser).map_err(|e| e.to_string())?;
    String::from_utf8(buf).map_err(|e| e.to_string())
}

/// Replace the document at `path` atomically.
pub fn save_document(doc: &Value, path: &Path) -> Result<(), IoError> {
    let text = to_pretty_string(doc).map_err(|msg| IoError::write(path, msg))?;
    write_atomic(path, |out| out.write_all(text.as_bytes()).map_err(|e| e.to_string()))
}
