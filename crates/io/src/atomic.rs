// Write-then-rename so a failed run never leaves a truncated output behind

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::IoError;

/// Sibling temp path: `Results.csv` → `Results.csv.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Run `write` against a temp file, then rename it over `path`.
///
/// On any failure the temp file is removed and `path` is left as it was.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<(), IoError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), String>,
{
    let tmp_path = temp_path(path);

    let result = File::create(&tmp_path)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush().map_err(|e| e.to_string())?;
            let file = writer.into_inner().map_err(|e| e.to_string())?;
            file.sync_all().map_err(|e| e.to_string())
        });

    if let Err(msg) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(IoError::write(path, msg));
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        IoError::write(path, format!("failed to rename temp file: {e}"))
    })?;

    log::debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(temp_path(Path::new("/x/Results.csv")), PathBuf::from("/x/Results.csv.tmp"));
        assert_eq!(temp_path(Path::new("project.qpproj")), PathBuf::from("project.qpproj.tmp"));
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, |w| w.write_all(b"new").map_err(|e| e.to_string())).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn failure_keeps_original() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "old").unwrap();

        let err = write_atomic(&path, |w| {
            w.write_all(b"partial").map_err(|e| e.to_string())?;
            Err("boom".to_string())
        })
        .unwrap_err();

        assert!(err.to_string().contains("boom"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert!(!temp_path(&path).exists());
    }
}
