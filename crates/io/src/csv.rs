// Measurement table discovery, loading and export

use std::io::Read;
use std::path::{Path, PathBuf};

use qpcollate_pipeline::{InputFile, Table};

use crate::atomic::write_atomic;
use crate::error::IoError;

/// Every `*.csv` directly inside `dir`, sorted by name, skipping any whose
/// file name is in `exclude` (typically the run's own output).
pub fn discover_inputs(dir: &Path, exclude: &[&str]) -> Result<Vec<PathBuf>, IoError> {
    let discover_err = |msg: String| IoError::Discover {
        dir: dir.display().to_string(),
        msg,
    };

    if !dir.is_dir() {
        return Err(discover_err("not a directory".into()));
    }
    let dir_str = dir
        .to_str()
        .ok_or_else(|| discover_err("path is not valid UTF-8".into()))?;
    let pattern = format!("{}/*.csv", glob::Pattern::escape(dir_str));

    let mut paths = Vec::new();
    // Hidden files (macOS `._name.csv` resource forks) are not measurement tables
    let options = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    for entry in glob::glob_with(&pattern, options).map_err(|e| discover_err(e.to_string()))? {
        let path = entry.map_err(|e| discover_err(e.to_string()))?;
        if !path.is_file() {
            continue;
        }
        let excluded = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| exclude.contains(&name));
        if excluded {
            log::debug!("ignoring output file {}", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    log::debug!("found {} input file(s) in {}", paths.len(), dir.display());
    Ok(paths)
}

/// Read each path into an [`InputFile`] named by its file name.
pub fn load_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>, IoError> {
    paths
        .iter()
        .map(|path| {
            let content = read_file_as_utf8(path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(InputFile::new(name, content))
        })
        .collect()
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
///
/// A leading byte-order mark is dropped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-edited CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Write `table` as comma-separated text with one header row and no index
/// column. Lines end in `\n`, not `\r\n`. The file is replaced atomically.
pub fn export(table: &Table, path: &Path) -> Result<(), IoError> {
    write_atomic(path, |out| {
        let mut writer = csv::WriterBuilder::new().delimiter(b',').from_writer(out);
        writer.write_record(&table.headers).map_err(|e| e.to_string())?;
        for row in &table.rows {
            writer.write_record(row).map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discovers_sorted_csv_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "x").unwrap();
        fs::write(dir.path().join("a.csv"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("Results.csv"), "x").unwrap();
        fs::write(dir.path().join("._a.csv"), b"\x00\x05\x16\x07").unwrap();
        fs::write(dir.path().join(".hidden.csv"), "x").unwrap();
        fs::create_dir(dir.path().join("sub.csv")).unwrap();

        let paths = discover_inputs(dir.path(), &["Results.csv"]).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn missing_dir_is_error() {
        let dir = tempdir().unwrap();
        let err = discover_inputs(&dir.path().join("nope"), &[]).unwrap_err();
        assert!(matches!(err, IoError::Discover { .. }));
    }

    #[test]
    fn windows_1252_and_bom_decoded() {
        let dir = tempdir().unwrap();
        let latin = dir.path().join("latin.csv");
        // "Area µm^2" with µ as 0xB5
        fs::write(&latin, b"Area \xb5m^2\n").unwrap();
        assert_eq!(read_file_as_utf8(&latin).unwrap(), "Area \u{b5}m^2\n");

        let bom = dir.path().join("bom.csv");
        fs::write(&bom, "\u{feff}Image\tArea\n").unwrap();
        assert_eq!(read_file_as_utf8(&bom).unwrap(), "Image\tArea\n");
    }

    #[test]
    fn load_inputs_uses_file_names() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "h\n1\n").unwrap();
        let paths = discover_inputs(dir.path(), &[]).unwrap();
        let files = load_inputs(&paths).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.csv");
        assert_eq!(files[0].content, "h\n1\n");
    }

    #[test]
    fn export_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Results.csv");
        let mut table = Table::new(vec!["Image".into(), "Region".into()]);
        table.rows.push(vec!["SR1_CD3".into(), "Cortex, inner".into()]);
        table.rows.push(vec!["SR2_CD3".into(), "Medulla".into()]);

        export(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Image,Region\nSR1_CD3,\"Cortex, inner\"\nSR2_CD3,Medulla\n");

        let mut reader = csv::ReaderBuilder::new().from_reader(content.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get(1), Some("Cortex, inner"));
    }

    #[test]
    fn export_header_only_for_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        export(&Table::new(vec!["ID".into(), "Result of Sum".into()]), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "ID,Result of Sum\n");
    }
}
