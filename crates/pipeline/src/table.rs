// Delimited text tokenizing

use crate::config::DelimiterMode;

/// One non-blank line of a delimited file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line number in the source file.
    pub line: u64,
    pub fields: Vec<String>,
}

/// Detect tab or comma by checking consistency across the first few lines.
///
/// For each candidate, count fields per line. The candidate with the most
/// consistent field count (>1 field on the first line) wins; tab wins ties.
pub fn detect_delimiter(content: &str) -> Option<u8> {
    let candidates: &[u8] = &[b'\t', b','];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.is_empty())
        .take(10)
        .collect();

    let mut best = None;
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = Some(delim);
        }
    }

    best
}

/// Resolve `Detect` to a concrete mode for this content.
pub fn resolve_mode(content: &str, mode: DelimiterMode) -> Result<DelimiterMode, String> {
    match mode {
        DelimiterMode::Detect => match detect_delimiter(content) {
            Some(b'\t') => Ok(DelimiterMode::Tab),
            Some(_) => Ok(DelimiterMode::Comma),
            None if content.trim().is_empty() => Ok(DelimiterMode::Tab),
            None => Err("no tab or comma delimiter found".to_string()),
        },
        other => Ok(other),
    }
}

/// Tokenize `content` into records. Blank lines are dropped.
///
/// Returns the concrete mode used alongside the records.
pub fn parse_records(content: &str, mode: DelimiterMode) -> Result<(DelimiterMode, Vec<Record>), String> {
    let mode = resolve_mode(content, mode)?;
    let records = match mode {
        DelimiterMode::Tab => parse_quoted(content, b'\t')?,
        DelimiterMode::Comma => parse_quoted(content, b',')?,
        DelimiterMode::Either => split_either(content),
        DelimiterMode::Detect => unreachable!("resolved above"),
    };
    Ok((mode, records))
}

fn parse_quoted(content: &str, delimiter: u8) -> Result<Vec<Record>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        if record.len() == 1 && record.get(0) == Some("") {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        records.push(Record {
            line,
            fields: record.iter().map(|f| f.to_string()).collect(),
        });
    }
    Ok(records)
}

// Tab and comma are both separators; quotes are ordinary characters.
fn split_either(content: &str) -> Vec<Record> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| Record {
            line: idx as u64 + 1,
            fields: line
                .split(|c: char| c == '\t' || c == ',')
                .map(|f| f.to_string())
                .collect(),
        })
        .collect()
}
