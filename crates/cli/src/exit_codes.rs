//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; batch scripts rely on them.
//!
//! | Code | Description                                          |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, unknown profile)              |
//! | 3    | IO error (read, write, directory listing)            |
//! | 4    | Malformed input (project document, strict tables)    |
//! | 5    | Invalid configuration file                           |
//! | 6    | Rows were skipped and `--fail-on-skip` was given     |
//! | 7    | No input files found                                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use qpcollate_io::IoError;
use qpcollate_pipeline::PipelineError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown collate profile.
pub const EXIT_USAGE: u8 = 2;

/// Input could not be read or output could not be written.
pub const EXIT_IO: u8 = 3;

/// Project document or (strict mode) measurement table is malformed.
/// Nothing is written.
pub const EXIT_MALFORMED: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG: u8 = 5;

/// Output was written, but some rows or files were skipped.
/// Only returned with `--fail-on-skip`.
pub const EXIT_ROWS_SKIPPED: u8 = 6;

/// Input directory contains no `.csv` files.
pub const EXIT_NO_INPUT: u8 = 7;

/// Map a pipeline error to its exit code.
pub fn pipeline_exit_code(err: &PipelineError) -> u8 {
    match err {
        PipelineError::Document(_)
        | PipelineError::MissingArray(_)
        | PipelineError::MissingName { .. }
        | PipelineError::MalformedRow { .. }
        | PipelineError::UnparseableFile { .. } => EXIT_MALFORMED,
        PipelineError::ConfigParse(_) | PipelineError::ConfigValidation(_) => EXIT_CONFIG,
        PipelineError::UnknownProfile(_) => EXIT_USAGE,
    }
}

/// Map an IO error to its exit code. Invalid JSON is malformed input, not IO.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Json { .. } => EXIT_MALFORMED,
        IoError::Read { .. } | IoError::Write { .. } | IoError::Discover { .. } => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_document_codes() {
        assert_eq!(pipeline_exit_code(&PipelineError::MissingArray("images".into())), EXIT_MALFORMED);
        assert_eq!(
            io_exit_code(&IoError::Json { path: "p".into(), msg: "eof".into() }),
            EXIT_MALFORMED
        );
        assert_eq!(
            io_exit_code(&IoError::Read { path: "p".into(), msg: "denied".into() }),
            EXIT_IO
        );
    }

    #[test]
    fn config_and_usage_codes() {
        assert_eq!(pipeline_exit_code(&PipelineError::ConfigParse("x".into())), EXIT_CONFIG);
        assert_eq!(pipeline_exit_code(&PipelineError::UnknownProfile("x".into())), EXIT_USAGE);
    }
}
