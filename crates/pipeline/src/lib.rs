//! `qpcollate-pipeline`: transforms behind the QuPath annotation utilities.
//!
//! Pure engine crate: receives project documents and pre-loaded delimited
//! files, returns reports. No filesystem access.

pub mod aggregate;
pub mod collate;
pub mod config;
pub mod error;
pub mod model;
pub mod rename;
pub mod table;

pub use aggregate::sum_grouped;
pub use collate::{collate, CollateOptions};
pub use config::{ColumnProfile, DelimiterMode, MalformedPolicy, PipelineConfig};
pub use error::PipelineError;
pub use model::{CollateReport, Diagnostic, DiagnosticKind, InputFile, RenameReport, SumReport, Table};
pub use rename::{rename_document, NameRule};
