//! Convert Hub - file conversion service
//!
//! Accepts an uploaded file plus a tool slug, dispatches the job to the matching converter,
//! records a per-job status file and serves the converted result for download.

pub mod api;
pub mod catalog;
pub mod config;
pub mod converters;
pub mod error;
pub mod jobs;
pub mod processing;
pub mod state;

// Re-export main types for easy access
pub use crate::catalog::{Category, ToolCatalog, ToolDefinition};
pub use crate::config::{Config, ConfigBuilder, ExecutionMode};
pub use crate::converters::{ConversionOutput, ConvertError, Converter, ConverterRegistry};
pub use crate::error::ServiceError;
pub use crate::jobs::{ConversionJob, JobId, JobState, JobStatus};
pub use crate::processing::{ConversionService, Download, JobSummary, Upload};
pub use crate::state::JobStore;
