//! Job data model: identifiers, conversion jobs and persisted status records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::catalog::ToolDefinition;
use crate::state::is_reserved_name;

/// Opaque job identifier (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single conversion request, fixed once built
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub job_id: JobId,
    pub tool_slug: &'static str,
    /// Uploaded file on disk
    pub source_path: PathBuf,
    /// Name the client uploaded the file under
    pub source_filename: String,
    /// Name of the file the converter writes next to the source
    pub target_filename: String,
    pub target_extension: &'static str,
    /// Dispatch registry key
    pub converter: &'static str,
    pub created_at: DateTime<Utc>,
}

impl ConversionJob {
    pub fn new(
        job_id: JobId,
        source_path: PathBuf,
        source_filename: impl Into<String>,
        tool: &'static ToolDefinition,
    ) -> Self {
        let source_filename = source_filename.into();
        let mut target_filename = derive_target_filename(&source_filename, tool.target_extension);

        // Same-extension tools (pdf-optimize, audio presets) would otherwise overwrite the source
        let stored_name = source_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if target_filename == stored_name || target_filename == source_filename {
            let stem = strip_extension(&source_filename);
            target_filename = derive_target_filename(
                &format!("{}-converted", stem),
                tool.target_extension,
            );
        }
        // `status.csv` through csv-to-json must not land on the status record
        if is_reserved_name(&target_filename) {
            target_filename = format!("upload-{}", target_filename);
        }

        Self {
            job_id,
            tool_slug: tool.slug,
            source_path,
            source_filename,
            target_filename,
            target_extension: tool.target_extension,
            converter: tool.converter,
            created_at: Utc::now(),
        }
    }

    /// Directory holding the source, the status record and the output
    pub fn work_dir(&self) -> &Path {
        self.source_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Where converters write their output
    pub fn target_path(&self) -> PathBuf {
        self.work_dir().join(&self.target_filename)
    }
}

/// Replace the final extension of `name` with `ext`, or append it when there is none
pub fn derive_target_filename(name: &str, ext: &str) -> String {
    let ext = if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    };
    format!("{}{}", strip_extension(name), ext)
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains(['/', '\\']) => &name[..dot],
        _ => name,
    }
}

/// Lifecycle of a job. There is no queued state: a job is processing from the moment it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Contents of a job's `status.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub status: JobState,

    /// 0 while processing or failed, 100 once completed
    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    pub fn processing() -> Self {
        Self {
            status: JobState::Processing,
            progress: 0,
            output_path: None,
            error: None,
        }
    }

    pub fn completed(output_path: PathBuf) -> Self {
        Self {
            status: JobState::Completed,
            progress: 100,
            output_path: Some(output_path),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobState::Failed,
            progress: 0,
            output_path: None,
            error: Some(message.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != JobState::Processing
    }
}
