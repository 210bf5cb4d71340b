use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::jobs::{JobId, JobState, JobStatus};

/// Name of the per-job status record
pub const STATUS_FILE: &str = "status.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid status record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Filesystem store for uploaded sources and job status records.
///
/// Layout: `<uploads_dir>/<jobId>/<source file>` plus `<uploads_dir>/<jobId>/status.json`.
/// Each status write replaces the whole record; nothing is ever read back and patched.
#[derive(Debug, Clone)]
pub struct JobStore {
    /// Root directory holding one subdirectory per job
    uploads_dir: PathBuf,
}

impl JobStore {
    /// Create a store rooted at `uploads_dir`, creating the directory if needed
    pub async fn new(uploads_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&uploads_dir).await?;
        info!("📁 Job store rooted at {}", uploads_dir.display());
        Ok(Self { uploads_dir })
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Directory for a single job
    pub fn job_dir(&self, job_id: &JobId) -> PathBuf {
        self.uploads_dir.join(job_id.to_string())
    }

    fn status_path(&self, job_id: &JobId) -> PathBuf {
        self.job_dir(job_id).join(STATUS_FILE)
    }

    /// Persist the uploaded bytes under the job directory, returning the stored path
    pub async fn write_source_file(
        &self,
        job_id: &JobId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StoreError> {
        let dir = self.job_dir(job_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(sanitize_filename(filename));
        fs::write(&path, bytes).await?;
        debug!("💾 Stored {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Replace the job's status record. Written to a temp file first, then renamed into place.
    pub async fn write_status(&self, job_id: &JobId, status: &JobStatus) -> Result<(), StoreError> {
        let dir = self.job_dir(job_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(STATUS_FILE);
        let tmp = dir.join(format!("{}.tmp", STATUS_FILE));
        let json = serde_json::to_string_pretty(status)?;
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;

        debug!("📝 Job {} is now {}", job_id, status.status);
        Ok(())
    }

    /// Read the job's status record; `None` when the job does not exist
    pub async fn read_status(&self, job_id: &JobId) -> Result<Option<JobStatus>, StoreError> {
        let content = match fs::read_to_string(self.status_path(job_id)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let status = serde_json::from_str(&content)?;
        Ok(Some(status))
    }

    /// Count jobs per state by scanning the job directories
    pub async fn statistics(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();
        let mut entries = fs::read_dir(&self.uploads_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Some(job_id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<JobId>().ok())
            else {
                continue;
            };

            match self.read_status(&job_id).await {
                Ok(Some(status)) => match status.status {
                    JobState::Processing => stats.processing += 1,
                    JobState::Completed => stats.completed += 1,
                    JobState::Failed => stats.failed += 1,
                },
                Ok(None) => {}
                Err(e) => {
                    warn!("Unreadable status for job {}: {}", job_id, e);
                    stats.unreadable += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// Job counts by state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub unreadable: usize,
}

/// Names the store keeps for itself inside a job directory: the status record and its temp file
pub fn is_reserved_name(name: &str) -> bool {
    name == STATUS_FILE
        || name
            .strip_prefix(STATUS_FILE)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Reduce an uploaded filename to a safe final path component
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match name {
        "" | "." | ".." => "upload".to_string(),
        n if is_reserved_name(n) => format!("upload-{}", n),
        n => n.to_string(),
    }
}
