use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::catalog::{file_extension, ToolCatalog};
use crate::config::{Config, ExecutionMode};
use crate::converters::ConverterRegistry;
use crate::error::ServiceError;
use crate::jobs::{ConversionJob, JobId, JobState, JobStatus};
use crate::state::{sanitize_filename, JobStore};

/// File received with a submission
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Public view of a job, as returned by submission and status requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: JobId,
    pub status: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A completed job's output, ready to stream back
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

/// Accepts uploads, runs conversions and answers status and download queries.
///
/// Cheap to clone; every clone shares the catalog, registry, store and worker pool.
#[derive(Clone)]
pub struct ConversionService {
    catalog: Arc<ToolCatalog>,
    registry: Arc<ConverterRegistry>,
    store: Arc<JobStore>,
    config: Arc<Config>,
    worker_semaphore: Arc<Semaphore>,
}

impl ConversionService {
    /// Build the service from configuration, failing if any catalog tool lacks a converter
    pub async fn new(config: Config) -> Result<Self, ServiceError> {
        let store = JobStore::new(config.storage.uploads_dir.clone()).await?;
        let registry = ConverterRegistry::new(&config.tools);
        let service = Self::from_parts(config, ToolCatalog::builtin(), registry, store);
        service.check_consistency()?;
        Ok(service)
    }

    pub fn from_parts(
        config: Config,
        catalog: ToolCatalog,
        registry: ConverterRegistry,
        store: JobStore,
    ) -> Self {
        info!(
            "🔧 Initializing ConversionService: {} tools, {} converters, {:?} execution with {} workers",
            catalog.tools().len(),
            registry.len(),
            config.jobs.execution,
            config.jobs.max_concurrent_jobs
        );

        Self {
            worker_semaphore: Arc::new(Semaphore::new(config.jobs.max_concurrent_jobs.max(1))),
            catalog: Arc::new(catalog),
            registry: Arc::new(registry),
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Every converter key named by the catalog must be registered
    pub fn check_consistency(&self) -> Result<(), ServiceError> {
        let missing = self.registry.missing_for(&self.catalog);
        if missing.is_empty() {
            debug!("✅ All {} catalog tools have converters", self.catalog.tools().len());
            return Ok(());
        }
        Err(ServiceError::InternalError(format!(
            "No converter registered for: {}",
            missing.join(", ")
        )))
    }

    /// Validate and store an upload, then convert it.
    ///
    /// Inline mode returns once the conversion has finished; conversion errors are returned
    /// after the failure has been recorded. Background mode returns a `processing` summary
    /// straight away.
    pub async fn submit(
        &self,
        upload: Option<Upload>,
        tool_slug: Option<&str>,
    ) -> Result<JobSummary, ServiceError> {
        let upload = upload
            .filter(|upload| !upload.bytes.is_empty())
            .ok_or_else(|| ServiceError::InvalidRequest("A file is required".to_string()))?;
        let tool_slug = tool_slug
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .ok_or_else(|| ServiceError::InvalidRequest("A tool slug is required".to_string()))?;

        let tool = self
            .catalog
            .lookup_by_slug(tool_slug)
            .ok_or_else(|| ServiceError::NotFound("Unknown conversion tool".to_string()))?;

        if !self.catalog.validate_source_extension(tool, &upload.filename) {
            warn!(
                "Rejected {} for {}: extension {:?} not accepted",
                upload.filename,
                tool.slug,
                file_extension(&upload.filename)
            );
            return Err(ServiceError::UnsupportedExtension {
                accepted: tool.accepted_extensions(),
            });
        }

        let limit = self.config.jobs.max_upload_bytes;
        if upload.bytes.len() > limit {
            return Err(ServiceError::InvalidRequest(format!(
                "File is too large (limit is {} bytes)",
                limit
            )));
        }

        let job_id = JobId::new();
        let source_path = self
            .store
            .write_source_file(&job_id, &upload.filename, &upload.bytes)
            .await?;
        let job = ConversionJob::new(job_id, source_path, sanitize_filename(&upload.filename), tool);
        self.store.write_status(&job_id, &JobStatus::processing()).await?;

        info!(
            "📥 Job {} accepted: {} ({} bytes) via {}",
            job_id,
            job.source_filename,
            upload.bytes.len(),
            tool.slug
        );

        match self.config.jobs.execution {
            ExecutionMode::Inline => {
                let output_path = self.execute(job).await?;
                Ok(self.summary(job_id, &JobStatus::completed(output_path)))
            }
            ExecutionMode::Background => {
                let service = self.clone();
                tokio::spawn(async move {
                    let _permit = match service.worker_semaphore.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            error!("Worker pool closed before job {} could run: {}", job.job_id, e);
                            service
                                .record_failure(&job.job_id, "Conversion worker unavailable")
                                .await;
                            return;
                        }
                    };
                    let job_id = job.job_id;
                    if let Err(e) = service.execute(job).await {
                        debug!("Background job {} ended with: {}", job_id, e);
                    }
                });
                Ok(self.summary(job_id, &JobStatus::processing()))
            }
        }
    }

    /// Run the job on its own task. The final status is written even when the caller
    /// goes away (a dropped request) or the converter panics.
    async fn execute(&self, job: ConversionJob) -> Result<PathBuf, ServiceError> {
        let job_id = job.job_id;
        let service = self.clone();

        match tokio::spawn(async move { service.run_job(&job).await }).await {
            Ok(result) => result,
            Err(e) => {
                let message = format!("Conversion task aborted: {}", e);
                error!("❌ Job {}: {}", job_id, message);
                self.record_failure(&job_id, &message).await;
                Err(ServiceError::InternalError(message))
            }
        }
    }

    /// Run the job's converter and record the outcome as the job's final status
    async fn run_job(&self, job: &ConversionJob) -> Result<PathBuf, ServiceError> {
        let start_time = Instant::now();

        let result = match self.registry.get(job.converter) {
            Some(converter) => converter.convert(job).await.map_err(ServiceError::from),
            None => Err(ServiceError::InternalError(format!(
                "No converter found for {}",
                job.converter
            ))),
        };

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                error!("❌ Job {} ({}) failed: {}", job.job_id, job.tool_slug, e);
                self.record_failure(&job.job_id, &e.to_string()).await;
                return Err(e);
            }
        };

        let completed = JobStatus::completed(output.output_path.clone());
        if let Err(e) = self.store.write_status(&job.job_id, &completed).await {
            error!("Could not record completion of job {}: {}", job.job_id, e);
            self.record_failure(&job.job_id, &format!("Could not record completion: {}", e))
                .await;
            return Err(e.into());
        }

        info!(
            "✅ Job {} completed in {:.2}s: {}",
            job.job_id,
            start_time.elapsed().as_secs_f64(),
            output.output_path.display()
        );
        Ok(output.output_path)
    }

    /// Best-effort `failed` record; a store that cannot take it is logged, not retried
    async fn record_failure(&self, job_id: &JobId, message: &str) {
        if let Err(e) = self.store.write_status(job_id, &JobStatus::failed(message)).await {
            error!("Could not record failure of job {}: {}", job_id, e);
        }
    }

    /// Current state of a job
    pub async fn status(&self, raw_id: &str) -> Result<JobSummary, ServiceError> {
        let (job_id, status) = self.find(raw_id).await?;
        Ok(self.summary(job_id, &status))
    }

    /// Output of a completed job
    pub async fn download(&self, raw_id: &str) -> Result<Download, ServiceError> {
        let (job_id, status) = self.find(raw_id).await?;

        if status.status != JobState::Completed {
            return Err(ServiceError::Conflict("Job is not completed".to_string()));
        }

        let output_path = status
            .output_path
            .ok_or_else(|| ServiceError::NotFound("Output not available".to_string()))?;
        let bytes = match tokio::fs::read(&output_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Output of job {} unreadable at {}: {}", job_id, output_path.display(), e);
                return Err(ServiceError::NotFound("Output not available".to_string()));
            }
        };

        let filename = output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        let content_type = mime_guess::from_path(&output_path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        debug!("📤 Serving {} ({} bytes) for job {}", filename, bytes.len(), job_id);
        Ok(Download {
            bytes,
            content_type,
            filename,
        })
    }

    async fn find(&self, raw_id: &str) -> Result<(JobId, JobStatus), ServiceError> {
        let not_found = || ServiceError::NotFound("Job not found".to_string());

        let job_id: JobId = raw_id.parse().map_err(|_| not_found())?;
        match self.store.read_status(&job_id).await {
            Ok(Some(status)) => Ok((job_id, status)),
            Ok(None) => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    fn summary(&self, job_id: JobId, status: &JobStatus) -> JobSummary {
        JobSummary {
            job_id,
            status: status.status,
            download_url: (status.status == JobState::Completed).then(|| self.download_url(&job_id)),
            error: status.error.clone(),
        }
    }

    /// `/api/jobs/<id>/download`, prefixed with the public base URL when one is configured
    pub fn download_url(&self, job_id: &JobId) -> String {
        let path = format!("/api/jobs/{}/download", job_id);
        match &self.config.server.public_base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::converters::{ConversionOutput, ConvertError, Converter, RegistryBuilder};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    /// Announces that it started, then takes its time before writing the output
    struct SlowConverter {
        started: Arc<Notify>,
        delay: Duration,
    }

    #[async_trait]
    impl Converter for SlowConverter {
        async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
            self.started.notify_one();
            tokio::time::sleep(self.delay).await;
            let output = job.target_path();
            tokio::fs::write(&output, b"converted").await?;
            Ok(ConversionOutput::new(output))
        }
    }

    struct PanickingConverter;

    #[async_trait]
    impl Converter for PanickingConverter {
        async fn convert(&self, _job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
            panic!("converter bug");
        }
    }

    /// Reports an output path that cannot be stored in a JSON status record
    #[cfg(unix)]
    struct NonUtf8OutputConverter;

    #[cfg(unix)]
    #[async_trait]
    impl Converter for NonUtf8OutputConverter {
        async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
            use std::os::unix::ffi::OsStrExt;
            let name = std::ffi::OsStr::from_bytes(b"out-\xff.jpg");
            Ok(ConversionOutput::new(job.work_dir().join(name)))
        }
    }

    /// Service backed by a hand-built registry instead of the built-in converters
    async fn service_with(temp_dir: &TempDir, registry: RegistryBuilder) -> ConversionService {
        let config = ConfigBuilder::new()
            .with_uploads_dir(temp_dir.path().join("uploads"))
            .build();
        let store = JobStore::new(config.storage.uploads_dir.clone()).await.unwrap();
        ConversionService::from_parts(config, ToolCatalog::builtin(), registry.build(), store)
    }

    fn registry_with(converter: impl Converter + 'static) -> RegistryBuilder {
        let mut registry = RegistryBuilder::default();
        registry.insert("png_to_jpg", converter);
        registry
    }

    fn only_job_id(temp_dir: &TempDir) -> String {
        let mut entries = std::fs::read_dir(temp_dir.path().join("uploads")).unwrap();
        let entry = entries.next().unwrap().unwrap();
        assert!(entries.next().is_none());
        entry.file_name().to_str().unwrap().to_string()
    }

    async fn service(temp_dir: &TempDir, mode: ExecutionMode) -> ConversionService {
        let config = ConfigBuilder::new()
            .with_uploads_dir(temp_dir.path().join("uploads"))
            .with_execution(mode)
            .with_max_concurrent_jobs(2)
            .build();
        ConversionService::new(config).await.unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::from_pixel(8, 8, image::Rgb([200, 10, 10]))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_validation_order() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, ExecutionMode::Inline).await;

        let err = service.submit(None, Some("jpg-to-png")).await.unwrap_err();
        assert_eq!(err.to_string(), "A file is required");

        let empty = Upload::new("a.jpg", Vec::new());
        let err = service.submit(Some(empty), Some("jpg-to-png")).await.unwrap_err();
        assert_eq!(err.to_string(), "A file is required");

        let upload = Upload::new("a.txt", b"hello".to_vec());
        let err = service.submit(Some(upload.clone()), None).await.unwrap_err();
        assert_eq!(err.to_string(), "A tool slug is required");

        let err = service.submit(Some(upload.clone()), Some("nope")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = service.submit(Some(upload), Some("jpg-to-png")).await.unwrap_err();
        assert_eq!(err.to_string(), "This tool accepts: .jpg, .jpeg");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_inline_png_to_jpg() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, ExecutionMode::Inline).await;

        let summary = service
            .submit(Some(Upload::new("photo.png", png_bytes())), Some("png-to-jpg"))
            .await
            .unwrap();
        assert_eq!(summary.status, JobState::Completed);
        assert_eq!(
            summary.download_url,
            Some(format!("/api/jobs/{}/download", summary.job_id))
        );

        let download = service.download(&summary.job_id.to_string()).await.unwrap();
        assert_eq!(download.filename, "photo.jpg");
        assert_eq!(download.content_type, "image/jpeg");
        assert_eq!(&download.bytes[..2], &[0xFF, 0xD8]);

        // Repeated status reads see the same terminal record
        let first = service.status(&summary.job_id.to_string()).await.unwrap();
        let second = service.status(&summary.job_id.to_string()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_conversion_is_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, ExecutionMode::Inline).await;

        let err = service
            .submit(Some(Upload::new("broken.png", b"not an image".to_vec())), Some("png-to-jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ConversionFailure(_)));

        // Exactly one job directory exists; its record is terminal and carries the error
        let mut entries = std::fs::read_dir(temp_dir.path().join("uploads")).unwrap();
        let job_dir = entries.next().unwrap().unwrap();
        let status = service
            .status(job_dir.file_name().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(status.status, JobState::Failed);
        assert!(status.error.is_some());
        assert!(status.download_url.is_none());
    }

    #[tokio::test]
    async fn test_unknown_and_unfinished_jobs() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, ExecutionMode::Inline).await;

        let err = service.status("../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = service.download(&JobId::new().to_string()).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let job_id = JobId::new();
        service
            .store()
            .write_status(&job_id, &JobStatus::processing())
            .await
            .unwrap();
        let err = service.download(&job_id.to_string()).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_background_mode_completes() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, ExecutionMode::Background).await;

        let summary = service
            .submit(Some(Upload::new("photo.png", png_bytes())), Some("png-to-webp"))
            .await
            .unwrap();
        assert_eq!(summary.status, JobState::Processing);
        assert!(summary.download_url.is_none());

        let id = summary.job_id.to_string();
        let mut status = service.status(&id).await.unwrap();
        for _ in 0..100 {
            if status.status != JobState::Processing {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            status = service.status(&id).await.unwrap();
        }
        assert_eq!(status.status, JobState::Completed);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigBuilder::new()
            .with_uploads_dir(temp_dir.path().join("uploads"))
            .with_max_upload_bytes(4)
            .build();
        let service = ConversionService::new(config).await.unwrap();

        let err = service
            .submit(Some(Upload::new("photo.png", png_bytes())), Some("png-to-jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        assert_eq!(err.status_code(), 400);
        assert_eq!(std::fs::read_dir(temp_dir.path().join("uploads")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_output_named_like_status_record_is_downloadable() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(&temp_dir, ExecutionMode::Inline).await;

        let csv = "name,age\nann,31\nbob,42\n";
        let summary = service
            .submit(Some(Upload::new("status.csv", csv)), Some("csv-to-json"))
            .await
            .unwrap();
        let id = summary.job_id.to_string();

        let download = service.download(&id).await.unwrap();
        assert_eq!(download.filename, "upload-status.json");
        let rows: serde_json::Value = serde_json::from_slice(&download.bytes).unwrap();
        assert_eq!(rows[0]["name"], "ann");

        // The status record itself is untouched
        assert_eq!(service.status(&id).await.unwrap().status, JobState::Completed);
    }

    #[tokio::test]
    async fn test_missing_converter_is_internal_error() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with(&temp_dir, RegistryBuilder::default()).await;

        let err = service
            .submit(Some(Upload::new("photo.png", png_bytes())), Some("png-to-jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InternalError(_)));
        assert_eq!(err.to_string(), "No converter found for png_to_jpg");

        let status = service.status(&only_job_id(&temp_dir)).await.unwrap();
        assert_eq!(status.status, JobState::Failed);
        assert_eq!(status.error.as_deref(), Some("No converter found for png_to_jpg"));
    }

    #[tokio::test]
    async fn test_dropped_submission_still_records_completion() {
        let temp_dir = TempDir::new().unwrap();
        let started = Arc::new(Notify::new());
        let converter = SlowConverter {
            started: started.clone(),
            delay: Duration::from_millis(200),
        };
        let service = service_with(&temp_dir, registry_with(converter)).await;

        let submitting = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .submit(Some(Upload::new("photo.png", png_bytes())), Some("png-to-jpg"))
                    .await
            })
        };
        started.notified().await;
        submitting.abort();

        let id = only_job_id(&temp_dir);
        let mut status = service.status(&id).await.unwrap();
        for _ in 0..100 {
            if status.status != JobState::Processing {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            status = service.status(&id).await.unwrap();
        }
        assert_eq!(status.status, JobState::Completed);
        assert_eq!(service.download(&id).await.unwrap().bytes, b"converted");
    }

    #[tokio::test]
    async fn test_panicking_converter_is_recorded_as_failed() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with(&temp_dir, registry_with(PanickingConverter)).await;

        let err = service
            .submit(Some(Upload::new("photo.png", png_bytes())), Some("png-to-jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InternalError(_)));

        let status = service.status(&only_job_id(&temp_dir)).await.unwrap();
        assert_eq!(status.status, JobState::Failed);
        assert!(status.error.unwrap().starts_with("Conversion task aborted"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unrecordable_completion_falls_back_to_failed() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with(&temp_dir, registry_with(NonUtf8OutputConverter)).await;

        let err = service
            .submit(Some(Upload::new("photo.png", png_bytes())), Some("png-to-jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));

        let status = service.status(&only_job_id(&temp_dir)).await.unwrap();
        assert_eq!(status.status, JobState::Failed);
        assert!(status.error.unwrap().starts_with("Could not record completion"));
    }

    #[tokio::test]
    async fn test_absolute_download_url() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigBuilder::new()
            .with_uploads_dir(temp_dir.path().to_path_buf())
            .with_public_base_url("https://convert.example.com/")
            .build();
        let service = ConversionService::new(config).await.unwrap();

        let job_id = JobId::new();
        assert_eq!(
            service.download_url(&job_id),
            format!("https://convert.example.com/api/jobs/{}/download", job_id)
        );
    }
}
