use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration for the conversion service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Where uploads, outputs and status records live
    pub storage: StorageConfig,

    /// Job execution settings
    pub jobs: JobsConfig,

    /// External binaries and converter tuning
    pub tools: ToolsConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Prefix for download URLs; relative URLs are returned when unset
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the per-job directories
    pub uploads_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Convert within the submitting request
    Inline,
    /// Return immediately and convert on a background task
    Background,
}

impl std::str::FromStr for ExecutionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inline" => Ok(ExecutionMode::Inline),
            "background" => Ok(ExecutionMode::Background),
            other => Err(anyhow!("unknown execution mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    pub execution: ExecutionMode,

    /// Upper bound on conversions running at once in background mode
    pub max_concurrent_jobs: usize,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: PathBuf,

    pub ffprobe_path: PathBuf,

    pub tesseract_path: PathBuf,

    /// Tesseract language code
    pub ocr_language: String,

    /// JPEG and AVIF encoder quality (1-100)
    pub image_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from the first config file found, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_paths = [
            "convert-hub.toml",
            "config/convert-hub.toml",
            "/etc/convert-hub/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config.with_env_overrides());
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config.with_env_overrides())
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("UPLOADS_DIR") {
            self.storage.uploads_dir = PathBuf::from(dir);
        }

        if let Ok(base_url) = std::env::var("BASE_URL") {
            self.server.public_base_url = Some(base_url);
        }

        if let Ok(host) = std::env::var("CONVERT_HUB_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("CONVERT_HUB_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid CONVERT_HUB_PORT: {}", port),
            }
        }

        if let Ok(mode) = std::env::var("CONVERT_HUB_EXECUTION") {
            match mode.parse() {
                Ok(mode) => self.jobs.execution = mode,
                Err(e) => tracing::warn!("Ignoring CONVERT_HUB_EXECUTION: {}", e),
            }
        }

        if let Ok(max_jobs) = std::env::var("CONVERT_HUB_MAX_JOBS") {
            self.jobs.max_concurrent_jobs = max_jobs.parse().unwrap_or(self.jobs.max_concurrent_jobs);
        }

        if let Ok(level) = std::env::var("CONVERT_HUB_LOG_LEVEL") {
            self.logging.level = level;
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("port must be greater than 0"));
        }

        if self.jobs.max_concurrent_jobs == 0 {
            return Err(anyhow!("max_concurrent_jobs must be greater than 0"));
        }

        if self.jobs.max_upload_bytes == 0 {
            return Err(anyhow!("max_upload_bytes must be greater than 0"));
        }

        if !(1..=100).contains(&self.tools.image_quality) {
            return Err(anyhow!("image_quality must be between 1 and 100"));
        }

        if let Some(base_url) = &self.server.public_base_url {
            Url::parse(base_url).with_context(|| format!("Invalid public_base_url: {}", base_url))?;
        }

        if !self.storage.uploads_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.storage.uploads_dir) {
                return Err(anyhow!("Cannot create uploads directory: {}", e));
            }
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Convert Hub Configuration:\n\
            - Listen: {}\n\
            - Uploads Directory: {}\n\
            - Execution: {:?}\n\
            - Max Concurrent Jobs: {}\n\
            - Max Upload: {} MiB\n\
            - Public Base URL: {}\n\
            - ffmpeg: {}\n\
            - tesseract: {} ({})",
            self.bind_address(),
            self.storage.uploads_dir.display(),
            self.jobs.execution,
            self.jobs.max_concurrent_jobs,
            self.jobs.max_upload_bytes / (1024 * 1024),
            self.server.public_base_url.as_deref().unwrap_or("(relative)"),
            self.tools.ffmpeg_path.display(),
            self.tools.tesseract_path.display(),
            self.tools.ocr_language,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            jobs: JobsConfig::default(),
            tools: ToolsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_base_url: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            uploads_dir: cwd.join("uploads"),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionMode::Inline,
            max_concurrent_jobs: num_cpus::get(),
            max_upload_bytes: 100 * 1024 * 1024, // 100 MiB
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            tesseract_path: PathBuf::from("tesseract"),
            ocr_language: "eng".to_string(),
            image_quality: 90,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_uploads_dir(mut self, dir: PathBuf) -> Self {
        self.config.storage.uploads_dir = dir;
        self
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.server.public_base_url = Some(url.into());
        self
    }

    pub fn with_execution(mut self, mode: ExecutionMode) -> Self {
        self.config.jobs.execution = mode;
        self
    }

    pub fn with_max_concurrent_jobs(mut self, jobs: usize) -> Self {
        self.config.jobs.max_concurrent_jobs = jobs;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.jobs.max_upload_bytes = bytes;
        self
    }

    pub fn with_ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.tools.ffmpeg_path = path;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.jobs.execution, ExecutionMode::Inline);
        assert_eq!(config.jobs.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.tools.image_quality, 90);
        assert!(config.storage.uploads_dir.ends_with("uploads"));
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_port(8080)
            .with_execution(ExecutionMode::Background)
            .with_max_concurrent_jobs(2)
            .build();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.jobs.execution, ExecutionMode::Background);
        assert_eq!(config.jobs.max_concurrent_jobs, 2);
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigBuilder::new()
            .with_uploads_dir(temp_dir.path().join("uploads"))
            .build();
        assert!(config.validate().is_ok());
        assert!(temp_dir.path().join("uploads").exists());

        let config = ConfigBuilder::new()
            .with_uploads_dir(temp_dir.path().to_path_buf())
            .with_public_base_url("not a url")
            .build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new()
            .with_uploads_dir(temp_dir.path().to_path_buf())
            .with_max_concurrent_jobs(0)
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [jobs]
            execution = "background"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.jobs.execution, ExecutionMode::Background);
        assert_eq!(config.tools.ocr_language, "eng");
    }

    #[test]
    fn test_execution_mode_parse() {
        assert_eq!("Background".parse::<ExecutionMode>().unwrap(), ExecutionMode::Background);
        assert!("later".parse::<ExecutionMode>().is_err());
    }
}
