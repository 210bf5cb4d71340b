//! Converter dispatch registry and the converter implementations.
//!
//! Each catalog tool names a converter key; [`ConverterRegistry`] maps every key to an
//! implementation of [`Converter`]. The registry is built once at start-up and shared.

pub mod archive;
pub mod audio;
pub mod documents;
pub mod ffmpeg;
pub mod media;
pub mod ocr;
pub mod office;
pub mod pdf;
pub mod presentations;
pub mod raster;
pub mod spreadsheets;
pub mod video;

use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::catalog::ToolCatalog;
use crate::config::ToolsConfig;
use crate::jobs::ConversionJob;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input could not be converted
    #[error("{0}")]
    Failed(String),

    /// The conversion needs a capability this installation does not have
    #[error("{0}")]
    NotImplemented(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn failed(message: impl std::fmt::Display) -> Self {
        ConvertError::Failed(message.to_string())
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub output_path: PathBuf,
}

impl ConversionOutput {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

/// A single conversion routine, reading `job.source_path` and writing `job.target_path()`
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError>;
}

/// Immutable map from converter key to implementation
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<&'static str, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    /// Register every built-in converter
    pub fn new(tools: &ToolsConfig) -> Self {
        let mut registry = RegistryBuilder::default();

        raster::register(&mut registry, tools);
        video::register(&mut registry, tools);
        audio::register(&mut registry, tools);
        media::register(&mut registry, tools);
        documents::register(&mut registry);
        pdf::register(&mut registry);
        spreadsheets::register(&mut registry);
        archive::register(&mut registry);
        ocr::register(&mut registry, tools);
        presentations::register(&mut registry);

        debug!("🔌 Registered {} converters", registry.converters.len());
        registry.build()
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Converter>> {
        self.converters.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.converters.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.converters.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Converter keys named by the catalog that have no registered implementation
    pub fn missing_for(&self, catalog: &ToolCatalog) -> Vec<&'static str> {
        catalog
            .tools()
            .iter()
            .map(|tool| tool.converter)
            .filter(|key| !self.contains(key))
            .collect()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.keys())
            .finish()
    }
}

/// Mutable registry used while the built-in converters register themselves
#[derive(Default)]
pub struct RegistryBuilder {
    converters: HashMap<&'static str, Arc<dyn Converter>>,
}

impl RegistryBuilder {
    pub fn insert(&mut self, key: &'static str, converter: impl Converter + 'static) {
        self.converters.insert(key, Arc::new(converter));
    }

    pub fn build(self) -> ConverterRegistry {
        ConverterRegistry {
            converters: self.converters,
        }
    }
}

/// Converter for tools whose output format has no backend available
pub struct Unsupported {
    reason: &'static str,
}

impl Unsupported {
    pub fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

#[async_trait]
impl Converter for Unsupported {
    async fn convert(&self, _job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        Err(ConvertError::NotImplemented(self.reason.to_string()))
    }
}

/// Run an external program to completion, returning its stdout.
///
/// A program that cannot be found maps to [`ConvertError::NotImplemented`]; a non-zero exit
/// maps to [`ConvertError::Failed`] with the tail of stderr.
pub(crate) async fn run_external<I, S>(program: &Path, args: I) -> Result<Vec<u8>, ConvertError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = program.display().to_string();
    let output = match tokio::process::Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConvertError::NotImplemented(format!(
                "{} is not installed on this server",
                name
            )));
        }
        Err(e) => return Err(e.into()),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::Failed(format!(
            "{} exited with {}: {}",
            name,
            output.status,
            stderr_tail(&stderr)
        )));
    }

    Ok(output.stdout)
}

/// Last few non-empty lines of a process' stderr
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join("\n")
}

/// Run CPU-bound conversion work off the async runtime
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ConvertError>
where
    F: FnOnce() -> Result<T, ConvertError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ConvertError::failed(format!("conversion task panicked: {}", e)))?
}
