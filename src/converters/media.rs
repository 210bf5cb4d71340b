//! Media information reports (ffprobe plus filesystem metadata)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{run_external, ConversionOutput, ConvertError, Converter, RegistryBuilder};
use crate::catalog::file_extension;
use crate::config::ToolsConfig;
use crate::jobs::ConversionJob;

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov", ".mkv", ".webm"];

/// Everything known about a media file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReport {
    pub filename: String,
    pub extension: String,
    pub size: u64,
    pub size_human: String,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    /// `video` or `audio`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeInfo>,
}

/// Container and stream details reported by ffprobe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeInfo {
    pub format: String,
    pub duration_seconds: f64,
    pub bit_rate: Option<u64>,
    pub streams: Vec<StreamInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    pub index: u64,
    pub codec_type: String,
    pub codec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Text,
}

pub struct MediaInfoConverter {
    ffprobe: PathBuf,
    format: ReportFormat,
}

impl MediaInfoConverter {
    pub fn new(ffprobe: PathBuf, format: ReportFormat) -> Self {
        Self { ffprobe, format }
    }

    /// Collect filesystem metadata and, when ffprobe is available, stream details
    pub async fn report(&self, path: &Path) -> Result<MediaReport, ConvertError> {
        let metadata = tokio::fs::metadata(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = file_extension(&filename).unwrap_or_default();
        let kind = if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            "video"
        } else {
            "audio"
        };

        let probe = match probe(&self.ffprobe, path).await {
            Ok(probe) => Some(probe),
            Err(e) => {
                warn!("ffprobe unavailable for {}: {}", filename, e);
                None
            }
        };

        Ok(MediaReport {
            size_human: format!("{:.2} MB", metadata.len() as f64 / (1024.0 * 1024.0)),
            size: metadata.len(),
            created: metadata.created().ok().map(DateTime::<Utc>::from),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            kind: kind.to_string(),
            filename,
            extension,
            probe,
        })
    }
}

#[async_trait]
impl Converter for MediaInfoConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let report = self.report(&job.source_path).await?;
        let body = match self.format {
            ReportFormat::Json => serde_json::to_string_pretty(&report)
                .map_err(|e| ConvertError::failed(format!("Failed to serialize report: {}", e)))?,
            ReportFormat::Text => render_text(&report),
        };

        let output = job.target_path();
        tokio::fs::write(&output, body).await?;
        info!("📊 Wrote media report for {}", report.filename);
        Ok(ConversionOutput::new(output))
    }
}

async fn probe(ffprobe: &Path, path: &Path) -> Result<ProbeInfo, ConvertError> {
    let mut args: Vec<OsString> = ["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"]
        .iter()
        .map(|arg| OsString::from(*arg))
        .collect();
    args.push(path.as_os_str().to_owned());

    let stdout = run_external(ffprobe, args).await?;
    let data: serde_json::Value = serde_json::from_slice(&stdout)
        .map_err(|e| ConvertError::failed(format!("Unreadable ffprobe output: {}", e)))?;
    Ok(parse_probe(&data))
}

/// Pull the fields we report out of ffprobe's JSON
pub fn parse_probe(data: &serde_json::Value) -> ProbeInfo {
    let format = &data["format"];
    let number = |value: &serde_json::Value| value.as_str().and_then(|s| s.parse::<f64>().ok());

    let streams = data["streams"]
        .as_array()
        .map(|streams| {
            streams
                .iter()
                .map(|stream| StreamInfo {
                    index: stream["index"].as_u64().unwrap_or(0),
                    codec_type: stream["codec_type"].as_str().unwrap_or("unknown").to_string(),
                    codec: stream["codec_name"].as_str().unwrap_or("unknown").to_string(),
                    width: stream["width"].as_u64(),
                    height: stream["height"].as_u64(),
                    fps: stream["r_frame_rate"].as_str().and_then(parse_frame_rate),
                    sample_rate: stream["sample_rate"].as_str().and_then(|s| s.parse().ok()),
                    channels: stream["channels"].as_u64(),
                })
                .collect()
        })
        .unwrap_or_default();

    ProbeInfo {
        format: format["format_name"].as_str().unwrap_or("unknown").to_string(),
        duration_seconds: number(&format["duration"]).unwrap_or(0.0),
        bit_rate: format["bit_rate"].as_str().and_then(|s| s.parse().ok()),
        streams,
    }
}

/// ffprobe reports frame rates as fractions like `30000/1001`
fn parse_frame_rate(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => s.parse().ok(),
    }
}

pub fn render_text(report: &MediaReport) -> String {
    let timestamp = |t: &Option<DateTime<Utc>>| {
        t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "unknown".to_string())
    };

    let mut text = String::new();
    let _ = writeln!(text, "Media File Information");
    let _ = writeln!(text, "=====================");
    let _ = writeln!(text);
    let _ = writeln!(text, "Filename: {}", report.filename);
    let _ = writeln!(text, "Format: {}", report.extension.trim_start_matches('.').to_uppercase());
    let _ = writeln!(text, "Size: {}", report.size_human);
    let _ = writeln!(text, "Created: {}", timestamp(&report.created));
    let _ = writeln!(text, "Modified: {}", timestamp(&report.modified));

    if let Some(probe) = &report.probe {
        let _ = writeln!(text);
        let _ = writeln!(text, "Container: {}", probe.format);
        let _ = writeln!(text, "Duration: {:.2}s", probe.duration_seconds);
        if let Some(bit_rate) = probe.bit_rate {
            let _ = writeln!(text, "Bit rate: {} kb/s", bit_rate / 1000);
        }
        for stream in &probe.streams {
            let _ = write!(text, "Stream #{}: {} ({})", stream.index, stream.codec_type, stream.codec);
            if let (Some(w), Some(h)) = (stream.width, stream.height) {
                let _ = write!(text, " {}x{}", w, h);
            }
            if let Some(fps) = stream.fps {
                let _ = write!(text, " {:.2} fps", fps);
            }
            if let Some(rate) = stream.sample_rate {
                let _ = write!(text, " {} Hz", rate);
            }
            if let Some(channels) = stream.channels {
                let _ = write!(text, " {} ch", channels);
            }
            let _ = writeln!(text);
        }
    }

    text
}

pub fn register(registry: &mut RegistryBuilder, tools: &ToolsConfig) {
    registry.insert(
        "media_info",
        MediaInfoConverter::new(tools.ffprobe_path.clone(), ReportFormat::Json),
    );
    registry.insert(
        "media_to_txt",
        MediaInfoConverter::new(tools.ffprobe_path.clone(), ReportFormat::Text),
    );
}
