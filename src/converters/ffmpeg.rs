//! ffmpeg invocation shared by the video and audio converters

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{run_external, ConversionOutput, ConvertError, Converter};
use crate::jobs::ConversionJob;

/// Encoding settings for a single ffmpeg run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FfmpegArgs {
    pub video_codec: Option<&'static str>,
    pub audio_codec: Option<&'static str>,
    pub video_bitrate: Option<&'static str>,
    pub audio_bitrate: Option<&'static str>,
    pub audio_frequency: Option<u32>,
    pub audio_channels: Option<u8>,
    /// Output size as `WxH`; `?` keeps the aspect ratio for that side
    pub size: Option<&'static str>,
    pub fps: Option<u32>,
    /// Clip length in seconds
    pub duration: Option<u32>,
    pub no_video: bool,
    pub output_options: &'static [&'static str],
}

impl FfmpegArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn video_codec(mut self, codec: &'static str) -> Self {
        self.video_codec = Some(codec);
        self
    }

    pub fn audio_codec(mut self, codec: &'static str) -> Self {
        self.audio_codec = Some(codec);
        self
    }

    pub fn codecs(self, video: &'static str, audio: &'static str) -> Self {
        self.video_codec(video).audio_codec(audio)
    }

    pub fn video_bitrate(mut self, bitrate: &'static str) -> Self {
        self.video_bitrate = Some(bitrate);
        self
    }

    pub fn audio_bitrate(mut self, bitrate: &'static str) -> Self {
        self.audio_bitrate = Some(bitrate);
        self
    }

    pub fn audio_frequency(mut self, hz: u32) -> Self {
        self.audio_frequency = Some(hz);
        self
    }

    pub fn audio_channels(mut self, channels: u8) -> Self {
        self.audio_channels = Some(channels);
        self
    }

    pub fn size(mut self, size: &'static str) -> Self {
        self.size = Some(size);
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn no_video(mut self) -> Self {
        self.no_video = true;
        self
    }

    pub fn output_options(mut self, options: &'static [&'static str]) -> Self {
        self.output_options = options;
        self
    }

    /// Full ffmpeg argument list for converting `input` into `output`
    pub fn to_command_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-y".into(), "-i".into()];
        args.push(input.as_os_str().to_owned());

        let mut push = |flag: &str, value: String| {
            args.push(flag.into());
            args.push(value.into());
        };

        if let Some(codec) = self.video_codec {
            push("-c:v", codec.to_string());
        }
        if let Some(codec) = self.audio_codec {
            push("-c:a", codec.to_string());
        }
        if let Some(bitrate) = self.video_bitrate {
            push("-b:v", bitrate.to_string());
        }
        if let Some(bitrate) = self.audio_bitrate {
            push("-b:a", bitrate.to_string());
        }
        if let Some(hz) = self.audio_frequency {
            push("-ar", hz.to_string());
        }
        if let Some(channels) = self.audio_channels {
            push("-ac", channels.to_string());
        }
        if let Some(size) = self.size {
            push("-vf", scale_filter(size));
        }
        if let Some(fps) = self.fps {
            push("-r", fps.to_string());
        }
        if let Some(seconds) = self.duration {
            push("-t", seconds.to_string());
        }
        if self.no_video {
            args.push("-vn".into());
        }
        args.extend(self.output_options.iter().map(OsString::from));

        args.push(output.as_os_str().to_owned());
        args
    }
}

/// `1280x720` becomes `scale=1280:720`; a `?` side becomes `-2` (keep aspect, even size)
fn scale_filter(size: &str) -> String {
    let (width, height) = size.split_once('x').unwrap_or((size, "?"));
    let side = |s: &str| if s == "?" { "-2".to_string() } else { s.to_string() };
    format!("scale={}:{}", side(width), side(height))
}

/// Converter that runs ffmpeg with a fixed set of encoding settings
pub struct FfmpegConverter {
    binary: PathBuf,
    args: FfmpegArgs,
}

impl FfmpegConverter {
    pub fn new(binary: PathBuf, args: FfmpegArgs) -> Self {
        Self { binary, args }
    }

    pub fn args(&self) -> &FfmpegArgs {
        &self.args
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let output = job.target_path();
        info!("🎬 Running ffmpeg for {} -> {}", job.source_filename, job.target_filename);

        run_external(&self.binary, self.args.to_command_args(&job.source_path, &output)).await?;

        if !tokio::fs::try_exists(&output).await? {
            return Err(ConvertError::failed("ffmpeg finished without producing an output file"));
        }

        info!("✅ ffmpeg produced {}", output.display());
        Ok(ConversionOutput::new(output))
    }
}
