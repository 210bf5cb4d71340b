//! Video transcoding presets

use super::ffmpeg::{FfmpegArgs, FfmpegConverter};
use super::RegistryBuilder;
use crate::config::ToolsConfig;

/// Encoding settings for every video tool, keyed by converter key
pub fn presets() -> Vec<(&'static str, FfmpegArgs)> {
    let h264 = || FfmpegArgs::new().codecs("libx264", "aac");
    let copy = || FfmpegArgs::new().codecs("copy", "copy");

    vec![
        // Container changes
        ("mp4_to_mov", h264()),
        ("mp4_to_avi", FfmpegArgs::new().codecs("mpeg4", "libmp3lame")),
        ("mp4_to_mkv", copy()),
        (
            "mp4_to_webm",
            FfmpegArgs::new()
                .codecs("libvpx-vp9", "libopus")
                .video_bitrate("1000k"),
        ),
        ("mov_to_mp4", h264()),
        ("mov_to_mkv", copy()),
        ("avi_to_mp4", h264()),
        ("mkv_to_mp4", h264()),
        // Short animated preview
        ("video_to_gif", FfmpegArgs::new().fps(10).size("480x?").duration(5)),
        // Audio extraction
        (
            "video_to_mp3",
            FfmpegArgs::new().no_video().audio_codec("libmp3lame").audio_bitrate("192k"),
        ),
        ("video_to_wav", FfmpegArgs::new().no_video().audio_codec("pcm_s16le")),
        (
            "video_to_aac",
            FfmpegArgs::new().no_video().audio_codec("aac").audio_bitrate("192k"),
        ),
        (
            "video_to_ogg",
            FfmpegArgs::new().no_video().audio_codec("libvorbis").audio_bitrate("192k"),
        ),
        // Resolution
        ("video_to_1080p", h264().size("1920x1080").video_bitrate("5000k")),
        ("video_to_720p", h264().size("1280x720").video_bitrate("2500k")),
        ("video_to_480p", h264().size("854x480").video_bitrate("1000k")),
        // Frame rate
        ("video_to_30fps", h264().fps(30)),
        ("video_to_24fps", h264().fps(24)),
        ("video_to_60fps", h264().fps(60)),
        (
            "optimize_video",
            h264()
                .size("1280x720")
                .video_bitrate("1500k")
                .audio_bitrate("128k")
                .output_options(&["-movflags", "+faststart"]),
        ),
    ]
}

pub fn register(registry: &mut RegistryBuilder, tools: &ToolsConfig) {
    for (key, args) in presets() {
        registry.insert(key, FfmpegConverter::new(tools.ffmpeg_path.clone(), args));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, ToolCatalog};
    use std::collections::HashSet;

    #[test]
    fn test_presets_cover_video_tools() {
        let keys: HashSet<_> = presets().into_iter().map(|(key, _)| key).collect();
        let catalog = ToolCatalog::builtin();
        for tool in catalog.list_by_category(Category::Videos) {
            if tool.converter.starts_with("media_") {
                continue;
            }
            assert!(keys.contains(tool.converter), "missing preset for {}", tool.converter);
        }
    }

    #[test]
    fn test_gif_preset() {
        let (_, gif) = presets()
            .into_iter()
            .find(|(key, _)| *key == "video_to_gif")
            .unwrap();
        assert_eq!(gif.fps, Some(10));
        assert_eq!(gif.duration, Some(5));
        assert!(gif.video_codec.is_none());
    }
}
