//! Audio transcoding presets

use super::ffmpeg::{FfmpegArgs, FfmpegConverter};
use super::RegistryBuilder;
use crate::config::ToolsConfig;

fn mp3(bitrate: &'static str) -> FfmpegArgs {
    FfmpegArgs::new().audio_codec("libmp3lame").audio_bitrate(bitrate)
}

fn aac(bitrate: &'static str) -> FfmpegArgs {
    FfmpegArgs::new().audio_codec("aac").audio_bitrate(bitrate)
}

fn vorbis(bitrate: &'static str) -> FfmpegArgs {
    FfmpegArgs::new().audio_codec("libvorbis").audio_bitrate(bitrate)
}

fn pcm() -> FfmpegArgs {
    FfmpegArgs::new().audio_codec("pcm_s16le")
}

fn flac() -> FfmpegArgs {
    FfmpegArgs::new().audio_codec("flac")
}

/// Encoding settings for every audio tool, keyed by converter key.
///
/// Lossy sources are re-encoded at 192k; lossless and other sources get 320k mp3 or 256k aac/ogg.
pub fn presets() -> Vec<(&'static str, FfmpegArgs)> {
    vec![
        ("mp3_to_wav", pcm().audio_frequency(44100)),
        ("mp3_to_aac", aac("192k")),
        ("mp3_to_ogg", vorbis("192k")),
        ("mp3_to_flac", flac()),
        ("wav_to_mp3", mp3("320k")),
        ("wav_to_aac", aac("256k")),
        ("wav_to_ogg", vorbis("256k")),
        ("wav_to_flac", flac()),
        ("aac_to_mp3", mp3("320k")),
        ("aac_to_wav", pcm()),
        ("aac_to_ogg", vorbis("256k")),
        ("aac_to_flac", flac()),
        ("ogg_to_mp3", mp3("320k")),
        ("ogg_to_wav", pcm()),
        ("ogg_to_aac", aac("256k")),
        ("ogg_to_flac", flac()),
        ("flac_to_mp3", mp3("320k")),
        ("flac_to_wav", pcm()),
        ("flac_to_aac", aac("256k")),
        ("flac_to_ogg", vorbis("256k")),
        // Bitrate
        ("audio_to_128k", mp3("128k")),
        ("audio_to_192k", mp3("192k")),
        ("audio_to_320k", mp3("320k")),
        // Channels
        ("audio_to_mono", mp3("192k").audio_channels(1)),
        ("audio_to_stereo", mp3("192k").audio_channels(2)),
        // Sample rate
        ("audio_to_44100_hz", mp3("192k").audio_frequency(44100)),
        ("audio_to_48000_hz", mp3("192k").audio_frequency(48000)),
        ("audio_to_96000_hz", flac().audio_frequency(96000)),
        // Web delivery
        ("optimize_audio", mp3("128k").audio_frequency(44100)),
        ("audio_to_web_aac", aac("128k")),
    ]
}

pub fn register(registry: &mut RegistryBuilder, tools: &ToolsConfig) {
    for (key, args) in presets() {
        registry.insert(key, FfmpegConverter::new(tools.ffmpeg_path.clone(), args));
    }
}
