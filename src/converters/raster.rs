//! Raster image conversions backed by the `image` crate

use async_trait::async_trait;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use super::{blocking, ConversionOutput, ConvertError, Converter, RegistryBuilder, Unsupported};
use crate::config::ToolsConfig;
use crate::jobs::ConversionJob;

/// Output format of an image conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    Png,
    Jpeg { quality: u8 },
    /// Lossless WebP
    Webp,
    Tiff,
    Avif { quality: u8 },
}

pub struct ImageConverter {
    target: ImageTarget,
}

impl ImageConverter {
    pub fn new(target: ImageTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl Converter for ImageConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let output = job.target_path();
        let target = self.target;

        let written = output.clone();
        blocking(move || {
            let img = decode_image(&source)?;
            encode_image(&img, target, &written)
        })
        .await?;

        info!("🖼️ Converted {} to {:?}", job.source_filename, self.target);
        Ok(ConversionOutput::new(output))
    }
}

/// Decode an image, sniffing the format from content rather than trusting the extension
pub fn decode_image(path: &Path) -> Result<DynamicImage, ConvertError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ConvertError::failed(format!("Failed to decode image: {}", e)))
}

pub fn encode_image(img: &DynamicImage, target: ImageTarget, path: &Path) -> Result<(), ConvertError> {
    let encode_err = |e: image::ImageError| ConvertError::failed(format!("Failed to encode image: {}", e));

    match target {
        ImageTarget::Png => img.save_with_format(path, ImageFormat::Png).map_err(encode_err),
        ImageTarget::Tiff => img.save_with_format(path, ImageFormat::Tiff).map_err(encode_err),
        ImageTarget::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            let writer = BufWriter::new(File::create(path)?);
            JpegEncoder::new_with_quality(writer, quality)
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(encode_err)
        }
        ImageTarget::Webp => {
            let rgba = img.to_rgba8();
            let writer = BufWriter::new(File::create(path)?);
            WebPEncoder::new_lossless(writer)
                .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
                .map_err(encode_err)
        }
        ImageTarget::Avif { quality } => {
            let rgba = img.to_rgba8();
            let writer = BufWriter::new(File::create(path)?);
            AvifEncoder::new_with_speed_quality(writer, 8, quality)
                .write_image(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
                .map_err(encode_err)
        }
    }
}

pub fn register(registry: &mut RegistryBuilder, tools: &ToolsConfig) {
    let jpeg = ImageTarget::Jpeg {
        quality: tools.image_quality,
    };
    let avif = ImageTarget::Avif {
        quality: tools.image_quality,
    };

    let table: [(&'static str, ImageTarget); 14] = [
        ("jpg_to_png", ImageTarget::Png),
        ("jpg_to_webp", ImageTarget::Webp),
        ("jpg_to_tiff", ImageTarget::Tiff),
        ("jpg_to_avif", avif),
        ("png_to_jpg", jpeg),
        ("png_to_webp", ImageTarget::Webp),
        ("png_to_tiff", ImageTarget::Tiff),
        ("png_to_avif", avif),
        ("webp_to_png", ImageTarget::Png),
        ("webp_to_jpg", jpeg),
        ("webp_to_tiff", ImageTarget::Tiff),
        ("tiff_to_png", ImageTarget::Png),
        ("tiff_to_jpg", jpeg),
        ("tiff_to_webp", ImageTarget::Webp),
    ];
    for (key, target) in table {
        registry.insert(key, ImageConverter::new(target));
    }

    // Decoding AVIF needs the native dav1d library
    for key in ["avif_to_png", "avif_to_jpg", "avif_to_webp"] {
        registry.insert(key, Unsupported::new("AVIF decoding is not available in this build"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;
    use crate::jobs::JobId;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(path: &Path) {
        let img = RgbaImage::from_fn(8, 6, |x, y| Rgba([(x * 30) as u8, (y * 40) as u8, 120, 200]));
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }

    #[tokio::test]
    async fn test_png_to_jpg() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("pixel.png");
        write_png(&source);

        let tool = ToolCatalog::builtin().lookup_by_slug("png-to-jpg").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "pixel.png", tool);
        let converter = ImageConverter::new(ImageTarget::Jpeg { quality: 90 });
        let output = converter.convert(&job).await.unwrap();

        assert!(output.output_path.ends_with("pixel.jpg"));
        let decoded = decode_image(&output.output_path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
        let format = ImageReader::open(&output.output_path)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(format, Some(ImageFormat::Jpeg));
    }

    #[tokio::test]
    async fn test_png_to_webp_keeps_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("pixel.png");
        write_png(&source);

        let tool = ToolCatalog::builtin().lookup_by_slug("png-to-webp").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "pixel.png", tool);
        let output = ImageConverter::new(ImageTarget::Webp).convert(&job).await.unwrap();
        let decoded = decode_image(&output.output_path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[tokio::test]
    async fn test_garbage_input_fails() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("broken.png");
        std::fs::write(&source, b"definitely not an image").unwrap();

        let tool = ToolCatalog::builtin().lookup_by_slug("png-to-jpg").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "broken.png", tool);
        let result = ImageConverter::new(ImageTarget::Png).convert(&job).await;
        assert!(matches!(result, Err(ConvertError::Failed(_))));
    }
}
