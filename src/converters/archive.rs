//! ZIP archive creation and listings

use async_trait::async_trait;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{blocking, ConversionOutput, ConvertError, Converter, RegistryBuilder};
use crate::jobs::ConversionJob;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
    pub is_dir: bool,
}

pub fn list_entries(path: &Path) -> Result<Vec<ArchiveEntry>, ConvertError> {
    let file = BufReader::new(File::open(path)?);
    let mut archive =
        ZipArchive::new(file).map_err(|e| ConvertError::failed(format!("Invalid ZIP archive: {}", e)))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| ConvertError::failed(format!("Unreadable ZIP entry {}: {}", index, e)))?;
        entries.push(ArchiveEntry {
            name: entry.name().to_string(),
            size: entry.size(),
            compressed_size: entry.compressed_size(),
            is_dir: entry.is_dir(),
        });
    }
    Ok(entries)
}

pub fn render_listing(entries: &[ArchiveEntry]) -> String {
    let mut text = String::from("ZIP Archive Contents:\n\n");
    for entry in entries {
        if entry.is_dir {
            let _ = writeln!(text, "{} - directory", entry.name);
        } else {
            let _ = writeln!(text, "{} - {} bytes", entry.name, entry.size);
        }
    }

    let files = entries.iter().filter(|entry| !entry.is_dir).count();
    let total: u64 = entries.iter().map(|entry| entry.size).sum();
    let compressed: u64 = entries.iter().map(|entry| entry.compressed_size).sum();
    let _ = write!(
        text,
        "\nTotal: {} file(s), {} bytes uncompressed, {} bytes compressed\n",
        files, total, compressed
    );
    text
}

/// Store one file in a new archive under `entry_name`, deflated at the highest level
pub fn zip_single_file(source: &Path, entry_name: &str, output: &Path) -> Result<(), ConvertError> {
    let zip_err = |e: zip::result::ZipError| ConvertError::failed(format!("Failed to write ZIP: {}", e));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut zip = ZipWriter::new(BufWriter::new(File::create(output)?));
    zip.start_file(entry_name, options).map_err(zip_err)?;
    std::io::copy(&mut BufReader::new(File::open(source)?), &mut zip)?;
    zip.finish().map_err(zip_err)?.flush()?;
    Ok(())
}

/// `file-to-zip`
pub struct FileZipConverter;

#[async_trait]
impl Converter for FileZipConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let entry_name = job.source_filename.clone();
        let output = job.target_path();
        let written = output.clone();

        blocking(move || zip_single_file(&source, &entry_name, &written)).await?;
        info!("📦 Archived {}", job.source_filename);
        Ok(ConversionOutput::new(output))
    }
}

/// `zip-to-txt`
pub struct ZipListingConverter;

#[async_trait]
impl Converter for ZipListingConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let output = job.target_path();
        let written = output.clone();

        let count = blocking(move || {
            let entries = list_entries(&source)?;
            std::fs::write(&written, render_listing(&entries))?;
            Ok(entries.len())
        })
        .await?;

        info!("📦 Listed {} entries from {}", count, job.source_filename);
        Ok(ConversionOutput::new(output))
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    registry.insert("file_to_zip", FileZipConverter);
    registry.insert("zip_to_txt", ZipListingConverter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;
    use crate::jobs::JobId;
    use std::io::Read;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_to_zip() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.txt");
        std::fs::write(&source, "zip me ".repeat(100)).unwrap();

        let tool = ToolCatalog::builtin().lookup_by_slug("file-to-zip").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "notes.txt", tool);
        let output = FileZipConverter.convert(&job).await.unwrap();
        assert!(output.output_path.ends_with("notes.zip"));

        let mut archive = ZipArchive::new(File::open(&output.output_path).unwrap()).unwrap();
        let mut entry = archive.by_name("notes.txt").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents.len(), 700);
    }

    #[tokio::test]
    async fn test_zip_listing() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("bundle.zip");
        {
            let mut zip = ZipWriter::new(File::create(&source).unwrap());
            zip.add_directory("docs/", SimpleFileOptions::default()).unwrap();
            zip.start_file("docs/a.txt", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"hello").unwrap();
            zip.start_file("b.bin", SimpleFileOptions::default()).unwrap();
            zip.write_all(&[0u8; 10]).unwrap();
            zip.finish().unwrap();
        }

        let tool = ToolCatalog::builtin().lookup_by_slug("zip-to-txt").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "bundle.zip", tool);
        let output = ZipListingConverter.convert(&job).await.unwrap();

        let text = std::fs::read_to_string(&output.output_path).unwrap();
        assert!(text.starts_with("ZIP Archive Contents:\n\n"));
        assert!(text.contains("docs/ - directory"));
        assert!(text.contains("docs/a.txt - 5 bytes"));
        assert!(text.contains("b.bin - 10 bytes"));
        assert!(text.contains("Total: 2 file(s), 15 bytes uncompressed"));
    }

    #[test]
    fn test_rejects_non_zip() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("fake.zip");
        std::fs::write(&source, b"not a zip").unwrap();
        assert!(matches!(list_entries(&source), Err(ConvertError::Failed(_))));
    }
}
