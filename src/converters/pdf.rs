//! PDF reading, writing and maintenance backed by `lopdf`

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageFormat};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info, warn};

use super::office::{text_to_rtf, write_docx};
use super::raster::decode_image;
use super::{blocking, ConversionOutput, ConvertError, Converter, RegistryBuilder};
use crate::jobs::ConversionJob;

const LINES_PER_PAGE: usize = 50;
const CHARS_PER_LINE: usize = 90;

fn pdf_err(e: lopdf::Error) -> ConvertError {
    ConvertError::failed(format!("PDF error: {}", e))
}

/// `Document::save` reports plain I/O errors, unlike the lopdf parsing calls
fn save_pdf(doc: &mut Document, path: &Path) -> Result<(), ConvertError> {
    doc.save(path)
        .map_err(|e| ConvertError::failed(format!("Failed to write PDF: {}", e)))?;
    Ok(())
}

pub fn load_pdf(path: &Path) -> Result<Document, ConvertError> {
    Document::load(path).map_err(|e| ConvertError::failed(format!("Failed to read PDF: {}", e)))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Render plain text onto Letter pages in Helvetica. Returns the number of pages written.
pub fn write_text_pdf(path: &Path, text: &str) -> Result<usize, ConvertError> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let lines = wrap_lines(&sanitize_text(text), CHARS_PER_LINE);
    let mut page_ids = Vec::new();

    // An empty document still gets one blank page
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    for page_lines in chunks {
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            format_text_for_pdf(page_lines).into_bytes(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    finish_document(&mut doc, pages_id, &page_ids);
    doc.compress();
    save_pdf(&mut doc, path)?;
    Ok(page_ids.len())
}

/// Embed a single image on a page of the same size
pub fn write_image_pdf(source: &Path, path: &Path) -> Result<(), ConvertError> {
    let img = decode_image(source)?;
    let (width, height) = img.dimensions();
    let is_jpeg = ::image::ImageReader::open(source)?
        .with_guessed_format()?
        .format()
        == Some(ImageFormat::Jpeg);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_stream = image_stream(&img, is_jpeg.then(|| std::fs::read(source)).transpose()?)?;
    let image_id = doc.add_object(image_stream);
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            "Im1" => image_id,
        },
    });

    let content = format!("q\n{} 0 0 {} 0 0 cm\n/Im1 Do\nQ\n", width, height);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), (width as i64).into(), (height as i64).into()],
        "Resources" => resources_id,
        "Contents" => content_id,
    });

    finish_document(&mut doc, pages_id, &[page_id]);
    save_pdf(&mut doc, path)?;
    Ok(())
}

/// Image XObject. Gray and YCbCr JPEG data is passed through untouched; everything else,
/// CMYK JPEGs included, is flattened to the decoded RGB pixels.
fn image_stream(img: &DynamicImage, jpeg_bytes: Option<Vec<u8>>) -> Result<Stream, ConvertError> {
    let (width, height) = img.dimensions();

    let passthrough = jpeg_bytes.and_then(|bytes| match jpeg_components(&bytes) {
        Some(1) => Some(("DeviceGray", bytes)),
        Some(3) => Some(("DeviceRGB", bytes)),
        other => {
            debug!("Re-encoding JPEG with {:?} components", other);
            None
        }
    });

    if let Some((color_space, bytes)) = passthrough {
        return Ok(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            bytes,
        ));
    }

    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        img.to_rgb8().into_raw(),
    );
    if let Err(e) = stream.compress() {
        debug!("Leaving image stream uncompressed: {}", e);
    }
    Ok(stream)
}

/// Component count from the JPEG frame header: 1 gray, 3 YCbCr, 4 CMYK or YCCK
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOF0-SOF15, minus DHT, JPG and DAC which share the range
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return bytes.get(pos + 9).copied();
        }
        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        pos += 2 + len;
    }
    None
}

fn finish_document(doc: &mut Document, pages_id: ObjectId, page_ids: &[ObjectId]) {
    let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
}

fn format_text_for_pdf(lines: &[String]) -> String {
    let mut content = String::new();
    content.push_str("BT\n");
    content.push_str("/F1 11 Tf\n");
    content.push_str("50 742 Td\n");
    content.push_str("14 TL\n");

    for line in lines {
        let _ = writeln!(content, "({}) Tj T*", escape_pdf_string(line));
    }

    content.push_str("ET\n");
    content
}

fn escape_pdf_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\\' => escaped.push_str("\\\\"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Map text onto what the standard Type1 fonts can show: common typographic characters
/// get ASCII stand-ins, anything else outside printable ASCII becomes `?`.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let replacement = match c {
            '\u{20B9}' => "Rs.",
            '\u{20AC}' => "EUR",
            '\u{00A3}' => "GBP",
            '\u{00A5}' => "JPY",
            '\u{00A9}' => "(c)",
            '\u{00AE}' => "(R)",
            '\u{2122}' => "(TM)",
            '\u{00B0}' => " deg",
            '\u{00B1}' => "+/-",
            '\u{00D7}' => "x",
            '\u{00F7}' => "/",
            '\u{2022}' => "*",
            '\u{2013}' => "-",
            '\u{2014}' => "--",
            '\u{2018}' | '\u{2019}' => "'",
            '\u{201C}' | '\u{201D}' => "\"",
            '\u{2026}' => "...",
            '\t' => "    ",
            '\n' | '\r' => {
                out.push(c);
                continue;
            }
            c if (' '..='~').contains(&c) => {
                out.push(c);
                continue;
            }
            _ => "?",
        };
        out.push_str(replacement);
    }
    out
}

/// Split text into lines no longer than `width` characters
fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for line in text.lines() {
        if line.chars().count() <= width {
            lines.push(line.to_string());
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        for chunk in chars.chunks(width) {
            lines.push(chunk.iter().collect());
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Document information dictionary fields
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
}

pub fn read_metadata(doc: &Document) -> PdfMetadata {
    let info = info_dictionary(doc);
    let field = |key: &[u8]| info.and_then(|dict| dict_string(doc, dict, key));

    PdfMetadata {
        title: field(b"Title"),
        author: field(b"Author"),
        subject: field(b"Subject"),
        keywords: field(b"Keywords"),
        creator: field(b"Creator"),
        producer: field(b"Producer"),
        creation_date: field(b"CreationDate").map(|d| d.trim_start_matches("D:").to_string()),
        modification_date: field(b"ModDate").map(|d| d.trim_start_matches("D:").to_string()),
        page_count: doc.get_pages().len(),
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn dict_string(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let obj = match dict.get(key).ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        obj => obj,
    };
    let decoded = decode_text_string(obj.as_str().ok()?);
    let trimmed = decoded.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// PDF text strings are UTF-16BE with a BOM, or a single-byte encoding
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Text of every page, in page order. Pages whose fonts cannot be decoded come back empty.
pub fn extract_page_texts(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .keys()
        .map(|&number| match doc.extract_text(&[number]) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Could not extract text from page {}: {}", number, e);
                String::new()
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Converters
// ---------------------------------------------------------------------------

/// Output of a PDF text extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfTextTarget {
    Txt,
    Html,
    Docx,
    Rtf,
}

pub struct PdfTextConverter {
    target: PdfTextTarget,
}

impl PdfTextConverter {
    pub fn new(target: PdfTextTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl Converter for PdfTextConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let output = job.target_path();
        let filename = job.source_filename.clone();
        let target = self.target;

        let written = output.clone();
        blocking(move || {
            let doc = load_pdf(&source)?;
            let meta = read_metadata(&doc);
            let pages = extract_page_texts(&doc);

            match target {
                PdfTextTarget::Txt => std::fs::write(&written, render_pdf_text(&filename, &meta, &pages))?,
                PdfTextTarget::Html => std::fs::write(&written, render_pdf_html(&filename, &meta, &pages))?,
                PdfTextTarget::Rtf => {
                    std::fs::write(&written, text_to_rtf(&render_pdf_text(&filename, &meta, &pages)))?
                }
                PdfTextTarget::Docx => {
                    let title = meta.title.clone().unwrap_or_else(|| "PDF Document".to_string());
                    let mut body = format!(
                        "Author: {}    Pages: {}\nCreated: {}\n",
                        meta.author.as_deref().unwrap_or("Unknown"),
                        meta.page_count,
                        meta.creation_date.as_deref().unwrap_or("Unknown"),
                    );
                    if pages.iter().all(|page| page.is_empty()) {
                        body.push_str("Note: Could not extract text from this PDF (it may be scanned or complex).\n");
                    }
                    for page in &pages {
                        body.push_str(page);
                        body.push('\n');
                    }
                    write_docx(&written, Some(&title), &body)?;
                }
            }
            Ok(())
        })
        .await?;

        info!("📄 Extracted PDF text from {} as {:?}", job.source_filename, self.target);
        Ok(ConversionOutput::new(output))
    }
}

fn page_rule() -> String {
    "=".repeat(70)
}

pub fn render_pdf_text(filename: &str, meta: &PdfMetadata, pages: &[String]) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "PDF Document\n{}\n", page_rule());
    let _ = writeln!(text, "File: {}", filename);
    let _ = writeln!(text, "Title: {}", meta.title.as_deref().unwrap_or("Untitled"));
    let _ = writeln!(text, "Author: {}", meta.author.as_deref().unwrap_or("Unknown"));
    let _ = writeln!(text, "Total Pages: {}", meta.page_count);
    let _ = writeln!(text, "Created: {}\n", meta.creation_date.as_deref().unwrap_or("Unknown"));

    if pages.iter().all(|page| page.is_empty()) {
        text.push_str("\nNote: No text content could be extracted from this PDF.\n");
        text.push_str("The document may contain only images or use unsupported encoding.\n");
        return text;
    }

    text.push_str("\nEXTRACTED CONTENT:\n");
    for (index, page) in pages.iter().enumerate() {
        let _ = write!(text, "\n{}\nPage {}\n{}\n\n{}\n\n", page_rule(), index + 1, page_rule(), page);
    }
    text
}

fn html_escape(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

pub fn render_pdf_html(filename: &str, meta: &PdfMetadata, pages: &[String]) -> String {
    let title = html_escape(meta.title.as_deref().unwrap_or("PDF Document"));
    let mut content = String::new();
    for (index, page) in pages.iter().enumerate() {
        let _ = write!(content, "<div class=\"page\"><h3>Page {}</h3><div class=\"page-content\">", index + 1);
        for para in page.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            let _ = write!(content, "<p>{}</p>", html_escape(para));
        }
        content.push_str("</div></div>\n");
    }
    if pages.iter().all(|page| page.is_empty()) {
        content = "<p>No text content could be extracted from this PDF.</p>".to_string();
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n  <title>{title}</title>\n\
         <style>body {{ font-family: Arial, sans-serif; max-width: 900px; margin: 0 auto; padding: 30px; line-height: 1.6; }}\
         .page {{ margin-bottom: 40px; border-bottom: 2px solid #eee; }}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n<p><strong>File:</strong> {file} | <strong>Author:</strong> {author} | <strong>Pages:</strong> {pages}</p>\n\
         <div class=\"content\">\n{content}</div>\n</body>\n</html>\n",
        title = title,
        file = html_escape(filename),
        author = html_escape(meta.author.as_deref().unwrap_or("Unknown")),
        pages = meta.page_count,
        content = content,
    )
}

/// `pdf-to-json`: document metadata as JSON
pub struct PdfMetadataConverter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataReport {
    title: String,
    author: String,
    subject: String,
    creator: String,
    producer: String,
    creation_date: String,
    modification_date: String,
    page_count: usize,
    keywords: String,
}

#[async_trait]
impl Converter for PdfMetadataConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let output = job.target_path();
        let written = output.clone();

        blocking(move || {
            let meta = read_metadata(&load_pdf(&source)?);
            let report = MetadataReport {
                title: meta.title.unwrap_or_else(|| "Untitled".to_string()),
                author: meta.author.unwrap_or_else(|| "Unknown".to_string()),
                subject: meta.subject.unwrap_or_default(),
                creator: meta.creator.unwrap_or_default(),
                producer: meta.producer.unwrap_or_default(),
                creation_date: meta.creation_date.unwrap_or_default(),
                modification_date: meta.modification_date.unwrap_or_default(),
                page_count: meta.page_count,
                keywords: meta.keywords.unwrap_or_default(),
            };
            write_json(&written, &report)
        })
        .await?;

        Ok(ConversionOutput::new(output))
    }
}

/// `pdf-info`: metadata plus structure (version, page sizes, file size)
pub struct PdfInfoConverter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    number: u32,
    width: f32,
    height: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoReport {
    file: String,
    file_size: u64,
    version: String,
    encrypted: bool,
    #[serde(flatten)]
    metadata: PdfMetadata,
    pages: Vec<PageInfo>,
}

#[async_trait]
impl Converter for PdfInfoConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let output = job.target_path();
        let filename = job.source_filename.clone();
        let written = output.clone();

        blocking(move || {
            let file_size = std::fs::metadata(&source)?.len();
            let doc = load_pdf(&source)?;
            let pages = doc
                .get_pages()
                .into_iter()
                .map(|(number, id)| {
                    let (width, height) = page_size(&doc, id);
                    PageInfo { number, width, height }
                })
                .collect();
            let report = InfoReport {
                file: filename,
                file_size,
                version: doc.version.clone(),
                encrypted: doc.is_encrypted(),
                metadata: read_metadata(&doc),
                pages,
            };
            write_json(&written, &report)
        })
        .await?;

        Ok(ConversionOutput::new(output))
    }
}

/// Width and height of a page's MediaBox, following inheritance; Letter when absent
fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let mut current = Some(page_id);
    // Parent chains are short; the bound guards against reference cycles
    for _ in 0..32 {
        let Some(id) = current else { break };
        let Ok(dict) = doc.get_dictionary(id) else { break };
        if let Ok(Object::Array(media_box)) = dict.get(b"MediaBox") {
            let nums: Vec<f32> = media_box.iter().filter_map(number).collect();
            if nums.len() == 4 {
                return ((nums[2] - nums[0]).abs(), (nums[3] - nums[1]).abs());
            }
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    (612.0, 792.0)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConvertError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ConvertError::failed(format!("Failed to serialize report: {}", e)))?;
    std::fs::write(path, json)?;
    Ok(())
}

/// `pdf-optimize`: drop unreferenced objects and compress streams
pub struct PdfOptimizeConverter;

#[async_trait]
impl Converter for PdfOptimizeConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let output = job.target_path();
        let written = output.clone();

        let (before, after) = blocking(move || {
            let before = std::fs::metadata(&source)?.len();
            let mut doc = load_pdf(&source)?;
            doc.prune_objects();
            doc.delete_zero_length_streams();
            doc.renumber_objects();
            doc.compress();
            save_pdf(&mut doc, &written)?;
            Ok((before, std::fs::metadata(&written)?.len()))
        })
        .await?;

        info!("🗜️ Optimized {}: {} -> {} bytes", job.source_filename, before, after);
        Ok(ConversionOutput::new(output))
    }
}

/// `pdf-split`: extract the first page as its own document
pub struct PdfSplitConverter;

#[async_trait]
impl Converter for PdfSplitConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let output = job.target_path();
        let written = output.clone();

        blocking(move || {
            let mut doc = load_pdf(&source)?;
            let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
            if pages.is_empty() {
                return Err(ConvertError::failed("PDF has no pages"));
            }
            doc.delete_pages(&pages[1..]);
            doc.prune_objects();
            doc.compress();
            save_pdf(&mut doc, &written)?;
            Ok(())
        })
        .await?;

        Ok(ConversionOutput::new(output))
    }
}

/// `image-to-pdf` and `images-to-pdf`
pub struct ImagePdfConverter;

#[async_trait]
impl Converter for ImagePdfConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source = job.source_path.clone();
        let output = job.target_path();
        let written = output.clone();

        blocking(move || write_image_pdf(&source, &written)).await?;
        info!("🖼️ Wrapped {} in a PDF", job.source_filename);
        Ok(ConversionOutput::new(output))
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    registry.insert("pdf_to_txt", PdfTextConverter::new(PdfTextTarget::Txt));
    registry.insert("pdf_to_html", PdfTextConverter::new(PdfTextTarget::Html));
    registry.insert("pdf_to_docx", PdfTextConverter::new(PdfTextTarget::Docx));
    registry.insert("pdf_to_rtf", PdfTextConverter::new(PdfTextTarget::Rtf));
    registry.insert("pdf_to_json", PdfMetadataConverter);
    registry.insert("pdf_info", PdfInfoConverter);
    registry.insert("pdf_optimize", PdfOptimizeConverter);
    registry.insert("pdf_split", PdfSplitConverter);
    registry.insert("image_to_pdf", ImagePdfConverter);
    registry.insert("images_to_pdf", ImagePdfConverter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;
    use crate::jobs::JobId;
    use tempfile::TempDir;

    fn sample_text(lines: usize) -> String {
        (1..=lines).map(|i| format!("Line number {}", i)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_text_pdf_paginates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.pdf");

        let pages = write_text_pdf(&path, &sample_text(120)).unwrap();
        assert_eq!(pages, 3);
        let doc = load_pdf(&path).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_empty_text_gives_one_page() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.pdf");
        assert_eq!(write_text_pdf(&path, "").unwrap(), 1);
    }

    #[test]
    fn test_sanitize_and_wrap() {
        assert_eq!(sanitize_text("5\u{20AC} \u{2014} \u{201C}hi\u{201D} \u{4E2D}"), "5EUR -- \"hi\" ?");
        let lines = wrap_lines(&"x".repeat(200), 90);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].len(), 20);
        assert_eq!(escape_pdf_string("a(b)\\"), "a\\(b\\)\\\\");
    }

    #[test]
    fn test_decode_text_string() {
        assert_eq!(decode_text_string(b"Plain"), "Plain");
        assert_eq!(decode_text_string(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[tokio::test]
    async fn test_split_keeps_first_page() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("long.pdf");
        write_text_pdf(&source, &sample_text(120)).unwrap();

        let tool = ToolCatalog::builtin().lookup_by_slug("pdf-split").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "long.pdf", tool);
        let output = PdfSplitConverter.convert(&job).await.unwrap();
        assert_eq!(load_pdf(&output.output_path).unwrap().get_pages().len(), 1);
    }

    #[tokio::test]
    async fn test_pdf_to_json_reports_page_count() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("doc.pdf");
        write_text_pdf(&source, &sample_text(10)).unwrap();

        let tool = ToolCatalog::builtin().lookup_by_slug("pdf-to-json").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "doc.pdf", tool);
        let output = PdfMetadataConverter.convert(&job).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output.output_path).unwrap()).unwrap();
        assert_eq!(json["pageCount"], 1);
        assert_eq!(json["title"], "Untitled");
    }

    #[tokio::test]
    async fn test_image_pdf_page_matches_image() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("photo.png");
        ::image::RgbImage::from_pixel(40, 20, ::image::Rgb([10, 200, 30]))
            .save_with_format(&source, ImageFormat::Png)
            .unwrap();

        let tool = ToolCatalog::builtin().lookup_by_slug("image-to-pdf").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "photo.png", tool);
        let output = ImagePdfConverter.convert(&job).await.unwrap();

        let doc = load_pdf(&output.output_path).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        assert_eq!(page_size(&doc, page_id), (40.0, 20.0));
    }

    #[test]
    fn test_jpeg_components() {
        let mut rgb = Vec::new();
        ::image::RgbImage::from_pixel(4, 4, ::image::Rgb([1, 2, 3]))
            .write_to(&mut std::io::Cursor::new(&mut rgb), ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(jpeg_components(&rgb), Some(3));

        let mut gray = Vec::new();
        ::image::GrayImage::from_pixel(4, 4, ::image::Luma([128]))
            .write_to(&mut std::io::Cursor::new(&mut gray), ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(jpeg_components(&gray), Some(1));

        assert_eq!(jpeg_components(b"not a jpeg"), None);
    }

    #[test]
    fn test_cmyk_jpeg_is_not_passed_through() {
        // SOI, an empty APP0 segment, then a baseline frame header declaring 4 components
        let cmyk_header = vec![
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00,
            0x02, 0x00, 0x02, 0x04,
        ];
        assert_eq!(jpeg_components(&cmyk_header), Some(4));

        let img = DynamicImage::ImageRgb8(::image::RgbImage::from_pixel(2, 2, ::image::Rgb([9, 9, 9])));
        let stream = image_stream(&img, Some(cmyk_header)).unwrap();
        let filter = stream.dict.get(b"Filter").and_then(|f| f.as_name()).ok();
        assert_ne!(filter, Some(b"DCTDecode".as_slice()));
        assert_eq!(stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceRGB");
    }
}
