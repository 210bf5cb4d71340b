//! Reading and writing the text content of office formats (DOCX, ODT, RTF).
//!
//! Only paragraph text is carried across; styling, tables and images are dropped.

use quick_xml::escape::{escape, resolve_predefined_entity};
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::ConvertError;

/// Plain text of a DOCX file, one line per paragraph
pub fn read_docx_text(bytes: &[u8]) -> Result<String, ConvertError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ConvertError::failed(format!("Not a valid DOCX archive: {}", e)))?;
    let xml = read_zip_entry(&mut archive, "word/document.xml")?;
    parse_paragraph_xml(&xml, &[b"p"], b"t")
}

/// Plain text of an ODT file. Bare `content.xml` documents are accepted too.
pub fn read_odt_text(bytes: &[u8]) -> Result<String, ConvertError> {
    let xml = match ZipArchive::new(Cursor::new(bytes)) {
        Ok(mut archive) => read_zip_entry(&mut archive, "content.xml")?,
        Err(_) => String::from_utf8(bytes.to_vec())
            .map_err(|_| ConvertError::failed("ODT file is neither a zip archive nor XML"))?,
    };
    parse_paragraph_xml(&xml, &[b"p", b"h"], b"")
}

fn read_zip_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, ConvertError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ConvertError::failed(format!("Failed to find {}: {}", name, e)))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| ConvertError::failed(format!("Failed to read {}: {}", name, e)))?;
    Ok(xml)
}

/// Collect text from paragraph elements.
///
/// `blocks` are the element local names that end a line. When `text_element` is non-empty,
/// only text inside that element counts (DOCX `w:t`); otherwise all text in a block counts.
fn parse_paragraph_xml(xml: &str, blocks: &[&[u8]], text_element: &[u8]) -> Result<String, ConvertError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut text = String::new();
    let mut depth_in_block = 0usize;
    let mut in_text_element = false;
    let counts = |depth: usize, in_text: bool| {
        if text_element.is_empty() {
            depth > 0
        } else {
            in_text
        }
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let local_name = e.local_name();
                let name = local_name.as_ref();
                if blocks.contains(&name) {
                    depth_in_block += 1;
                } else if !text_element.is_empty() && name == text_element {
                    in_text_element = true;
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth_in_block > 0 {
                    match e.local_name().as_ref() {
                        b"tab" => text.push('\t'),
                        b"br" | b"line-break" => text.push('\n'),
                        b"s" => text.push(' '),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = e.local_name();
                let name = local_name.as_ref();
                if blocks.contains(&name) {
                    depth_in_block = depth_in_block.saturating_sub(1);
                    if depth_in_block == 0 {
                        text.push('\n');
                    }
                } else if !text_element.is_empty() && name == text_element {
                    in_text_element = false;
                }
            }
            Ok(Event::Text(e)) => {
                if counts(depth_in_block, in_text_element) {
                    // Entity references arrive separately as `GeneralRef` events
                    let decoded = e.decode().unwrap_or_default();
                    text.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if counts(depth_in_block, in_text_element) {
                    if let Some(resolved) = resolve_reference(&e) {
                        text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ConvertError::failed(format!("XML parsing error: {}", e)));
            }
            _ => {}
        }
    }

    Ok(text)
}

/// `&amp;`, `&#233;` and friends
fn resolve_reference(e: &BytesRef) -> Option<String> {
    if let Ok(Some(ch)) = e.resolve_char_ref() {
        return Some(ch.to_string());
    }
    let name = e.decode().ok()?;
    resolve_predefined_entity(&name).map(str::to_string)
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn zip_err(e: zip::result::ZipError) -> ConvertError {
    ConvertError::failed(format!("Failed to write archive: {}", e))
}

/// Non-empty trimmed lines, one per output paragraph
fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

const DOCX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const DOCX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Word document XML with one paragraph per line; an optional title paragraph uses the Title style
pub fn docx_document_xml(title: Option<&str>, text: &str) -> String {
    let mut body = String::new();
    if let Some(title) = title {
        body.push_str(&format!(
            "<w:p><w:pPr><w:pStyle w:val=\"Title\"/><w:jc w:val=\"center\"/></w:pPr><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            escape(title)
        ));
    }
    for para in paragraphs(text) {
        body.push_str(&format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            escape(para)
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}<w:sectPr/></w:body></w:document>",
        body
    )
}

/// Write a minimal but valid DOCX package
pub fn write_docx(path: &Path, title: Option<&str>, text: &str) -> Result<(), ConvertError> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(path)?));

    zip.start_file("[Content_Types].xml", deflated()).map_err(zip_err)?;
    zip.write_all(DOCX_CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", deflated()).map_err(zip_err)?;
    zip.write_all(DOCX_RELS.as_bytes())?;
    zip.start_file("word/document.xml", deflated()).map_err(zip_err)?;
    zip.write_all(docx_document_xml(title, text).as_bytes())?;

    zip.finish().map_err(zip_err)?.flush()?;
    Ok(())
}

const ODT_MIMETYPE: &str = "application/vnd.oasis.opendocument.text";

const ODT_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
  <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.text"/>
  <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#;

pub fn odt_content_xml(text: &str) -> String {
    let body: String = paragraphs(text)
        .map(|para| format!("<text:p>{}</text:p>", escape(para)))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <office:document-content xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\" \
         xmlns:text=\"urn:oasis:names:tc:opendocument:xmlns:text:1.0\" office:version=\"1.2\">\
         <office:body><office:text>{}</office:text></office:body></office:document-content>",
        body
    )
}

/// Write a minimal ODT package. The mimetype entry must come first and be stored uncompressed.
pub fn write_odt(path: &Path, text: &str) -> Result<(), ConvertError> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(path)?));

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("mimetype", stored).map_err(zip_err)?;
    zip.write_all(ODT_MIMETYPE.as_bytes())?;
    zip.start_file("META-INF/manifest.xml", deflated()).map_err(zip_err)?;
    zip.write_all(ODT_MANIFEST.as_bytes())?;
    zip.start_file("content.xml", deflated()).map_err(zip_err)?;
    zip.write_all(odt_content_xml(text).as_bytes())?;

    zip.finish().map_err(zip_err)?.flush()?;
    Ok(())
}

/// RTF document with one `\par` per line
pub fn text_to_rtf(text: &str) -> String {
    let mut rtf = String::from("{\\rtf1\\ansi\\deff0\n{\\fonttbl{\\f0\\fnil\\fcharset0 Arial;}}\n\\f0\\fs24\n");
    for line in text.lines() {
        for c in line.chars() {
            match c {
                '\\' => rtf.push_str("\\\\"),
                '{' => rtf.push_str("\\{"),
                '}' => rtf.push_str("\\}"),
                '\t' => rtf.push_str("\\tab "),
                c if c.is_ascii() => rtf.push(c),
                // RTF \u takes a signed 16-bit value; astral characters are dropped
                c => match i16::try_from(c as u32).or_else(|_| u16::try_from(c as u32).map(|v| v as i16)) {
                    Ok(code) => rtf.push_str(&format!("\\u{}?", code)),
                    Err(_) => rtf.push('?'),
                },
            }
        }
        rtf.push_str("\\par\n");
    }
    rtf.push('}');
    rtf
}

/// Destinations whose content is never document text
const RTF_SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl", "colortbl", "stylesheet", "info", "pict", "header", "footer", "listtable",
    "listoverridetable", "generator", "themedata", "latentstyles", "datastore",
];

/// Extract plain text from RTF: paragraph marks become newlines, control groups are dropped
pub fn rtf_to_text(rtf: &str) -> String {
    let chars: Vec<char> = rtf.chars().collect();
    let mut text = String::new();
    // One entry per open group: whether its content is skipped
    let mut skip_stack: Vec<bool> = Vec::new();
    let mut skipping = false;
    // Characters to drop after a \uN escape
    let mut pending_fallback = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                skip_stack.push(skipping);
                i += 1;
            }
            '}' => {
                skipping = skip_stack.pop().unwrap_or(false);
                i += 1;
            }
            '\\' => {
                i += 1;
                let Some(&next) = chars.get(i) else { break };
                if !next.is_ascii_alphabetic() {
                    i += 1;
                    match next {
                        '\\' | '{' | '}' if !skipping => text.push(next),
                        '*' => skipping = true,
                        '~' if !skipping => text.push(' '),
                        '\'' => {
                            let hex: String = chars.iter().skip(i).take(2).collect();
                            i += hex.len();
                            if !skipping {
                                if pending_fallback > 0 {
                                    pending_fallback -= 1;
                                } else if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                                    text.push(byte as char);
                                }
                            }
                        }
                        '\n' | '\r' if !skipping => text.push('\n'),
                        _ => {}
                    }
                    continue;
                }

                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let num_start = i;
                if i < chars.len() && chars[i] == '-' {
                    i += 1;
                }
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let param: Option<i32> = chars[num_start..i].iter().collect::<String>().parse().ok();
                // A single space delimits the control word
                if i < chars.len() && chars[i] == ' ' {
                    i += 1;
                }

                if RTF_SKIPPED_DESTINATIONS.contains(&word.as_str()) {
                    skipping = true;
                    continue;
                }
                if skipping {
                    continue;
                }
                match word.as_str() {
                    "par" | "line" | "sect" | "page" => text.push('\n'),
                    "tab" => text.push('\t'),
                    "u" => {
                        if let Some(code) = param {
                            let code = if code < 0 { code + 65536 } else { code };
                            if let Some(ch) = char::from_u32(code as u32) {
                                text.push(ch);
                            }
                            pending_fallback = 1;
                        }
                    }
                    _ => {}
                }
            }
            '\r' | '\n' => i += 1,
            _ => {
                if !skipping {
                    if pending_fallback > 0 {
                        pending_fallback -= 1;
                    } else {
                        text.push(c);
                    }
                }
                i += 1;
            }
        }
    }

    text
}
