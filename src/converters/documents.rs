//! Text document conversions between plain text, Markdown, HTML and office formats

use async_trait::async_trait;
use pulldown_cmark::{html, Event, Parser, Tag, TagEnd};
use scraper::{Html, Node, Selector};
use std::path::Path;
use tracing::info;

use super::office::{read_docx_text, read_odt_text, rtf_to_text, text_to_rtf, write_docx, write_odt};
use super::pdf::write_text_pdf;
use super::{blocking, ConversionOutput, ConvertError, Converter, RegistryBuilder};
use crate::jobs::ConversionJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Plain,
    Markdown,
    Html,
    Docx,
    Odt,
    Rtf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Txt,
    Html,
    Pdf,
    Docx,
    Odt,
    Rtf,
}

/// Content pulled out of a source document
#[derive(Debug, Default)]
pub struct TextContent {
    pub title: Option<String>,
    pub text: String,
    /// Markup carried over when the source already is (or renders to) HTML
    pub html_body: Option<String>,
}

pub fn read_source(path: &Path, format: SourceFormat) -> Result<TextContent, ConvertError> {
    let content = match format {
        SourceFormat::Plain => TextContent {
            text: read_lossy(path)?,
            ..Default::default()
        },
        SourceFormat::Markdown => {
            let markdown = read_lossy(path)?;
            TextContent {
                title: markdown_title(&markdown),
                text: markdown_to_text(&markdown),
                html_body: Some(markdown_to_html(&markdown)),
            }
        }
        SourceFormat::Html => {
            let source = read_lossy(path)?;
            let (title, text) = html_to_text(&source);
            TextContent {
                title,
                text,
                html_body: None,
            }
        }
        SourceFormat::Docx => TextContent {
            text: read_docx_text(&std::fs::read(path)?)?,
            ..Default::default()
        },
        SourceFormat::Odt => TextContent {
            text: read_odt_text(&std::fs::read(path)?)?,
            ..Default::default()
        },
        SourceFormat::Rtf => TextContent {
            text: rtf_to_text(&read_lossy(path)?),
            ..Default::default()
        },
    };
    Ok(content)
}

fn read_lossy(path: &Path) -> Result<String, ConvertError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn write_target(path: &Path, format: TargetFormat, content: &TextContent) -> Result<(), ConvertError> {
    match format {
        TargetFormat::Txt => std::fs::write(path, &content.text)?,
        TargetFormat::Html => std::fs::write(path, html_document(content))?,
        TargetFormat::Rtf => std::fs::write(path, text_to_rtf(&content.text))?,
        TargetFormat::Docx => write_docx(path, None, &content.text)?,
        TargetFormat::Odt => write_odt(path, &content.text)?,
        TargetFormat::Pdf => {
            let pages = write_text_pdf(path, &content.text)?;
            info!("📄 Rendered {} PDF page(s)", pages);
        }
    }
    Ok(())
}

pub struct TextDocumentConverter {
    source: SourceFormat,
    target: TargetFormat,
}

impl TextDocumentConverter {
    pub fn new(source: SourceFormat, target: TargetFormat) -> Self {
        Self { source, target }
    }
}

#[async_trait]
impl Converter for TextDocumentConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source_path = job.source_path.clone();
        let output = job.target_path();
        let (source, target) = (self.source, self.target);

        let written = output.clone();
        blocking(move || {
            let content = read_source(&source_path, source)?;
            write_target(&written, target, &content)
        })
        .await?;

        info!("📝 Converted {} ({:?} -> {:?})", job.source_filename, source, target);
        Ok(ConversionOutput::new(output))
    }
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

pub fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(markdown));
    out
}

/// Plain text of a Markdown document, one block per line
pub fn markdown_to_text(markdown: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::Start(Tag::Item) => text.push_str("- "),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock) => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            _ => {}
        }
    }
    text
}

/// Text of the first top-level heading
fn markdown_title(markdown: &str) -> Option<String> {
    let mut in_heading = false;
    let mut title = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) if level == pulldown_cmark::HeadingLevel::H1 => {
                in_heading = true
            }
            Event::End(TagEnd::Heading(_)) if in_heading => break,
            Event::Text(t) | Event::Code(t) if in_heading => title.push_str(&t),
            _ => {}
        }
    }
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "section", "article", "header",
    "footer", "blockquote", "pre", "table", "ul", "ol",
];

/// Title and visible text of an HTML document. Scripts and styles are dropped.
pub fn html_to_text(source: &str) -> (Option<String>, String) {
    let document = Html::parse_document(source);

    let title = Selector::parse("title").ok().and_then(|selector| {
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
    });

    let mut raw = String::new();
    for node in document.root_element().descendants() {
        match node.value() {
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push('\n'),
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| matches!(el.name(), "script" | "style" | "head"))
                });
                if !hidden {
                    raw.push_str(text);
                }
            }
            _ => {}
        }
    }

    (title, collapse_whitespace(&raw))
}

/// Collapse runs of spaces within lines and drop blank lines
fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::new();
    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

fn html_escape(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// Standalone HTML page, using rendered markup when available and paragraphs otherwise
pub fn html_document(content: &TextContent) -> String {
    let title = html_escape(content.title.as_deref().unwrap_or("Document"));
    let body = match &content.html_body {
        Some(markup) => markup.clone(),
        None => content
            .text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("<p>{}</p>\n", html_escape(line)))
            .collect(),
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n  <title>{}</title>\n\
         <style>body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; line-height: 1.6; }}</style>\n\
         </head>\n<body>\n{}</body>\n</html>\n",
        title, body
    )
}

pub fn register(registry: &mut RegistryBuilder) {
    use SourceFormat as S;
    use TargetFormat as T;

    let table = [
        ("docx_to_txt", S::Docx, T::Txt),
        ("docx_to_html", S::Docx, T::Html),
        ("docx_to_pdf", S::Docx, T::Pdf),
        ("docx_to_odt", S::Docx, T::Odt),
        ("docx_to_rtf", S::Docx, T::Rtf),
        ("odt_to_docx", S::Odt, T::Docx),
        ("rtf_to_docx", S::Rtf, T::Docx),
        ("txt_to_pdf", S::Plain, T::Pdf),
        ("html_to_txt", S::Html, T::Txt),
        ("html_to_pdf", S::Html, T::Pdf),
        ("html_to_docx", S::Html, T::Docx),
        ("html_to_rtf", S::Html, T::Rtf),
        ("md_to_html", S::Markdown, T::Html),
        ("md_to_txt", S::Markdown, T::Txt),
        ("md_to_docx", S::Markdown, T::Docx),
        ("md_to_rtf", S::Markdown, T::Rtf),
    ];
    for (key, source, target) in table {
        registry.insert(key, TextDocumentConverter::new(source, target));
    }
}
