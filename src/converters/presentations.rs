//! PowerPoint output: slides built from text, JSON, CSV or Markdown, packaged as a
//! minimal PresentationML archive (one master, one blank layout, one theme).

use async_trait::async_trait;
use quick_xml::escape::escape;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{blocking, ConversionOutput, ConvertError, Converter, RegistryBuilder};
use crate::jobs::ConversionJob;

/// English Metric Units per inch
const EMU_PER_INCH: f64 = 914_400.0;

/// 4:3 slide, 10 x 7.5 inches
const SLIDE_WIDTH: i64 = 9_144_000;
const SLIDE_HEIGHT: i64 = 6_858_000;

const TITLE_COLOR: &str = "363636";
const BODY_COLOR: &str = "666666";
const TABLE_BORDER_COLOR: &str = "CCCCCC";

/// Rows shown on a CSV table slide
const MAX_TABLE_ROWS: usize = 10;

/// Position and size in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Frame {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    fn xml(&self, element: &str) -> String {
        format!(
            "<{el}><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></{el}>",
            emu(self.x),
            emu(self.y),
            emu(self.w),
            emu(self.h),
            el = element
        )
    }
}

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,
    pub text: String,
    /// Points
    pub font_size: u32,
    pub bold: bool,
    pub color: &'static str,
    pub typeface: Option<&'static str>,
}

impl TextBox {
    fn new(frame: Frame, text: impl Into<String>, font_size: u32, color: &'static str) -> Self {
        Self {
            frame,
            text: text.into(),
            font_size,
            bold: false,
            color,
            typeface: None,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn typeface(mut self, typeface: &'static str) -> Self {
        self.typeface = Some(typeface);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text(TextBox),
    Table {
        frame: Frame,
        rows: Vec<Vec<String>>,
        font_size: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    pub shapes: Vec<Shape>,
}

impl Slide {
    fn with(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// One slide per blank-line separated block; a single slide when there are no blocks
pub fn slides_from_text(text: &str) -> Vec<Slide> {
    let body = |text: String| {
        Slide::with(vec![Shape::Text(TextBox::new(
            Frame::new(0.5, 0.5, 9.0, 5.0),
            text,
            18,
            TITLE_COLOR,
        ))])
    };

    let slides: Vec<Slide> = text
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| body(truncate_chars(block, 500)))
        .collect();

    if slides.is_empty() {
        vec![body(truncate_chars(text, 1000))]
    } else {
        slides
    }
}

/// One slide per array element (or for the single top-level value), titled from
/// `title` or `name`, with the pretty-printed item as content
pub fn slides_from_json(data: &Value) -> Vec<Slide> {
    let items = match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    items
        .into_iter()
        .map(|item| {
            let content = serde_json::to_string_pretty(item).unwrap_or_default();
            Slide::with(vec![
                Shape::Text(TextBox::new(Frame::new(0.5, 0.5, 9.0, 1.0), json_title(item), 32, TITLE_COLOR).bold()),
                Shape::Text(
                    TextBox::new(Frame::new(0.5, 2.0, 9.0, 4.0), truncate_chars(&content, 800), 14, BODY_COLOR)
                        .typeface("Courier New"),
                ),
            ])
        })
        .collect()
}

fn json_title(item: &Value) -> String {
    ["title", "name"]
        .iter()
        .filter_map(|key| item.get(key))
        .find_map(|value| match value {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| "Data Slide".to_string())
}

/// A single "CSV Data" slide holding the first rows as a table
pub fn slides_from_csv(content: &str) -> Result<Vec<Slide>, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records().take(MAX_TABLE_ROWS) {
        let record = record.map_err(|e| ConvertError::failed(format!("Failed to parse CSV: {}", e)))?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    let mut shapes = vec![Shape::Text(
        TextBox::new(Frame::new(0.5, 0.3, 9.0, 0.5), "CSV Data", 28, TITLE_COLOR).bold(),
    )];
    if !rows.is_empty() {
        shapes.push(Shape::Table {
            frame: Frame::new(0.5, 1.0, 9.0, 4.0),
            rows,
            font_size: 10,
        });
    }
    Ok(vec![Slide::with(shapes)])
}

/// One slide per `#` or `##` section. The first line of a section is its title; the rest,
/// stripped of emphasis and code markers, is the body.
pub fn slides_from_markdown(markdown: &str) -> Vec<Slide> {
    let mut sections: Vec<String> = vec![String::new()];
    for line in markdown.lines() {
        match line.strip_prefix("# ").or_else(|| line.strip_prefix("## ")) {
            Some(heading) => sections.push(format!("{}\n", heading)),
            None => {
                if let Some(current) = sections.last_mut() {
                    current.push_str(line);
                    current.push('\n');
                }
            }
        }
    }

    sections
        .iter()
        .filter(|section| !section.trim().is_empty())
        .map(|section| {
            let (title, rest) = section.split_once('\n').unwrap_or((section.as_str(), ""));
            let body: String = rest.trim().chars().filter(|c| !matches!(c, '*' | '_' | '`')).collect();
            Slide::with(vec![
                Shape::Text(TextBox::new(Frame::new(0.5, 0.5, 9.0, 1.0), title.trim(), 32, TITLE_COLOR).bold()),
                Shape::Text(TextBox::new(Frame::new(0.5, 2.0, 9.0, 4.0), truncate_chars(&body, 600), 18, BODY_COLOR)),
            ])
        })
        .collect()
}

const NAMESPACES: &str = "xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
     xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
     xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"";

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const GROUP_HEADER: &str = "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
     <p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>\
     <a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>";

fn relationships(rels: &[(String, &str, String)]) -> String {
    let body: String = rels
        .iter()
        .map(|(id, kind, target)| {
            format!("<Relationship Id=\"{}\" Type=\"{}/{}\" Target=\"{}\"/>", id, REL_BASE, kind, target)
        })
        .collect();
    format!(
        "{}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{}</Relationships>",
        XML_DECL, body
    )
}

fn content_types(slide_count: usize) -> String {
    let slides: String = (1..=slide_count)
        .map(|n| {
            format!(
                "<Override PartName=\"/ppt/slides/slide{}.xml\" \
                 ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>",
                n
            )
        })
        .collect();
    format!(
        "{}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/ppt/presentation.xml\" \
         ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
         <Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" \
         ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
         <Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" \
         ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
         <Override PartName=\"/ppt/theme/theme1.xml\" \
         ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\
         {}</Types>",
        XML_DECL, slides
    )
}

fn presentation_xml(slide_count: usize) -> String {
    let slide_ids: String = (0..slide_count)
        .map(|i| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 256 + i, i + 2))
        .collect();
    format!(
        "{}<p:presentation {}>\
         <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
         <p:sldIdLst>{}</p:sldIdLst>\
         <p:sldSz cx=\"{}\" cy=\"{}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
         </p:presentation>",
        XML_DECL, NAMESPACES, slide_ids, SLIDE_WIDTH, SLIDE_HEIGHT
    )
}

fn slide_master_xml() -> String {
    format!(
        "{}<p:sldMaster {}><p:cSld><p:spTree>{}</p:spTree></p:cSld>\
         <p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" \
         accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" \
         folHlink=\"folHlink\"/>\
         <p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\
         </p:sldMaster>",
        XML_DECL, NAMESPACES, GROUP_HEADER
    )
}

fn slide_layout_xml() -> String {
    format!(
        "{}<p:sldLayout {} type=\"blank\" preserve=\"1\"><p:cSld name=\"Blank\"><p:spTree>{}</p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
        XML_DECL, NAMESPACES, GROUP_HEADER
    )
}

fn theme_xml() -> String {
    let colors: String = [
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ]
    .iter()
    .map(|(name, rgb)| format!("<a:{n}><a:srgbClr val=\"{}\"/></a:{n}>", rgb, n = name))
    .collect();
    let solid = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>";
    let line = format!("<a:ln w=\"6350\">{}</a:ln>", solid);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        "{decl}<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"Office Theme\">\
         <a:themeElements><a:clrScheme name=\"Office\">\
         <a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>\
         <a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>\
         <a:dk2><a:srgbClr val=\"44546A\"/></a:dk2><a:lt2><a:srgbClr val=\"E7E6E6\"/></a:lt2>{colors}\
         </a:clrScheme>\
         <a:fontScheme name=\"Office\">\
         <a:majorFont><a:latin typeface=\"Calibri Light\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>\
         <a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>\
         </a:fontScheme>\
         <a:fmtScheme name=\"Office\">\
         <a:fillStyleLst>{fills}</a:fillStyleLst><a:lnStyleLst>{lines}</a:lnStyleLst>\
         <a:effectStyleLst>{effects}</a:effectStyleLst><a:bgFillStyleLst>{fills}</a:bgFillStyleLst>\
         </a:fmtScheme></a:themeElements></a:theme>",
        decl = XML_DECL,
        colors = colors,
        fills = solid.repeat(3),
        lines = line.repeat(3),
        effects = effect.repeat(3),
    )
}

fn run_properties(font_size: u32, bold: bool, color: &str, typeface: Option<&str>) -> String {
    let latin = typeface
        .map(|face| format!("<a:latin typeface=\"{}\"/>", escape(face)))
        .unwrap_or_default();
    format!(
        "<a:rPr lang=\"en-US\" sz=\"{}\"{} dirty=\"0\"><a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>{}</a:rPr>",
        font_size * 100,
        if bold { " b=\"1\"" } else { "" },
        color,
        latin
    )
}

/// One `<a:p>` per line; blank lines keep their height through `endParaRPr`
fn paragraphs_xml(text: &str, props: &str, font_size: u32) -> String {
    let lines: Vec<&str> = if text.is_empty() { vec![""] } else { text.lines().collect() };
    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                format!("<a:p><a:endParaRPr lang=\"en-US\" sz=\"{}\"/></a:p>", font_size * 100)
            } else {
                format!("<a:p><a:r>{}<a:t>{}</a:t></a:r></a:p>", props, escape(*line))
            }
        })
        .collect()
}

fn text_box_xml(id: usize, text_box: &TextBox) -> String {
    let props = run_properties(text_box.font_size, text_box.bold, text_box.color, text_box.typeface);
    format!(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"TextBox {id}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
         <p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>\
         <p:txBody><a:bodyPr wrap=\"square\" rtlCol=\"0\"><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody>\
         </p:sp>",
        text_box.frame.xml("a:xfrm"),
        paragraphs_xml(&text_box.text, &props, text_box.font_size),
        id = id
    )
}

fn table_xml(id: usize, frame: &Frame, rows: &[Vec<String>], font_size: u32) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
    let column_width = emu(frame.w) / columns as i64;
    let row_height = emu(frame.h) / rows.len().max(1) as i64;

    let border: String = ["lnL", "lnR", "lnT", "lnB"]
        .iter()
        .map(|side| {
            format!(
                "<a:{s} w=\"12700\"><a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill></a:{s}>",
                TABLE_BORDER_COLOR,
                s = side
            )
        })
        .collect();
    let props = format!("<a:rPr lang=\"en-US\" sz=\"{}\" dirty=\"0\"/>", font_size * 100);

    let grid: String = (0..columns)
        .map(|_| format!("<a:gridCol w=\"{}\"/>", column_width))
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = (0..columns)
                .map(|i| {
                    let text = row.get(i).map(String::as_str).unwrap_or("");
                    let paragraph = if text.is_empty() {
                        format!("<a:p><a:endParaRPr lang=\"en-US\" sz=\"{}\"/></a:p>", font_size * 100)
                    } else {
                        format!("<a:p><a:r>{}<a:t>{}</a:t></a:r></a:p>", props, escape(text))
                    };
                    format!(
                        "<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>{}</a:txBody><a:tcPr>{}</a:tcPr></a:tc>",
                        paragraph, border
                    )
                })
                .collect();
            format!("<a:tr h=\"{}\">{}</a:tr>", row_height, cells)
        })
        .collect();

    format!(
        "<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id=\"{id}\" name=\"Table {id}\"/>\
         <p:cNvGraphicFramePr><a:graphicFrameLocks noGrp=\"1\"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>\
         {}<a:graphic><a:graphicData uri=\"http://schemas.openxmlformats.org/drawingml/2006/table\">\
         <a:tbl><a:tblPr firstRow=\"1\"/><a:tblGrid>{}</a:tblGrid>{}</a:tbl></a:graphicData></a:graphic>\
         </p:graphicFrame>",
        frame.xml("p:xfrm"),
        grid,
        body,
        id = id
    )
}

pub fn slide_xml(slide: &Slide) -> String {
    // Shape ids start after the group shape's id 1
    let shapes: String = slide
        .shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| match shape {
            Shape::Text(text_box) => text_box_xml(i + 2, text_box),
            Shape::Table { frame, rows, font_size } => table_xml(i + 2, frame, rows, *font_size),
        })
        .collect();
    format!(
        "{}<p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld>\
         <p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>",
        XML_DECL, NAMESPACES, GROUP_HEADER, shapes
    )
}

fn zip_err(e: zip::result::ZipError) -> ConvertError {
    ConvertError::failed(format!("Failed to write presentation: {}", e))
}

/// Write the slides as a PPTX package. An empty deck still gets one blank slide.
pub fn write_pptx(path: &Path, slides: &[Slide]) -> Result<usize, ConvertError> {
    let blank = [Slide::default()];
    let slides = if slides.is_empty() { &blank[..] } else { slides };

    let mut zip = ZipWriter::new(BufWriter::new(File::create(path)?));
    let mut part = |name: &str, content: String| -> Result<(), ConvertError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    };

    part("[Content_Types].xml", content_types(slides.len()))?;
    part(
        "_rels/.rels",
        relationships(&[("rId1".to_string(), "officeDocument", "ppt/presentation.xml".to_string())]),
    )?;

    let mut presentation_rels = vec![(
        "rId1".to_string(),
        "slideMaster",
        "slideMasters/slideMaster1.xml".to_string(),
    )];
    for n in 1..=slides.len() {
        presentation_rels.push((format!("rId{}", n + 1), "slide", format!("slides/slide{}.xml", n)));
    }
    presentation_rels.push((format!("rId{}", slides.len() + 2), "theme", "theme/theme1.xml".to_string()));

    part("ppt/presentation.xml", presentation_xml(slides.len()))?;
    part("ppt/_rels/presentation.xml.rels", relationships(&presentation_rels))?;
    part("ppt/slideMasters/slideMaster1.xml", slide_master_xml())?;
    part(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        relationships(&[
            ("rId1".to_string(), "slideLayout", "../slideLayouts/slideLayout1.xml".to_string()),
            ("rId2".to_string(), "theme", "../theme/theme1.xml".to_string()),
        ]),
    )?;
    part("ppt/slideLayouts/slideLayout1.xml", slide_layout_xml())?;
    part(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        relationships(&[("rId1".to_string(), "slideMaster", "../slideMasters/slideMaster1.xml".to_string())]),
    )?;
    part("ppt/theme/theme1.xml", theme_xml())?;

    let layout_rel = relationships(&[("rId1".to_string(), "slideLayout", "../slideLayouts/slideLayout1.xml".to_string())]);
    for (i, slide) in slides.iter().enumerate() {
        part(&format!("ppt/slides/slide{}.xml", i + 1), slide_xml(slide))?;
        part(&format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), layout_rel.clone())?;
    }

    zip.finish().map_err(zip_err)?.flush()?;
    Ok(slides.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckSource {
    Text,
    Json,
    Csv,
    Markdown,
}

pub struct PresentationConverter {
    source: DeckSource,
}

impl PresentationConverter {
    pub fn new(source: DeckSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Converter for PresentationConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let content = tokio::fs::read(&job.source_path).await?;
        let content = String::from_utf8_lossy(&content).into_owned();
        let output = job.target_path();
        let source = self.source;

        let written = output.clone();
        let slide_count = blocking(move || {
            let slides = match source {
                DeckSource::Text => slides_from_text(&content),
                DeckSource::Json => {
                    let data: Value = serde_json::from_str(&content)
                        .map_err(|e| ConvertError::failed(format!("Invalid JSON: {}", e)))?;
                    slides_from_json(&data)
                }
                DeckSource::Csv => slides_from_csv(&content)?,
                DeckSource::Markdown => slides_from_markdown(&content),
            };
            write_pptx(&written, &slides)
        })
        .await?;

        info!("📽️ Built {} slides from {}", slide_count, job.source_filename);
        Ok(ConversionOutput::new(output))
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    let table = [
        ("txt_to_pptx", DeckSource::Text),
        ("json_to_pptx", DeckSource::Json),
        ("csv_to_pptx", DeckSource::Csv),
        ("md_to_pptx", DeckSource::Markdown),
    ];
    for (key, source) in table {
        registry.insert(key, PresentationConverter::new(source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;
    use crate::jobs::JobId;
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::{Cursor, Read};
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn texts(slide: &Slide) -> Vec<&str> {
        slide
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Text(text_box) => Some(text_box.text.as_str()),
                Shape::Table { .. } => None,
            })
            .collect()
    }

    /// Every `a:t` run in a slide part, in document order
    fn slide_runs(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut runs = Vec::new();
        let mut in_run = false;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.local_name().as_ref() == b"t" => {
                    in_run = true;
                    runs.push(String::new());
                }
                Event::End(e) if e.local_name().as_ref() == b"t" => in_run = false,
                Event::Text(t) if in_run => {
                    runs.last_mut().unwrap().push_str(&t.decode().unwrap());
                }
                Event::GeneralRef(r) if in_run => {
                    let name = r.decode().unwrap();
                    let resolved = quick_xml::escape::resolve_predefined_entity(&name).unwrap();
                    runs.last_mut().unwrap().push_str(resolved);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        runs
    }

    #[test]
    fn test_text_blocks_become_slides() {
        let slides = slides_from_text("Intro\nline two\n\n\n\nSecond block\n\n   \n");
        assert_eq!(slides.len(), 2);
        assert_eq!(texts(&slides[0]), vec!["Intro\nline two"]);
        assert_eq!(texts(&slides[1]), vec!["Second block"]);

        let long = "x".repeat(700);
        assert_eq!(texts(&slides_from_text(&long)[0])[0].len(), 500);

        // Whitespace-only input still yields one slide
        assert_eq!(slides_from_text("  ").len(), 1);
    }

    #[test]
    fn test_json_titles() {
        let data = serde_json::json!([
            {"title": "Quarterly", "value": 1},
            {"name": "Widget"},
            {"id": 7}
        ]);
        let slides = slides_from_json(&data);
        let titles: Vec<&str> = slides.iter().map(|slide| texts(slide)[0]).collect();
        assert_eq!(titles, vec!["Quarterly", "Widget", "Data Slide"]);
        assert!(texts(&slides[0])[1].contains("\"value\": 1"));

        assert_eq!(slides_from_json(&serde_json::json!({"name": "Solo"})).len(), 1);
    }

    #[test]
    fn test_csv_table_is_capped() {
        let csv: String = (0..15).map(|i| format!("r{}, value {}\n", i, i)).collect();
        let slides = slides_from_csv(&csv).unwrap();
        assert_eq!(slides.len(), 1);
        match &slides[0].shapes[1] {
            Shape::Table { rows, .. } => {
                assert_eq!(rows.len(), MAX_TABLE_ROWS);
                assert_eq!(rows[0], vec!["r0", "value 0"]);
            }
            other => panic!("expected a table, got {:?}", other),
        }
    }

    #[test]
    fn test_markdown_sections() {
        let md = "Preface text\n# First *bold* title\nSome `code` and _emphasis_\n### Not a split\n## Second\nbody\n";
        let slides = slides_from_markdown(md);
        assert_eq!(slides.len(), 3);
        assert_eq!(texts(&slides[0]), vec!["Preface text", ""]);
        assert_eq!(texts(&slides[1])[0], "First *bold* title");
        assert_eq!(texts(&slides[1])[1], "Some code and emphasis\n### Not a split");
        assert_eq!(texts(&slides[2]), vec!["Second", "body"]);
    }

    #[test]
    fn test_package_layout_and_escaping() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deck.pptx");
        let slides = slides_from_text("Fish & <chips>\n\nSecond");
        assert_eq!(write_pptx(&path, &slides).unwrap(), 2);

        let bytes = std::fs::read(&path).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {}", part);
        }

        let mut presentation = String::new();
        archive
            .by_name("ppt/presentation.xml")
            .unwrap()
            .read_to_string(&mut presentation)
            .unwrap();
        assert_eq!(presentation.matches("<p:sldId ").count(), 2);

        let mut slide = String::new();
        archive
            .by_name("ppt/slides/slide1.xml")
            .unwrap()
            .read_to_string(&mut slide)
            .unwrap();
        assert_eq!(slide_runs(&slide), vec!["Fish & <chips>"]);
    }

    #[test]
    fn test_empty_deck_gets_a_blank_slide() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.pptx");
        assert_eq!(write_pptx(&path, &[]).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_markdown_converter_writes_pptx() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("talk.md");
        std::fs::write(&source, "# Hello\nWorld\n").unwrap();

        let tool = ToolCatalog::builtin().lookup_by_slug("md-to-pptx").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "talk.md", tool);
        let output = PresentationConverter::new(DeckSource::Markdown)
            .convert(&job)
            .await
            .unwrap();

        assert_eq!(output.output_path, temp_dir.path().join("talk.pptx"));
        let bytes = std::fs::read(&output.output_path).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut slide = String::new();
        archive
            .by_name("ppt/slides/slide1.xml")
            .unwrap()
            .read_to_string(&mut slide)
            .unwrap();
        assert_eq!(slide_runs(&slide), vec!["Hello", "World"]);
    }
}
