//! OCR through the tesseract command line tool

use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

use super::{run_external, ConversionOutput, ConvertError, Converter, RegistryBuilder};
use crate::config::ToolsConfig;
use crate::jobs::ConversionJob;

/// Recognized text with tesseract's mean word confidence
#[derive(Debug, Clone, PartialEq)]
pub struct OcrResult {
    pub text: String,
    pub confidence: Option<f64>,
}

/// Rebuild text from tesseract's TSV output.
///
/// Words on the same line are joined by spaces; a new paragraph or block starts after a blank line.
pub fn parse_tsv(tsv: &str) -> OcrResult {
    let mut text = String::new();
    let mut confidences = Vec::new();
    let mut current_line: Option<(u32, u32, u32, u32)> = None;

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.splitn(12, '\t').collect();
        if fields.len() < 12 || fields[0] != "5" {
            continue;
        }
        let word = fields[11].trim();
        let conf: f64 = fields[10].parse().unwrap_or(-1.0);
        if word.is_empty() || conf < 0.0 {
            continue;
        }
        let num = |i: usize| fields[i].parse::<u32>().unwrap_or(0);
        let line = (num(1), num(2), num(3), num(4));

        match current_line {
            Some(prev) if prev == line => text.push(' '),
            Some(prev) if (prev.0, prev.1, prev.2) == (line.0, line.1, line.2) => text.push('\n'),
            Some(_) => text.push_str("\n\n"),
            None => {}
        }
        text.push_str(word);
        confidences.push(conf);
        current_line = Some(line);
    }

    let confidence =
        (!confidences.is_empty()).then(|| confidences.iter().sum::<f64>() / confidences.len() as f64);
    OcrResult { text, confidence }
}

pub fn render_report(source_name: &str, result: &OcrResult) -> String {
    let rule = "=".repeat(50);
    let mut report = String::new();
    let _ = writeln!(report, "OCR Text Extraction\n{}\n", rule);
    let _ = writeln!(report, "Source: {}", source_name);
    let _ = writeln!(
        report,
        "Confidence: {}\n",
        result
            .confidence
            .map(|c| format!("{:.2}%", c))
            .unwrap_or_else(|| "N/A".to_string())
    );
    let _ = writeln!(report, "Extracted Text:\n{}\n", "-".repeat(50));
    let _ = writeln!(report, "{}\n", result.text);
    let _ = writeln!(report, "{}", rule);
    report.push_str("Note: OCR accuracy depends on image quality, text clarity, and language.\n");
    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrOutput {
    Text,
    SearchablePdf,
}

pub struct TesseractConverter {
    binary: PathBuf,
    language: String,
    output: OcrOutput,
}

impl TesseractConverter {
    pub fn new(binary: PathBuf, language: String, output: OcrOutput) -> Self {
        Self {
            binary,
            language,
            output,
        }
    }

    async fn recognize(&self, job: &ConversionJob) -> Result<OcrResult, ConvertError> {
        let args: Vec<OsString> = vec![
            job.source_path.clone().into(),
            "stdout".into(),
            "-l".into(),
            self.language.clone().into(),
            "tsv".into(),
        ];
        let stdout = run_external(&self.binary, args).await?;
        Ok(parse_tsv(&String::from_utf8_lossy(&stdout)))
    }

    async fn searchable_pdf(&self, job: &ConversionJob) -> Result<PathBuf, ConvertError> {
        let output = job.target_path();
        // tesseract appends `.pdf` to the output base itself
        let base = output.with_extension("");
        let args: Vec<OsString> = vec![
            job.source_path.clone().into(),
            base.into(),
            "-l".into(),
            self.language.clone().into(),
            "pdf".into(),
        ];
        run_external(&self.binary, args).await?;

        if !tokio::fs::try_exists(&output).await? {
            return Err(ConvertError::failed("tesseract did not produce a PDF"));
        }
        Ok(output)
    }
}

#[async_trait]
impl Converter for TesseractConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let output = match self.output {
            OcrOutput::Text => {
                let result = self.recognize(job).await?;
                let output = job.target_path();
                tokio::fs::write(&output, render_report(&job.source_filename, &result)).await?;
                info!(
                    "🔍 OCR extracted {} characters from {}",
                    result.text.chars().count(),
                    job.source_filename
                );
                output
            }
            OcrOutput::SearchablePdf => {
                let output = self.searchable_pdf(job).await?;
                info!("🔍 Built searchable PDF from {}", job.source_filename);
                output
            }
        };
        Ok(ConversionOutput::new(output))
    }
}

pub fn register(registry: &mut RegistryBuilder, tools: &ToolsConfig) {
    registry.insert(
        "image_to_text_ocr",
        TesseractConverter::new(tools.tesseract_path.clone(), tools.ocr_language.clone(), OcrOutput::Text),
    );
    registry.insert(
        "image_to_searchable_pdf",
        TesseractConverter::new(
            tools.tesseract_path.clone(),
            tools.ocr_language.clone(),
            OcrOutput::SearchablePdf,
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;
    use crate::jobs::JobId;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(block: u32, par: u32, line: u32, n: u32, conf: f64, text: &str) -> String {
        format!("5\t1\t{}\t{}\t{}\t{}\t0\t0\t10\t10\t{}\t{}", block, par, line, n, conf, text)
    }

    #[test]
    fn test_parse_tsv_layout() {
        let tsv = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t100\t-1\t".to_string(),
            word(1, 1, 1, 1, 90.0, "Hello"),
            word(1, 1, 1, 2, 80.0, "world"),
            word(1, 1, 2, 1, 70.0, "again"),
            word(2, 1, 1, 1, 60.0, "Next"),
        ]
        .join("\n");

        let result = parse_tsv(&tsv);
        assert_eq!(result.text, "Hello world\nagain\n\nNext");
        assert_eq!(result.confidence, Some(75.0));
    }

    #[test]
    fn test_parse_tsv_empty() {
        let result = parse_tsv(HEADER);
        assert_eq!(result.text, "");
        assert_eq!(result.confidence, None);
        assert!(render_report("scan.png", &result).contains("Confidence: N/A"));
    }

    #[tokio::test]
    async fn test_missing_tesseract_is_not_implemented() {
        let tool = ToolCatalog::builtin().lookup_by_slug("image-to-text-ocr").unwrap();
        let job = ConversionJob::new(JobId::new(), PathBuf::from("/tmp/scan.png"), "scan.png", tool);
        let converter = TesseractConverter::new(
            PathBuf::from("no-such-tesseract-binary"),
            "eng".to_string(),
            OcrOutput::Text,
        );
        assert!(matches!(converter.convert(&job).await, Err(ConvertError::NotImplemented(_))));
    }
}
