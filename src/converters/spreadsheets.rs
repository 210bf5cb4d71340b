//! Tabular conversions between XLSX, CSV, JSON, HTML and text

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

use super::{blocking, ConversionOutput, ConvertError, Converter, RegistryBuilder};
use crate::jobs::ConversionJob;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    fn from_text(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Bool(b) => Value::Bool(*b),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A header row plus data rows. Rows may be shorter than the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Xlsx,
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableTarget {
    Csv,
    Txt,
    Html,
    Json,
    Xlsx,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// First worksheet of a workbook; its first row becomes the header
pub fn read_xlsx(path: &Path) -> Result<Table, ConvertError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ConvertError::failed(format!("Failed to open workbook: {}", e)))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ConvertError::failed("Workbook has no worksheets"))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ConvertError::failed(format!("Failed to read worksheet '{}': {}", sheet, e)))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .unwrap_or_default();
    let rows = rows.map(|row| row.iter().map(cell_from_data).collect()).collect();

    debug!("Read worksheet '{}'", sheet);
    Ok(Table { headers, rows })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::from_text(s),
        other => Cell::from_text(&other.to_string()),
    }
}

pub fn read_csv(path: &Path) -> Result<Table, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }
    Ok(Table { headers, rows })
}

fn csv_err(e: csv::Error) -> ConvertError {
    ConvertError::failed(format!("Invalid CSV: {}", e))
}

/// Accepts an array of objects, a single object, or an array of arrays
pub fn read_json(path: &Path) -> Result<Table, ConvertError> {
    let bytes = std::fs::read(path)?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| ConvertError::failed(format!("Invalid JSON: {}", e)))?;
    table_from_json(value)
}

pub fn table_from_json(value: Value) -> Result<Table, ConvertError> {
    let items = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        _ => return Err(ConvertError::failed("JSON must be an array or an object")),
    };

    if items.iter().all(Value::is_array) {
        let width = items.iter().filter_map(Value::as_array).map(Vec::len).max().unwrap_or(0);
        let headers = (1..=width).map(|i| format!("column_{}", i)).collect();
        let rows = items
            .iter()
            .filter_map(Value::as_array)
            .map(|row| row.iter().map(cell_from_json).collect())
            .collect();
        return Ok(Table { headers, rows });
    }

    let mut headers: Vec<String> = Vec::new();
    for item in &items {
        let object = item
            .as_object()
            .ok_or_else(|| ConvertError::failed("JSON array must contain only objects"))?;
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|object| {
            headers
                .iter()
                .map(|key| object.get(key).map(cell_from_json).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();
    Ok(Table { headers, rows })
}

fn cell_from_json(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::String(s) => Cell::from_text(s),
        nested => Cell::Text(nested.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

pub fn write_csv(path: &Path, table: &Table) -> Result<(), ConvertError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(&table.headers).map_err(csv_err)?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn table_to_tsv(table: &Table) -> String {
    let mut text = table.headers.join("\t");
    text.push('\n');
    for row in &table.rows {
        let line: Vec<String> = row.iter().map(Cell::to_string).collect();
        text.push_str(&line.join("\t"));
        text.push('\n');
    }
    text
}

pub fn table_to_json(table: &Table) -> Value {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (index, header) in table.headers.iter().enumerate() {
                let value = row.get(index).map(Cell::to_json).unwrap_or(Value::Null);
                object.insert(header.clone(), value);
            }
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}

pub fn table_to_html(table: &Table, title: &str) -> String {
    let escape = |s: &str| quick_xml::escape::escape(s).into_owned();

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n  <title>{}</title>\n\
         <style>table {{ border-collapse: collapse; }} th, td {{ border: 1px solid #ccc; padding: 4px 8px; }} th {{ background: #f0f0f0; }}</style>\n\
         </head>\n<body>\n<table>\n<thead><tr>",
        escape(title)
    );
    for header in &table.headers {
        let _ = write!(html, "<th>{}</th>", escape(header));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape(&cell.to_string()));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

pub fn write_xlsx(path: &Path, table: &Table) -> Result<(), ConvertError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| ConvertError::failed(format!("Failed to write workbook: {}", e));

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &bold)
            .map_err(xlsx_err)?;
    }
    for (index, row) in table.rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s).map_err(xlsx_err)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_num, col, *n).map_err(xlsx_err)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b).map_err(xlsx_err)?;
                }
            }
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}

pub struct TableConverter {
    source: TableSource,
    target: TableTarget,
}

impl TableConverter {
    pub fn new(source: TableSource, target: TableTarget) -> Self {
        Self { source, target }
    }
}

#[async_trait]
impl Converter for TableConverter {
    async fn convert(&self, job: &ConversionJob) -> Result<ConversionOutput, ConvertError> {
        let source_path = job.source_path.clone();
        let output = job.target_path();
        let title = job.source_filename.clone();
        let (source, target) = (self.source, self.target);

        let written = output.clone();
        let row_count = blocking(move || {
            let table = match source {
                TableSource::Xlsx => read_xlsx(&source_path)?,
                TableSource::Csv => read_csv(&source_path)?,
                TableSource::Json => read_json(&source_path)?,
            };
            match target {
                TableTarget::Csv => write_csv(&written, &table)?,
                TableTarget::Txt => std::fs::write(&written, table_to_tsv(&table))?,
                TableTarget::Html => std::fs::write(&written, table_to_html(&table, &title))?,
                TableTarget::Xlsx => write_xlsx(&written, &table)?,
                TableTarget::Json => {
                    let json = serde_json::to_string_pretty(&table_to_json(&table))
                        .map_err(|e| ConvertError::failed(format!("Failed to serialize rows: {}", e)))?;
                    std::fs::write(&written, json)?;
                }
            }
            Ok(table.rows.len())
        })
        .await?;

        info!("📊 Converted {} rows from {}", row_count, job.source_filename);
        Ok(ConversionOutput::new(output))
    }
}

pub fn register(registry: &mut RegistryBuilder) {
    use TableSource as S;
    use TableTarget as T;

    let table = [
        ("xlsx_to_csv", S::Xlsx, T::Csv),
        ("xlsx_to_txt", S::Xlsx, T::Txt),
        ("xlsx_to_html", S::Xlsx, T::Html),
        ("xlsx_to_json", S::Xlsx, T::Json),
        ("csv_to_xlsx", S::Csv, T::Xlsx),
        ("csv_to_json", S::Csv, T::Json),
        ("csv_to_html", S::Csv, T::Html),
        ("json_to_xlsx", S::Json, T::Xlsx),
        ("json_to_csv", S::Json, T::Csv),
    ];
    for (key, source, target) in table {
        registry.insert(key, TableConverter::new(source, target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;
    use crate::jobs::JobId;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Table {
        Table {
            headers: vec!["name".into(), "qty".into()],
            rows: vec![
                vec![Cell::Text("apple".into()), Cell::Number(3.0)],
                vec![Cell::Text("pear".into()), Cell::Empty],
            ],
        }
    }

    #[test]
    fn test_json_objects_merge_headers() {
        let table = table_from_json(json!([{"a": 1, "b": "x"}, {"b": "y", "c": true}])).unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.rows[1], vec![Cell::Empty, Cell::Text("y".into()), Cell::Bool(true)]);
    }

    #[test]
    fn test_json_scalar_rejected() {
        assert!(table_from_json(json!(42)).is_err());
        assert!(table_from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_table_to_json_and_tsv() {
        let table = sample();
        assert_eq!(
            table_to_json(&table),
            json!([{"name": "apple", "qty": 3.0}, {"name": "pear", "qty": null}])
        );
        assert_eq!(table_to_tsv(&table), "name\tqty\napple\t3\npear\t\n");
    }

    #[test]
    fn test_html_escapes_cells() {
        let table = Table {
            headers: vec!["h".into()],
            rows: vec![vec![Cell::Text("<b>&".into())]],
        };
        assert!(table_to_html(&table, "t").contains("<td>&lt;b&gt;&amp;</td>"));
    }

    #[tokio::test]
    async fn test_csv_to_xlsx_and_back() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("stock.csv");
        std::fs::write(&source, "name,qty\napple,3\npear,5\n").unwrap();

        let catalog = ToolCatalog::builtin();
        let tool = catalog.lookup_by_slug("csv-to-xlsx").unwrap();
        let job = ConversionJob::new(JobId::new(), source, "stock.csv", tool);
        let output = TableConverter::new(TableSource::Csv, TableTarget::Xlsx)
            .convert(&job)
            .await
            .unwrap();

        let table = read_xlsx(&output.output_path).unwrap();
        assert_eq!(table.headers, vec!["name", "qty"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("apple".into()));
    }
}
