//! Static catalog of conversion tools.
//!
//! Every tool the service exposes is defined once in [`tools::BUILTIN_TOOLS`]
//! and never mutated. Lookups are plain scans over that table.

mod tools;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use tools::BUILTIN_TOOLS;

/// Category a tool is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Images,
    Videos,
    Audio,
    Documents,
    Spreadsheets,
    Presentations,
    Ebooks,
    Archives,
    Ocr,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Images,
        Category::Videos,
        Category::Audio,
        Category::Documents,
        Category::Spreadsheets,
        Category::Presentations,
        Category::Ebooks,
        Category::Archives,
        Category::Ocr,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Videos => "videos",
            Category::Audio => "audio",
            Category::Documents => "documents",
            Category::Spreadsheets => "spreadsheets",
            Category::Presentations => "presentations",
            Category::Ebooks => "ebooks",
            Category::Archives => "archives",
            Category::Ocr => "ocr",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.key() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Display metadata for a category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub key: Category,
    pub title: &'static str,
    pub description: &'static str,
}

static CATEGORIES: [CategoryInfo; 9] = [
    CategoryInfo {
        key: Category::Images,
        title: "Images",
        description: "Convert between popular image formats with precision and speed.",
    },
    CategoryInfo {
        key: Category::Videos,
        title: "Videos",
        description: "Optimize, transcode, and reformat your video content effortlessly.",
    },
    CategoryInfo {
        key: Category::Audio,
        title: "Audio",
        description: "Switch between audio codecs and formats without losing fidelity.",
    },
    CategoryInfo {
        key: Category::Documents,
        title: "Documents",
        description: "Transform office documents, PDFs, and text formats with ease.",
    },
    CategoryInfo {
        key: Category::Spreadsheets,
        title: "Spreadsheets",
        description: "Convert spreadsheet workbooks for seamless collaboration.",
    },
    CategoryInfo {
        key: Category::Presentations,
        title: "Presentations",
        description: "Deliver presentations anywhere with flexible conversion options.",
    },
    CategoryInfo {
        key: Category::Ebooks,
        title: "eBooks",
        description: "Publish and distribute across readers with instant conversions.",
    },
    CategoryInfo {
        key: Category::Archives,
        title: "Archives",
        description: "Package and extract archives in every major compression format.",
    },
    CategoryInfo {
        key: Category::Ocr,
        title: "OCR",
        description: "Digitize documents with OCR support in dozens of languages.",
    },
];

/// A single conversion tool: which files it accepts and what it produces
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique kebab-case identifier used in URLs and job submissions
    pub slug: &'static str,

    pub label: &'static str,

    pub description: &'static str,

    /// Accepted extensions, lowercase with a leading dot
    pub source_extensions: &'static [&'static str],

    /// Extension of the produced file, with a leading dot
    pub target_extension: &'static str,

    pub category: Category,

    /// Key of the converter in the dispatch registry
    pub converter: &'static str,
}

impl ToolDefinition {
    /// Human readable list of accepted extensions, e.g. `.jpg, .jpeg`
    pub fn accepted_extensions(&self) -> String {
        self.source_extensions.join(", ")
    }
}

/// Immutable tool catalog
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: &'static [ToolDefinition],
}

impl ToolCatalog {
    /// Catalog over the built-in tool table
    pub fn builtin() -> Self {
        Self {
            tools: BUILTIN_TOOLS,
        }
    }

    pub fn tools(&self) -> &'static [ToolDefinition] {
        self.tools
    }

    pub fn categories(&self) -> &'static [CategoryInfo] {
        &CATEGORIES
    }

    pub fn category_info(&self, category: Category) -> Option<&'static CategoryInfo> {
        CATEGORIES.iter().find(|info| info.key == category)
    }

    /// Find a tool by slug. Absence is a normal outcome.
    pub fn lookup_by_slug(&self, slug: &str) -> Option<&'static ToolDefinition> {
        self.tools.iter().find(|tool| tool.slug == slug)
    }

    /// Tools of a category, sorted by label
    pub fn list_by_category(&self, category: Category) -> Vec<&'static ToolDefinition> {
        let mut tools: Vec<_> = self
            .tools
            .iter()
            .filter(|tool| tool.category == category)
            .collect();
        tools.sort_by(|a, b| a.label.cmp(b.label));
        tools
    }

    /// Check the filename's final extension against the tool's accepted set
    pub fn validate_source_extension(&self, tool: &ToolDefinition, filename: &str) -> bool {
        match file_extension(filename) {
            Some(ext) => tool.source_extensions.iter().any(|accepted| *accepted == ext),
            None => false,
        }
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Final `.ext` segment of a filename, lowercased, including the dot
pub fn file_extension(filename: &str) -> Option<String> {
    let name = Path::new(filename).file_name()?.to_str()?;
    let dot = name.rfind('.')?;
    let ext = &name[dot..];
    if ext.len() < 2 {
        return None;
    }
    Some(ext.to_lowercase())
}
