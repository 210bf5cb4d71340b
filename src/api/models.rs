//! API data models

use serde::{Deserialize, Serialize};

use crate::catalog::{Category, CategoryInfo, ToolDefinition};

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// A catalog tool as listed by the API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    #[serde(flatten)]
    pub tool: &'static ToolDefinition,
    pub accepted_extensions: String,
}

impl From<&'static ToolDefinition> for ToolResponse {
    fn from(tool: &'static ToolDefinition) -> Self {
        Self {
            accepted_extensions: tool.accepted_extensions(),
            tool,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub key: Category,
    pub title: &'static str,
    pub description: &'static str,
    pub tool_count: usize,
}

impl CategoryResponse {
    pub fn new(info: &'static CategoryInfo, tool_count: usize) -> Self {
        Self {
            key: info.key,
            title: info.title,
            description: info.description,
            tool_count,
        }
    }
}

/// `GET /api/tools` query string
#[derive(Debug, Default, Deserialize)]
pub struct ToolsQuery {
    pub category: Option<String>,
}
