//! API request handlers

use axum::extract::Multipart;
use serde_json::Value;
use tracing::{debug, warn};

use super::models::{CategoryResponse, ToolResponse};
use crate::catalog::Category;
use crate::error::ServiceError;
use crate::processing::{ConversionService, Upload};

/// Handle health check requests
pub async fn health_check(service: &ConversionService) -> Value {
    // Job counts are informational; an unreadable uploads directory does not fail the check
    let jobs = match service.store().statistics().await {
        Ok(stats) => serde_json::to_value(stats).unwrap_or(Value::Null),
        Err(e) => {
            warn!("Could not collect job statistics: {}", e);
            Value::Null
        }
    };

    serde_json::json!({
        "status": "healthy",
        "service": "convert-hub",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": service.catalog().tools().len(),
        "execution": service.config().jobs.execution,
        "jobs": jobs,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

/// Pull the `file` and `toolSlug` fields out of a job submission
pub async fn read_submission(
    mut multipart: Multipart,
) -> Result<(Option<Upload>, Option<String>), ServiceError> {
    let mut upload = None;
    let mut tool_slug = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
                upload = Some(Upload::new(filename, bytes.to_vec()));
            }
            "toolSlug" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServiceError::InvalidRequest(e.body_text()))?;
                tool_slug = Some(text);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok((upload, tool_slug))
}

fn parse_category(key: &str) -> Result<Category, ServiceError> {
    key.parse()
        .map_err(|_| ServiceError::NotFound(format!("Unknown category: {}", key)))
}

/// Handle tool listing requests, optionally filtered by category
pub fn list_tools(
    service: &ConversionService,
    category: Option<&str>,
) -> Result<Vec<ToolResponse>, ServiceError> {
    let catalog = service.catalog();
    let tools = match category {
        Some(key) => catalog.list_by_category(parse_category(key)?),
        None => catalog.tools().iter().collect(),
    };
    Ok(tools.into_iter().map(ToolResponse::from).collect())
}

pub fn get_tool(service: &ConversionService, slug: &str) -> Result<ToolResponse, ServiceError> {
    service
        .catalog()
        .lookup_by_slug(slug)
        .map(ToolResponse::from)
        .ok_or_else(|| ServiceError::NotFound("Unknown conversion tool".to_string()))
}

pub fn list_categories(service: &ConversionService) -> Vec<CategoryResponse> {
    let catalog = service.catalog();
    catalog
        .categories()
        .iter()
        .map(|info| CategoryResponse::new(info, catalog.list_by_category(info.key).len()))
        .collect()
}

pub fn category_tools(service: &ConversionService, key: &str) -> Result<Vec<ToolResponse>, ServiceError> {
    list_tools(service, Some(key))
}
