//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use super::{handlers, models::{ErrorResponse, ToolsQuery}};
use crate::error::ServiceError;
use crate::jobs::JobState;
use crate::processing::ConversionService;

/// Room for multipart boundaries and the `toolSlug` field on top of the file itself
const MULTIPART_SLACK_BYTES: usize = 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: ConversionService,
}

/// Build the application router
pub fn router(service: ConversionService) -> Router {
    let body_limit = service.config().jobs.max_upload_bytes + MULTIPART_SLACK_BYTES;
    let app_state = AppState { service };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Health check endpoints (both paths for compatibility)
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))

        // Jobs, with prefix-less aliases
        .route("/api/jobs", post(submit_job_handler))
        .route("/api/jobs/:id", get(job_status_handler))
        .route("/api/jobs/:id/download", get(download_handler))
        .route("/jobs", post(submit_job_handler))
        .route("/jobs/:id", get(job_status_handler))
        .route("/jobs/:id/download", get(download_handler))

        // Catalog
        .route("/api/tools", get(list_tools_handler))
        .route("/api/tools/:slug", get(tool_handler))
        .route("/api/categories", get(list_categories_handler))
        .route("/api/categories/:key/tools", get(category_tools_handler))

        .with_state(app_state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
        )
}

/// Bind the configured address and serve until ctrl-c
pub async fn start_http_server(service: ConversionService) -> Result<()> {
    let address = service.config().bind_address();
    info!("🚀 Starting HTTP server on {}", address);

    let app = router(service);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 API server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}

/// Map a service error onto its status code and JSON body
fn error_response(err: ServiceError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match err {
        ServiceError::ConversionFailure(details) => ErrorResponse::with_details("Conversion failed", details),
        ServiceError::NotImplemented(details) => {
            ErrorResponse::with_details("Conversion not available", details)
        }
        err @ (ServiceError::Io(_) | ServiceError::Storage(_) | ServiceError::InternalError(_)) => {
            error!("Request failed: {}", err);
            ErrorResponse::with_details("Internal server error", err.to_string())
        }
        other => ErrorResponse::new(other.to_string()),
    };
    (status, Json(body)).into_response()
}

/// Health check handler
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check(&state.service).await))
}

/// Job submission handler: 201 once converted, 202 when queued in background mode
async fn submit_job_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (upload, tool_slug) = match handlers::read_submission(multipart).await {
        Ok(fields) => fields,
        Err(e) => return error_response(e),
    };

    match state.service.submit(upload, tool_slug.as_deref()).await {
        Ok(summary) => {
            let status = if summary.status == JobState::Processing {
                StatusCode::ACCEPTED
            } else {
                StatusCode::CREATED
            };
            (status, Json(summary)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Job status handler
async fn job_status_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.service.status(&id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Download handler: the converted file as an attachment
async fn download_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.service.download(&id).await {
        Ok(download) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                urlencoding::encode(&download.filename)
            );
            let headers = [
                (header::CONTENT_TYPE, download.content_type),
                (header::CONTENT_DISPOSITION, disposition),
                (header::CONTENT_LENGTH, download.bytes.len().to_string()),
            ];
            (StatusCode::OK, headers, download.bytes).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// List tools handler
async fn list_tools_handler(State(state): State<AppState>, Query(query): Query<ToolsQuery>) -> Response {
    match handlers::list_tools(&state.service, query.category.as_deref()) {
        Ok(tools) => (StatusCode::OK, Json(tools)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn tool_handler(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match handlers::get_tool(&state.service, &slug) {
        Ok(tool) => (StatusCode::OK, Json(tool)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn list_categories_handler(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::list_categories(&state.service)))
}

async fn category_tools_handler(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match handlers::category_tools(&state.service, &key) {
        Ok(tools) => (StatusCode::OK, Json(tools)).into_response(),
        Err(e) => error_response(e),
    }
}
