//! API module for the conversion service
//!
//! REST endpoints for job submission, status, download and the tool catalog.

use anyhow::Result;
use tracing::info;

use crate::processing::ConversionService;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::router;

/// API server wrapping the HTTP listener
pub struct ApiServer {
    service: ConversionService,
}

impl ApiServer {
    pub fn new(service: ConversionService) -> Self {
        Self { service }
    }

    /// Serve until shutdown
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on {}", self.service.config().bind_address());
        server::start_http_server(self.service).await
    }
}
