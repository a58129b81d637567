//! # Web gateway
//!
//! A single-page HTML front end plus a small JSON API over the analysis
//! controller. Each request runs the pipeline once; nothing is kept between
//! requests.

mod server;
mod views;

pub use server::{router as gateway_router, run as run_gateway};
pub use views::{PageContext, ResultContext, Views, data_uri};

use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::config::{ReportConfig, ServerConfig};

/// Thread-safe shared gateway reference for axum handlers.
pub type SharedGateway = Arc<GatewayState>;

/// Everything a request handler needs. Immutable after startup.
pub struct GatewayState {
    pub analyzer: Analyzer,
    pub views: Views,
    pub server: ServerConfig,
    /// File name offered for the downloaded report.
    pub report_file_name: String,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("provider", &self.analyzer.provider_name())
            .field("server", &self.server)
            .field("report_file_name", &self.report_file_name)
            .finish()
    }
}

impl GatewayState {
    pub fn new(
        analyzer: Analyzer,
        server: ServerConfig,
        report: &ReportConfig,
    ) -> Result<Self, handlebars::TemplateError> {
        Ok(Self {
            analyzer,
            views: Views::new()?,
            server,
            report_file_name: report.file_name.clone(),
        })
    }

    pub fn shared(self) -> SharedGateway {
        Arc::new(self)
    }
}
