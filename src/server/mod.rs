//! HTTP scoring service
//!
//! Exposes the pipeline over axum. Each request is handled independently
//! against the shared read-only [`crate::pipeline::ScoringContext`]; a
//! failed request returns an error response and cannot corrupt state for
//! subsequent requests.

use std::net::SocketAddr;
use thiserror::Error;

pub mod api;
pub mod handlers;
pub mod state;

pub use api::ScoringServer;
pub use state::AppState;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub address: SocketAddr,
    /// Whether permissive CORS is enabled
    pub cors_enabled: bool,
}

impl ServerConfig {
    /// Create a configuration for an address
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            cors_enabled: true,
        }
    }

    /// Disable CORS
    pub fn without_cors(mut self) -> Self {
        self.cors_enabled = false;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 5000)),
            cors_enabled: true,
        }
    }
}

/// Server-side errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind address: {0}")]
    Bind(String),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
