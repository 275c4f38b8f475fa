//! API router and server setup
//!
//! Configures axum routes and runs the HTTP server.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::pipeline::ScoringContext;
use crate::server::{
    handlers::{fairness_snapshot, health_check, score_applicant},
    state::AppState,
    Result, ServerConfig, ServerError,
};

/// Scoring server wrapping a built pipeline context
pub struct ScoringServer {
    config: ServerConfig,
    state: AppState,
}

impl ScoringServer {
    /// Create a server around a scoring context
    pub fn new(config: ServerConfig, context: ScoringContext) -> Self {
        let state = AppState::new(context);
        Self { config, state }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let mut app = Router::new()
            .route("/health", get(health_check))
            .route("/api/v1/score", post(score_applicant))
            .route("/api/v1/fairness", get(fairness_snapshot))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_enabled {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the server
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.address;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        tracing::info!("riesgo scoring server running on http://{addr}");

        axum::serve(listener, self.router())
            .await
            .map_err(ServerError::Io)?;

        Ok(())
    }

    /// Get the configured address
    pub fn address(&self) -> SocketAddr {
        self.config.address
    }
}

// =============================================================================
// Tests
// =============================================================================
