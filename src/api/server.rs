//! HTTP server with axum router and graceful shutdown.

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::handlers::{
    add_knowledge, chat, delete_knowledge, get_history, get_stats, learn, list_knowledge, search,
    AppState,
};
use crate::config::ServerConfig;
use crate::engine::KnowledgeEngine;

/// HTTP front end for the knowledge engine.
pub struct ApiServer {
    /// Server configuration.
    config: ServerConfig,
    /// Application state shared across handlers.
    state: AppState,
}

impl ApiServer {
    /// Create a new server with default configuration.
    #[must_use]
    pub fn new(engine: KnowledgeEngine) -> Self {
        Self {
            config: ServerConfig::default(),
            state: AppState::new(engine),
        }
    }

    /// Set the server configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Token that stops the server when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.state.cancel.clone()
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route(
                "/api/knowledge",
                get(list_knowledge)
                    .post(add_knowledge)
                    .delete(delete_knowledge),
            )
            .route("/api/search", get(search))
            .route("/api/stats", get(get_stats))
            .route("/api/chat", post(chat))
            .route("/api/learn", post(learn))
            .route("/api/history", get(get_history))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server, binding to the configured address.
    ///
    /// The server will run until the cancellation token is triggered,
    /// at which point it will perform a graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> Result<(), ApiError> {
        let address = self.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ApiError::BindError {
                address: address.clone(),
                source,
            })?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while serving.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ApiError> {
        let cancel = self.state.cancel.clone();
        let app = self.build_router();

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "Starting knowledge API server");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("Knowledge API server shutting down gracefully");
            })
            .await
            .map_err(ApiError::ServerError)
    }
}
