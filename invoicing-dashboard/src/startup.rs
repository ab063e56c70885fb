//! Application startup and lifecycle management.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{http_request_span, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{SessionSettings, Settings};
use crate::handlers::{
    app::{dashboard, health_check, metrics, readiness_check},
    auth::{login_handler, logout_handler},
    invoices::{create_invoice, delete_invoice, list_invoices, update_invoice},
};
use crate::middleware::{metrics_middleware, require_session};
use crate::services::{CredentialsProvider, Database, InMemoryPageCache};
use crate::AppState;

pub fn build_router(state: AppState, session: &SessionSettings) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(session.inactivity_hours)));

    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard))
        .route(
            "/dashboard/invoices",
            get(list_invoices).post(create_invoice),
        )
        .route("/dashboard/invoices/:id/edit", post(update_invoice))
        .route("/dashboard/invoices/:id/delete", post(delete_invoice))
        .route_layer(from_fn(require_session));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .merge(dashboard_routes)
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let database = Database::connect(&settings.database).await?;

        if settings.database.run_migrations {
            database.run_migrations().await?;
        }

        let database = Arc::new(database);
        let state = AppState::new(
            database.clone(),
            Arc::new(CredentialsProvider::new(database)),
            Arc::new(InMemoryPageCache::new()),
        );

        let router = build_router(state, &settings.session);

        // Port 0 binds a random port for testing.
        let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid server address: {}", e)))?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("invoicing-dashboard listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}
