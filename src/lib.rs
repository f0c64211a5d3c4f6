pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod range;
pub mod sandbox;
pub mod server;
pub mod state;
pub mod styles;
pub mod tools;
pub mod workbook;

pub use config::{CliArgs, ServerConfig, TransportKind};
pub use error::{ErrorKind, ExcelError};
pub use logging::{LoggingConfig, init_logging};
pub use server::ExcelServer;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;

const HTTP_SERVICE_PATH: &str = "/mcp";

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone()));

    match sandbox::workspace_root(&config) {
        Ok(root) => {
            tracing::info!(
                transport = %config.transport,
                workspace = %root.display(),
                "starting excel MCP server",
            );
        }
        Err(error) => {
            tracing::warn!(?error, "workspace root is not resolvable yet");
        }
    }

    match config.transport {
        TransportKind::Stdio => ExcelServer::from_state(state).run_stdio().await,
        TransportKind::Http => run_stream_http_transport(config, state).await,
    }
}

async fn health_handler() -> (axum::http::StatusCode, axum::Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        axum::Json(serde_json::json!({"status": "ok"})),
    )
}

async fn run_stream_http_transport(config: Arc<ServerConfig>, state: Arc<AppState>) -> Result<()> {
    let service_state = state.clone();
    let service = StreamableHttpService::new(
        move || Ok(ExcelServer::from_state(service_state.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new()
        .nest_service(HTTP_SERVICE_PATH, service)
        .route("/health", axum::routing::get(health_handler));

    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(transport = "http", bind = %actual_addr, path = HTTP_SERVICE_PATH, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(anyhow::Error::from)
}
