//! Amigo Chat Backend
//!
//! A streaming chat relay: forwards conversations to an Azure OpenAI chat
//! deployment, streams increments back to the caller as NDJSON, and mirrors
//! every message to a persistent conversation log.

mod api;
mod chat;
mod completion;
mod config;
mod error;
mod relay;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use api::RouterState;
use completion::{credentials, AzureOpenAiClient, CompletionClient};
use config::Config;
use relay::StreamingRelay;
use store::{ChatLogDb, ConversationStore};

#[derive(Serialize)]
struct HelloResponse {
    message: String,
    status: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration; a missing endpoint or deployment is fatal here,
    // before the server starts accepting requests
    let config = Config::from_env()?;
    info!(
        endpoint = %config.openai.endpoint,
        deployment = %config.openai.deployment,
        db_path = %config.store.db_path,
        "Configuration loaded"
    );

    // Build process-wide dependencies once; they are read-only afterwards
    // and injected into the relay rather than held as globals
    let tokens: Arc<dyn completion::TokenProvider> = Arc::from(credentials::provider_from_env()?);
    let client: Arc<dyn CompletionClient> = Arc::new(AzureOpenAiClient::new(
        reqwest::Client::new(),
        config.openai.clone(),
        tokens,
    )?);
    let db = ChatLogDb::new(&config.store.db_path).await?;
    let db: Arc<dyn ConversationStore> = Arc::new(db);

    let relay = Arc::new(StreamingRelay::new(
        client,
        db.clone(),
        config.chat.clone(),
    ));
    let router_state: RouterState = (relay, db);

    // Build our application with routes
    let app = Router::new()
        // Landing page and health check
        .route("/", get(hello_world))
        .route("/api/health", get(health_check))
        // Chat relay API
        .route("/chat/stream", post(api::chat::chat_stream))
        .route(
            "/chat/history/:conversation_id",
            get(api::chat::conversation_history),
        )
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow CORS for development
        .with_state(router_state);

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("🚀 Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hola from the Amigo chat backend!".to_string(),
        status: "ok".to_string(),
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}
