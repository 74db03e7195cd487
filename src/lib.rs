//! Backend for a build-tracking web GUI.
//!
//! Serves the dynamic data tables of the frontend (projects, recipes,
//! packages) as JSON. Every table speaks the same query-parameter contract:
//! `orderby` (minus prefix for descending), `filter` (`name:action` pairs),
//! `search` (free text), `limit`/`page` (1-based pagination) and
//! `cmd=filterinfo` for filter metadata.
//!
//! # Shape of a response
//!
//! ```json
//! { "error": "ok", "rows": [ { "name": "curl", "version": "8.5" } ], "total": 1 }
//! ```
//!
//! Bad table parameters (unknown order field, unknown filter, invalid
//! pagination values) are reported inside the body as an `error` value other
//! than `"ok"`, still with HTTP 200. Only transport-level problems, such as a
//! `format` other than `json`, map to an HTTP error status.
//!
//! # Notes
//!
//! Table instances are built per request from the in-memory record store and
//! thrown away afterwards, so concurrent requests only ever share read-only
//! data.
use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod error;
pub mod registry;
pub mod routes;
pub mod state;
pub mod store;
pub mod table;

use routes::{project_table_handler, table_handler};
use state::State;

/// Builds the router so tests can drive it without binding a socket.
pub fn app(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/tables/{table}", get(table_handler))
        .route("/projects/{pid}/tables/{table}", get(project_table_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
