use std::sync::Arc;

use axum::{
    extract::{Path, Query, State as AppState},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::{error::AppError, registry::TableContext, state::State, table::TableParams};

/// `GET /tables/{table}` for tables with no parent context.
pub async fn table_handler(
    AppState(state): AppState<Arc<State>>,
    Path(table): Path<String>,
    Query(params): Query<TableParams>,
) -> Result<Response, AppError> {
    respond(state, TableContext::default(), &table, &params)
}

/// `GET /projects/{pid}/tables/{table}` for project-scoped tables.
pub async fn project_table_handler(
    AppState(state): AppState<Arc<State>>,
    Path((pid, table)): Path<(u32, String)>,
    Query(params): Query<TableParams>,
) -> Result<Response, AppError> {
    let ctx = TableContext { project: Some(pid) };
    respond(state, ctx, &table, &params)
}

fn respond(
    state: Arc<State>,
    ctx: TableContext,
    table: &str,
    params: &TableParams,
) -> Result<Response, AppError> {
    if !params.wants_json() {
        return Err(AppError::UnsupportedFormat);
    }

    let payload = state
        .registry
        .run(table, &state.store, ctx, params, state.config.default_limit)
        .unwrap_or_else(|err| {
            // Table-contract failures stay in the body, transport stays 200.
            debug!("table request rejected: {err}");
            json!({ "error": err.to_string(), "rows": [] })
        });

    Ok((StatusCode::OK, Json(payload)).into_response())
}
