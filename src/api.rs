//! HTTP API for the Fee Engine.
//!
//! This module exposes a minimal REST API around the fee engine using
//! the [`axum`](https://crates.io/crates/axum) framework.  Clients
//! submit a parking session (or a batch of sessions for settlement
//! runs) and receive the computed fee in JSON.  Fee rules and the
//! holiday calendar are loaded from a configuration directory at
//! startup; a request may also carry both inline, which takes
//! precedence for that request.

use crate::calendar::HolidaySet;
use crate::engine::{check_session_span, compute_fee, run_batch};
use crate::models::{
    load_fee_models_from_dir, BatchFeeRequest, BatchFeeResponse, FeeRequest, FeeResponse, FeeRule,
};
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Application state shared across requests.
pub struct AppState {
    pub fee_rules: RwLock<Vec<FeeRule>>,
    pub holidays: RwLock<HolidaySet>,
}

/// Build the API router and initialise fee rules and the holiday
/// calendar from the given directory.  Returns the router and a handle
/// to the state.
pub async fn build_router(config_dir: PathBuf) -> Result<(Router, Arc<AppState>)> {
    let models = load_fee_models_from_dir(&config_dir)?;
    let mut rules = Vec::new();
    for model in models {
        info!(vehicle_type = %model.vehicle_type, version = %model.version, rules = model.rules.len(), "loaded fee model");
        rules.extend(model.rules);
    }
    let holidays = load_holidays(&config_dir)?;
    info!(
        rules = rules.len(),
        holidays = holidays.len(),
        "fee configuration loaded"
    );

    let state = Arc::new(AppState {
        fee_rules: RwLock::new(rules),
        holidays: RwLock::new(holidays),
    });
    let router = Router::new()
        .route("/api/fees/compute", post(compute_handler))
        .route("/api/fees/compute-batch", post(batch_handler))
        .with_state(state.clone());
    Ok((router, state))
}

/// Load the holiday calendar from `holidays.json` in the configuration
/// directory: a JSON array of date strings.  A missing file means an
/// empty calendar, not an error.
fn load_holidays(config_dir: &Path) -> Result<HolidaySet> {
    let path = config_dir.join("holidays.json");
    if !path.is_file() {
        return Ok(HolidaySet::default());
    }
    let raw: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    Ok(HolidaySet::from_strings(&raw)?)
}

/// Handler for POST /api/fees/compute
async fn compute_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<FeeRequest>,
) -> Response {
    let holidays = match resolve_holidays(&app_state, request.public_holidays).await {
        Ok(holidays) => holidays,
        Err(response) => return response,
    };
    let rules = match request.fee_rules {
        Some(inline) => inline,
        None => app_state.fee_rules.read().await.clone(),
    };

    let outcome = check_session_span(request.entry_datetime, request.exit_datetime).and_then(|_| {
        compute_fee(
            request.entry_datetime,
            request.exit_datetime,
            &request.vehicle_type,
            &rules,
            &holidays,
        )
    });
    match outcome {
        Ok(fee) => (StatusCode::OK, Json(FeeResponse { fee })).into_response(),
        // Every engine error is deterministic input/configuration
        // rejection; nothing here warrants a 5xx.
        Err(err) => error_response(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string()),
    }
}

/// Handler for POST /api/fees/compute-batch
async fn batch_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<BatchFeeRequest>,
) -> Response {
    let holidays = match resolve_holidays(&app_state, request.public_holidays).await {
        Ok(holidays) => holidays,
        Err(response) => return response,
    };
    let rules = match request.fee_rules {
        Some(inline) => inline,
        None => app_state.fee_rules.read().await.clone(),
    };

    let results = run_batch(request.sessions, &rules, &holidays);
    (StatusCode::OK, Json(BatchFeeResponse { results })).into_response()
}

/// Inline holidays win over the server calendar; a malformed inline
/// date rejects the request.
async fn resolve_holidays(
    app_state: &AppState,
    inline: Option<Vec<String>>,
) -> std::result::Result<HolidaySet, Response> {
    match inline {
        Some(raw) => HolidaySet::from_strings(&raw)
            .map_err(|err| error_response(StatusCode::UNPROCESSABLE_ENTITY, &err.to_string())),
        None => Ok(app_state.holidays.read().await.clone()),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Launch the API server.  This function builds the router from the
/// given configuration directory and binds to the supplied address.
/// It blocks until the server terminates (e.g. when interrupted).
pub async fn serve(addr: &str, config_dir: PathBuf) -> Result<()> {
    let (router, _state) = build_router(config_dir).await?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "fee engine listening");
    axum::serve(listener, router).await.map_err(|e| e.into())
}
