// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP API.
//
// Handlers stay thin: they resolve ids, check the admin token, and move the
// blocking work (rendering, printing, external commands) onto the blocking
// pool. Errors are returned as JSON built from `humanize_error`.

use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use printbridge_core::config::RuntimeSettings;
use printbridge_core::error::PrintBridgeError;
use printbridge_core::human_errors::humanize_error;
use printbridge_core::types::{FileKind, PrintJob};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::services::app_services::AppServices;
use crate::services::host;

/// Header carrying the admin credential.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn build_router(services: AppServices) -> Router {
    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/preview/:id", get(preview))
        .route("/api/print/:id", post(print))
        .route("/api/settings", get(get_settings).put(put_settings))
        .route("/api/admin/clean-spool", post(clean_spool))
        .route("/api/admin/restart", post(restart_host))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(services)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    Core(PrintBridgeError),
    /// Missing or wrong admin token.
    Unauthorized,
    /// No admin token is configured, so admin endpoints are off.
    AdminDisabled,
    BadRequest(String),
    Internal(String),
}

impl From<PrintBridgeError> for ApiError {
    fn from(err: PrintBridgeError) -> Self {
        Self::Core(err)
    }
}

fn error_code(err: &PrintBridgeError) -> (StatusCode, &'static str) {
    match err {
        PrintBridgeError::PlatformUnsupported(_) => (StatusCode::NOT_IMPLEMENTED, "platform_unsupported"),
        PrintBridgeError::UnsupportedFileKind(_) => (StatusCode::BAD_REQUEST, "unsupported_file_kind"),
        PrintBridgeError::LoadError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "load_error"),
        PrintBridgeError::RenderFailure { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "render_failure"),
        PrintBridgeError::DeviceFailure(_) => (StatusCode::BAD_GATEWAY, "device_failure"),
        PrintBridgeError::CommandFailure { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "command_failure"),
        PrintBridgeError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        PrintBridgeError::InvalidOperation(_) => (StatusCode::BAD_REQUEST, "invalid_operation"),
        PrintBridgeError::InvalidSettings(_) => (StatusCode::BAD_REQUEST, "invalid_settings"),
        PrintBridgeError::Io(_) | PrintBridgeError::Serialization(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Core(err) => {
                let (status, code) = error_code(&err);
                let human = humanize_error(&err);
                if status.is_server_error() {
                    error!(code, error = %err, "request failed");
                }
                (
                    status,
                    json!({
                        "error": code,
                        "message": human.message,
                        "suggestion": human.suggestion,
                        "retriable": human.retriable,
                        "severity": human.severity,
                        "detail": err.to_string(),
                    }),
                )
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": "Admin access is required.",
                    "suggestion": "Send the admin token in the X-Admin-Token header.",
                    "retriable": false,
                }),
            ),
            ApiError::AdminDisabled => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "admin_disabled",
                    "message": "Admin actions are switched off on this print server.",
                    "suggestion": "Set admin_token in config.json and restart the service.",
                    "retriable": false,
                }),
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "bad_request",
                    "message": message,
                    "suggestion": "Check the request and try again.",
                    "retriable": false,
                }),
            ),
            ApiError::Internal(message) => {
                error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal",
                        "message": "Something went wrong on the print server.",
                        "suggestion": "Try again. If it keeps happening, restart the service.",
                        "retriable": true,
                    }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Run blocking work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> printbridge_core::error::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
        .map_err(ApiError::from)
}

fn require_admin(services: &AppServices, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = services.config.admin_token() else {
        return Err(ApiError::AdminDisabled);
    };
    match headers.get(ADMIN_TOKEN_HEADER).and_then(|v| v.to_str().ok()) {
        Some(given) if tokens_match(given.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => {
            warn!("admin request rejected");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Compare tokens in time independent of where they first differ.
fn tokens_match(given: &[u8], expected: &[u8]) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

async fn upload(
    State(services): State<AppServices>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("upload interrupted: {e}")))?;

        let documents = services.documents.clone();
        let stored = blocking(move || documents.save(&name, &data)).await?;
        return Ok(Json(stored));
    }
    Err(ApiError::BadRequest("no file uploaded".into()))
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    page: Option<usize>,
}

async fn preview(
    State(services): State<AppServices>,
    Path(id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response, ApiError> {
    if !services.settings.get_settings().preview_enabled {
        return Err(PrintBridgeError::InvalidOperation("preview is disabled".into()).into());
    }

    let path = services.document_path(&id)?;
    let kind = FileKind::from_path(&path)?;
    let page = query.page.unwrap_or(0);

    if kind == FileKind::Image && page == 0 {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| ApiError::Core(e.into()))?;
        return Ok((
            [(header::CONTENT_TYPE, HeaderValue::from_static(FileKind::mime_type(&ext)))],
            bytes,
        )
            .into_response());
    }

    let dispatcher = services.dispatcher.clone();
    let png = blocking(move || dispatcher.render_preview(&path, page)).await?;
    Ok(([(header::CONTENT_TYPE, HeaderValue::from_static("image/png"))], png).into_response())
}

#[derive(Debug, Deserialize)]
struct PrintQuery {
    #[serde(default = "default_copies")]
    copies: u32,
    #[serde(default)]
    rotation: i32,
}

fn default_copies() -> u32 {
    1
}

async fn print(
    State(services): State<AppServices>,
    Path(id): Path<String>,
    Query(query): Query<PrintQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let path = services.document_path(&id)?;
    let job = PrintJob::new(path, query.copies, query.rotation)?;
    info!(
        job_id = %job.id(),
        document = %id,
        copies = query.copies,
        rotation = query.rotation,
        "print requested"
    );

    let dispatcher = services.dispatcher.clone();
    let report = blocking(move || dispatcher.dispatch(job)).await?;
    Ok(Json(json!({
        "message": "Print job started.",
        "jobId": report.job_id,
        "strategy": report.strategy,
        "pages": report.pages,
    })))
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

async fn get_settings(State(services): State<AppServices>) -> Json<RuntimeSettings> {
    Json(services.settings.get_settings())
}

async fn put_settings(
    State(services): State<AppServices>,
    headers: HeaderMap,
    Json(settings): Json<RuntimeSettings>,
) -> Result<Json<RuntimeSettings>, ApiError> {
    require_admin(&services, &headers)?;
    let provider = services.settings.clone();
    blocking(move || provider.save_settings(settings)).await?;
    Ok(Json(services.settings.get_settings()))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

async fn clean_spool(
    State(services): State<AppServices>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&services, &headers)?;
    let monitor = services.monitor.clone();
    blocking(move || monitor.clean_now()).await?;
    Ok(Json(json!({ "message": "Print spool cleared and service restarted." })))
}

async fn restart_host(
    State(services): State<AppServices>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&services, &headers)?;
    let executor = services.executor.clone();
    blocking(move || host::restart(executor.as_ref())).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Restart initiated." })),
    ))
}
