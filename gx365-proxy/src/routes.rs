use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, CONTENT_RANGE,
    CONTENT_TYPE, ETAG, RANGE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use gx365_common::ReleasePolicy;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::gate::{AssetGate, GateError, ReleasedAsset};
use crate::resolver::MappingResolver;
use crate::store::ByteRange;

/// How long shared caches may keep `/tracks.json`, in seconds.
const MAPPING_MAX_AGE_SECS: u64 = 3600;

/// How long browsers may reuse a preflight answer, in seconds.
const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

const AUDIO_METHODS: &str = "GET, HEAD, OPTIONS";

pub struct AppState {
    pub resolver: MappingResolver,
    pub gate: AssetGate,
    pub policy: ReleasePolicy,
    /// Landing page files served for paths the API does not claim.
    pub web_dir: Option<PathBuf>,
}

pub fn release_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tracks.json", get(tracks_mapping))
        .route("/audio/*key", get(audio_file))
        .route("/health", get(health))
        .fallback(fallback)
        .layer(middleware::from_fn(preflight))
        .with_state(state)
}

fn audio_cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(AUDIO_METHODS),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Range"));
    headers
}

/// Answer every OPTIONS request, on any path, before routing.
async fn preflight(req: Request, next: Next) -> Response {
    if req.method() != Method::OPTIONS {
        return next.run(req).await;
    }

    let mut headers = audio_cors_headers();
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(PREFLIGHT_MAX_AGE_SECS));
    (StatusCode::NO_CONTENT, headers).into_response()
}

/// GET /tracks.json -- released track identifiers mapped to storage keys.
async fn tracks_mapping(State(state): State<Arc<AppState>>) -> Response {
    match state.resolver.resolve().await {
        Ok(mapping) => {
            let cache_control = format!("public, max-age={MAPPING_MAX_AGE_SECS}");
            (
                StatusCode::OK,
                [
                    (CACHE_CONTROL, cache_control.as_str()),
                    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                ],
                Json(mapping),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                "failed to generate mapping at cutoff {}: {err}",
                state.policy.current_cutoff()
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
                Json(serde_json::json!({ "error": "Failed to generate mapping" })),
            )
                .into_response()
        }
    }
}

/// GET /audio/*key -- one released audio file (with optional Range header).
async fn audio_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    let range = headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range_header);

    match state.gate.authorize_and_fetch(&key, range).await {
        Ok(asset) => asset_response(asset),
        Err(err) => gate_error_response(err),
    }
}

fn asset_response(asset: ReleasedAsset) -> Response {
    let object = asset.object;
    debug!(
        "serving track {} ({} bytes)",
        asset.id,
        object.content_length()
    );

    let mut headers = audio_cors_headers();
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    if let Some(value) = header_value(object.content_type.as_deref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Some(value) = header_value(object.etag.as_deref()) {
        headers.insert(ETAG, value);
    }

    let status = match header_value(object.content_range.as_deref()) {
        Some(value) => {
            headers.insert(CONTENT_RANGE, value);
            StatusCode::PARTIAL_CONTENT
        }
        None => StatusCode::OK,
    };

    (status, headers, object.body).into_response()
}

fn header_value(value: Option<&str>) -> Option<HeaderValue> {
    value.and_then(|v| HeaderValue::from_str(v).ok())
}

fn gate_error_response(err: GateError) -> Response {
    // Transient failures must not be pinned by shared caches.
    let cache_control = if err.is_retriable() {
        "no-store"
    } else {
        "no-cache"
    };
    let (status, message) = match err {
        GateError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        GateError::Forbidden { .. } => (StatusCode::FORBIDDEN, "Track not yet released"),
        GateError::NotFound(_) => (StatusCode::NOT_FOUND, "File not found"),
        GateError::RangeNotSatisfiable(_) => {
            (StatusCode::RANGE_NOT_SATISFIABLE, "Range not satisfiable")
        }
        // Already logged by the gate with the key and cutoff.
        GateError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    };
    (
        status,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (CACHE_CONTROL, cache_control),
        ],
        message,
    )
        .into_response()
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let body = serde_json::json!({
        "status": "ok",
        "release_year": state.policy.clock().release_year(),
        "cutoff": state.policy.current_cutoff(),
    });

    (StatusCode::OK, Json(body)).into_response()
}

/// Requests no route claimed. `/audio/` with no filename is a client error;
/// anything else is the landing page (when configured) or 404.
async fn fallback(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let path = req.uri().path();
    if path == "/audio" || path == "/audio/" {
        return gate_error_response(GateError::BadRequest("Filename required"));
    }

    match &state.web_dir {
        Some(dir) => match ServeDir::new(dir).oneshot(req).await {
            Ok(resp) => resp.into_response(),
            Err(never) => match never {},
        },
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// Parse a `Range: bytes=START-END` or `bytes=START-` header.
/// Suffix ranges (`bytes=-N`) and multiple ranges are not supported.
fn parse_range_header(header: &str) -> Option<ByteRange> {
    let range_spec = header.strip_prefix("bytes=")?;
    let (start_str, end_str) = range_spec.split_once('-')?;

    let start: u64 = start_str.parse().ok()?;
    if end_str.is_empty() {
        return Some(ByteRange { start, end: None });
    }

    let end: u64 = end_str.parse().ok()?;
    if start > end {
        return None;
    }

    Some(ByteRange {
        start,
        end: Some(end),
    })
}
