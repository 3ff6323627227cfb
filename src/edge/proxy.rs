//! Edge proxy server
//!
//! An `axum` front that applies [`EdgeRouter`](crate::edge::EdgeRouter)
//! decisions to live traffic: static-origin decisions are served from the
//! asset directory on disk (with the index document as SPA fallback), and
//! dynamic-origin decisions are forwarded to the compute service with the
//! policy-filtered header set and a cache-bypass response header.
//!
//! Routing rejections surface as HTTP statuses (405 for a disallowed
//! method, 404 when no rule matches); they are never downgraded to the
//! wrong origin.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{CACHE_CONTROL, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderValue, Request, StatusCode};
use url::Url;

use crate::config::Config;
use crate::edge::router::{EdgeRequest, EdgeRouter};
use crate::edge::rules::{OriginKind, RuleTable};
use crate::error::{PromptEdgeError, Result};

/// Largest request body the proxy will buffer for forwarding.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared state for the proxy handlers.
struct ProxyState {
    router: EdgeRouter,
    http: reqwest::Client,
    dynamic_origin: Url,
    static_root: PathBuf,
    index_document: String,
}

/// Build the proxy service from the configuration.
///
/// Constructs the canonical rule table and the shared handler state. The
/// returned router can be served on any listener, which is how the
/// integration tests drive it on an ephemeral port.
///
/// # Errors
///
/// Returns an error if the rule table is invalid or the dynamic origin is
/// not configured.
pub fn app(config: &Config) -> Result<axum::Router> {
    let table = RuleTable::for_app(
        &config.edge.api_prefix,
        Duration::from_secs(config.edge.static_max_age_secs),
    )?;
    let dynamic_origin = config.dynamic_origin_url()?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.client.timeout_seconds))
        .build()
        .map_err(|e| PromptEdgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let state = Arc::new(ProxyState {
        router: EdgeRouter::new(table),
        http,
        dynamic_origin,
        static_root: config.edge.static_root.clone(),
        index_document: config.edge.index_document.clone(),
    });

    Ok(axum::Router::new().fallback(handle).with_state(state))
}

/// Run the edge proxy until the process is stopped.
///
/// # Errors
///
/// Returns an error if the service cannot be built or the listener cannot
/// bind.
pub async fn serve(config: &Config) -> Result<()> {
    let app = app(config)?;

    let listener = tokio::net::TcpListener::bind(&config.edge.listen_addr).await?;
    tracing::info!(
        listen_addr = %config.edge.listen_addr,
        api_prefix = %config.edge.api_prefix,
        "Edge proxy listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Dispatch one request through the rule table.
async fn handle(State(state): State<Arc<ProxyState>>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(str::to_string);

    let edge_request = EdgeRequest {
        path: path.clone(),
        method: parts.method.clone(),
        query: query.clone(),
        cookies: parse_cookies(&parts.headers),
        headers: parts.headers,
    };

    let decision = match state.router.route(&edge_request) {
        Ok(decision) => decision,
        Err(PromptEdgeError::MethodNotAllowed { method, path }) => {
            tracing::warn!(%method, %path, "Rejected request: method not allowed");
            return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
        }
        Err(PromptEdgeError::NoRouteMatched(path)) => {
            tracing::warn!(%path, "Rejected request: no route matched");
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Routing failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Routing failed").into_response();
        }
    };

    match decision.origin {
        OriginKind::Static => {
            serve_static(&state, &path, &decision.cache.cache_control()).await
        }
        OriginKind::Dynamic => {
            let query = if decision.forward_query { query } else { None };
            forward_dynamic(
                &state,
                &edge_request.method,
                &path,
                query.as_deref(),
                decision.forwarded_headers,
                &decision.cache.cache_control(),
                body,
            )
            .await
        }
    }
}

/// Serve a file from the static root, falling back to the index document.
async fn serve_static(state: &ProxyState, path: &str, cache_control: &str) -> Response {
    let index = state.static_root.join(&state.index_document);

    let candidate = match resolve_static_path(&state.static_root, path) {
        Some(candidate) => candidate,
        None => {
            tracing::warn!(%path, "Rejected static path");
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        }
    };

    let (file, bytes) = match tokio::fs::read(&candidate).await {
        Ok(bytes) => (candidate, bytes),
        // Single-page-application behavior: unmatched static paths get the
        // index document.
        Err(_) => match tokio::fs::read(&index).await {
            Ok(bytes) => (index, bytes),
            Err(e) => {
                tracing::error!(error = %e, "Index document unavailable");
                return (StatusCode::NOT_FOUND, "Not found").into_response();
            }
        },
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(content_type_for(&file)) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(cache_control) {
        headers.insert(CACHE_CONTROL, value);
    }

    (StatusCode::OK, headers, Bytes::from(bytes)).into_response()
}

/// Forward a request to the dynamic origin and relay the response.
async fn forward_dynamic(
    state: &ProxyState,
    method: &http::Method,
    path: &str,
    query: Option<&str>,
    forwarded_headers: HeaderMap,
    cache_control: &str,
    body: Body,
) -> Response {
    let mut url = match state.dynamic_origin.join(path.trim_start_matches('/')) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, %path, "Invalid origin path");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    url.set_query(query);

    let body_bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let upstream = state
        .http
        .request(method.clone(), url)
        .headers(forwarded_headers)
        .body(body_bytes)
        .send()
        .await;

    let upstream = match upstream {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, %path, "Dynamic origin unreachable");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, %path, "Failed to read upstream body");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    let mut headers = HeaderMap::new();
    if let Some(value) = content_type {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(cache_control) {
        headers.insert(CACHE_CONTROL, value);
    }

    (status, headers, bytes).into_response()
}

/// Parse cookie pairs out of the `Cookie` request headers.
fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    let mut cookies = Vec::new();
    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let pair = pair.trim();
            if let Some((name, value)) = pair.split_once('=') {
                cookies.push((name.to_string(), value.to_string()));
            }
        }
    }
    cookies
}

/// Map a request path into the static root.
///
/// Returns `None` for paths that escape the root (any `..` component).
fn resolve_static_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        // Served as the index fallback by the caller.
        return Some(root.join("__nonexistent__"));
    }

    let relative = Path::new(relative);
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
    {
        return None;
    }

    Some(root.join(relative))
}

/// Content type derived from the file extension.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}
