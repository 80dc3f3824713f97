//! REST API handlers.
//!
//! Proxy failures answer 404 with the underlying error text. Every cluster
//! lookup failure answers a generic 500; the cause is only in the logs.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::error;

use crate::api::ApiState;
use crate::k8s::{endpoints, proxy, versions::VersionProbe};

const PROXY_PREFIX: &str = "/proxy/";

const INTERNAL_ERROR_MESSAGE: &str = "unable to retrieve the requested cluster information";

fn error_response(msg: &str, status: StatusCode) -> Response {
    (status, msg.to_string()).into_response()
}

fn internal_error() -> Response {
    error_response(INTERNAL_ERROR_MESSAGE, StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Debug, Deserialize)]
pub struct NamespaceQuery {
    pub namespace: Option<String>,
}

impl NamespaceQuery {
    fn resolve<'a>(&'a self, state: &'a ApiState) -> &'a str {
        self.namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(&state.settings.install_namespace)
    }
}

// ── Proxy ──────────────────────────────────────────────────────

/// ANY /proxy/{*subpath}
pub async fn proxy(
    State(state): State<ApiState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    // keep the sub-path percent-encoded as received
    let subpath = uri
        .path()
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or(uri.path());

    let request = proxy::ForwardRequest {
        method,
        path: subpath.to_string(),
        query: uri.query().map(str::to_string),
        content_type,
        body,
    };

    match proxy::forward(state.cluster.as_ref(), request).await {
        Ok(forwarded) => (
            StatusCode::OK,
            [(CONTENT_TYPE, forwarded.content_type)],
            forwarded.body,
        )
            .into_response(),
        Err(e) => {
            error!("proxy request failed: {}", e);
            error_response(&e.to_string(), StatusCode::NOT_FOUND)
        }
    }
}

// ── Endpoints ──────────────────────────────────────────────────

/// GET /ingress?namespace=
pub async fn get_ingress(
    State(state): State<ApiState>,
    Query(query): Query<NamespaceQuery>,
) -> Response {
    let namespace = query.resolve(&state);
    match endpoints::ingress_host(state.cluster.as_ref(), namespace, &state.settings.ingress_name)
        .await
    {
        Ok(host) => Json(host).into_response(),
        Err(_) => internal_error(),
    }
}

/// GET /endpoints?namespace=
pub async fn get_endpoints(
    State(state): State<ApiState>,
    Query(query): Query<NamespaceQuery>,
) -> Response {
    let namespace = query.resolve(&state);
    let settings = &state.settings;
    match endpoints::endpoints(
        state.cluster.as_ref(),
        namespace,
        &settings.route_name,
        &settings.ingress_name,
    )
    .await
    {
        Ok(found) => Json(found).into_response(),
        Err(_) => internal_error(),
    }
}

// ── Properties ─────────────────────────────────────────────────

/// GET /properties
pub async fn get_properties(State(state): State<ApiState>) -> Response {
    Json(state.settings.properties()).into_response()
}

// ── Versions ───────────────────────────────────────────────────

async fn version_response(state: &ApiState, probe: &VersionProbe) -> Response {
    match probe.resolve(state.cluster.as_ref()).await {
        Ok(version) => Json(version).into_response(),
        Err(_) => internal_error(),
    }
}

/// GET /dashboard-version
pub async fn get_dashboard_version(State(state): State<ApiState>) -> Response {
    let probe = state.settings.dashboard_version_probe();
    version_response(&state, &probe).await
}

/// GET /pipeline-version
pub async fn get_pipeline_version(State(state): State<ApiState>) -> Response {
    let probe = state.settings.pipeline_version_probe();
    version_response(&state, &probe).await
}
