//! Raw request forwarding to the Kubernetes API server.

use crate::error::Result;
use crate::k8s::cluster::ClusterApi;
use bytes::Bytes;
use hyper::http::header::CONTENT_TYPE;
use hyper::http::{Method, Request, Uri};
use tracing::debug;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// An inbound request to be replayed against the API server
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Percent-encoded sub-path below the proxy prefix, without a leading `/`
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Body of a forwarded call plus the content type sniffed from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardResponse {
    pub body: Bytes,
    pub content_type: &'static str,
}

impl ForwardRequest {
    /// Target URI on the API server
    ///
    /// # Errors
    ///
    /// Will return `Err` if the sub-path and query do not form a valid URI
    pub fn uri(&self) -> Result<Uri> {
        let path = self.path.trim_start_matches('/');
        let target = match self.query.as_deref() {
            Some(query) if !query.is_empty() => format!("/{path}?{query}"),
            _ => format!("/{path}"),
        };
        Ok(target.parse::<Uri>()?)
    }

    fn into_request(self) -> Result<Request<Vec<u8>>> {
        let mut builder = Request::builder().method(self.method.clone()).uri(self.uri()?);
        if let Some(content_type) = self.content_type.as_deref() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        Ok(builder.body(self.body.to_vec())?)
    }
}

/// Guess a content type from the response bytes. The API server does not
/// report a usable type for every payload (pod logs are plain text), so the
/// header of the upstream response is never trusted.
#[must_use]
pub fn sniff_content_type(body: &[u8]) -> &'static str {
    if serde_json::from_slice::<serde::de::IgnoredAny>(body).is_ok() {
        JSON_CONTENT_TYPE
    } else if std::str::from_utf8(body).is_ok() {
        TEXT_CONTENT_TYPE
    } else {
        BINARY_CONTENT_TYPE
    }
}

/// Replay `request` against the API server
///
/// # Errors
///
/// Will return `Err` if the target URI cannot be parsed, or the API server
/// call fails or answers with a non-success status
pub async fn forward(cluster: &dyn ClusterApi, request: ForwardRequest) -> Result<ForwardResponse> {
    let method = request.method.clone();
    let outbound = request.into_request()?;
    debug!("forwarding {} {}", method, outbound.uri());

    let body = cluster.send_raw(outbound).await?;
    let content_type = sniff_content_type(&body);
    Ok(ForwardResponse { body, content_type })
}
