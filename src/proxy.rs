//! Reverse-proxy rule: requests under the backend prefix are forwarded to
//! the backend origin for the active deployment mode, path unchanged.

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{self, HeaderMap};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::{BackendConfig, Config, Mode};

/// Largest request body forwarded to the backend.
const MAX_PROXY_BODY: usize = 10 * 1024 * 1024;

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRule {
    prefix: String,
    origin: String,
}

impl ProxyRule {
    pub fn for_mode(backend: &BackendConfig, mode: Mode) -> Self {
        let origin = match mode {
            Mode::Development => &backend.dev_origin,
            Mode::Production => &backend.prod_origin,
        };
        Self {
            prefix: backend.proxy_prefix.clone(),
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::for_mode(&config.backend, config.mode)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Router pattern matching everything under the prefix.
    pub fn route_pattern(&self) -> String {
        format!("{}{{*path}}", self.prefix)
    }

    /// Backend URL for a request path (with optional query), or `None` when
    /// the path is outside the prefix.
    pub fn destination(&self, path_and_query: &str) -> Option<String> {
        if !path_and_query.starts_with(&self.prefix) {
            return None;
        }
        Some(format!("{}{}", self.origin, path_and_query))
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Forward `req` to the backend and relay the response as-is.
/// Answers 502 if the backend cannot be reached.
pub async fn forward(client: &reqwest::Client, rule: &ProxyRule, req: Request) -> Response {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let Some(target) = rule.destination(&path_and_query) else {
        return (StatusCode::NOT_FOUND, "No proxy rule matches this path").into_response();
    };

    let (parts, body) = req.into_parts();
    let body = match axum::body::to_bytes(body, MAX_PROXY_BODY).await {
        Ok(b) => b,
        Err(e) => {
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Failed to read request body: {e}"),
            )
                .into_response();
        }
    };

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);

    tracing::debug!("Proxying {} {path_and_query} -> {target}", parts.method);

    let upstream = match client
        .request(parts.method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!("Backend unreachable at {target}: {e}");
            return (StatusCode::BAD_GATEWAY, format!("Backend unreachable: {e}")).into_response();
        }
    };

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
