// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Minimal pass-through to the downstream services.
//!
//! Requests that survive the delegation filter are forwarded unchanged
//! (method, path, query, headers, body) to the configured downstream base
//! URL. This is the "next stage in the chain"; real per-service routing is
//! outside the authentication boundary.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};

use super::GatewayState;

/// Largest request body the proxy will buffer for forwarding (2 MiB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("downstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("request body exceeds the {MAX_BODY_BYTES} byte forwarding limit")]
    BodyTooLarge,

    #[error("downstream response could not be rebuilt: {0}")]
    Response(String),
}

/// Forwards validated requests to the downstream base URL.
#[derive(Clone)]
pub struct DownstreamProxy {
    http: reqwest::Client,
    base_url: String,
}

impl DownstreamProxy {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Forward one request and rebuild the downstream response.
    pub async fn forward(&self, request: Request) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();

        let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|_| ProxyError::BodyTooLarge)?;

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path_and_query);

        let mut headers = parts.headers;
        strip_non_forwardable(&mut headers);

        let upstream = self
            .http
            .request(parts.method, url)
            .headers(headers)
            .body(body_bytes)
            .send()
            .await?;

        let mut builder = Response::builder().status(upstream.status());
        for (name, value) in upstream.headers() {
            if !is_hop_by_hop(name) {
                builder = builder.header(name, value);
            }
        }

        let response_bytes = upstream.bytes().await?;
        builder
            .body(Body::from(response_bytes))
            .map_err(|e| ProxyError::Response(e.to_string()))
    }
}

/// Fallback handler: everything the filter lets through goes downstream.
///
/// An over-limit body is the client's fault and answers 413; transport
/// failures reaching the downstream answer 502.
pub async fn forward(State(state): State<GatewayState>, request: Request) -> Response {
    match state.proxy.forward(request).await {
        Ok(response) => response,
        Err(ProxyError::BodyTooLarge) => {
            tracing::debug!("request body over the forwarding limit");
            StatusCode::PAYLOAD_TOO_LARGE.into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "downstream forwarding failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Hop-by-hop headers are connection-scoped and must not be forwarded.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == header::CONNECTION
        || name == header::TRANSFER_ENCODING
        || name == header::UPGRADE
        || name == header::TE
        || name == header::TRAILER
        || name == header::PROXY_AUTHENTICATE
        || name == header::PROXY_AUTHORIZATION
        || name.as_str() == "keep-alive"
}

fn strip_non_forwardable(headers: &mut HeaderMap) {
    // Host must be regenerated for the downstream connection.
    headers.remove(header::HOST);
    let hop_by_hop: Vec<HeaderName> = headers
        .keys()
        .filter(|name| is_hop_by_hop(name))
        .cloned()
        .collect();
    for name in hop_by_hop {
        headers.remove(name);
    }
}
