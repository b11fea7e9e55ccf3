// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! The delegation filter: intercepts every inbound request before any
//! downstream routing and defers the trust decision to the identity
//! service.
//!
//! The filter treats the validator's verdict as authoritative and opaque.
//! It never inspects or trusts claims itself; role-based decisions are a
//! downstream concern. Rejections are minimal and non-descriptive, with
//! the specific failure kind available only in operator logs.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::GatewayState;
use crate::auth::ValidationOutcome;

/// Authentication middleware for the gateway.
///
/// A missing `Authorization` header or a non-Bearer scheme short-circuits
/// locally; those are the only rejections decidable without the identity
/// service, and they save the network round trip entirely.
pub async fn delegate_auth(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => {
            tracing::debug!("request rejected locally: no bearer token");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    match state.validator.validate(&token).await {
        ValidationOutcome::Valid(_) => next.run(request).await,
        ValidationOutcome::UpstreamUnavailable => {
            tracing::warn!("identity service unavailable, failing closed");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        outcome => {
            tracing::debug!(?outcome, "request rejected by identity service");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

/// Extract the raw token from a `Bearer` authorization header, if any.
fn bearer_token(request: &Request) -> Option<String> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{DownstreamProxy, GatewayState, ValidatorClient};
    use axum::{
        body::Body,
        http::Request as HttpRequest,
        middleware,
        routing::get,
        Json, Router,
    };
    use chrono::Duration as ChronoDuration;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;
    use tower::ServiceExt;

    /// A stub validation endpoint that counts how often it is called.
    ///
    /// Answers 200 with claims when the token is exactly "good", and 401
    /// with an error code otherwise.
    async fn spawn_counting_validator() -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_handler = Arc::clone(&calls);

        let app = Router::new().route(
            "/validate",
            get(move |request: HttpRequest<Body>| {
                let calls = Arc::clone(&calls_handler);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    let authorized = request
                        .headers()
                        .get(AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(|v| v == "Bearer good")
                        .unwrap_or(false);

                    if authorized {
                        let claims =
                            crate::auth::ClaimSet::new("a@b.com", "ADMIN", ChronoDuration::hours(1));
                        Json(serde_json::to_value(claims).unwrap()).into_response()
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(serde_json::json!({
                                "error": "Token signature is invalid",
                                "error_code": "invalid_signature",
                            })),
                        )
                            .into_response()
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), calls)
    }

    /// Gateway-shaped test app: the filter in front of a trivial handler.
    fn filtered_app(validator_url: &str) -> Router {
        let state = GatewayState {
            validator: ValidatorClient::new(validator_url, Duration::from_millis(500)),
            proxy: DownstreamProxy::new("http://127.0.0.1:9"),
        };
        Router::new()
            .route("/records", get(|| async { "downstream ok" }))
            .layer(middleware::from_fn_with_state(state, delegate_auth))
    }

    fn request(auth_header: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method("GET").uri("/records");
        if let Some(value) = auth_header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_header_rejected_without_calling_validator() {
        let (url, calls) = spawn_counting_validator().await;
        let app = filtered_app(&url);

        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected_without_calling_validator() {
        let (url, calls) = spawn_counting_validator().await;
        let app = filtered_app(&url);

        let response = app.oneshot(request(Some("Basic abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_bearer_token_rejected_locally() {
        let (url, calls) = spawn_counting_validator().await;
        let app = filtered_app(&url);

        let response = app.oneshot(request(Some("Bearer "))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_verdict_forwards_the_request() {
        let (url, calls) = spawn_counting_validator().await;
        let app = filtered_app(&url);

        let response = app.oneshot(request(Some("Bearer good"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_verdict_is_unauthorized() {
        let (url, calls) = spawn_counting_validator().await;
        let app = filtered_app(&url);

        let response = app.oneshot(request(Some("Bearer forged"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn validator_outage_is_service_unavailable_not_unauthorized() {
        // Closed port: connection refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let app = filtered_app(&format!("http://{addr}"));
        let response = app.oneshot(request(Some("Bearer good"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn validator_timeout_is_service_unavailable() {
        // A socket that accepts connections but never answers: the
        // validation call runs into its timeout instead of a refusal.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = filtered_app(&format!("http://{addr}"));
        let response = app.oneshot(request(Some("Bearer good"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        drop(listener);
    }

    #[tokio::test]
    async fn concurrent_requests_with_same_token_all_pass() {
        let (url, calls) = spawn_counting_validator().await;
        let app = filtered_app(&url);

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let app = app.clone();
                tokio::spawn(async move {
                    app.oneshot(request(Some("Bearer good"))).await.unwrap()
                })
            })
            .collect();

        for handle in handles {
            let response = handle.await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 100);
    }
}
