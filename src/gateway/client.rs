// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! HTTP client for the identity service's validation endpoint.
//!
//! Every transport-level failure (connect error, timeout, unexpected
//! status, unreadable success body) maps to
//! [`ValidationOutcome::UpstreamUnavailable`] so the filter can answer
//! service-unavailable instead of unauthorized. Retry and backoff are
//! deliberately not implemented here; the per-request state machine does
//! not retry.

use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::auth::{ClaimSet, ValidationOutcome};

/// Error body returned by the validation endpoint on 401.
#[derive(Debug, Deserialize)]
struct ValidateErrorBody {
    #[serde(default)]
    error_code: String,
}

/// Asynchronous client for `GET /validate`.
///
/// The underlying `reqwest::Client` pools connections and is bounded by the
/// configured timeout; an in-flight call is abandoned when the caller's
/// request future is dropped (validation is read-only, nothing to undo).
#[derive(Clone)]
pub struct ValidatorClient {
    http: reqwest::Client,
    base_url: String,
}

impl ValidatorClient {
    /// Create a client for the identity service at `base_url`.
    ///
    /// `timeout` bounds the whole validation round trip; on expiry the
    /// outcome is `UpstreamUnavailable`, never an indefinite hang.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Validate a raw token against the identity service.
    ///
    /// Never fails with a transport error; everything collapses into a
    /// [`ValidationOutcome`].
    pub async fn validate(&self, token: &str) -> ValidationOutcome {
        let url = format!("{}/validate", self.base_url.trim_end_matches('/'));

        let response = match self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "identity service unreachable");
                return ValidationOutcome::UpstreamUnavailable;
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<ClaimSet>().await {
                Ok(claims) => ValidationOutcome::Valid(claims),
                Err(e) => {
                    tracing::warn!(error = %e, "identity service returned an unreadable verdict");
                    ValidationOutcome::UpstreamUnavailable
                }
            };
        }

        if status == StatusCode::UNAUTHORIZED {
            let code = response
                .json::<ValidateErrorBody>()
                .await
                .map(|body| body.error_code)
                .unwrap_or_default();
            return ValidationOutcome::from_error_code(&code);
        }

        tracing::warn!(%status, "unexpected status from identity service");
        ValidationOutcome::UpstreamUnavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::auth::SigningKey;
    use crate::state::AppState;
    use crate::store::{InMemoryCredentialStore, UserRecord};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use chrono::Duration as ChronoDuration;
    use std::sync::Arc;

    /// Serve the real identity service on an ephemeral port and return its
    /// base URL plus a freshly issued token.
    async fn spawn_identity_service() -> (String, String) {
        let key = SigningKey::from_base64(&STANDARD.encode([6u8; 32])).unwrap();
        let store = InMemoryCredentialStore::from_records([UserRecord {
            email: "a@b.com".to_string(),
            password: "password123".to_string(),
            role: "ADMIN".to_string(),
        }]);
        let state = AppState::new(Arc::new(store), key, ChronoDuration::hours(100));
        let token = state.issuer.issue("a@b.com", "password123").unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, api::router(state)).await.unwrap();
        });

        (format!("http://{addr}"), token)
    }

    #[tokio::test]
    async fn valid_token_yields_valid_with_claims() {
        let (base_url, token) = spawn_identity_service().await;
        let client = ValidatorClient::new(base_url, Duration::from_secs(2));

        match client.validate(&token).await {
            ValidationOutcome::Valid(claims) => {
                assert_eq!(claims.sub, "a@b.com");
                assert_eq!(claims.role, "ADMIN");
            }
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn foreign_key_token_yields_signature_invalid() {
        let (base_url, _) = spawn_identity_service().await;
        let client = ValidatorClient::new(base_url, Duration::from_secs(2));

        // Signed with a key the identity service does not hold.
        let other_key = SigningKey::from_base64(&STANDARD.encode([9u8; 32])).unwrap();
        let forged = crate::auth::TokenCodec::new(Arc::new(other_key))
            .encode(&crate::auth::ClaimSet::new(
                "a@b.com",
                "ADMIN",
                ChronoDuration::hours(1),
            ))
            .unwrap();

        assert_eq!(
            client.validate(&forged).await,
            ValidationOutcome::SignatureInvalid
        );
    }

    #[tokio::test]
    async fn garbage_token_yields_malformed() {
        let (base_url, _) = spawn_identity_service().await;
        let client = ValidatorClient::new(base_url, Duration::from_secs(2));

        assert_eq!(
            client.validate("not-a-token").await,
            ValidationOutcome::Malformed
        );
    }

    #[tokio::test]
    async fn connection_refused_yields_upstream_unavailable() {
        // Bind and immediately drop a listener so the port is closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ValidatorClient::new(format!("http://{addr}"), Duration::from_millis(500));
        assert_eq!(
            client.validate("anything").await,
            ValidationOutcome::UpstreamUnavailable
        );
    }

    #[tokio::test]
    async fn non_validate_status_yields_upstream_unavailable() {
        // A server that answers 500 to everything.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().fallback(|| async {
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        });
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = ValidatorClient::new(format!("http://{addr}"), Duration::from_secs(1));
        assert_eq!(
            client.validate("anything").await,
            ValidationOutcome::UpstreamUnavailable
        );
    }
}
