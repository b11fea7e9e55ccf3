// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Token validation endpoint, called by the edge gateway on every protected
//! request.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};

use crate::auth::{AuthError, ClaimSet};
use crate::state::AppState;

/// Validate the bearer token in the `Authorization` header.
///
/// Pure delegation to the token codec; stateless and safe for unlimited
/// concurrent invocation. Returns the verified claims on success and a
/// machine-readable failure code otherwise, so the gateway can branch
/// deterministically.
#[utoipa::path(
    get,
    path = "/validate",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token is valid", body = ClaimSet),
        (status = 401, description = "Token is missing, malformed, forged or expired"),
    )
)]
pub async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ClaimSet>, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    let claims = state.codec.decode(token).map_err(|failure| {
        tracing::debug!(%failure, "token validation failed");
        AuthError::from(failure)
    })?;

    Ok(Json(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::auth::SigningKey;
    use crate::state::AppState;
    use crate::store::{InMemoryCredentialStore, UserRecord};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use base64::{engine::general_purpose::STANDARD, Engine};
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let key = SigningKey::from_base64(&STANDARD.encode([4u8; 32])).unwrap();
        let store = InMemoryCredentialStore::from_records([UserRecord {
            email: "a@b.com".to_string(),
            password: "password123".to_string(),
            role: "ADMIN".to_string(),
        }]);
        AppState::new(Arc::new(store), key, Duration::hours(100))
    }

    fn validate_request(auth_header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/validate");
        if let Some(value) = auth_header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn error_code(response: axum::response::Response) -> String {
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        body["error_code"].as_str().unwrap().to_string()
    }

    fn app_and_token() -> (Router, String) {
        let state = test_state();
        let token = state.issuer.issue("a@b.com", "password123").unwrap();
        (router(state), token)
    }

    #[tokio::test]
    async fn valid_token_returns_claims() {
        let (app, token) = app_and_token();

        let response = app
            .oneshot(validate_request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let claims: ClaimSet = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.role, "ADMIN");
    }

    #[tokio::test]
    async fn missing_header_is_401_missing_auth_header() {
        let (app, _) = app_and_token();
        let response = app.oneshot(validate_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "missing_auth_header");
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_401_invalid_auth_header() {
        let (app, _) = app_and_token();
        let response = app
            .oneshot(validate_request(Some("Basic abc")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "invalid_auth_header");
    }

    #[tokio::test]
    async fn foreign_key_token_is_401_invalid_signature() {
        let (app, _) = app_and_token();

        let other_key = SigningKey::from_base64(&STANDARD.encode([9u8; 32])).unwrap();
        let other_codec = crate::auth::TokenCodec::new(Arc::new(other_key));
        let forged = other_codec
            .encode(&ClaimSet::new("a@b.com", "ADMIN", Duration::hours(1)))
            .unwrap();

        let response = app
            .oneshot(validate_request(Some(&format!("Bearer {forged}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "invalid_signature");
    }

    #[tokio::test]
    async fn garbage_token_is_401_malformed() {
        let (app, _) = app_and_token();
        let response = app
            .oneshot(validate_request(Some("Bearer not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "malformed_token");
    }

    #[tokio::test]
    async fn expired_token_is_401_token_expired() {
        let state = test_state();
        let now = Utc::now().timestamp();
        let expired = ClaimSet {
            sub: "a@b.com".to_string(),
            role: "ADMIN".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = state.codec.encode(&expired).unwrap();
        let app = router(state);

        let response = app
            .oneshot(validate_request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "token_expired");
    }
}
