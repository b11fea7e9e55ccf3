// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! HTTP mapping for validation failures.
//!
//! The validation endpoint answers the gateway, not end users, so the body
//! carries a machine-readable `error_code` the gateway can branch on
//! deterministically. The gateway itself never forwards these bodies; end
//! users only ever see its bare unauthorized response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::codec::DecodeFailure;

/// Authentication error returned by the validation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Header present but not `Bearer <token>`
    InvalidAuthHeader,
    /// Token is malformed
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        // Every validation failure is unauthorized; the distinction between
        // kinds lives in the error_code and in operator logs only.
        StatusCode::UNAUTHORIZED
    }
}

impl From<DecodeFailure> for AuthError {
    fn from(failure: DecodeFailure) -> Self {
        match failure {
            DecodeFailure::Malformed => AuthError::MalformedToken,
            DecodeFailure::SignatureInvalid => AuthError::InvalidSignature,
            DecodeFailure::Expired => AuthError::TokenExpired,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
