// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Login endpoint: credentials in, signed session token out.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthFailure;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Compact signed session token to present as `Authorization: Bearer`.
    pub token: String,
}

/// Authenticate a credential pair and return a session token.
///
/// The 401 response is deliberately generic: it never says whether the email
/// exists.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    match state.issuer.issue(&request.email, &request.password) {
        Ok(token) => Ok(Json(LoginResponse { token })),
        Err(AuthFailure::InvalidCredentials) => {
            tracing::debug!("login rejected: invalid credentials");
            Err(ApiError::unauthorized("Invalid email or password"))
        }
        Err(AuthFailure::Encoding(e)) => {
            tracing::error!(error = %e, "token encoding failed");
            Err(ApiError::internal("Failed to issue token"))
        }
    }
}
