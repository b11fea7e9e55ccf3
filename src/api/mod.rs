// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::health::HealthResponse,
    api::login::{LoginRequest, LoginResponse},
    auth::ClaimSet,
    state::AppState,
};

pub mod health;
pub mod login;
pub mod validate;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/auth/login", post(login::login))
        .route("/validate", get(validate::validate))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        login::login,
        validate::validate,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(schemas(LoginRequest, LoginResponse, ClaimSet, HealthResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Session token issuance and validation"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
