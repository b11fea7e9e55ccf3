// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! # Edge Gateway
//!
//! The gateway sits in front of the downstream patient services and defers
//! every trust decision to the identity service: it never holds the signing
//! key and never inspects claims itself.
//!
//! ## Per-request flow
//!
//! 1. [`filter::delegate_auth`] extracts the bearer token. A missing header
//!    or a non-Bearer scheme is rejected locally without any network call.
//! 2. Otherwise [`client::ValidatorClient`] calls `GET /validate` on the
//!    identity service, bounded by a timeout.
//! 3. Valid verdict: the original request is forwarded unchanged by
//!    [`proxy::DownstreamProxy`]. Invalid verdict: bare 401. Identity
//!    service unreachable: 503, so operators can tell bad credentials from
//!    an auth outage.

use axum::{middleware, Router};
use tower_http::{
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    trace::TraceLayer,
};

pub mod client;
pub mod filter;
pub mod proxy;

pub use client::ValidatorClient;
pub use proxy::DownstreamProxy;

/// Shared state for the gateway process.
///
/// Both members hold pooled `reqwest` clients; cloning is cheap and no
/// per-request mutable state exists.
#[derive(Clone)]
pub struct GatewayState {
    pub validator: ValidatorClient,
    pub proxy: DownstreamProxy,
}

/// Build the gateway router: the delegation filter wraps every route, and
/// everything that passes it is forwarded downstream.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .fallback(proxy::forward)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            filter::delegate_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn router_builds() {
        let state = GatewayState {
            validator: ValidatorClient::new("http://127.0.0.1:9", Duration::from_millis(100)),
            proxy: DownstreamProxy::new("http://127.0.0.1:9"),
        };
        let _ = router(state).into_make_service();
    }
}
