// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Identity service entry point.

use std::sync::Arc;

use patientgate::{
    api,
    config::{self, AuthServiceConfig},
    state::AppState,
    store::InMemoryCredentialStore,
};

#[tokio::main]
async fn main() {
    config::init_tracing();

    // A bad or missing secret must prevent startup, never degrade silently.
    let config = AuthServiceConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "configuration error");
        std::process::exit(1);
    });

    let store = InMemoryCredentialStore::from_records(config.seed_users);
    tracing::info!(users = store.len(), "credential store seeded");

    let state = AppState::new(Arc::new(store), config.signing_key, config.token_ttl);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind listener");
    tracing::info!(addr = %config.bind, "identity service listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}
