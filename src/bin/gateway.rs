// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Edge gateway entry point.

use patientgate::{
    config::{self, GatewayConfig},
    gateway::{self, DownstreamProxy, GatewayState, ValidatorClient},
};

#[tokio::main]
async fn main() {
    config::init_tracing();

    let config = GatewayConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "configuration error");
        std::process::exit(1);
    });

    let state = GatewayState {
        validator: ValidatorClient::new(config.auth_service_url.clone(), config.validate_timeout),
        proxy: DownstreamProxy::new(config.downstream_url.clone()),
    };
    let app = gateway::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind listener");
    tracing::info!(
        addr = %config.bind,
        auth_service = %config.auth_service_url,
        downstream = %config.downstream_url,
        "gateway listening"
    );

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
