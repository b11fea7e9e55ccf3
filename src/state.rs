// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{SigningKey, TokenCodec, TokenIssuer};
use crate::store::CredentialStore;

/// Shared state for the identity service.
///
/// Everything here is immutable after startup; requests only ever read it,
/// so no locks are taken on the per-request path.
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<TokenIssuer>,
    pub codec: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, signing_key: SigningKey, token_ttl: Duration) -> Self {
        let codec = Arc::new(TokenCodec::new(Arc::new(signing_key)));
        let issuer = Arc::new(TokenIssuer::new(store, Arc::clone(&codec), token_ttl));

        Self { issuer, codec }
    }
}
