// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Token issuance at login time.

use std::sync::Arc;

use chrono::Duration;

use super::claims::ClaimSet;
use super::codec::{EncodeError, TokenCodec};
use crate::store::CredentialStore;

/// Failures during token issuance.
#[derive(Debug, thiserror::Error)]
pub enum AuthFailure {
    /// The email/password pair did not authenticate. Deliberately a single
    /// generic variant: "user not found" and "bad password" must be
    /// indistinguishable to the caller.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Claims could not be serialized and signed. Operational, maps to an
    /// internal error rather than unauthorized.
    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

/// Issues signed session tokens for authenticated credentials.
///
/// Invoked out-of-band at login time, independent of the per-request
/// validation path.
pub struct TokenIssuer {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    token_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<TokenCodec>, token_ttl: Duration) -> Self {
        Self {
            store,
            codec,
            token_ttl,
        }
    }

    /// Authenticate a credential pair and mint a token on success.
    ///
    /// The claim set carries the stored email as subject, the stored role,
    /// issued-at now and expiry now + configured TTL.
    pub fn issue(&self, email: &str, password: &str) -> Result<String, AuthFailure> {
        let record = self
            .store
            .authenticate(email, password)
            .ok_or(AuthFailure::InvalidCredentials)?;

        let claims = ClaimSet::new(record.email, record.role, self.token_ttl);
        Ok(self.codec.encode(&claims)?)
    }
}
