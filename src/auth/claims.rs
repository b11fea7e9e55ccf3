// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Claim set carried inside a session token.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims carried inside a signed session token.
///
/// The role is untrusted-but-signed data: it is transported verbatim for
/// downstream services and no authorization policy is derived from it here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClaimSet {
    /// Subject: the authenticated user's email.
    pub sub: String,

    /// Role string from the credential record, opaque to this subsystem.
    pub role: String,

    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,

    /// Expiry timestamp (Unix seconds), strictly after `iat`.
    pub exp: i64,
}

impl ClaimSet {
    /// Build a claim set issued now and expiring after `ttl`.
    ///
    /// `ttl` is validated positive at configuration load, which keeps the
    /// `exp > iat` invariant.
    pub fn new(subject: impl Into<String>, role: impl Into<String>, ttl: Duration) -> Self {
        debug_assert!(ttl > Duration::zero());

        let now = Utc::now().timestamp();
        Self {
            sub: subject.into(),
            role: role.into(),
            iat: now,
            exp: now + ttl.num_seconds(),
        }
    }
}
