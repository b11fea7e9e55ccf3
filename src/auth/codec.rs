// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Token encoding and verification.
//!
//! Tokens are compact HS256 JWTs: three base64url segments joined by `.`
//! (`header.payload.signature`), with the MAC computed over the
//! `header.payload` bytes exactly as transmitted.
//!
//! Decoding is fail-closed: every parsing fault is caught here and mapped to
//! a typed [`DecodeFailure`]; nothing propagates raw to callers. The
//! signature is verified (constant-time, inside `jsonwebtoken`) before the
//! expiry comparison, so a forged token never learns whether its claimed
//! expiry would have passed.

use std::sync::Arc;

use jsonwebtoken::{errors::ErrorKind, Algorithm, Header, Validation};

use super::claims::ClaimSet;
use super::keys::SigningKey;

/// Clock skew tolerance applied to the expiry check (60 seconds).
pub const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Why a token failed verification.
///
/// `Malformed` and `SignatureInvalid` are surfaced identically to end users
/// (both are a bare unauthorized); the distinction exists for the validation
/// endpoint's machine-readable body and for operator logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,
}

/// Failure while serializing and signing a claim set.
///
/// Unreachable for well-formed claims; mapped to an internal error, never to
/// an unauthorized response.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode token: {0}")]
pub struct EncodeError(#[from] jsonwebtoken::errors::Error);

/// Encodes claim sets into signed tokens and verifies them back.
///
/// Borrows the process-wide [`SigningKey`]; stateless otherwise and safe for
/// unlimited concurrent use.
#[derive(Clone)]
pub struct TokenCodec {
    key: Arc<SigningKey>,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(key: Arc<SigningKey>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;

        Self { key, validation }
    }

    /// Encode and sign a claim set as a compact token string.
    ///
    /// Deterministic for identical claims (HMAC carries no nonce).
    pub fn encode(&self, claims: &ClaimSet) -> Result<String, EncodeError> {
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, self.key.encoding())?;
        Ok(token)
    }

    /// Verify a token string and return its claims.
    ///
    /// `jsonwebtoken` performs the checks in the required order: segment
    /// split and base64url decode (`Malformed`), constant-time MAC
    /// comparison (`SignatureInvalid`), then expiry (`Expired`). Any other
    /// fault, including an unexpected algorithm in the header, collapses to
    /// `Malformed`.
    pub fn decode(&self, token: &str) -> Result<ClaimSet, DecodeFailure> {
        jsonwebtoken::decode::<ClaimSet>(token, self.key.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => DecodeFailure::Expired,
                ErrorKind::InvalidSignature => DecodeFailure::SignatureInvalid,
                _ => DecodeFailure::Malformed,
            })
    }
}
