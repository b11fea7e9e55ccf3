// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Shared signing key management.
//!
//! The symmetric signing key is derived once from a base64-encoded
//! configuration secret at process start and held for the process lifetime.
//! Raw key bytes are dropped after construction; nothing outside this module
//! ever sees them, and `Debug` output is redacted.

use base64ct::{Base64, Encoding};
use jsonwebtoken::{DecodingKey, EncodingKey};

/// Minimum decoded secret length: 256 bits for HMAC-SHA256.
pub const MIN_KEY_BYTES: usize = 32;

/// Errors raised while loading the signing secret. Fatal at startup.
///
/// Neither variant carries any of the secret material itself.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("signing secret is not valid base64")]
    InvalidBase64,

    #[error("signing secret decodes to {got} bytes; HMAC-SHA256 requires at least {MIN_KEY_BYTES}")]
    TooShort { got: usize },
}

/// The process-wide symmetric signing key.
///
/// Immutable after construction and safe to share by reference across all
/// concurrent issuers and validators.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Decode a base64 secret into a signing key.
    ///
    /// Fails if the value is not valid base64 or decodes to fewer than
    /// [`MIN_KEY_BYTES`] bytes. Both services must be given the identical
    /// secret or every token is universally rejected.
    pub fn from_base64(secret: &str) -> Result<Self, KeyError> {
        let bytes = Base64::decode_vec(secret.trim()).map_err(|_| KeyError::InvalidBase64)?;

        if bytes.len() < MIN_KEY_BYTES {
            return Err(KeyError::TooShort { got: bytes.len() });
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(&bytes),
            decoding: DecodingKey::from_secret(&bytes),
        })
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material must never leak through logs or panics.
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}
