// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! # Authentication Module
//!
//! Signed session tokens for the patient records platform.
//!
//! ## Token Flow
//!
//! 1. A client logs in with `POST /auth/login`; the [`issuer::TokenIssuer`]
//!    checks the credential store and mints a signed token.
//! 2. Every protected request carries `Authorization: Bearer <token>`.
//! 3. The edge gateway delegates the trust decision: it calls the identity
//!    service's `GET /validate`, which runs [`codec::TokenCodec::decode`]
//!    against the shared signing key.
//!
//! ## Security
//!
//! - The shared secret is decoded once at startup and held immutably for the
//!   process lifetime; it is never logged or persisted in cleartext.
//! - Signature comparison is constant-time (inside `jsonwebtoken`).
//! - Expiry is checked only after the signature passes, so a forged token
//!   learns nothing about claimed expiry.
//! - Credential failures are a single generic variant; "user not found" and
//!   "bad password" are indistinguishable to the caller.

pub mod claims;
pub mod codec;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod outcome;

pub use claims::ClaimSet;
pub use codec::{DecodeFailure, TokenCodec};
pub use error::AuthError;
pub use issuer::{AuthFailure, TokenIssuer};
pub use keys::SigningKey;
pub use outcome::ValidationOutcome;
