// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Validation verdict vocabulary shared by the identity service and the
//! gateway's validator client.

use super::claims::ClaimSet;
use super::codec::DecodeFailure;

/// The outcome of one validation attempt. Exactly one variant per attempt.
///
/// The first five mirror what the identity service can decide locally;
/// `UpstreamUnavailable` exists only on the gateway side, for transport
/// failures reaching the validation endpoint. The gateway maps it to
/// service-unavailable rather than unauthorized, so operators can tell
/// "bad credentials" from "auth service down".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(ClaimSet),
    MissingToken,
    Malformed,
    SignatureInvalid,
    Expired,
    UpstreamUnavailable,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    /// Recover an outcome from the validation endpoint's machine-readable
    /// `error_code`. Unknown codes collapse to `Malformed`, never to valid.
    pub fn from_error_code(code: &str) -> Self {
        match code {
            "missing_auth_header" | "invalid_auth_header" => ValidationOutcome::MissingToken,
            "malformed_token" => ValidationOutcome::Malformed,
            "invalid_signature" => ValidationOutcome::SignatureInvalid,
            "token_expired" => ValidationOutcome::Expired,
            _ => ValidationOutcome::Malformed,
        }
    }
}

impl From<DecodeFailure> for ValidationOutcome {
    fn from(failure: DecodeFailure) -> Self {
        match failure {
            DecodeFailure::Malformed => ValidationOutcome::Malformed,
            DecodeFailure::SignatureInvalid => ValidationOutcome::SignatureInvalid,
            DecodeFailure::Expired => ValidationOutcome::Expired,
        }
    }
}
