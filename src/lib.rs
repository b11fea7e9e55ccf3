// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Patientgate - Authentication boundary for the patient records platform
//!
//! This crate provides the shared authentication boundary between the edge
//! gateway and the identity service: issuance of signed session tokens,
//! their verification, and the gateway's per-request delegation of that
//! verification to the identity service.
//!
//! ## Modules
//!
//! - `api` - Identity service HTTP endpoints (Axum)
//! - `auth` - Signing key, token codec, issuer, validation outcomes
//! - `gateway` - Edge gateway delegation filter and downstream proxy
//! - `store` - Credential store behind the issuer
//!
//! ## Binaries
//!
//! - `patientgate-auth` - the identity service (`/auth/login`, `/validate`)
//! - `patientgate-gateway` - the edge gateway in front of downstream services

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod state;
pub mod store;
