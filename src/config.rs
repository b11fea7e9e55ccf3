// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. A bad or
//! missing value is fatal: the process refuses to start rather than run with
//! an ambiguous security configuration.
//!
//! ## Environment Variables
//!
//! | Variable | Process | Description | Default |
//! |----------|---------|-------------|---------|
//! | `JWT_SECRET` | auth | Base64 shared signing secret (>= 32 decoded bytes) | Required |
//! | `TOKEN_TTL_HOURS` | auth | Session token lifetime in hours | `100` |
//! | `SEED_USER` | auth | Seed credentials, `email:password:role[,...]` | None |
//! | `HOST` | both | Server bind address | `0.0.0.0` |
//! | `PORT` | both | Server bind port | `4005` (auth), `4004` (gateway) |
//! | `AUTH_SERVICE_URL` | gateway | Base URL of the identity service | Required |
//! | `DOWNSTREAM_URL` | gateway | Base URL requests are forwarded to | Required |
//! | `VALIDATE_TIMEOUT_MS` | gateway | Upper bound on the validation round trip | `2000` |
//! | `LOG_FORMAT` | both | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | both | Log level filter | `info` |

use std::env;
use std::net::SocketAddr;
use std::time::Duration as StdDuration;

use chrono::Duration;

use crate::auth::keys::{KeyError, SigningKey};
use crate::store::UserRecord;

/// Environment variable name for the base64-encoded shared signing secret.
///
/// The same value must be supplied to every process that issues or verifies
/// tokens; the secret is never negotiated at runtime. The raw value is
/// decoded once at startup and never logged.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the token lifetime in hours.
pub const TOKEN_TTL_HOURS_ENV: &str = "TOKEN_TTL_HOURS";

/// Environment variable name for seed credential records.
pub const SEED_USER_ENV: &str = "SEED_USER";

/// Environment variable name for the identity service base URL (gateway).
pub const AUTH_SERVICE_URL_ENV: &str = "AUTH_SERVICE_URL";

/// Environment variable name for the downstream base URL (gateway).
pub const DOWNSTREAM_URL_ENV: &str = "DOWNSTREAM_URL";

/// Environment variable name for the validation call timeout in milliseconds.
pub const VALIDATE_TIMEOUT_MS_ENV: &str = "VALIDATE_TIMEOUT_MS";

/// Default token lifetime when `TOKEN_TTL_HOURS` is not set.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 100;

/// Default validation call timeout when `VALIDATE_TIMEOUT_MS` is not set.
pub const DEFAULT_VALIDATE_TIMEOUT_MS: u64 = 2000;

/// Configuration errors. All of these prevent startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),

    #[error("{var} is invalid: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    #[error("signing secret rejected: {0}")]
    Key(#[from] KeyError),
}

/// Identity service configuration.
pub struct AuthServiceConfig {
    /// Bind address for the HTTP server.
    pub bind: SocketAddr,
    /// Shared signing key, decoded from `JWT_SECRET`.
    pub signing_key: SigningKey,
    /// Lifetime applied to every issued token.
    pub token_ttl: Duration,
    /// Credential records seeded into the in-memory store.
    pub seed_users: Vec<UserRecord>,
}

impl AuthServiceConfig {
    /// Load the identity service configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var(JWT_SECRET_ENV).map_err(|_| ConfigError::MissingVar(JWT_SECRET_ENV))?;
        let signing_key = SigningKey::from_base64(&secret)?;

        let token_ttl = match env::var(TOKEN_TTL_HOURS_ENV) {
            Ok(raw) => parse_ttl_hours(&raw)?,
            Err(_) => Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        };

        let seed_users = match env::var(SEED_USER_ENV) {
            Ok(raw) => parse_seed_users(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            bind: bind_addr("4005")?,
            signing_key,
            token_ttl,
            seed_users,
        })
    }
}

/// Edge gateway configuration.
pub struct GatewayConfig {
    /// Bind address for the HTTP server.
    pub bind: SocketAddr,
    /// Base URL of the identity service (`GET {url}/validate`).
    pub auth_service_url: String,
    /// Base URL validated requests are forwarded to.
    pub downstream_url: String,
    /// Upper bound on a single validation round trip.
    pub validate_timeout: StdDuration,
}

impl GatewayConfig {
    /// Load the gateway configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let auth_service_url = env::var(AUTH_SERVICE_URL_ENV)
            .map_err(|_| ConfigError::MissingVar(AUTH_SERVICE_URL_ENV))
            .and_then(|raw| parse_base_url(AUTH_SERVICE_URL_ENV, &raw))?;
        let downstream_url = env::var(DOWNSTREAM_URL_ENV)
            .map_err(|_| ConfigError::MissingVar(DOWNSTREAM_URL_ENV))
            .and_then(|raw| parse_base_url(DOWNSTREAM_URL_ENV, &raw))?;

        let validate_timeout = match env::var(VALIDATE_TIMEOUT_MS_ENV) {
            Ok(raw) => parse_timeout_ms(&raw)?,
            Err(_) => StdDuration::from_millis(DEFAULT_VALIDATE_TIMEOUT_MS),
        };

        Ok(Self {
            bind: bind_addr("4004")?,
            auth_service_url,
            downstream_url,
            validate_timeout,
        })
    }
}

/// Resolve the bind address from `HOST`/`PORT`.
fn bind_addr(default_port: &str) -> Result<SocketAddr, ConfigError> {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| default_port.to_string());

    format!("{host}:{port}")
        .parse()
        .map_err(|_| ConfigError::InvalidVar {
            var: "HOST/PORT",
            reason: format!("{host}:{port} is not a valid socket address"),
        })
}

/// Parse the token TTL. Must be a strictly positive number of hours, so the
/// issued `exp` is always strictly after `iat`.
fn parse_ttl_hours(raw: &str) -> Result<Duration, ConfigError> {
    let hours: i64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
        var: TOKEN_TTL_HOURS_ENV,
        reason: format!("{raw:?} is not a number"),
    })?;

    if hours <= 0 {
        return Err(ConfigError::InvalidVar {
            var: TOKEN_TTL_HOURS_ENV,
            reason: "token lifetime must be positive".to_string(),
        });
    }

    Ok(Duration::hours(hours))
}

/// Parse a base URL the gateway will call.
///
/// Scheme and host are required up front: a value `reqwest` cannot build a
/// request from must fail at startup, not degrade every request into a
/// per-request transport error.
fn parse_base_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidVar {
        var,
        reason: format!("{raw:?} is not a valid URL: {e}"),
    })?;

    if !url.has_host() {
        return Err(ConfigError::InvalidVar {
            var,
            reason: format!("{raw:?} has no host"),
        });
    }

    Ok(raw.trim().to_string())
}

/// Parse the validation timeout in milliseconds.
fn parse_timeout_ms(raw: &str) -> Result<StdDuration, ConfigError> {
    let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
        var: VALIDATE_TIMEOUT_MS_ENV,
        reason: format!("{raw:?} is not a number"),
    })?;

    if millis == 0 {
        return Err(ConfigError::InvalidVar {
            var: VALIDATE_TIMEOUT_MS_ENV,
            reason: "timeout must be positive".to_string(),
        });
    }

    Ok(StdDuration::from_millis(millis))
}

/// Parse `SEED_USER` records: `email:password:role`, comma-separated.
fn parse_seed_users(raw: &str) -> Result<Vec<UserRecord>, ConfigError> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let mut fields = entry.trim().splitn(3, ':');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(email), Some(password), Some(role))
                    if !email.is_empty() && !password.is_empty() && !role.is_empty() =>
                {
                    Ok(UserRecord {
                        email: email.to_string(),
                        password: password.to_string(),
                        role: role.to_string(),
                    })
                }
                _ => Err(ConfigError::InvalidVar {
                    var: SEED_USER_ENV,
                    reason: "expected email:password:role".to_string(),
                }),
            }
        })
        .collect()
}

/// Initialize tracing from `RUST_LOG` and `LOG_FORMAT`.
///
/// Secret material is never logged at any level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = env::var("LOG_FORMAT")
        .map(|format| format == "json")
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
