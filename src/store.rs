// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Patientgate Contributors

//! Credential store behind the token issuer.
//!
//! The platform's user administration lives elsewhere; this subsystem only
//! needs something that can be asked to authenticate an email/password pair.
//! The in-memory implementation is seeded from `SEED_USER` at startup.
//! Password hashing schemes are deliberately out of scope here.

use std::collections::HashMap;

/// A stored credential record.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub email: String,
    pub password: String,
    /// Opaque role string, carried into issued tokens verbatim.
    pub role: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Passwords stay out of logs and panic messages.
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Anything that can authenticate an email/password pair.
pub trait CredentialStore: Send + Sync {
    /// Return the matching record, or `None` for both an unknown email and
    /// a password mismatch. Callers must not be able to tell the two apart.
    fn authenticate(&self, email: &str, password: &str) -> Option<UserRecord>;
}

/// In-memory credential store keyed by email.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, UserRecord>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&mut self, record: UserRecord) {
        self.users.insert(record.email.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn authenticate(&self, email: &str, password: &str) -> Option<UserRecord> {
        self.users
            .get(email)
            .filter(|record| record.password == password)
            .cloned()
    }
}
