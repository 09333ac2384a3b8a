//! Credential store.
//!
//! Maps an email to a secret, role and display name. Read-only after
//! construction. Callers depend on [`CredentialStore`] only, so a store with
//! hashed secrets or an external identity provider can replace
//! [`StaticCredentialStore`] without touching token issuance or the guard.

use crate::models::{Identity, Role};
use common::secret::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use subtle::ConstantTimeEq;

/// Credential lookup used by the login flow.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Check `password` for `email`.
    ///
    /// Returns `None` for an unknown email and for a wrong password alike.
    async fn verify(&self, email: &str, password: &str) -> Option<Identity>;
}

/// Credential record (plaintext secret, demonstration only).
#[derive(Clone)]
pub struct CredentialRecord {
    pub password: SecretString,
    pub role: Role,
    pub name: String,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .field("name", &self.name)
            .finish()
    }
}

/// In-memory credential store seeded at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    records: HashMap<String, CredentialRecord>,
}

/// Compared against when the email is unknown so both paths do the same work.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

impl StaticCredentialStore {
    pub fn new(records: impl IntoIterator<Item = (String, CredentialRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// The demonstration accounts the service starts with.
    pub fn seeded() -> Self {
        Self::new([
            (
                "admin@example.com".to_string(),
                CredentialRecord {
                    password: SecretString::from("secret"),
                    role: Role::Admin,
                    name: "Admin".to_string(),
                },
            ),
            (
                "user@example.com".to_string(),
                CredentialRecord {
                    password: SecretString::from("secret"),
                    role: Role::User,
                    name: "User One".to_string(),
                },
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn verify(&self, email: &str, password: &str) -> Option<Identity> {
        let record = self.records.get(email);

        let expected = record
            .map(|r| r.password.expose_secret())
            .unwrap_or(DUMMY_PASSWORD);
        let matches = digests_equal(expected, password);

        match record {
            Some(r) if matches => Some(Identity {
                email: email.to_string(),
                role: r.role,
                name: r.name.clone(),
            }),
            _ => None,
        }
    }
}

/// Constant-time comparison of SHA-256 digests; inputs of any length hash to
/// equal-size values.
fn digests_equal(expected: &str, provided: &str) -> bool {
    let a = Sha256::digest(expected.as_bytes());
    let b = Sha256::digest(provided.as_bytes());
    a.as_slice().ct_eq(b.as_slice()).into()
}
