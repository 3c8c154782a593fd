//! Identity collaborators consumed by the session core.
//!
//! An [`IdentityManager`] is a named authentication backend; an
//! [`AuthRecord`] is the result of one successful authentication against it.
//! Bearer claims arrive already verified as [`StandardClaims`] plus a loose
//! [`IdentityClaims`] map.

use serde::{Deserialize, Serialize};

/// Claim key holding the backend's identifier for the authenticated user.
pub const IDENTIFIED_USER_ID_CLAIM: &str = "ig.i.id";

/// Claim key holding the backend-specific user name, when the backend sets one.
pub const IDENTIFIED_USER_CLAIM: &str = "ig.i.un";

/// A named identity backend (LDAP, cookie passthrough, guest, ...).
pub trait IdentityManager: Send + Sync {
    fn name(&self) -> &str;
}

/// The outcome of a successful authentication.
pub trait AuthRecord: Send + Sync {
    /// Stable identifier of the authenticated principal.
    fn subject(&self) -> &str;

    /// The backend that authenticated [`subject`](Self::subject).
    fn manager(&self) -> &dyn IdentityManager;
}

/// An identity manager that is nothing more than its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedManager {
    name: String,
}

impl NamedManager {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl IdentityManager for NamedManager {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A plain authenticated subject paired with the manager that vouched for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    subject: String,
    manager: NamedManager,
}

impl AuthenticatedUser {
    pub fn new(subject: impl Into<String>, manager: NamedManager) -> Self {
        Self {
            subject: subject.into(),
            manager,
        }
    }
}

impl AuthRecord for AuthenticatedUser {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn manager(&self) -> &dyn IdentityManager {
        &self.manager
    }
}

/// Registered JWT claims, as produced by the verification pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardClaims {
    #[serde(rename = "aud", default)]
    pub audience: String,
    #[serde(rename = "iss", default)]
    pub issuer: String,
    #[serde(rename = "sub", default)]
    pub subject: String,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
}

/// Free-form identity claims keyed by claim name.
pub type IdentityClaims = serde_json::Map<String, serde_json::Value>;
