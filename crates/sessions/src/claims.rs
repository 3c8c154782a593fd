//! User ID and session reference from verified bearer claims.
//!
//! A session ref lets separately issued tokens (ID token, access token,
//! refresh token) be recognised as one logical session without any server
//! side lookup.  It is a pure function of the identity manager name, the
//! token audience and the resolved user value.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use ig_domain::identity::{
    IdentityClaims, IdentityManager, StandardClaims, IDENTIFIED_USER_CLAIM,
    IDENTIFIED_USER_ID_CLAIM,
};
use ig_domain::trace::TraceEvent;

/// Derive a session ref.  Each field is length-prefixed before hashing so
/// no two distinct `(label, audience, user)` triples share an input.
pub fn derive_session_ref(label: &str, audience: &str, user: &str) -> String {
    let mut hasher = Sha256::new();
    for field in [label, audience, user] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Resolves `(user_id, session_ref)` pairs for one identity manager.
#[derive(Clone)]
pub struct ClaimsResolver {
    manager: Arc<dyn IdentityManager>,
}

impl ClaimsResolver {
    pub fn new(manager: Arc<dyn IdentityManager>) -> Self {
        Self { manager }
    }

    /// Returns the user ID claim and, when one is set, a session ref.
    ///
    /// The backend-specific user claim is preferred for the ref; without it
    /// the user ID stands in.
    pub fn resolve(
        &self,
        claims: Option<&StandardClaims>,
        identity: Option<&IdentityClaims>,
    ) -> (String, Option<String>) {
        let (claims, identity) = match (claims, identity) {
            (Some(c), Some(i)) => (c, i),
            _ => return (String::new(), None),
        };

        let user_id = string_claim(identity, IDENTIFIED_USER_ID_CLAIM);
        if user_id.is_empty() {
            return (user_id.to_owned(), None);
        }

        let user = string_claim(identity, IDENTIFIED_USER_CLAIM);
        let fallback = user.is_empty();
        let user = if fallback { user_id } else { user };

        let session_ref = derive_session_ref(self.manager.name(), &claims.audience, user);

        TraceEvent::SessionRefDerived {
            manager: self.manager.name().to_owned(),
            audience: claims.audience.clone(),
            fallback_to_user_id: fallback,
        }
        .emit();

        (user_id.to_owned(), Some(session_ref))
    }
}

/// A string-valued claim, or `""` when missing or not a string.
fn string_claim<'a>(identity: &'a IdentityClaims, key: &str) -> &'a str {
    identity
        .get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
}
