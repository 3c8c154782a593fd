//! Binary session record.
//!
//! Layout (bincode, fixed-width little-endian integers, length-prefixed
//! strings): `version: u32 | id | subject | provider`.  The version tag
//! always comes first so a record written by another layout still reports
//! its own tag instead of passing for a current session.  Bumping
//! [`SESSION_VERSION`] is the only sanctioned way to change the layout.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Record layout version written by this build.
pub const SESSION_VERSION: u32 = 2;

/// Upper bound for an encoded record, enforced on both encode and decode.
/// Sealing adds a nonce, a tag and base64 on top, so a record near this size
/// no longer fits in a cookie; the transport refuses those separately
/// (see [`MAX_COOKIE_BYTES`](crate::cookie::MAX_COOKIE_BYTES)).
pub const MAX_RECORD_BYTES: u64 = 4096;

/// A client-held authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub version: u32,
    pub id: String,
    pub subject: String,
    pub provider: String,
}

impl Session {
    /// Whether the record was written with the layout this build understands.
    pub fn is_current(&self) -> bool {
        self.version == SESSION_VERSION
    }
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_RECORD_BYTES)
        .reject_trailing_bytes()
}

/// Encode a session into its versioned binary record.
pub fn encode(session: &Session) -> Result<Vec<u8>> {
    options()
        .serialize(session)
        .map_err(|e| SessionError::Encoding(e.to_string()))
}

/// Decode a binary record.  Only structure is checked here; callers decide
/// whether the version is acceptable.
pub fn decode(raw: &[u8]) -> Result<Session> {
    options()
        .deserialize(raw)
        .map_err(|e| SessionError::StructuralDecode(e.to_string()))
}
