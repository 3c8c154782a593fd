//! Client-held authenticated sessions for IdGate.
//!
//! A [`Session`] binds a random session ID to an authenticated subject and
//! the identity manager that produced it.  The server keeps no copy: the
//! session travels as an AES-GCM sealed, base64 encoded cookie value and is
//! reopened and re-validated on every request.  Bearer tokens are correlated
//! to a logical session through a derived session ref instead.

pub mod claims;
pub mod codec;
pub mod cookie;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod lifecycle;
pub mod random;

pub use claims::{derive_session_ref, ClaimsResolver};
pub use codec::{Session, SESSION_VERSION};
pub use self::cookie::{
    CookieAttributes, CookieTransport, HeaderCookieTransport, MAX_COOKIE_BYTES,
};
pub use crypto::{AesGcmEncryptionManager, EncryptionManager, SessionKey};
pub use envelope::Envelope;
pub use error::SessionError;
pub use lifecycle::{LifecycleManager, MintReason, SessionUpdate, SideEffect};
pub use random::{OsTokenGenerator, TokenGenerator};
