//! Authenticated encryption for session tokens.
//!
//! [`EncryptionManager`] is the seam the envelope depends on.  The shipped
//! implementation is AES-256-GCM with a random 96-bit nonce prepended to
//! every ciphertext (`nonce || ciphertext || tag`).  One primary key
//! encrypts; retired keys are only tried on decrypt so a key rotation does
//! not invalidate every live session at once.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

use ig_domain::error::Error;

use crate::error::{Result, SessionError};

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Encrypts and decrypts opaque payloads with integrity protection.
///
/// `decrypt` must return [`SessionError::Decryption`] on any authentication
/// failure and must never hand back unauthenticated plaintext.
pub trait EncryptionManager: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Key material
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A 256-bit session encryption key.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; KEY_LEN]);

impl SessionKey {
    /// Parse a base64 (standard alphabet) encoded 32-byte key.
    pub fn from_base64(encoded: &str) -> ig_domain::error::Result<Self> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Key(format!("key is not valid base64: {e}")))?;
        let bytes: [u8; KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            Error::Key(format!("key must be {KEY_LEN} bytes, got {}", raw.len()))
        })?;
        Ok(Self(bytes))
    }

    /// Fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Non-secret short identifier for logs: hex of the first 4 bytes of
    /// SHA-256 over the key.
    pub fn fingerprint(&self) -> String {
        hex::encode(&Sha256::digest(self.0)[..4])
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionKey({})", self.fingerprint())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AES-256-GCM provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// AES-256-GCM [`EncryptionManager`] with decrypt-only retired keys.
pub struct AesGcmEncryptionManager {
    primary: Aes256Gcm,
    retired: Vec<Aes256Gcm>,
    fingerprint: String,
}

impl AesGcmEncryptionManager {
    pub fn new(primary: &SessionKey, retired: &[SessionKey]) -> Self {
        Self {
            primary: cipher(primary),
            retired: retired.iter().map(cipher).collect(),
            fingerprint: primary.fingerprint(),
        }
    }

    /// Fingerprint of the key new tokens are sealed with.
    pub fn primary_fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }
}

impl fmt::Debug for AesGcmEncryptionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmEncryptionManager")
            .field("primary", &self.fingerprint)
            .field("retired", &self.retired.len())
            .finish()
    }
}

fn cipher(key: &SessionKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key.0))
}

impl EncryptionManager for AesGcmEncryptionManager {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce);

        let sealed = self
            .primary
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| SessionError::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN + TAG_LEN {
            return Err(SessionError::Decryption);
        }
        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce);

        std::iter::once(&self.primary)
            .chain(self.retired.iter())
            .find_map(|c| c.decrypt(nonce, sealed).ok())
            .ok_or(SessionError::Decryption)
    }
}
