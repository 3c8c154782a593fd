//! Random session identifiers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Source of high-entropy text tokens.
pub trait TokenGenerator: Send + Sync {
    /// Return `byte_len` random bytes in a text-safe encoding.
    fn generate(&self, byte_len: usize) -> String;
}

/// [`TokenGenerator`] backed by the operating system CSPRNG.  Output is
/// URL-safe base64 without padding (43 characters for 32 bytes).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenGenerator;

impl TokenGenerator for OsTokenGenerator {
    fn generate(&self, byte_len: usize) -> String {
        let mut bytes = vec![0u8; byte_len];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
