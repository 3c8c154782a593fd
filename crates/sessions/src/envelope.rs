//! Session envelope: codec + authenticated encryption + base64 text.
//!
//! `seal`: session -> binary record -> AEAD ciphertext -> base64 (standard
//! alphabet, padded).  `open` runs the same steps backwards and stops at the
//! first failure; plaintext is only inspected after the tag has verified.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::codec::{self, Session};
use crate::crypto::EncryptionManager;
use crate::error::Result;

/// Turns sessions into opaque tokens and back.
#[derive(Clone)]
pub struct Envelope {
    encryption: Arc<dyn EncryptionManager>,
}

impl Envelope {
    pub fn new(encryption: Arc<dyn EncryptionManager>) -> Self {
        Self { encryption }
    }

    /// Encode, encrypt and text-encode a session.
    pub fn seal(&self, session: &Session) -> Result<String> {
        let raw = codec::encode(session)?;
        let ciphertext = self.encryption.encrypt(&raw)?;
        Ok(STANDARD.encode(ciphertext))
    }

    /// Reverse [`seal`](Self::seal).
    pub fn open(&self, token: &str) -> Result<Session> {
        let ciphertext = STANDARD.decode(token)?;
        let raw = self.encryption.decrypt(&ciphertext)?;
        codec::decode(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SESSION_VERSION;
    use crate::crypto::{AesGcmEncryptionManager, SessionKey};
    use crate::error::SessionError;

    fn envelope() -> Envelope {
        Envelope::new(Arc::new(AesGcmEncryptionManager::new(
            &SessionKey::generate(),
            &[],
        )))
    }

    fn session() -> Session {
        Session {
            version: SESSION_VERSION,
            id: "id-1".into(),
            subject: "alice".into(),
            provider: "ldap".into(),
        }
    }

    /// Provider that refuses to work, as with an unavailable key.
    struct Unavailable;

    impl EncryptionManager for Unavailable {
        fn encrypt(&self, _: &[u8]) -> Result<Vec<u8>> {
            Err(SessionError::Encryption("key unavailable".into()))
        }
        fn decrypt(&self, _: &[u8]) -> Result<Vec<u8>> {
            Err(SessionError::Decryption)
        }
    }

    /// Provider that "authenticates" anything, to reach the codec step.
    struct Passthrough;

    impl EncryptionManager for Passthrough {
        fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
            Ok(plaintext.to_vec())
        }
        fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
            Ok(ciphertext.to_vec())
        }
    }

    #[test]
    fn seal_then_open() {
        let env = envelope();
        let token = env.seal(&session()).unwrap();
        assert_eq!(env.open(&token).unwrap(), session());
    }

    #[test]
    fn token_is_standard_base64() {
        let token = envelope().seal(&session()).unwrap();
        assert!(STANDARD.decode(&token).is_ok());
        assert!(!token.contains('\n'));
    }

    #[test]
    fn bad_base64_is_text_decoding_error() {
        let err = envelope().open("%%% not a token %%%").unwrap_err();
        assert!(matches!(err, SessionError::TextDecoding(_)));
    }

    #[test]
    fn empty_token_fails_authentication() {
        let err = envelope().open("").unwrap_err();
        assert!(matches!(err, SessionError::Decryption));
    }

    #[test]
    fn token_from_other_key_fails_authentication() {
        let token = envelope().seal(&session()).unwrap();
        let err = envelope().open(&token).unwrap_err();
        assert!(matches!(err, SessionError::Decryption));
    }

    #[test]
    fn every_bit_flip_is_detected() {
        let env = envelope();
        let token = env.seal(&session()).unwrap();
        let ciphertext = STANDARD.decode(&token).unwrap();

        for byte in 0..ciphertext.len() {
            for bit in 0..8 {
                let mut forged = ciphertext.clone();
                forged[byte] ^= 1 << bit;
                let err = env.open(&STANDARD.encode(&forged)).unwrap_err();
                assert!(
                    matches!(err, SessionError::Decryption),
                    "byte {byte} bit {bit}: {err}"
                );
            }
        }
    }

    #[test]
    fn every_bit_flip_in_token_text_is_rejected() {
        let env = envelope();
        let token = env.seal(&session()).unwrap();

        // Bits 0..7 keep every byte ASCII, so the forgery stays a &str.
        for i in 0..token.len() {
            for bit in 0..7 {
                let mut forged = token.clone().into_bytes();
                forged[i] ^= 1 << bit;
                let forged = String::from_utf8(forged).unwrap();
                let err = env.open(&forged).unwrap_err();
                assert!(
                    matches!(err, SessionError::TextDecoding(_) | SessionError::Decryption),
                    "char {i} bit {bit}: {err}"
                );
            }
        }
    }

    #[test]
    fn provider_failure_is_encryption_error() {
        let env = Envelope::new(Arc::new(Unavailable));
        let err = env.seal(&session()).unwrap_err();
        assert!(matches!(err, SessionError::Encryption(_)));
    }

    #[test]
    fn authenticated_garbage_is_structural_error() {
        let env = Envelope::new(Arc::new(Passthrough));
        let err = env.open(&STANDARD.encode(b"\x02\x00")).unwrap_err();
        assert!(matches!(err, SessionError::StructuralDecode(_)));
    }
}
