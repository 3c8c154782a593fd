//! Property tests for the codec and the sealed envelope.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use proptest::prelude::*;

use ig_sessions::{codec, AesGcmEncryptionManager, Envelope, Session, SessionError, SessionKey};

fn any_session() -> impl Strategy<Value = Session> {
    (any::<u32>(), "[A-Za-z0-9_-]{1,64}", "\\PC{0,128}", "[a-z]{1,16}").prop_map(
        |(version, id, subject, provider)| Session {
            version,
            id,
            subject,
            provider,
        },
    )
}

fn envelope() -> Envelope {
    Envelope::new(Arc::new(AesGcmEncryptionManager::new(&SessionKey::generate(), &[])))
}

proptest! {
    #[test]
    fn codec_is_lossless(session in any_session()) {
        let raw = codec::encode(&session).unwrap();
        prop_assert_eq!(codec::decode(&raw).unwrap(), session);
    }

    #[test]
    fn envelope_is_lossless(session in any_session()) {
        let env = envelope();
        let token = env.seal(&session).unwrap();
        prop_assert_eq!(env.open(&token).unwrap(), session);
    }

    #[test]
    fn flipped_bit_never_opens(session in any_session(), pick in any::<prop::sample::Index>(), bit in 0u8..8) {
        let env = envelope();
        let mut ciphertext = STANDARD.decode(env.seal(&session).unwrap()).unwrap();
        let i = pick.index(ciphertext.len());
        ciphertext[i] ^= 1 << bit;
        let result = env.open(&STANDARD.encode(&ciphertext));
        prop_assert!(matches!(result, Err(SessionError::Decryption)));
    }

    #[test]
    fn flipped_text_bit_never_opens(session in any_session(), pick in any::<prop::sample::Index>(), bit in 0u8..7) {
        let env = envelope();
        let mut text = env.seal(&session).unwrap().into_bytes();
        let i = pick.index(text.len());
        text[i] ^= 1 << bit;
        let forged = String::from_utf8(text).unwrap();
        let result = env.open(&forged);
        prop_assert!(
            matches!(result, Err(SessionError::TextDecoding(_)) | Err(SessionError::Decryption)),
            "unexpected result {:?}",
            result
        );
    }
}
