/// Failures while sealing, opening or transporting a session token.
///
/// "No session cookie" is not represented here; it is `Ok(None)` from
/// [`LifecycleManager::get_session`](crate::LifecycleManager::get_session).
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// The session could not be turned into bytes.
    #[error("encoding session: {0}")]
    Encoding(String),

    /// Decrypted bytes are not a well-formed session record.
    #[error("malformed session record: {0}")]
    StructuralDecode(String),

    /// The token text is not valid base64.
    #[error("session token is not valid base64: {0}")]
    TextDecoding(#[from] base64::DecodeError),

    #[error("encrypting session: {0}")]
    Encryption(String),

    /// Authentication tag mismatch, truncated or foreign ciphertext.
    #[error("session token failed authentication")]
    Decryption,

    #[error("reading session cookie: {0}")]
    CookieRead(String),

    #[error("writing session cookie: {0}")]
    CookieWrite(String),
}

impl SessionError {
    /// Short machine-readable name, used in trace events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "encoding",
            Self::StructuralDecode(_) => "structural_decode",
            Self::TextDecoding(_) => "text_decoding",
            Self::Encryption(_) => "encryption",
            Self::Decryption => "decryption",
            Self::CookieRead(_) => "cookie_read",
            Self::CookieWrite(_) => "cookie_write",
        }
    }

    /// Whether the failure points at a forged or corrupted token rather than
    /// a local fault.
    pub fn is_tampering(&self) -> bool {
        matches!(
            self,
            Self::Decryption | Self::TextDecoding(_) | Self::StructuralDecode(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
