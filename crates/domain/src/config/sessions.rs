use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions & session cookie
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Smallest accepted amount of randomness behind a session ID.
pub const MIN_SESSION_ID_BYTES: usize = 32;

/// Session minting and transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Random bytes behind each minted session ID.  Values below
    /// [`MIN_SESSION_ID_BYTES`] fail validation.
    #[serde(default = "d_id_bytes")]
    pub id_bytes: usize,

    /// Attributes of the cookie carrying the sealed session.
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            id_bytes: d_id_bytes(),
            cookie: CookieConfig::default(),
        }
    }
}

/// Session cookie attributes.  The defaults produce a host-only browser
/// session cookie that is `Secure`, `HttpOnly` and `SameSite=Lax`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    #[serde(default = "d_cookie_name")]
    pub name: String,

    #[serde(default = "d_cookie_path")]
    pub path: String,

    /// `Domain` attribute.  `None` keeps the cookie host-only.
    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default = "d_true")]
    pub secure: bool,

    #[serde(default = "d_true")]
    pub http_only: bool,

    #[serde(default = "d_same_site", with = "same_site_serde")]
    pub same_site: SameSite,

    /// `Max-Age` in seconds.  `None` makes it a browser session cookie that
    /// disappears when the browser closes.
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: d_cookie_name(),
            path: d_cookie_path(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            max_age_secs: None,
        }
    }
}

/// `SameSite` cookie attribute, written in config as `"strict"`, `"lax"` or
/// `"none"`.  `None` is only honoured by browsers together with `Secure`.
pub use cookie::SameSite;

mod same_site_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::SameSite;

    pub fn serialize<S: Serializer>(value: &SameSite, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string().to_ascii_lowercase())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SameSite, D::Error> {
        let raw = String::deserialize(d)?;
        match raw.as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(de::Error::unknown_variant(other, &["strict", "lax", "none"])),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_id_bytes() -> usize {
    MIN_SESSION_ID_BYTES
}
fn d_cookie_name() -> String {
    "__Secure-IGS".into()
}
fn d_cookie_path() -> String {
    "/".into()
}
fn d_same_site() -> SameSite {
    SameSite::Lax
}
fn d_true() -> bool {
    true
}
