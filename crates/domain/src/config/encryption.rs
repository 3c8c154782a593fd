use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session encryption keys
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the session encryption keys come from.
///
/// Keys are never stored in the config file itself: each field names an
/// environment variable that is read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionConfig {
    /// Env var holding the primary key (base64, 32 bytes).  All new tokens
    /// are sealed with it.
    #[serde(default = "d_key_env")]
    pub key_env: String,

    /// Env var holding comma-separated retired keys.  They only decrypt, so
    /// tokens issued before a rotation keep opening until they are reminted.
    #[serde(default = "d_retired_keys_env")]
    pub retired_keys_env: String,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            key_env: d_key_env(),
            retired_keys_env: d_retired_keys_env(),
        }
    }
}

fn d_key_env() -> String {
    "IG_SESSION_KEY".into()
}
fn d_retired_keys_env() -> String {
    "IG_SESSION_RETIRED_KEYS".into()
}
