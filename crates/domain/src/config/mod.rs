mod encryption;
mod observability;
mod sessions;

pub use encryption::*;
pub use observability::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub encryption: EncryptionConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Identity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Name of the identity manager this deployment authenticates against.
    /// It is stamped into minted sessions and mixed into session refs.
    #[serde(default = "d_manager_name")]
    pub manager_name: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            manager_name: d_manager_name(),
        }
    }
}

fn d_manager_name() -> String {
    "identifier".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |severity, field: &str, message: &str| {
            errors.push(ConfigError {
                severity,
                field: field.into(),
                message: message.into(),
            });
        };

        if self.sessions.id_bytes < MIN_SESSION_ID_BYTES {
            push(
                ConfigSeverity::Error,
                "sessions.id_bytes",
                &format!("must be at least {MIN_SESSION_ID_BYTES}"),
            );
        }

        let cookie = &self.sessions.cookie;
        if cookie.name.is_empty() {
            push(
                ConfigSeverity::Error,
                "sessions.cookie.name",
                "cookie name must not be empty",
            );
        } else if !is_cookie_token(&cookie.name) {
            push(
                ConfigSeverity::Error,
                "sessions.cookie.name",
                "cookie name contains separators, whitespace or control characters",
            );
        }

        if !cookie.path.starts_with('/') {
            push(
                ConfigSeverity::Error,
                "sessions.cookie.path",
                "path must start with '/'",
            );
        } else if !is_attribute_value(&cookie.path) {
            push(
                ConfigSeverity::Error,
                "sessions.cookie.path",
                "path contains ';', whitespace or control characters",
            );
        }
        if let Some(domain) = &cookie.domain {
            if domain.is_empty() || !is_attribute_value(domain) {
                push(
                    ConfigSeverity::Error,
                    "sessions.cookie.domain",
                    "domain must be non-empty without ';', whitespace or control characters",
                );
            }
        }

        // Browsers drop prefixed cookies that break the prefix rules.
        if cookie.name.starts_with("__Secure-") && !cookie.secure {
            push(
                ConfigSeverity::Error,
                "sessions.cookie.secure",
                "__Secure- cookies must set secure = true",
            );
        }
        if cookie.name.starts_with("__Host-")
            && (!cookie.secure || cookie.path != "/" || cookie.domain.is_some())
        {
            push(
                ConfigSeverity::Error,
                "sessions.cookie.name",
                "__Host- cookies require secure = true, path = \"/\" and no domain",
            );
        }

        if cookie.same_site == SameSite::None && !cookie.secure {
            push(
                ConfigSeverity::Error,
                "sessions.cookie.same_site",
                "same_site = \"none\" requires secure = true",
            );
        }

        if !cookie.secure && !cookie.name.starts_with("__Secure-") {
            push(
                ConfigSeverity::Warning,
                "sessions.cookie.secure",
                "session cookie will be sent over plain HTTP",
            );
        }
        if !cookie.http_only {
            push(
                ConfigSeverity::Warning,
                "sessions.cookie.http_only",
                "session cookie is readable from scripts",
            );
        }
        if cookie.max_age_secs == Some(0) {
            push(
                ConfigSeverity::Warning,
                "sessions.cookie.max_age_secs",
                "max_age_secs = 0 expires the cookie immediately",
            );
        }

        if self.encryption.key_env.is_empty() {
            push(
                ConfigSeverity::Error,
                "encryption.key_env",
                "key_env must not be empty",
            );
        }
        if self.encryption.key_env == self.encryption.retired_keys_env {
            push(
                ConfigSeverity::Error,
                "encryption.retired_keys_env",
                "retired keys must come from a different env var than the primary key",
            );
        }

        if self.identity.manager_name.is_empty() {
            push(
                ConfigSeverity::Error,
                "identity.manager_name",
                "manager_name must not be empty",
            );
        }

        errors
    }
}

/// RFC 6265 cookie-name check (an HTTP token).
fn is_cookie_token(name: &str) -> bool {
    name.bytes().all(|b| {
        b.is_ascii_graphic()
            && !matches!(
                b,
                b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/'
                    | b'[' | b']' | b'?' | b'=' | b'{' | b'}'
            )
    })
}

/// Value of a `Path` or `Domain` attribute: visible ASCII other than `;`.
fn is_attribute_value(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_graphic() && b != b';')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(cfg: &Config) -> Vec<String> {
        cfg.validate().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn default_config_is_clean() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn short_id_rejected() {
        let mut cfg = Config::default();
        cfg.sessions.id_bytes = 16;
        let issues = cfg.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Error);
        assert_eq!(issues[0].field, "sessions.id_bytes");
    }

    #[test]
    fn cookie_name_with_separator_rejected() {
        let mut cfg = Config::default();
        cfg.sessions.cookie.name = "bad;name".into();
        assert!(fields(&cfg).contains(&"sessions.cookie.name".to_string()));
    }

    #[test]
    fn attribute_injection_rejected() {
        let mut cfg = Config::default();
        cfg.sessions.cookie.path = "/; Domain=evil.example".into();
        cfg.sessions.cookie.domain = Some("idp.example; SameSite=None".into());
        let issues = cfg.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|e| e.severity == ConfigSeverity::Error));
        assert_eq!(
            fields(&cfg),
            vec!["sessions.cookie.path", "sessions.cookie.domain"]
        );
    }

    #[test]
    fn whitespace_in_domain_rejected() {
        let mut cfg = Config::default();
        cfg.sessions.cookie.domain = Some("idp example".into());
        assert_eq!(fields(&cfg), vec!["sessions.cookie.domain"]);
        cfg.sessions.cookie.domain = Some(String::new());
        assert_eq!(fields(&cfg), vec!["sessions.cookie.domain"]);
        cfg.sessions.cookie.domain = Some("idp.example.com".into());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn secure_prefix_requires_secure() {
        let mut cfg = Config::default();
        cfg.sessions.cookie.secure = false;
        let issues = cfg.validate();
        assert!(issues
            .iter()
            .any(|e| e.severity == ConfigSeverity::Error && e.field == "sessions.cookie.secure"));
    }

    #[test]
    fn insecure_plain_cookie_only_warns() {
        let mut cfg = Config::default();
        cfg.sessions.cookie.name = "igs".into();
        cfg.sessions.cookie.secure = false;
        let issues = cfg.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    }

    #[test]
    fn same_site_none_needs_secure() {
        let mut cfg = Config::default();
        cfg.sessions.cookie.name = "igs".into();
        cfg.sessions.cookie.secure = false;
        cfg.sessions.cookie.same_site = SameSite::None;
        assert!(fields(&cfg).contains(&"sessions.cookie.same_site".to_string()));
    }

    #[test]
    fn host_prefix_rejects_domain() {
        let mut cfg = Config::default();
        cfg.sessions.cookie.name = "__Host-igs".into();
        cfg.sessions.cookie.domain = Some("example.com".into());
        assert!(fields(&cfg).contains(&"sessions.cookie.name".to_string()));
    }

    #[test]
    fn shared_key_env_rejected() {
        let mut cfg = Config::default();
        cfg.encryption.retired_keys_env = cfg.encryption.key_env.clone();
        assert_eq!(fields(&cfg), vec!["encryption.retired_keys_env".to_string()]);
    }

    #[test]
    fn config_error_display() {
        let e = ConfigError {
            severity: ConfigSeverity::Warning,
            field: "sessions.cookie.http_only".into(),
            message: "session cookie is readable from scripts".into(),
        };
        assert_eq!(
            e.to_string(),
            "[WARN] sessions.cookie.http_only: session cookie is readable from scripts"
        );
    }
}
