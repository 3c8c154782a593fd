//! Session service construction shared by every `idgate` subcommand that
//! touches tokens.
//!
//! Keys are read from the environment variables named in `[encryption]`
//! **once** here; nothing else in the process looks at them.

use std::sync::Arc;

use anyhow::Context;

use ig_domain::config::{Config, ConfigSeverity, EncryptionConfig};
use ig_domain::identity::NamedManager;
use ig_sessions::{
    AesGcmEncryptionManager, Envelope, HeaderCookieTransport, LifecycleManager, OsTokenGenerator,
    SessionKey,
};

/// Fully wired session services.
pub struct SessionServices {
    pub lifecycle: LifecycleManager,
    pub manager: Arc<NamedManager>,
}

/// Validate config, load keys and return ready-to-use [`SessionServices`].
pub fn build_session_services(config: &Config) -> anyhow::Result<SessionServices> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Encryption ───────────────────────────────────────────────────
    let encryption = load_encryption(&config.encryption).context("loading session keys")?;
    tracing::info!(
        key = encryption.primary_fingerprint(),
        retired = encryption.retired_count(),
        "session encryption ready"
    );

    // ── Identity manager ─────────────────────────────────────────────
    let manager = Arc::new(NamedManager::new(config.identity.manager_name.clone()));

    let lifecycle = LifecycleManager::new(
        &config.sessions,
        Envelope::new(Arc::new(encryption)),
        Arc::new(OsTokenGenerator),
        Arc::new(HeaderCookieTransport),
    );
    tracing::info!(
        cookie = lifecycle.cookie_name(),
        manager = %config.identity.manager_name,
        "session lifecycle ready"
    );

    Ok(SessionServices { lifecycle, manager })
}

/// Build the AES-GCM provider from the process environment.
pub fn load_encryption(cfg: &EncryptionConfig) -> anyhow::Result<AesGcmEncryptionManager> {
    load_encryption_with(cfg, |name| std::env::var(name).ok())
}

/// Build the AES-GCM provider, resolving env var names through `lookup`.
pub fn load_encryption_with(
    cfg: &EncryptionConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<AesGcmEncryptionManager> {
    let primary = lookup(&cfg.key_env)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| {
            format!(
                "{} is not set (generate a key with `idgate keygen`)",
                cfg.key_env
            )
        })?;
    let primary = SessionKey::from_base64(&primary)
        .with_context(|| format!("parsing {}", cfg.key_env))?;

    let retired = match lookup(&cfg.retired_keys_env) {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .enumerate()
            .map(|(i, k)| {
                SessionKey::from_base64(k)
                    .with_context(|| format!("parsing {}[{i}]", cfg.retired_keys_env))
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    if retired.contains(&primary) {
        tracing::warn!(
            key = %primary.fingerprint(),
            "primary session key is also listed as retired"
        );
    }

    Ok(AesGcmEncryptionManager::new(&primary, &retired))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ig_sessions::EncryptionManager;

    use super::*;

    fn env(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_primary_key_is_an_error() {
        let err = load_encryption_with(&EncryptionConfig::default(), env(&[])).unwrap_err();
        assert!(format!("{err:#}").contains("IG_SESSION_KEY is not set"));
    }

    #[test]
    fn malformed_primary_key_is_an_error() {
        let lookup = env(&[("IG_SESSION_KEY", "c2hvcnQ=".into())]);
        let err = load_encryption_with(&EncryptionConfig::default(), lookup).unwrap_err();
        assert!(format!("{err:#}").contains("parsing IG_SESSION_KEY"));
    }

    #[test]
    fn retired_keys_are_loaded() {
        let old_a = SessionKey::generate();
        let old_b = SessionKey::generate();
        let primary = SessionKey::generate();
        let lookup = env(&[
            ("IG_SESSION_KEY", primary.to_base64()),
            (
                "IG_SESSION_RETIRED_KEYS",
                format!(" {}, ,{} ", old_a.to_base64(), old_b.to_base64()),
            ),
        ]);
        let enc = load_encryption_with(&EncryptionConfig::default(), lookup).unwrap();
        assert_eq!(enc.retired_count(), 2);
        assert_eq!(enc.primary_fingerprint(), primary.fingerprint());

        let old = AesGcmEncryptionManager::new(&old_b, &[]);
        let ct = old.encrypt(b"still valid").unwrap();
        assert_eq!(enc.decrypt(&ct).unwrap(), b"still valid");
    }

    #[test]
    fn bad_retired_key_names_its_position() {
        let lookup = env(&[
            ("IG_SESSION_KEY", SessionKey::generate().to_base64()),
            ("IG_SESSION_RETIRED_KEYS", format!("{},nope", SessionKey::generate().to_base64())),
        ]);
        let err = load_encryption_with(&EncryptionConfig::default(), lookup).unwrap_err();
        assert!(format!("{err:#}").contains("IG_SESSION_RETIRED_KEYS[1]"));
    }

    #[test]
    fn invalid_config_refuses_to_boot() {
        let mut config = Config::default();
        config.sessions.id_bytes = 4;
        let err = build_session_services(&config).err().unwrap();
        assert!(err.to_string().contains("config validation failed"));
    }
}
