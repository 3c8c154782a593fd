//! `idgate session ...` subcommands.

use std::sync::Arc;

use anyhow::Context;
use http::header::SET_COOKIE;
use http::HeaderMap;

use ig_domain::config::Config;
use ig_domain::identity::{
    AuthenticatedUser, IdentityClaims, NamedManager, StandardClaims, IDENTIFIED_USER_CLAIM,
    IDENTIFIED_USER_ID_CLAIM,
};
use ig_sessions::ClaimsResolver;

use crate::bootstrap::SessionServices;

/// Mint a new session for `subject` and print it plus the `Set-Cookie`
/// header a server would send.
pub fn mint(services: &SessionServices, subject: &str, provider: Option<&str>) -> anyhow::Result<()> {
    let manager = match provider {
        Some(name) => NamedManager::new(name),
        None => services.manager.as_ref().clone(),
    };
    let auth = AuthenticatedUser::new(subject, manager);

    let mut response = HeaderMap::new();
    let (session, outcome) = services
        .lifecycle
        .update_or_create(&mut response, None, &auth);
    outcome.context("persisting minted session")?;

    println!("{}", serde_json::to_string_pretty(&session)?);
    for value in response.get_all(SET_COOKIE) {
        println!("Set-Cookie: {}", value.to_str()?);
    }
    Ok(())
}

/// Open a token and print the session.  Returns `false` when the session
/// decrypts but carries a foreign record version.
pub fn open(services: &SessionServices, token: &str) -> anyhow::Result<bool> {
    let session = services
        .lifecycle
        .envelope()
        .open(token.trim())
        .context("opening session token")?;

    println!("{}", serde_json::to_string_pretty(&session)?);
    if !session.is_current() {
        eprintln!(
            "warning: record version {} is not current ({}); it would be reminted",
            session.version,
            ig_sessions::SESSION_VERSION
        );
    }
    Ok(session.is_current())
}

/// Derive `(user_id, session_ref)` the way bearer requests are correlated.
/// Needs no key material.
pub fn session_ref(
    config: &Config,
    audience: &str,
    user_id: &str,
    user: Option<&str>,
) -> anyhow::Result<()> {
    let claims = StandardClaims {
        audience: audience.to_owned(),
        ..Default::default()
    };
    let mut identity = IdentityClaims::new();
    identity.insert(IDENTIFIED_USER_ID_CLAIM.into(), user_id.into());
    if let Some(user) = user {
        identity.insert(IDENTIFIED_USER_CLAIM.into(), user.into());
    }

    let resolver = ClaimsResolver::new(Arc::new(NamedManager::new(
        config.identity.manager_name.clone(),
    )));
    let (user_id, session_ref) = resolver.resolve(Some(&claims), Some(&identity));

    let out = serde_json::json!({
        "manager": config.identity.manager_name,
        "user_id": user_id,
        "session_ref": session_ref,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
