//! Session lifecycle: reuse the session a request already carries, or mint
//! a new one bound to the freshly authenticated subject.
//!
//! A carried session is reused only when it was written with the current
//! record version and belongs to the same subject.  Anything else mints a new
//! session with a fresh random ID.  Minting never fails as such: the new
//! session value is always returned, and sealing or cookie failures are
//! reported separately so the caller can decide whether to continue without
//! a persisted session.

use std::fmt;
use std::sync::Arc;

use http::HeaderMap;

use ig_domain::config::{SessionsConfig, MIN_SESSION_ID_BYTES};
use ig_domain::identity::AuthRecord;
use ig_domain::trace::TraceEvent;

use crate::codec::{Session, SESSION_VERSION};
use crate::cookie::{CookieAttributes, CookieTransport};
use crate::envelope::Envelope;
use crate::error::{Result, SessionError};
use crate::random::TokenGenerator;

/// Why a new session was minted instead of reusing the carried one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintReason {
    NoSession,
    StaleVersion { found: u32 },
    SubjectChanged,
}

impl fmt::Display for MintReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => write!(f, "no session"),
            Self::StaleVersion { found } => {
                write!(f, "stale version (found={found}, current={SESSION_VERSION})")
            }
            Self::SubjectChanged => write!(f, "subject changed"),
        }
    }
}

/// What has to happen on the response after resolving a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    None,
    /// Write this sealed token as the session cookie.
    WriteCookie(String),
}

/// Result of [`LifecycleManager::resolve_or_mint`].
#[derive(Debug)]
pub struct SessionUpdate {
    pub session: Session,
    /// `Some` when `session` was minted by this call.
    pub minted: Option<MintReason>,
    /// Sealing outcome.  An error here never invalidates `session`.
    pub effect: Result<SideEffect>,
}

impl SessionUpdate {
    pub fn is_new(&self) -> bool {
        self.minted.is_some()
    }
}

/// Decide whether `existing` can serve the authenticated subject.  Returns
/// `Some(reason)` if a new session is needed.
pub fn should_mint(existing: Option<&Session>, auth: &dyn AuthRecord) -> Option<MintReason> {
    let session = match existing {
        Some(s) => s,
        None => return Some(MintReason::NoSession),
    };
    if !session.is_current() {
        return Some(MintReason::StaleVersion {
            found: session.version,
        });
    }
    if session.subject != auth.subject() {
        return Some(MintReason::SubjectChanged);
    }
    None
}

/// Resolves, mints and persists client-held sessions.
///
/// Holds no per-request state; one instance is shared by all requests.
pub struct LifecycleManager {
    envelope: Envelope,
    tokens: Arc<dyn TokenGenerator>,
    cookies: Arc<dyn CookieTransport>,
    cookie_name: String,
    cookie_attrs: CookieAttributes,
    id_bytes: usize,
}

impl LifecycleManager {
    pub fn new(
        config: &SessionsConfig,
        envelope: Envelope,
        tokens: Arc<dyn TokenGenerator>,
        cookies: Arc<dyn CookieTransport>,
    ) -> Self {
        if config.id_bytes < MIN_SESSION_ID_BYTES {
            tracing::warn!(
                configured = config.id_bytes,
                minimum = MIN_SESSION_ID_BYTES,
                "session id_bytes below minimum, using minimum"
            );
        }
        Self {
            envelope,
            tokens,
            cookies,
            cookie_name: config.cookie.name.clone(),
            cookie_attrs: CookieAttributes::from(&config.cookie),
            id_bytes: config.id_bytes.max(MIN_SESSION_ID_BYTES),
        }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Recover the session carried by a request.
    ///
    /// `Ok(None)` means the request has no session cookie.  A cookie that is
    /// present but cannot be opened is always an error, never `None`.
    pub fn get_session(&self, request: &HeaderMap) -> Result<Option<Session>> {
        let token = match self.cookies.get_cookie(request, &self.cookie_name) {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(None),
            Err(e) => return Err(self.rejected(e)),
        };

        let session = self.envelope.open(&token).map_err(|e| self.rejected(e))?;

        TraceEvent::SessionOpened {
            session_id: session.id.clone(),
            version: session.version,
            provider: session.provider.clone(),
        }
        .emit();

        Ok(Some(session))
    }

    /// Reuse `existing` if it is current and belongs to `auth`'s subject,
    /// otherwise mint and seal a new session.  Performs no I/O.
    pub fn resolve_or_mint(&self, existing: Option<Session>, auth: &dyn AuthRecord) -> SessionUpdate {
        let reason = match existing {
            Some(session) => match should_mint(Some(&session), auth) {
                Some(reason) => reason,
                None => {
                    TraceEvent::SessionReused {
                        session_id: session.id.clone(),
                        provider: session.provider.clone(),
                    }
                    .emit();
                    return SessionUpdate {
                        session,
                        minted: None,
                        effect: Ok(SideEffect::None),
                    };
                }
            },
            None => MintReason::NoSession,
        };

        let session = Session {
            version: SESSION_VERSION,
            id: self.tokens.generate(self.id_bytes),
            subject: auth.subject().to_owned(),
            provider: auth.manager().name().to_owned(),
        };

        TraceEvent::SessionMinted {
            session_id: session.id.clone(),
            provider: session.provider.clone(),
            reason: reason.to_string(),
        }
        .emit();

        let effect = match self.envelope.seal(&session) {
            Ok(token) => Ok(SideEffect::WriteCookie(token)),
            Err(e) => {
                TraceEvent::SessionSealFailed {
                    session_id: session.id.clone(),
                    error: e.to_string(),
                }
                .emit();
                tracing::error!(error = %e, "failed to seal new session");
                Err(e)
            }
        };

        SessionUpdate {
            session,
            minted: Some(reason),
            effect,
        }
    }

    /// [`resolve_or_mint`](Self::resolve_or_mint) and apply the side effect
    /// to `response`.  The session is returned even when persisting it
    /// failed; the error then tells whether sealing
    /// ([`SessionError::Encryption`] / [`SessionError::Encoding`]) or the
    /// cookie write ([`SessionError::CookieWrite`]) went wrong.
    pub fn update_or_create(
        &self,
        response: &mut HeaderMap,
        existing: Option<Session>,
        auth: &dyn AuthRecord,
    ) -> (Session, Result<()>) {
        let update = self.resolve_or_mint(existing, auth);
        let outcome = match update.effect {
            Ok(SideEffect::None) => Ok(()),
            Ok(SideEffect::WriteCookie(token)) => self.write(response, &token),
            Err(e) => Err(e),
        };
        (update.session, outcome)
    }

    /// Re-seal an existing session and write it again, e.g. to move a token
    /// opened with a retired key onto the primary key.
    pub fn refresh(&self, response: &mut HeaderMap, session: &Session) -> Result<()> {
        let token = self.envelope.seal(session)?;
        self.write(response, &token)
    }

    /// Expire the session cookie on the client.
    pub fn end_session(&self, response: &mut HeaderMap) -> Result<()> {
        self.cookies.set_cookie(
            response,
            &self.cookie_name,
            "",
            &self.cookie_attrs.expired(),
        )?;
        TraceEvent::SessionCleared {
            cookie: self.cookie_name.clone(),
        }
        .emit();
        Ok(())
    }

    fn write(&self, response: &mut HeaderMap, token: &str) -> Result<()> {
        self.cookies
            .set_cookie(response, &self.cookie_name, token, &self.cookie_attrs)
            .map_err(|e| {
                tracing::error!(error = %e, "failed to write session cookie");
                match e {
                    SessionError::CookieWrite(_) => e,
                    other => SessionError::CookieWrite(other.to_string()),
                }
            })
    }

    fn rejected(&self, e: SessionError) -> SessionError {
        if e.is_tampering() {
            tracing::warn!(kind = e.kind(), "rejected session cookie");
        }
        TraceEvent::SessionRejected {
            kind: e.kind().into(),
            error: e.to_string(),
        }
        .emit();
        e
    }
}
