use serde::Serialize;

/// Structured trace events emitted across all IdGate crates.
///
/// Payloads carry identifiers and reasons only. Tokens, cookie values and
/// key material never appear here.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionOpened {
        session_id: String,
        version: u32,
        provider: String,
    },
    SessionReused {
        session_id: String,
        provider: String,
    },
    SessionMinted {
        session_id: String,
        provider: String,
        reason: String,
    },
    SessionSealFailed {
        session_id: String,
        error: String,
    },
    SessionRejected {
        kind: String,
        error: String,
    },
    SessionCleared {
        cookie: String,
    },
    SessionRefDerived {
        manager: String,
        audience: String,
        fallback_to_user_id: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ig_event");
    }
}
