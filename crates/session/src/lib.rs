//! Operator session state.
//!
//! The session is a bearer token plus the principal it was issued to,
//! persisted as a single JSON file at `~/.config/cpss/session.json` so it
//! survives restarts. Restore is optimistic: a stored token is trusted
//! until the backend rejects it, at which point the 401 policy in the API
//! client tears the session down everywhere.

pub mod handle;
pub mod store;

pub use {
    handle::SessionHandle,
    store::{PersistedSession, SessionStore},
};

use secrecy::Secret;

/// The identity a session was established for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// A live session. Both fields are required, so "principal present iff
/// credential present" holds by construction.
#[derive(Clone)]
pub struct Session {
    pub access_token: Secret<String>,
    pub principal: Principal,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("principal", &self.principal)
            .finish()
    }
}
