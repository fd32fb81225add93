use std::sync::{Arc, RwLock};

use {
    secrecy::{ExposeSecret, Secret},
    tracing::debug,
};

use crate::{
    Principal, Session,
    store::{PersistedSession, SessionStore},
};

/// Shared, live view of the current session.
///
/// Cheap to clone; the API client and the CLI hold clones of the same
/// handle, so login, logout and the 401 teardown propagate to every
/// subsequent request immediately. Mutation and durable-storage update
/// happen under the same write lock, so no request observes a
/// half-updated session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    current: Arc<RwLock<Option<Session>>>,
    store: SessionStore,
}

impl SessionHandle {
    pub fn new(store: SessionStore) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// Restore the session persisted on disk, if any.
    ///
    /// Optimistic: the stored principal is trusted without revalidating
    /// against the backend. The first authenticated call confirms or
    /// invalidates it via the 401 policy.
    pub fn restore(&self) -> bool {
        let Some(persisted) = self.store.load() else {
            return false;
        };
        debug!(username = %persisted.username, "restored session from disk");
        let mut guard = self.current.write().unwrap();
        *guard = Some(Session {
            access_token: Secret::new(persisted.access_token),
            principal: Principal {
                username: persisted.username,
            },
        });
        true
    }

    /// Establish a new session in memory and on disk.
    pub fn establish(&self, access_token: String, username: String) -> anyhow::Result<()> {
        let mut guard = self.current.write().unwrap();
        self.store.save(&PersistedSession {
            access_token: access_token.clone(),
            username: username.clone(),
        })?;
        *guard = Some(Session {
            access_token: Secret::new(access_token),
            principal: Principal { username },
        });
        Ok(())
    }

    /// Drop the session from memory and durable storage.
    ///
    /// Used by both explicit logout and the forced teardown on a 401;
    /// idempotent.
    pub fn clear(&self) -> anyhow::Result<()> {
        let mut guard = self.current.write().unwrap();
        self.store.delete()?;
        *guard = None;
        Ok(())
    }

    /// The bearer credential for outbound requests, if a session is live.
    pub fn bearer(&self) -> Option<String> {
        self.current
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.access_token.expose_secret().clone())
    }

    pub fn principal(&self) -> Option<Principal> {
        self.current
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.principal.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap().is_some()
    }
}
