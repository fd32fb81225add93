use std::path::PathBuf;

use {
    anyhow::Result,
    serde::{Deserialize, Serialize},
};

/// On-disk session shape. The token is stored in the clear (the file is
/// chmod 0600 on Unix), matching how the browser client kept it in
/// `localStorage` under a single key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub access_token: String,
    pub username: String,
}

/// File-based session storage at `~/.config/cpss/session.json`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new() -> Self {
        let dir = cpss_config::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: dir.join("session.json"),
        }
    }

    /// Create a session store at a specific path (useful for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the persisted session, if any. A missing or unreadable file is
    /// treated as "not logged in", never an error.
    pub fn load(&self) -> Option<PersistedSession> {
        let data = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&data).ok()
    }

    pub fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, &data)?;

        // Set file permissions to 0600 on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Remove the persisted session. Deleting a session that does not exist
    /// is fine (logout is idempotent).
    pub fn delete(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
