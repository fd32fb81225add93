use reqwest::StatusCode;

/// Failure taxonomy for backend calls.
///
/// `Unauthorized` is only ever produced by the client's 401 policy, which
/// has already torn the session down by the time the error is returned.
/// Everything else is the caller's to surface; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the credential. The session has been cleared;
    /// the operator must log in again.
    #[error("session expired or invalid, run `cpss login`")]
    Unauthorized,

    /// Any other non-success status, with the backend's `detail` message
    /// when one was provided.
    #[error("{detail}")]
    Api { status: StatusCode, detail: String },

    /// Connect, timeout or body-decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend accepted the login but the session could not be written
    /// to disk.
    #[error("failed to persist session: {0}")]
    Session(String),
}

impl ApiError {
    /// Status code of the response that produced this error, when there
    /// was a response at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::Session(_) => None,
        }
    }
}

/// Extract the backend's error message from a response body.
///
/// The backend wraps errors as `{"detail": ...}`; anything else falls back
/// to a generic message so transport noise never reaches the operator raw.
pub(crate) fn detail_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
