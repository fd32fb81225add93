//! Console configuration schema.

use serde::{Deserialize, Serialize};

/// Default backend origin when neither env vars nor a config file name one.
///
/// The browser build issued relative `/api` requests behind a reverse proxy;
/// a terminal client needs an absolute origin, so the conventional local
/// backend address stands in for the proxy default.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Primary environment variable selecting the backend origin.
pub const ENV_API_URL: &str = "CPSS_API_URL";
/// Legacy alias, recognized for parity with older deployments.
pub const ENV_BACKEND_URL: &str = "CPSS_BACKEND_URL";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
}

/// Backend API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend origin including the `/api` prefix. Env vars take precedence.
    pub base_url: Option<String>,
}

impl ConsoleConfig {
    /// Resolve the backend origin: `CPSS_API_URL`, then `CPSS_BACKEND_URL`,
    /// then the config file, then [`DEFAULT_BASE_URL`].
    ///
    /// The result never carries a trailing slash.
    pub fn resolve_base_url(&self) -> String {
        let raw = env_nonempty(ENV_API_URL)
            .or_else(|| env_nonempty(ENV_BACKEND_URL))
            .or_else(|| self.api.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        raw.trim_end_matches('/').to_string()
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
