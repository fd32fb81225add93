//! Console configuration: backend origin resolution and config file
//! discovery for the CPSS admin console.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config, set_config_dir},
    schema::{ApiConfig, ConsoleConfig, DEFAULT_BASE_URL, ENV_API_URL, ENV_BACKEND_URL},
};
