use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    /// Base URL of the remote API, e.g. "https://api.notelark.app/api".
    pub const API_URL: &str = "NOTELARK_API_URL";
    /// Directory holding the session credential and the note cache.
    pub const STATE_DIR: &str = "NOTELARK_STATE_DIR";
    /// Global request timeout in seconds.
    pub const TIMEOUT_SECS: &str = "NOTELARK_TIMEOUT_SECS";
}

/// Default values
pub mod defaults {
    pub const API_URL: &str = "http://localhost:8080/api";
    pub const STATE_DIR: &str = "./.notelark";
    pub const TIMEOUT_SECS: u64 = 10;
    pub const TOKEN_FILE: &str = "session.token";
}

/// Get the client state directory (credential and note cache live here)
pub fn state_dir() -> PathBuf {
    env::var(env_vars::STATE_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(defaults::STATE_DIR))
}

/// Path of the persisted session credential
pub fn token_path() -> PathBuf {
    state_dir().join(defaults::TOKEN_FILE)
}

/// Global request timeout in seconds
pub fn request_timeout_secs() -> u64 {
    env::var(env_vars::TIMEOUT_SECS)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(defaults::TIMEOUT_SECS)
}

#[derive(Clone)]
pub struct Config {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var(env_vars::API_URL)
                .unwrap_or_else(|_| defaults::API_URL.to_string()),
            state_dir: state_dir(),
            timeout_secs: request_timeout_secs(),
        }
    }
}
