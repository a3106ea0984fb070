//! Shared HTTP client for all outbound API calls.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

use crate::config;

static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(config::request_timeout_secs()))
        .build()
        .expect("Failed to build HTTP client")
});

/// Process-wide reqwest client (connection pool plus the global timeout).
pub fn shared_client() -> &'static Client {
    &SHARED_CLIENT
}
