//! API utilities for frontend-backend communication
//!
//! Provides helper functions for constructing API URLs.

use super::config::app_config;

/// Get the base URL for API requests
///
/// Uses `api.base_url` from the config when set, otherwise the current
/// window location with the configured backend port.
/// Returns an empty string if window is not available.
pub fn api_base() -> String {
    let config = app_config();
    if let Some(base) = config.api.base_url.as_deref().filter(|b| !b.trim().is_empty()) {
        return base.trim().trim_end_matches('/').to_string();
    }

    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    compose_base(&protocol, &hostname, config.api.port)
}

fn compose_base(protocol: &str, hostname: &str, port: u16) -> String {
    format!("{}//{}:{}", protocol, hostname, port)
}

/// Build a full API URL from a path
///
/// # Example
/// ```rust,ignore
/// let url = api_url("/api/a025/input-transaction");
/// ```
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}
