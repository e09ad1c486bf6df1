//! Frontend configuration
//!
//! Embedded TOML defaults, optionally overridden by a TOML document stored in
//! `localStorage["app_config"]`. Loaded once on first access.

use contracts::domain::a025_input_transaction::CommissionMode;
use serde::Deserialize;
use std::sync::OnceLock;

pub const CONFIG_STORAGE_KEY: &str = "app_config";

/// Default configuration embedded in the bundle
const DEFAULT_CONFIG: &str = r#"
[api]
port = 3000

[form]
default_commission_mode = "on_top"
max_evidence_size_mb = 10
"#;

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub form: FormConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    /// Порт бэкенда на том же хосте, что и фронтенд
    #[serde(default = "default_port")]
    pub port: u16,
    /// Явный базовый URL (например, за reverse proxy); перекрывает `port`
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            base_url: None,
        }
    }
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub default_commission_mode: CommissionMode,
    #[serde(default = "default_max_evidence_size_mb")]
    pub max_evidence_size_mb: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            default_commission_mode: CommissionMode::default(),
            max_evidence_size_mb: default_max_evidence_size_mb(),
        }
    }
}

fn default_max_evidence_size_mb() -> u32 {
    10
}

impl FormConfig {
    pub fn max_evidence_size_bytes(&self) -> f64 {
        self.max_evidence_size_mb as f64 * 1024.0 * 1024.0
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig, String> {
    toml::from_str(contents).map_err(|e| e.to_string())
}

pub fn default_config() -> AppConfig {
    parse_config(DEFAULT_CONFIG).unwrap_or_default()
}

fn read_stored_override() -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage
        .get_item(CONFIG_STORAGE_KEY)
        .ok()
        .flatten()
        .filter(|raw| !raw.trim().is_empty())
}

/// Load configuration: stored override first, embedded defaults otherwise
pub fn load_config() -> AppConfig {
    if let Some(raw) = read_stored_override() {
        match parse_config(&raw) {
            Ok(config) => {
                log::info!("Using config override from localStorage[{}]", CONFIG_STORAGE_KEY);
                return config;
            }
            Err(e) => {
                log::warn!("Invalid config override in localStorage, using defaults: {}", e);
            }
        }
    }
    default_config()
}

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

pub fn app_config() -> &'static AppConfig {
    CONFIG.get_or_init(load_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.form.default_commission_mode, CommissionMode::OnTop);
        assert_eq!(config.form.max_evidence_size_mb, 10);
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
            [api]
            base_url = "https://erp.example.com"

            [form]
            default_commission_mode = "included"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.api.base_url.as_deref(), Some("https://erp.example.com"));
        assert_eq!(config.form.default_commission_mode, CommissionMode::Included);
        assert_eq!(config.form.max_evidence_size_mb, 10);
    }

    #[test]
    fn test_invalid_config() {
        assert!(parse_config("[api]\nport = \"abc\"").is_err());
        assert!(parse_config("[form]\ndefault_commission_mode = \"percent\"").is_err());
    }

    #[test]
    fn test_max_evidence_size_bytes() {
        let form = FormConfig {
            max_evidence_size_mb: 2,
            ..Default::default()
        };
        assert_eq!(form.max_evidence_size_bytes(), 2097152.0);
    }
}
