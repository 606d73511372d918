use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::AgentError;

/// Main configuration structure for the marketing agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub meta: MetaConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub bind: String,
    /// When set, every data route requires `Authorization: Bearer <token>`.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Forces both platform adapters onto synthetic data.
    pub use_mock_data: bool,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaConfig {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub ad_account_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub app_secret: Option<String>,
    pub api_version: String,
    pub graph_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub developer_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub login_customer_id: Option<String>,
    pub api_version: String,
    pub ads_url: String,
    pub token_url: String,
}

/// Borrowed view of a complete Meta credential set.
#[derive(Debug, Clone, Copy)]
pub struct MetaCredentials<'a> {
    pub access_token: &'a str,
    pub ad_account_id: &'a str,
}

/// Borrowed view of a complete Google Ads credential set.
#[derive(Debug, Clone, Copy)]
pub struct GoogleCredentials<'a> {
    pub developer_token: &'a str,
    pub refresh_token: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub customer_id: &'a str,
    pub login_customer_id: Option<&'a str>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl MetaConfig {
    /// Returns the credential set, or the names of every missing variable.
    pub fn credentials(&self) -> Result<MetaCredentials<'_>, Vec<&'static str>> {
        let access_token = present(&self.access_token);
        let ad_account_id = present(&self.ad_account_id);

        let missing: Vec<&'static str> = [
            ("META_ACCESS_TOKEN", access_token.is_some()),
            ("META_AD_ACCOUNT_ID", ad_account_id.is_some()),
            ("META_APP_ID", present(&self.app_id).is_some()),
            ("META_APP_SECRET", present(&self.app_secret).is_some()),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| name)
        .collect();

        match (access_token, ad_account_id) {
            (Some(access_token), Some(ad_account_id)) if missing.is_empty() => {
                Ok(MetaCredentials {
                    access_token,
                    ad_account_id,
                })
            }
            _ => Err(missing),
        }
    }
}

impl GoogleConfig {
    /// Returns the credential set, or the names of every missing variable.
    pub fn credentials(&self) -> Result<GoogleCredentials<'_>, Vec<&'static str>> {
        let developer_token = present(&self.developer_token);
        let refresh_token = present(&self.refresh_token);
        let client_id = present(&self.client_id);
        let client_secret = present(&self.client_secret);
        let customer_id = present(&self.customer_id);

        match (
            developer_token,
            refresh_token,
            client_id,
            client_secret,
            customer_id,
        ) {
            (
                Some(developer_token),
                Some(refresh_token),
                Some(client_id),
                Some(client_secret),
                Some(customer_id),
            ) => Ok(GoogleCredentials {
                developer_token,
                refresh_token,
                client_id,
                client_secret,
                customer_id,
                login_customer_id: present(&self.login_customer_id),
            }),
            _ => Err([
                ("GOOGLE_DEVELOPER_TOKEN", developer_token.is_some()),
                ("GOOGLE_REFRESH_TOKEN", refresh_token.is_some()),
                ("GOOGLE_CLIENT_ID", client_id.is_some()),
                ("GOOGLE_CLIENT_SECRET", client_secret.is_some()),
                ("GOOGLE_CUSTOMER_ID", customer_id.is_some()),
            ]
            .into_iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| name)
            .collect()),
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = [".env", "../.env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("AGENT_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::info!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());

        // Validate configuration - log warnings but don't fail
        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Apply overrides from a key lookup (the process environment in production)
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(bind) = lookup("AGENT_HTTP_BIND") {
            self.server.bind = bind;
        }
        if let Some(token) = lookup("AGENT_BEARER_TOKEN") {
            self.server.bearer_token = Some(token).filter(|t| !t.is_empty());
        }

        // Data overrides
        if let Some(flag) = lookup("USE_MOCK_DATA") {
            self.data.use_mock_data = flag.trim().eq_ignore_ascii_case("true");
        }
        if let Some(timeout) = lookup("AGENT_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.data.request_timeout_seconds = secs;
            }
        }

        // Meta overrides
        for (key, slot) in [
            ("META_ACCESS_TOKEN", &mut self.meta.access_token),
            ("META_AD_ACCOUNT_ID", &mut self.meta.ad_account_id),
            ("META_APP_ID", &mut self.meta.app_id),
            ("META_APP_SECRET", &mut self.meta.app_secret),
        ] {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }
        if let Some(version) = lookup("META_API_VERSION") {
            self.meta.api_version = version;
        }

        // Google overrides
        for (key, slot) in [
            ("GOOGLE_DEVELOPER_TOKEN", &mut self.google.developer_token),
            ("GOOGLE_REFRESH_TOKEN", &mut self.google.refresh_token),
            ("GOOGLE_CLIENT_ID", &mut self.google.client_id),
            ("GOOGLE_CLIENT_SECRET", &mut self.google.client_secret),
            ("GOOGLE_CUSTOMER_ID", &mut self.google.customer_id),
            ("GOOGLE_LOGIN_CUSTOMER_ID", &mut self.google.login_customer_id),
        ] {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }
        if let Some(version) = lookup("GOOGLE_ADS_API_VERSION") {
            self.google.api_version = version;
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), AgentError> {
        if self.data.request_timeout_seconds == 0 {
            return Err(AgentError::Config(
                "data.request_timeout_seconds cannot be 0".to_string(),
            ));
        }

        // Live mode without credentials still runs; the affected platform serves mock data
        if !self.data.use_mock_data {
            let mut missing = Vec::new();
            if let Err(names) = self.meta.credentials() {
                missing.extend(names);
            }
            if let Err(names) = self.google.credentials() {
                missing.extend(names);
            }
            if !missing.is_empty() {
                return Err(AgentError::MissingCredentials(missing));
            }
        }

        Ok(())
    }

    /// Get the upstream request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.data.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "marketing-agent".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                bind: "0.0.0.0:8000".to_string(),
                bearer_token: None,
            },
            data: DataConfig {
                use_mock_data: true,
                request_timeout_seconds: 10,
            },
            meta: MetaConfig {
                api_version: "v18.0".to_string(),
                graph_url: "https://graph.facebook.com".to_string(),
                ..MetaConfig::default()
            },
            google: GoogleConfig {
                api_version: "v17".to_string(),
                ads_url: "https://googleads.googleapis.com".to_string(),
                token_url: "https://oauth2.googleapis.com/token".to_string(),
                ..GoogleConfig::default()
            },
        }
    }
}
