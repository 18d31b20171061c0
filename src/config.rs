use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Assignflow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssignflowConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the materials backend
    pub base_url: String,
    /// Request timeout applied to roster fetches and uploads
    pub timeout_seconds: u64,
    /// Bearer token (can be set via env var)
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
}

impl Default for AssignflowConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_seconds: 30,
                token: None, // Read from env var when absent
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl AssignflowConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. Configuration file (assignflow.toml)
    /// 3. Environment variables (ASSIGNFLOW_ prefix, `__` between nesting
    ///    levels: e.g. ASSIGNFLOW_API__BASE_URL -> api.base_url)
    pub fn load() -> Result<Self> {
        let defaults = AssignflowConfig::default();
        let mut builder = Config::builder()
            .set_default("api.base_url", defaults.api.base_url.clone())?
            .set_default("api.timeout_seconds", defaults.api.timeout_seconds)?
            .set_default("observability.log_level", defaults.observability.log_level.clone())?;

        if Path::new("assignflow.toml").exists() {
            builder = builder.add_source(File::with_name("assignflow"));
        }

        // Double underscore separates nesting levels so snake_case keys like
        // base_url stay addressable from the environment.
        builder = builder.add_source(
            Environment::with_prefix("ASSIGNFLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut assignflow_config: AssignflowConfig = config.try_deserialize()?;

        // Token fallback: dedicated env var wins over nothing in the file.
        if assignflow_config.api.token.is_none() {
            if let Ok(token) = std::env::var("ASSIGNFLOW_API_TOKEN") {
                assignflow_config.api.token = Some(token);
            }
        }

        Ok(assignflow_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    /// HTTP client shared by the roster and materials clients.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()?;
        Ok(client)
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<AssignflowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = AssignflowConfig::load_env_file();
        AssignflowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static AssignflowConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
