use serde::Deserialize;
use std::env;

use dirabus_shared::Credentials;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token issued by the backend login endpoint
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    pub currency: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Self::defaults()?
            // Shipped defaults
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `DIRABUS__API__BASE_URL=http://10.0.0.5:8000/api`
            .add_source(config::Environment::with_prefix("DIRABUS").separator("__"));

        builder.build()?.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("api.base_url", "http://localhost:8000/api")?
            .set_default("api.timeout_seconds", 10_i64)?
            .set_default("display.currency", "TSh")
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::from_token(self.auth.token.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Config {
        Config::defaults()
            .unwrap()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_apply() {
        let config = from_toml("");
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.display.currency, "TSh");
        assert!(!config.credentials().is_authenticated());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = from_toml(
            r#"
            [api]
            base_url = "https://dirabus.example/api"
            timeout_seconds = 3

            [auth]
            token = "tok-1"
            "#,
        );
        assert_eq!(config.api.base_url, "https://dirabus.example/api");
        assert_eq!(config.api.timeout_seconds, 3);
        assert!(config.credentials().is_authenticated());
    }
}
