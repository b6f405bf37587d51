//! Startup configuration: defaults, then `sky-analyzer.toml`, then `SKY_*` env.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "sky-analyzer.toml";

/// Overrides [`CONFIG_FILE`] when set.
pub const CONFIG_PATH_VAR: &str = "SKY_ANALYZER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),

    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),

    #[error("invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub roboflow: RoboflowConfig,
    pub server: ServerConfig,
}

/// Settings for the hosted classification workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoboflowConfig {
    pub api_url: String,
    pub api_key: String,
    pub workspace: String,
    pub workflow: String,
    /// Sent to the workflow as its `use_cache` hint.
    pub use_cache: bool,
    /// Ask the workflow not to render annotated overlay images.
    pub skip_visualization: bool,
    pub request_timeout_secs: u64,
}

impl Default for RoboflowConfig {
    fn default() -> Self {
        Self {
            api_url: "https://serverless.roboflow.com".to_string(),
            api_key: String::new(),
            workspace: String::new(),
            workflow: String::new(),
            use_cache: true,
            skip_visualization: true,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl AppConfig {
    /// Load and validate. Fails before anything talks to the network if a
    /// credential is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::from_figment(Self::figment(path))
    }

    pub fn figment(path: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("SKY_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: AppConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("roboflow.api_key", &self.roboflow.api_key),
            ("roboflow.workspace", &self.roboflow.workspace),
            ("roboflow.workflow", &self.roboflow.workflow),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key));
            }
        }
        if self.roboflow.request_timeout_secs == 0 {
            return Err(ConfigError::Zero("roboflow.request_timeout_secs"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_fail_validation() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("roboflow.api_key")));
        assert_eq!(err.to_string(), "missing required setting `roboflow.api_key`");
    }

    #[test]
    fn names_the_first_missing_credential() {
        let mut config = AppConfig::default();
        config.roboflow.api_key = "key".into();
        config.roboflow.workflow = "detect-clouds".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("roboflow.workspace"))
        ));

        config.roboflow.workspace = "   ".into();
        assert!(config.validate().is_err());

        config.roboflow.workspace = "sky".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = AppConfig::default();
        config.roboflow.api_key = "key".into();
        config.roboflow.workspace = "sky".into();
        config.roboflow.workflow = "detect-clouds".into();
        config.roboflow.request_timeout_secs = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Zero("roboflow.request_timeout_secs")));
        assert_eq!(
            err.to_string(),
            "`roboflow.request_timeout_secs` must be greater than zero"
        );
    }

    #[test]
    fn config_file_in_parent_dir_is_ignored() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [roboflow]
                api_key = "from-parent"
                workspace = "sky"
                workflow = "detect-clouds"
                "#,
            )?;
            std::fs::create_dir("nested").map_err(|e| e.to_string())?;
            jail.change_dir("nested")?;

            let config: AppConfig = AppConfig::figment(CONFIG_FILE.into()).extract()?;
            assert!(config.roboflow.api_key.is_empty());
            Ok(())
        });
    }

    #[test]
    fn loads_file_and_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [roboflow]
                api_key = "from-file"
                workspace = "sky"
                workflow = "detect-clouds"
                use_cache = false

                [server]
                bind = "0.0.0.0:9000"
                "#,
            )?;
            jail.set_env("SKY_ROBOFLOW__API_KEY", "from-env");

            let config = AppConfig::from_figment(AppConfig::figment(CONFIG_FILE.into()))
                .expect("valid config");
            assert_eq!(config.roboflow.api_key, "from-env");
            assert_eq!(config.roboflow.workspace, "sky");
            assert!(!config.roboflow.use_cache);
            assert!(config.roboflow.skip_visualization);
            assert_eq!(config.roboflow.api_url, "https://serverless.roboflow.com");
            assert_eq!(config.server.bind, "0.0.0.0:9000");
            Ok(())
        });
    }

    #[test]
    fn env_alone_is_enough() {
        Jail::expect_with(|jail| {
            jail.set_env("SKY_ROBOFLOW__API_KEY", "k");
            jail.set_env("SKY_ROBOFLOW__WORKSPACE", "w");
            jail.set_env("SKY_ROBOFLOW__WORKFLOW", "f");

            let config = AppConfig::from_figment(AppConfig::figment("absent.toml".into()))
                .expect("valid config");
            assert_eq!(config.roboflow.workflow, "f");
            assert_eq!(config.server.bind, "127.0.0.1:8080");
            Ok(())
        });
    }

    #[test]
    fn missing_credential_fails_load() {
        Jail::expect_with(|jail| {
            jail.set_env("SKY_ROBOFLOW__API_KEY", "k");
            jail.set_env("SKY_ROBOFLOW__WORKSPACE", "w");

            let result = AppConfig::from_figment(AppConfig::figment("absent.toml".into()));
            assert!(matches!(result, Err(ConfigError::Missing("roboflow.workflow"))));
            Ok(())
        });
    }
}
