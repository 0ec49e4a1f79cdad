use config::{Config, ConfigError, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::files::{size_to_bytes, EnsureOptions, DEFAULT_MOUNT, DEFAULT_SPOOL_THRESHOLD, UploadOptions};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub file_save: FileSaveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSaveConfig {
    /// Filesystem root that uploads land under. Anything but a string falls back
    /// to `"public"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<serde_json::Value>,
    /// Module-level upload options, merged beneath per-call options.
    #[serde(default)]
    pub options: UploadOptions,
    #[serde(default = "default_spool_threshold")]
    pub spool_threshold_bytes: usize,
}

const MOUNT_ENV_VAR: &str = "APP_FILE_SAVE__MOUNT";

fn default_spool_threshold() -> usize {
    DEFAULT_SPOOL_THRESHOLD
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_body_bytes: 300 * 1024 * 1024,
        }
    }
}

impl Default for FileSaveConfig {
    fn default() -> Self {
        Self {
            mount: None,
            options: UploadOptions::default(),
            spool_threshold_bytes: DEFAULT_SPOOL_THRESHOLD,
        }
    }
}

impl FileSaveConfig {
    pub fn mount_root(&self) -> PathBuf {
        match &self.mount {
            Some(serde_json::Value::String(mount)) => PathBuf::from(mount),
            _ => PathBuf::from(DEFAULT_MOUNT),
        }
    }
}

impl AppConfig {
    /// Built-in defaults, then `config.toml` when present, then `APP_*` variables
    /// (`APP_FILE_SAVE__MOUNT=uploads`).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Same layering as [`AppConfig::load`], reading variables from `env_vars`
    /// instead of the process environment when given.
    pub fn load_from(env_vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let raw_mount = match &env_vars {
            Some(vars) => vars.get(MOUNT_ENV_VAR).cloned(),
            None => std::env::var(MOUNT_ENV_VAR).ok(),
        };

        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env_vars),
        );

        // A mount such as `2024` must stay a path, not become a number.
        if let Some(mount) = raw_mount {
            builder = builder.set_override("file_save.mount", mount)?;
        }

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Message(
                "Max body size must be greater than 0".to_string(),
            ));
        }

        let options = &self.file_save.options;

        if options.form_key.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Message(
                "Upload form key cannot be empty".to_string(),
            ));
        }

        if let Some(max_size) = options.ensure.as_ref().and_then(EnsureOptions::size_limit) {
            size_to_bytes(max_size).map_err(|e| ConfigError::Message(e.to_string()))?;
        }

        if !matches!(self.file_save.mount, None | Some(serde_json::Value::String(_))) {
            tracing::warn!(
                "file_save.mount is not a string, falling back to {:?}",
                DEFAULT_MOUNT
            );
        }

        Ok(())
    }

    pub fn create_directories(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(self.file_save.mount_root())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
