//! Configuration loading from files and the environment.

use std::path::{Path, PathBuf};

use url::Url;

use super::{ConfigError, ImportConfig};

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "unmedium.yaml";

/// Environment variables override the file, e.g. `UNMEDIUM__HTTP__TIMEOUT_SECS=10`.
const ENV_PREFIX: &str = "UNMEDIUM";
const ENV_SEPARATOR: &str = "__";

impl ImportConfig {
    /// Load the config from the command line argument, defaulting to `unmedium.yaml`.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let required = config_file.is_some();
        let config_file = config_file.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        let config_file = absolute(config_file)?;

        Self::load_from_file(&config_file, required)
    }

    /// Load the config from a file path, layering environment overrides on top
    pub(crate) fn load_from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let config = config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<ImportConfig>()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Validation(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_secs must be at least 1".to_string(),
            ));
        }
        self.embed_base_url()?;
        Ok(())
    }

    /// `embed_base` as a URL.
    pub fn embed_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.embed_base).map_err(|e| {
            ConfigError::Validation(format!("invalid embed_base '{}': {e}", self.embed_base))
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_relative() {
        Ok(std::env::current_dir()
            .map_err(ConfigError::CwdFailure)?
            .join(path))
    } else {
        Ok(path.to_path_buf())
    }
}
