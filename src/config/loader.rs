//! Configuration Loader
//!
//! Environment-aware loading of workflow settings through the `config` crate.
//! Layers, later ones winning:
//!
//! 1. `{dir}/workflow.{toml,yaml,json}`
//! 2. `{dir}/workflow.{environment}.{toml,yaml,json}`
//! 3. `WORKFLOW_*` environment variables
//!
//! Every layer is optional. Keys missing from all layers fall back to the
//! builder defaults.

use super::error::{ConfigResult, ConfigurationError};
use crate::constants::environment as env_names;
use crate::settings::{WorkflowSettingsBuilder, WorkflowState};
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Layered configuration resolved for one environment
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    config: Config,
    environment: String,
    config_directory: PathBuf,
}

impl SettingsLoader {
    /// Load from `./config` with environment auto-detection
    pub fn load() -> ConfigResult<Self> {
        Self::load_from_directory(PathBuf::from("config"))
    }

    /// Load from a specific directory with environment auto-detection
    pub fn load_from_directory<P: Into<PathBuf>>(config_dir: P) -> ConfigResult<Self> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load from a specific directory with an explicit environment.
    /// Useful for tests that must not depend on process environment selectors.
    pub fn load_from_directory_with_env<P: Into<PathBuf>>(
        config_dir: P,
        environment: &str,
    ) -> ConfigResult<Self> {
        let config_directory = config_dir.into();

        debug!(
            "Loading workflow configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let base = Self::file_stem(&config_directory, env_names::CONFIG_FILE_STEM);
        let overrides = Self::file_stem(
            &config_directory,
            &format!("{}.{}", env_names::CONFIG_FILE_STEM, environment),
        );

        let config = Config::builder()
            .add_source(File::with_name(&base).required(false))
            .add_source(File::with_name(&overrides).required(false))
            .add_source(
                Environment::with_prefix(env_names::KEY_PREFIX)
                    .prefix_separator("_")
                    .separator("_")
                    .keep_prefix(true),
            )
            .build()
            .map_err(ConfigurationError::load_error)?;

        info!(
            environment = %environment,
            config_directory = %config_directory.display(),
            "Workflow configuration loaded"
        );

        Ok(Self {
            config,
            environment: environment.to_string(),
            config_directory,
        })
    }

    /// Current environment from `WORKFLOW_ENV`, then `APP_ENV`, default `development`
    pub fn detect_environment() -> String {
        env::var(env_names::ENV_VAR)
            .or_else(|_| env::var(env_names::FALLBACK_ENV_VAR))
            .unwrap_or_else(|_| env_names::DEFAULT_ENVIRONMENT.to_string())
            .to_lowercase()
    }

    /// Builder seeded from the loaded configuration
    pub fn load_settings<S: WorkflowState>(&self) -> ConfigResult<WorkflowSettingsBuilder<S>> {
        let builder = WorkflowSettingsBuilder::from_source(Some(&self.config))?;

        debug!(
            environment = %self.environment,
            "Workflow settings resolved: {}",
            serde_json::to_string(&builder.build().summary())
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        Ok(builder)
    }

    /// The merged configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn file_stem(dir: &Path, stem: &str) -> String {
        dir.join(stem).to_string_lossy().into_owned()
    }
}
