//! # Settings Configuration Sources
//!
//! Abstraction over the external key/value configuration that seeds a
//! [`WorkflowSettingsBuilder`](crate::settings::WorkflowSettingsBuilder).
//!
//! ## Sources
//!
//! - **`HashMap<String, String>`**: explicit in-memory properties
//! - **[`EnvironmentSource`]**: process environment, `a.b.c` read from `A_B_C`
//! - **`config::Config`**: layered files and environment via the `config` crate,
//!   usually assembled by [`SettingsLoader`]
//!
//! Every source answers a single question per key: is there a value, and if so
//! what is its text. Parsing and defaults are handled by the builder.
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use workflow_settings::WorkflowSettingsBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut properties = HashMap::new();
//! properties.insert(
//!     "workflow.transition.delay.waitshort.ms".to_string(),
//!     "5000".to_string(),
//! );
//!
//! let settings = WorkflowSettingsBuilder::<String>::from_source(Some(&properties))?.build();
//! assert_eq!(settings.short_transition_delay(), 5000);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::SettingsLoader;

/// External key/value configuration
pub trait ConfigSource {
    /// Look up the raw value of `key`. `Ok(None)` means the key is not set.
    fn get_property(&self, key: &str) -> ConfigResult<Option<String>>;
}

impl ConfigSource for HashMap<String, String> {
    fn get_property(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.get(key).cloned())
    }
}

impl ConfigSource for config::Config {
    fn get_property(&self, key: &str) -> ConfigResult<Option<String>> {
        match self.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(ConfigurationError::source_error(key, e)),
        }
    }
}

/// Reads keys from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentSource;

impl EnvironmentSource {
    /// Environment variable holding `key`: upper-cased, `.` and `-` become `_`
    pub fn env_var_name(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl ConfigSource for EnvironmentSource {
    fn get_property(&self, key: &str) -> ConfigResult<Option<String>> {
        let var_name = Self::env_var_name(key);
        match env::var(&var_name) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigurationError::source_error(var_name, e)),
        }
    }
}

/// Parse `key` from `source`, falling back to `default` when the source or the key is absent
pub(crate) fn property_or<T>(
    source: Option<&dyn ConfigSource>,
    key: &str,
    default: T,
) -> ConfigResult<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(source) = source else {
        return Ok(default);
    };

    match source.get_property(key)? {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigurationError::invalid_value(key, raw.as_str(), e.to_string())),
        None => {
            debug!(key, %default, "Configuration key not set, using default");
            Ok(default)
        }
    }
}
