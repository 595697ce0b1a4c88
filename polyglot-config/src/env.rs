// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Default prefix for localization settings in the environment.
pub const ENV_PREFIX: &str = "POLYGLOT";

/// Environment variable loader
///
/// Keys are returned lowercase with the prefix stripped, so
/// `POLYGLOT_DEFAULT_LANGUAGE` becomes `default_language`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Loader for the `POLYGLOT_` prefix.
    pub fn polyglot() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }

    /// Load all matching variables from the process environment
    pub fn load(&self) -> HashMap<String, String> {
        self.load_from(env::vars())
    }

    /// Load matching variables from an explicit list of pairs
    pub fn load_from<I, K, V>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = HashMap::new();

        for (key, value) in vars {
            if let Some(name) = self.strip(key.as_ref()) {
                config.insert(name.to_lowercase(), value.into());
            }
        }

        config
    }

    fn strip<'a>(&self, key: &'a str) -> Option<&'a str> {
        match self.prefix {
            Some(ref prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|rest| !rest.is_empty()),
            None => Some(key),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::polyglot()
    }
}
