// Localization settings for Polyglot

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Settings for language negotiation and catalog loading.
///
/// Every field has a default, so a settings file only needs to name what it
/// changes.
///
/// # Examples
///
/// ```
/// use polyglot_config::{LocalizationConfig, Validate};
///
/// let config = LocalizationConfig::from_toml(r#"
///     default_language = "fr"
///     catalog_dir = "locale"
///     excluded_paths = ["/api", "/static"]
/// "#).unwrap();
///
/// assert_eq!(config.default_language, "fr");
/// assert_eq!(config.cookie_name, "preferred_language");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    /// Language served when no signal matches
    pub default_language: String,
    /// Languages to load; discovered from `catalog_dir` when empty
    pub languages: Vec<String>,
    /// Directory holding catalog files
    pub catalog_dir: PathBuf,
    /// gettext domain for `<lang>/LC_MESSAGES/<domain>.po` layouts
    pub domain: String,
    /// Cookie holding the persisted preference
    pub cookie_name: String,
    /// Lifetime of the preference cookie
    pub cookie_max_age_secs: u64,
    /// Query parameter that selects a language explicitly
    pub query_param: String,
    /// Path prefixes that bypass language resolution
    pub excluded_paths: Vec<String>,
    /// Redirect unprefixed requests to the prefixed URL
    pub redirect_unprefixed: bool,
    /// Last language tried before returning the source text
    pub fallback_language: Option<String>,
    /// Reload catalogs when their files change
    pub watch: bool,
    /// Quiet period before a changed catalog is reloaded
    pub watch_debounce_ms: u64,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            languages: Vec::new(),
            catalog_dir: PathBuf::from("locales"),
            domain: "messages".to_string(),
            cookie_name: "preferred_language".to_string(),
            cookie_max_age_secs: 365 * 24 * 60 * 60,
            query_param: "language".to_string(),
            excluded_paths: Vec::new(),
            redirect_unprefixed: false,
            fallback_language: None,
            watch: false,
            watch_debounce_ms: 250,
        }
    }
}

impl LocalizationConfig {
    /// Load settings the usual way: defaults, then the file (if any), then
    /// `.env`, then `POLYGLOT_*` variables, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(dotenv) = dotenvy::dotenv() {
            debug!(path = %dotenv.display(), "Loaded .env file");
        }

        config.apply_overrides(&EnvLoader::polyglot().load())?;
        config.validate()?;

        info!(
            default_language = %config.default_language,
            catalog_dir = %config.catalog_dir.display(),
            "Localization settings loaded"
        );
        Ok(config)
    }

    /// Read settings from a JSON, TOML or `.env` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        let value = loader.load_file(path)?;

        match loader.format() {
            FileFormat::Env => {
                let vars = value
                    .as_object()
                    .into_iter()
                    .flatten()
                    .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())));
                let mut config = Self::default();
                config.apply_overrides(&EnvLoader::polyglot().load_from(vars))?;
                Ok(config)
            }
            _ => Self::from_value(value),
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Self::from_value(ConfigLoader::new(FileFormat::Toml).parse(content)?)
    }

    /// Parse settings from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        Self::from_value(ConfigLoader::new(FileFormat::Json).parse(content)?)
    }

    fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply flat string overrides keyed by field name, as produced by
    /// [`EnvLoader`]. Unknown keys are ignored.
    pub fn apply_overrides(&mut self, vars: &HashMap<String, String>) -> Result<()> {
        for (key, value) in vars {
            let value = value.trim();
            match key.as_str() {
                "default_language" => self.default_language = value.to_string(),
                "languages" => self.languages = split_list(value),
                "catalog_dir" => self.catalog_dir = PathBuf::from(value),
                "domain" => self.domain = value.to_string(),
                "cookie_name" => self.cookie_name = value.to_string(),
                "cookie_max_age_secs" => self.cookie_max_age_secs = parse_number(key, value)?,
                "query_param" => self.query_param = value.to_string(),
                "excluded_paths" => self.excluded_paths = split_list(value),
                "redirect_unprefixed" => self.redirect_unprefixed = parse_bool(key, value)?,
                "fallback_language" => {
                    self.fallback_language = (!value.is_empty()).then(|| value.to_string())
                }
                "watch" => self.watch = parse_bool(key, value)?,
                "watch_debounce_ms" => self.watch_debounce_ms = parse_number(key, value)?,
                _ => continue,
            }
            debug!(key = %key, "Applied settings override");
        }
        Ok(())
    }

    /// Debounce window as a `Duration`.
    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }
}

/// Whether `path` lies under `prefix`, comparing whole segments.
///
/// `/api` covers `/api` and `/api/v1` but not `/apiary`.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.is_empty() || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl Validate for LocalizationConfig {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_language_tag(&self.default_language, "default_language")?;
        for language in &self.languages {
            ConfigValidator::is_language_tag(language, "languages")?;
        }
        if let Some(ref fallback) = self.fallback_language {
            ConfigValidator::is_language_tag(fallback, "fallback_language")?;
        }
        ConfigValidator::not_empty(&self.domain, "domain")?;
        ConfigValidator::is_token(&self.cookie_name, "cookie_name")?;
        ConfigValidator::is_token(&self.query_param, "query_param")?;
        for prefix in &self.excluded_paths {
            ConfigValidator::is_path_prefix(prefix, "excluded_paths")?;
        }
        ConfigValidator::in_range(self.watch_debounce_ms, 1, 60_000, "watch_debounce_ms")?;
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
