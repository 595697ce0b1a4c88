//! Error types for i18n operations

use thiserror::Error;

/// Errors that can occur during i18n operations.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Invalid language tag
    #[error("Invalid language tag: {0}")]
    InvalidTag(String),

    /// No catalog registered for a language
    #[error("No catalog for language: {0}")]
    CatalogNotFound(String),

    /// Catalog could not be decoded as a whole
    #[error("Failed to parse catalog: {0}")]
    ParseError(String),

    /// Catalog file has an extension we do not know how to load
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    /// Catalog file path does not name a language
    #[error("Cannot derive a language from catalog path: {0}")]
    UnknownCatalogPath(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid plural category
    #[error("Invalid plural category: {0}")]
    InvalidPluralCategory(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] polyglot_config::ConfigError),

    /// File watcher error
    #[cfg(feature = "watch")]
    #[error("Watcher error: {0}")]
    WatchError(#[from] notify::Error),

    /// Watcher started outside of a Tokio runtime
    #[cfg(feature = "watch")]
    #[error("Catalog watcher requires a running Tokio runtime")]
    NoRuntime,
}
