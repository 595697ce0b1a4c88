// Settings validation

use crate::{ConfigError, Result};

/// Trait for validating settings
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Validation rules shared by settings types
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a number is within range
    pub fn in_range<T: PartialOrd + std::fmt::Display>(value: T, min: T, max: T, field: &str) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            )));
        }
        Ok(())
    }

    /// Validate the rough shape of a language tag (`en`, `fr-CA`, `zh_Hant`).
    ///
    /// Full parsing happens where tags are used; this only rejects values
    /// that could never be a tag.
    pub fn is_language_tag(value: &str, field: &str) -> Result<()> {
        let mut parts = value.split(['-', '_']);
        let language = parts.next().unwrap_or_default();

        let language_ok = (2..=8).contains(&language.len())
            && language.bytes().all(|b| b.is_ascii_alphabetic());
        let rest_ok = parts.all(|p| {
            (1..=8).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_alphanumeric())
        });

        if !language_ok || !rest_ok {
            return Err(ConfigError::ValidationError(format!(
                "{} is not a language tag: {:?}",
                field, value
            )));
        }
        Ok(())
    }

    /// Validate a cookie or query parameter name (RFC 6265 token)
    pub fn is_token(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;
        let valid = value.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        });
        if !valid {
            return Err(ConfigError::ValidationError(format!(
                "{} contains characters not allowed in a token: {:?}",
                field, value
            )));
        }
        Ok(())
    }

    /// Validate an absolute URL path prefix
    pub fn is_path_prefix(value: &str, field: &str) -> Result<()> {
        if !value.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "{} must start with '/': {:?}",
                field, value
            )));
        }
        Ok(())
    }
}
