//! Persisted language preference.
//!
//! Only the read/write contract lives here: reading one value out of a
//! `Cookie` header and formatting the `Set-Cookie` value that stores it.

use crate::LanguageTag;
use std::fmt;

/// Find the value of cookie `name` in a `Cookie` request header.
///
/// ```
/// use polyglot_i18n::cookie_value;
///
/// let header = "session=abc; preferred_language=fr-CA";
/// assert_eq!(cookie_value(header, "preferred_language"), Some("fr-CA"));
/// assert_eq!(cookie_value(header, "theme"), None);
/// ```
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"'))
    })
}

/// A `Set-Cookie` instruction storing the visitor's language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceCookie {
    name: String,
    language: LanguageTag,
    max_age_secs: u64,
    path: String,
    secure: bool,
}

impl PreferenceCookie {
    pub fn new(name: impl Into<String>, language: LanguageTag) -> Self {
        Self {
            name: name.into(),
            language,
            max_age_secs: 365 * 24 * 60 * 60,
            path: "/".to_string(),
            secure: false,
        }
    }

    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.max_age_secs = secs;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> &LanguageTag {
        &self.language
    }

    /// The `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PreferenceCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; Path={}; Max-Age={}; SameSite=Lax",
            self.name, self.language, self.path, self.max_age_secs
        )?;
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}
