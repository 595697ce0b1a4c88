//! Language negotiation and translation catalogs for Polyglot
//!
//! Serves user-facing text in many languages without baking the language
//! into routes or code paths:
//!
//! - **Language Tags**: parsing, case normalization, `Accept-Language`
//! - **Matching**: exact and multi-pass loose matching against the languages
//!   the application has catalogs for
//! - **Resolution**: per-request choice of the principal language from the
//!   query string, URL prefix, cookie and headers, with redirect decisions
//! - **Catalogs**: gettext PO and JSON catalogs, context and plural forms
//! - **Hot reload**: catalogs are swapped atomically while readers continue
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use polyglot_i18n::{LanguageSignals, Localizer};
//! use polyglot_config::LocalizationConfig;
//!
//! # fn main() -> polyglot_i18n::Result<()> {
//! let config = LocalizationConfig::load(None)?;
//! let localizer = Localizer::from_config(&config)?;
//!
//! let signals = LanguageSignals::new("/fr-CA/account")
//!     .with_accept_language(Some("fr-CA,fr;q=0.9,en;q=0.5"));
//!
//! if let Some(ctx) = localizer.resolve(&signals).context() {
//!     if let Some(location) = ctx.rewrite().location() {
//!         println!("redirect to {}", location);
//!     } else {
//!         println!("{}", localizer.text(ctx, "Sign up"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Accept-Language Parsing
//!
//! ```rust
//! use polyglot_i18n::parse_accept_language;
//!
//! let tags = parse_accept_language("en-US,en;q=0.9,fr;q=0.8");
//! let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
//! assert_eq!(tags, ["en-US", "en", "fr"]);
//! ```

mod catalog;
mod cookie;
mod error;
mod loader;
mod lookup;
mod matcher;
mod plural;
mod po;
mod registry;
mod resolver;
mod service;
mod tag;

pub mod iso639;

#[cfg(feature = "http")]
pub mod http_adapter;
#[cfg(feature = "watch")]
pub mod watcher;

pub use catalog::{CONTEXT_SEPARATOR, Catalog, CatalogFormat, TranslationEntry};
pub use cookie::{PreferenceCookie, cookie_value};
pub use error::I18nError;
pub use loader::CatalogLoader;
pub use lookup::{FallbackChain, LookupService, Text, fallback_chain, interpolate, lookup_in};
pub use matcher::{LooseMatch, MatchPass, match_exact, match_loose};
pub use plural::{PluralCategory, PluralRuleBook, PluralRules, plural_category};
pub use po::ParseWarning;
pub use registry::{CatalogRegistry, RegistrySnapshot};
pub use resolver::{
    LanguageResolver, LanguageSignals, RequestLanguageContext, Resolution, ResolutionSource,
    ResolverSettings, Rewrite,
};
pub use service::{Localizer, Localizing};
pub use tag::{LanguageTag, LanguageTagBuilder, parse_accept_language};

#[cfg(feature = "watch")]
pub use watcher::{CatalogEvent, CatalogWatcher, WatchHandle};

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Catalog, CatalogRegistry, I18nError, LanguageSignals, LanguageTag, Localizer, Localizing,
        Resolution, Result, Rewrite, Text, match_exact, match_loose, parse_accept_language,
    };
}
