//! The localization service.
//!
//! [`Localizer`] ties the registry, resolver and lookup together behind the
//! [`Localizing`] capability that request handlers and view helpers use.

use crate::cookie::PreferenceCookie;
use crate::loader::CatalogLoader;
use crate::lookup::{LookupService, Text};
use crate::registry::CatalogRegistry;
use crate::resolver::{LanguageResolver, LanguageSignals, RequestLanguageContext, Resolution, ResolverSettings};
use crate::{Catalog, I18nError, LanguageTag, PluralRuleBook, Result};
use polyglot_config::LocalizationConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// What the request pipeline needs from localization.
pub trait Localizing: Send + Sync {
    /// Decide the principal language of a request.
    fn resolve_principal_language(&self, signals: &LanguageSignals<'_>) -> Resolution;

    /// Translate `source` for a fallback chain; returns `source` on a miss.
    fn get_text<'a>(
        &self,
        source: &'a str,
        context: Option<&str>,
        count: Option<u64>,
        chain: &[LanguageTag],
    ) -> Text<'a>;
}

/// Registry, resolver and lookup for one application.
///
/// Cheap to clone; clones share the registry.
///
/// # Example
///
/// ```
/// use polyglot_i18n::{Catalog, CatalogRegistry, LanguageSignals, Localizer, ResolverSettings};
/// use std::sync::Arc;
///
/// let mut fr = Catalog::new("fr".parse().unwrap());
/// fr.add("Hello", "Bonjour");
///
/// let registry = Arc::new(CatalogRegistry::from_catalogs([fr]));
/// let localizer = Localizer::new(registry, ResolverSettings::new("en".parse().unwrap()));
///
/// let resolution = localizer.resolve(&LanguageSignals::new("/fr/home"));
/// let ctx = resolution.context().unwrap();
/// assert_eq!(localizer.text(ctx, "Hello"), "Bonjour");
/// ```
#[derive(Debug, Clone)]
pub struct Localizer {
    registry: Arc<CatalogRegistry>,
    loader: Option<CatalogLoader>,
    resolver: LanguageResolver,
    lookup: LookupService,
    cookie_name: String,
    cookie_max_age_secs: u64,
    watch_debounce_ms: u64,
    watch_enabled: bool,
}

impl Localizer {
    /// Build a localizer over an existing registry.
    ///
    /// The default language always counts as an application language; it
    /// gets an empty catalog if it has none, so lookups in it return the
    /// source text.
    pub fn new(registry: Arc<CatalogRegistry>, settings: ResolverSettings) -> Self {
        let defaults = LocalizationConfig::default();
        Self::assemble(registry, None, settings, PluralRuleBook::new(), &defaults)
    }

    /// Load catalogs and settings as described by `config`.
    pub fn from_config(config: &LocalizationConfig) -> Result<Self> {
        let settings = ResolverSettings::from_config(config)?;
        let rules = PluralRuleBook::new();
        let languages = config
            .languages
            .iter()
            .map(|l| LanguageTag::parse(l))
            .collect::<Result<Vec<_>>>()?;
        let loader = CatalogLoader::new(&config.catalog_dir)
            .with_domain(config.domain.clone())
            .with_plural_rules(rules.clone())
            .with_languages(languages.iter().cloned())
            .with_languages([settings.default_language.clone()]);

        let catalogs = if languages.is_empty() {
            loader.load_all()?
        } else {
            loader.load_languages(&languages)?
        };

        info!(
            dir = %config.catalog_dir.display(),
            languages = catalogs.len(),
            "Loaded translation catalogs"
        );

        let registry = Arc::new(CatalogRegistry::from_catalogs(catalogs));
        Ok(Self::assemble(registry, Some(loader), settings, rules, config))
    }

    fn assemble(
        registry: Arc<CatalogRegistry>,
        loader: Option<CatalogLoader>,
        settings: ResolverSettings,
        rules: PluralRuleBook,
        config: &LocalizationConfig,
    ) -> Self {
        if !registry.load().contains(&settings.default_language) {
            warn!(language = %settings.default_language, "Default language has no catalog; source text will be served");
            registry.insert(Catalog::new(settings.default_language.clone()));
        }

        let lookup = LookupService::new(Arc::clone(&registry))
            .with_fallback(settings.fallback_language.clone())
            .with_plural_rules(rules);

        Self {
            registry,
            loader,
            resolver: LanguageResolver::new(settings),
            lookup,
            cookie_name: config.cookie_name.clone(),
            cookie_max_age_secs: config.cookie_max_age_secs,
            watch_debounce_ms: config.watch_debounce_ms,
            watch_enabled: config.watch,
        }
    }

    /// Replace the plural rules used for lookups.
    pub fn with_plural_rules(mut self, rules: PluralRuleBook) -> Self {
        self.lookup = self.lookup.with_plural_rules(rules);
        self
    }

    /// Name of the preference cookie.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn registry(&self) -> &Arc<CatalogRegistry> {
        &self.registry
    }

    pub fn loader(&self) -> Option<&CatalogLoader> {
        self.loader.as_ref()
    }

    pub fn resolver(&self) -> &LanguageResolver {
        &self.resolver
    }

    pub fn lookup(&self) -> &LookupService {
        &self.lookup
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Application languages in registration order.
    pub fn languages(&self) -> Vec<LanguageTag> {
        self.registry.languages()
    }

    /// Decide the language for one request.
    pub fn resolve(&self, signals: &LanguageSignals<'_>) -> Resolution {
        self.resolver.resolve(signals, &self.registry.load())
    }

    /// Translate for a resolved request.
    pub fn text<'a>(&self, ctx: &RequestLanguageContext, source: &'a str) -> Text<'a> {
        self.lookup.get_text(source, None, None, ctx.fallback_chain())
    }

    /// Translate with a context for a resolved request.
    pub fn text_in<'a>(&self, ctx: &RequestLanguageContext, context: &str, source: &'a str) -> Text<'a> {
        self.lookup.get_text(source, Some(context), None, ctx.fallback_chain())
    }

    /// Translate a singular/plural pair for a resolved request.
    pub fn plural_text<'a>(
        &self,
        ctx: &RequestLanguageContext,
        singular: &'a str,
        plural: &'a str,
        count: u64,
    ) -> Text<'a> {
        self.lookup
            .get_plural_text(singular, plural, None, count, ctx.fallback_chain())
    }

    /// Translate and fill `{name}` placeholders for a resolved request.
    pub fn text_args(&self, ctx: &RequestLanguageContext, source: &str, args: &[(&str, &str)]) -> String {
        self.lookup.get_text_args(source, None, ctx.fallback_chain(), args)
    }

    /// The `Set-Cookie` instruction the request asks for, if any.
    pub fn preference_cookie(&self, ctx: &RequestLanguageContext) -> Option<PreferenceCookie> {
        ctx.persist().map(|language| {
            PreferenceCookie::new(self.cookie_name.clone(), language.clone())
                .with_max_age(self.cookie_max_age_secs)
        })
    }

    /// Rebuild and swap the catalog at `path`.
    pub fn reload(&self, path: &Path) -> Result<Arc<Catalog>> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| I18nError::CatalogNotFound(path.display().to_string()))?;
        self.registry.reload_file(loader, path)
    }

    /// Whether the configuration asked for catalogs to be watched.
    pub fn watch_enabled(&self) -> bool {
        self.watch_enabled
    }

    /// Start reloading catalogs when their files change.
    ///
    /// Must be called from within a Tokio runtime.
    #[cfg(feature = "watch")]
    pub fn watch(&self) -> Result<crate::watcher::WatchHandle> {
        let loader = self
            .loader
            .clone()
            .ok_or_else(|| I18nError::CatalogNotFound("no catalog directory to watch".to_string()))?;

        crate::watcher::CatalogWatcher::new(Arc::clone(&self.registry), loader)
            .debounce(std::time::Duration::from_millis(self.watch_debounce_ms))
            .start()
    }

    /// Like [`Localizer::watch`], but only when `watch` is set in the
    /// configuration.
    #[cfg(feature = "watch")]
    pub fn watch_if_enabled(&self) -> Result<Option<crate::watcher::WatchHandle>> {
        if !self.watch_enabled {
            return Ok(None);
        }
        self.watch().map(Some)
    }
}

impl Localizing for Localizer {
    fn resolve_principal_language(&self, signals: &LanguageSignals<'_>) -> Resolution {
        self.resolve(signals)
    }

    fn get_text<'a>(
        &self,
        source: &'a str,
        context: Option<&str>,
        count: Option<u64>,
        chain: &[LanguageTag],
    ) -> Text<'a> {
        self.lookup.get_text(source, context, count, chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolutionSource;
    use std::fs;
    use tempfile::TempDir;

    fn tag(s: &str) -> LanguageTag {
        LanguageTag::parse(s).unwrap()
    }

    fn localizer() -> Localizer {
        let mut fr = Catalog::new(tag("fr"));
        fr.add("Hello", "Bonjour");
        fr.add_plural("%d item", ["%d article", "%d articles"]);
        fr.add_with_context("button", "Open", "Ouvrir");

        let registry = Arc::new(CatalogRegistry::from_catalogs([fr]));
        Localizer::new(registry, ResolverSettings::new(tag("en")))
    }

    #[test]
    fn test_default_language_is_registered() {
        let localizer = localizer();
        assert_eq!(localizer.languages(), vec![tag("fr"), tag("en")]);

        let ctx = localizer
            .resolve(&LanguageSignals::new("/en/"))
            .into_context()
            .unwrap();
        assert_eq!(ctx.source(), ResolutionSource::UrlPrefix);
        assert_eq!(localizer.text(&ctx, "Hello"), "Hello");
    }

    #[test]
    fn test_text_helpers() {
        let localizer = localizer();
        let ctx = localizer
            .resolve(&LanguageSignals::new("/fr/"))
            .into_context()
            .unwrap();

        assert_eq!(localizer.text(&ctx, "Hello"), "Bonjour");
        assert_eq!(localizer.text_in(&ctx, "button", "Open"), "Ouvrir");
        assert_eq!(localizer.plural_text(&ctx, "%d item", "%d items", 4), "%d articles");
        assert_eq!(localizer.text_args(&ctx, "Hi {name}", &[("name", "Léa")]), "Hi Léa");
    }

    #[test]
    fn test_trait_object() {
        let localizer: Box<dyn Localizing> = Box::new(localizer());
        let resolution = localizer.resolve_principal_language(&LanguageSignals::new("/fr/x"));
        let chain = resolution.context().unwrap().fallback_chain().to_vec();
        assert_eq!(localizer.get_text("Hello", None, None, &chain), "Bonjour");
    }

    #[test]
    fn test_preference_cookie_only_when_persisting() {
        let localizer = localizer().with_cookie_name("lang");

        let ctx = localizer
            .resolve(&LanguageSignals::new("/").with_query(Some("language=fr")))
            .into_context()
            .unwrap();
        let cookie = localizer.preference_cookie(&ctx).unwrap();
        assert!(cookie.to_header_value().starts_with("lang=fr;"));

        let ctx = localizer
            .resolve(&LanguageSignals::new("/fr/"))
            .into_context()
            .unwrap();
        assert!(localizer.preference_cookie(&ctx).is_none());
    }

    #[test]
    fn test_from_config_discovers_and_reloads() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("de.po"), "msgid \"Hello\"\nmsgstr \"Hallo\"\n").unwrap();
        fs::write(dir.path().join("en.json"), r#"{"Hello": "Hello there"}"#).unwrap();

        let config = LocalizationConfig {
            catalog_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let localizer = Localizer::from_config(&config).unwrap();
        assert_eq!(localizer.languages(), vec![tag("de"), tag("en")]);

        let ctx = localizer
            .resolve(&LanguageSignals::new("/").with_accept_language(Some("de-DE")))
            .into_context()
            .unwrap();
        assert_eq!(localizer.text(&ctx, "Hello"), "Hallo");

        let path = dir.path().join("de.po");
        fs::write(&path, "msgid \"Hello\"\nmsgstr \"Servus\"\n").unwrap();
        localizer.reload(&path).unwrap();
        assert_eq!(localizer.text(&ctx, "Hello"), "Servus");
    }

    #[test]
    fn test_from_config_explicit_languages() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fr.po"), "").unwrap();

        let config = LocalizationConfig {
            catalog_dir: dir.path().to_path_buf(),
            languages: vec!["fr".to_string(), "it".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            Localizer::from_config(&config),
            Err(I18nError::CatalogNotFound(_))
        ));

        let config = LocalizationConfig {
            default_language: "e!".to_string(),
            ..config
        };
        assert!(matches!(Localizer::from_config(&config), Err(I18nError::InvalidTag(_))));
    }

    #[cfg(feature = "watch")]
    #[test]
    fn test_watch_follows_config_flag() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fr.po"), "").unwrap();

        let config = LocalizationConfig {
            catalog_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let localizer = Localizer::from_config(&config).unwrap();
        assert!(!localizer.watch_enabled());
        assert!(localizer.watch_if_enabled().unwrap().is_none());

        let config = LocalizationConfig { watch: true, ..config };
        let localizer = Localizer::from_config(&config).unwrap();
        assert!(localizer.watch_enabled());
        // no Tokio runtime in a plain test
        assert!(matches!(localizer.watch_if_enabled(), Err(I18nError::NoRuntime)));
    }

    #[test]
    fn test_reload_without_loader() {
        let localizer = localizer();
        assert!(localizer.reload(Path::new("fr.po")).is_err());
    }
}
