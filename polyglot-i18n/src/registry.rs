//! Application Language Registry
//!
//! The registry owns one [`Catalog`] per application language and publishes
//! them as an immutable [`RegistrySnapshot`] behind an [`ArcSwap`]. Readers
//! take one atomic load per request and never block; writers build the next
//! snapshot off to the side and swap it in.
//!
//! Writers go through read-copy-update, so reloading `fr` and `de` at the
//! same time never loses either update. Two reloads of the same language:
//! the later swap wins.

use crate::loader::CatalogLoader;
use crate::{Catalog, LanguageTag, Result};
use arc_swap::{ArcSwap, Guard};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// One consistent view of the application languages and their catalogs.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    languages: Vec<LanguageTag>,
    catalogs: HashMap<LanguageTag, Arc<Catalog>>,
    generation: u64,
}

impl RegistrySnapshot {
    /// Application languages in registration order.
    #[inline]
    pub fn languages(&self) -> &[LanguageTag] {
        &self.languages
    }

    /// Catalog for exactly `tag`.
    #[inline]
    pub fn catalog(&self, tag: &LanguageTag) -> Option<&Arc<Catalog>> {
        self.catalogs.get(tag)
    }

    /// Whether `tag` is an application language.
    pub fn contains(&self, tag: &LanguageTag) -> bool {
        self.catalogs.contains_key(tag)
    }

    /// Number of swaps that produced this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    fn with_catalog(&self, catalog: Arc<Catalog>) -> Self {
        let tag = catalog.language().clone();
        let mut languages = self.languages.clone();
        if !self.catalogs.contains_key(&tag) {
            languages.push(tag.clone());
        }

        let mut catalogs = self.catalogs.clone();
        catalogs.insert(tag, catalog);

        Self {
            languages,
            catalogs,
            generation: self.generation + 1,
        }
    }

    fn without(&self, tag: &LanguageTag) -> Self {
        let mut catalogs = self.catalogs.clone();
        catalogs.remove(tag);

        Self {
            languages: self.languages.iter().filter(|t| *t != tag).cloned().collect(),
            catalogs,
            generation: self.generation + 1,
        }
    }
}

/// Shared, hot-swappable set of catalogs.
///
/// # Example
///
/// ```
/// use polyglot_i18n::{Catalog, CatalogRegistry, LanguageTag};
///
/// let registry = CatalogRegistry::new();
/// let fr: LanguageTag = "fr".parse().unwrap();
///
/// let mut catalog = Catalog::new(fr.clone());
/// catalog.add("Hello", "Bonjour");
/// registry.insert(catalog);
///
/// let snapshot = registry.load();
/// assert_eq!(snapshot.languages(), &[fr]);
/// ```
#[derive(Debug)]
pub struct CatalogRegistry {
    current: ArcSwap<RegistrySnapshot>,
}

impl CatalogRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RegistrySnapshot::default()),
        }
    }

    /// Create a registry holding `catalogs`, registered in iteration order.
    pub fn from_catalogs(catalogs: impl IntoIterator<Item = Catalog>) -> Self {
        let mut snapshot = RegistrySnapshot::default();
        for catalog in catalogs {
            snapshot = snapshot.with_catalog(Arc::new(catalog));
        }
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Borrow the current snapshot for a short read.
    ///
    /// Hold the guard for one request at most; use [`snapshot`](Self::snapshot)
    /// to keep it longer.
    #[inline]
    pub fn load(&self) -> Guard<Arc<RegistrySnapshot>> {
        self.current.load()
    }

    /// Take an owned reference to the current snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current.load_full()
    }

    /// Publish a catalog, replacing any catalog for the same language.
    ///
    /// Returns the replaced catalog.
    pub fn insert(&self, catalog: Catalog) -> Option<Arc<Catalog>> {
        self.publish(Arc::new(catalog))
    }

    fn publish(&self, catalog: Arc<Catalog>) -> Option<Arc<Catalog>> {
        let tag = catalog.language().clone();
        let previous = self
            .current
            .rcu(|snapshot| snapshot.with_catalog(Arc::clone(&catalog)));
        previous.catalog(&tag).cloned()
    }

    /// Remove a language and its catalog.
    pub fn remove(&self, tag: &LanguageTag) -> Option<Arc<Catalog>> {
        if !self.load().contains(tag) {
            return None;
        }
        let previous = self.current.rcu(|snapshot| snapshot.without(tag));
        previous.catalog(tag).cloned()
    }

    /// Application languages in registration order.
    pub fn languages(&self) -> Vec<LanguageTag> {
        self.load().languages().to_vec()
    }

    /// Rebuild the catalog at `path` and swap it in.
    ///
    /// If the file cannot be read or decoded, the current catalog stays in
    /// place and the error is returned.
    pub fn reload_file(&self, loader: &CatalogLoader, path: &Path) -> Result<Arc<Catalog>> {
        let catalog = match loader.load_file(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Catalog reload failed; keeping previous catalog");
                return Err(e);
            }
        };

        let catalog = Arc::new(catalog);
        self.publish(Arc::clone(&catalog));

        info!(
            language = %catalog.language(),
            entries = catalog.len(),
            generation = self.load().generation(),
            "Catalog reloaded"
        );
        Ok(catalog)
    }
}

impl Default for CatalogRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn tag(s: &str) -> LanguageTag {
        LanguageTag::parse(s).unwrap()
    }

    fn catalog(lang: &str, hello: &str) -> Catalog {
        let mut catalog = Catalog::new(tag(lang));
        catalog.add("Hello", hello);
        catalog
    }

    #[test]
    fn test_registration_order_and_replace() {
        let registry = CatalogRegistry::from_catalogs([catalog("en", "Hello"), catalog("fr", "Bonjour")]);
        assert_eq!(registry.languages(), vec![tag("en"), tag("fr")]);

        let old = registry.insert(catalog("en", "Hi")).unwrap();
        assert_eq!(old.lookup("Hello", None).and_then(|e| e.singular()).map(|s| &**s), Some("Hello"));

        // replacing keeps the original position
        assert_eq!(registry.languages(), vec![tag("en"), tag("fr")]);
    }

    #[test]
    fn test_remove() {
        let registry = CatalogRegistry::from_catalogs([catalog("en", "Hello"), catalog("fr", "Bonjour")]);
        assert!(registry.remove(&tag("en")).is_some());
        assert!(registry.remove(&tag("en")).is_none());
        assert_eq!(registry.languages(), vec![tag("fr")]);
    }

    #[test]
    fn test_generation_increases() {
        let registry = CatalogRegistry::new();
        let start = registry.load().generation();
        registry.insert(catalog("de", "Hallo"));
        registry.insert(catalog("de", "Servus"));
        assert_eq!(registry.load().generation(), start + 2);
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let registry = CatalogRegistry::from_catalogs([catalog("fr", "Bonjour")]);
        let before = registry.snapshot();

        registry.insert(catalog("fr", "Salut"));

        let old = before.catalog(&tag("fr")).unwrap();
        assert_eq!(old.lookup("Hello", None).and_then(|e| e.singular()).map(|s| &**s), Some("Bonjour"));

        let now = registry.load();
        let new = now.catalog(&tag("fr")).unwrap();
        assert_eq!(new.lookup("Hello", None).and_then(|e| e.singular()).map(|s| &**s), Some("Salut"));
    }

    #[test]
    fn test_concurrent_inserts_of_different_languages() {
        let registry = Arc::new(CatalogRegistry::new());
        let langs = ["en", "fr", "de", "es", "it", "nl", "pl", "sv"];

        let handles: Vec<_> = langs
            .iter()
            .map(|lang| {
                let registry = Arc::clone(&registry);
                let lang = lang.to_string();
                thread::spawn(move || {
                    for i in 0..50 {
                        registry.insert(catalog(&lang, &format!("{}-{}", lang, i)));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.load();
        assert_eq!(snapshot.len(), langs.len());
        for lang in langs {
            let hello = snapshot.catalog(&tag(lang)).unwrap().lookup("Hello", None).unwrap();
            assert_eq!(hello.singular().map(|s| s.to_string()), Some(format!("{}-49", lang)));
        }
    }

    #[test]
    fn test_reload_file_keeps_previous_on_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fr.po");
        fs::write(&path, "msgid \"Hello\"\nmsgstr \"Bonjour\"\n").unwrap();

        let loader = CatalogLoader::new(dir.path());
        let registry = CatalogRegistry::new();
        registry.reload_file(&loader, &path).unwrap();

        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(registry.reload_file(&loader, &path).is_err());

        fs::remove_file(&path).unwrap();
        assert!(registry.reload_file(&loader, &path).is_err());

        let snapshot = registry.load();
        let hello = snapshot.catalog(&tag("fr")).unwrap().lookup("Hello", None).unwrap();
        assert_eq!(hello.singular().map(|s| &**s), Some("Bonjour"));
    }
}
