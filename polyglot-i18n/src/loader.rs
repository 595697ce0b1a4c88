//! Catalog discovery and loading.
//!
//! Catalogs live under one directory in any of these layouts:
//!
//! ```text
//! locales/fr.po
//! locales/fr-CA.json
//! locales/pt_BR/LC_MESSAGES/messages.po
//! ```
//!
//! Template files (`.pot`) are never loaded. A file name only names a
//! language when it is an ISO 639-1 code, a three-letter ISO 639-2/3 code,
//! or a language the loader was told about, so stray files such as
//! `config.json` are skipped.

use crate::catalog::{Catalog, CatalogFormat};
use crate::iso639::is_iso639_1;
use crate::{I18nError, LanguageTag, PluralRuleBook, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LC_MESSAGES: &str = "LC_MESSAGES";

/// Finds and loads catalog files under a directory.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    dir: PathBuf,
    domain: String,
    plural_rules: PluralRuleBook,
    languages: Vec<LanguageTag>,
}

impl CatalogLoader {
    /// Loader for `dir` with the default `messages` domain.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            domain: "messages".to_string(),
            plural_rules: PluralRuleBook::new(),
            languages: Vec::new(),
        }
    }

    /// Set the gettext domain used for `LC_MESSAGES` layouts.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Plural rules used to map JSON plural categories to form indices.
    pub fn with_plural_rules(mut self, rules: PluralRuleBook) -> Self {
        self.plural_rules = rules;
        self
    }

    /// Languages accepted from file names in addition to ISO 639 codes.
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = LanguageTag>) -> Self {
        self.languages.extend(languages);
        self
    }

    /// Root catalog directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All catalogs found under the directory, ordered by file name.
    ///
    /// Entries whose names are not language tags are skipped. When a language
    /// has more than one file, the first in name order wins.
    pub fn discover(&self) -> Result<Vec<(LanguageTag, PathBuf)>> {
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for path in entries {
            let candidate = if path.is_dir() {
                let nested = path.join(LC_MESSAGES).join(format!("{}.po", self.domain));
                if !nested.is_file() {
                    continue;
                }
                nested
            } else if CatalogFormat::from_path(&path).is_some() {
                path
            } else {
                continue;
            };

            match self.tag_for_path(&candidate) {
                Ok(tag) => {
                    if seen.insert(tag.clone()) {
                        found.push((tag, candidate));
                    } else {
                        warn!(path = %candidate.display(), "Ignoring second catalog for {}", tag);
                    }
                }
                Err(e) => debug!(path = %candidate.display(), "Skipping: {}", e),
            }
        }

        Ok(found)
    }

    /// Path of the catalog for `tag`, trying every supported layout.
    pub fn path_for(&self, tag: &LanguageTag) -> Option<PathBuf> {
        let dashed = tag.to_string();
        let underscored = dashed.replace('-', "_");

        let mut names = vec![dashed];
        if underscored != names[0] {
            names.push(underscored);
        }

        names.iter().find_map(|name| {
            [
                self.dir.join(format!("{}.po", name)),
                self.dir.join(format!("{}.json", name)),
                self.dir
                    .join(name)
                    .join(LC_MESSAGES)
                    .join(format!("{}.po", self.domain)),
            ]
            .into_iter()
            .find(|path| path.is_file())
        })
    }

    /// The language a catalog path belongs to.
    pub fn tag_for_path(&self, path: &Path) -> Result<LanguageTag> {
        let unknown = || I18nError::UnknownCatalogPath(path.display().to_string());

        if CatalogFormat::from_path(path).is_none() {
            return Err(I18nError::UnsupportedFormat(path.display().to_string()));
        }

        let parent = path.parent();
        let in_lc_messages = parent
            .and_then(Path::file_name)
            .is_some_and(|name| name == LC_MESSAGES);

        let name = if in_lc_messages {
            if path.file_stem().and_then(|s| s.to_str()) != Some(self.domain.as_str()) {
                return Err(unknown());
            }
            parent
                .and_then(Path::parent)
                .and_then(Path::file_name)
                .and_then(|s| s.to_str())
        } else {
            path.file_stem().and_then(|s| s.to_str())
        };

        let name = name.ok_or_else(unknown)?;
        let tag = LanguageTag::parse(name).map_err(|_| unknown())?;
        if !self.is_known_language(&tag) {
            return Err(unknown());
        }
        Ok(tag)
    }

    fn is_known_language(&self, tag: &LanguageTag) -> bool {
        let language = tag.language();
        let coded = match language.len() {
            2 => is_iso639_1(language),
            3 => true,
            _ => false,
        };
        coded || self.languages.iter().any(|known| known.language() == language)
    }

    /// Whether a changed path could be one of our catalogs.
    pub fn is_catalog_path(&self, path: &Path) -> bool {
        self.tag_for_path(path).is_ok()
    }

    /// Load one catalog file.
    pub fn load_file(&self, path: &Path) -> Result<Catalog> {
        let tag = self.tag_for_path(path)?;
        let format = CatalogFormat::from_path(path)
            .ok_or_else(|| I18nError::UnsupportedFormat(path.display().to_string()))?;
        let bytes = fs::read(path)?;

        let rules = self.plural_rules.rules_for(&tag);
        let catalog = Catalog::load_format(tag, &bytes, format, rules)?;

        debug!(
            path = %path.display(),
            language = %catalog.language(),
            entries = catalog.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Load every discovered catalog.
    pub fn load_all(&self) -> Result<Vec<Catalog>> {
        self.discover()?
            .into_iter()
            .map(|(_, path)| self.load_file(&path))
            .collect()
    }

    /// Load the catalogs for an explicit list of languages.
    pub fn load_languages(&self, languages: &[LanguageTag]) -> Result<Vec<Catalog>> {
        languages
            .iter()
            .map(|tag| {
                let path = self
                    .path_for(tag)
                    .ok_or_else(|| I18nError::CatalogNotFound(tag.to_string()))?;
                self.load_file(&path)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tag(s: &str) -> LanguageTag {
        LanguageTag::parse(s).unwrap()
    }

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discover_layouts() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr.po", "msgid \"Hello\"\nmsgstr \"Bonjour\"\n");
        write(dir.path(), "de.json", r#"{"Hello": "Hallo"}"#);
        write(dir.path(), "pt_BR/LC_MESSAGES/messages.po", "msgid \"Hello\"\nmsgstr \"Olá\"\n");
        write(dir.path(), "messages.pot", "msgid \"Hello\"\nmsgstr \"\"\n");
        write(dir.path(), "README.md", "# translations");
        write(dir.path(), "static/app.css", "body {}");

        let loader = CatalogLoader::new(dir.path());
        let found: Vec<String> = loader
            .discover()
            .unwrap()
            .into_iter()
            .map(|(tag, _)| tag.to_string())
            .collect();

        assert_eq!(found, vec!["de", "fr", "pt-BR"]);
    }

    #[test]
    fn test_tag_for_path() {
        let loader = CatalogLoader::new("/srv/locales").with_domain("site");

        assert_eq!(loader.tag_for_path(Path::new("/srv/locales/fr-CA.po")).unwrap(), tag("fr-CA"));
        assert_eq!(
            loader
                .tag_for_path(Path::new("/srv/locales/zh_TW/LC_MESSAGES/site.po"))
                .unwrap(),
            tag("zh-Hant")
        );
        assert!(matches!(
            loader.tag_for_path(Path::new("/srv/locales/fr/LC_MESSAGES/other.po")),
            Err(I18nError::UnknownCatalogPath(_))
        ));
        assert!(matches!(
            loader.tag_for_path(Path::new("/srv/locales/messages.pot")),
            Err(I18nError::UnsupportedFormat(_))
        ));
        assert!(loader.tag_for_path(Path::new("/srv/locales/x.po")).is_err());
    }

    #[test]
    fn test_stray_files_are_not_languages() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr.po", "");
        write(dir.path(), "fil.po", "");
        write(dir.path(), "config.json", "{}");
        write(dir.path(), "messages.po", "");
        write(dir.path(), "xx.po", "");

        let loader = CatalogLoader::new(dir.path());
        let found: Vec<String> = loader
            .discover()
            .unwrap()
            .into_iter()
            .map(|(tag, _)| tag.to_string())
            .collect();
        assert_eq!(found, vec!["fil", "fr"]);

        assert!(matches!(
            loader.tag_for_path(&dir.path().join("config.json")),
            Err(I18nError::UnknownCatalogPath(_))
        ));

        let loader = loader.with_languages([tag("klingon")]);
        write(dir.path(), "klingon.po", "");
        assert_eq!(loader.tag_for_path(&dir.path().join("klingon.po")).unwrap(), tag("klingon"));
    }

    #[test]
    fn test_path_for_tries_underscore_and_gettext_layout() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en_GB.po", "");
        write(dir.path(), "ja/LC_MESSAGES/messages.po", "");

        let loader = CatalogLoader::new(dir.path());
        assert!(loader.path_for(&tag("en-GB")).is_some());
        assert!(loader.path_for(&tag("ja")).is_some());
        assert!(loader.path_for(&tag("ko")).is_none());
    }

    #[test]
    fn test_load_languages() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr.po", "msgid \"Hello\"\nmsgstr \"Bonjour\"\n");

        let loader = CatalogLoader::new(dir.path());
        let catalogs = loader.load_languages(&[tag("fr")]).unwrap();
        assert_eq!(catalogs.len(), 1);
        assert!(catalogs[0].lookup("Hello", None).is_some());

        assert!(matches!(
            loader.load_languages(&[tag("it")]),
            Err(I18nError::CatalogNotFound(_))
        ));
    }

    #[test]
    fn test_load_json_uses_language_rules() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "cs.json",
            r#"{"file": {"one": "soubor", "few": "soubory", "other": "souborů"}}"#,
        );

        let catalog = CatalogLoader::new(dir.path()).load_file(&path).unwrap();
        let entry = catalog.lookup("file", None).unwrap();
        assert_eq!(entry.form(1).map(|s| &**s), Some("soubory"));
        assert_eq!(entry.form(2).map(|s| &**s), Some("souborů"));
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let loader = CatalogLoader::new("/definitely/not/here");
        assert!(matches!(loader.discover(), Err(I18nError::IoError(_))));
    }
}
