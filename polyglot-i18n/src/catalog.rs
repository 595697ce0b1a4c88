//! Translation Catalogs
//!
//! A [`Catalog`] holds every translation for one language. It is built once
//! (from a PO file, a JSON file, or programmatically) and is never mutated
//! after it has been published to a [`CatalogRegistry`](crate::CatalogRegistry);
//! reloading builds a fresh catalog and swaps it in.

use crate::plural::{PluralCategory, PluralRules, builtin_rules};
use crate::po::{self, MAX_PLURAL_FORMS, ParseWarning, PoRecord};
use crate::{I18nError, LanguageTag, Result};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Separates context from source text in flat catalog keys (gettext convention).
pub const CONTEXT_SEPARATOR: char = '\u{4}';

/// On-disk catalog formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogFormat {
    /// gettext `.po`
    Po,
    /// Flat JSON object
    Json,
}

impl CatalogFormat {
    /// Format for a file extension, if it is a catalog at all.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "po" => Some(CatalogFormat::Po),
            "json" => Some(CatalogFormat::Json),
            _ => None,
        }
    }

    /// Format for a path, judged by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// The translation of one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEntry {
    /// A single translated string
    Single(Arc<str>),
    /// Plural forms in catalog order; a missing form is `None`
    Plural(SmallVec<[Option<Arc<str>>; 3]>),
}

impl TranslationEntry {
    /// The singular (first) form.
    pub fn singular(&self) -> Option<&Arc<str>> {
        match self {
            Self::Single(text) => Some(text),
            Self::Plural(forms) => forms.first().and_then(Option::as_ref),
        }
    }

    /// Plural form `index`, falling back to the singular form when the
    /// catalog does not provide that form.
    pub fn form(&self, index: usize) -> Option<&Arc<str>> {
        match self {
            Self::Single(text) => Some(text),
            Self::Plural(forms) => forms
                .get(index)
                .and_then(Option::as_ref)
                .or_else(|| self.singular()),
        }
    }

    /// Pick the form for an optional count under `rules`.
    #[inline]
    pub fn select(&self, count: Option<u64>, rules: &dyn PluralRules) -> Option<&Arc<str>> {
        match count {
            Some(n) => self.form(rules.index(n)),
            None => self.singular(),
        }
    }

    /// Whether the entry carries plural forms.
    pub fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }
}

/// Every translation for one language.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: LanguageTag,
    entries: HashMap<String, TranslationEntry>,
    contextual: HashMap<String, HashMap<String, TranslationEntry>>,
    metadata: Vec<(String, String)>,
    warnings: Vec<ParseWarning>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(language: LanguageTag) -> Self {
        Self {
            language,
            entries: HashMap::new(),
            contextual: HashMap::new(),
            metadata: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Load a PO catalog from raw bytes.
    ///
    /// Only an undecodable file fails as a whole; malformed records are
    /// skipped and reported through [`Catalog::warnings`].
    pub fn load(language: LanguageTag, source: &[u8]) -> Result<Self> {
        let text = decode(source)?;
        Ok(Self::from_po(language, text))
    }

    /// Load a catalog in the given format from raw bytes.
    pub fn load_format(
        language: LanguageTag,
        source: &[u8],
        format: CatalogFormat,
        rules: &dyn PluralRules,
    ) -> Result<Self> {
        let text = decode(source)?;
        match format {
            CatalogFormat::Po => Ok(Self::from_po(language, text)),
            CatalogFormat::Json => Self::from_json_with_rules(language, text, rules),
        }
    }

    /// Build a catalog from PO source text.
    pub fn from_po(language: LanguageTag, text: &str) -> Self {
        let doc = po::parse(text);
        let mut catalog = Self::new(language);
        catalog.metadata = doc.header;

        for record in doc.records {
            catalog.insert_record(record);
        }

        catalog.warnings.extend(doc.warnings);
        catalog.log_warnings();
        catalog
    }

    /// Build a catalog from a flat JSON object.
    ///
    /// ```json
    /// {
    ///   "Hello": "Bonjour",
    ///   "%d file": { "one": "%d fichier", "other": "%d fichiers" },
    ///   "month\u0004May": "Mai"
    /// }
    /// ```
    pub fn from_json(language: LanguageTag, json: &str) -> Result<Self> {
        let rules = builtin_rules(language.language());
        Self::from_json_with_rules(language, json, rules)
    }

    /// Build a catalog from JSON, mapping plural categories with `rules`.
    pub fn from_json_with_rules(language: LanguageTag, json: &str, rules: &dyn PluralRules) -> Result<Self> {
        let data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut catalog = Self::new(language);

        for (key, value) in data {
            let (context, source) = match key.split_once(CONTEXT_SEPARATOR) {
                Some((context, source)) => (Some(context.to_string()), source.to_string()),
                None => (None, key),
            };

            match value {
                serde_json::Value::String(text) => {
                    if !text.is_empty() {
                        catalog.insert(context.as_deref(), source, TranslationEntry::Single(text.into()));
                    }
                }
                serde_json::Value::Object(obj) => {
                    let mut forms: SmallVec<[Option<Arc<str>>; 3]> = SmallVec::new();
                    for (form, msg) in obj {
                        let serde_json::Value::String(text) = msg else {
                            catalog
                                .warnings
                                .push(ParseWarning::new(format!("'{}': form '{}' is not a string", source, form)));
                            continue;
                        };
                        let index = PluralCategory::parse(&form)
                            .ok()
                            .and_then(|category| rules.index_of(category));
                        let stored = index.is_some_and(|index| set_form(&mut forms, index, text));
                        if !stored {
                            catalog.warnings.push(ParseWarning::new(format!(
                                "'{}': unknown plural form '{}' for {}",
                                source, form, catalog.language
                            )));
                        }
                    }
                    if forms.iter().any(Option::is_some) {
                        catalog.insert(context.as_deref(), source, TranslationEntry::Plural(forms));
                    }
                }
                _ => catalog
                    .warnings
                    .push(ParseWarning::new(format!("'{}': unsupported value", source))),
            }
        }

        catalog.log_warnings();
        Ok(catalog)
    }

    fn insert_record(&mut self, record: PoRecord) {
        if record.fuzzy {
            debug!(language = %self.language, line = record.line, "Skipping fuzzy entry");
            return;
        }

        let entry = if record.id_plural.is_some() || !record.forms.is_empty() {
            let mut forms: SmallVec<[Option<Arc<str>>; 3]> = SmallVec::new();
            for (index, text) in record.forms {
                set_form(&mut forms, index, text);
            }
            if forms.is_empty() {
                if let Some(text) = record.translation.filter(|t| !t.is_empty()) {
                    set_form(&mut forms, 0, text);
                }
            }
            if !forms.iter().any(Option::is_some) {
                return;
            }
            TranslationEntry::Plural(forms)
        } else {
            match record.translation {
                Some(text) if !text.is_empty() => TranslationEntry::Single(text.into()),
                _ => return,
            }
        };

        if self.insert(record.context.as_deref(), record.id.clone(), entry).is_some() {
            self.warnings.push(ParseWarning::at(
                record.line,
                format!("duplicate entry '{}' replaces an earlier one", record.id),
            ));
        }
    }

    fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!(language = %self.language, "Skipping malformed catalog record: {}", warning);
        }
    }

    /// Insert an entry, returning the one it replaced.
    pub fn insert(
        &mut self,
        context: Option<&str>,
        source: impl Into<String>,
        entry: TranslationEntry,
    ) -> Option<TranslationEntry> {
        match context {
            None => self.entries.insert(source.into(), entry),
            Some(context) => self
                .contextual
                .entry(context.to_string())
                .or_default()
                .insert(source.into(), entry),
        }
    }

    /// Add a single translation.
    pub fn add(&mut self, source: impl Into<String>, translation: impl Into<String>) {
        let text: String = translation.into();
        self.insert(None, source, TranslationEntry::Single(text.into()));
    }

    /// Add a translation scoped by a context.
    pub fn add_with_context(
        &mut self,
        context: &str,
        source: impl Into<String>,
        translation: impl Into<String>,
    ) {
        let text: String = translation.into();
        self.insert(Some(context), source, TranslationEntry::Single(text.into()));
    }

    /// Add plural forms in catalog order.
    pub fn add_plural<I, S>(&mut self, source: impl Into<String>, forms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let forms = forms
            .into_iter()
            .map(|form| {
                let text: String = form.into();
                (!text.is_empty()).then(|| Arc::<str>::from(text))
            })
            .collect();
        self.insert(None, source, TranslationEntry::Plural(forms));
    }

    /// Exact lookup by source text and optional context.
    #[inline]
    pub fn lookup(&self, source: &str, context: Option<&str>) -> Option<&TranslationEntry> {
        match context {
            None => self.entries.get(source),
            Some(context) => self.contextual.get(context).and_then(|scoped| scoped.get(source)),
        }
    }

    /// Language of this catalog.
    pub fn language(&self) -> &LanguageTag {
        &self.language
    }

    /// Number of entries, contextual ones included.
    pub fn len(&self) -> usize {
        self.entries.len() + self.contextual.values().map(HashMap::len).sum::<usize>()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header value, e.g. `Project-Id-Version`.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// `nplurals` declared by the `Plural-Forms` header.
    pub fn declared_plural_count(&self) -> Option<usize> {
        self.metadata("Plural-Forms")?
            .split(';')
            .filter_map(|part| part.trim().strip_prefix("nplurals="))
            .find_map(|n| n.trim().parse().ok())
    }

    /// Records skipped while loading.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

// Returns false for an index beyond MAX_PLURAL_FORMS.
fn set_form(forms: &mut SmallVec<[Option<Arc<str>>; 3]>, index: usize, text: String) -> bool {
    if index >= MAX_PLURAL_FORMS {
        return false;
    }
    if forms.len() <= index {
        forms.resize(index + 1, None);
    }
    if !text.is_empty() {
        forms[index] = Some(text.into());
    }
    true
}

fn decode(source: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(source)
        .map_err(|e| I18nError::ParseError(format!("catalog is not valid UTF-8: {}", e)))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}
