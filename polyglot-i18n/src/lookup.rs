//! Text lookup across a fallback chain.
//!
//! A lookup walks the chain (principal language, its broader forms that
//! have catalogs, then the configured fallback language) and returns the
//! first translation it finds. A miss everywhere returns the source text
//! unchanged, so lookups never fail.
//!
//! Each lookup reads one registry snapshot from start to finish; a reload
//! that lands mid-lookup is seen by the next lookup, never half of this one.

use crate::plural::PluralRuleBook;
use crate::registry::{CatalogRegistry, RegistrySnapshot};
use crate::LanguageTag;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Languages to try for one request, most preferred first.
pub type FallbackChain = SmallVec<[LanguageTag; 4]>;

/// Result of a lookup: a shared translation or the borrowed source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text<'a> {
    /// Found in a catalog
    Translated(Arc<str>),
    /// Nothing in the chain matched
    Untranslated(&'a str),
}

impl Text<'_> {
    /// Whether a catalog supplied this text.
    pub fn is_translated(&self) -> bool {
        matches!(self, Text::Translated(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Text::Translated(text) => text,
            Text::Untranslated(text) => text,
        }
    }

    pub fn into_string(self) -> String {
        self.as_str().to_string()
    }
}

impl Deref for Text<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Text<'_> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Text<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for Text<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Text<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Build the fallback chain for `principal` against a snapshot.
///
/// Only languages with a catalog are included, each at most once:
/// `fr-CA` with catalogs for `fr-CA`, `fr` and `en` (fallback `en`) gives
/// `[fr-CA, fr, en]`.
pub fn fallback_chain(
    principal: &LanguageTag,
    snapshot: &RegistrySnapshot,
    fallback: Option<&LanguageTag>,
) -> FallbackChain {
    let mut chain = FallbackChain::new();

    let mut push = |tag: &LanguageTag| {
        if snapshot.contains(tag) && !chain.contains(tag) {
            chain.push(tag.clone());
        }
    };

    push(principal);
    for broader in principal.broader() {
        push(&broader);
    }
    if let Some(fallback) = fallback {
        push(fallback);
    }

    chain
}

/// Look up a translation in one snapshot.
///
/// With a `count`, the form is chosen by the plural rule of the catalog that
/// holds the entry; a missing form falls back to the singular.
pub fn lookup_in(
    snapshot: &RegistrySnapshot,
    rules: &PluralRuleBook,
    source: &str,
    context: Option<&str>,
    count: Option<u64>,
    chain: &[LanguageTag],
) -> Option<Arc<str>> {
    chain.iter().find_map(|tag| {
        let catalog = snapshot.catalog(tag)?;
        let entry = catalog.lookup(source, context)?;
        entry.select(count, rules.rules_for(tag)).cloned()
    })
}

/// Replace `{name}` placeholders with argument values.
///
/// Unknown placeholders are left as they are. Values are inserted verbatim
/// and never re-scanned.
///
/// ```
/// use polyglot_i18n::interpolate;
///
/// let text = interpolate("Hello, {name}! {missing}", &[("name", "Ada")]);
/// assert_eq!(text, "Hello, Ada! {missing}");
/// ```
pub fn interpolate<'a>(template: &'a str, args: &[(&str, &str)]) -> Cow<'a, str> {
    if args.is_empty() || !template.contains('{') {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            args.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Lookup entry point over a shared registry.
#[derive(Debug, Clone)]
pub struct LookupService {
    registry: Arc<CatalogRegistry>,
    plural_rules: PluralRuleBook,
    fallback: Option<LanguageTag>,
}

impl LookupService {
    pub fn new(registry: Arc<CatalogRegistry>) -> Self {
        Self {
            registry,
            plural_rules: PluralRuleBook::new(),
            fallback: None,
        }
    }

    /// Language tried after the principal language's family.
    pub fn with_fallback(mut self, fallback: Option<LanguageTag>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_plural_rules(mut self, rules: PluralRuleBook) -> Self {
        self.plural_rules = rules;
        self
    }

    pub fn registry(&self) -> &Arc<CatalogRegistry> {
        &self.registry
    }

    pub fn plural_rules(&self) -> &PluralRuleBook {
        &self.plural_rules
    }

    /// Fallback chain for `principal` against the current snapshot.
    pub fn chain_for(&self, principal: &LanguageTag) -> FallbackChain {
        fallback_chain(principal, &self.registry.load(), self.fallback.as_ref())
    }

    /// Translate `source`, returning it unchanged when nothing matches.
    #[inline]
    pub fn get_text<'a>(
        &self,
        source: &'a str,
        context: Option<&str>,
        count: Option<u64>,
        chain: &[LanguageTag],
    ) -> Text<'a> {
        let snapshot = self.registry.load();
        match lookup_in(&snapshot, &self.plural_rules, source, context, count, chain) {
            Some(text) => Text::Translated(text),
            None => Text::Untranslated(source),
        }
    }

    /// Translate a singular/plural pair.
    ///
    /// The catalog entry is keyed by `singular`. When nothing matches, the
    /// source `singular` is returned for a count of one and `plural`
    /// otherwise.
    pub fn get_plural_text<'a>(
        &self,
        singular: &'a str,
        plural: &'a str,
        context: Option<&str>,
        count: u64,
        chain: &[LanguageTag],
    ) -> Text<'a> {
        let snapshot = self.registry.load();
        match lookup_in(&snapshot, &self.plural_rules, singular, context, Some(count), chain) {
            Some(text) => Text::Translated(text),
            None if count == 1 => Text::Untranslated(singular),
            None => Text::Untranslated(plural),
        }
    }

    /// Translate `source` and fill `{name}` placeholders.
    pub fn get_text_args(
        &self,
        source: &str,
        context: Option<&str>,
        chain: &[LanguageTag],
        args: &[(&str, &str)],
    ) -> String {
        let text = self.get_text(source, context, None, chain);
        interpolate(&text, args).into_owned()
    }
}
