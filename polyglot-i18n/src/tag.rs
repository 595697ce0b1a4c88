//! Language Tags and Accept-Language Parsing
//!
//! A [`LanguageTag`] is the normalized form of a BCP 47 style identifier
//! (`fr-CA`, `zh-Hant`, `sr-Latn-RS`). Every signal the resolver looks at
//! (URL prefix, cookie, `Accept-Language`) and every catalog is keyed by one.
//!
//! Subtags are stored inline, so cloning or comparing a realistic tag never
//! allocates.

use crate::{I18nError, Result};
use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed, case-normalized language tag.
///
/// Case is normalized at construction (language and variants lowercase,
/// script title case, region uppercase), which makes the derived equality
/// the case-insensitive subtag comparison the matcher relies on.
///
/// The historical Chinese tags `zh-CN` and `zh-TW` are canonicalized to
/// `zh-Hans` and `zh-Hant`.
///
/// # Examples
///
/// ```
/// use polyglot_i18n::LanguageTag;
///
/// let tag = LanguageTag::parse("fr_ca").unwrap();
/// assert_eq!(tag.to_string(), "fr-CA");
///
/// let legacy = LanguageTag::parse("zh-CN").unwrap();
/// assert_eq!(legacy, LanguageTag::parse("zh-Hans").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag {
    language: CompactString,
    script: Option<CompactString>,
    region: Option<CompactString>,
    variants: SmallVec<[CompactString; 2]>,
}

impl LanguageTag {
    /// Parse a tag such as `en`, `en-US`, `zh-Hans-CN`, `de_DE.UTF-8`.
    ///
    /// Subtags after the language are classified by shape: four letters is a
    /// script, two letters or three digits is a region, anything else is a
    /// variant.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || I18nError::InvalidTag(text.to_string());

        // POSIX locale decorations: "de_DE.UTF-8", "ca_ES@valencia"
        let core = text.trim().split(['.', '@']).next().unwrap_or_default();
        let mut parts = core.split(['-', '_']);

        let language = parts.next().ok_or_else(invalid)?;
        if !(2..=8).contains(&language.len()) || !language.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut tag = Self {
            language: CompactString::from(language.to_ascii_lowercase()),
            script: None,
            region: None,
            variants: SmallVec::new(),
        };

        for part in parts {
            if part.is_empty() || part.len() > 8 || !part.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(invalid());
            }

            let alphabetic = part.bytes().all(|b| b.is_ascii_alphabetic());
            let numeric = part.bytes().all(|b| b.is_ascii_digit());
            let positional = tag.variants.is_empty();

            if part.len() == 4 && alphabetic && tag.script.is_none() && tag.region.is_none() && positional {
                tag.script = Some(title_case(part));
            } else if ((part.len() == 2 && alphabetic) || (part.len() == 3 && numeric))
                && tag.region.is_none()
                && positional
            {
                tag.region = Some(CompactString::from(part.to_ascii_uppercase()));
            } else {
                tag.variants.push(CompactString::from(part.to_ascii_lowercase()));
            }
        }

        Ok(tag.canonicalize())
    }

    /// Create a tag from already-separated subtags.
    pub fn from_parts(language: &str, script: Option<&str>, region: Option<&str>) -> Result<Self> {
        let mut builder = LanguageTagBuilder::new().language(language);
        if let Some(script) = script {
            builder = builder.script(script);
        }
        if let Some(region) = region {
            builder = builder.region(region);
        }
        builder.build()
    }

    fn canonicalize(mut self) -> Self {
        if self.language == "zh" && self.script.is_none() {
            let script = match self.region.as_deref() {
                Some("CN") => Some("Hans"),
                Some("TW") => Some("Hant"),
                _ => None,
            };
            if let Some(script) = script {
                self.script = Some(CompactString::const_new(script));
                self.region = None;
            }
        }
        self
    }

    /// Language subtag (lowercase ISO 639 code).
    #[inline]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Script subtag, e.g. `Hans`.
    #[inline]
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// Region subtag, e.g. `CA` or `419`.
    #[inline]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Variant subtags in order.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.as_str())
    }

    /// Whether the tag carries nothing but a language subtag.
    #[inline]
    pub fn is_language_only(&self) -> bool {
        self.script.is_none() && self.region.is_none() && self.variants.is_empty()
    }

    /// Get the tag string (e.g., "en-US").
    pub fn tag(&self) -> String {
        self.to_string()
    }

    /// Get language-only tag (strips script, region and variants).
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            script: None,
            region: None,
            variants: SmallVec::new(),
        }
    }

    /// Progressively broader tags of the same language, most specific first,
    /// excluding `self`.
    ///
    /// `sr-Latn-RS-ekavsk` yields `sr-Latn-RS`, `sr-Latn`, `sr-RS`, `sr`.
    pub fn broader(&self) -> SmallVec<[LanguageTag; 4]> {
        let base = |script: Option<&CompactString>, region: Option<&CompactString>| Self {
            language: self.language.clone(),
            script: script.cloned(),
            region: region.cloned(),
            variants: SmallVec::new(),
        };

        let candidates = [
            base(self.script.as_ref(), self.region.as_ref()),
            base(self.script.as_ref(), None),
            base(None, self.region.as_ref()),
            base(None, None),
        ];

        let mut out: SmallVec<[LanguageTag; 4]> = SmallVec::new();
        for candidate in candidates {
            if candidate != *self && !out.contains(&candidate) {
                out.push(candidate);
            }
        }
        out
    }
}

fn title_case(part: &str) -> CompactString {
    let mut out = CompactString::with_capacity(part.len());
    for (i, c) in part.chars().enumerate() {
        if i == 0 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(ref script) = self.script {
            write!(f, "-{}", script)?;
        }
        if let Some(ref region) = self.region {
            write!(f, "-{}", region)?;
        }
        for variant in &self.variants {
            write!(f, "-{}", variant)?;
        }
        Ok(())
    }
}

impl FromStr for LanguageTag {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        LanguageTag::parse(s)
    }
}

impl Serialize for LanguageTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LanguageTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        LanguageTag::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Builder for creating language tags from separate subtags.
#[derive(Debug, Default)]
pub struct LanguageTagBuilder {
    language: Option<String>,
    script: Option<String>,
    region: Option<String>,
    variants: Vec<String>,
}

impl LanguageTagBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language.
    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.language = Some(lang.into());
        self
    }

    /// Set the script.
    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Set the region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Append a variant.
    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.variants.push(variant.into());
        self
    }

    /// Build the tag, validating every subtag by re-parsing the joined form.
    pub fn build(self) -> Result<LanguageTag> {
        let language = self
            .language
            .ok_or_else(|| I18nError::InvalidTag("missing language".to_string()))?;

        let mut joined = language;
        for part in self.script.into_iter().chain(self.region).chain(self.variants) {
            joined.push('-');
            joined.push_str(&part);
        }
        LanguageTag::parse(&joined)
    }
}

// ============================================================================
// Accept-Language Parsing
// ============================================================================

/// Parsed Accept-Language entry with quality value.
#[derive(Debug, Clone)]
struct AcceptLanguageEntry {
    tag: LanguageTag,
    quality: f32,
}

impl PartialEq for AcceptLanguageEntry {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && (self.quality - other.quality).abs() < f32::EPSILON
    }
}

impl Eq for AcceptLanguageEntry {}

impl PartialOrd for AcceptLanguageEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AcceptLanguageEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher quality first
        other.quality.partial_cmp(&self.quality).unwrap_or(Ordering::Equal)
    }
}

/// Parse an Accept-Language header into tags ordered by preference.
///
/// Weights only order the list; entries with equal weight keep header order.
/// Wildcards, `q=0` entries and unparseable tags are dropped.
///
/// # Example
///
/// ```
/// use polyglot_i18n::parse_accept_language;
///
/// let tags = parse_accept_language("fr-CH, fr;q=0.9, en;q=0.8, *;q=0.5");
/// assert_eq!(tags.len(), 3);
/// assert_eq!(tags[0].tag(), "fr-CH");
/// assert_eq!(tags[2].tag(), "en");
/// ```
pub fn parse_accept_language(header: &str) -> Vec<LanguageTag> {
    let mut entries: Vec<AcceptLanguageEntry> = header
        .split(',')
        .filter_map(|part| {
            let mut split = part.trim().splitn(2, ';');
            let raw = split.next()?.trim();
            if raw.is_empty() || raw == "*" {
                return None;
            }

            let quality = split
                .next()
                .and_then(|q| q.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().unwrap_or(0.0).clamp(0.0, 1.0))
                .unwrap_or(1.0);
            if quality <= 0.0 {
                return None;
            }

            let tag = LanguageTag::parse(raw).ok()?;
            Some(AcceptLanguageEntry { tag, quality })
        })
        .collect();

    // Stable sort keeps header order within one weight
    entries.sort();

    let mut tags: Vec<LanguageTag> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !tags.contains(&entry.tag) {
            tags.push(entry.tag);
        }
    }
    tags
}
