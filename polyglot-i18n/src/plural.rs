//! Pluralization Rules
//!
//! Maps a count to a plural form index. Each rule lists its categories in the
//! same order gettext catalogs number their `msgstr[N]` forms, so the index
//! of a category in [`PluralRules::categories`] is the form index.
//!
//! The default rule is English-like: 1 is singular, everything else plural.

use crate::{I18nError, LanguageTag, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// CLDR plural categories.
///
/// Not all languages use all categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    /// Zero items (Arabic)
    Zero,
    /// One item (most languages)
    One,
    /// Two items (Arabic)
    Two,
    /// Few items (Slavic languages)
    Few,
    /// Many items (Slavic languages, Arabic)
    Many,
    /// All other cases
    Other,
}

impl PluralCategory {
    /// Parse from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "one" => Ok(Self::One),
            "two" => Ok(Self::Two),
            "few" => Ok(Self::Few),
            "many" => Ok(Self::Many),
            "other" => Ok(Self::Other),
            _ => Err(I18nError::InvalidPluralCategory(s.to_string())),
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Plural rules for a specific language.
pub trait PluralRules: Send + Sync {
    /// Get the plural category for a count.
    fn category(&self, n: u64) -> PluralCategory;

    /// Categories used by this language, in catalog form order.
    fn categories(&self) -> &'static [PluralCategory];

    /// Catalog form index for a count.
    fn index(&self, n: u64) -> usize {
        let category = self.category(n);
        self.categories()
            .iter()
            .position(|c| *c == category)
            .unwrap_or(0)
    }

    /// Catalog form index for a category, if this language uses it.
    fn index_of(&self, category: PluralCategory) -> Option<usize> {
        self.categories().iter().position(|c| *c == category)
    }
}

/// Per-language plural rules with built-in defaults.
///
/// Rules registered here override the built-in rule for a language.
///
/// # Example
///
/// ```
/// use polyglot_i18n::{LanguageTag, PluralRuleBook};
///
/// let book = PluralRuleBook::new();
/// let en: LanguageTag = "en".parse().unwrap();
/// let ru: LanguageTag = "ru".parse().unwrap();
///
/// assert_eq!(book.index(&en, 1), 0);
/// assert_eq!(book.index(&en, 2), 1);
/// assert_eq!(book.index(&ru, 22), 1);
/// ```
#[derive(Clone, Default)]
pub struct PluralRuleBook {
    overrides: HashMap<String, Arc<dyn PluralRules>>,
}

impl std::fmt::Debug for PluralRuleBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluralRuleBook")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluralRuleBook {
    /// Create a rule book with only the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `rules` for every tag whose language subtag is `language`.
    pub fn register(&mut self, language: &str, rules: impl PluralRules + 'static) {
        self.overrides
            .insert(language.to_ascii_lowercase(), Arc::new(rules));
    }

    /// Rules for a tag.
    pub fn rules_for(&self, tag: &LanguageTag) -> &dyn PluralRules {
        match self.overrides.get(tag.language()) {
            Some(rules) => rules.as_ref(),
            None => builtin_rules(tag.language()),
        }
    }

    /// Catalog form index for `n` items in `tag`'s language.
    #[inline]
    pub fn index(&self, tag: &LanguageTag, n: u64) -> usize {
        self.rules_for(tag).index(n)
    }
}

/// Get the plural category for a count in a language.
///
/// # Example
///
/// ```
/// use polyglot_i18n::{plural_category, LanguageTag, PluralCategory};
///
/// let en: LanguageTag = "en".parse().unwrap();
/// assert_eq!(plural_category(1, &en), PluralCategory::One);
/// assert_eq!(plural_category(2, &en), PluralCategory::Other);
/// assert_eq!(plural_category(0, &en), PluralCategory::Other);
/// ```
pub fn plural_category(n: u64, tag: &LanguageTag) -> PluralCategory {
    builtin_rules(tag.language()).category(n)
}

static DEFAULT: DefaultPlurals = DefaultPlurals;
static NONE: NoPlurals = NoPlurals;
static FRENCH: FrenchPlurals = FrenchPlurals;
static RUSSIAN: RussianPlurals = RussianPlurals;
static POLISH: PolishPlurals = PolishPlurals;
static CZECH: CzechPlurals = CzechPlurals;
static ARABIC: ArabicPlurals = ArabicPlurals;

/// Get built-in plural rules for a language.
pub(crate) fn builtin_rules(language: &str) -> &'static dyn PluralRules {
    match language {
        // East Asian languages - no plural forms
        "ja" | "ko" | "zh" | "vi" | "th" | "id" | "ms" => &NONE,

        "fr" => &FRENCH,

        "ru" | "uk" | "be" | "sr" | "hr" | "bs" => &RUSSIAN,
        "pl" => &POLISH,
        "cs" | "sk" => &CZECH,

        "ar" => &ARABIC,

        // Germanic, Romance (except French), and most others
        _ => &DEFAULT,
    }
}

// ============================================================================
// Plural Rule Implementations
// ============================================================================

/// Default pluralization (English-like): 1 = one, else other.
pub struct DefaultPlurals;

impl PluralRules for DefaultPlurals {
    fn category(&self, n: u64) -> PluralCategory {
        if n == 1 {
            PluralCategory::One
        } else {
            PluralCategory::Other
        }
    }

    fn categories(&self) -> &'static [PluralCategory] {
        &[PluralCategory::One, PluralCategory::Other]
    }
}

/// No plural forms (Chinese, Japanese, Korean, etc.).
pub struct NoPlurals;

impl PluralRules for NoPlurals {
    fn category(&self, _n: u64) -> PluralCategory {
        PluralCategory::Other
    }

    fn categories(&self) -> &'static [PluralCategory] {
        &[PluralCategory::Other]
    }
}

/// French pluralization: 0 and 1 = one, else other.
pub struct FrenchPlurals;

impl PluralRules for FrenchPlurals {
    fn category(&self, n: u64) -> PluralCategory {
        if n <= 1 {
            PluralCategory::One
        } else {
            PluralCategory::Other
        }
    }

    fn categories(&self) -> &'static [PluralCategory] {
        &[PluralCategory::One, PluralCategory::Other]
    }
}

/// East Slavic and BCS pluralization.
///
/// - one: 1, 21, 31, 41, 51, 61, 71, 81, 101, 1001, ...
/// - few: 2-4, 22-24, 32-34, ...
/// - many: 0, 5-20, 25-30, 35-40, ...
pub struct RussianPlurals;

impl PluralRules for RussianPlurals {
    fn category(&self, n: u64) -> PluralCategory {
        let mod10 = n % 10;
        let mod100 = n % 100;

        if mod10 == 1 && mod100 != 11 {
            PluralCategory::One
        } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
            PluralCategory::Few
        } else {
            PluralCategory::Many
        }
    }

    fn categories(&self) -> &'static [PluralCategory] {
        &[PluralCategory::One, PluralCategory::Few, PluralCategory::Many]
    }
}

/// Polish pluralization.
///
/// - one: 1
/// - few: 2-4, 22-24, 32-34, ...
/// - many: 0, 5-21, 25-31, ...
pub struct PolishPlurals;

impl PluralRules for PolishPlurals {
    fn category(&self, n: u64) -> PluralCategory {
        if n == 1 {
            return PluralCategory::One;
        }

        let mod10 = n % 10;
        let mod100 = n % 100;

        if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
            PluralCategory::Few
        } else {
            PluralCategory::Many
        }
    }

    fn categories(&self) -> &'static [PluralCategory] {
        &[PluralCategory::One, PluralCategory::Few, PluralCategory::Many]
    }
}

/// Czech/Slovak pluralization.
///
/// - one: 1
/// - few: 2-4
/// - other: 0, 5+
pub struct CzechPlurals;

impl PluralRules for CzechPlurals {
    fn category(&self, n: u64) -> PluralCategory {
        match n {
            1 => PluralCategory::One,
            2..=4 => PluralCategory::Few,
            _ => PluralCategory::Other,
        }
    }

    fn categories(&self) -> &'static [PluralCategory] {
        &[PluralCategory::One, PluralCategory::Few, PluralCategory::Other]
    }
}

/// Arabic pluralization (most complex).
///
/// - zero: 0
/// - one: 1
/// - two: 2
/// - few: 3-10, 103-110, ...
/// - many: 11-99, 111-199, ...
/// - other: 100-102, 200-202, ...
pub struct ArabicPlurals;

impl PluralRules for ArabicPlurals {
    fn category(&self, n: u64) -> PluralCategory {
        let mod100 = n % 100;

        match n {
            0 => PluralCategory::Zero,
            1 => PluralCategory::One,
            2 => PluralCategory::Two,
            _ if (3..=10).contains(&mod100) => PluralCategory::Few,
            _ if (11..=99).contains(&mod100) => PluralCategory::Many,
            _ => PluralCategory::Other,
        }
    }

    fn categories(&self) -> &'static [PluralCategory] {
        &[
            PluralCategory::Zero,
            PluralCategory::One,
            PluralCategory::Two,
            PluralCategory::Few,
            PluralCategory::Many,
            PluralCategory::Other,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> LanguageTag {
        LanguageTag::parse(s).unwrap()
    }

    #[test]
    fn test_english_plurals() {
        let en = tag("en");
        assert_eq!(plural_category(0, &en), PluralCategory::Other);
        assert_eq!(plural_category(1, &en), PluralCategory::One);
        assert_eq!(plural_category(2, &en), PluralCategory::Other);
        assert_eq!(plural_category(100, &en), PluralCategory::Other);
    }

    #[test]
    fn test_french_plurals() {
        let fr = tag("fr-CA");
        assert_eq!(plural_category(0, &fr), PluralCategory::One);
        assert_eq!(plural_category(1, &fr), PluralCategory::One);
        assert_eq!(plural_category(2, &fr), PluralCategory::Other);
    }

    #[test]
    fn test_russian_plurals() {
        let ru = tag("ru");
        assert_eq!(plural_category(1, &ru), PluralCategory::One);
        assert_eq!(plural_category(2, &ru), PluralCategory::Few);
        assert_eq!(plural_category(5, &ru), PluralCategory::Many);
        assert_eq!(plural_category(11, &ru), PluralCategory::Many);
        assert_eq!(plural_category(21, &ru), PluralCategory::One);
        assert_eq!(plural_category(22, &ru), PluralCategory::Few);
        assert_eq!(plural_category(25, &ru), PluralCategory::Many);
    }

    #[test]
    fn test_japanese_plurals() {
        let ja = tag("ja");
        assert_eq!(plural_category(0, &ja), PluralCategory::Other);
        assert_eq!(plural_category(1, &ja), PluralCategory::Other);
        assert_eq!(PluralRuleBook::new().index(&ja, 7), 0);
    }

    #[test]
    fn test_arabic_plurals() {
        let ar = tag("ar");
        assert_eq!(plural_category(0, &ar), PluralCategory::Zero);
        assert_eq!(plural_category(1, &ar), PluralCategory::One);
        assert_eq!(plural_category(2, &ar), PluralCategory::Two);
        assert_eq!(plural_category(5, &ar), PluralCategory::Few);
        assert_eq!(plural_category(11, &ar), PluralCategory::Many);
        assert_eq!(plural_category(100, &ar), PluralCategory::Other);
    }

    #[test]
    fn test_form_indices_follow_catalog_order() {
        let book = PluralRuleBook::new();
        let cs = tag("cs");
        assert_eq!(book.index(&cs, 1), 0);
        assert_eq!(book.index(&cs, 3), 1);
        assert_eq!(book.index(&cs, 5), 2);

        let pl = tag("pl");
        assert_eq!(book.index(&pl, 1), 0);
        assert_eq!(book.index(&pl, 24), 1);
        assert_eq!(book.index(&pl, 12), 2);
    }

    #[test]
    fn test_rule_book_override() {
        struct AlwaysOther;

        impl PluralRules for AlwaysOther {
            fn category(&self, _n: u64) -> PluralCategory {
                PluralCategory::Other
            }

            fn categories(&self) -> &'static [PluralCategory] {
                &[PluralCategory::One, PluralCategory::Other]
            }
        }

        let mut book = PluralRuleBook::new();
        let en = tag("en-GB");
        assert_eq!(book.index(&en, 1), 0);

        book.register("EN", AlwaysOther);
        assert_eq!(book.index(&en, 1), 1);
        assert_eq!(book.rules_for(&tag("de")).index(1), 0);
    }

    #[test]
    fn test_plural_category_parse() {
        assert_eq!(PluralCategory::parse("one").unwrap(), PluralCategory::One);
        assert_eq!(PluralCategory::parse("OTHER").unwrap(), PluralCategory::Other);
        assert!(PluralCategory::parse("invalid").is_err());
    }
}
