//! Language Matching
//!
//! Finds the application language that best serves a list of user
//! preferences. Both functions only borrow their inputs and return
//! references into them: no locks, no allocation.
//!
//! # Loose matching order
//!
//! 1. Full: language, script and region agree (variants ignored). Tried for
//!    every user tag, in preference order, before anything weaker.
//! 2. Language and region agree (script ignored).
//! 3. Language and script agree (region ignored).
//! 4. Language agrees. A language-only application tag wins over a more
//!    specific one.
//!
//! Passes 2 to 4 are exhausted for one user tag before the next user tag is
//! tried, so a stated preference always beats application declaration order.

use crate::LanguageTag;

/// Which pass of the loose matcher produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchPass {
    /// Language, script and region agree
    Full,
    /// Language and region agree
    LanguageRegion,
    /// Language and script agree
    LanguageScript,
    /// Only the language agrees
    Language,
}

/// Result of [`match_loose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LooseMatch<'a, 'b> {
    /// The application tag that was selected
    pub app: &'a LanguageTag,
    /// The user tag that selected it
    pub user: &'b LanguageTag,
    /// The pass that produced the match
    pub pass: MatchPass,
}

impl LooseMatch<'_, '_> {
    /// Whether the user tag is subtag-for-subtag identical to the application tag.
    ///
    /// Only non-exact matches ask for a canonicalizing rewrite.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.app == self.user
    }
}

/// Return the application tag identical to the first user tag that has one.
///
/// # Example
///
/// ```
/// use polyglot_i18n::{LanguageTag, match_exact};
///
/// let app: Vec<LanguageTag> = ["fr-CA", "en"].iter().map(|t| t.parse().unwrap()).collect();
/// let user: Vec<LanguageTag> = ["de", "en", "fr-CA"].iter().map(|t| t.parse().unwrap()).collect();
///
/// assert_eq!(match_exact(&user, &app).unwrap().tag(), "en");
/// ```
pub fn match_exact<'a>(user: &[LanguageTag], app: &'a [LanguageTag]) -> Option<&'a LanguageTag> {
    user.iter().find_map(|wanted| app.iter().find(|offered| *offered == wanted))
}

/// Find the best partially-agreeing application tag.
///
/// # Example
///
/// ```
/// use polyglot_i18n::{LanguageTag, match_loose};
///
/// let app: Vec<LanguageTag> = ["fr-CA", "fr", "en"].iter().map(|t| t.parse().unwrap()).collect();
/// let user: Vec<LanguageTag> = ["fr-CH", "fr-CA"].iter().map(|t| t.parse().unwrap()).collect();
///
/// let found = match_loose(&user, &app).unwrap();
/// assert_eq!(found.app.tag(), "fr-CA");
/// assert_eq!(found.user.tag(), "fr-CA");
/// ```
pub fn match_loose<'a, 'b>(
    user: &'b [LanguageTag],
    app: &'a [LanguageTag],
) -> Option<LooseMatch<'a, 'b>> {
    for wanted in user {
        if let Some(found) = app.iter().find(|offered| full(offered, wanted)) {
            return Some(LooseMatch {
                app: found,
                user: wanted,
                pass: MatchPass::Full,
            });
        }
    }

    for wanted in user {
        if let Some(found) = match_single(wanted, app) {
            return Some(found);
        }
    }

    None
}

fn match_single<'a, 'b>(wanted: &'b LanguageTag, app: &'a [LanguageTag]) -> Option<LooseMatch<'a, 'b>> {
    let hit = |found: &'a LanguageTag, pass| LooseMatch {
        app: found,
        user: wanted,
        pass,
    };

    if wanted.region().is_some() {
        if let Some(found) = app
            .iter()
            .find(|offered| offered.language() == wanted.language() && offered.region() == wanted.region())
        {
            return Some(hit(found, MatchPass::LanguageRegion));
        }
    }

    if wanted.script().is_some() {
        if let Some(found) = app
            .iter()
            .find(|offered| offered.language() == wanted.language() && offered.script() == wanted.script())
        {
            return Some(hit(found, MatchPass::LanguageScript));
        }
    }

    app.iter()
        .find(|offered| offered.is_language_only() && offered.language() == wanted.language())
        .or_else(|| app.iter().find(|offered| offered.language() == wanted.language()))
        .map(|found| hit(found, MatchPass::Language))
}

#[inline]
fn full(offered: &LanguageTag, wanted: &LanguageTag) -> bool {
    offered.language() == wanted.language()
        && offered.script() == wanted.script()
        && offered.region() == wanted.region()
}
