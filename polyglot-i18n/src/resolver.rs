//! Principal Language Resolver
//!
//! Decides, once per request, which application language to serve and
//! whether the request should be redirected first. Signals are consulted in
//! a fixed order and the first one that matches decides:
//!
//! 1. the `language` query parameter (also persisted, then redirected away)
//! 2. an exact URL prefix (`/fr-CA/...`)
//! 3. a loose URL prefix, redirected to the canonical prefix
//! 4. the preference cookie
//! 5. `Accept-Language`
//! 6. the default language
//!
//! A URL prefix that names a language the application does not offer is a
//! not-found, never a silent fallback.

use crate::iso639::is_iso639_1;
use crate::lookup::{FallbackChain, fallback_chain};
use crate::matcher::{match_exact, match_loose};
use crate::registry::RegistrySnapshot;
use crate::tag::parse_accept_language;
use crate::{LanguageTag, Result};
use polyglot_config::{LocalizationConfig, path_has_prefix};
use tracing::debug;

/// What the request tells us about language, borrowed from the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageSignals<'a> {
    path: &'a str,
    query: Option<&'a str>,
    cookie: Option<&'a str>,
    accept_language: Option<&'a str>,
    skip: bool,
}

impl<'a> LanguageSignals<'a> {
    /// Signals for a request path (without query string).
    pub fn new(path: &'a str) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// Raw query string, without the leading `?`.
    pub fn with_query(mut self, query: Option<&'a str>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    /// Value of the preference cookie.
    pub fn with_cookie(mut self, cookie: Option<&'a str>) -> Self {
        self.cookie = cookie;
        self
    }

    /// Raw `Accept-Language` header.
    pub fn with_accept_language(mut self, header: Option<&'a str>) -> Self {
        self.accept_language = header;
        self
    }

    /// Mark the route as excluded from localization.
    pub fn skip_localization(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn query(&self) -> Option<&'a str> {
        self.query
    }
}

/// Which signal chose the principal language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    QueryParameter,
    UrlPrefix,
    Cookie,
    AcceptLanguage,
    Default,
}

/// Whether the framework should redirect before handling the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    None,
    /// Redirect to this path (query included)
    Redirect(String),
}

impl Rewrite {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Rewrite::Redirect(_))
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Rewrite::Redirect(location) => Some(location),
            Rewrite::None => None,
        }
    }
}

/// Per-request language decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLanguageContext {
    principal: LanguageTag,
    chain: FallbackChain,
    rewrite: Rewrite,
    stripped_path: String,
    source: ResolutionSource,
    persist: Option<LanguageTag>,
}

impl RequestLanguageContext {
    /// The language to serve.
    pub fn principal(&self) -> &LanguageTag {
        &self.principal
    }

    /// Languages to try for lookups, principal first.
    pub fn fallback_chain(&self) -> &[LanguageTag] {
        &self.chain
    }

    pub fn rewrite(&self) -> &Rewrite {
        &self.rewrite
    }

    /// Path with any language prefix removed, for internal routing.
    pub fn stripped_path(&self) -> &str {
        &self.stripped_path
    }

    pub fn source(&self) -> ResolutionSource {
        self.source
    }

    /// A language to write back to the preference cookie, if any.
    pub fn persist(&self) -> Option<&LanguageTag> {
        self.persist.as_ref()
    }

    /// Value for the `Content-Language` response header.
    pub fn content_language(&self) -> String {
        self.principal.to_string()
    }
}

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A language was chosen
    Resolved(RequestLanguageContext),
    /// The route is excluded; handle it untouched
    Skipped,
    /// The path starts with a language the application does not offer
    NotFound { prefix: String },
}

impl Resolution {
    pub fn context(&self) -> Option<&RequestLanguageContext> {
        match self {
            Resolution::Resolved(context) => Some(context),
            _ => None,
        }
    }

    pub fn into_context(self) -> Option<RequestLanguageContext> {
        match self {
            Resolution::Resolved(context) => Some(context),
            _ => None,
        }
    }
}

/// Settings the resolver needs, with tags already parsed.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub default_language: LanguageTag,
    pub fallback_language: Option<LanguageTag>,
    pub query_param: String,
    pub excluded_paths: Vec<String>,
    pub redirect_unprefixed: bool,
}

impl ResolverSettings {
    pub fn new(default_language: LanguageTag) -> Self {
        Self {
            default_language,
            fallback_language: None,
            query_param: "language".to_string(),
            excluded_paths: Vec::new(),
            redirect_unprefixed: false,
        }
    }

    pub fn from_config(config: &LocalizationConfig) -> Result<Self> {
        Ok(Self {
            default_language: LanguageTag::parse(&config.default_language)?,
            fallback_language: config
                .fallback_language
                .as_deref()
                .map(LanguageTag::parse)
                .transpose()?,
            query_param: config.query_param.clone(),
            excluded_paths: config.excluded_paths.clone(),
            redirect_unprefixed: config.redirect_unprefixed,
        })
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
    }
}

/// Resolves the principal language of a request.
#[derive(Debug, Clone)]
pub struct LanguageResolver {
    settings: ResolverSettings,
}

impl LanguageResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Decide the language for one request against one registry snapshot.
    pub fn resolve(&self, signals: &LanguageSignals<'_>, snapshot: &RegistrySnapshot) -> Resolution {
        if signals.skip || self.settings.is_excluded(signals.path) {
            debug!(path = signals.path, "Localization skipped for excluded route");
            return Resolution::Skipped;
        }

        let app = snapshot.languages();
        let split = split_prefix(signals.path, app);

        if let Some(selected) = self.from_query(signals, app) {
            let rest = split.as_ref().map_or(signals.path, |s| s.rest);
            let remaining = remove_param(signals.query, &self.settings.query_param);
            let location = prefixed(&selected, rest, remaining.as_deref());
            debug!(language = %selected, location = %location, "Language chosen by query parameter");

            return self.resolved(
                selected.clone(),
                snapshot,
                Rewrite::Redirect(location),
                rest,
                ResolutionSource::QueryParameter,
                Some(selected),
            );
        }

        if let Some(split) = split {
            let user = [split.tag];

            if let Some(found) = match_exact(&user, app) {
                return self.resolved(
                    found.clone(),
                    snapshot,
                    Rewrite::None,
                    split.rest,
                    ResolutionSource::UrlPrefix,
                    None,
                );
            }

            if let Some(found) = match_loose(&user, app) {
                let location = prefixed(found.app, split.rest, signals.query);
                debug!(from = %found.user, to = %found.app, "Canonicalizing language prefix");

                return self.resolved(
                    found.app.clone(),
                    snapshot,
                    Rewrite::Redirect(location),
                    split.rest,
                    ResolutionSource::UrlPrefix,
                    None,
                );
            }

            debug!(prefix = split.segment, "No application language for path prefix");
            return Resolution::NotFound {
                prefix: split.segment.to_string(),
            };
        }

        let (selected, source, persist) = self.from_unprefixed(signals, app);
        let rewrite = if self.settings.redirect_unprefixed {
            Rewrite::Redirect(prefixed(&selected, signals.path, signals.query))
        } else {
            Rewrite::None
        };

        self.resolved(selected, snapshot, rewrite, signals.path, source, persist)
    }

    fn from_query(&self, signals: &LanguageSignals<'_>, app: &[LanguageTag]) -> Option<LanguageTag> {
        let value = query_value(signals.query?, &self.settings.query_param)?;
        let user = [LanguageTag::parse(value).ok()?];

        match_exact(&user, app)
            .or_else(|| match_loose(&user, app).map(|found| found.app))
            .cloned()
    }

    fn from_unprefixed(
        &self,
        signals: &LanguageSignals<'_>,
        app: &[LanguageTag],
    ) -> (LanguageTag, ResolutionSource, Option<LanguageTag>) {
        if let Some(user) = signals.cookie.and_then(|c| LanguageTag::parse(c).ok()) {
            let user = [user];
            if let Some(found) = match_exact(&user, app) {
                return (found.clone(), ResolutionSource::Cookie, None);
            }
            if let Some(found) = match_loose(&user, app) {
                // the stored value is rewritten in canonical form
                return (found.app.clone(), ResolutionSource::Cookie, Some(found.app.clone()));
            }
        }

        if let Some(header) = signals.accept_language {
            let user = parse_accept_language(header);
            let found = match_exact(&user, app).or_else(|| match_loose(&user, app).map(|m| m.app));
            if let Some(found) = found {
                return (found.clone(), ResolutionSource::AcceptLanguage, None);
            }
        }

        (self.settings.default_language.clone(), ResolutionSource::Default, None)
    }

    fn resolved(
        &self,
        principal: LanguageTag,
        snapshot: &RegistrySnapshot,
        rewrite: Rewrite,
        stripped: &str,
        source: ResolutionSource,
        persist: Option<LanguageTag>,
    ) -> Resolution {
        let chain = fallback_chain(&principal, snapshot, self.settings.fallback_language.as_ref());
        let stripped_path = if stripped.is_empty() { "/" } else { stripped };

        debug!(language = %principal, source = ?source, redirect = rewrite.is_redirect(), "Resolved principal language");

        Resolution::Resolved(RequestLanguageContext {
            principal,
            chain,
            rewrite,
            stripped_path: stripped_path.to_string(),
            source,
            persist,
        })
    }
}

struct PrefixSplit<'a> {
    segment: &'a str,
    tag: LanguageTag,
    rest: &'a str,
}

// The first path segment counts as a language prefix only when it is shaped
// like a tag and its language subtag is an ISO 639-1 code or the language of
// an application tag.
fn split_prefix<'a>(path: &'a str, app: &[LanguageTag]) -> Option<PrefixSplit<'a>> {
    let trimmed = path.strip_prefix('/')?;
    let end = trimmed.find('/').unwrap_or(trimmed.len());
    let segment = &trimmed[..end];

    if segment.is_empty()
        || !segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return None;
    }

    let tag = LanguageTag::parse(segment).ok()?;
    if !is_iso639_1(tag.language()) && !app.iter().any(|offered| offered.language() == tag.language()) {
        return None;
    }

    Some(PrefixSplit {
        segment,
        tag,
        rest: &trimmed[end..],
    })
}

fn prefixed(tag: &LanguageTag, rest: &str, query: Option<&str>) -> String {
    let mut location = format!("/{}", tag);
    if rest.is_empty() {
        location.push('/');
    } else {
        location.push_str(rest);
    }
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(query);
    }
    location
}

fn query_value<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name && !value.is_empty()).then_some(value)
    })
}

fn remove_param(query: Option<&str>, name: &str) -> Option<String> {
    let kept: Vec<&str> = query?
        .split('&')
        .filter(|pair| !pair.is_empty() && pair.split_once('=').map_or(*pair, |(k, _)| k) != name)
        .collect();
    (!kept.is_empty()).then(|| kept.join("&"))
}
