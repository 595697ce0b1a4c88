//! Adapters between `http` request/response types and the resolver.
//!
//! ```
//! use http::Request;
//! use polyglot_i18n::{Catalog, CatalogRegistry, Localizer, ResolverSettings};
//! use polyglot_i18n::http_adapter::signals_from_parts;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(CatalogRegistry::from_catalogs([Catalog::new("fr".parse().unwrap())]));
//! let localizer = Localizer::new(registry, ResolverSettings::new("en".parse().unwrap()));
//!
//! let (parts, _) = Request::get("/fr-CA/help?q=1").body(()).unwrap().into_parts();
//! let resolution = localizer.resolve(&signals_from_parts(&parts, localizer.cookie_name()));
//!
//! let ctx = resolution.context().unwrap();
//! assert_eq!(ctx.rewrite().location(), Some("/fr/help?q=1"));
//! ```

use crate::cookie::{PreferenceCookie, cookie_value};
use crate::resolver::{LanguageSignals, RequestLanguageContext};
use http::header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE, COOKIE, LOCATION, SET_COOKIE};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use tracing::warn;

/// Route marker: insert into request extensions to skip localization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipLocalization;

/// Collect the language signals of a request.
pub fn signals_from_parts<'a>(parts: &'a Parts, cookie_name: &str) -> LanguageSignals<'a> {
    let cookie = parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, cookie_name));

    let accept_language = parts
        .headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok());

    LanguageSignals::new(parts.uri.path())
        .with_query(parts.uri.query())
        .with_cookie(cookie)
        .with_accept_language(accept_language)
        .skip_localization(parts.extensions.get::<SkipLocalization>().is_some())
}

/// Add `Content-Language` and, when asked for, the preference cookie.
pub fn apply_response_headers(
    headers: &mut HeaderMap,
    ctx: &RequestLanguageContext,
    cookie: Option<&PreferenceCookie>,
) {
    match HeaderValue::from_str(&ctx.content_language()) {
        Ok(value) => {
            headers.insert(CONTENT_LANGUAGE, value);
        }
        Err(e) => warn!("Cannot encode Content-Language: {}", e),
    }

    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie.to_header_value()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(e) => warn!("Cannot encode preference cookie: {}", e),
        }
    }
}

/// A `302 Found` response for a redirect decision.
///
/// Returns `None` when the location is not a valid header value.
pub fn redirect_response(location: &str) -> Option<Response<()>> {
    let value = HeaderValue::from_str(location).ok()?;
    let mut response = Response::new(());
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(LOCATION, value);
    Some(response)
}
