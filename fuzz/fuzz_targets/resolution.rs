//! Fuzz target for request language resolution.
//!
//! Tests the resolver with arbitrary paths, query strings, cookies and
//! headers. Any redirect it issues must resolve without a further redirect.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use polyglot_i18n::{
    Catalog, CatalogRegistry, LanguageResolver, LanguageSignals, LanguageTag, Resolution,
    ResolverSettings,
};

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    path: String,
    query: Option<String>,
    cookie: Option<String>,
    accept_language: Option<String>,
}

fuzz_target!(|request: FuzzRequest| {
    let languages = ["en", "fr", "fr-CA", "de", "zh-Hant"];
    let registry = CatalogRegistry::from_catalogs(
        languages
            .iter()
            .filter_map(|l| LanguageTag::parse(l).ok())
            .map(Catalog::new),
    );
    let resolver = LanguageResolver::new(ResolverSettings::new(
        LanguageTag::parse("en").expect("valid tag"),
    ));

    // a request path never carries its own query or fragment
    if request.path.contains(['?', '#']) {
        return;
    }
    let path = format!("/{}", request.path.trim_start_matches('/'));
    let signals = LanguageSignals::new(&path)
        .with_query(request.query.as_deref())
        .with_cookie(request.cookie.as_deref())
        .with_accept_language(request.accept_language.as_deref());

    let snapshot = registry.load();
    let Resolution::Resolved(ctx) = resolver.resolve(&signals, &snapshot) else {
        return;
    };

    assert!(snapshot.contains(ctx.principal()));

    if let Some(location) = ctx.rewrite().location() {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (location, None),
        };
        let again = resolver.resolve(&LanguageSignals::new(path).with_query(query), &snapshot);
        let again = again.into_context().expect("redirect target resolves");
        assert!(!again.rewrite().is_redirect(), "redirect loop at {}", location);
        assert_eq!(again.principal(), ctx.principal());
    }
});
