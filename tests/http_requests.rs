//! End-to-end request handling over `http` types.

#![cfg(feature = "http")]

use http::header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE, COOKIE, LOCATION, SET_COOKIE};
use http::{Request, Response, StatusCode};
use polyglot::http_adapter::{SkipLocalization, apply_response_headers, redirect_response, signals_from_parts};
use polyglot::prelude::*;
use std::sync::Arc;

fn localizer() -> Localizer {
    let mut fr = Catalog::new("fr".parse().unwrap());
    fr.add("Welcome", "Bienvenue");
    let de = Catalog::new("de".parse().unwrap());

    let registry = Arc::new(CatalogRegistry::from_catalogs([fr, de]));
    Localizer::new(registry, ResolverSettings::new("en".parse().unwrap()))
}

// What a middleware does with one request
fn handle(localizer: &Localizer, request: Request<()>) -> Response<String> {
    let (parts, _) = request.into_parts();

    let ctx = match localizer.resolve(&signals_from_parts(&parts, localizer.cookie_name())) {
        Resolution::Resolved(ctx) => ctx,
        Resolution::Skipped => return Response::new("skipped".to_string()),
        Resolution::NotFound { .. } => {
            let mut response = Response::new(String::new());
            *response.status_mut() = StatusCode::NOT_FOUND;
            return response;
        }
    };

    let cookie = localizer.preference_cookie(&ctx);
    let mut response = match ctx.rewrite().location() {
        Some(location) => redirect_response(location).unwrap().map(|()| String::new()),
        None => Response::new(localizer.text(&ctx, "Welcome").into_string()),
    };
    apply_response_headers(response.headers_mut(), &ctx, cookie.as_ref());
    response
}

#[test]
fn test_prefixed_request_is_translated() {
    let response = handle(&localizer(), Request::get("/fr/home").body(()).unwrap());

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "Bienvenue");
    assert_eq!(response.headers().get(CONTENT_LANGUAGE).unwrap(), "fr");
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[test]
fn test_query_choice_redirects_and_sets_cookie() {
    let request = Request::get("/home?language=de&tab=2").body(()).unwrap();
    let response = handle(&localizer(), request);

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/de/home?tab=2");
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("preferred_language=de;"));
}

#[test]
fn test_cookie_and_header_signals() {
    let request = Request::get("/home")
        .header(COOKIE, "theme=dark; preferred_language=fr")
        .header(ACCEPT_LANGUAGE, "de")
        .body(())
        .unwrap();
    let response = handle(&localizer(), request);
    assert_eq!(response.body(), "Bienvenue");

    let request = Request::get("/home")
        .header(ACCEPT_LANGUAGE, "de-CH, fr;q=0.5")
        .body(())
        .unwrap();
    let response = handle(&localizer(), request);
    assert_eq!(response.headers().get(CONTENT_LANGUAGE).unwrap(), "fr");
}

#[test]
fn test_unknown_prefix_and_skip_marker() {
    let response = handle(&localizer(), Request::get("/it/home").body(()).unwrap());
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let mut request = Request::get("/fr/healthz").body(()).unwrap();
    request.extensions_mut().insert(SkipLocalization);
    let response = handle(&localizer(), request);
    assert_eq!(response.body(), "skipped");
    assert!(response.headers().get(CONTENT_LANGUAGE).is_none());
}
