//! Benchmarks for tag parsing, matching and request resolution
//!
//! Resolution runs once per request, so these are the per-request costs that
//! happen before any text is translated.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use polyglot::{
    Catalog, CatalogRegistry, LanguageResolver, LanguageSignals, LanguageTag, ResolverSettings,
    match_exact, match_loose, parse_accept_language,
};

const APP_LANGUAGES: &[&str] = &[
    "en", "en-GB", "fr", "fr-CA", "de", "es", "es-MX", "it", "pt", "pt-BR", "nl", "sv", "pl", "ru",
    "ja", "ko", "zh-Hans", "zh-Hant", "ar", "tr",
];

fn tags(list: &[&str]) -> Vec<LanguageTag> {
    list.iter().filter_map(|t| LanguageTag::parse(t).ok()).collect()
}

fn registry() -> Arc<CatalogRegistry> {
    Arc::new(CatalogRegistry::from_catalogs(tags(APP_LANGUAGES).into_iter().map(Catalog::new)))
}

fn bench_tag_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_parsing");

    for input in ["en", "fr-CA", "zh_TW", "sr-Latn-RS", "de_DE.UTF-8"] {
        group.bench_with_input(BenchmarkId::new("parse", input), input, |b, input| {
            b.iter(|| black_box(LanguageTag::parse(black_box(input))))
        });
    }

    let header = "fr-CH, fr;q=0.9, en;q=0.8, de;q=0.7, *;q=0.5";
    group.throughput(Throughput::Bytes(header.len() as u64));
    group.bench_function("accept_language", |b| {
        b.iter(|| black_box(parse_accept_language(black_box(header))))
    });

    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");
    let app = tags(APP_LANGUAGES);

    let cases = [
        ("exact_first", tags(&["en"])),
        ("exact_late", tags(&["it-CH", "tr"])),
        ("loose_region", tags(&["pt-PT", "es-AR"])),
        ("loose_miss", tags(&["xh", "zu", "st"])),
    ];

    for (name, user) in &cases {
        group.bench_with_input(BenchmarkId::new("exact", name), user, |b, user| {
            b.iter(|| black_box(match_exact(black_box(user), &app)))
        });
        group.bench_with_input(BenchmarkId::new("loose", name), user, |b, user| {
            b.iter(|| black_box(match_loose(black_box(user), &app)))
        });
    }

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let registry = registry();
    let mut settings = ResolverSettings::new(LanguageTag::parse("en").unwrap());
    settings.excluded_paths = vec!["/api".to_string(), "/static".to_string()];
    let resolver = LanguageResolver::new(settings);

    let requests = [
        ("prefix_exact", LanguageSignals::new("/fr-CA/account/settings")),
        ("prefix_loose", LanguageSignals::new("/es-CO/account/settings").with_query(Some("tab=2"))),
        ("query", LanguageSignals::new("/account").with_query(Some("language=de&tab=2"))),
        ("cookie", LanguageSignals::new("/account").with_cookie(Some("pt-BR"))),
        (
            "accept_language",
            LanguageSignals::new("/account").with_accept_language(Some("da, sv;q=0.9, en;q=0.5")),
        ),
        ("default", LanguageSignals::new("/account")),
        ("excluded", LanguageSignals::new("/static/app.css")),
    ];

    for (name, signals) in &requests {
        group.bench_with_input(BenchmarkId::from_parameter(name), signals, |b, signals| {
            b.iter(|| black_box(resolver.resolve(black_box(signals), &registry.load())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tag_parsing, bench_matching, bench_resolution);
criterion_main!(benches);
