//! Benchmarks for translation lookup
//!
//! Includes lookups that race catalog reloads, which should cost readers
//! nothing beyond the snapshot load.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use polyglot::{Catalog, CatalogRegistry, LanguageTag, LookupService, interpolate};

const ENTRIES: usize = 2_000;

fn tag(s: &str) -> LanguageTag {
    LanguageTag::parse(s).unwrap()
}

fn catalog(lang: &str, prefix: &str) -> Catalog {
    let mut catalog = Catalog::new(tag(lang));
    for i in 0..ENTRIES {
        catalog.add(format!("message {}", i), format!("{} {}", prefix, i));
    }
    catalog.add_with_context("menu", "Open", format!("{} open", prefix));
    catalog.add_plural("{count} file", [format!("{} file", prefix), format!("{} files", prefix)]);
    catalog
}

fn service() -> LookupService {
    let registry = CatalogRegistry::from_catalogs([
        catalog("fr", "fr"),
        catalog("de", "de"),
        Catalog::new(tag("fr-CA")),
    ]);
    LookupService::new(Arc::new(registry)).with_fallback(Some(tag("de")))
}

fn bench_get_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_text");
    let service = service();

    let chains = [
        ("direct", service.chain_for(&tag("fr"))),
        ("via_broader", service.chain_for(&tag("fr-CA"))),
    ];

    for (name, chain) in &chains {
        group.bench_with_input(BenchmarkId::new("hit", name), chain, |b, chain| {
            b.iter(|| black_box(service.get_text(black_box("message 1234"), None, None, chain)))
        });
        group.bench_with_input(BenchmarkId::new("miss", name), chain, |b, chain| {
            b.iter(|| black_box(service.get_text(black_box("not in any catalog"), None, None, chain)))
        });
    }

    let chain = service.chain_for(&tag("fr"));
    group.bench_function("context", |b| {
        b.iter(|| black_box(service.get_text("Open", Some("menu"), None, &chain)))
    });
    group.bench_function("plural", |b| {
        b.iter(|| black_box(service.get_plural_text("{count} file", "{count} files", None, 7, &chain)))
    });
    group.bench_function("with_args", |b| {
        b.iter(|| black_box(service.get_text_args("{count} file", None, &chain, &[("count", "7")])))
    });

    group.finish();
}

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");

    group.bench_function("no_placeholders", |b| {
        b.iter(|| black_box(interpolate(black_box("Welcome back"), &[("name", "Ada")])))
    });
    group.bench_function("two_placeholders", |b| {
        b.iter(|| {
            black_box(interpolate(
                black_box("Hello {name}, you have {count} new messages"),
                &[("name", "Ada"), ("count", "3")],
            ))
        })
    });

    group.finish();
}

fn bench_lookup_during_reload(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_during_reload");
    let service = service();
    let chain = service.chain_for(&tag("fr"));

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let registry = Arc::clone(service.registry());
        let stop = Arc::clone(&stop);
        let replacement = catalog("fr", "fr-v2");
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                registry.insert(replacement.clone());
            }
        })
    };

    group.bench_function("get_text", |b| {
        b.iter(|| black_box(service.get_text(black_box("message 42"), None, None, &chain)))
    });

    stop.store(true, Ordering::Relaxed);
    let _ = writer.join();
    group.finish();
}

criterion_group!(benches, bench_get_text, bench_interpolate, bench_lookup_during_reload);
criterion_main!(benches);
