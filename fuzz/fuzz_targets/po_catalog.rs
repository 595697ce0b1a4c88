//! Fuzz target for PO and JSON catalog loading.
//!
//! Loading arbitrary bytes may fail but must never panic, and every entry
//! that loads must be retrievable.

#![no_main]

use libfuzzer_sys::fuzz_target;
use polyglot_i18n::{Catalog, CatalogFormat, LanguageTag, PluralRuleBook};

fuzz_target!(|data: &[u8]| {
    let tag = LanguageTag::parse("fr").expect("valid tag");
    let rules = PluralRuleBook::new();

    for format in [CatalogFormat::Po, CatalogFormat::Json] {
        if let Ok(catalog) = Catalog::load_format(tag.clone(), data, format, rules.rules_for(&tag)) {
            let _ = catalog.declared_plural_count();
            let _ = catalog.metadata("Plural-Forms");
            let _ = catalog.lookup("", None);
        }
    }
});
