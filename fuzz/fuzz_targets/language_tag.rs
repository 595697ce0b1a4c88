//! Fuzz target for language tag and Accept-Language parsing.
//!
//! Parsed tags must print to a string that parses back to the same tag.

#![no_main]

use libfuzzer_sys::fuzz_target;
use polyglot_i18n::{LanguageTag, parse_accept_language};

fuzz_target!(|data: &str| {
    if let Ok(tag) = LanguageTag::parse(data) {
        let printed = tag.to_string();
        let reparsed = LanguageTag::parse(&printed).expect("printed tag parses");
        assert_eq!(tag, reparsed);
    }

    let tags = parse_accept_language(data);
    for (i, tag) in tags.iter().enumerate() {
        assert!(!tags[..i].contains(tag), "duplicate tag {}", tag);
    }
});
