//! Property-based tests for URL canonicalization and de-duplication.
//!
//! These tests verify that cosmetic URL variants always collapse to one
//! canonical form, and that saving every variant leaves exactly one bookmark.

use linkshelf::database::Database;
use linkshelf::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use linkshelf::services::metadata_fetcher::NoMetadata;
use linkshelf::services::url_canonicalizer::canonicalize_url;
use linkshelf::types::bookmark::BookmarkInput;
use proptest::prelude::*;

/// Scheme, lower-case host, path segments and an optional query.
fn arb_parts() -> impl Strategy<Value = (&'static str, String, Vec<String>, Option<String>)> {
    (
        prop_oneof![Just("https"), Just("http")],
        "[a-z][a-z0-9]{2,12}\\.(com|org|net|io)",
        proptest::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..4),
        proptest::option::of("[a-z]{1,5}=[a-zA-Z0-9]{1,5}"),
    )
}

/// Cosmetic changes that must not affect the canonical form.
#[derive(Debug, Clone)]
struct Variant {
    upper_host: bool,
    default_port: bool,
    trailing_slashes: usize,
    fragment: Option<String>,
    padding: bool,
}

fn arb_variant() -> impl Strategy<Value = Variant> {
    (
        any::<bool>(),
        any::<bool>(),
        0usize..3,
        proptest::option::of("[a-z0-9]{1,6}"),
        any::<bool>(),
    )
        .prop_map(|(upper_host, default_port, trailing_slashes, fragment, padding)| Variant {
            upper_host,
            default_port,
            trailing_slashes,
            fragment,
            padding,
        })
}

fn render(
    (scheme, host, segments, query): &(&'static str, String, Vec<String>, Option<String>),
    v: &Variant,
) -> String {
    let mut url = format!("{}://", scheme);
    if v.upper_host {
        url.push_str(&host.to_uppercase());
    } else {
        url.push_str(host);
    }
    if v.default_port {
        url.push_str(if *scheme == "https" { ":443" } else { ":80" });
    }
    for segment in segments {
        url.push('/');
        url.push_str(segment);
    }
    url.push_str(&"/".repeat(v.trailing_slashes));
    if let Some(q) = query {
        url.push('?');
        url.push_str(q);
    }
    if let Some(f) = &v.fragment {
        url.push('#');
        url.push_str(f);
    }
    if v.padding {
        url = format!("  {}\t", url);
    }
    url
}

// **Property 1: Canonicalization is idempotent**
//
// *For any* URL, canonicalizing its canonical form returns it unchanged.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn canonical_form_is_a_fixed_point(parts in arb_parts(), variant in arb_variant()) {
        let once = canonicalize_url(&render(&parts, &variant)).unwrap();
        let twice = canonicalize_url(&once).unwrap();
        prop_assert_eq!(once, twice);
    }
}

// **Property 2: Cosmetic variants are equivalent**
//
// *For any* two renderings of the same URL that differ only in host case,
// default port, trailing slashes, fragment or surrounding whitespace, the
// canonical forms are equal.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn cosmetic_variants_share_a_canonical_form(
        parts in arb_parts(),
        a in arb_variant(),
        b in arb_variant(),
    ) {
        let left = canonicalize_url(&render(&parts, &a)).unwrap();
        let right = canonicalize_url(&render(&parts, &b)).unwrap();
        prop_assert_eq!(left, right);
    }
}

// **Property 3: One row per canonical URL**
//
// *For any* sequence of saves of variants of one URL, exactly one bookmark
// exists afterwards and it carries the last submitted title.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn saving_variants_keeps_one_bookmark(
        parts in arb_parts(),
        variants in proptest::collection::vec(arb_variant(), 1..5),
    ) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let mut manager = BookmarkManager::new(db.connection(), &NoMetadata);

        let mut ids = Vec::new();
        for (i, variant) in variants.iter().enumerate() {
            let saved = manager
                .create_or_merge(BookmarkInput {
                    url: render(&parts, variant),
                    title: format!("Title {}", i),
                    ..Default::default()
                })
                .expect("create_or_merge should succeed for valid inputs");
            ids.push(saved.id);
        }

        let all = manager.list_all().unwrap();
        prop_assert_eq!(all.len(), 1);
        prop_assert!(ids.iter().all(|id| id == &all[0].id));
        prop_assert_eq!(&all[0].title, &format!("Title {}", variants.len() - 1));
    }
}
