//! Property-based tests for the Netscape bookmark file codec.
//!
//! These tests verify that encoding stored bookmarks and decoding the result
//! yields the same url, title, description, category and tags, for either
//! export layout, for text full of markup characters and for tag input
//! holding separators.

use linkshelf::services::bookmark_file::{decode, encode};
use linkshelf::services::name_normalizer::normalize_names;
use linkshelf::types::bookmark::{Bookmark, ImportCandidate, Tag};
use linkshelf::types::settings::ExportLayout;
use proptest::prelude::*;

/// Text that starts and ends with a visible character and may contain
/// characters that need escaping.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9<>&\"' .,;:!?-]{0,24}[a-zA-Z0-9]"
}

fn arb_bookmark() -> impl Strategy<Value = (String, String, Option<String>, Option<String>, Vec<String>)> {
    (
        "[a-z0-9/_-]{0,12}",
        arb_text(),
        proptest::option::of(arb_text()),
        proptest::option::of("[a-z][a-z0-9]{0,7}"),
        proptest::collection::vec("[a-z0-9,]{1,8}", 0..4),
    )
}

fn arb_layout() -> impl Strategy<Value = ExportLayout> {
    prop_oneof![Just(ExportLayout::Flat), Just(ExportLayout::Folders)]
}

fn build(
    index: usize,
    (path, title, description, category, tags): (String, String, Option<String>, Option<String>, Vec<String>),
) -> Bookmark {
    let url = format!("https://site{}.example/{}", index, path);
    Bookmark {
        id: format!("bm-{}", index),
        normalized_url: url.clone(),
        url,
        title,
        description: description.unwrap_or_default(),
        category_id: category.as_ref().map(|c| format!("cat-{}", c)),
        category_name: category,
        tags: normalize_names(&tags)
            .into_iter()
            .map(|name| Tag {
                id: format!("tag-{}", name),
                name,
            })
            .collect(),
        created_at: 1_700_000_000 + index as i64,
        updated_at: 1_700_000_000 + index as i64,
    }
}

fn expected(bookmark: &Bookmark) -> ImportCandidate {
    ImportCandidate {
        url: bookmark.url.clone(),
        title: bookmark.title.clone(),
        description: bookmark.description.clone(),
        category: bookmark.category_name.clone().unwrap_or_default(),
        tags: bookmark.tag_names(),
    }
}

// **Property 1: Encode then decode preserves every bookmark**
//
// *For any* list of bookmarks and either layout, decoding the encoded file
// returns one candidate per bookmark with the same fields.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn encoded_bookmarks_decode_to_the_same_fields(
        raw in proptest::collection::vec(arb_bookmark(), 0..8),
        layout in arb_layout(),
    ) {
        let bookmarks: Vec<Bookmark> = raw
            .into_iter()
            .enumerate()
            .map(|(i, parts)| build(i, parts))
            .collect();

        let html = encode(&bookmarks, layout);
        let mut decoded = decode(html.as_bytes());
        let mut wanted: Vec<ImportCandidate> = bookmarks.iter().map(expected).collect();

        if layout == ExportLayout::Flat {
            prop_assert_eq!(&decoded, &wanted);
        }
        decoded.sort_by(|a, b| a.url.cmp(&b.url));
        wanted.sort_by(|a, b| a.url.cmp(&b.url));
        prop_assert_eq!(decoded, wanted);
    }
}

// **Property 2: Decoding never panics**
//
// *For any* byte soup, decoding returns (possibly empty) candidates whose
// urls are non-empty and trimmed.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn decoding_arbitrary_bytes_is_safe(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        for candidate in decode(&bytes) {
            prop_assert!(!candidate.url.is_empty());
            prop_assert_eq!(candidate.url.trim(), candidate.url.as_str());
        }
    }
}
