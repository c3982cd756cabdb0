//! Unit tests for URL canonicalization.

use linkshelf::services::url_canonicalizer::canonicalize_url;
use linkshelf::types::errors::UrlError;
use rstest::rstest;

#[rstest]
#[case("https://Example.com:443/a/", "https://example.com/a")]
#[case("http://example.com:80/", "http://example.com")]
#[case("https://example.com", "https://example.com")]
#[case("https://example.com:8443/x", "https://example.com:8443/x")]
#[case("http://example.com:443/x", "http://example.com:443/x")]
#[case("https://example.com/a///", "https://example.com/a")]
#[case("https://example.com/docs#intro", "https://example.com/docs")]
#[case("https://example.com/s?q=Rust&page=2", "https://example.com/s?q=Rust&page=2")]
#[case("HTTPS://WWW.Example.COM/Path", "https://www.example.com/Path")]
#[case("  https://example.com/a  ", "https://example.com/a")]
fn test_canonical_forms(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(canonicalize_url(raw).unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("   ")]
fn test_empty_input_is_invalid(#[case] raw: &str) {
    assert!(matches!(canonicalize_url(raw), Err(UrlError::InvalidInput(_))));
}

#[rstest]
#[case("not a url")]
#[case("/relative/path")]
#[case("mailto:someone@example.com")]
#[case("http://")]
fn test_malformed_input(#[case] raw: &str) {
    assert!(matches!(canonicalize_url(raw), Err(UrlError::Malformed(_))));
}

#[test]
fn test_path_case_is_preserved() {
    let a = canonicalize_url("https://example.com/Readme").unwrap();
    let b = canonicalize_url("https://example.com/readme").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_canonical_form_is_a_fixed_point() {
    let once = canonicalize_url("https://Example.com:443/a/?x=1#frag").unwrap();
    assert_eq!(canonicalize_url(&once).unwrap(), once);
}
