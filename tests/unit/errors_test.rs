use linkshelf::types::errors::*;

// === UrlError Tests ===

#[test]
fn url_error_display_variants() {
    assert_eq!(
        UrlError::InvalidInput("url is required".to_string()).to_string(),
        "Invalid input: url is required"
    );
    assert_eq!(
        UrlError::Malformed("nope".to_string()).to_string(),
        "Malformed URL: nope"
    );
}

// === BookmarkError Tests ===

#[test]
fn bookmark_error_display_variants() {
    assert_eq!(
        BookmarkError::Validation("title is required".to_string()).to_string(),
        "Validation failed: title is required"
    );
    assert_eq!(
        BookmarkError::NotFound("bm-1".to_string()).to_string(),
        "Not found: bm-1"
    );
    assert_eq!(
        BookmarkError::DuplicateUrl("https://example.com".to_string()).to_string(),
        "Duplicate bookmark URL: https://example.com"
    );
    assert_eq!(
        BookmarkError::Storage("disk I/O error".to_string()).to_string(),
        "Bookmark storage error: disk I/O error"
    );
}

#[test]
fn bookmark_error_from_url_error_keeps_kind() {
    let invalid: BookmarkError = UrlError::InvalidInput("empty".to_string()).into();
    assert!(matches!(invalid, BookmarkError::InvalidInput(ref m) if m == "empty"));

    let malformed: BookmarkError = UrlError::Malformed("x".to_string()).into();
    assert!(matches!(malformed, BookmarkError::MalformedUrl(_)));
}

#[test]
fn bookmark_error_from_sqlite_is_storage() {
    let err: BookmarkError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, BookmarkError::Storage(_)));
    assert!(!err.is_client_error());
}

#[test]
fn bookmark_error_client_classification() {
    assert!(BookmarkError::InvalidInput(String::new()).is_client_error());
    assert!(BookmarkError::MalformedUrl(String::new()).is_client_error());
    assert!(BookmarkError::Validation(String::new()).is_client_error());
    assert!(BookmarkError::NotFound(String::new()).is_client_error());
    assert!(BookmarkError::DuplicateUrl(String::new()).is_client_error());
}

// === MetadataError Tests ===

#[test]
fn metadata_error_display_variants() {
    assert_eq!(MetadataError::Disabled.to_string(), "Metadata fetching disabled");
    assert_eq!(
        MetadataError::Timeout(10).to_string(),
        "Metadata request timed out after 10s"
    );
    assert_eq!(MetadataError::HttpStatus(404).to_string(), "Metadata HTTP status: 404");
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::IoError("denied".to_string()).to_string(),
        "Settings I/O error: denied"
    );
    assert_eq!(
        SettingsError::InvalidValue("timeout".to_string()).to_string(),
        "Invalid settings value: timeout"
    );
}

#[test]
fn errors_implement_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(BookmarkError::NotFound("id".to_string()));
    assert!(err.source().is_none());
}
