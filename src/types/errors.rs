use thiserror::Error;

// === UrlError ===

/// Errors raised while canonicalizing a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    /// The URL was empty after trimming.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The URL could not be parsed, or has no scheme or host.
    #[error("Malformed URL: {0}")]
    Malformed(String),
}

// === BookmarkError ===

/// Errors related to bookmark, rule, category and tag operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// A required field was missing or empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The URL could not be canonicalized.
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),
    /// A business rule was violated.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Another bookmark already owns this canonical URL.
    #[error("Duplicate bookmark URL: {0}")]
    DuplicateUrl(String),
    /// The unit of work could not complete and was rolled back.
    #[error("Bookmark storage error: {0}")]
    Storage(String),
}

impl BookmarkError {
    /// Client errors are reported back as-is and never retried.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BookmarkError::Storage(_))
    }
}

impl From<UrlError> for BookmarkError {
    fn from(err: UrlError) -> Self {
        match err {
            UrlError::InvalidInput(msg) => BookmarkError::InvalidInput(msg),
            UrlError::Malformed(msg) => BookmarkError::MalformedUrl(msg),
        }
    }
}

impl From<rusqlite::Error> for BookmarkError {
    fn from(err: rusqlite::Error) -> Self {
        BookmarkError::Storage(err.to_string())
    }
}

// === MetadataError ===

/// Errors related to fetching page metadata. Always absorbed by writers.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Metadata fetching is disabled in settings.
    #[error("Metadata fetching disabled")]
    Disabled,
    /// The request could not be built for this URL.
    #[error("Metadata invalid URL: {0}")]
    InvalidUrl(String),
    /// The request failed at the network level.
    #[error("Metadata network error: {0}")]
    Network(String),
    /// The request did not finish within the configured timeout.
    #[error("Metadata request timed out after {0}s")]
    Timeout(u64),
    /// The server answered with a non-success status.
    #[error("Metadata HTTP status: {0}")]
    HttpStatus(u16),
    /// The async runtime driving the request could not be started.
    #[error("Metadata runtime error: {0}")]
    Runtime(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
