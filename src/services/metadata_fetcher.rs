//! Page metadata enrichment.
//!
//! Fetches a page and pulls its `<title>` and description so bookmarks saved
//! without them still read well. Fetch failures never fail a save; callers
//! treat every error as "no metadata".

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::services::html_tree;
use crate::types::errors::MetadataError;
use crate::types::settings::MetadataSettings;

/// Title and description extracted from a page. Empty means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }
}

/// Source of page metadata for a canonical URL.
pub trait MetadataSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<PageMetadata, MetadataError>;
}

/// A source that never fetches. Used when enrichment is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {
    fn fetch(&self, _url: &str) -> Result<PageMetadata, MetadataError> {
        Err(MetadataError::Disabled)
    }
}

/// Fetches metadata over HTTP with a bounded timeout and body size.
///
/// The fetch is blocking from the caller's point of view: a private
/// current-thread runtime drives the async client.
pub struct HttpMetadataSource {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpMetadataSource {
    /// # Errors
    /// `MetadataError::Runtime` if the HTTP client or runtime cannot be built.
    pub fn new(settings: &MetadataSettings) -> Result<Self, MetadataError> {
        let timeout = Duration::from_secs(settings.timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| MetadataError::Runtime(format!("Failed to build HTTP client: {}", e)))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| MetadataError::Runtime(format!("Failed to build runtime: {}", e)))?;

        Ok(Self {
            client,
            runtime,
            timeout,
            max_body_bytes: settings.max_body_bytes,
        })
    }

    async fn fetch_body(&self, url: &str) -> Result<String, MetadataError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MetadataError::HttpStatus(response.status().as_u16()));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?
        {
            let room = self.max_body_bytes.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= self.max_body_bytes {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch(&self, url: &str) -> Result<PageMetadata, MetadataError> {
        let parsed =
            Url::parse(url).map_err(|e| MetadataError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MetadataError::InvalidUrl(format!(
                "{}: unsupported scheme",
                url
            )));
        }

        debug!(url, "fetching page metadata");
        let body = self
            .runtime
            .block_on(async { tokio::time::timeout(self.timeout, self.fetch_body(url)).await })
            .map_err(|_| MetadataError::Timeout(self.timeout.as_secs()))??;

        Ok(extract_metadata(&body))
    }
}

/// Extracts the page title and description from an HTML document.
///
/// Prefers `<title>` and `<meta name="description">`, falling back to the
/// Open Graph equivalents.
pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = html_tree::parse(html);
    let mut metas = Vec::new();
    document.find_all("meta", &mut metas);

    let meta_content = |key: &str| -> String {
        metas
            .iter()
            .find(|m| {
                m.attr("name")
                    .or_else(|| m.attr("property"))
                    .is_some_and(|n| n.trim().eq_ignore_ascii_case(key))
            })
            .and_then(|m| m.attr("content"))
            .map(collapse_whitespace)
            .unwrap_or_default()
    };

    let mut title = document
        .find_first("title")
        .map(|t| collapse_whitespace(&t.text()))
        .unwrap_or_default();
    if title.is_empty() {
        title = meta_content("og:title");
    }

    let mut description = meta_content("description");
    if description.is_empty() {
        description = meta_content("og:description");
    }

    PageMetadata { title, description }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
