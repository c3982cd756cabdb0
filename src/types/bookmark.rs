use serde::{Deserialize, Serialize};

/// Represents a stored bookmark together with its category and tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    /// URL exactly as it was submitted.
    pub url: String,
    /// Canonical form of `url`, unique across all bookmarks.
    pub normalized_url: String,
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    /// Attached tags, sorted by name.
    pub tags: Vec<Tag>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Bookmark {
    /// Returns the attached tag names in display order.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }
}

/// A shared, uniquely-named tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// A shared, uniquely-named category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Payload for creating a bookmark (or merging into an existing one).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkInput {
    pub url: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Partial update: `None` leaves a field untouched, `Some` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookmarkPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl BookmarkPatch {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.tags.is_none()
    }
}

/// Filters for paginated bookmark listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookmarkFilter {
    /// Substring matched against title, description and url.
    pub query: Option<String>,
    pub category: Option<String>,
    /// Matches bookmarks carrying any of these tags.
    pub tags: Vec<String>,
    pub page: i64,
    pub page_size: i64,
}

/// One page of bookmarks plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkPage {
    pub items: Vec<Bookmark>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}

/// Classification proposed for a URL that has not been saved yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub normalized_url: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Result of looking a URL up by its canonical form.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Bookmark),
    NotFound(Suggestion),
}

/// A bookmark read out of a bookmark file, before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCandidate {
    pub url: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl From<ImportCandidate> for BookmarkInput {
    fn from(c: ImportCandidate) -> Self {
        Self {
            url: c.url,
            title: c.title,
            description: c.description,
            category: c.category,
            tags: c.tags,
        }
    }
}

/// An import entry that was rejected, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub url: String,
    pub reason: String,
}

/// Outcome of importing a bookmark file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: Vec<Bookmark>,
    pub skipped: Vec<SkippedEntry>,
}

/// A rendered bookmark file ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}
