//! Bookmark Manager for Linkshelf.
//!
//! Implements `BookmarkManagerTrait`, the create-or-merge engine. Every save
//! canonicalizes the URL, consults the classification rules and writes the
//! category, tags, bookmark row and tag attachments in one unit of work.
//! Two saves of URLs with the same canonical form always land on one row.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode};
use tracing::{debug, info, warn};

use crate::database::store::{self, BookmarkRow, BOOKMARK_COLUMNS};
use crate::database::unit_of_work;
use crate::services::metadata_fetcher::{MetadataSource, PageMetadata};
use crate::services::name_normalizer::{normalize_name, normalize_names, union_names};
use crate::services::rule_matcher::match_rules;
use crate::services::url_canonicalizer::canonicalize_url;
use crate::types::bookmark::{
    Bookmark, BookmarkFilter, BookmarkInput, BookmarkPage, BookmarkPatch, Lookup, Suggestion,
};
use crate::types::errors::{BookmarkError, MetadataError};

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Largest page a listing may return.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn create_or_merge(&mut self, input: BookmarkInput) -> Result<Bookmark, BookmarkError>;
    fn upsert_from_import(&mut self, input: BookmarkInput) -> Result<Bookmark, BookmarkError>;
    fn update(&mut self, id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError>;
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn get(&self, id: &str) -> Result<Bookmark, BookmarkError>;
    fn lookup(&self, url: &str) -> Result<Bookmark, BookmarkError>;
    fn suggest(&self, url: &str) -> Result<Suggestion, BookmarkError>;
    fn lookup_or_suggest(&self, url: &str) -> Result<Lookup, BookmarkError>;
    fn list_all(&self) -> Result<Vec<Bookmark>, BookmarkError>;
    fn list(&self, filter: &BookmarkFilter) -> Result<BookmarkPage, BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection and a metadata source.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
    metadata: &'a dyn MetadataSource,
}

/// A validated partial update. `None` keeps the stored value.
#[derive(Debug, Default)]
struct PreparedPatch {
    /// Submitted URL and its canonical form.
    url: Option<(String, String)>,
    title: Option<String>,
    description: Option<String>,
    /// Normalized category name; empty clears the reference.
    category: Option<String>,
    /// Normalized tag names replacing the current set.
    tags: Option<Vec<String>>,
}

impl PreparedPatch {
    /// Validates a caller's patch without touching storage.
    fn from_patch(patch: BookmarkPatch) -> Result<Self, BookmarkError> {
        let url = match patch.url {
            Some(raw) if raw.trim().is_empty() => {
                return Err(BookmarkError::Validation("url is required".to_string()))
            }
            Some(raw) => {
                let canonical = canonicalize_url(&raw)?;
                Some((raw, canonical))
            }
            None => None,
        };

        let title = match patch.title {
            Some(raw) => {
                let cleaned = raw.trim().to_string();
                if cleaned.is_empty() {
                    return Err(BookmarkError::Validation("title is required".to_string()));
                }
                Some(cleaned)
            }
            None => None,
        };

        Ok(Self {
            url,
            title,
            description: patch.description,
            category: patch.category.map(|c| normalize_name(&c)),
            tags: patch.tags.map(|t| normalize_names(&t)),
        })
    }
}

/// Input after canonicalization, enrichment and rule matching.
struct Resolved {
    url: String,
    canonical: String,
    title: String,
    description: String,
    category: String,
    tags: Vec<String>,
}

/// Maps a unique-index violation on the bookmark row to `DuplicateUrl`.
fn write_error(err: rusqlite::Error, canonical: &str) -> BookmarkError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == ErrorCode::ConstraintViolation {
            return BookmarkError::DuplicateUrl(canonical.to_string());
        }
    }
    BookmarkError::from(err)
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided connection and metadata source.
    pub fn new(conn: &'a Connection, metadata: &'a dyn MetadataSource) -> Self {
        Self { conn, metadata }
    }

    /// Best-effort metadata lookup. Failures are logged and dropped.
    fn fetch_metadata(&self, canonical: &str) -> PageMetadata {
        match self.metadata.fetch(canonical) {
            Ok(meta) => PageMetadata {
                title: meta.title.trim().to_string(),
                description: meta.description.trim().to_string(),
            },
            Err(MetadataError::Disabled) => PageMetadata::default(),
            Err(e) => {
                warn!(url = canonical, error = %e, "metadata fetch failed, continuing without it");
                PageMetadata::default()
            }
        }
    }

    /// Fills an empty title or description from the page itself.
    fn enrich(&self, canonical: &str, title: &mut String, description: &mut String) {
        if !title.trim().is_empty() && !description.trim().is_empty() {
            return;
        }
        let meta = self.fetch_metadata(canonical);
        if title.trim().is_empty() {
            *title = meta.title;
        }
        if description.trim().is_empty() {
            *description = meta.description;
        }
    }

    /// Applies the rules: the caller's category wins, rule tags are appended.
    fn classify(
        &self,
        canonical: &str,
        title: &str,
        category: String,
        mut tags: Vec<String>,
    ) -> Result<(String, Vec<String>), BookmarkError> {
        let rules = store::all_rules(self.conn)?;
        let suggestion = match_rules(&rules, canonical, title)?;
        let category = if normalize_name(&category).is_empty() {
            suggestion.category
        } else {
            category
        };
        tags.extend(suggestion.tags);
        Ok((category, tags))
    }

    fn insert_new(conn: &Connection, resolved: &Resolved) -> Result<Bookmark, BookmarkError> {
        let category = normalize_name(&resolved.category);
        let category_id = if category.is_empty() {
            None
        } else {
            Some(store::upsert_category(conn, &category)?)
        };

        let id = store::insert_bookmark(
            conn,
            &BookmarkRow {
                url: &resolved.url,
                normalized_url: &resolved.canonical,
                title: &resolved.title,
                description: &resolved.description,
                category_id: category_id.as_deref(),
            },
        )
        .map_err(|e| write_error(e, &resolved.canonical))?;

        let tags = store::upsert_tags(conn, &normalize_names(&resolved.tags))?;
        store::replace_bookmark_tags(conn, &id, &tags)?;

        info!(id = %id, url = %resolved.canonical, "bookmark created");
        store::find_bookmark(conn, &id)?.ok_or(BookmarkError::NotFound(id))
    }

    /// Writes `patch` over `current`. Must run inside a unit of work.
    fn apply_patch(
        conn: &Connection,
        current: &Bookmark,
        patch: &PreparedPatch,
    ) -> Result<Bookmark, BookmarkError> {
        let (url, canonical) = match &patch.url {
            Some((url, canonical)) => {
                if let Some(owner) = store::find_bookmark_by_normalized_url(conn, canonical)? {
                    if owner.id != current.id {
                        return Err(BookmarkError::DuplicateUrl(canonical.clone()));
                    }
                }
                (url.as_str(), canonical.as_str())
            }
            None => (current.url.as_str(), current.normalized_url.as_str()),
        };

        let category_id = match patch.category.as_deref() {
            Some("") => None,
            Some(name) => Some(store::upsert_category(conn, name)?),
            None => current.category_id.clone(),
        };

        store::update_bookmark(
            conn,
            &current.id,
            &BookmarkRow {
                url,
                normalized_url: canonical,
                title: patch.title.as_deref().unwrap_or(&current.title),
                description: patch.description.as_deref().unwrap_or(&current.description),
                category_id: category_id.as_deref(),
            },
        )
        .map_err(|e| write_error(e, canonical))?;

        if let Some(names) = &patch.tags {
            let tags = store::upsert_tags(conn, names)?;
            store::replace_bookmark_tags(conn, &current.id, &tags)?;
        }

        store::find_bookmark(conn, &current.id)?
            .ok_or_else(|| BookmarkError::NotFound(current.id.clone()))
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Saves a bookmark, merging into the stored row with the same canonical URL.
    ///
    /// A merge is an update of every field: title and description fall back
    /// to the stored values when empty, the category and tag set are replaced.
    fn create_or_merge(&mut self, input: BookmarkInput) -> Result<Bookmark, BookmarkError> {
        let canonical = canonicalize_url(&input.url)?;

        let mut title = input.title;
        let mut description = input.description;
        self.enrich(&canonical, &mut title, &mut description);

        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(BookmarkError::Validation("title is required".to_string()));
        }
        let description = description.trim().to_string();

        let (category, tags) = self.classify(&canonical, &title, input.category, input.tags)?;
        let resolved = Resolved {
            url: input.url,
            canonical,
            title,
            description,
            category,
            tags,
        };

        unit_of_work(self.conn, |tx| {
            match store::find_bookmark_by_normalized_url(tx, &resolved.canonical)? {
                None => Self::insert_new(tx, &resolved),
                Some(existing) => {
                    debug!(id = %existing.id, url = %resolved.canonical, "merging into existing bookmark");
                    let description = if resolved.description.is_empty() {
                        existing.description.clone()
                    } else {
                        resolved.description.clone()
                    };
                    let patch = PreparedPatch {
                        url: Some((resolved.url.clone(), resolved.canonical.clone())),
                        title: Some(resolved.title.clone()),
                        description: Some(description),
                        category: Some(normalize_name(&resolved.category)),
                        tags: Some(normalize_names(&resolved.tags)),
                    };
                    Self::apply_patch(tx, &existing, &patch)
                }
            }
        })
    }

    /// Saves one imported entry without losing anything already stored.
    ///
    /// On an existing row only empty fields are filled and tags are unioned.
    /// Metadata is fetched only for URLs not yet stored.
    fn upsert_from_import(&mut self, input: BookmarkInput) -> Result<Bookmark, BookmarkError> {
        let canonical = canonicalize_url(&input.url)?;

        let mut title = input.title.trim().to_string();
        let mut description = input.description.trim().to_string();
        let stored = store::find_bookmark_by_normalized_url(self.conn, &canonical)?;
        if stored.is_none() {
            self.enrich(&canonical, &mut title, &mut description);
            title = title.trim().to_string();
            description = description.trim().to_string();
        }

        let match_title = match (&stored, title.is_empty()) {
            (Some(b), true) => b.title.clone(),
            _ => title.clone(),
        };
        let (category, tags) = self.classify(&canonical, &match_title, input.category, input.tags)?;
        let resolved = Resolved {
            url: input.url,
            canonical,
            title,
            description,
            category: normalize_name(&category),
            tags: normalize_names(&tags),
        };

        unit_of_work(self.conn, |tx| {
            match store::find_bookmark_by_normalized_url(tx, &resolved.canonical)? {
                None => {
                    if resolved.title.is_empty() {
                        return Err(BookmarkError::Validation("title is required".to_string()));
                    }
                    Self::insert_new(tx, &resolved)
                }
                Some(existing) => {
                    debug!(id = %existing.id, url = %resolved.canonical, "import filling existing bookmark");
                    let fill = |current: &str, incoming: &str| {
                        (current.is_empty() && !incoming.is_empty()).then(|| incoming.to_string())
                    };
                    let patch = PreparedPatch {
                        url: None,
                        title: fill(&existing.title, &resolved.title),
                        description: fill(&existing.description, &resolved.description),
                        category: (existing.category_id.is_none() && !resolved.category.is_empty())
                            .then(|| resolved.category.clone()),
                        tags: Some(union_names(&existing.tag_names(), &resolved.tags)),
                    };
                    Self::apply_patch(tx, &existing, &patch)
                }
            }
        })
    }

    /// Applies a partial update. Omitted fields are left untouched; an
    /// empty patch returns the stored bookmark without writing.
    fn update(&mut self, id: &str, patch: BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        if patch.is_empty() {
            return self.get(id);
        }
        let prepared = PreparedPatch::from_patch(patch)?;

        unit_of_work(self.conn, |tx| {
            let current = store::find_bookmark(tx, id)?
                .ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;
            Self::apply_patch(tx, &current, &prepared)
        })
    }

    /// Deletes a bookmark. Its category and tags stay.
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        store::find_bookmark(self.conn, id)?.ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    /// Finds the bookmark stored under the canonical form of `url`.
    fn lookup(&self, url: &str) -> Result<Bookmark, BookmarkError> {
        let canonical = canonicalize_url(url)?;
        store::find_bookmark_by_normalized_url(self.conn, &canonical)?
            .ok_or(BookmarkError::NotFound(canonical))
    }

    /// Classifies a URL without saving it.
    fn suggest(&self, url: &str) -> Result<Suggestion, BookmarkError> {
        let canonical = canonicalize_url(url)?;
        let mut title = String::new();
        let mut description = String::new();
        self.enrich(&canonical, &mut title, &mut description);

        let (category, tags) = self.classify(&canonical, &title, String::new(), Vec::new())?;
        Ok(Suggestion {
            normalized_url: canonical,
            title,
            description,
            category,
            tags,
        })
    }

    fn lookup_or_suggest(&self, url: &str) -> Result<Lookup, BookmarkError> {
        match self.lookup(url) {
            Ok(bookmark) => Ok(Lookup::Found(bookmark)),
            Err(BookmarkError::NotFound(_)) => self.suggest(url).map(Lookup::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Every bookmark, newest first.
    fn list_all(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        Ok(store::all_bookmarks(self.conn)?)
    }

    /// One page of bookmarks matching `filter`, newest first.
    fn list(&self, filter: &BookmarkFilter) -> Result<BookmarkPage, BookmarkError> {
        let page = filter.page.max(1);
        let page_size = if filter.page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            filter.page_size.min(MAX_PAGE_SIZE)
        };

        let mut clauses = vec!["1=1".to_string()];
        let mut args: Vec<Value> = Vec::new();

        if let Some(query) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", query);
            clauses.push("(b.title LIKE ? OR b.description LIKE ? OR b.url LIKE ?)".to_string());
            args.extend(std::iter::repeat(Value::Text(pattern)).take(3));
        }
        if let Some(category) = filter.category.as_deref().map(normalize_name).filter(|c| !c.is_empty()) {
            clauses.push("c.name = ?".to_string());
            args.push(Value::Text(category));
        }
        let tags = normalize_names(&filter.tags);
        if !tags.is_empty() {
            let marks = vec!["?"; tags.len()].join(", ");
            clauses.push(format!(
                "b.id IN (SELECT bt.bookmark_id FROM bookmark_tags bt \
                 INNER JOIN tags t ON t.id = bt.tag_id WHERE t.name IN ({}))",
                marks
            ));
            args.extend(tags.into_iter().map(Value::Text));
        }
        let where_sql = clauses.join(" AND ");

        let total: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM bookmarks b \
                 LEFT JOIN categories c ON c.id = b.category_id WHERE {}",
                where_sql
            ),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        args.push(Value::Integer(page_size));
        args.push(Value::Integer((page - 1).saturating_mul(page_size)));
        let sql = format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks b \
             LEFT JOIN categories c ON c.id = b.category_id WHERE {} \
             ORDER BY b.created_at DESC, b.rowid DESC LIMIT ? OFFSET ?",
            where_sql
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), store::row_to_bookmark)?;
        let mut items = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        for bookmark in &mut items {
            bookmark.tags = store::bookmark_tags(self.conn, &bookmark.id)?;
        }

        Ok(BookmarkPage {
            items,
            page,
            page_size,
            total,
        })
    }
}
