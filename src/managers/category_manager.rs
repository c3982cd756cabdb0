//! Category Manager for Linkshelf.
//!
//! Categories are shared by id from bookmarks and rules, so a rename is
//! visible everywhere at once and a delete only clears those references.

use rusqlite::Connection;

use crate::database::store::{self, LabelTable};
use crate::services::name_normalizer::normalize_name;
use crate::types::bookmark::Category;
use crate::types::errors::BookmarkError;

/// Trait defining category management operations.
pub trait CategoryManagerTrait {
    fn list(&self) -> Result<Vec<Category>, BookmarkError>;
    fn create(&mut self, name: &str) -> Result<Category, BookmarkError>;
    fn rename(&mut self, id: &str, name: &str) -> Result<Category, BookmarkError>;
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError>;
}

/// Category manager backed by a SQLite connection.
pub struct CategoryManager<'a> {
    conn: &'a Connection,
}

impl<'a> CategoryManager<'a> {
    /// Creates a new `CategoryManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

/// Normalizes a label name, rejecting empty ones.
pub(crate) fn clean_label(name: &str) -> Result<String, BookmarkError> {
    let cleaned = normalize_name(name);
    if cleaned.is_empty() {
        return Err(BookmarkError::Validation("name is required".to_string()));
    }
    Ok(cleaned)
}

/// Renames a label, refusing names already used by a different row.
pub(crate) fn rename_label(
    conn: &Connection,
    table: LabelTable,
    id: &str,
    name: &str,
) -> Result<String, BookmarkError> {
    let cleaned = clean_label(name)?;
    if let Some(owner) = store::find_label_by_name(conn, table, &cleaned)? {
        if owner != id {
            return Err(BookmarkError::Validation(format!(
                "name '{}' is already in use",
                cleaned
            )));
        }
    }
    if store::rename_label(conn, table, id, &cleaned)? == 0 {
        return Err(BookmarkError::NotFound(id.to_string()));
    }
    Ok(cleaned)
}

impl<'a> CategoryManagerTrait for CategoryManager<'a> {
    /// Lists categories sorted by name.
    fn list(&self) -> Result<Vec<Category>, BookmarkError> {
        Ok(store::all_categories(self.conn)?)
    }

    /// Creates a category, or returns the existing one with that name.
    fn create(&mut self, name: &str) -> Result<Category, BookmarkError> {
        let name = clean_label(name)?;
        let id = store::upsert_category(self.conn, &name)?;
        Ok(Category { id, name })
    }

    fn rename(&mut self, id: &str, name: &str) -> Result<Category, BookmarkError> {
        let name = rename_label(self.conn, LabelTable::Categories, id, name)?;
        Ok(Category {
            id: id.to_string(),
            name,
        })
    }

    /// Deletes a category. Bookmarks and rules using it become uncategorized.
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError> {
        if store::delete_label(self.conn, LabelTable::Categories, id)? == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
