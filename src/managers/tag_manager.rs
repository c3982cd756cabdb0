//! Tag Manager for Linkshelf.

use rusqlite::Connection;

use super::category_manager::{clean_label, rename_label};
use crate::database::store::{self, LabelTable};
use crate::services::name_normalizer::TAG_SEPARATOR;
use crate::types::bookmark::Tag;
use crate::types::errors::BookmarkError;

/// Trait defining tag management operations.
pub trait TagManagerTrait {
    fn list(&self) -> Result<Vec<Tag>, BookmarkError>;
    fn create(&mut self, name: &str) -> Result<Tag, BookmarkError>;
    fn rename(&mut self, id: &str, name: &str) -> Result<Tag, BookmarkError>;
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError>;
}

/// Tag manager backed by a SQLite connection.
pub struct TagManager<'a> {
    conn: &'a Connection,
}

impl<'a> TagManager<'a> {
    /// Creates a new `TagManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

/// A tag name must survive being written to a `TAGS` attribute.
fn clean_tag(name: &str) -> Result<String, BookmarkError> {
    let cleaned = clean_label(name)?;
    if cleaned.contains(TAG_SEPARATOR) {
        return Err(BookmarkError::Validation(format!(
            "tag name cannot contain '{}'",
            TAG_SEPARATOR
        )));
    }
    Ok(cleaned)
}

impl<'a> TagManagerTrait for TagManager<'a> {
    fn list(&self) -> Result<Vec<Tag>, BookmarkError> {
        Ok(store::all_tags(self.conn)?)
    }

    /// Creates a tag, or returns the existing one with that name.
    fn create(&mut self, name: &str) -> Result<Tag, BookmarkError> {
        let name = clean_tag(name)?;
        Ok(store::upsert_tag(self.conn, &name)?)
    }

    fn rename(&mut self, id: &str, name: &str) -> Result<Tag, BookmarkError> {
        let name = rename_label(self.conn, LabelTable::Tags, id, &clean_tag(name)?)?;
        Ok(Tag {
            id: id.to_string(),
            name,
        })
    }

    /// Deletes a tag and detaches it from every bookmark and rule.
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError> {
        if store::delete_label(self.conn, LabelTable::Tags, id)? == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
