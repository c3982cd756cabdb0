//! Bookmark file import and export.
//!
//! Import decodes the whole file first, then saves entries one at a time,
//! each in its own unit of work. An entry the engine rejects is reported and
//! skipped; a storage failure stops the import.

use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};

use super::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::services::bookmark_file::{self, MIME_TYPE};
use crate::services::metadata_fetcher::MetadataSource;
use crate::types::bookmark::{ExportFile, ImportReport, SkippedEntry};
use crate::types::errors::BookmarkError;
use crate::types::settings::ExportSettings;

/// Import/export manager backed by a SQLite connection.
pub struct ImportExportManager<'a> {
    bookmarks: BookmarkManager<'a>,
    export: &'a ExportSettings,
}

impl<'a> ImportExportManager<'a> {
    pub fn new(
        conn: &'a Connection,
        metadata: &'a dyn MetadataSource,
        export: &'a ExportSettings,
    ) -> Self {
        Self {
            bookmarks: BookmarkManager::new(conn, metadata),
            export,
        }
    }

    /// Imports a Netscape bookmark file.
    ///
    /// # Errors
    /// Only storage failures are returned; entries already saved stay saved.
    pub fn import_html(&mut self, bytes: &[u8]) -> Result<ImportReport, BookmarkError> {
        let candidates = bookmark_file::decode(bytes);
        let total = candidates.len();
        let mut report = ImportReport::default();

        for candidate in candidates {
            let url = candidate.url.clone();
            match self.bookmarks.upsert_from_import(candidate.into()) {
                Ok(bookmark) => report.imported.push(bookmark),
                Err(e) if e.is_client_error() => {
                    warn!(url = %url, error = %e, "skipping import entry");
                    report.skipped.push(SkippedEntry {
                        url,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            total,
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "bookmark import finished"
        );
        Ok(report)
    }

    /// Renders every stored bookmark as a downloadable bookmark file.
    pub fn export_html(&self) -> Result<ExportFile, BookmarkError> {
        let bookmarks = self.bookmarks.list_all()?;
        let content = bookmark_file::encode(&bookmarks, self.export.layout);
        info!(count = bookmarks.len(), "bookmarks exported");
        Ok(ExportFile {
            filename: bookmark_file::export_filename(&self.export.filename_prefix, Utc::now()),
            mime_type: MIME_TYPE,
            content,
        })
    }
}
