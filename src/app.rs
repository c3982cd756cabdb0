//! App Core for Linkshelf.
//!
//! Central struct holding the database, the loaded settings and the metadata
//! source. Managers borrow the connection, so they are created on demand.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::database::connection::Database;
use crate::database::store;
use crate::managers::bookmark_manager::BookmarkManager;
use crate::managers::category_manager::CategoryManager;
use crate::managers::import_export::ImportExportManager;
use crate::managers::rule_manager::RuleManager;
use crate::managers::tag_manager::TagManager;
use crate::services::metadata_fetcher::{HttpMetadataSource, MetadataSource, NoMetadata};
use crate::types::errors::BookmarkError;
use crate::types::settings::{MetadataSettings, ServiceSettings};

/// Central application struct.
pub struct App {
    pub db: Arc<Database>,
    pub settings: ServiceSettings,
    metadata: Box<dyn MetadataSource>,
}

/// Builds the metadata source the settings ask for.
///
/// A client that fails to build disables enrichment instead of failing startup.
pub fn metadata_source_for(settings: &MetadataSettings) -> Box<dyn MetadataSource> {
    if !settings.enabled {
        return Box::new(NoMetadata);
    }
    match HttpMetadataSource::new(settings) {
        Ok(source) => Box::new(source),
        Err(e) => {
            warn!(error = %e, "metadata fetching disabled");
            Box::new(NoMetadata)
        }
    }
}

impl App {
    /// Opens the database at `db_path` and wires the metadata source from `settings`.
    pub fn new<P: AsRef<Path>>(
        db_path: P,
        settings: ServiceSettings,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;
        let metadata = metadata_source_for(&settings.metadata);
        Ok(Self::with_parts(db, settings, metadata))
    }

    /// Assembles an App from an already-open database and metadata source.
    pub fn with_parts(
        db: Database,
        settings: ServiceSettings,
        metadata: Box<dyn MetadataSource>,
    ) -> Self {
        Self {
            db: Arc::new(db),
            settings,
            metadata,
        }
    }

    pub fn bookmarks(&self) -> BookmarkManager<'_> {
        BookmarkManager::new(self.db.connection(), self.metadata.as_ref())
    }

    pub fn rules(&self) -> RuleManager<'_> {
        RuleManager::new(self.db.connection())
    }

    pub fn categories(&self) -> CategoryManager<'_> {
        CategoryManager::new(self.db.connection())
    }

    pub fn tags(&self) -> TagManager<'_> {
        TagManager::new(self.db.connection())
    }

    pub fn import_export(&self) -> ImportExportManager<'_> {
        ImportExportManager::new(
            self.db.connection(),
            self.metadata.as_ref(),
            &self.settings.export,
        )
    }

    /// Deletes every bookmark, rule, category and tag in one unit of work.
    pub fn clear_data(&self) -> Result<(), BookmarkError> {
        self.db
            .unit_of_work(|tx| store::clear_all(tx).map_err(BookmarkError::from))
    }
}
