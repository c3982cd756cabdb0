use serde::{Deserialize, Serialize};

/// Top-level service settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceSettings {
    /// SQLite database file. Relative paths resolve against `LINKSHELF_DATA_DIR` when set.
    pub database_path: String,
    /// Fallback `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub metadata: MetadataSettings,
    pub export: ExportSettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            database_path: "linkshelf.db".to_string(),
            log_filter: "info".to_string(),
            metadata: MetadataSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

/// Page metadata fetching used to fill in missing titles and descriptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetadataSettings {
    pub enabled: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_body_bytes: usize,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 10,
            user_agent: format!("linkshelf/{}", env!("CARGO_PKG_VERSION")),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Bookmark file export settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    pub layout: ExportLayout,
    pub filename_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            layout: ExportLayout::Flat,
            filename_prefix: "bookmarks".to_string(),
        }
    }
}

/// How exported bookmarks are arranged in the file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportLayout {
    /// One list, category carried as an attribute.
    #[default]
    Flat,
    /// Categorized bookmarks grouped under one folder per category.
    Folders,
}
