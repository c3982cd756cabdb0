// Linkshelf state managers
// Managers run the stateful operations over the database: bookmarks, rules,
// categories, tags and bookmark file import/export.

pub mod bookmark_manager;
pub mod category_manager;
pub mod import_export;
pub mod rule_manager;
pub mod tag_manager;
