// Linkshelf services
// Stateless building blocks: URL canonicalization, name normalization, rule
// matching, the bookmark file codec, page metadata and settings.

pub mod bookmark_file;
pub mod html_tree;
pub mod metadata_fetcher;
pub mod name_normalizer;
pub mod rule_matcher;
pub mod settings_engine;
pub mod url_canonicalizer;
