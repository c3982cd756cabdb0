//! Comparison keys for category names, tag names and rule predicates.

use std::collections::HashSet;

/// Lower-cases and trims a label. Empty output means "absent".
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Separates tag names in the `TAGS` attribute of a bookmark file.
pub const TAG_SEPARATOR: &str = ",";

/// Normalizes every name, dropping empties and duplicates.
///
/// An entry holding [`TAG_SEPARATOR`] counts as several names, so a stored
/// name never contains one. Keeps the order of first appearance.
pub fn normalize_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(names.len());
    for name in names.iter().flat_map(|n| n.as_ref().split(TAG_SEPARATOR)) {
        let cleaned = normalize_name(name);
        if cleaned.is_empty() {
            continue;
        }
        if seen.insert(cleaned.clone()) {
            result.push(cleaned);
        }
    }
    result
}

/// Appends the names from `incoming` that `existing` does not already hold.
pub fn union_names(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut merged = existing.to_vec();
    merged.extend(incoming.iter().cloned());
    normalize_names(&merged)
}
