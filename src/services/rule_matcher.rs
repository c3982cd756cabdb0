//! Rule-based classification of bookmarks.
//!
//! Rules are consulted in `position` order. The category comes from the
//! first matching rule that has one; tags are the union of every matching
//! rule's tags.

use url::Url;

use crate::services::name_normalizer::{normalize_name, normalize_names};
use crate::types::errors::UrlError;
use crate::types::rule::{Rule, RuleSuggestion};

/// The candidate fields a rule is tested against, lower-cased once.
struct Candidate {
    host: String,
    url: String,
    path: String,
    title: String,
}

impl Candidate {
    fn new(canonical_url: &str, title: &str) -> Result<Self, UrlError> {
        let parsed = Url::parse(canonical_url)
            .map_err(|e| UrlError::Malformed(format!("{}: {}", canonical_url, e)))?;
        Ok(Self {
            host: parsed.host_str().unwrap_or_default().to_lowercase(),
            url: canonical_url.to_lowercase(),
            path: parsed.path().to_lowercase(),
            title: title.to_lowercase(),
        })
    }
}

/// Returns true when every non-empty predicate of `rule` holds for `candidate`.
fn rule_applies(rule: &Rule, candidate: &Candidate) -> bool {
    let prefix_ok = |predicate: &str, field: &str| {
        let predicate = normalize_name(predicate);
        predicate.is_empty() || field.starts_with(&predicate)
    };
    let title = normalize_name(&rule.title_contains);

    prefix_ok(&rule.host_prefix, &candidate.host)
        && prefix_ok(&rule.url_prefix, &candidate.url)
        && prefix_ok(&rule.path_prefix, &candidate.path)
        && (title.is_empty() || candidate.title.contains(&title))
}

/// Suggests a category and tags for an already-canonical URL and title.
///
/// # Errors
/// `UrlError::Malformed` if `canonical_url` does not parse.
pub fn match_rules(
    rules: &[Rule],
    canonical_url: &str,
    title: &str,
) -> Result<RuleSuggestion, UrlError> {
    let candidate = Candidate::new(canonical_url, title)?;

    let mut ordered: Vec<&Rule> = rules.iter().collect();
    ordered.sort_by_key(|r| r.position);

    let mut category = String::new();
    let mut tags = Vec::new();
    for rule in ordered.into_iter().filter(|r| rule_applies(r, &candidate)) {
        if category.is_empty() {
            if let Some(name) = rule.category_name.as_deref() {
                category = normalize_name(name);
            }
        }
        tags.extend(rule.tags.iter().map(|t| t.name.clone()));
    }

    Ok(RuleSuggestion {
        category,
        tags: normalize_names(&tags),
    })
}
