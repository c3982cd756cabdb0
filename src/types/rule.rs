use serde::{Deserialize, Serialize};

use super::bookmark::Tag;

/// A stored classification rule.
///
/// Every non-empty predicate must hold for the rule to match. `position`
/// decides priority: lower positions are consulted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub host_prefix: String,
    pub url_prefix: String,
    pub path_prefix: String,
    pub title_contains: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub tags: Vec<Tag>,
    pub position: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Rule {
    /// True when at least one match predicate is set.
    pub fn has_predicate(&self) -> bool {
        [
            &self.host_prefix,
            &self.url_prefix,
            &self.path_prefix,
            &self.title_contains,
        ]
        .iter()
        .any(|p| !p.trim().is_empty())
    }
}

/// Payload for creating or replacing a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleInput {
    pub name: String,
    pub host_prefix: String,
    pub url_prefix: String,
    pub path_prefix: String,
    pub title_contains: String,
    pub category: String,
    pub tags: Vec<String>,
}

impl RuleInput {
    /// True when at least one match predicate is set.
    pub fn has_predicate(&self) -> bool {
        [
            &self.host_prefix,
            &self.url_prefix,
            &self.path_prefix,
            &self.title_contains,
        ]
        .iter()
        .any(|p| !p.trim().is_empty())
    }
}

/// Category and tags proposed by the rule matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSuggestion {
    /// Empty when no matching rule carries a category.
    pub category: String,
    /// Deduplicated, in order of first appearance.
    pub tags: Vec<String>,
}
