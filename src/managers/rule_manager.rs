//! Rule Manager for Linkshelf.
//!
//! CRUD for classification rules. Rules are kept in an explicit `position`
//! order that the rule matcher consults; new rules go last.

use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

use crate::database::store;
use crate::database::unit_of_work;
use crate::services::name_normalizer::{normalize_name, normalize_names};
use crate::types::errors::BookmarkError;
use crate::types::rule::{Rule, RuleInput};

/// Trait defining rule management operations.
pub trait RuleManagerTrait {
    fn list(&self) -> Result<Vec<Rule>, BookmarkError>;
    fn get(&self, id: &str) -> Result<Rule, BookmarkError>;
    fn create(&mut self, input: RuleInput) -> Result<Rule, BookmarkError>;
    fn update(&mut self, id: &str, input: RuleInput) -> Result<Rule, BookmarkError>;
    fn delete(&mut self, id: &str) -> Result<(), BookmarkError>;
    fn move_rule(&mut self, id: &str, position: i64) -> Result<Vec<Rule>, BookmarkError>;
}

/// Rule manager backed by a SQLite connection.
pub struct RuleManager<'a> {
    conn: &'a Connection,
}

/// Trimmed rule fields, ready to write.
struct CleanRule {
    name: String,
    host_prefix: String,
    url_prefix: String,
    path_prefix: String,
    title_contains: String,
    category: String,
    tags: Vec<String>,
}

impl CleanRule {
    fn validate(input: RuleInput) -> Result<Self, BookmarkError> {
        if input.name.trim().is_empty() {
            return Err(BookmarkError::Validation("name is required".to_string()));
        }
        if !input.has_predicate() {
            return Err(BookmarkError::Validation(
                "at least one matching condition is required".to_string(),
            ));
        }
        Ok(Self {
            name: input.name.trim().to_string(),
            host_prefix: input.host_prefix.trim().to_string(),
            url_prefix: input.url_prefix.trim().to_string(),
            path_prefix: input.path_prefix.trim().to_string(),
            title_contains: input.title_contains.trim().to_string(),
            category: normalize_name(&input.category),
            tags: normalize_names(&input.tags),
        })
    }

    fn category_id(&self, conn: &Connection) -> rusqlite::Result<Option<String>> {
        if self.category.is_empty() {
            Ok(None)
        } else {
            store::upsert_category(conn, &self.category).map(Some)
        }
    }
}

impl<'a> RuleManager<'a> {
    /// Creates a new `RuleManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Computes the position after the last rule.
    fn next_position(conn: &Connection) -> Result<i64, BookmarkError> {
        let pos: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM rules",
            [],
            |row| row.get(0),
        )?;
        Ok(pos)
    }
}

impl<'a> RuleManagerTrait for RuleManager<'a> {
    /// Lists rules in the order they are consulted.
    fn list(&self) -> Result<Vec<Rule>, BookmarkError> {
        Ok(store::all_rules(self.conn)?)
    }

    fn get(&self, id: &str) -> Result<Rule, BookmarkError> {
        store::find_rule(self.conn, id)?.ok_or_else(|| BookmarkError::NotFound(id.to_string()))
    }

    /// Creates a rule at the end of the order.
    ///
    /// Fails with `Validation` when the name is empty or every predicate is empty.
    fn create(&mut self, input: RuleInput) -> Result<Rule, BookmarkError> {
        let rule = CleanRule::validate(input)?;

        unit_of_work(self.conn, |tx| {
            let id = Uuid::new_v4().to_string();
            let ts = store::now();
            let category_id = rule.category_id(tx)?;
            let position = Self::next_position(tx)?;

            tx.execute(
                "INSERT INTO rules (id, name, host_prefix, url_prefix, path_prefix, title_contains, \
                 category_id, position, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    id,
                    rule.name,
                    rule.host_prefix,
                    rule.url_prefix,
                    rule.path_prefix,
                    rule.title_contains,
                    category_id,
                    position,
                    ts
                ],
            )?;
            let tags = store::upsert_tags(tx, &rule.tags)?;
            store::replace_rule_tags(tx, &id, &tags)?;

            info!(id = %id, name = %rule.name, position, "rule created");
            store::find_rule(tx, &id)?.ok_or(BookmarkError::NotFound(id))
        })
    }

    /// Replaces every field of a rule, keeping its position.
    fn update(&mut self, id: &str, input: RuleInput) -> Result<Rule, BookmarkError> {
        let rule = CleanRule::validate(input)?;

        unit_of_work(self.conn, |tx| {
            let category_id = rule.category_id(tx)?;
            let affected = tx.execute(
                "UPDATE rules SET name = ?1, host_prefix = ?2, url_prefix = ?3, path_prefix = ?4, \
                 title_contains = ?5, category_id = ?6, updated_at = ?7 WHERE id = ?8",
                params![
                    rule.name,
                    rule.host_prefix,
                    rule.url_prefix,
                    rule.path_prefix,
                    rule.title_contains,
                    category_id,
                    store::now(),
                    id
                ],
            )?;
            if affected == 0 {
                return Err(BookmarkError::NotFound(id.to_string()));
            }
            let tags = store::upsert_tags(tx, &rule.tags)?;
            store::replace_rule_tags(tx, id, &tags)?;

            store::find_rule(tx, id)?.ok_or_else(|| BookmarkError::NotFound(id.to_string()))
        })
    }

    fn delete(&mut self, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM rules WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Moves a rule to `position` (clamped to the list) and renumbers all
    /// rules from zero. Returns the reordered list.
    fn move_rule(&mut self, id: &str, position: i64) -> Result<Vec<Rule>, BookmarkError> {
        unit_of_work(self.conn, |tx| {
            let mut ids: Vec<String> = store::all_rules(tx)?.into_iter().map(|r| r.id).collect();
            let from = ids
                .iter()
                .position(|r| r == id)
                .ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;
            let moved = ids.remove(from);
            let to = position.clamp(0, ids.len() as i64) as usize;
            ids.insert(to, moved);

            let mut stmt = tx.prepare("UPDATE rules SET position = ?1 WHERE id = ?2")?;
            for (index, rule_id) in ids.iter().enumerate() {
                stmt.execute(params![index as i64, rule_id])?;
            }
            drop(stmt);

            Ok(store::all_rules(tx)?)
        })
    }
}
