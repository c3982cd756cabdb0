//! Row-level storage helpers shared by the managers.
//!
//! Every function takes a plain `&Connection`, so it can run either directly
//! against the database or inside a unit of work (a `Transaction` derefs to
//! its connection).

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::bookmark::{Bookmark, Category, Tag};
use crate::types::rule::Rule;

/// Columns selected for every bookmark read, joined with its category.
pub const BOOKMARK_COLUMNS: &str = "b.id, b.url, b.normalized_url, b.title, b.description, \
     b.category_id, c.name, b.created_at, b.updated_at";

const RULE_COLUMNS: &str = "r.id, r.name, r.host_prefix, r.url_prefix, r.path_prefix, \
     r.title_contains, r.category_id, c.name, r.position, r.created_at, r.updated_at";

/// Returns the current UNIX timestamp in seconds.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Inserts a category, or only touches `updated_at` if the name exists. Returns its id.
pub fn upsert_category(conn: &Connection, name: &str) -> rusqlite::Result<String> {
    let ts = now();
    conn.query_row(
        "INSERT INTO categories (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) \
         ON CONFLICT(name) DO UPDATE SET updated_at = excluded.updated_at \
         RETURNING id",
        params![Uuid::new_v4().to_string(), name, ts],
        |row| row.get(0),
    )
}

/// Inserts a tag, or only touches `updated_at` if the name exists.
pub fn upsert_tag(conn: &Connection, name: &str) -> rusqlite::Result<Tag> {
    let ts = now();
    let id: String = conn.query_row(
        "INSERT INTO tags (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3) \
         ON CONFLICT(name) DO UPDATE SET updated_at = excluded.updated_at \
         RETURNING id",
        params![Uuid::new_v4().to_string(), name, ts],
        |row| row.get(0),
    )?;
    Ok(Tag {
        id,
        name: name.to_string(),
    })
}

/// Upserts every name, preserving input order.
pub fn upsert_tags(conn: &Connection, names: &[String]) -> rusqlite::Result<Vec<Tag>> {
    names.iter().map(|name| upsert_tag(conn, name)).collect()
}

/// Reads a bookmark row selected with [`BOOKMARK_COLUMNS`]; tags are filled in separately.
pub fn row_to_bookmark(row: &Row) -> rusqlite::Result<Bookmark> {
    Ok(Bookmark {
        id: row.get(0)?,
        url: row.get(1)?,
        normalized_url: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        category_id: row.get(5)?,
        category_name: row.get(6)?,
        tags: Vec::new(),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn row_to_rule(row: &Row) -> rusqlite::Result<Rule> {
    Ok(Rule {
        id: row.get(0)?,
        name: row.get(1)?,
        host_prefix: row.get(2)?,
        url_prefix: row.get(3)?,
        path_prefix: row.get(4)?,
        title_contains: row.get(5)?,
        category_id: row.get(6)?,
        category_name: row.get(7)?,
        tags: Vec::new(),
        position: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Tags attached to a bookmark, sorted by name.
pub fn bookmark_tags(conn: &Connection, bookmark_id: &str) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM tags t \
         INNER JOIN bookmark_tags bt ON bt.tag_id = t.id \
         WHERE bt.bookmark_id = ?1 ORDER BY t.name ASC",
    )?;
    let rows = stmt.query_map(params![bookmark_id], |row| {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect()
}

/// Tags attached to a rule, sorted by name.
pub fn rule_tags(conn: &Connection, rule_id: &str) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM tags t \
         INNER JOIN rule_tags rt ON rt.tag_id = t.id \
         WHERE rt.rule_id = ?1 ORDER BY t.name ASC",
    )?;
    let rows = stmt.query_map(params![rule_id], |row| {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect()
}

fn with_tags(conn: &Connection, bookmark: Option<Bookmark>) -> rusqlite::Result<Option<Bookmark>> {
    match bookmark {
        Some(mut b) => {
            b.tags = bookmark_tags(conn, &b.id)?;
            Ok(Some(b))
        }
        None => Ok(None),
    }
}

/// Point lookup by id.
pub fn find_bookmark(conn: &Connection, id: &str) -> rusqlite::Result<Option<Bookmark>> {
    let sql = format!(
        "SELECT {BOOKMARK_COLUMNS} FROM bookmarks b \
         LEFT JOIN categories c ON c.id = b.category_id WHERE b.id = ?1"
    );
    let bookmark = conn
        .query_row(&sql, params![id], row_to_bookmark)
        .optional()?;
    with_tags(conn, bookmark)
}

/// Point lookup by canonical URL.
pub fn find_bookmark_by_normalized_url(
    conn: &Connection,
    normalized_url: &str,
) -> rusqlite::Result<Option<Bookmark>> {
    let sql = format!(
        "SELECT {BOOKMARK_COLUMNS} FROM bookmarks b \
         LEFT JOIN categories c ON c.id = b.category_id WHERE b.normalized_url = ?1"
    );
    let bookmark = conn
        .query_row(&sql, params![normalized_url], row_to_bookmark)
        .optional()?;
    with_tags(conn, bookmark)
}

/// Full scan of every bookmark with category and tags, newest first.
pub fn all_bookmarks(conn: &Connection) -> rusqlite::Result<Vec<Bookmark>> {
    let sql = format!(
        "SELECT {BOOKMARK_COLUMNS} FROM bookmarks b \
         LEFT JOIN categories c ON c.id = b.category_id \
         ORDER BY b.created_at DESC, b.rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_bookmark)?;
    let mut bookmarks = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    for bookmark in &mut bookmarks {
        bookmark.tags = bookmark_tags(conn, &bookmark.id)?;
    }
    Ok(bookmarks)
}

/// Fields written for a bookmark row.
pub struct BookmarkRow<'a> {
    pub url: &'a str,
    pub normalized_url: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub category_id: Option<&'a str>,
}

/// Inserts a bookmark row and returns its new id.
pub fn insert_bookmark(conn: &Connection, row: &BookmarkRow<'_>) -> rusqlite::Result<String> {
    let id = Uuid::new_v4().to_string();
    let ts = now();
    conn.execute(
        "INSERT INTO bookmarks (id, url, normalized_url, title, description, category_id, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![id, row.url, row.normalized_url, row.title, row.description, row.category_id, ts],
    )?;
    Ok(id)
}

/// Rewrites every column of a bookmark row. Returns the number of rows touched.
pub fn update_bookmark(conn: &Connection, id: &str, row: &BookmarkRow<'_>) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE bookmarks SET url = ?1, normalized_url = ?2, title = ?3, description = ?4, \
         category_id = ?5, updated_at = ?6 WHERE id = ?7",
        params![row.url, row.normalized_url, row.title, row.description, row.category_id, now(), id],
    )
}

/// Deletes the current attachments and attaches `tags` instead.
pub fn replace_bookmark_tags(conn: &Connection, bookmark_id: &str, tags: &[Tag]) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM bookmark_tags WHERE bookmark_id = ?1",
        params![bookmark_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO bookmark_tags (bookmark_id, tag_id) VALUES (?1, ?2) ON CONFLICT DO NOTHING",
    )?;
    for tag in tags {
        stmt.execute(params![bookmark_id, tag.id])?;
    }
    Ok(())
}

/// Deletes the current rule attachments and attaches `tags` instead.
pub fn replace_rule_tags(conn: &Connection, rule_id: &str, tags: &[Tag]) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM rule_tags WHERE rule_id = ?1", params![rule_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO rule_tags (rule_id, tag_id) VALUES (?1, ?2) ON CONFLICT DO NOTHING",
    )?;
    for tag in tags {
        stmt.execute(params![rule_id, tag.id])?;
    }
    Ok(())
}

/// Point lookup of a rule with its tags.
pub fn find_rule(conn: &Connection, id: &str) -> rusqlite::Result<Option<Rule>> {
    let sql = format!(
        "SELECT {RULE_COLUMNS} FROM rules r \
         LEFT JOIN categories c ON c.id = r.category_id WHERE r.id = ?1"
    );
    let rule = conn.query_row(&sql, params![id], row_to_rule).optional()?;
    match rule {
        Some(mut r) => {
            r.tags = rule_tags(conn, &r.id)?;
            Ok(Some(r))
        }
        None => Ok(None),
    }
}

/// Every rule with its category name and tags, in priority order.
pub fn all_rules(conn: &Connection) -> rusqlite::Result<Vec<Rule>> {
    let sql = format!(
        "SELECT {RULE_COLUMNS} FROM rules r \
         LEFT JOIN categories c ON c.id = r.category_id \
         ORDER BY r.position ASC, r.created_at ASC, r.rowid ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_rule)?;
    let mut rules = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    for rule in &mut rules {
        rule.tags = rule_tags(conn, &rule.id)?;
    }
    Ok(rules)
}

/// Categories sorted by name.
pub fn all_categories(conn: &Connection) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect()
}

/// Tags sorted by name.
pub fn all_tags(conn: &Connection) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect()
}

/// The two shared, uniquely-named label tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTable {
    Categories,
    Tags,
}

impl LabelTable {
    fn table(self) -> &'static str {
        match self {
            LabelTable::Categories => "categories",
            LabelTable::Tags => "tags",
        }
    }
}

/// Id of the label named `name`, if it exists.
pub fn find_label_by_name(
    conn: &Connection,
    table: LabelTable,
    name: &str,
) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        &format!("SELECT id FROM {} WHERE name = ?1", table.table()),
        params![name],
        |row| row.get(0),
    )
    .optional()
}

/// Renames a label in place. Returns the number of rows touched.
pub fn rename_label(conn: &Connection, table: LabelTable, id: &str, name: &str) -> rusqlite::Result<usize> {
    conn.execute(
        &format!("UPDATE {} SET name = ?1, updated_at = ?2 WHERE id = ?3", table.table()),
        params![name, now(), id],
    )
}

/// Deletes a label. References are cleared by the schema's foreign keys.
pub fn delete_label(conn: &Connection, table: LabelTable, id: &str) -> rusqlite::Result<usize> {
    conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", table.table()),
        params![id],
    )
}

/// Deletes every bookmark, category and tag. Rules stay, stripped of their
/// tags and category.
pub fn clear_all(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "DELETE FROM bookmark_tags;
         DELETE FROM rule_tags;
         DELETE FROM bookmarks;
         DELETE FROM tags;
         DELETE FROM categories;",
    )
}
