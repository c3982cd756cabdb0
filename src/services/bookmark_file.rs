//! Netscape bookmark file codec.
//!
//! Decoding walks the nested `<DL>` lists depth-first. A `<DT><H3>` names a
//! folder whose list entries inherit the folder name as their category; a
//! `<DT><A>` is a bookmark, optionally followed by a `<DD>` description.
//! Encoding writes every bookmark with its tags and category as attributes.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::services::html_tree::{self, Element};
use crate::services::name_normalizer::TAG_SEPARATOR;
use crate::types::bookmark::{Bookmark, ImportCandidate};
use crate::types::settings::ExportLayout;

/// MIME type of an exported bookmark file.
pub const MIME_TYPE: &str = "text/html; charset=utf-8";

const HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- This is an automatically generated file.
     It will be read and overwritten.
     DO NOT EDIT! -->
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">
<TITLE>Bookmarks</TITLE>
<H1>Bookmarks</H1>
";

/// Decodes a bookmark file into import candidates, in document order.
///
/// Invalid UTF-8 is replaced rather than rejected. Anchors without an
/// `HREF` are dropped.
pub fn decode(bytes: &[u8]) -> Vec<ImportCandidate> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');
    let document = html_tree::parse(text);

    let mut entries = Vec::new();
    if let Some(root) = document.find_first("dl") {
        walk_lists(root, &mut entries);
    }
    entries
}

/// A list being walked: its items, the next item to visit and the category
/// its entries inherit.
struct ListCursor<'a> {
    items: Vec<&'a Element>,
    next: usize,
    category: String,
}

impl<'a> ListCursor<'a> {
    fn new(list: &'a Element, category: String) -> Self {
        Self {
            items: list.child_elements().collect(),
            next: 0,
            category,
        }
    }
}

/// Visits every entry depth-first in document order. Folders may nest
/// arbitrarily deep, so open lists are kept on an explicit stack.
fn walk_lists(root: &Element, out: &mut Vec<ImportCandidate>) {
    let mut open = vec![ListCursor::new(root, String::new())];

    while let Some(cursor) = open.last_mut() {
        let Some(item) = cursor.items.get(cursor.next).copied() else {
            open.pop();
            continue;
        };
        cursor.next += 1;
        let following = &cursor.items[cursor.next..];

        let nested = match item.name.as_str() {
            "dt" => {
                if let Some(heading) = item.find_first_outside("h3", "dl") {
                    let folder = heading.text().trim().to_string();
                    folder_list(item, following).map(|list| (list, folder))
                } else {
                    if let Some(anchor) = item.find_first_outside("a", "dl") {
                        if let Some(entry) = read_entry(anchor, &cursor.category, following) {
                            out.push(entry);
                        }
                    }
                    None
                }
            }
            // A list without a heading keeps the surrounding category.
            "dl" => Some((item, cursor.category.clone())),
            _ => None,
        };

        if let Some((list, category)) = nested {
            open.push(ListCursor::new(list, category));
        }
    }
}

/// Finds the list holding a folder's entries: inside the `<DT>` itself, or
/// among the siblings up to the next `<DT>` (possibly wrapped in a `<DD>`).
fn folder_list<'a>(item: &'a Element, following: &[&'a Element]) -> Option<&'a Element> {
    if let Some(nested) = item.find_first("dl") {
        return Some(nested);
    }
    for sibling in following {
        match sibling.name.as_str() {
            "dt" => return None,
            "dl" => return Some(sibling),
            "dd" => {
                if let Some(nested) = sibling.find_first("dl") {
                    return Some(nested);
                }
            }
            _ => {}
        }
    }
    None
}

fn read_entry(anchor: &Element, category: &str, following: &[&Element]) -> Option<ImportCandidate> {
    let url = anchor.attr("href").unwrap_or_default().trim();
    if url.is_empty() {
        return None;
    }

    let tags = anchor
        .attr("tags")
        .map(|raw| {
            raw.split(TAG_SEPARATOR)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let category = match anchor.attr("category").map(str::trim) {
        Some(own) if !own.is_empty() => own.to_string(),
        _ => category.to_string(),
    };

    let description = following
        .first()
        .filter(|next| next.name == "dd")
        .map(|dd| dd.text_outside("dl").trim().to_string())
        .unwrap_or_default();

    Some(ImportCandidate {
        url: url.to_string(),
        title: anchor.text().trim().to_string(),
        description,
        category,
        tags,
    })
}

/// Suggested download name, e.g. `bookmarks-2024-03-01-09-30-00.html`.
pub fn export_filename(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.html", prefix, at.format("%Y-%m-%d-%H-%M-%S"))
}

/// Encodes bookmarks as a Netscape bookmark file.
pub fn encode(bookmarks: &[Bookmark], layout: ExportLayout) -> String {
    let mut out = String::with_capacity(HEADER.len() + bookmarks.len() * 160);
    out.push_str(HEADER);
    out.push_str("<DL><p>\n");

    match layout {
        ExportLayout::Flat => {
            for bookmark in bookmarks {
                write_entry(&mut out, bookmark, 1);
            }
        }
        ExportLayout::Folders => {
            let mut folders: BTreeMap<&str, Vec<&Bookmark>> = BTreeMap::new();
            for bookmark in bookmarks {
                match bookmark.category_name.as_deref().filter(|c| !c.is_empty()) {
                    Some(category) => folders.entry(category).or_default().push(bookmark),
                    None => write_entry(&mut out, bookmark, 1),
                }
            }
            for (category, items) in folders {
                let _ = writeln!(out, "    <DT><H3>{}</H3>", html_tree::escape(category));
                out.push_str("    <DL><p>\n");
                for bookmark in items {
                    write_entry(&mut out, bookmark, 2);
                }
                out.push_str("    </DL><p>\n");
            }
        }
    }

    out.push_str("</DL><p>\n");
    out
}

fn write_entry(out: &mut String, bookmark: &Bookmark, depth: usize) {
    let indent = "    ".repeat(depth);
    let _ = write!(
        out,
        "{}<DT><A HREF=\"{}\" ADD_DATE=\"{}\" LAST_MODIFIED=\"{}\"",
        indent,
        html_tree::escape(&bookmark.url),
        bookmark.created_at,
        bookmark.updated_at
    );
    if !bookmark.tags.is_empty() {
        let joined = bookmark.tag_names().join(TAG_SEPARATOR);
        let _ = write!(out, " TAGS=\"{}\"", html_tree::escape(&joined));
    }
    if let Some(category) = bookmark.category_name.as_deref().filter(|c| !c.is_empty()) {
        let _ = write!(out, " CATEGORY=\"{}\"", html_tree::escape(category));
    }
    let _ = writeln!(out, ">{}</A>", html_tree::escape(&bookmark.title));
    if !bookmark.description.is_empty() {
        let _ = writeln!(out, "{}<DD>{}", indent, html_tree::escape(&bookmark.description));
    }
}
