//! RPC method handler for the Linkshelf JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! managers via the `App` struct.

use std::sync::Mutex;

use crate::app::App;
use crate::managers::bookmark_manager::BookmarkManagerTrait;
use crate::managers::category_manager::CategoryManagerTrait;
use crate::managers::rule_manager::RuleManagerTrait;
use crate::managers::tag_manager::TagManagerTrait;
use crate::types::bookmark::{BookmarkFilter, BookmarkInput, BookmarkPatch, Lookup};
use crate::types::rule::RuleInput;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64.decode(input).map_err(|e| format!("base64 decode error: {}", e))
}

fn str_param<'v>(params: &'v Value, key: &str) -> Result<&'v str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    let a = app.lock().map_err(|e| e.to_string())?;

    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Bookmarks ───
        "bookmark.create" => {
            let input: BookmarkInput = parse_params(params)?;
            let bookmark = a.bookmarks().create_or_merge(input).map_err(|e| e.to_string())?;
            to_json(&bookmark)
        }
        "bookmark.update" => {
            let id = str_param(params, "id")?;
            let patch: BookmarkPatch = parse_params(params)?;
            let bookmark = a.bookmarks().update(id, patch).map_err(|e| e.to_string())?;
            to_json(&bookmark)
        }
        "bookmark.get" => {
            let id = str_param(params, "id")?;
            let bookmark = a.bookmarks().get(id).map_err(|e| e.to_string())?;
            to_json(&bookmark)
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            a.bookmarks().delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.list" => {
            let filter: BookmarkFilter = parse_params(params)?;
            let page = a.bookmarks().list(&filter).map_err(|e| e.to_string())?;
            to_json(&page)
        }
        "bookmark.lookup" => {
            let url = str_param(params, "url")?;
            match a.bookmarks().lookup_or_suggest(url).map_err(|e| e.to_string())? {
                Lookup::Found(bookmark) => Ok(json!({"found": true, "bookmark": to_json(&bookmark)?})),
                Lookup::NotFound(suggestion) => {
                    Ok(json!({"found": false, "suggestion": to_json(&suggestion)?}))
                }
            }
        }

        // ─── Categories ───
        "category.list" => {
            let categories = a.categories().list().map_err(|e| e.to_string())?;
            to_json(&categories)
        }
        "category.create" => {
            let name = str_param(params, "name")?;
            let category = a.categories().create(name).map_err(|e| e.to_string())?;
            to_json(&category)
        }
        "category.rename" => {
            let id = str_param(params, "id")?;
            let name = str_param(params, "name")?;
            let category = a.categories().rename(id, name).map_err(|e| e.to_string())?;
            to_json(&category)
        }
        "category.delete" => {
            let id = str_param(params, "id")?;
            a.categories().delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Tags ───
        "tag.list" => {
            let tags = a.tags().list().map_err(|e| e.to_string())?;
            to_json(&tags)
        }
        "tag.create" => {
            let name = str_param(params, "name")?;
            let tag = a.tags().create(name).map_err(|e| e.to_string())?;
            to_json(&tag)
        }
        "tag.rename" => {
            let id = str_param(params, "id")?;
            let name = str_param(params, "name")?;
            let tag = a.tags().rename(id, name).map_err(|e| e.to_string())?;
            to_json(&tag)
        }
        "tag.delete" => {
            let id = str_param(params, "id")?;
            a.tags().delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Rules ───
        "rule.list" => {
            let rules = a.rules().list().map_err(|e| e.to_string())?;
            to_json(&rules)
        }
        "rule.create" => {
            let input: RuleInput = parse_params(params)?;
            let rule = a.rules().create(input).map_err(|e| e.to_string())?;
            to_json(&rule)
        }
        "rule.update" => {
            let id = str_param(params, "id")?;
            let input: RuleInput = parse_params(params)?;
            let rule = a.rules().update(id, input).map_err(|e| e.to_string())?;
            to_json(&rule)
        }
        "rule.delete" => {
            let id = str_param(params, "id")?;
            a.rules().delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "rule.move" => {
            let id = str_param(params, "id")?;
            let position = params
                .get("position")
                .and_then(|v| v.as_i64())
                .ok_or("missing position")?;
            let rules = a.rules().move_rule(id, position).map_err(|e| e.to_string())?;
            to_json(&rules)
        }

        // ─── Import / export ───
        "import.html" => {
            let bytes = match (params.get("content"), params.get("content_base64")) {
                (Some(Value::String(text)), _) => text.as_bytes().to_vec(),
                (_, Some(Value::String(encoded))) => base64_decode(encoded)?,
                _ => return Err("missing content".to_string()),
            };
            let report = a.import_export().import_html(&bytes).map_err(|e| e.to_string())?;
            to_json(&report)
        }
        "export.html" => {
            let file = a.import_export().export_html().map_err(|e| e.to_string())?;
            Ok(json!({
                "filename": file.filename,
                "mime_type": file.mime_type,
                "content_base64": base64_encode(file.content.as_bytes()),
            }))
        }

        // ─── Settings / maintenance ───
        "settings.get" => to_json(&a.settings),
        "data.clear" => {
            a.clear_data().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
