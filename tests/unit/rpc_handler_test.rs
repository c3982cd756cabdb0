//! Unit tests for the RPC handler: the JSON-RPC methods dispatched by `handle_method`.
//!
//! These tests exercise every method family through the same code path used
//! by the real `linkshelf-rpc` binary, using a temporary on-disk SQLite database.

use std::sync::Mutex;

use serde_json::{json, Value};
use tempfile::TempDir;

use linkshelf::app::App;
use linkshelf::database::Database;
use linkshelf::rpc_handler::{base64_decode, base64_encode, handle_method};
use linkshelf::services::metadata_fetcher::NoMetadata;
use linkshelf::types::settings::ServiceSettings;

/// Create a fresh App backed by a temp directory DB, with metadata fetching off.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db = Database::open(tmp.path().join("test.db")).expect("Failed to open DB");
    let mut settings = ServiceSettings::default();
    settings.metadata.enabled = false;
    let app = App::with_parts(db, settings, Box::new(NoMetadata));
    (Mutex::new(app), tmp)
}

fn call(app: &Mutex<App>, method: &str, params: Value) -> Value {
    handle_method(app, method, &params)
        .unwrap_or_else(|e| panic!("{} failed: {}", method, e))
}

// ─── Ping ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    let res = call(&app, "ping", json!({}));
    assert_eq!(res["pong"], true);
    assert!(res["version"].is_string());
}

// ─── Unknown method ───

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({}));
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── Bookmarks ───

#[test]
fn test_bookmark_create_and_list() {
    let (app, _tmp) = setup();

    let res = call(
        &app,
        "bookmark.create",
        json!({"url": "https://Example.com/", "title": "Example", "tags": ["Web"]}),
    );
    assert!(res.get("id").is_some());
    assert_eq!(res["url"], "https://Example.com/");
    assert_eq!(res["normalizedUrl"], "https://example.com");
    assert_eq!(res["tags"][0]["name"], "web");

    let list = call(&app, "bookmark.list", json!({"pageSize": 5}));
    assert_eq!(list["total"], 1);
    assert_eq!(list["pageSize"], 5);
    assert_eq!(list["items"][0]["title"], "Example");
}

#[test]
fn test_bookmark_create_twice_merges() {
    let (app, _tmp) = setup();
    let first = call(&app, "bookmark.create", json!({"url": "https://a.com/x", "title": "One"}));
    let second = call(&app, "bookmark.create", json!({"url": "https://A.com/x/", "title": "Two"}));
    assert_eq!(first["id"], second["id"]);

    let list = call(&app, "bookmark.list", json!({}));
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["title"], "Two");
}

#[test]
fn test_bookmark_create_errors() {
    let (app, _tmp) = setup();
    let missing_url = handle_method(&app, "bookmark.create", &json!({"title": "X"}));
    assert!(missing_url.unwrap_err().contains("Invalid input"));

    let malformed = handle_method(&app, "bookmark.create", &json!({"url": "nope", "title": "X"}));
    assert!(malformed.unwrap_err().contains("Malformed URL"));

    let no_title = handle_method(&app, "bookmark.create", &json!({"url": "https://x.com"}));
    assert!(no_title.unwrap_err().contains("title is required"));
}

#[test]
fn test_bookmark_update_get_delete() {
    let (app, _tmp) = setup();
    let created = call(
        &app,
        "bookmark.create",
        json!({"url": "https://a.com", "title": "A", "tags": ["x", "y"]}),
    );
    let id = created["id"].as_str().unwrap();

    let unchanged = call(&app, "bookmark.update", json!({"id": id}));
    assert_eq!(unchanged, created);

    let cleared = call(&app, "bookmark.update", json!({"id": id, "tags": []}));
    assert_eq!(cleared["tags"], json!([]));
    assert_eq!(cleared["title"], "A");

    let fetched = call(&app, "bookmark.get", json!({"id": id}));
    assert_eq!(fetched, cleared);

    call(&app, "bookmark.delete", json!({"id": id}));
    assert!(handle_method(&app, "bookmark.get", &json!({"id": id}))
        .unwrap_err()
        .contains("Not found"));
}

#[test]
fn test_bookmark_update_requires_id() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "bookmark.update", &json!({"title": "X"}));
    assert_eq!(res.unwrap_err(), "missing id");
}

#[test]
fn test_bookmark_lookup_found_and_suggested() {
    let (app, _tmp) = setup();
    call(
        &app,
        "rule.create",
        json!({"name": "Docs", "pathPrefix": "/docs", "category": "Reference"}),
    );
    call(&app, "bookmark.create", json!({"url": "https://a.com", "title": "A"}));

    let found = call(&app, "bookmark.lookup", json!({"url": "https://A.com/#top"}));
    assert_eq!(found["found"], true);
    assert_eq!(found["bookmark"]["title"], "A");

    let missing = call(&app, "bookmark.lookup", json!({"url": "https://b.com/docs/x"}));
    assert_eq!(missing["found"], false);
    assert_eq!(missing["suggestion"]["category"], "reference");
    assert_eq!(missing["suggestion"]["normalizedUrl"], "https://b.com/docs/x");
}

// ─── Categories / tags ───

#[test]
fn test_category_lifecycle() {
    let (app, _tmp) = setup();
    let created = call(&app, "category.create", json!({"name": " News "}));
    assert_eq!(created["name"], "news");
    let id = created["id"].as_str().unwrap();

    let renamed = call(&app, "category.rename", json!({"id": id, "name": "World"}));
    assert_eq!(renamed["name"], "world");
    assert_eq!(call(&app, "category.list", json!({})), json!([renamed]));

    call(&app, "category.delete", json!({"id": id}));
    assert_eq!(call(&app, "category.list", json!({})), json!([]));
}

#[test]
fn test_tag_lifecycle() {
    let (app, _tmp) = setup();
    let a = call(&app, "tag.create", json!({"name": "Rust"}));
    call(&app, "tag.create", json!({"name": "web"}));

    let clash = handle_method(&app, "tag.rename", &json!({"id": a["id"], "name": "WEB"}));
    assert!(clash.unwrap_err().contains("already in use"));

    let list = call(&app, "tag.list", json!({}));
    assert_eq!(list.as_array().unwrap().len(), 2);

    call(&app, "tag.delete", json!({"id": a["id"]}));
    assert_eq!(call(&app, "tag.list", json!({})).as_array().unwrap().len(), 1);
}

// ─── Rules ───

#[test]
fn test_rule_create_update_move_delete() {
    let (app, _tmp) = setup();
    let first = call(&app, "rule.create", json!({"name": "One", "hostPrefix": "a.com"}));
    let second = call(&app, "rule.create", json!({"name": "Two", "titleContains": "rust"}));
    assert_eq!(first["position"], 0);
    assert_eq!(second["position"], 1);

    let updated = call(
        &app,
        "rule.update",
        json!({"id": first["id"], "name": "One!", "hostPrefix": "b.com", "tags": ["X"]}),
    );
    assert_eq!(updated["hostPrefix"], "b.com");
    assert_eq!(updated["tags"][0]["name"], "x");

    let moved = call(&app, "rule.move", json!({"id": second["id"], "position": 0}));
    assert_eq!(moved[0]["id"], second["id"]);
    assert_eq!(moved[1]["position"], 1);

    call(&app, "rule.delete", json!({"id": first["id"]}));
    assert_eq!(call(&app, "rule.list", json!({})).as_array().unwrap().len(), 1);
}

#[test]
fn test_rule_without_predicate_is_rejected() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "rule.create", &json!({"name": "Empty", "category": "x"}));
    assert!(res.unwrap_err().contains("matching condition"));
}

#[test]
fn test_rule_move_requires_position() {
    let (app, _tmp) = setup();
    let rule = call(&app, "rule.create", json!({"name": "One", "hostPrefix": "a.com"}));
    let res = handle_method(&app, "rule.move", &json!({"id": rule["id"]}));
    assert_eq!(res.unwrap_err(), "missing position");
}

// ─── Import / export ───

const SAMPLE: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><H3>Work</H3>
    <DL><p>
        <DT><A HREF="https://work.example/">Work site</A>
    </DL><p>
    <DT><A HREF="https://home.example/" TAGS="a,b">Home</A>
    <DT><A HREF="not a url">Broken</A>
</DL><p>
"#;

#[test]
fn test_import_html_plain_and_base64() {
    let (app, _tmp) = setup();
    let report = call(&app, "import.html", json!({"content": SAMPLE}));
    assert_eq!(report["imported"].as_array().unwrap().len(), 2);
    assert_eq!(report["skipped"][0]["url"], "not a url");

    let again = call(
        &app,
        "import.html",
        json!({"content_base64": base64_encode(SAMPLE.as_bytes())}),
    );
    assert_eq!(again["imported"].as_array().unwrap().len(), 2);
    assert_eq!(call(&app, "bookmark.list", json!({}))["total"], 2);
}

#[test]
fn test_import_html_requires_content() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "import.html", &json!({}));
    assert_eq!(res.unwrap_err(), "missing content");
}

#[test]
fn test_export_html() {
    let (app, _tmp) = setup();
    call(&app, "bookmark.create", json!({"url": "https://a.com", "title": "A & B"}));

    let res = call(&app, "export.html", json!({}));
    let filename = res["filename"].as_str().unwrap();
    assert!(filename.starts_with("bookmarks-"));
    assert!(filename.ends_with(".html"));
    assert_eq!(res["mime_type"], "text/html; charset=utf-8");

    let bytes = base64_decode(res["content_base64"].as_str().unwrap()).unwrap();
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>"));
    assert!(html.contains(">A &amp; B</A>"));
}

// ─── Settings / maintenance ───

#[test]
fn test_settings_get() {
    let (app, _tmp) = setup();
    let res = call(&app, "settings.get", json!({}));
    assert_eq!(res["metadata"]["enabled"], false);
    assert_eq!(res["export"]["layout"], "flat");
}

#[test]
fn test_data_clear_keeps_only_bare_rules() {
    let (app, _tmp) = setup();
    call(
        &app,
        "bookmark.create",
        json!({"url": "https://a.com", "title": "A", "category": "c", "tags": ["t"]}),
    );
    call(
        &app,
        "rule.create",
        json!({"name": "R", "hostPrefix": "a.com", "category": "c", "tags": ["t"]}),
    );

    call(&app, "data.clear", json!({}));

    assert_eq!(call(&app, "bookmark.list", json!({}))["total"], 0);
    let rules = call(&app, "rule.list", json!({}));
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_eq!(rules[0]["name"], "R");
    assert_eq!(rules[0]["hostPrefix"], "a.com");
    assert_eq!(rules[0]["tags"], json!([]));
    assert!(rules[0]["categoryId"].is_null());
    assert_eq!(call(&app, "category.list", json!({})), json!([]));
    assert_eq!(call(&app, "tag.list", json!({})), json!([]));
}

// ─── Base64 helpers ───

#[test]
fn test_base64_decode_rejects_garbage() {
    assert!(base64_decode("***").is_err());
    assert_eq!(base64_decode(&base64_encode(b"hi")).unwrap(), b"hi");
}
