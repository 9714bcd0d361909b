//! Unit tests for the RPC handler: JSON-RPC methods dispatched by `handle_method`.
//!
//! These go through the same code path as the `awesomebar-rpc` binary, using a
//! temporary on-disk SQLite database and settings file.

use std::sync::Mutex;

use serde_json::json;
use tempfile::TempDir;

use awesomebar::app::App;
use awesomebar::rpc_handler::handle_method;

/// Create a fresh App backed by a temp directory.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let settings_path = tmp.path().join("settings.json");
    let app = App::new(
        db_path.to_str().unwrap(),
        Some(settings_path.to_string_lossy().to_string()),
    )
    .expect("Failed to init App");
    (Mutex::new(app), tmp)
}

// ─── Ping ───

#[tokio::test]
async fn test_ping() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "ping", &json!({})).await.unwrap();
    assert_eq!(res, json!({"pong": true}));
}

// ─── Unknown method ───

#[tokio::test]
async fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({})).await;
    assert!(res.unwrap_err().contains("unknown method"));
}

// ─── Legacy history ───

#[tokio::test]
async fn test_history_record_and_search() {
    let (app, _tmp) = setup();

    let res = handle_method(
        &app,
        "history.record",
        &json!({"url": "https://example.com", "title": "Example Domain"}),
    )
    .await
    .unwrap();
    assert!(res["id"].is_string());

    let found = handle_method(&app, "history.search", &json!({"query": "Domain"}))
        .await
        .unwrap();
    let arr = found.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["url"], "https://example.com");
    assert_eq!(arr[0]["visit_count"], 1);
}

#[tokio::test]
async fn test_history_record_rejects_non_web_url() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "history.record",
        &json!({"url": "file:///etc/passwd", "title": "passwd"}),
    )
    .await;
    assert!(res.unwrap_err().contains("invalid url"));
}

#[tokio::test]
async fn test_history_record_missing_title() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "history.record", &json!({"url": "https://example.com"})).await;
    assert_eq!(res.unwrap_err(), "missing title");
}

#[tokio::test]
async fn test_history_record_honors_record_history_setting() {
    let (app, _tmp) = setup();
    handle_method(
        &app,
        "settings.set",
        &json!({"key": "history.record_history", "value": false}),
    )
    .await
    .unwrap();

    let res = handle_method(
        &app,
        "history.record",
        &json!({"url": "https://example.com", "title": "Example"}),
    )
    .await;
    assert!(res.unwrap_err().contains("disabled"));
}

#[tokio::test]
async fn test_history_suggestions_ranked_by_frecency() {
    let (app, _tmp) = setup();
    for _ in 0..3 {
        handle_method(
            &app,
            "history.record",
            &json!({"url": "https://often.example.com", "title": "Often"}),
        )
        .await
        .unwrap();
    }
    handle_method(
        &app,
        "history.record",
        &json!({"url": "https://once.example.com", "title": "Once"}),
    )
    .await
    .unwrap();

    let res = handle_method(&app, "history.suggestions", &json!({"query": "example"}))
        .await
        .unwrap();
    let arr = res.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["url"], "https://often.example.com");
    assert_eq!(arr[0]["score"], 300);
    assert_eq!(arr[1]["score"], 100);
}

#[tokio::test]
async fn test_history_delete_and_clear() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "history.record",
        &json!({"url": "https://a.example.com", "title": "A"}),
    )
    .await
    .unwrap();
    handle_method(
        &app,
        "history.record",
        &json!({"url": "https://b.example.com", "title": "B"}),
    )
    .await
    .unwrap();

    handle_method(&app, "history.delete", &json!({"id": res["id"]}))
        .await
        .unwrap();
    let recent = handle_method(&app, "history.recent", &json!({})).await.unwrap();
    assert_eq!(recent.as_array().unwrap().len(), 1);

    handle_method(&app, "history.clear", &json!({})).await.unwrap();
    let recent = handle_method(&app, "history.recent", &json!({})).await.unwrap();
    assert!(recent.as_array().unwrap().is_empty());
}

// ─── History metadata ───

#[tokio::test]
async fn test_metadata_observe_query_and_latest() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "metadata.observe",
        &json!({
            "url": "https://video.example.com/watch",
            "view_time": 1500,
            "document_type": "media",
            "title": "A video",
        }),
    )
    .await
    .unwrap();
    assert_eq!(res, json!({"ok": true}));

    let rows = handle_method(&app, "metadata.query", &json!({"query": "video"}))
        .await
        .unwrap();
    let arr = rows.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["total_view_time"], 1500);
    assert_eq!(arr[0]["title"], "A video");

    let latest = handle_method(
        &app,
        "metadata.latest",
        &json!({"url": "https://video.example.com/watch"}),
    )
    .await
    .unwrap();
    assert_eq!(latest["document_type"], "Media");

    let missing = handle_method(
        &app,
        "metadata.latest",
        &json!({"url": "https://nothing.example.com"}),
    )
    .await
    .unwrap();
    assert!(missing.is_null());
}

#[tokio::test]
async fn test_metadata_observe_rejects_unknown_document_type() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "metadata.observe",
        &json!({"url": "https://example.com", "document_type": "podcast"}),
    )
    .await;
    assert!(res.unwrap_err().contains("invalid document_type"));
}

#[tokio::test]
async fn test_metadata_observe_skipped_when_disabled() {
    let (app, _tmp) = setup();
    handle_method(
        &app,
        "settings.set",
        &json!({"key": "history.record_metadata", "value": false}),
    )
    .await
    .unwrap();

    let res = handle_method(
        &app,
        "metadata.observe",
        &json!({"url": "https://example.com", "view_time": 10}),
    )
    .await
    .unwrap();
    assert_eq!(res["ok"], false);

    let rows = handle_method(&app, "metadata.query", &json!({"query": "example"}))
        .await
        .unwrap();
    assert!(rows.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_metadata_delete_older_than() {
    let (app, _tmp) = setup();
    handle_method(
        &app,
        "metadata.observe",
        &json!({"url": "https://example.com", "view_time": 10}),
    )
    .await
    .unwrap();

    let res = handle_method(
        &app,
        "metadata.delete_older_than",
        &json!({"older_than": i64::MAX}),
    )
    .await
    .unwrap();
    assert_eq!(res, json!({"deleted": 1}));
}

// ─── Awesomebar ───

#[tokio::test]
async fn test_awesomebar_input_blank_returns_empty() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "awesomebar.input", &json!({"text": "  "}))
        .await
        .unwrap();
    assert!(res["suggestions"].as_array().unwrap().is_empty());
    assert!(res["provider_id"].is_string());
}

#[tokio::test]
async fn test_awesomebar_input_merges_history_and_metadata() {
    let (app, _tmp) = setup();
    handle_method(
        &app,
        "history.record",
        &json!({"url": "https://www.mozilla.org", "title": "Mozilla"}),
    )
    .await
    .unwrap();
    handle_method(
        &app,
        "metadata.observe",
        &json!({"url": "https://www.mozilla.org", "view_time": 20}),
    )
    .await
    .unwrap();
    handle_method(
        &app,
        "metadata.observe",
        &json!({"url": "https://developer.mozilla.org", "view_time": 40, "title": "MDN"}),
    )
    .await
    .unwrap();

    let res = handle_method(&app, "awesomebar.input", &json!({"text": "mozilla"}))
        .await
        .unwrap();
    let arr = res["suggestions"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["url"], "https://www.mozilla.org");
    assert_eq!(arr[0]["score"], 102);
    assert_eq!(arr[1]["url"], "https://developer.mozilla.org");
    assert_eq!(arr[1]["title"], "MDN");
    assert_eq!(arr[0]["provider_id"], res["provider_id"]);
}

// ─── Settings ───

#[tokio::test]
async fn test_settings_set_refreshes_provider() {
    let (app, _tmp) = setup();
    for i in 0..5 {
        handle_method(
            &app,
            "history.record",
            &json!({"url": format!("https://site{}.example.com", i), "title": "Site"}),
        )
        .await
        .unwrap();
    }

    handle_method(
        &app,
        "settings.set",
        &json!({"key": "suggestions.max_number_of_suggestions", "value": 2}),
    )
    .await
    .unwrap();
    handle_method(
        &app,
        "settings.set",
        &json!({"key": "suggestions.suggestions_header", "value": "History"}),
    )
    .await
    .unwrap();

    let res = handle_method(&app, "awesomebar.input", &json!({"text": "site"}))
        .await
        .unwrap();
    assert_eq!(res["suggestions"].as_array().unwrap().len(), 2);
    assert_eq!(res["header"], "History");

    let settings = handle_method(&app, "settings.get", &json!({})).await.unwrap();
    assert_eq!(settings["suggestions"]["max_number_of_suggestions"], 2);
}

#[tokio::test]
async fn test_settings_set_rejects_out_of_range_limit() {
    let (app, _tmp) = setup();
    let res = handle_method(
        &app,
        "settings.set",
        &json!({"key": "suggestions.max_number_of_suggestions", "value": 0}),
    )
    .await;
    assert!(res.is_err());

    let settings = handle_method(&app, "settings.get", &json!({})).await.unwrap();
    assert_eq!(settings["suggestions"]["max_number_of_suggestions"], 20);
}

#[tokio::test]
async fn test_settings_reset() {
    let (app, _tmp) = setup();
    handle_method(
        &app,
        "settings.set",
        &json!({"key": "suggestions.max_number_of_suggestions", "value": 3}),
    )
    .await
    .unwrap();

    handle_method(&app, "settings.reset", &json!({})).await.unwrap();

    let settings = handle_method(&app, "settings.get", &json!({})).await.unwrap();
    assert_eq!(settings["suggestions"]["max_number_of_suggestions"], 20);
    assert_eq!(app.lock().unwrap().provider().max_number_of_suggestions(), 20);
}

#[tokio::test]
async fn test_oversized_limit_is_capped() {
    let (app, _tmp) = setup();
    for i in 0..105 {
        let url = format!("https://page{}.example.com", i);
        handle_method(&app, "history.record", &json!({"url": url.clone(), "title": "Page"}))
            .await
            .unwrap();
        handle_method(&app, "metadata.observe", &json!({"url": url, "view_time": i}))
            .await
            .unwrap();
    }

    let history = handle_method(
        &app,
        "history.suggestions",
        &json!({"query": "page", "limit": u64::MAX}),
    )
    .await
    .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 100);

    let metadata = handle_method(
        &app,
        "metadata.query",
        &json!({"query": "page", "limit": u64::MAX}),
    )
    .await
    .unwrap();
    assert_eq!(metadata.as_array().unwrap().len(), 100);
}
