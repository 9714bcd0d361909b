//! RPC method handler for the awesomebar JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches JSON-RPC method calls to the history stores,
//! the suggestion provider and the settings engine via the `App` struct.

use std::sync::Mutex;

use crate::app::App;
use crate::managers::history_manager::{HistoryManager, HistoryManagerTrait};
use crate::managers::metadata_manager::{MetadataManager, MetadataManagerTrait};
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::history::HistoryEntry;
use crate::types::settings::{DEFAULT_COMBINED_SUGGESTION_LIMIT, MAX_NUMBER_OF_SUGGESTIONS};
use crate::types::metadata::{
    DocumentType, HistoryMetadata, HistoryMetadataKey, HistoryMetadataObservation,
};

use serde_json::{json, Value};

fn str_param<'p>(params: &'p Value, name: &str) -> Option<&'p str> {
    params.get(name).and_then(|v| v.as_str())
}

fn required_str<'p>(params: &'p Value, name: &str) -> Result<&'p str, String> {
    str_param(params, name).ok_or_else(|| format!("missing {}", name))
}

/// Optional `limit`, capped at `MAX_NUMBER_OF_SUGGESTIONS`.
fn limit_param(params: &Value) -> usize {
    params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map_or(DEFAULT_COMBINED_SUGGESTION_LIMIT, |n| {
            usize::try_from(n).unwrap_or(usize::MAX).min(MAX_NUMBER_OF_SUGGESTIONS)
        })
}

fn require_web_url(url: &str) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("invalid url: must start with http:// or https://".to_string());
    }
    Ok(())
}

fn metadata_key(params: &Value) -> Result<HistoryMetadataKey, String> {
    Ok(HistoryMetadataKey {
        url: required_str(params, "url")?.to_string(),
        search_term: str_param(params, "search_term").map(str::to_string),
        referrer_url: str_param(params, "referrer_url").map(str::to_string),
    })
}

fn entry_json(h: &HistoryEntry) -> Value {
    json!({"id":h.id,"url":h.url,"title":h.title,"visit_count":h.visit_count,"visit_time":h.visit_time * 1000})
}

fn metadata_json(m: &HistoryMetadata) -> Value {
    serde_json::to_value(m).unwrap_or(Value::Null)
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// The app lock is never held across an `.await`.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Legacy history ───
        "history.record" => {
            let url = required_str(params, "url")?;
            let title = required_str(params, "title")?;
            require_web_url(url)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let record = a.settings_engine.get_settings().history.record_history;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mut mgr = HistoryManager::new(db.connection());
            mgr.set_recording_enabled(record);
            let id = mgr.record_visit(url, title).map_err(|e| e.to_string())?;
            Ok(json!({"id": id}))
        }
        "history.search" => {
            let query = required_str(params, "query")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mgr = HistoryManager::new(db.connection());
            let entries = mgr.search_history(query).map_err(|e| e.to_string())?;
            Ok(json!(entries.iter().map(entry_json).collect::<Vec<_>>()))
        }
        "history.recent" => {
            let date = str_param(params, "date");
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mgr = HistoryManager::new(db.connection());
            let entries = mgr.list_history(date).map_err(|e| e.to_string())?;
            Ok(json!(entries.iter().map(entry_json).collect::<Vec<_>>()))
        }
        "history.suggestions" => {
            let query = required_str(params, "query")?;
            let limit = limit_param(params);
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mgr = HistoryManager::new(db.connection());
            let results = mgr.get_suggestions(query, limit).map_err(|e| e.to_string())?;
            serde_json::to_value(results).map_err(|e| e.to_string())
        }
        "history.delete" => {
            let id = required_str(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mut mgr = HistoryManager::new(db.connection());
            mgr.delete_entry(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "history.clear" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mut mgr = HistoryManager::new(db.connection());
            mgr.clear_all().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── History metadata ───
        "metadata.observe" => {
            let key = metadata_key(params)?;
            require_web_url(&key.url)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            if !a.settings_engine.get_settings().history.record_metadata {
                return Ok(json!({"ok": false, "reason": "metadata recording disabled"}));
            }
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mut mgr = MetadataManager::new(db.connection());
            if let Some(ms) = params.get("view_time").and_then(|v| v.as_i64()) {
                let ms = i32::try_from(ms).map_err(|_| format!("view_time out of range: {}", ms))?;
                mgr.note_observation(&key, HistoryMetadataObservation::ViewTime(ms))
                    .map_err(|e| e.to_string())?;
            }
            if let Some(kind) = str_param(params, "document_type") {
                let document_type = match kind {
                    "regular" => DocumentType::Regular,
                    "media" => DocumentType::Media,
                    other => return Err(format!("invalid document_type: {}", other)),
                };
                mgr.note_observation(&key, HistoryMetadataObservation::DocumentType(document_type))
                    .map_err(|e| e.to_string())?;
            }
            if let Some(title) = str_param(params, "title") {
                mgr.note_title(&key, title).map_err(|e| e.to_string())?;
            }
            if let Some(image) = str_param(params, "preview_image_url") {
                mgr.note_preview_image(&key, image).map_err(|e| e.to_string())?;
            }
            Ok(json!({"ok": true}))
        }
        "metadata.query" => {
            let query = required_str(params, "query")?;
            let limit = limit_param(params);
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mgr = MetadataManager::new(db.connection());
            let rows = mgr.query_history_metadata(query, limit).map_err(|e| e.to_string())?;
            Ok(json!(rows.iter().map(metadata_json).collect::<Vec<_>>()))
        }
        "metadata.latest" => {
            let url = required_str(params, "url")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mgr = MetadataManager::new(db.connection());
            let latest = mgr.get_latest_for_url(url).map_err(|e| e.to_string())?;
            Ok(latest.as_ref().map(metadata_json).unwrap_or(Value::Null))
        }
        "metadata.delete_older_than" => {
            let older_than = params
                .get("older_than")
                .and_then(|v| v.as_i64())
                .ok_or("missing older_than")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db.lock().map_err(|e| e.to_string())?;
            let mut mgr = MetadataManager::new(db.connection());
            let deleted = mgr.delete_older_than(older_than).map_err(|e| e.to_string())?;
            Ok(json!({"deleted": deleted}))
        }

        // ─── Awesomebar ───
        "awesomebar.input" => {
            let text = str_param(params, "text").unwrap_or("");
            let provider = {
                let a = app.lock().map_err(|e| e.to_string())?;
                a.provider().clone()
            };
            let suggestions = provider.on_input_changed(text).await.map_err(|e| e.to_string())?;
            Ok(json!({
                "provider_id": provider.id(),
                "header": provider.header(),
                "suggestions": suggestions,
            }))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = required_str(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            a.refresh_provider().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "settings.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.reset().map_err(|e| e.to_string())?;
            a.refresh_provider().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Ping ───
        "ping" => Ok(json!({"pong": true})),

        _ => Err(format!("unknown method: {}", method)),
    }
}
