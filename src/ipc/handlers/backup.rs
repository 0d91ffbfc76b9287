use crate::backup;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value as JsonValue};
use std::path::PathBuf;

fn handle_export(state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return Err(err(&req.id, "bad_params", "missing outPath", None)),
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let snapshot = req.params.get("snapshot").filter(|v| !v.is_null());

    let out = PathBuf::from(&out_path);
    let export = backup::export_workspace_bundle(&workspace_path, &out, snapshot).map_err(|e| {
        tracing::warn!(path = %out_path, error = %e, "workspace export failed");
        err(
            &req.id,
            "io_failed",
            e.to_string(),
            Some(json!({ "path": out_path })),
        )
    })?;

    Ok(ok(
        &req.id,
        json!({
            "path": out_path,
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "dbSha256": export.db_sha256,
        }),
    ))
}

fn handle_import(state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return Err(err(&req.id, "bad_params", "missing inPath", None)),
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    };

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return Err(err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": in_path })),
        ));
    }

    // Drop open handle before replacing file.
    state.db = None;
    let imported = backup::import_workspace_bundle(&src, &workspace_path);

    let conn = db::open_db(&workspace_path)
        .map_err(|e| err(&req.id, "db_open_failed", e.to_string(), None))?;
    state.db = Some(conn);

    let import = imported.map_err(|e| {
        tracing::warn!(path = %in_path, error = %e, "workspace import failed");
        err(
            &req.id,
            "io_failed",
            e.to_string(),
            Some(json!({ "path": in_path })),
        )
    })?;
    tracing::info!(workspace = %workspace_path.display(), "workspace restored from bundle");

    Ok(ok(
        &req.id,
        json!({
            "workspacePath": workspace_path.to_string_lossy(),
            "bundleFormatDetected": import.bundle_format_detected,
            "snapshot": import.snapshot,
        }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "backup.export" => handle_export(state, req),
        "backup.import" => handle_import(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
