use crate::access::{self, Access};
use crate::document::{self, DOCUMENT_VERSION};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn project_new(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    state.store = Store::new();
    state.access = Access::admin();
    info!("new project");
    Ok(json!({ "schoolName": state.store.school().name }))
}

fn project_import(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let parsed = if let Some(path) = optional_str(&req.params, "path") {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HandlerErr::new("io_failed", e.to_string()).with_details(json!({ "path": path }))
        })?;
        document::parse_str(&text)
    } else if let Some(doc) = req.params.get("document") {
        document::parse_document(doc.clone())
    } else {
        return Err(HandlerErr::bad_params("missing path or document"));
    };
    let doc = parsed.map_err(|e| {
        warn!(error = %format!("{e:#}"), "project import rejected");
        HandlerErr::new("bad_document", format!("{e:#}"))
    })?;

    let version = doc.version.clone();
    state.access = Access::open(doc.project_password.clone());
    let report = document::apply_document(&mut state.store, doc);
    info!(
        total = report.total,
        conflicts = report.conflicts,
        read_only = state.access.is_read_only(),
        "project imported"
    );
    Ok(json!({
        "total": report.total,
        "conflicts": report.conflicts,
        "version": version,
        "readOnly": state.access.is_read_only()
    }))
}

fn resolve_export_path(req: &Request) -> Result<PathBuf, HandlerErr> {
    if let Some(path) = optional_str(&req.params, "path") {
        return Ok(PathBuf::from(path));
    }
    let Some(dir) = optional_str(&req.params, "dir") else {
        return Err(HandlerErr::bad_params("missing path or dir"));
    };
    let file_name = match optional_str(&req.params, "fileName") {
        Some(name) if name.ends_with(".json") => name.to_string(),
        Some(name) => format!("{name}.json"),
        None => document::default_file_name(chrono::Local::now().date_naive()),
    };
    Ok(PathBuf::from(dir).join(file_name))
}

fn project_export(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let out = resolve_export_path(req)?;

    if let Some(pin) = req.params.get("password").and_then(|v| v.as_str()) {
        if state.access.is_read_only() {
            return Err(HandlerErr::new(
                "read_only",
                "only an unlocked session can change the password",
            ));
        }
        if !pin.is_empty() && !access::is_valid_pin(pin) {
            return Err(HandlerErr::new("bad_password", "password must be 4 digits"));
        }
        state.access.set_password(Some(pin));
    }

    let doc = document::snapshot(&state.store, state.access.password_hash().map(str::to_string));
    document::write_document(&out, &doc).map_err(|e| {
        HandlerErr::new("io_failed", format!("{e:#}"))
            .with_details(json!({ "path": out.to_string_lossy() }))
    })?;
    info!(path = %out.to_string_lossy(), "project exported");
    Ok(json!({
        "path": out.to_string_lossy(),
        "version": DOCUMENT_VERSION,
        "hasPassword": state.access.has_password()
    }))
}

fn project_snapshot(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let doc = document::snapshot(&state.store, state.access.password_hash().map(str::to_string));
    Ok(json!({ "document": doc }))
}

fn auth_verify(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let pin = required_str(&req.params, "password")?;
    if !state.access.verify(pin) {
        return Err(HandlerErr::new("bad_password", "password does not match"));
    }
    info!("session unlocked");
    Ok(json!({ "readOnly": state.access.is_read_only() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "project.new" => project_new(state),
        "project.import" => project_import(state, req),
        "project.export" => project_export(state, req),
        "project.snapshot" => project_snapshot(state),
        "auth.verify" => auth_verify(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
