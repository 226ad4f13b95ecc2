use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{required_str, required_u32};
use crate::ipc::types::{AppState, Request};
use crate::store::SubjectUpdate;
use serde_json::json;

fn subjects_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let store = &state.store;
    Ok(json!({
        "subjects": store.subjects(),
        "subjectStyles": store.subject_styles(),
        "subjectHours": store.subject_hours(),
        "subjectConfigs": store.policies()
    }))
}

fn subjects_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let name = required_str(&req.params, "name")?.trim();
    if !state.store.add_subject(name) {
        return Err(HandlerErr::new("duplicate_id", format!("subject already exists: {name}")));
    }
    Ok(json!({ "subject": name }))
}

fn subjects_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p = &req.params;
    let subject = required_str(p, "subject")?;
    let hours = match p.get("hours") {
        None | Some(serde_json::Value::Null) => None,
        Some(_) => Some(required_u32(p, "hours")?),
    };
    let update = SubjectUpdate {
        new_name: p
            .get("newName")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string()),
        style: p.get("style").filter(|v| !v.is_null()).cloned(),
        allow_overlap: p.get("allowOverlap").and_then(|v| v.as_bool()),
        sync_grade_classes: p.get("syncGradeClasses").and_then(|v| v.as_bool()),
        hours,
    };
    let name = state.store.update_subject(subject, update)?;
    Ok(json!({
        "subject": name,
        "config": state.store.policies().get(&name),
        "hours": state.store.required_hours(&name)
    }))
}

fn subjects_required_hours(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let subject = required_str(&req.params, "subject")?;
    Ok(json!({ "hours": state.store.required_hours(subject) }))
}

fn overlap_check(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let subject = required_str(&req.params, "subject")?;
    let grade = required_u32(&req.params, "grade")?;
    Ok(json!({ "allowed": state.store.is_overlap_allowed(subject, grade) }))
}

fn overlap_grant(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let subject = required_str(&req.params, "subject")?;
    let grade = required_u32(&req.params, "grade")?;
    if grade == 0 {
        return Err(HandlerErr::bad_params("grade must be at least 1"));
    }
    let changed = state.store.grant_grade_overlap(subject, grade);
    Ok(json!({ "changed": changed, "allowed": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "subjects.list" => subjects_list(state),
        "subjects.create" => subjects_create(state, req),
        "subjects.update" => subjects_update(state, req),
        "subjects.requiredHours" => subjects_required_hours(state, req),
        "overlap.check" => overlap_check(state, req),
        "overlap.grant" => overlap_grant(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
