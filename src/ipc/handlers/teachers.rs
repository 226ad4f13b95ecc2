use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{optional_str, parse_field, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Teacher;
use serde_json::json;
use tracing::info;

fn teachers_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "teachers": state.store.teachers() }))
}

fn teachers_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let mut teacher: Teacher = parse_field(&req.params, "teacher")?;
    teacher.name = teacher.name.trim().to_string();
    if teacher.name.is_empty() {
        return Err(HandlerErr::bad_params("teacher name must not be empty"));
    }
    let id = state.store.add_teacher(teacher)?;
    info!(teacher = %id, "teacher created");
    Ok(json!({ "teacherId": id }))
}

fn teachers_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let teacher: Teacher = parse_field(&req.params, "teacher")?;
    let id = teacher.id.clone();
    if !state.store.update_teacher(teacher) {
        return Err(HandlerErr::not_found(format!("teacher not found: {id}")));
    }
    Ok(json!({ "teacherId": id }))
}

fn teachers_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(&req.params, "id")?;
    let Some(removed) = state.store.remove_teacher(id) else {
        return Err(HandlerErr::not_found(format!("teacher not found: {id}")));
    };
    Ok(json!({ "removedPlacements": removed }))
}

fn teachers_clear_schedule(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(&req.params, "id")?;
    if state.store.teacher(id).is_none() {
        return Err(HandlerErr::not_found(format!("teacher not found: {id}")));
    }
    let removed = state.store.clear_teacher_schedule(id);
    info!(teacher = id, placements = removed, "teacher schedule cleared");
    Ok(json!({ "removedPlacements": removed }))
}

fn teachers_load(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    if let Some(id) = optional_str(&req.params, "id") {
        let Some(load) = state.store.teacher_load(id) else {
            return Err(HandlerErr::not_found(format!("teacher not found: {id}")));
        };
        return Ok(json!({ "teacherId": id, "load": load }));
    }
    let loads: Vec<serde_json::Value> = state
        .store
        .teachers()
        .iter()
        .filter_map(|t| {
            let load = state.store.teacher_load(&t.id)?;
            Some(json!({ "teacherId": t.id, "load": load }))
        })
        .collect();
    Ok(json!({ "loads": loads }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "teachers.list" => teachers_list(state),
        "teachers.create" => teachers_create(state, req),
        "teachers.update" => teachers_update(state, req),
        "teachers.delete" => teachers_delete(state, req),
        "teachers.clearSchedule" => teachers_clear_schedule(state, req),
        "teachers.load" => teachers_load(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
