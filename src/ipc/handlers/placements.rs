use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{
    optional_bool, optional_str, parse_placement, required_day, required_period,
    required_placement, required_str,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Day, Placement};
use crate::moves;
use crate::store::StoreError;
use serde_json::json;
use tracing::info;

fn placements_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let p = &req.params;
    let day = match optional_str(p, "day") {
        Some(_) => Some(required_day(p, "day")?),
        None => None,
    };
    let class_id = optional_str(p, "classId");
    let teacher_id = optional_str(p, "teacherId");
    let room_id = optional_str(p, "roomId");

    let matches = |s: &&Placement| {
        day.map_or(true, |d| s.day == d)
            && class_id.map_or(true, |c| s.class_id.as_str() == c)
            && teacher_id.map_or(true, |t| s.teacher() == Some(t))
            && room_id.map_or(true, |r| s.room() == Some(r))
    };
    let placements: Vec<&Placement> = state.store.placements().iter().filter(matches).collect();
    Ok(json!({ "placements": placements }))
}

fn placements_add(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let placement = required_placement(&req.params, "placement")?;
    let force = optional_bool(&req.params, "force");
    let outcome = state.store.assign_checked(placement, force)?;
    Ok(json!(outcome))
}

fn placements_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let placement = required_placement(&req.params, "placement")?;
    let id = placement.id.clone();
    if id.is_empty() || !state.store.update_placement(placement) {
        return Err(HandlerErr::not_found(format!("placement not found: {id}")));
    }
    let conflict = state
        .store
        .placement(&id)
        .map(|p| state.store.check(p))
        .unwrap_or_default();
    Ok(json!({ "placementId": id, "conflict": conflict }))
}

fn placements_remove(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(&req.params, "id")?;
    let removed = state.store.remove_placement(id);
    Ok(json!({ "removed": removed }))
}

fn placements_assign_batch(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let Some(items) = req.params.get("placements").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("missing placements"));
    };
    let mut batch = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let placement = parse_placement(item).map_err(|e| e.with_details(json!({ "index": idx })))?;
        batch.push(placement);
    }
    let force = optional_bool(&req.params, "force");
    let outcome = state.store.assign_batch(batch, force)?;
    Ok(json!(outcome))
}

fn placements_move(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(&req.params, "id")?;
    let day: Day = required_day(&req.params, "day")?;
    let period = required_period(&req.params, "period")?;
    let force = optional_bool(&req.params, "force");

    let plan = moves::plan_move(&state.store, id, day, period)?;
    let report = json!(plan);
    let applied = plan.apply(&mut state.store, force);
    Ok(json!({ "applied": applied, "plan": report }))
}

fn placements_assign_homeroom(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let class_id = required_str(&req.params, "classId")?;
    let day = required_day(&req.params, "day")?;
    let period = required_period(&req.params, "period")?;
    let subject = required_str(&req.params, "subject")?;

    let outcome = match state.store.assign_homeroom(class_id, day, period, subject) {
        Ok(outcome) => outcome,
        Err(StoreError::Locked { id }) => {
            return Err(HandlerErr::new(
                "locked",
                "cell is held by a specialist or grade-wide placement",
            )
            .with_details(json!({ "placementId": id })));
        }
        Err(e) => return Err(e.into()),
    };
    info!(class = class_id, %day, period, subject, "homeroom assigned");
    Ok(json!(outcome))
}

fn conflicts_check(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let candidate = required_placement(&req.params, "placement")?;
    Ok(json!({ "conflict": state.store.check(&candidate) }))
}

fn conflicts_scan(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "placementIds": state.store.conflicting_ids() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "placements.list" => placements_list(state, req),
        "placements.add" => placements_add(state, req),
        "placements.update" => placements_update(state, req),
        "placements.remove" => placements_remove(state, req),
        "placements.assignBatch" => placements_assign_batch(state, req),
        "placements.move" => placements_move(state, req),
        "placements.assignHomeroom" => placements_assign_homeroom(state, req),
        "conflicts.check" => conflicts_check(state, req),
        "conflicts.scan" => conflicts_scan(state),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
