use crate::blocks;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{required_day, required_period, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn blocks_unfulfilled(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = required_str(&req.params, "teacherId")?;
    Ok(json!({ "blocks": blocks::unfulfilled_blocks(&state.store, teacher_id) }))
}

fn blocks_for_cell(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let teacher_id = required_str(&req.params, "teacherId")?;
    let day = required_day(&req.params, "day")?;
    let period = required_period(&req.params, "period")?;
    let candidates = blocks::blocks_for_cell(&state.store, teacher_id, day, period);
    Ok(json!({ "candidates": candidates }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "blocks.unfulfilled" => blocks_unfulfilled(state, req),
        "blocks.forCell" => blocks_for_cell(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
