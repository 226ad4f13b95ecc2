use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;
use tracing::debug;

/// Methods that change the open project. A read-only session gets
/// `read_only` for all of them.
const MUTATING_METHODS: &[&str] = &[
    "school.update",
    "layout.update",
    "teachers.create",
    "teachers.update",
    "teachers.delete",
    "teachers.clearSchedule",
    "rooms.create",
    "rooms.update",
    "rooms.delete",
    "rooms.reorder",
    "subjects.create",
    "subjects.update",
    "overlap.grant",
    "placements.add",
    "placements.update",
    "placements.remove",
    "placements.assignBatch",
    "placements.move",
    "placements.assignHomeroom",
];

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    debug!(id = %req.id, method = %req.method, "request");

    if state.access.is_read_only() && MUTATING_METHODS.contains(&req.method.as_str()) {
        return err(
            &req.id,
            "read_only",
            "project is open read-only; verify the password first",
            None,
        );
    }

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::project::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::school::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::teachers::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::rooms::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::subjects::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::placements::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::blocks::try_handle(state, &req) {
        return resp;
    }

    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
