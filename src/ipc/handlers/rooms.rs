use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{parse_field, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Room;
use serde_json::json;

fn rooms_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "rooms": state.store.rooms() }))
}

fn check_room(room: &Room) -> Result<(), HandlerErr> {
    if room.name.trim().is_empty() {
        return Err(HandlerErr::bad_params("room name must not be empty"));
    }
    if room.capacity == 0 {
        return Err(HandlerErr::bad_params("room capacity must be at least 1"));
    }
    Ok(())
}

fn rooms_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let room: Room = parse_field(&req.params, "room")?;
    check_room(&room)?;
    let id = state.store.add_room(room)?;
    Ok(json!({ "roomId": id }))
}

fn rooms_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let room: Room = parse_field(&req.params, "room")?;
    check_room(&room)?;
    let id = room.id.clone();
    if !state.store.update_room(room) {
        return Err(HandlerErr::not_found(format!("room not found: {id}")));
    }
    Ok(json!({ "roomId": id }))
}

fn rooms_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(&req.params, "id")?;
    if !state.store.remove_room(id) {
        return Err(HandlerErr::not_found(format!("room not found: {id}")));
    }
    Ok(json!({ "roomId": id }))
}

fn rooms_reorder(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let ids: Vec<String> = parse_field(&req.params, "roomIds")?;
    state.store.reorder_rooms(&ids);
    Ok(json!({ "rooms": state.store.rooms() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "rooms.list" => rooms_list(state),
        "rooms.create" => rooms_create(state, req),
        "rooms.update" => rooms_update(state, req),
        "rooms.delete" => rooms_delete(state, req),
        "rooms.reorder" => rooms_reorder(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
