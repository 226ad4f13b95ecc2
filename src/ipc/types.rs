use crate::access::Access;
use crate::store::Store;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: Store,
    pub access: Access,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: Store::new(),
            access: Access::admin(),
        }
    }
}
