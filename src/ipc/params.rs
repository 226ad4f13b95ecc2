use crate::ipc::error::HandlerErr;
use crate::model::{Day, Placement, MAX_PERIOD};
use serde::de::DeserializeOwned;
use serde_json::json;

pub fn required_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, HandlerErr> {
    match params.get(key).and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(HandlerErr::bad_params(format!("missing {key}"))),
    }
}

pub fn optional_str<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
}

pub fn optional_bool(params: &serde_json::Value, key: &str) -> bool {
    params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

pub fn required_u32(params: &serde_json::Value, key: &str) -> Result<u32, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing or invalid {key}")))
}

pub fn required_day(params: &serde_json::Value, key: &str) -> Result<Day, HandlerErr> {
    let raw = required_str(params, key)?;
    Day::from_symbol(raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("{key} must be one of 월 화 수 목 금")))
}

pub fn check_period(period: u8) -> Result<u8, HandlerErr> {
    if period == 0 || period > MAX_PERIOD {
        return Err(HandlerErr::bad_params(format!(
            "period must be between 1 and {MAX_PERIOD}"
        ))
        .with_details(json!({ "period": period })));
    }
    Ok(period)
}

pub fn required_period(params: &serde_json::Value, key: &str) -> Result<u8, HandlerErr> {
    let raw = required_u32(params, key)?;
    let period = u8::try_from(raw).map_err(|_| HandlerErr::bad_params(format!("{key} out of range")))?;
    check_period(period)
}

/// Deserializes `params[key]` into `T`, reporting serde's message on failure.
pub fn parse_field<T: DeserializeOwned>(params: &serde_json::Value, key: &str) -> Result<T, HandlerErr> {
    let Some(v) = params.get(key) else {
        return Err(HandlerErr::bad_params(format!("missing {key}")));
    };
    serde_json::from_value(v.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid {key}: {e}")))
}

pub fn parse_placement(value: &serde_json::Value) -> Result<Placement, HandlerErr> {
    let placement: Placement = serde_json::from_value(value.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid placement: {e}")))?;
    check_period(placement.period)?;
    Ok(placement)
}

pub fn required_placement(params: &serde_json::Value, key: &str) -> Result<Placement, HandlerErr> {
    match params.get(key) {
        Some(v) => parse_placement(v),
        None => Err(HandlerErr::bad_params(format!("missing {key}"))),
    }
}
