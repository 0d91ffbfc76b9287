use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::rules::{self, LocalDate, RuleError};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, JsonValue> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn required_str(req: &Request, key: &str) -> Result<String, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn opt_str(req: &Request, key: &str) -> Result<Option<String>, JsonValue> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let s = v.as_str().ok_or_else(|| {
                err(
                    &req.id,
                    "bad_params",
                    format!("{} must be string or null", key),
                    None,
                )
            })?;
            let t = s.trim();
            Ok(if t.is_empty() { None } else { Some(t.to_string()) })
        }
    }
}

pub fn required_bool(req: &Request, key: &str) -> Result<bool, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be boolean", key), None))
}

/// Deserializes `params[key]` into a typed value.
///
/// Malformed dates inside the value surface here as `bad_params`, with the
/// parser's message naming the offending input.
pub fn param<T: DeserializeOwned>(req: &Request, key: &str) -> Result<T, JsonValue> {
    let Some(raw) = req.params.get(key) else {
        return Err(err(&req.id, "bad_params", format!("missing {}", key), None));
    };
    serde_json::from_value(raw.clone()).map_err(|e| {
        err(
            &req.id,
            "bad_params",
            format!("invalid {}: {}", key, e),
            Some(json!({ "param": key })),
        )
    })
}

pub fn opt_param<T: DeserializeOwned>(req: &Request, key: &str) -> Result<Option<T>, JsonValue> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(_) => param(req, key).map(Some),
    }
}

pub fn parse_date_param(req: &Request, key: &str) -> Result<LocalDate, JsonValue> {
    let raw = req
        .params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))?;
    rules::parse_local_date(raw).map_err(|e| rule_err(req, e))
}

/// `params.today` when given, otherwise the local date at the time of the call.
pub fn today_param(req: &Request) -> Result<LocalDate, JsonValue> {
    match req.params.get("today") {
        None => Ok(rules::today_local()),
        Some(v) if v.is_null() => Ok(rules::today_local()),
        Some(_) => parse_date_param(req, "today"),
    }
}

pub fn rule_err(req: &Request, e: RuleError) -> JsonValue {
    err(&req.id, e.code(), e.to_string(), None)
}
