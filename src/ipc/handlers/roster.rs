use crate::ipc::error::ok;
use crate::ipc::helpers::{opt_param, opt_str, param, required_str};
use crate::ipc::types::{AppState, Request};
use crate::rules::{self, RosterOrder, Student};
use serde_json::{json, Value as JsonValue};

fn handle_list(_state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let class_id = required_str(req, "classId")?;
    let students: Vec<Student> = param(req, "students")?;
    let search = opt_str(req, "search")?;
    let order: RosterOrder = opt_param(req, "order")?.unwrap_or_default();

    let roster = rules::class_roster(&students, &class_id, search.as_deref(), order);
    Ok(ok(
        &req.id,
        json!({ "students": roster, "count": roster.len() }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "roster.list" => handle_list(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
