use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{db_conn, param, required_bool, required_str};
use crate::ipc::types::{AppState, Request};
use crate::rules::{self, Class, Session, Subject};
use serde_json::{json, Value as JsonValue};
use std::collections::HashSet;

fn handle_pending(state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let classes: Vec<Class> = param(req, "classes")?;
    let subjects: Vec<Subject> = param(req, "subjects")?;
    let sessions: Vec<Session> = param(req, "sessions")?;

    let paid: HashSet<(String, String)> = match state.db.as_ref() {
        Some(conn) => db::payment_list(conn)
            .map_err(|e| err(&req.id, "db_query_failed", e.to_string(), None))?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };

    let items = rules::pending_payments(&classes, &subjects, &sessions, &paid);
    Ok(ok(&req.id, json!({ "items": items })))
}

fn handle_set_paid(state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let conn = db_conn(state, req)?;
    let subject_id = required_str(req, "subjectId")?;
    let class_id = required_str(req, "classId")?;
    let paid = required_bool(req, "paid")?;

    db::payment_set(conn, &subject_id, &class_id, paid)
        .map_err(|e| err(&req.id, "db_update_failed", e.to_string(), None))?;
    tracing::debug!(subject_id = %subject_id, class_id = %class_id, paid, "payment marker updated");
    Ok(ok(&req.id, json!({ "paid": paid })))
}

fn handle_statement(_state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let subject_id = required_str(req, "subjectId")?;
    let class_id = required_str(req, "classId")?;
    let sessions: Vec<Session> = param(req, "sessions")?;

    let statement = rules::payment_statement(&subject_id, &class_id, &sessions);
    Ok(ok(&req.id, json!(statement)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "payments.pending" => handle_pending(state, req),
        "payments.setPaid" => handle_set_paid(state, req),
        "payments.statement" => handle_statement(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
