use crate::db::{self, MarkKey};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    db_conn, opt_param, opt_str, param, required_bool, required_str, rule_err, today_param,
};
use crate::ipc::types::{AppState, Request};
use crate::rules::{self, Class, Session, Subject};
use serde_json::{json, Value as JsonValue};
use std::collections::HashSet;

fn handle_subject(_state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let subject_id = required_str(req, "subjectId")?;
    let class_id = required_str(req, "classId")?;
    let total_periods: u32 = param(req, "totalPeriods")?;
    let sessions: Vec<Session> = param(req, "sessions")?;
    let group = opt_str(req, "group")?;

    let progress = rules::calculate_subject_progress(
        &subject_id,
        &class_id,
        total_periods,
        &sessions,
        group.as_deref(),
    )
    .map_err(|e| rule_err(req, e))?;
    Ok(ok(&req.id, json!(progress)))
}

fn handle_sequence(_state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let current: Session = param(req, "session")?;
    let sessions: Vec<Session> = param(req, "sessions")?;
    let total_periods: u32 = opt_param(req, "totalPeriods")?.unwrap_or(0);

    let info = rules::session_sequence_info(&current, &sessions, total_periods)
        .map_err(|e| rule_err(req, e))?;
    Ok(ok(&req.id, json!(info)))
}

fn handle_class_overview(state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let class: Class = param(req, "class")?;
    let subjects: Vec<Subject> = param(req, "subjects")?;
    let sessions: Vec<Session> = param(req, "sessions")?;
    let today = today_param(req)?;

    // Without a workspace there are simply no manual marks.
    let manual: HashSet<String> = match state.db.as_ref() {
        Some(conn) => db::completion_list(conn, Some(class.id.as_str()))
            .map_err(|e| err(&req.id, "db_query_failed", e.to_string(), None))?
            .into_iter()
            .filter(|k| k.group.is_none())
            .map(|k| k.subject_id)
            .collect(),
        None => HashSet::new(),
    };

    let overview = rules::class_overview(&class, &subjects, &sessions, &manual, today)
        .map_err(|e| rule_err(req, e))?;
    Ok(ok(&req.id, json!(overview)))
}

fn handle_manual_complete_set(state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let conn = db_conn(state, req)?;
    let subject_id = required_str(req, "subjectId")?;
    let class_id = required_str(req, "classId")?;
    let group = opt_str(req, "group")?;
    let completed = required_bool(req, "completed")?;

    let key = MarkKey::new(&subject_id, &class_id, group.as_deref());
    db::completion_set(conn, &key, completed)
        .map_err(|e| err(&req.id, "db_update_failed", e.to_string(), None))?;
    tracing::debug!(subject_id = %subject_id, class_id = %class_id, completed, "manual completion updated");
    Ok(ok(&req.id, json!({ "completed": completed })))
}

fn handle_manual_complete_list(state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let conn = db_conn(state, req)?;
    let class_id = opt_str(req, "classId")?;

    let marks = db::completion_list(conn, class_id.as_deref())
        .map_err(|e| err(&req.id, "db_query_failed", e.to_string(), None))?;
    let marks: Vec<JsonValue> = marks
        .into_iter()
        .map(|k| {
            json!({
                "subjectId": k.subject_id,
                "classId": k.class_id,
                "group": k.group,
            })
        })
        .collect();
    Ok(ok(&req.id, json!({ "marks": marks })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "progress.subject" => handle_subject(state, req),
        "progress.sequence" => handle_sequence(state, req),
        "progress.classOverview" => handle_class_overview(state, req),
        "progress.manualComplete.set" => handle_manual_complete_set(state, req),
        "progress.manualComplete.list" => handle_manual_complete_list(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
