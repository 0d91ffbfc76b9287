use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{opt_param, opt_str, param, parse_date_param, rule_err, today_param};
use crate::ipc::types::{AppState, Request};
use crate::rules::{self, Session, SessionDraft, SessionStatus, Subject};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

fn handle_check_conflict(_state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let candidate: SessionDraft = param(req, "candidate")?;
    let sessions: Vec<Session> = param(req, "sessions")?;
    let subjects: Vec<Subject> = opt_param(req, "subjects")?.unwrap_or_default();
    let exclude_id = opt_str(req, "excludeId")?;

    let outcome = rules::check_conflict(&candidate, &sessions, &subjects, exclude_id.as_deref())
        .map_err(|e| rule_err(req, e))?;
    Ok(ok(
        &req.id,
        json!({
            "hasConflict": outcome.has_conflict(),
            "message": outcome.message(),
            "conflict": outcome,
        }),
    ))
}

/// Turns a draft into a storable session: rejects it on conflict, otherwise
/// assigns an id (kept when editing) and the status it should show today.
fn handle_prepare(_state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let candidate: SessionDraft = param(req, "candidate")?;
    let sessions: Vec<Session> = param(req, "sessions")?;
    let subjects: Vec<Subject> = opt_param(req, "subjects")?.unwrap_or_default();
    let exclude_id = opt_str(req, "excludeId")?;
    let current: SessionStatus = opt_param(req, "status")?.unwrap_or(SessionStatus::Pending);
    let today = today_param(req)?;

    let outcome = rules::check_conflict(&candidate, &sessions, &subjects, exclude_id.as_deref())
        .map_err(|e| rule_err(req, e))?;
    if outcome.has_conflict() {
        return Err(err(
            &req.id,
            "conflict",
            outcome.message(),
            Some(json!({ "existingId": outcome.existing_id(), "conflict": outcome })),
        ));
    }

    let status = rules::determine_status(candidate.date, candidate.start_period, current, today);
    let day_part = rules::day_part(candidate.start_period);
    let id = exclude_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let session = candidate.into_session(id, status);
    Ok(ok(
        &req.id,
        json!({ "session": session, "dayPart": day_part }),
    ))
}

fn handle_derive_status(_state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let date = parse_date_param(req, "date")?;
    let start_period: u32 = opt_param(req, "startPeriod")?.unwrap_or(1);
    let current: SessionStatus = param(req, "status")?;

    let status = if req.params.get("today").map_or(true, |v| v.is_null()) {
        rules::determine_status_now(date, start_period, current)
    } else {
        rules::determine_status(date, start_period, current, today_param(req)?)
    };
    Ok(ok(&req.id, json!({ "status": status })))
}

fn handle_refresh_statuses(_state: &mut AppState, req: &Request) -> Result<JsonValue, JsonValue> {
    let sessions: Vec<Session> = param(req, "sessions")?;
    let today = today_param(req)?;

    let statuses: Vec<JsonValue> = sessions
        .iter()
        .map(|s| {
            let status = rules::determine_status(s.date, s.start_period, s.status, today);
            json!({
                "id": s.id,
                "status": status,
                "changed": status != s.status,
            })
        })
        .collect();
    Ok(ok(&req.id, json!({ "statuses": statuses })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "schedule.checkConflict" => handle_check_conflict(state, req),
        "schedule.prepare" => handle_prepare(state, req),
        "schedule.deriveStatus" => handle_derive_status(state, req),
        "schedule.refreshStatuses" => handle_refresh_statuses(state, req),
        _ => return None,
    };
    Some(resp.unwrap_or_else(|e| e))
}
