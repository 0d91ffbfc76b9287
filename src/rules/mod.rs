//! Scheduling rules: conflict detection, progress accounting and status
//! derivation over caller-supplied snapshots. Nothing in here owns data,
//! touches the workspace database or logs.

mod conflict;
mod error;
mod overview;
mod payments;
mod progress;
mod roster;
mod sequence;
mod status;

pub use conflict::check_conflict;
pub use error::RuleError;
pub use overview::class_overview;
pub use payments::{payment_statement, pending_payments};
pub use progress::calculate_subject_progress;
pub use roster::{class_roster, RosterOrder, Student};
pub use sequence::session_sequence_info;
pub use status::{day_part, determine_status, determine_status_now, today_local};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar date with no time zone attached.
///
/// Always parsed from its `YYYY-MM-DD` components; there is no UTC step, so
/// a session stored for the 1st stays on the 1st wherever the daemon runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalDate(NaiveDate);

impl From<NaiveDate> for LocalDate {
    fn from(d: NaiveDate) -> Self {
        LocalDate(d)
    }
}

impl fmt::Display for LocalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for LocalDate {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_local_date(s)
    }
}

/// Parses `YYYY-MM-DD` as a local calendar date.
///
/// Empty or malformed input is an error; there is no fallback to "today".
pub fn parse_local_date(raw: &str) -> Result<LocalDate, RuleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RuleError::EmptyDate);
    }
    let parts: Vec<&str> = trimmed.split('-').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(RuleError::InvalidDate(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(LocalDate)
        .map_err(|_| RuleError::InvalidDate(trimmed.to_string()))
}

impl Serialize for LocalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_local_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Class,
    Exam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Ongoing,
    Completed,
    /// Cancelled. Inert for conflicts, progress and sequencing.
    Off,
    Makeup,
}

impl SessionStatus {
    /// Statuses set by hand that date-based derivation must leave alone.
    pub fn is_manual_pin(self) -> bool {
        matches!(self, SessionStatus::Off | SessionStatus::Makeup)
    }
}

/// A scheduled class or exam occupying `[start_period, start_period + period_count)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub date: LocalDate,
    pub start_period: u32,
    #[serde(deserialize_with = "de_period_count")]
    pub period_count: u32,
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub room_id: String,
    #[serde(rename = "type")]
    pub kind: SessionType,
    pub status: SessionStatus,
    #[serde(
        default,
        deserialize_with = "de_group",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<String>,
    #[serde(default)]
    pub note: String,
}

impl Session {
    pub fn is_off(&self) -> bool {
        self.status == SessionStatus::Off
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        check_period_count(self.period_count)
    }
}

/// A session that has not been stored yet: no id, no status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub date: LocalDate,
    pub start_period: u32,
    #[serde(deserialize_with = "de_period_count")]
    pub period_count: u32,
    pub class_id: String,
    pub subject_id: String,
    pub teacher_id: String,
    pub room_id: String,
    #[serde(rename = "type")]
    pub kind: SessionType,
    #[serde(
        default,
        deserialize_with = "de_group",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<String>,
    #[serde(default)]
    pub note: String,
}

impl SessionDraft {
    pub fn validate(&self) -> Result<(), RuleError> {
        check_period_count(self.period_count)
    }

    pub fn into_session(self, id: String, status: SessionStatus) -> Session {
        Session {
            id,
            date: self.date,
            start_period: self.start_period,
            period_count: self.period_count,
            class_id: self.class_id,
            subject_id: self.subject_id,
            teacher_id: self.teacher_id,
            room_id: self.room_id,
            kind: self.kind,
            status,
            group: self.group,
            note: self.note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub major_id: String,
    pub total_periods: u32,
    #[serde(default)]
    pub is_shared: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub major_id: String,
}

fn check_period_count(count: u32) -> Result<(), RuleError> {
    if count == 0 {
        return Err(RuleError::InvalidPeriodCount(count));
    }
    Ok(())
}

fn de_period_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let count = u32::deserialize(deserializer)?;
    check_period_count(count).map_err(serde::de::Error::custom)?;
    Ok(count)
}

/// Fails on the first session that occupies no periods.
pub(crate) fn validate_sessions(sessions: &[Session]) -> Result<(), RuleError> {
    sessions.iter().try_for_each(Session::validate)
}

/// Blank and missing group labels both mean "whole class".
fn de_group<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Group visibility shared by progress and sequencing: a grouped view sees
/// common sessions plus its own group; the ungrouped view sees only common ones.
pub(crate) fn visible_to(session_group: Option<&str>, viewer: Option<&str>) -> bool {
    match viewer {
        Some(g) => session_group.map_or(true, |sg| sg == g),
        None => session_group.is_none(),
    }
}

/// Canonical session ordering: `(date, start_period)`, stable for ties.
pub(crate) fn sort_chronologically(sessions: &mut [&Session]) {
    sessions.sort_by_key(|s| (s.date, s.start_period));
}

/// Period total of a run of sessions, accumulated as `u64`.
pub(crate) fn sum_periods<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> u64 {
    sessions.into_iter().map(|s| u64::from(s.period_count)).sum()
}

/// `min(100, round(part / total * 100))`, rounding halves up.
pub(crate) fn percent_of(part: u64, total: u32, subject_id: &str) -> Result<u32, RuleError> {
    if total == 0 {
        return Err(RuleError::ZeroTotalPeriods {
            subject_id: subject_id.to_string(),
        });
    }
    let part = u128::from(part);
    let total = u128::from(total);
    let rounded = (part * 200 + total) / (2 * total);
    Ok(rounded.min(100) as u32)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(raw: &str) -> LocalDate {
        parse_local_date(raw).expect("fixture date")
    }

    pub fn session(id: &str, day: &str, start: u32, count: u32) -> Session {
        Session {
            id: id.to_string(),
            date: date(day),
            start_period: start,
            period_count: count,
            class_id: "C1".to_string(),
            subject_id: "S1".to_string(),
            teacher_id: "T1".to_string(),
            room_id: "R1".to_string(),
            kind: SessionType::Class,
            status: SessionStatus::Pending,
            group: None,
            note: String::new(),
        }
    }

    pub fn draft_of(s: &Session) -> SessionDraft {
        SessionDraft {
            date: s.date,
            start_period: s.start_period,
            period_count: s.period_count,
            class_id: s.class_id.clone(),
            subject_id: s.subject_id.clone(),
            teacher_id: s.teacher_id.clone(),
            room_id: s.room_id.clone(),
            kind: s.kind,
            group: s.group.clone(),
            note: s.note.clone(),
        }
    }

    pub fn subject(id: &str, total: u32, shared: bool) -> Subject {
        Subject {
            id: id.to_string(),
            name: None,
            major_id: "M1".to_string(),
            total_periods: total,
            is_shared: shared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_local_dates_by_component() {
        let d = parse_local_date("2024-03-01").unwrap();
        assert_eq!(d, LocalDate::from(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(d.to_string(), "2024-03-01");
        assert_eq!(parse_local_date(" 2024-12-31 ").unwrap().to_string(), "2024-12-31");
    }

    #[test]
    fn rejects_empty_and_malformed_dates() {
        assert_eq!(parse_local_date(""), Err(RuleError::EmptyDate));
        assert_eq!(parse_local_date("   "), Err(RuleError::EmptyDate));
        assert!(matches!(parse_local_date("2024/03/01"), Err(RuleError::InvalidDate(_))));
        assert!(matches!(parse_local_date("2024-02-30"), Err(RuleError::InvalidDate(_))));
        assert!(matches!(parse_local_date("2024-03"), Err(RuleError::InvalidDate(_))));
        assert!(matches!(parse_local_date("2024-03-01T00:00:00Z"), Err(RuleError::InvalidDate(_))));
    }

    #[test]
    fn session_json_uses_wire_names_and_blank_group_is_common() {
        let s: Session = serde_json::from_value(json!({
            "id": "a",
            "date": "2024-03-01",
            "startPeriod": 1,
            "periodCount": 2,
            "classId": "C1",
            "subjectId": "S1",
            "teacherId": "T1",
            "roomId": "R1",
            "type": "exam",
            "status": "makeup",
            "group": "  "
        }))
        .unwrap();
        assert_eq!(s.kind, SessionType::Exam);
        assert_eq!(s.status, SessionStatus::Makeup);
        assert_eq!(s.group, None);

        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back["date"], "2024-03-01");
        assert_eq!(back["type"], "exam");
        assert!(back.get("group").is_none());
    }

    #[test]
    fn bad_date_in_session_json_is_rejected() {
        let res: Result<Session, _> = serde_json::from_value(json!({
            "id": "a", "date": "", "startPeriod": 1, "periodCount": 1,
            "classId": "C", "subjectId": "S", "teacherId": "T", "roomId": "R",
            "type": "class", "status": "pending"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn percentage_rounds_half_up_and_caps_at_100() {
        assert_eq!(percent_of(1, 8, "s").unwrap(), 13); // 12.5
        assert_eq!(percent_of(1, 3, "s").unwrap(), 33);
        assert_eq!(percent_of(2, 3, "s").unwrap(), 67);
        assert_eq!(percent_of(45, 45, "s").unwrap(), 100);
        assert_eq!(percent_of(60, 45, "s").unwrap(), 100);
        assert!(matches!(percent_of(3, 0, "s"), Err(RuleError::ZeroTotalPeriods { .. })));
        assert_eq!(percent_of(6_000_000_000, 45, "s").unwrap(), 100);
    }

    #[test]
    fn zero_period_count_is_rejected_on_read() {
        let raw = json!({
            "id": "ghost", "date": "2024-03-01", "startPeriod": 5, "periodCount": 0,
            "classId": "C", "subjectId": "S", "teacherId": "T", "roomId": "R",
            "type": "class", "status": "pending"
        });
        let err = serde_json::from_value::<Session>(raw).unwrap_err();
        assert!(err.to_string().contains("periodCount"));

        let mut ghost = fixtures::session("ghost", "2024-03-01", 5, 0);
        assert_eq!(ghost.validate(), Err(RuleError::InvalidPeriodCount(0)));
        ghost.period_count = 1;
        assert_eq!(validate_sessions(&[ghost]), Ok(()));
    }

    #[test]
    fn period_sums_do_not_overflow() {
        let big = vec![
            fixtures::session("a", "2024-03-01", 1, 3_000_000_000),
            fixtures::session("b", "2024-03-02", 1, 3_000_000_000),
        ];
        assert_eq!(sum_periods(&big), 6_000_000_000);
    }

    #[test]
    fn group_visibility() {
        assert!(visible_to(None, None));
        assert!(!visible_to(Some("1"), None));
        assert!(visible_to(None, Some("1")));
        assert!(visible_to(Some("1"), Some("1")));
        assert!(!visible_to(Some("2"), Some("1")));
    }
}
