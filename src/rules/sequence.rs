use super::{
    sort_chronologically, sum_periods, validate_sessions, visible_to, RuleError, Session,
    SessionType,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceInfo {
    pub cumulative: u64,
    pub is_first: bool,
    pub is_last: bool,
}

/// Where `current` sits in the run of class sessions for its subject, class
/// and group view.
///
/// `is_last` means the session brings the cumulative count up to
/// `total_periods`, not that it is the latest one on the calendar.
pub fn session_sequence_info(
    current: &Session,
    all: &[Session],
    total_periods: u32,
) -> Result<SequenceInfo, RuleError> {
    current.validate()?;
    validate_sessions(all)?;
    let mut relevant: Vec<&Session> = all
        .iter()
        .filter(|s| {
            s.subject_id == current.subject_id
                && s.class_id == current.class_id
                && !s.is_off()
                && s.kind == SessionType::Class
                && visible_to(s.group.as_deref(), current.group.as_deref())
        })
        .collect();
    sort_chronologically(&mut relevant);

    let index = relevant
        .iter()
        .position(|s| s.id == current.id)
        .ok_or_else(|| RuleError::SessionNotFound(current.id.clone()))?;

    let before = sum_periods(relevant[..index].iter().copied());
    let cumulative = before + u64::from(relevant[index].period_count);

    Ok(SequenceInfo {
        cumulative,
        is_first: before == 0,
        is_last: total_periods > 0 && cumulative >= u64::from(total_periods),
    })
}
