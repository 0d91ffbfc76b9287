use super::{
    percent_of, sort_chronologically, sum_periods, validate_sessions, Class, LocalDate, RuleError,
    Session, SessionType, Subject,
};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TeachingState {
    InProgress,
    Upcoming,
    Completed,
}

impl TeachingState {
    fn rank(self) -> u8 {
        match self {
            TeachingState::InProgress => 0,
            TeachingState::Upcoming => 1,
            TeachingState::Completed => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectOverview {
    pub subject_id: String,
    pub name: Option<String>,
    pub total_periods: u32,
    /// Periods held up to and including today.
    pub realized_periods: u64,
    pub percentage: u32,
    pub state: TeachingState,
    pub auto_completed: bool,
    pub manually_completed: bool,
    pub start_date: Option<LocalDate>,
    pub end_date: Option<LocalDate>,
    pub exam_date: Option<LocalDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub upcoming: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOverview {
    pub class_id: String,
    pub subjects: Vec<SubjectOverview>,
    pub summary: OverviewSummary,
}

/// Teaching progress of every subject in the class's field of study.
///
/// `manually_completed` holds the subject ids the user has marked done for
/// this class. Rows come back in-progress first, then upcoming, then completed.
pub fn class_overview(
    class: &Class,
    subjects: &[Subject],
    sessions: &[Session],
    manually_completed: &HashSet<String>,
    today: LocalDate,
) -> Result<ClassOverview, RuleError> {
    validate_sessions(sessions)?;
    let mut rows = Vec::new();

    for sub in subjects.iter().filter(|s| s.major_id == class.major_id) {
        let relevant: Vec<&Session> = sessions
            .iter()
            .filter(|s| s.subject_id == sub.id && s.class_id == class.id && !s.is_off())
            .collect();

        let mut class_sessions: Vec<&Session> = relevant
            .iter()
            .copied()
            .filter(|s| s.kind == SessionType::Class)
            .collect();
        sort_chronologically(&mut class_sessions);
        let exam_date = relevant
            .iter()
            .find(|s| s.kind == SessionType::Exam)
            .map(|s| s.date);

        let realized_periods = sum_periods(relevant.iter().copied().filter(|s| s.date <= today));
        let percentage = percent_of(realized_periods, sub.total_periods, &sub.id)?;

        let auto_completed = realized_periods >= u64::from(sub.total_periods);
        let manual = manually_completed.contains(&sub.id);
        let state = if auto_completed || manual {
            TeachingState::Completed
        } else if relevant.iter().any(|s| s.date <= today) {
            TeachingState::InProgress
        } else {
            TeachingState::Upcoming
        };

        rows.push(SubjectOverview {
            subject_id: sub.id.clone(),
            name: sub.name.clone(),
            total_periods: sub.total_periods,
            realized_periods,
            percentage,
            state,
            auto_completed,
            manually_completed: manual,
            start_date: class_sessions.first().map(|s| s.date),
            end_date: class_sessions.last().map(|s| s.date),
            exam_date,
        });
    }

    rows.sort_by_key(|r| r.state.rank());

    let mut summary = OverviewSummary {
        total: rows.len(),
        ..OverviewSummary::default()
    };
    for r in &rows {
        match r.state {
            TeachingState::Completed => summary.completed += 1,
            TeachingState::InProgress => summary.in_progress += 1,
            TeachingState::Upcoming => summary.upcoming += 1,
        }
    }

    Ok(ClassOverview {
        class_id: class.id.clone(),
        subjects: rows,
        summary,
    })
}
