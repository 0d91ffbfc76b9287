use super::{validate_sessions, RuleError, Session, SessionDraft, SessionType, Subject};
use serde::Serialize;

/// Outcome of checking a draft session against the existing schedule.
///
/// Every rejecting variant names the existing session it collided with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConflictOutcome {
    Clear,
    /// Same class and subject already scheduled in an overlapping slot.
    #[serde(rename_all = "camelCase")]
    Duplicate { existing_id: String },
    #[serde(rename_all = "camelCase")]
    RoomBooked { existing_id: String, room_id: String },
    #[serde(rename_all = "camelCase")]
    TeacherBusy { existing_id: String, teacher_id: String },
    #[serde(rename_all = "camelCase")]
    ClassBusy { existing_id: String },
    /// The class sits an exam in that slot; the draft is a class session.
    #[serde(rename_all = "camelCase")]
    ExamScheduled { existing_id: String },
    /// The class has a class session in that slot; the draft is an exam.
    #[serde(rename_all = "camelCase")]
    ClassScheduled { existing_id: String },
}

impl ConflictOutcome {
    pub fn has_conflict(&self) -> bool {
        !matches!(self, ConflictOutcome::Clear)
    }

    pub fn existing_id(&self) -> Option<&str> {
        match self {
            ConflictOutcome::Clear => None,
            ConflictOutcome::Duplicate { existing_id }
            | ConflictOutcome::RoomBooked { existing_id, .. }
            | ConflictOutcome::TeacherBusy { existing_id, .. }
            | ConflictOutcome::ClassBusy { existing_id }
            | ConflictOutcome::ExamScheduled { existing_id }
            | ConflictOutcome::ClassScheduled { existing_id } => Some(existing_id),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConflictOutcome::Clear => String::new(),
            ConflictOutcome::Duplicate { .. } => {
                "class already has this subject at this time".to_string()
            }
            ConflictOutcome::RoomBooked { room_id, .. } => {
                format!("room {} is already booked at this time", room_id)
            }
            ConflictOutcome::TeacherBusy { .. } => {
                "teacher is already teaching elsewhere at this time".to_string()
            }
            ConflictOutcome::ClassBusy { .. } => {
                "class already has another subject at this time".to_string()
            }
            ConflictOutcome::ExamScheduled { .. } => "class has an exam at this time".to_string(),
            ConflictOutcome::ClassScheduled { .. } => {
                "class has a class session at this time".to_string()
            }
        }
    }
}

/// Half-open period ranges `[a_start, a_start + a_count)` and
/// `[b_start, b_start + b_count)` intersect.
pub fn overlaps(a_start: u32, a_count: u32, b_start: u32, b_count: u32) -> bool {
    let a_end = a_start.saturating_add(a_count);
    let b_end = b_start.saturating_add(b_count);
    a_start < b_end && a_end > b_start
}

/// Decides whether `candidate` can be stored next to `existing`.
///
/// Rules per overlapping session, first match wins:
///
/// 1. same class and subject: duplicate, even for shared subjects;
/// 2. shared subject taught by the same teacher in the same room: a sibling
///    class joining the same joint lecture, not a clash;
/// 3. same room, then same teacher, then same class, then exam/class
///    cross-over for the class.
///
/// `exclude_id` is the stored record being edited, so it never collides
/// with itself. Cancelled sessions are ignored. Any session, candidate or
/// existing, that occupies no periods is rejected.
pub fn check_conflict(
    candidate: &SessionDraft,
    existing: &[Session],
    subjects: &[Subject],
    exclude_id: Option<&str>,
) -> Result<ConflictOutcome, RuleError> {
    candidate.validate()?;
    validate_sessions(existing)?;

    let candidate_shared = subjects
        .iter()
        .find(|s| s.id == candidate.subject_id)
        .map(|s| s.is_shared)
        .unwrap_or(false);

    for item in existing {
        if exclude_id.is_some_and(|id| id == item.id) {
            continue;
        }
        if item.is_off() || item.date != candidate.date {
            continue;
        }
        if !overlaps(
            candidate.start_period,
            candidate.period_count,
            item.start_period,
            item.period_count,
        ) {
            continue;
        }

        let same_class = item.class_id == candidate.class_id;
        let same_subject = item.subject_id == candidate.subject_id;

        if same_class && same_subject {
            return Ok(ConflictOutcome::Duplicate {
                existing_id: item.id.clone(),
            });
        }

        if candidate_shared
            && same_subject
            && item.teacher_id == candidate.teacher_id
            && item.room_id == candidate.room_id
        {
            continue;
        }

        let existing_id = item.id.clone();
        if item.room_id == candidate.room_id {
            return Ok(ConflictOutcome::RoomBooked {
                existing_id,
                room_id: item.room_id.clone(),
            });
        }
        if item.teacher_id == candidate.teacher_id {
            return Ok(ConflictOutcome::TeacherBusy {
                existing_id,
                teacher_id: item.teacher_id.clone(),
            });
        }
        if same_class {
            return Ok(ConflictOutcome::ClassBusy { existing_id });
        }
        // Kept after the class check to preserve rule order; the class check
        // above already rejects every same-class overlap.
        match (item.kind, candidate.kind) {
            (SessionType::Exam, SessionType::Class) if same_class => {
                return Ok(ConflictOutcome::ExamScheduled { existing_id });
            }
            (SessionType::Class, SessionType::Exam) if same_class => {
                return Ok(ConflictOutcome::ClassScheduled { existing_id });
            }
            _ => {}
        }
    }

    Ok(ConflictOutcome::Clear)
}
