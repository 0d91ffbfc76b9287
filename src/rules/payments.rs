use super::{sort_chronologically, sum_periods, Class, LocalDate, Session, SessionType, Subject};
use serde::Serialize;
use std::collections::HashSet;

/// Exam notes containing this phrase mark a practical exam, which is paid
/// like teaching time.
pub const PRACTICAL_EXAM_KEYWORD: &str = "thực hành";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayment {
    pub subject_id: String,
    pub class_id: String,
    pub subject_name: Option<String>,
    pub total_periods: u32,
    pub learned_periods: u64,
    /// Teachers who held sessions, in order of first appearance.
    pub teacher_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatement {
    pub subject_id: String,
    pub class_id: String,
    pub from_date: Option<LocalDate>,
    pub to_date: Option<LocalDate>,
    pub actual_total_periods: u64,
    pub sessions: Vec<Session>,
}

/// Subject/class pairs that have been fully taught and not paid out yet.
///
/// `paid` holds `(subject_id, class_id)` pairs already settled.
pub fn pending_payments(
    classes: &[Class],
    subjects: &[Subject],
    sessions: &[Session],
    paid: &HashSet<(String, String)>,
) -> Vec<PendingPayment> {
    let mut out = Vec::new();
    for class in classes {
        for sub in subjects.iter().filter(|s| s.major_id == class.major_id) {
            if paid.contains(&(sub.id.clone(), class.id.clone())) {
                continue;
            }
            let relevant: Vec<&Session> = sessions
                .iter()
                .filter(|s| s.subject_id == sub.id && s.class_id == class.id && !s.is_off())
                .collect();
            let learned = sum_periods(relevant.iter().copied());
            if learned == 0 || learned < u64::from(sub.total_periods) {
                continue;
            }

            let mut teacher_ids: Vec<String> = Vec::new();
            for s in &relevant {
                if !teacher_ids.contains(&s.teacher_id) {
                    teacher_ids.push(s.teacher_id.clone());
                }
            }

            out.push(PendingPayment {
                subject_id: sub.id.clone(),
                class_id: class.id.clone(),
                subject_name: sub.name.clone(),
                total_periods: sub.total_periods,
                learned_periods: learned,
                teacher_ids,
            });
        }
    }
    out
}

fn is_practical_exam(s: &Session) -> bool {
    s.kind == SessionType::Exam && s.note.to_lowercase().contains(PRACTICAL_EXAM_KEYWORD)
}

/// Billable sessions of one subject in one class: every class session plus
/// practical exams, in calendar order.
pub fn payment_statement(subject_id: &str, class_id: &str, sessions: &[Session]) -> PaymentStatement {
    let mut billable: Vec<&Session> = sessions
        .iter()
        .filter(|s| s.subject_id == subject_id && s.class_id == class_id && !s.is_off())
        .filter(|s| s.kind == SessionType::Class || is_practical_exam(s))
        .collect();
    sort_chronologically(&mut billable);

    PaymentStatement {
        subject_id: subject_id.to_string(),
        class_id: class_id.to_string(),
        from_date: billable.first().map(|s| s.date),
        to_date: billable.last().map(|s| s.date),
        actual_total_periods: sum_periods(billable.iter().copied()),
        sessions: billable.into_iter().cloned().collect(),
    }
}
