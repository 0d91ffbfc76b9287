use super::{percent_of, sum_periods, validate_sessions, visible_to, RuleError, Session};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectProgress {
    pub learned: u64,
    pub total: u32,
    pub percentage: u32,
    pub remaining: u64,
}

/// Periods covered so far for one subject in one class.
///
/// With `group`, common sessions and that group's sessions count; without
/// it, only common sessions do. Cancelled sessions never count.
pub fn calculate_subject_progress(
    subject_id: &str,
    class_id: &str,
    total_periods: u32,
    sessions: &[Session],
    group: Option<&str>,
) -> Result<SubjectProgress, RuleError> {
    validate_sessions(sessions)?;
    let learned = sum_periods(
        sessions
            .iter()
            .filter(|s| s.subject_id == subject_id && s.class_id == class_id && !s.is_off())
            .filter(|s| visible_to(s.group.as_deref(), group)),
    );

    Ok(SubjectProgress {
        learned,
        total: total_periods,
        percentage: percent_of(learned, total_periods, subject_id)?,
        remaining: u64::from(total_periods).saturating_sub(learned),
    })
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::session;
    use super::super::SessionStatus;
    use super::*;

    fn grouped(id: &str, day: &str, count: u32, group: &str) -> Session {
        let mut s = session(id, day, 1, count);
        s.group = Some(group.to_string());
        s
    }

    fn sample() -> Vec<Session> {
        let mut off = session("off", "2024-03-04", 1, 5);
        off.status = SessionStatus::Off;
        let mut other_class = session("oc", "2024-03-04", 1, 7);
        other_class.class_id = "C2".into();
        let mut other_subject = session("os", "2024-03-04", 1, 7);
        other_subject.subject_id = "S2".into();
        vec![
            session("a", "2024-03-01", 1, 4),
            grouped("g1", "2024-03-02", 3, "1"),
            grouped("g2", "2024-03-03", 2, "2"),
            off,
            other_class,
            other_subject,
        ]
    }

    #[test]
    fn ungrouped_view_counts_common_sessions_only() {
        let p = calculate_subject_progress("S1", "C1", 10, &sample(), None).unwrap();
        assert_eq!(
            p,
            SubjectProgress {
                learned: 4,
                total: 10,
                percentage: 40,
                remaining: 6
            }
        );
    }

    #[test]
    fn group_view_adds_its_own_group() {
        let p1 = calculate_subject_progress("S1", "C1", 10, &sample(), Some("1")).unwrap();
        assert_eq!(p1.learned, 7);
        let p2 = calculate_subject_progress("S1", "C1", 10, &sample(), Some("2")).unwrap();
        assert_eq!(p2.learned, 6);
    }

    #[test]
    fn off_sessions_do_not_count() {
        let mut sessions = sample();
        let before = calculate_subject_progress("S1", "C1", 10, &sessions, None).unwrap();
        let mut extra = session("off2", "2024-03-09", 1, 3);
        extra.status = SessionStatus::Off;
        sessions.push(extra);
        let after = calculate_subject_progress("S1", "C1", 10, &sessions, None).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn adding_sessions_never_decreases_learned() {
        let mut sessions = sample();
        let mut last = calculate_subject_progress("S1", "C1", 10, &sessions, Some("1"))
            .unwrap()
            .learned;
        for (i, count) in [1, 2, 3].into_iter().enumerate() {
            sessions.push(session(&format!("n{i}"), "2024-04-01", 1, count));
            let now = calculate_subject_progress("S1", "C1", 10, &sessions, Some("1"))
                .unwrap()
                .learned;
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn same_inputs_same_output() {
        let sessions = sample();
        let a = calculate_subject_progress("S1", "C1", 9, &sessions, Some("1")).unwrap();
        let b = calculate_subject_progress("S1", "C1", 9, &sessions, Some("1")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn over_scheduled_subject_caps_at_100() {
        let sessions = vec![session("a", "2024-03-01", 1, 5), session("b", "2024-03-02", 1, 5)];
        let p = calculate_subject_progress("S1", "C1", 8, &sessions, None).unwrap();
        assert_eq!(p.learned, 10);
        assert_eq!(p.percentage, 100);
        assert_eq!(p.remaining, 0);

        let exact = calculate_subject_progress("S1", "C1", 10, &sessions, None).unwrap();
        assert_eq!(exact.percentage, 100);
    }

    #[test]
    fn huge_period_counts_are_summed_without_overflow() {
        let sessions = vec![
            session("a", "2024-03-01", 1, 3_000_000_000),
            session("b", "2024-03-02", 1, 3_000_000_000),
        ];
        let p = calculate_subject_progress("S1", "C1", 45, &sessions, None).unwrap();
        assert_eq!(p.learned, 6_000_000_000);
        assert_eq!(p.percentage, 100);
        assert_eq!(p.remaining, 0);
    }

    #[test]
    fn empty_session_is_rejected() {
        let mut sessions = sample();
        sessions.push(session("ghost", "2024-03-09", 5, 0));
        assert_eq!(
            calculate_subject_progress("S1", "C1", 10, &sessions, None),
            Err(RuleError::InvalidPeriodCount(0))
        );
    }

    #[test]
    fn zero_total_is_an_error() {
        let err = calculate_subject_progress("S1", "C1", 0, &sample(), None).unwrap_err();
        assert_eq!(
            err,
            RuleError::ZeroTotalPeriods {
                subject_id: "S1".into()
            }
        );
    }
}
