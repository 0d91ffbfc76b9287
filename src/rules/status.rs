use super::{LocalDate, SessionStatus};
use chrono::Local;
use serde::Serialize;

/// Today's date on the local wall clock. Read fresh on every call so a
/// long-running daemon notices midnight.
pub fn today_local() -> LocalDate {
    LocalDate::from(Local::now().date_naive())
}

/// Status of a session as of `today`.
///
/// `off` and `makeup` are set by hand and returned untouched. The start
/// period does not take part yet: a session is ongoing for the whole day.
pub fn determine_status(
    date: LocalDate,
    _start_period: u32,
    current: SessionStatus,
    today: LocalDate,
) -> SessionStatus {
    if current.is_manual_pin() {
        return current;
    }
    match date.cmp(&today) {
        std::cmp::Ordering::Less => SessionStatus::Completed,
        std::cmp::Ordering::Greater => SessionStatus::Pending,
        std::cmp::Ordering::Equal => SessionStatus::Ongoing,
    }
}

pub fn determine_status_now(
    date: LocalDate,
    start_period: u32,
    current: SessionStatus,
) -> SessionStatus {
    determine_status(date, start_period, current, today_local())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
}

/// Periods 1-5 are the morning shift, 6-10 the afternoon, the rest evening.
pub fn day_part(start_period: u32) -> DayPart {
    if start_period <= 5 {
        DayPart::Morning
    } else if start_period <= 10 {
        DayPart::Afternoon
    } else {
        DayPart::Evening
    }
}
