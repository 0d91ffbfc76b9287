use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("date is empty")]
    EmptyDate,

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("subject {subject_id} has totalPeriods = 0")]
    ZeroTotalPeriods { subject_id: String },

    #[error("session {0} is not part of its subject/class sequence")]
    SessionNotFound(String),

    #[error("periodCount must be at least 1, got {0}")]
    InvalidPeriodCount(u32),
}

impl RuleError {
    /// Stable code used in IPC error objects.
    pub fn code(&self) -> &'static str {
        match self {
            RuleError::EmptyDate | RuleError::InvalidDate(_) => "bad_date",
            RuleError::ZeroTotalPeriods { .. } => "zero_total_periods",
            RuleError::SessionNotFound(_) => "not_found",
            RuleError::InvalidPeriodCount(_) => "bad_params",
        }
    }
}
