//! Payroll period and payroll run models.
//!
//! This module contains the [`PeriodKey`], [`PayrollPeriod`] and [`PayrollRun`]
//! types that define the context of a payroll computation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Identifies a month-based payroll period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PeriodKey;
/// use chrono::NaiveDate;
///
/// let period: PeriodKey = "2025-08".parse().unwrap();
/// assert_eq!(period.year, 2025);
/// assert_eq!(period.month, 8);
/// assert_eq!(period.start_date(), NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
/// assert_eq!(period.end_date(), NaiveDate::from_ymd_opt(2025, 8, 31).unwrap());
/// assert_eq!(period.to_string(), "2025-08");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl PeriodKey {
    /// Creates a period key, rejecting months outside 1-12 and unrepresentable years.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::InvalidPeriod {
                input: format!("{}-{:02}", year, month),
                message: "month must be between 1 and 12".to_string(),
            });
        }
        Ok(Self { year, month })
    }

    /// The first day of the period.
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The last day of the period.
    pub fn end_date(&self) -> NaiveDate {
        let start = self.start_date();
        let next_month = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next_month.and_then(|d| d.pred_opt()).unwrap_or(start)
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = EngineError;

    /// Parses the `YYYY-MM` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| EngineError::InvalidPeriod {
            input: s.to_string(),
            message: message.to_string(),
        };

        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| invalid("period must be in format YYYY-MM"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| invalid("period must be in format YYYY-MM"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| invalid("period must be in format YYYY-MM"))?;

        Self::new(year, month).map_err(|_| invalid("month must be between 1 and 12"))
    }
}

/// A month-based payroll period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// The period identifier.
    pub key: PeriodKey,
    /// The first day of the period.
    pub start_date: NaiveDate,
    /// The last day of the period.
    pub end_date: NaiveDate,
    /// Once closed, no further runs are permitted.
    pub closed: bool,
}

impl PayrollPeriod {
    /// Opens a new period.
    pub fn open(key: PeriodKey) -> Self {
        Self {
            key,
            start_date: key.start_date(),
            end_date: key.end_date(),
            closed: false,
        }
    }
}

/// Lifecycle of a payroll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Computed, awaiting approval.
    Draft,
    /// Approved for payment.
    Approved,
    /// Paid out.
    Paid,
}

impl RunStatus {
    /// Returns true if a run may move from `self` to `next`.
    ///
    /// The only transitions are draft → approved and approved → paid.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::RunStatus;
    ///
    /// assert!(RunStatus::Draft.can_transition_to(RunStatus::Approved));
    /// assert!(!RunStatus::Draft.can_transition_to(RunStatus::Paid));
    /// ```
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (RunStatus::Draft, RunStatus::Approved) | (RunStatus::Approved, RunStatus::Paid)
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Draft => "draft",
            RunStatus::Approved => "approved",
            RunStatus::Paid => "paid",
        };
        f.write_str(name)
    }
}

/// One execution of the engine over a period.
///
/// Immutable once created except for its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique run identifier.
    pub id: Uuid,
    /// The period the run covers.
    pub period: PeriodKey,
    /// The date statutory rates were resolved at.
    pub reference_date: NaiveDate,
    /// Who started the run.
    pub created_by: String,
    /// When the run was created.
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: RunStatus,
}

impl PayrollRun {
    /// Creates a new draft run.
    pub fn new(period: PeriodKey, reference_date: NaiveDate, created_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            period,
            reference_date,
            created_by: created_by.into(),
            created_at: Utc::now(),
            status: RunStatus::Draft,
        }
    }

    /// Moves the run to `next`, rejecting anything but the forward transitions.
    pub fn transition(&mut self, next: RunStatus) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidStatusTransition {
                run_id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period_key() {
        let key: PeriodKey = "2025-08".parse().unwrap();
        assert_eq!(key, PeriodKey { year: 2025, month: 8 });
    }

    #[test]
    fn test_parse_period_key_rejects_bad_format() {
        let result = "2025/08".parse::<PeriodKey>();
        match result {
            Err(EngineError::InvalidPeriod { input, message }) => {
                assert_eq!(input, "2025/08");
                assert!(message.contains("YYYY-MM"));
            }
            other => panic!("Expected InvalidPeriod, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_period_key_rejects_month_13() {
        let result = "2025-13".parse::<PeriodKey>();
        assert!(matches!(result, Err(EngineError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_new_rejects_month_zero() {
        assert!(PeriodKey::new(2025, 0).is_err());
    }

    #[test]
    fn test_end_date_handles_december_and_february() {
        let december = PeriodKey::new(2025, 12).unwrap();
        assert_eq!(
            december.end_date(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );

        let leap_february = PeriodKey::new(2024, 2).unwrap();
        assert_eq!(
            leap_february.end_date(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_contains_date() {
        let key = PeriodKey::new(2025, 8).unwrap();
        assert!(key.contains_date(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()));
        assert!(key.contains_date(NaiveDate::from_ymd_opt(2025, 8, 31).unwrap()));
        assert!(!key.contains_date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()));
    }

    #[test]
    fn test_display_pads_month() {
        assert_eq!(PeriodKey::new(2026, 1).unwrap().to_string(), "2026-01");
    }

    #[test]
    fn test_open_period_is_not_closed() {
        let period = PayrollPeriod::open(PeriodKey::new(2025, 8).unwrap());
        assert!(!period.closed);
        assert_eq!(
            period.start_date,
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
        );
    }

    #[test]
    fn test_run_status_transitions() {
        let key = PeriodKey::new(2025, 8).unwrap();
        let mut run = PayrollRun::new(key, key.start_date(), "officer");
        assert_eq!(run.status, RunStatus::Draft);

        run.transition(RunStatus::Approved).unwrap();
        run.transition(RunStatus::Paid).unwrap();
        assert_eq!(run.status, RunStatus::Paid);

        let result = run.transition(RunStatus::Draft);
        match result {
            Err(EngineError::InvalidStatusTransition { from, to, .. }) => {
                assert_eq!(from, RunStatus::Paid);
                assert_eq!(to, RunStatus::Draft);
            }
            other => panic!("Expected InvalidStatusTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_cannot_skip_to_paid() {
        let key = PeriodKey::new(2025, 8).unwrap();
        let mut run = PayrollRun::new(key, key.start_date(), "officer");
        assert!(run.transition(RunStatus::Paid).is_err());
        assert_eq!(run.status, RunStatus::Draft);
    }

    #[test]
    fn test_serialize_period_key() {
        let key = PeriodKey::new(2025, 8).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"year":2025,"month":8}"#);
    }
}
