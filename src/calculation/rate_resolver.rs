//! Effective-dated rate resolution.
//!
//! Statutory rates are versioned by `effective_from`; tax tables are keyed by
//! year. A payroll run resolves both once into a [`RateSnapshot`] that every
//! employee's computation reads from.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::config::{BracketTable, ContributionBase, ContributionShare, RateTables};
use crate::error::{EngineError, EngineResult};
use crate::models::AuditWarning;

/// Warning code recorded when no statutory rate applies on the evaluation date.
pub const STATUTORY_RATE_MISSING: &str = "STATUTORY_RATE_MISSING";

/// The statutory rate that applies for one share on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStatutoryRate {
    /// The share the rate applies to.
    pub share: ContributionShare,
    /// Name of the source row, `None` when no row applied.
    pub name: Option<String>,
    /// The rate as a fraction (e.g. 0.11 for 11%).
    pub rate: Decimal,
    /// What the rate is applied to.
    pub base: ContributionBase,
    /// When the source row took effect.
    pub effective_from: Option<NaiveDate>,
}

impl ResolvedStatutoryRate {
    fn missing(share: ContributionShare) -> Self {
        Self {
            share,
            name: None,
            rate: Decimal::ZERO,
            base: ContributionBase::default(),
            effective_from: None,
        }
    }

    /// Whether no configured row applied.
    pub fn is_missing(&self) -> bool {
        self.name.is_none()
    }
}

/// Resolves the statutory rate for a share on a date.
///
/// The row with the latest `effective_from` on or before `as_of` wins; rows
/// taking effect on the same day are ordered by name. When nothing applies the
/// rate is zero and the second element carries a warning for the run summary.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::resolve_statutory_rate;
/// use payroll_engine::config::{ContributionBase, ContributionShare, RateTables, StatutoryConfig};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let tables = RateTables::new(
///     vec![StatutoryConfig {
///         name: "SSNIT".to_string(),
///         rate_percent: Decimal::new(11, 0),
///         effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         share: ContributionShare::Employee,
///         base: ContributionBase::Gross,
///     }],
///     vec![],
/// );
///
/// let as_of = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
/// let (rate, warning) = resolve_statutory_rate(&tables, as_of, ContributionShare::Employee);
/// assert_eq!(rate.rate, Decimal::new(11, 2));
/// assert!(warning.is_none());
/// ```
pub fn resolve_statutory_rate(
    tables: &RateTables,
    as_of: NaiveDate,
    share: ContributionShare,
) -> (ResolvedStatutoryRate, Option<AuditWarning>) {
    let selected = tables
        .statutory()
        .iter()
        .filter(|row| row.share == share && row.effective_from <= as_of)
        .max_by(|a, b| {
            a.effective_from
                .cmp(&b.effective_from)
                .then_with(|| b.name.cmp(&a.name))
        });

    match selected {
        Some(row) => (
            ResolvedStatutoryRate {
                share,
                name: Some(row.name.clone()),
                rate: row.rate_percent / Decimal::ONE_HUNDRED,
                base: row.base,
                effective_from: Some(row.effective_from),
            },
            None,
        ),
        None => {
            warn!(
                share = ?share,
                as_of = %as_of,
                "No statutory rate effective, contribution will be zero"
            );
            let warning = AuditWarning {
                code: STATUTORY_RATE_MISSING.to_string(),
                message: format!(
                    "No {:?} statutory rate is effective on {}; contribution set to zero",
                    share, as_of
                ),
                severity: "high".to_string(),
            };
            (ResolvedStatutoryRate::missing(share), Some(warning))
        }
    }
}

/// Returns the validated tax table for a year.
///
/// Fails with [`EngineError::MissingTaxBrackets`] when no table exists, since
/// no employee in that year can be taxed correctly.
pub fn resolve_tax_brackets(tables: &RateTables, year: i32) -> EngineResult<&BracketTable> {
    tables
        .bracket_table(year)
        .ok_or(EngineError::MissingTaxBrackets { year })
}

/// Rates resolved once for a run and shared read-only by every employee.
#[derive(Debug, Clone, Serialize)]
pub struct RateSnapshot {
    /// The date statutory rates were resolved at.
    pub as_of: NaiveDate,
    /// The employee statutory rate.
    pub employee_statutory: ResolvedStatutoryRate,
    /// The employer statutory rate.
    pub employer_statutory: ResolvedStatutoryRate,
    /// The tax table for the run's year.
    pub brackets: BracketTable,
    /// Warnings raised while resolving.
    pub warnings: Vec<AuditWarning>,
}

impl RateSnapshot {
    /// Resolves both statutory shares at `as_of` and the tax table for `year`.
    pub fn resolve(tables: &RateTables, as_of: NaiveDate, year: i32) -> EngineResult<Self> {
        let brackets = resolve_tax_brackets(tables, year)?.clone();

        let mut warnings = Vec::new();
        let (employee_statutory, warning) =
            resolve_statutory_rate(tables, as_of, ContributionShare::Employee);
        warnings.extend(warning);
        let (employer_statutory, warning) =
            resolve_statutory_rate(tables, as_of, ContributionShare::Employer);
        warnings.extend(warning);

        Ok(Self {
            as_of,
            employee_statutory,
            employer_statutory,
            brackets,
            warnings,
        })
    }
}
