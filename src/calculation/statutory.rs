//! Statutory contribution calculation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::round_money;
use super::rate_resolver::ResolvedStatutoryRate;
use crate::config::{ContributionBase, ContributionShare};
use crate::models::AuditStep;

/// Whether the employee statutory contribution reduces taxable income.
///
/// Used as the default for `EngineSettings::statutory_pre_tax`.
pub const STATUTORY_CONTRIBUTION_IS_PRE_TAX: bool = true;

/// The result of a statutory contribution calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryContributionResult {
    /// The contribution, rounded to the cent.
    pub amount: Decimal,
    /// The amount the rate was applied to.
    pub base_amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates one share of a statutory contribution.
///
/// The rate is applied to basic salary or gross pay depending on the
/// resolved row's base. A missing rate yields a zero contribution.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{calculate_statutory_contribution, ResolvedStatutoryRate};
/// use payroll_engine::config::{ContributionBase, ContributionShare};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let rate = ResolvedStatutoryRate {
///     share: ContributionShare::Employee,
///     name: Some("SSNIT".to_string()),
///     rate: Decimal::from_str("0.11").unwrap(),
///     base: ContributionBase::Gross,
///     effective_from: None,
/// };
///
/// let result = calculate_statutory_contribution(
///     &rate,
///     Decimal::from_str("5000.00").unwrap(),
///     Decimal::from_str("6000.00").unwrap(),
///     1,
/// );
/// assert_eq!(result.amount, Decimal::from_str("660.00").unwrap());
/// ```
pub fn calculate_statutory_contribution(
    rate: &ResolvedStatutoryRate,
    basic_salary: Decimal,
    gross_pay: Decimal,
    step_number: u32,
) -> StatutoryContributionResult {
    let base_amount = match rate.base {
        ContributionBase::Gross => gross_pay,
        ContributionBase::Basic => basic_salary,
    };
    let amount = round_money(base_amount * rate.rate);

    let (rule_id, rule_name) = match rate.share {
        ContributionShare::Employee => ("statutory_employee", "Statutory Contribution (Employee)"),
        ContributionShare::Employer => ("statutory_employer", "Statutory Contribution (Employer)"),
    };

    let reasoning = match &rate.name {
        Some(name) => format!(
            "{} at {} of {:?} base {} = {}",
            name, rate.rate, rate.base, base_amount, amount
        ),
        None => "No statutory rate effective; contribution is zero".to_string(),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        input: serde_json::json!({
            "scheme": rate.name,
            "rate": rate.rate.to_string(),
            "base": rate.base,
            "base_amount": base_amount.to_string(),
            "effective_from": rate.effective_from
        }),
        output: serde_json::json!({
            "amount": amount.to_string()
        }),
        reasoning,
    };

    StatutoryContributionResult {
        amount,
        base_amount,
        audit_step,
    }
}
