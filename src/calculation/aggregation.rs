//! Compensation aggregation.
//!
//! Combines basic salary with the employee's active allowance and deduction
//! assignments into earning and deduction lines, tracking the amounts that
//! affect taxable income separately from gross.
//!
//! ## Line Rules
//!
//! - Basic salary is always the first earning line.
//! - `percent_of_basic` allowances pay `basic × percent / 100`; `fixed_amount`
//!   allowances pay the assignment amount.
//! - Non-taxable allowances are part of gross and net but not taxable income.
//! - Pre-tax deductions reduce taxable income; post-tax deductions reduce net.

use std::collections::HashSet;

use rust_decimal::Decimal;

use super::money::{is_valid_money_amount, max_money_amount, round_money};
use crate::config::Catalog;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllowanceRule, AuditStep, DeductionTiming, Employee, LineComponent, LineKind, PayslipLine,
    TaxTreatment,
};

/// The aggregated earnings and catalog deductions for one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationResult {
    /// The basic salary line amount.
    pub basic_salary: Decimal,
    /// Basic salary plus all allowances.
    pub gross_pay: Decimal,
    /// Allowances excluded from taxable income.
    pub non_taxable_earnings: Decimal,
    /// Deductions that reduce taxable income.
    pub pre_tax_deductions: Decimal,
    /// Deductions taken after tax.
    pub post_tax_deductions: Decimal,
    /// Earning, pre-tax relief and post-tax deduction lines.
    pub lines: Vec<PayslipLine>,
    /// Audit steps for the allowances and deductions applied.
    pub audit_steps: Vec<AuditStep>,
}

/// Aggregates basic salary, allowances and catalog deductions.
///
/// # Arguments
///
/// * `employee` - The employee with allowance and deduction assignments
/// * `basic_salary` - The basic salary from the employee's grade step
/// * `catalog` - The allowance and deduction catalogs
/// * `step_number_start` - The first audit step number to use
///
/// # Returns
///
/// A [`CompensationResult`], or an error if an assignment references an
/// unknown catalog code, carries a negative amount, or duplicates another
/// assignment of the same type.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::aggregate_compensation;
/// use payroll_engine::config::Catalog;
/// use payroll_engine::models::{
///     AllowanceRule, AllowanceType, Employee, EmployeeAllowance, EmploymentType, TaxTreatment,
/// };
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let catalog = Catalog::new(
///     vec![AllowanceType {
///         code: "responsibility".to_string(),
///         name: "Responsibility Allowance".to_string(),
///         tax_treatment: TaxTreatment::Taxable,
///         rule: AllowanceRule::PercentOfBasic { percent: Decimal::from(10) },
///     }],
///     vec![],
/// ).unwrap();
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     first_name: "Akua".to_string(),
///     last_name: "Asante".to_string(),
///     department: "History".to_string(),
///     grade: None,
///     employment_type: EmploymentType::Permanent,
///     active: true,
///     allowances: vec![EmployeeAllowance {
///         allowance_type: "responsibility".to_string(),
///         amount: Decimal::ZERO,
///         active: true,
///     }],
///     deductions: vec![],
/// };
///
/// let result = aggregate_compensation(
///     &employee,
///     Decimal::from_str("4000.00").unwrap(),
///     &catalog,
///     1,
/// ).unwrap();
///
/// assert_eq!(result.lines[1].amount, Decimal::from_str("400.00").unwrap());
/// assert_eq!(result.gross_pay, Decimal::from_str("4400.00").unwrap());
/// ```
pub fn aggregate_compensation(
    employee: &Employee,
    basic_salary: Decimal,
    catalog: &Catalog,
    step_number_start: u32,
) -> EngineResult<CompensationResult> {
    validate_assignments(employee)?;

    let basic = round_money(basic_salary);
    let mut gross_pay = basic;
    let mut non_taxable_earnings = Decimal::ZERO;
    let mut lines = vec![PayslipLine::new(
        LineKind::Earning,
        LineComponent::Basic,
        "basic",
        "Basic Salary",
        basic,
    )];

    let mut allowance_items = Vec::new();
    for assignment in employee.active_allowances() {
        let allowance = catalog
            .allowance_type(&assignment.allowance_type)
            .ok_or_else(|| EngineError::UnknownAllowanceType {
                employee_id: employee.id.clone(),
                code: assignment.allowance_type.clone(),
            })?;

        let amount = match allowance.rule {
            AllowanceRule::FixedAmount => round_money(assignment.amount),
            AllowanceRule::PercentOfBasic { percent } => {
                round_money(basic * percent / Decimal::ONE_HUNDRED)
            }
        };

        gross_pay += amount;
        if allowance.tax_treatment == TaxTreatment::NonTaxable {
            non_taxable_earnings += amount;
        }

        allowance_items.push(serde_json::json!({
            "code": allowance.code,
            "rule": allowance.rule,
            "tax_treatment": allowance.tax_treatment,
            "amount": amount.to_string()
        }));
        lines.push(PayslipLine::new(
            LineKind::Earning,
            LineComponent::Allowance,
            allowance.code.clone(),
            allowance.name.clone(),
            amount,
        ));
    }

    let mut pre_tax_deductions = Decimal::ZERO;
    let mut post_tax_deductions = Decimal::ZERO;
    let mut deduction_items = Vec::new();
    for assignment in employee.active_deductions() {
        let deduction = catalog
            .deduction_type(&assignment.deduction_type)
            .ok_or_else(|| EngineError::UnknownDeductionType {
                employee_id: employee.id.clone(),
                code: assignment.deduction_type.clone(),
            })?;

        let amount = round_money(assignment.amount);
        let (kind, component) = match deduction.timing {
            DeductionTiming::PreTax => {
                pre_tax_deductions += amount;
                (LineKind::PreTaxRelief, LineComponent::PreTaxDeduction)
            }
            DeductionTiming::PostTax => {
                post_tax_deductions += amount;
                (LineKind::Deduction, LineComponent::PostTaxDeduction)
            }
        };

        deduction_items.push(serde_json::json!({
            "code": deduction.code,
            "timing": deduction.timing,
            "amount": amount.to_string()
        }));
        lines.push(PayslipLine::new(
            kind,
            component,
            deduction.code.clone(),
            deduction.name.clone(),
            amount,
        ));
    }

    let audit_steps = vec![
        AuditStep {
            step_number: step_number_start,
            rule_id: "allowance_aggregation".to_string(),
            rule_name: "Allowance Aggregation".to_string(),
            input: serde_json::json!({
                "basic_salary": basic.to_string(),
                "allowances": allowance_items
            }),
            output: serde_json::json!({
                "gross_pay": gross_pay.to_string(),
                "non_taxable_earnings": non_taxable_earnings.to_string()
            }),
            reasoning: format!(
                "Basic {} plus {} allowance(s) gives gross {}, of which {} is non-taxable",
                basic,
                allowance_items.len(),
                gross_pay,
                non_taxable_earnings
            ),
        },
        AuditStep {
            step_number: step_number_start + 1,
            rule_id: "deduction_aggregation".to_string(),
            rule_name: "Deduction Aggregation".to_string(),
            input: serde_json::json!({ "deductions": deduction_items }),
            output: serde_json::json!({
                "pre_tax_deductions": pre_tax_deductions.to_string(),
                "post_tax_deductions": post_tax_deductions.to_string()
            }),
            reasoning: format!(
                "{} deduction(s): {} pre-tax, {} post-tax",
                deduction_items.len(),
                pre_tax_deductions,
                post_tax_deductions
            ),
        },
    ];

    Ok(CompensationResult {
        basic_salary: basic,
        gross_pay,
        non_taxable_earnings,
        pre_tax_deductions,
        post_tax_deductions,
        lines,
        audit_steps,
    })
}

/// Rejects amounts outside the money range and duplicate assignments of the
/// same type.
fn validate_assignments(employee: &Employee) -> EngineResult<()> {
    let invalid = |field: &str, message: String| EngineError::InvalidEmployee {
        employee_id: employee.id.clone(),
        field: field.to_string(),
        message,
    };

    let mut seen = HashSet::new();
    for assignment in &employee.allowances {
        if assignment.amount < Decimal::ZERO {
            return Err(invalid(
                "allowances",
                format!(
                    "amount {} for '{}' is negative",
                    assignment.amount, assignment.allowance_type
                ),
            ));
        }
        if !is_valid_money_amount(assignment.amount) {
            return Err(invalid(
                "allowances",
                format!(
                    "amount {} for '{}' exceeds the maximum of {}",
                    assignment.amount,
                    assignment.allowance_type,
                    max_money_amount()
                ),
            ));
        }
        if !seen.insert(assignment.allowance_type.as_str()) {
            return Err(invalid(
                "allowances",
                format!("'{}' is assigned more than once", assignment.allowance_type),
            ));
        }
    }

    let mut seen = HashSet::new();
    for assignment in &employee.deductions {
        if assignment.amount < Decimal::ZERO {
            return Err(invalid(
                "deductions",
                format!(
                    "amount {} for '{}' is negative",
                    assignment.amount, assignment.deduction_type
                ),
            ));
        }
        if !is_valid_money_amount(assignment.amount) {
            return Err(invalid(
                "deductions",
                format!(
                    "amount {} for '{}' exceeds the maximum of {}",
                    assignment.amount,
                    assignment.deduction_type,
                    max_money_amount()
                ),
            ));
        }
        if !seen.insert(assignment.deduction_type.as_str()) {
            return Err(invalid(
                "deductions",
                format!("'{}' is assigned more than once", assignment.deduction_type),
            ));
        }
    }

    Ok(())
}
