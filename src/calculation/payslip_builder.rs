//! Single-employee pay computation.
//!
//! Chains the calculation steps for one employee and one period into a
//! [`PayComputation`]. The function is pure: it reads configuration and a
//! [`RateSnapshot`] and never touches storage, so a run may compute many
//! employees concurrently.
//!
//! ## Order of Operations
//!
//! 1. Basic salary from the grade step
//! 2. Allowances and catalog deductions
//! 3. Statutory contributions (employee, then employer)
//! 4. Taxable income
//! 5. Progressive tax
//! 6. Net pay

use rust_decimal::Decimal;

use super::aggregation::aggregate_compensation;
use super::basic_salary::lookup_basic_salary;
use super::progressive_tax::calculate_progressive_tax;
use super::rate_resolver::RateSnapshot;
use super::statutory::calculate_statutory_contribution;
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, Employee, LineComponent, LineKind, PayComputation,
    PayslipLine, PeriodKey,
};

/// Computes one employee's pay for a period.
///
/// # Arguments
///
/// * `employee` - The employee to compute
/// * `config` - Salary scale, catalogs and settings
/// * `rates` - Rates resolved for the run
/// * `period` - The period being paid
///
/// # Returns
///
/// The [`PayComputation`], or the first validation or configuration error
/// met for this employee.
///
/// # Examples
///
/// ```no_run
/// use payroll_engine::calculation::{compute_payslip, RateSnapshot};
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::PeriodKey;
///
/// let loader = ConfigLoader::load("./config/demo").unwrap();
/// let period = PeriodKey::new(2025, 8).unwrap();
/// let rates = RateSnapshot::resolve(
///     loader.config().rates(),
///     period.start_date(),
///     period.year,
/// ).unwrap();
///
/// let computation = compute_payslip(&loader.employees()[0], loader.config(), &rates, period)
///     .unwrap();
/// println!("Net pay: {}", computation.net_pay);
/// ```
pub fn compute_payslip(
    employee: &Employee,
    config: &PayrollConfig,
    rates: &RateSnapshot,
    period: PeriodKey,
) -> EngineResult<PayComputation> {
    if rates.brackets.year() != period.year {
        return Err(EngineError::CalculationError {
            message: format!(
                "rates resolved for {} cannot be used for period {}",
                rates.brackets.year(),
                period
            ),
        });
    }

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = rates.warnings.clone();

    if !employee.active {
        warnings.push(AuditWarning {
            code: "EMPLOYEE_INACTIVE".to_string(),
            message: format!(
                "Employee '{}' is inactive and would be skipped by a payroll run",
                employee.id
            ),
            severity: "medium".to_string(),
        });
    }

    let salary = lookup_basic_salary(employee, config.grades(), next_step(&steps))?;
    steps.push(salary.audit_step);
    let grade_step = salary.grade_step;

    let compensation = aggregate_compensation(
        employee,
        grade_step.basic_salary,
        config.catalog(),
        next_step(&steps),
    )?;
    steps.extend(compensation.audit_steps);
    let mut lines = compensation.lines;
    let gross_pay = compensation.gross_pay;

    let employee_statutory = calculate_statutory_contribution(
        &rates.employee_statutory,
        compensation.basic_salary,
        gross_pay,
        next_step(&steps),
    );
    steps.push(employee_statutory.audit_step);

    let employer_statutory = calculate_statutory_contribution(
        &rates.employer_statutory,
        compensation.basic_salary,
        gross_pay,
        next_step(&steps),
    );
    steps.push(employer_statutory.audit_step);

    let statutory_pre_tax = config.settings().statutory_pre_tax;
    let statutory_relief = if statutory_pre_tax {
        employee_statutory.amount
    } else {
        Decimal::ZERO
    };
    let taxable_income = gross_pay
        - compensation.non_taxable_earnings
        - compensation.pre_tax_deductions
        - statutory_relief;

    steps.push(AuditStep {
        step_number: next_step(&steps),
        rule_id: "taxable_income".to_string(),
        rule_name: "Taxable Income".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "non_taxable_earnings": compensation.non_taxable_earnings.to_string(),
            "pre_tax_deductions": compensation.pre_tax_deductions.to_string(),
            "statutory_employee": employee_statutory.amount.to_string(),
            "statutory_pre_tax": statutory_pre_tax
        }),
        output: serde_json::json!({
            "taxable_income": taxable_income.to_string()
        }),
        reasoning: format!(
            "Gross {} less non-taxable {} less pre-tax deductions {} less statutory relief {} = {}",
            gross_pay,
            compensation.non_taxable_earnings,
            compensation.pre_tax_deductions,
            statutory_relief,
            taxable_income
        ),
    });

    let tax = calculate_progressive_tax(taxable_income, &rates.brackets, next_step(&steps));
    steps.push(tax.audit_step);

    let total_deductions = tax.tax + employee_statutory.amount + compensation.post_tax_deductions;
    let net_pay = gross_pay - total_deductions;

    steps.push(AuditStep {
        step_number: next_step(&steps),
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "tax": tax.tax.to_string(),
            "statutory_employee": employee_statutory.amount.to_string(),
            "post_tax_deductions": compensation.post_tax_deductions.to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.to_string(),
            "net_pay": net_pay.to_string()
        }),
        reasoning: format!(
            "Gross {} less deductions {} = net {}",
            gross_pay, total_deductions, net_pay
        ),
    });

    if net_pay < Decimal::ZERO {
        warnings.push(AuditWarning {
            code: "NEGATIVE_NET_PAY".to_string(),
            message: format!(
                "Deductions {} exceed gross pay {} for employee '{}'",
                total_deductions, gross_pay, employee.id
            ),
            severity: "high".to_string(),
        });
    }

    lines.push(PayslipLine::new(
        LineKind::Deduction,
        LineComponent::Statutory,
        "statutory_employee",
        rates
            .employee_statutory
            .name
            .clone()
            .unwrap_or_else(|| "Statutory Contribution (Employee)".to_string()),
        employee_statutory.amount,
    ));
    lines.push(PayslipLine::new(
        LineKind::Deduction,
        LineComponent::Tax,
        "income_tax",
        "Income Tax",
        tax.tax,
    ));
    lines.push(PayslipLine::new(
        LineKind::EmployerContribution,
        LineComponent::Statutory,
        "statutory_employer",
        rates
            .employer_statutory
            .name
            .clone()
            .unwrap_or_else(|| "Statutory Contribution (Employer)".to_string()),
        employer_statutory.amount,
    ));

    Ok(PayComputation {
        employee_id: employee.id.clone(),
        employee_name: employee.full_name(),
        department: employee.department.clone(),
        period,
        grade_code: grade_step.grade_code,
        step: grade_step.step,
        basic_salary: compensation.basic_salary,
        gross_pay,
        non_taxable_earnings: compensation.non_taxable_earnings,
        pre_tax_deductions: compensation.pre_tax_deductions,
        taxable_income,
        tax: tax.tax,
        statutory_employee: employee_statutory.amount,
        statutory_employer: employer_statutory.amount,
        post_tax_deductions: compensation.post_tax_deductions,
        total_deductions,
        net_pay,
        lines,
        audit_trace: AuditTrace { steps, warnings },
    })
}

fn next_step(steps: &[AuditStep]) -> u32 {
    steps.len() as u32 + 1
}
