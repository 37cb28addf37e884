//! Basic salary lookup.
//!
//! An employee's basic salary comes from the grade step they are placed on.
//! The value is captured on the payslip, so later changes to the salary scale
//! never alter an existing payslip.

use crate::config::GradeTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, Employee, GradeStep};

/// The result of a basic salary lookup.
#[derive(Debug, Clone)]
pub struct BasicSalaryLookupResult {
    /// The grade step the salary came from.
    pub grade_step: GradeStep,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

/// Looks up the basic salary for an employee's grade step.
///
/// # Returns
///
/// Returns the matched [`GradeStep`] and an audit step, or an error if:
/// - The employee has no grade reference (`MissingGradeStep`)
/// - The grade reference is not in the salary scale (`GradeStepNotFound`)
pub fn lookup_basic_salary(
    employee: &Employee,
    grades: &GradeTable,
    step_number: u32,
) -> EngineResult<BasicSalaryLookupResult> {
    let grade = employee
        .grade
        .as_ref()
        .ok_or_else(|| EngineError::MissingGradeStep {
            employee_id: employee.id.clone(),
        })?;

    let grade_step = grades
        .get(&grade.grade_code, grade.step)
        .ok_or_else(|| EngineError::GradeStepNotFound {
            employee_id: employee.id.clone(),
            grade_code: grade.grade_code.clone(),
            step: grade.step,
        })?
        .clone();

    let audit_step = AuditStep {
        step_number,
        rule_id: "basic_salary_lookup".to_string(),
        rule_name: "Basic Salary Lookup".to_string(),
        input: serde_json::json!({
            "employee_id": employee.id,
            "grade_code": grade.grade_code,
            "step": grade.step
        }),
        output: serde_json::json!({
            "title": grade_step.title,
            "basic_salary": grade_step.basic_salary.to_string()
        }),
        reasoning: format!(
            "Grade {}-{} ({}) pays basic salary {}",
            grade_step.grade_code, grade_step.step, grade_step.title, grade_step.basic_salary
        ),
    };

    Ok(BasicSalaryLookupResult {
        grade_step,
        audit_step,
    })
}
