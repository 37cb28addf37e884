//! Employee model and related types.
//!
//! This module defines the Employee struct, its grade reference and its
//! allowance and deduction assignments.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the type of employment arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Permanent staff on the salary scale.
    Permanent,
    /// Fixed-term contract staff.
    Contract,
    /// Adjunct or sessional staff.
    Adjunct,
}

/// A reference into the grade table (e.g. grade "SL", step 3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradeRef {
    /// The grade code.
    pub grade_code: String,
    /// The step within the grade.
    pub step: u32,
}

/// Links an employee to an allowance type in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeAllowance {
    /// The catalog code of the allowance type.
    pub allowance_type: String,
    /// The amount paid when the catalog rule is a fixed amount.
    #[serde(default)]
    pub amount: Decimal,
    /// Whether the assignment is currently in effect.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Links an employee to a deduction type in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDeduction {
    /// The catalog code of the deduction type.
    pub deduction_type: String,
    /// The amount withheld.
    pub amount: Decimal,
    /// Whether the assignment is currently in effect.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Represents an employee on the payroll roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The department the employee belongs to.
    pub department: String,
    /// The employee's position on the salary scale.
    #[serde(default)]
    pub grade: Option<GradeRef>,
    /// The type of employment arrangement.
    pub employment_type: EmploymentType,
    /// Inactive employees are excluded from payroll runs.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Allowance assignments.
    #[serde(default)]
    pub allowances: Vec<EmployeeAllowance>,
    /// Deduction assignments.
    #[serde(default)]
    pub deductions: Vec<EmployeeDeduction>,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Returns the employee's display name.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, EmploymentType};
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     first_name: "Ama".to_string(),
    ///     last_name: "Mensah".to_string(),
    ///     department: "Finance".to_string(),
    ///     grade: None,
    ///     employment_type: EmploymentType::Permanent,
    ///     active: true,
    ///     allowances: vec![],
    ///     deductions: vec![],
    /// };
    /// assert_eq!(employee.full_name(), "Ama Mensah");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the allowance assignments that are in effect.
    pub fn active_allowances(&self) -> impl Iterator<Item = &EmployeeAllowance> {
        self.allowances.iter().filter(|a| a.active)
    }

    /// Returns the deduction assignments that are in effect.
    pub fn active_deductions(&self) -> impl Iterator<Item = &EmployeeDeduction> {
        self.deductions.iter().filter(|d| d.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_employee() -> Employee {
        Employee {
            id: "emp_001".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            department: "Engineering".to_string(),
            grade: Some(GradeRef {
                grade_code: "L".to_string(),
                step: 1,
            }),
            employment_type: EmploymentType::Permanent,
            active: true,
            allowances: vec![],
            deductions: vec![],
        }
    }

    #[test]
    fn test_deserialize_employee_with_defaults() {
        let json = r#"{
            "id": "emp_001",
            "first_name": "John",
            "last_name": "Doe",
            "department": "Engineering",
            "grade": { "grade_code": "L", "step": 1 },
            "employment_type": "permanent"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert!(employee.active);
        assert!(employee.allowances.is_empty());
        assert!(employee.deductions.is_empty());
        assert_eq!(employee.grade.unwrap().step, 1);
    }

    #[test]
    fn test_deserialize_employee_without_grade() {
        let json = r#"{
            "id": "emp_002",
            "first_name": "Jane",
            "last_name": "Roe",
            "department": "Registry",
            "employment_type": "contract",
            "active": false
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert!(employee.grade.is_none());
        assert!(!employee.active);
        assert_eq!(employee.employment_type, EmploymentType::Contract);
    }

    #[test]
    fn test_deserialize_assignments() {
        let json = r#"{
            "id": "emp_003",
            "first_name": "Kofi",
            "last_name": "Boateng",
            "department": "Registry",
            "employment_type": "adjunct",
            "allowances": [
                { "allowance_type": "housing", "amount": "1000.00" },
                { "allowance_type": "transport", "amount": "200.00", "active": false }
            ],
            "deductions": [
                { "deduction_type": "loan", "amount": "150.00" }
            ]
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.allowances.len(), 2);
        assert_eq!(employee.allowances[0].amount, Decimal::new(100000, 2));
        assert!(employee.allowances[0].active);
        assert!(!employee.allowances[1].active);
        assert_eq!(employee.deductions[0].amount, Decimal::new(15000, 2));
    }

    #[test]
    fn test_active_assignments_filter_inactive() {
        let mut employee = create_test_employee();
        employee.allowances = vec![
            EmployeeAllowance {
                allowance_type: "housing".to_string(),
                amount: Decimal::new(1000, 0),
                active: true,
            },
            EmployeeAllowance {
                allowance_type: "transport".to_string(),
                amount: Decimal::new(200, 0),
                active: false,
            },
        ];
        employee.deductions = vec![EmployeeDeduction {
            deduction_type: "loan".to_string(),
            amount: Decimal::new(50, 0),
            active: false,
        }];

        let allowances: Vec<_> = employee.active_allowances().collect();
        assert_eq!(allowances.len(), 1);
        assert_eq!(allowances[0].allowance_type, "housing");
        assert_eq!(employee.active_deductions().count(), 0);
    }

    #[test]
    fn test_full_name() {
        assert_eq!(create_test_employee().full_name(), "John Doe");
    }

    #[test]
    fn test_employment_type_serialization() {
        assert_eq!(
            serde_json::to_string(&EmploymentType::Permanent).unwrap(),
            "\"permanent\""
        );
        assert_eq!(
            serde_json::to_string(&EmploymentType::Adjunct).unwrap(),
            "\"adjunct\""
        );
    }
}
