//! Persistence boundary for payroll runs.
//!
//! The engine talks to storage only through [`PayrollStore`]. Each method is
//! its own critical section; [`PayrollStore::commit_payslip`] is the single
//! per-employee transaction of a run and enforces one payslip per
//! (run, employee).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, PayrollPeriod, PayrollRun, Payslip, PeriodKey, RunResult, RunStatus,
};

/// Narrows a payslip listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipFilter {
    /// Only payslips from this run.
    #[serde(default)]
    pub run_id: Option<Uuid>,
    /// Only payslips for this employee.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Only payslips whose department matches, case-insensitively.
    #[serde(default)]
    pub department: Option<String>,
}

impl PayslipFilter {
    /// All payslips of one run.
    pub fn for_run(run_id: Uuid) -> Self {
        Self {
            run_id: Some(run_id),
            ..Self::default()
        }
    }

    fn matches(&self, payslip: &Payslip) -> bool {
        self.run_id.is_none_or(|id| payslip.run_id == id)
            && self
                .employee_id
                .as_deref()
                .is_none_or(|id| payslip.employee_id == id)
            && self
                .department
                .as_deref()
                .is_none_or(|dept| payslip.department.eq_ignore_ascii_case(dept))
    }
}

/// Narrows a roster listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFilter {
    /// Case-insensitive substring of the employee's full name.
    #[serde(default)]
    pub name: Option<String>,
    /// Department, matched case-insensitively.
    #[serde(default)]
    pub department: Option<String>,
    /// Only active or only inactive employees.
    #[serde(default)]
    pub active: Option<bool>,
}

impl EmployeeFilter {
    /// Whether an employee passes the filter.
    pub fn matches(&self, employee: &Employee) -> bool {
        self.name.as_deref().is_none_or(|name| {
            employee
                .full_name()
                .to_lowercase()
                .contains(&name.to_lowercase())
        }) && self
            .department
            .as_deref()
            .is_none_or(|dept| employee.department.eq_ignore_ascii_case(dept))
            && self.active.is_none_or(|active| employee.active == active)
    }
}

/// Storage for the roster, periods, runs and payslips.
///
/// Implementations must make [`commit_payslip`](PayrollStore::commit_payslip)
/// atomic: either the payslip with all its lines is stored, or nothing is.
pub trait PayrollStore: Send + Sync {
    /// The full roster, in roster order.
    fn employees(&self) -> EngineResult<Vec<Employee>>;

    /// One employee by id.
    fn employee(&self, employee_id: &str) -> EngineResult<Option<Employee>>;

    /// Sets an employee's active flag.
    ///
    /// # Errors
    ///
    /// `EmployeeNotFound` if the id is not on the roster.
    fn set_employee_active(&self, employee_id: &str, active: bool) -> EngineResult<()>;

    /// A period by key, without opening it.
    fn period(&self, key: PeriodKey) -> EngineResult<Option<PayrollPeriod>>;

    /// Returns the period, opening it if it does not exist yet.
    fn open_period(&self, key: PeriodKey) -> EngineResult<PayrollPeriod>;

    /// Marks a period closed, opening it first if needed.
    fn close_period(&self, key: PeriodKey) -> EngineResult<PayrollPeriod>;

    /// All periods, most recent first.
    fn periods(&self) -> EngineResult<Vec<PayrollPeriod>>;

    /// Stores a new run.
    fn create_run(&self, run: &PayrollRun) -> EngineResult<()>;

    /// A run by id.
    fn run(&self, run_id: Uuid) -> EngineResult<Option<PayrollRun>>;

    /// All runs, most recent first.
    fn runs(&self) -> EngineResult<Vec<PayrollRun>>;

    /// Moves a run to a new status.
    ///
    /// # Errors
    ///
    /// - `RunNotFound` if the run does not exist
    /// - `InvalidStatusTransition` unless the move is draft→approved or approved→paid
    fn update_run_status(&self, run_id: Uuid, status: RunStatus) -> EngineResult<PayrollRun>;

    /// Stores a payslip and its lines as one unit.
    ///
    /// # Errors
    ///
    /// - `RunNotFound` if the payslip's run does not exist
    /// - `DuplicatePayslip` if the run already has a payslip for the employee
    fn commit_payslip(&self, payslip: Payslip) -> EngineResult<()>;

    /// Payslips matching a filter, in commit order.
    fn payslips(&self, filter: &PayslipFilter) -> EngineResult<Vec<Payslip>>;

    /// A payslip by id.
    fn payslip(&self, payslip_id: Uuid) -> EngineResult<Option<Payslip>>;

    /// Stores the summary of a finished run.
    fn save_run_result(&self, result: &RunResult) -> EngineResult<()>;

    /// The summary of a run, once it has finished.
    fn run_result(&self, run_id: Uuid) -> EngineResult<Option<RunResult>>;
}

#[derive(Debug, Default)]
struct StoreState {
    employees: Vec<Employee>,
    periods: BTreeMap<PeriodKey, PayrollPeriod>,
    runs: Vec<PayrollRun>,
    payslips: Vec<Payslip>,
    payslip_keys: HashSet<(Uuid, String)>,
    results: HashMap<Uuid, RunResult>,
}

/// A [`PayrollStore`] held in process memory.
///
/// # Example
///
/// ```
/// use payroll_engine::engine::{InMemoryStore, PayrollStore};
/// use payroll_engine::models::PeriodKey;
///
/// let store = InMemoryStore::new(vec![]);
/// let key = PeriodKey::new(2025, 8).unwrap();
///
/// let period = store.open_period(key).unwrap();
/// assert!(!period.closed);
/// assert!(store.close_period(key).unwrap().closed);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates a store seeded with a roster.
    pub fn new(employees: Vec<Employee>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                employees,
                ..StoreState::default()
            }),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl PayrollStore for InMemoryStore {
    fn employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(self.read(|s| s.employees.clone()))
    }

    fn employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.read(|s| s.employees.iter().find(|e| e.id == employee_id).cloned()))
    }

    fn set_employee_active(&self, employee_id: &str, active: bool) -> EngineResult<()> {
        self.write(|s| {
            let employee = s
                .employees
                .iter_mut()
                .find(|e| e.id == employee_id)
                .ok_or_else(|| EngineError::EmployeeNotFound {
                    employee_id: employee_id.to_string(),
                })?;
            employee.active = active;
            Ok(())
        })
    }

    fn period(&self, key: PeriodKey) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self.read(|s| s.periods.get(&key).cloned()))
    }

    fn open_period(&self, key: PeriodKey) -> EngineResult<PayrollPeriod> {
        Ok(self.write(|s| {
            s.periods
                .entry(key)
                .or_insert_with(|| PayrollPeriod::open(key))
                .clone()
        }))
    }

    fn close_period(&self, key: PeriodKey) -> EngineResult<PayrollPeriod> {
        Ok(self.write(|s| {
            let period = s
                .periods
                .entry(key)
                .or_insert_with(|| PayrollPeriod::open(key));
            period.closed = true;
            period.clone()
        }))
    }

    fn periods(&self) -> EngineResult<Vec<PayrollPeriod>> {
        Ok(self.read(|s| s.periods.values().rev().cloned().collect()))
    }

    fn create_run(&self, run: &PayrollRun) -> EngineResult<()> {
        self.write(|s| s.runs.push(run.clone()));
        Ok(())
    }

    fn run(&self, run_id: Uuid) -> EngineResult<Option<PayrollRun>> {
        Ok(self.read(|s| s.runs.iter().find(|r| r.id == run_id).cloned()))
    }

    fn runs(&self) -> EngineResult<Vec<PayrollRun>> {
        Ok(self.read(|s| s.runs.iter().rev().cloned().collect()))
    }

    fn update_run_status(&self, run_id: Uuid, status: RunStatus) -> EngineResult<PayrollRun> {
        self.write(|s| {
            let run = s
                .runs
                .iter_mut()
                .find(|r| r.id == run_id)
                .ok_or(EngineError::RunNotFound { run_id })?;
            run.transition(status)?;
            Ok(run.clone())
        })
    }

    fn commit_payslip(&self, payslip: Payslip) -> EngineResult<()> {
        self.write(|s| {
            if !s.runs.iter().any(|r| r.id == payslip.run_id) {
                return Err(EngineError::RunNotFound {
                    run_id: payslip.run_id,
                });
            }
            let key = (payslip.run_id, payslip.employee_id.clone());
            if !s.payslip_keys.insert(key) {
                return Err(EngineError::DuplicatePayslip {
                    run_id: payslip.run_id,
                    employee_id: payslip.employee_id,
                });
            }
            s.payslips.push(payslip);
            Ok(())
        })
    }

    fn payslips(&self, filter: &PayslipFilter) -> EngineResult<Vec<Payslip>> {
        Ok(self.read(|s| {
            s.payslips
                .iter()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect()
        }))
    }

    fn payslip(&self, payslip_id: Uuid) -> EngineResult<Option<Payslip>> {
        Ok(self.read(|s| s.payslips.iter().find(|p| p.id == payslip_id).cloned()))
    }

    fn save_run_result(&self, result: &RunResult) -> EngineResult<()> {
        self.write(|s| s.results.insert(result.run_id, result.clone()));
        Ok(())
    }

    fn run_result(&self, run_id: Uuid) -> EngineResult<Option<RunResult>> {
        Ok(self.read(|s| s.results.get(&run_id).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuditTrace, EmploymentType, PayComputation};
    use rust_decimal::Decimal;

    fn key() -> PeriodKey {
        PeriodKey::new(2025, 8).unwrap()
    }

    fn create_employee(id: &str, department: &str) -> Employee {
        Employee {
            id: id.to_string(),
            first_name: "Abena".to_string(),
            last_name: "Darko".to_string(),
            department: department.to_string(),
            grade: None,
            employment_type: EmploymentType::Permanent,
            active: true,
            allowances: vec![],
            deductions: vec![],
        }
    }

    fn create_payslip(run_id: Uuid, employee_id: &str, department: &str) -> Payslip {
        PayComputation {
            employee_id: employee_id.to_string(),
            employee_name: "Abena Darko".to_string(),
            department: department.to_string(),
            period: key(),
            grade_code: "L".to_string(),
            step: 1,
            basic_salary: Decimal::new(500000, 2),
            gross_pay: Decimal::new(500000, 2),
            non_taxable_earnings: Decimal::ZERO,
            pre_tax_deductions: Decimal::ZERO,
            taxable_income: Decimal::new(500000, 2),
            tax: Decimal::ZERO,
            statutory_employee: Decimal::ZERO,
            statutory_employer: Decimal::ZERO,
            post_tax_deductions: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            net_pay: Decimal::new(500000, 2),
            lines: vec![],
            audit_trace: AuditTrace::default(),
        }
        .into_payslip(run_id)
    }

    fn store_with_run() -> (InMemoryStore, PayrollRun) {
        let store = InMemoryStore::new(vec![
            create_employee("emp_001", "Finance"),
            create_employee("emp_002", "Physics"),
        ]);
        let run = PayrollRun::new(key(), key().start_date(), "officer");
        store.create_run(&run).unwrap();
        (store, run)
    }

    #[test]
    fn test_open_period_is_idempotent() {
        let store = InMemoryStore::default();
        let first = store.open_period(key()).unwrap();
        let second = store.open_period(key()).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.periods().unwrap().len(), 1);
    }

    #[test]
    fn test_period_lookup_does_not_open() {
        let store = InMemoryStore::default();
        assert!(store.period(key()).unwrap().is_none());
        assert!(store.periods().unwrap().is_empty());

        store.close_period(key()).unwrap();
        assert!(store.period(key()).unwrap().unwrap().closed);
    }

    #[test]
    fn test_periods_most_recent_first() {
        let store = InMemoryStore::default();
        store.open_period(PeriodKey::new(2025, 1).unwrap()).unwrap();
        store.open_period(PeriodKey::new(2025, 3).unwrap()).unwrap();
        store.open_period(PeriodKey::new(2024, 12).unwrap()).unwrap();

        let months: Vec<String> = store
            .periods()
            .unwrap()
            .iter()
            .map(|p| p.key.to_string())
            .collect();
        assert_eq!(months, vec!["2025-03", "2025-01", "2024-12"]);
    }

    #[test]
    fn test_commit_rejects_duplicate_employee_in_run() {
        let (store, run) = store_with_run();
        store
            .commit_payslip(create_payslip(run.id, "emp_001", "Finance"))
            .unwrap();

        let result = store.commit_payslip(create_payslip(run.id, "emp_001", "Finance"));

        match result {
            Err(EngineError::DuplicatePayslip { employee_id, .. }) => {
                assert_eq!(employee_id, "emp_001");
            }
            other => panic!("Expected DuplicatePayslip, got {:?}", other),
        }
        assert_eq!(store.payslips(&PayslipFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_same_employee_allowed_in_different_runs() {
        let (store, run) = store_with_run();
        let second = PayrollRun::new(key(), key().start_date(), "officer");
        store.create_run(&second).unwrap();

        store
            .commit_payslip(create_payslip(run.id, "emp_001", "Finance"))
            .unwrap();
        store
            .commit_payslip(create_payslip(second.id, "emp_001", "Finance"))
            .unwrap();

        assert_eq!(
            store
                .payslips(&PayslipFilter::for_run(second.id))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_commit_requires_existing_run() {
        let store = InMemoryStore::default();
        let result = store.commit_payslip(create_payslip(Uuid::new_v4(), "emp_001", "Finance"));
        assert!(matches!(result, Err(EngineError::RunNotFound { .. })));
    }

    #[test]
    fn test_payslip_filter_by_department_ignores_case() {
        let (store, run) = store_with_run();
        store
            .commit_payslip(create_payslip(run.id, "emp_001", "Finance"))
            .unwrap();
        store
            .commit_payslip(create_payslip(run.id, "emp_002", "Physics"))
            .unwrap();

        let filter = PayslipFilter {
            department: Some("finance".to_string()),
            ..PayslipFilter::default()
        };
        let payslips = store.payslips(&filter).unwrap();

        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0].employee_id, "emp_001");
    }

    #[test]
    fn test_update_run_status_follows_lifecycle() {
        let (store, run) = store_with_run();

        let approved = store.update_run_status(run.id, RunStatus::Approved).unwrap();
        assert_eq!(approved.status, RunStatus::Approved);

        let result = store.update_run_status(run.id, RunStatus::Draft);
        assert!(matches!(
            result,
            Err(EngineError::InvalidStatusTransition { .. })
        ));
        assert_eq!(
            store.run(run.id).unwrap().unwrap().status,
            RunStatus::Approved
        );
    }

    #[test]
    fn test_update_unknown_run_is_not_found() {
        let store = InMemoryStore::default();
        let result = store.update_run_status(Uuid::new_v4(), RunStatus::Approved);
        assert!(matches!(result, Err(EngineError::RunNotFound { .. })));
    }

    #[test]
    fn test_employee_filter_by_name_and_department() {
        let employee = create_employee("emp_001", "Finance");

        let by_name = EmployeeFilter {
            name: Some("darko".to_string()),
            ..EmployeeFilter::default()
        };
        assert!(by_name.matches(&employee));

        let by_department = EmployeeFilter {
            department: Some("Physics".to_string()),
            ..EmployeeFilter::default()
        };
        assert!(!by_department.matches(&employee));

        let inactive_only = EmployeeFilter {
            active: Some(false),
            ..EmployeeFilter::default()
        };
        assert!(!inactive_only.matches(&employee));
    }

    #[test]
    fn test_set_employee_active() {
        let (store, _) = store_with_run();
        store.set_employee_active("emp_002", false).unwrap();

        assert!(!store.employee("emp_002").unwrap().unwrap().active);
        assert!(matches!(
            store.set_employee_active("emp_404", false),
            Err(EngineError::EmployeeNotFound { .. })
        ));
    }
}
