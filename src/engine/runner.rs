//! The payroll run orchestrator.
//!
//! [`PayrollEngine`] drives a run over one period: it takes the period lock,
//! resolves rates once, snapshots the roster, computes employees in bounded
//! parallel chunks on the blocking pool and commits each payslip as its own
//! transaction, in roster order.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::cancel::CancelHandle;
use super::store::{EmployeeFilter, PayrollStore, PayslipFilter};
use crate::calculation::{RateSnapshot, compute_payslip};
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, PayComputation, PayrollPeriod, PayrollRun, Payslip, PeriodKey, RunOutcome,
    RunResult, RunStatus, SkippedEmployee,
};

/// Who a run is attributed to when the caller does not say.
pub const DEFAULT_CREATED_BY: &str = "system";

/// Options for a single payroll run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// The date statutory rates are resolved at; defaults to the period start.
    pub reference_date: Option<NaiveDate>,
    /// Who started the run.
    pub created_by: String,
    /// Lets the caller stop the run between employees.
    pub cancel: Option<CancelHandle>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            reference_date: None,
            created_by: DEFAULT_CREATED_BY.to_string(),
            cancel: None,
        }
    }
}

/// Headline counts for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Employees on the roster.
    pub total_employees: usize,
    /// Employees that would be included in a run.
    pub active_employees: usize,
    /// Distinct departments on the roster.
    pub departments: usize,
    /// Periods opened so far.
    pub total_periods: usize,
    /// Periods closed so far.
    pub closed_periods: usize,
    /// Runs executed so far.
    pub total_runs: usize,
    /// Payslips committed so far.
    pub total_payslips: usize,
    /// The most recently created run.
    pub latest_run: Option<PayrollRun>,
}

/// Removes a period from the in-flight set when dropped.
struct PeriodGuard<'a> {
    in_flight: &'a Mutex<HashSet<PeriodKey>>,
    period: PeriodKey,
}

impl Drop for PeriodGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.period);
    }
}

/// Runs payroll periods against a store.
///
/// Configuration is shared read-only with every worker; the store is the only
/// mutable state.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::engine::{InMemoryStore, PayrollEngine, RunOptions};
/// use payroll_engine::models::PeriodKey;
///
/// # async fn example() -> Result<(), payroll_engine::error::EngineError> {
/// let (config, employees) = ConfigLoader::load("./config/demo")?.into_parts();
/// let engine = PayrollEngine::new(Arc::new(config), Arc::new(InMemoryStore::new(employees)));
///
/// let outcome = engine
///     .run_period(PeriodKey::new(2025, 8)?, RunOptions::default())
///     .await?;
/// println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
/// # Ok(())
/// # }
/// ```
pub struct PayrollEngine<S: PayrollStore> {
    config: Arc<PayrollConfig>,
    store: Arc<S>,
    in_flight: Arc<Mutex<HashSet<PeriodKey>>>,
}

impl<S: PayrollStore> Clone for PayrollEngine<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S: PayrollStore + 'static> PayrollEngine<S> {
    /// Creates an engine over a configuration and a store.
    pub fn new(config: Arc<PayrollConfig>, store: Arc<S>) -> Self {
        Self {
            config,
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock_period(&self, period: PeriodKey) -> EngineResult<PeriodGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(period) {
            return Err(EngineError::RunInProgress { period });
        }
        Ok(PeriodGuard {
            in_flight: &self.in_flight,
            period,
        })
    }

    /// Runs payroll for every active employee in a period.
    ///
    /// # Returns
    ///
    /// - `RunOutcome::Completed` with the run summary; per-employee failures
    ///   are listed in it rather than returned as errors
    /// - `RunOutcome::PeriodClosed` if the period is closed; nothing is created
    ///
    /// # Errors
    ///
    /// - `RunInProgress` if another run holds the period
    /// - `MissingTaxBrackets` if the period's year has no tax table; raised
    ///   before the period, run or any payslip is created
    /// - Errors from the store while creating the run or saving its summary
    pub async fn run_period(
        &self,
        period: PeriodKey,
        options: RunOptions,
    ) -> EngineResult<RunOutcome> {
        let _guard = self.lock_period(period)?;

        if self.store.period(period)?.is_some_and(|p| p.closed) {
            warn!(period = %period, "Payroll period is closed, no run created");
            return Ok(RunOutcome::PeriodClosed {
                period,
                warning: format!(
                    "Payroll period {} is closed; no payslips were created",
                    period
                ),
            });
        }

        let reference_date = options
            .reference_date
            .unwrap_or_else(|| period.start_date());
        if !period.contains_date(reference_date) {
            info!(
                period = %period,
                reference_date = %reference_date,
                "Reference date falls outside the period"
            );
        }
        let rates = Arc::new(RateSnapshot::resolve(
            self.config.rates(),
            reference_date,
            period.year,
        )?);

        self.store.open_period(period)?;
        let (active, inactive): (Vec<Employee>, Vec<Employee>) =
            self.store.employees()?.into_iter().partition(|e| e.active);

        let run = PayrollRun::new(period, reference_date, options.created_by);
        self.store.create_run(&run)?;

        info!(
            run_id = %run.id,
            period = %period,
            reference_date = %reference_date,
            active = active.len(),
            inactive = inactive.len(),
            "Starting payroll run"
        );

        let start_time = Instant::now();
        let mut result = RunResult::new(&run);
        result.warnings = rates.warnings.clone();
        result.skipped = inactive
            .iter()
            .map(|e| SkippedEmployee {
                employee_id: e.id.clone(),
                reason: "inactive".to_string(),
            })
            .collect();

        let cancel = options.cancel.unwrap_or_default();
        let chunk_size = self.config.settings().max_parallel.max(1);
        let mut next = 0;

        'chunks: while next < active.len() {
            if cancel.is_cancelled() {
                break;
            }

            let end = (next + chunk_size).min(active.len());
            let chunk = &active[next..end];
            let computations = self.compute_chunk(chunk, &rates, period).await;

            for (employee, computation) in chunk.iter().zip(computations) {
                next += 1;
                match computation.and_then(|c| self.commit(c, run.id)) {
                    Ok(payslip) => result.record_success(&payslip),
                    Err(err) => {
                        warn!(
                            run_id = %run.id,
                            employee_id = %employee.id,
                            error = %err,
                            "Employee payroll failed"
                        );
                        result.record_failure(employee.id.clone(), &err);
                    }
                }

                if cancel.is_cancelled() {
                    break 'chunks;
                }
            }
        }

        if next < active.len() {
            result.cancelled = true;
            result.not_attempted = active[next..].iter().map(|e| e.id.clone()).collect();
            warn!(
                run_id = %run.id,
                not_attempted = result.not_attempted.len(),
                "Payroll run cancelled"
            );
        }

        self.store.save_run_result(&result)?;

        info!(
            run_id = %run.id,
            period = %period,
            processed = result.processed_count(),
            skipped = result.skipped_count(),
            failed = result.failed_count(),
            gross_pay = %result.totals.gross_pay,
            net_pay = %result.totals.net_pay,
            duration_ms = start_time.elapsed().as_millis(),
            "Payroll run completed"
        );

        Ok(RunOutcome::Completed(result))
    }

    /// Computes a chunk of employees concurrently, preserving order.
    async fn compute_chunk(
        &self,
        chunk: &[Employee],
        rates: &Arc<RateSnapshot>,
        period: PeriodKey,
    ) -> Vec<EngineResult<PayComputation>> {
        let handles: Vec<_> = chunk
            .iter()
            .cloned()
            .map(|employee| {
                let config = Arc::clone(&self.config);
                let rates = Arc::clone(rates);
                tokio::task::spawn_blocking(move || {
                    compute_payslip(&employee, &config, &rates, period)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let computed = handle.await.unwrap_or_else(|e| {
                Err(EngineError::CalculationError {
                    message: format!("computation task failed: {}", e),
                })
            });
            results.push(computed);
        }
        results
    }

    fn commit(&self, computation: PayComputation, run_id: Uuid) -> EngineResult<Payslip> {
        let payslip = computation.into_payslip(run_id);
        self.store.commit_payslip(payslip.clone())?;
        Ok(payslip)
    }

    /// Computes one employee without persisting anything.
    ///
    /// Rates are resolved at `reference_date`, or the period start when absent.
    pub fn preview(
        &self,
        employee: &Employee,
        period: PeriodKey,
        reference_date: Option<NaiveDate>,
    ) -> EngineResult<PayComputation> {
        let as_of = reference_date.unwrap_or_else(|| period.start_date());
        let rates = RateSnapshot::resolve(self.config.rates(), as_of, period.year)?;
        compute_payslip(employee, &self.config, &rates, period)
    }

    /// Computes one roster employee without persisting anything.
    ///
    /// # Errors
    ///
    /// `EmployeeNotFound` if the id is not on the roster.
    pub fn preview_employee(
        &self,
        employee_id: &str,
        period: PeriodKey,
        reference_date: Option<NaiveDate>,
    ) -> EngineResult<PayComputation> {
        let employee = self
            .store
            .employee(employee_id)?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })?;
        self.preview(&employee, period, reference_date)
    }

    /// The roster, narrowed by a filter.
    pub fn employees(&self, filter: &EmployeeFilter) -> EngineResult<Vec<Employee>> {
        Ok(self
            .store
            .employees()?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect())
    }

    /// Activates or deactivates an employee for future runs.
    ///
    /// Existing payslips are unaffected.
    pub fn set_employee_active(&self, employee_id: &str, active: bool) -> EngineResult<Employee> {
        self.store.set_employee_active(employee_id, active)?;
        info!(employee_id = %employee_id, active, "Employee active flag changed");
        self.store
            .employee(employee_id)?
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    /// Closes a period so that no further runs are accepted.
    ///
    /// # Errors
    ///
    /// `RunInProgress` while a run holds the period.
    pub fn close_period(&self, period: PeriodKey) -> EngineResult<PayrollPeriod> {
        let _guard = self.lock_period(period)?;
        let closed = self.store.close_period(period)?;
        info!(period = %period, "Payroll period closed");
        Ok(closed)
    }

    /// Moves a run along draft → approved → paid.
    pub fn transition_run(&self, run_id: Uuid, status: RunStatus) -> EngineResult<PayrollRun> {
        let run = self.store.update_run_status(run_id, status)?;
        info!(run_id = %run_id, status = %status, "Payroll run status changed");
        Ok(run)
    }

    /// All periods, most recent first.
    pub fn periods(&self) -> EngineResult<Vec<PayrollPeriod>> {
        self.store.periods()
    }

    /// All runs, most recent first.
    pub fn runs(&self) -> EngineResult<Vec<PayrollRun>> {
        self.store.runs()
    }

    /// A run and its summary.
    ///
    /// # Errors
    ///
    /// `RunNotFound` if the run does not exist.
    pub fn run(&self, run_id: Uuid) -> EngineResult<(PayrollRun, Option<RunResult>)> {
        let run = self
            .store
            .run(run_id)?
            .ok_or(EngineError::RunNotFound { run_id })?;
        let result = self.store.run_result(run_id)?;
        Ok((run, result))
    }

    /// Payslips of a run, optionally narrowed by employee or department.
    ///
    /// # Errors
    ///
    /// `RunNotFound` if the run does not exist.
    pub fn run_payslips(
        &self,
        run_id: Uuid,
        employee_id: Option<String>,
        department: Option<String>,
    ) -> EngineResult<Vec<Payslip>> {
        if self.store.run(run_id)?.is_none() {
            return Err(EngineError::RunNotFound { run_id });
        }
        self.store.payslips(&PayslipFilter {
            run_id: Some(run_id),
            employee_id,
            department,
        })
    }

    /// A payslip by id.
    ///
    /// # Errors
    ///
    /// `PayslipNotFound` if the payslip does not exist.
    pub fn payslip(&self, payslip_id: Uuid) -> EngineResult<Payslip> {
        self.store
            .payslip(payslip_id)?
            .ok_or(EngineError::PayslipNotFound { payslip_id })
    }

    /// Headline counts across the roster, periods, runs and payslips.
    pub fn dashboard(&self) -> EngineResult<DashboardSummary> {
        let employees = self.store.employees()?;
        let periods = self.store.periods()?;
        let runs = self.store.runs()?;
        let payslips = self.store.payslips(&PayslipFilter::default())?;

        let departments: BTreeSet<&str> =
            employees.iter().map(|e| e.department.as_str()).collect();

        Ok(DashboardSummary {
            total_employees: employees.len(),
            active_employees: employees.iter().filter(|e| e.active).count(),
            departments: departments.len(),
            total_periods: periods.len(),
            closed_periods: periods.iter().filter(|p| p.closed).count(),
            total_runs: runs.len(),
            total_payslips: payslips.len(),
            latest_run: runs.into_iter().next(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BracketTable, Catalog, ContributionBase, ContributionShare, EngineSettings, GradeTable,
        RateTables, StatutoryConfig, TaxBracket,
    };
    use crate::engine::InMemoryStore;
    use crate::error::ErrorKind;
    use crate::models::{
        AllowanceRule, AllowanceType, EmployeeAllowance, EmploymentType, GradeRef, GradeStep,
        TaxTreatment,
    };
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn period() -> PeriodKey {
        PeriodKey::new(2025, 8).unwrap()
    }

    fn create_config(max_parallel: usize) -> PayrollConfig {
        let grades = GradeTable::new(vec![GradeStep {
            title: "Lecturer".to_string(),
            grade_code: "L".to_string(),
            step: 1,
            basic_salary: dec("5000.00"),
        }])
        .unwrap();
        let catalog = Catalog::new(
            vec![AllowanceType {
                code: "housing".to_string(),
                name: "Housing Allowance".to_string(),
                tax_treatment: TaxTreatment::Taxable,
                rule: AllowanceRule::FixedAmount,
            }],
            vec![],
        )
        .unwrap();
        let rates = RateTables::new(
            vec![StatutoryConfig {
                name: "SSNIT".to_string(),
                rate_percent: dec("11"),
                effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                share: ContributionShare::Employee,
                base: ContributionBase::Gross,
            }],
            vec![
                BracketTable::new(
                    2025,
                    vec![TaxBracket {
                        lower_bound: Decimal::ZERO,
                        upper_bound: None,
                        rate_percent: dec("15"),
                    }],
                )
                .unwrap(),
            ],
        );
        PayrollConfig::new(
            grades,
            catalog,
            rates,
            EngineSettings {
                max_parallel,
                ..EngineSettings::default()
            },
        )
    }

    fn create_employee(id: &str, active: bool, graded: bool) -> Employee {
        Employee {
            id: id.to_string(),
            first_name: "Kwame".to_string(),
            last_name: "Mensah".to_string(),
            department: "Finance".to_string(),
            grade: graded.then(|| GradeRef {
                grade_code: "L".to_string(),
                step: 1,
            }),
            employment_type: EmploymentType::Permanent,
            active,
            allowances: vec![EmployeeAllowance {
                allowance_type: "housing".to_string(),
                amount: dec("1000.00"),
                active: true,
            }],
            deductions: vec![],
        }
    }

    fn create_engine(employees: Vec<Employee>, max_parallel: usize) -> PayrollEngine<InMemoryStore> {
        PayrollEngine::new(
            Arc::new(create_config(max_parallel)),
            Arc::new(InMemoryStore::new(employees)),
        )
    }

    fn completed(outcome: RunOutcome) -> RunResult {
        match outcome {
            RunOutcome::Completed(result) => result,
            other => panic!("Expected Completed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_processes_active_and_skips_inactive() {
        let engine = create_engine(
            vec![
                create_employee("emp_001", true, true),
                create_employee("emp_002", false, true),
            ],
            8,
        );

        let result = completed(
            engine
                .run_period(period(), RunOptions::default())
                .await
                .unwrap(),
        );

        assert_eq!(result.processed, vec!["emp_001".to_string()]);
        assert_eq!(result.skipped_count(), 1);
        assert_eq!(result.skipped[0].employee_id, "emp_002");
        assert_eq!(result.totals.net_pay, dec("4539.00"));

        let payslips = engine.run_payslips(result.run_id, None, None).unwrap();
        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0].net_pay, dec("4539.00"));
    }

    #[tokio::test]
    async fn test_failed_employee_does_not_stop_run() {
        let engine = create_engine(
            vec![
                create_employee("emp_001", true, true),
                create_employee("emp_002", true, false),
                create_employee("emp_003", true, true),
            ],
            2,
        );

        let result = completed(
            engine
                .run_period(period(), RunOptions::default())
                .await
                .unwrap(),
        );

        assert_eq!(result.processed, vec!["emp_001", "emp_003"]);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.failed[0].employee_id, "emp_002");
        assert_eq!(result.attempted, 3);
    }

    #[tokio::test]
    async fn test_unrepresentable_amount_fails_only_that_employee() {
        let mut oversized = create_employee("emp_002", true, true);
        oversized.allowances[0].amount = Decimal::MAX;
        let engine = create_engine(
            vec![create_employee("emp_001", true, true), oversized.clone()],
            8,
        );

        assert!(matches!(
            engine.preview(&oversized, period(), None),
            Err(EngineError::InvalidEmployee { .. })
        ));

        let result = completed(
            engine
                .run_period(period(), RunOptions::default())
                .await
                .unwrap(),
        );
        assert_eq!(result.processed, vec!["emp_001"]);
        assert_eq!(result.failed[0].employee_id, "emp_002");
        assert_eq!(result.failed[0].kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_closed_period_creates_nothing() {
        let engine = create_engine(vec![create_employee("emp_001", true, true)], 8);
        engine.close_period(period()).unwrap();

        let outcome = engine
            .run_period(period(), RunOptions::default())
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::PeriodClosed { .. }));
        assert!(engine.runs().unwrap().is_empty());
        assert!(
            engine
                .store()
                .payslips(&PayslipFilter::default())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_missing_brackets_fails_before_persistence() {
        let engine = create_engine(vec![create_employee("emp_001", true, true)], 8);

        let result = engine
            .run_period(PeriodKey::new(2026, 1).unwrap(), RunOptions::default())
            .await;

        assert!(matches!(
            result,
            Err(EngineError::MissingTaxBrackets { year: 2026 })
        ));
        assert!(engine.runs().unwrap().is_empty());
        assert!(engine.periods().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_before_start_attempts_nobody() {
        let engine = create_engine(
            vec![
                create_employee("emp_001", true, true),
                create_employee("emp_002", true, true),
            ],
            1,
        );
        let cancel = CancelHandle::new();
        cancel.cancel();

        let result = completed(
            engine
                .run_period(
                    period(),
                    RunOptions {
                        cancel: Some(cancel),
                        ..RunOptions::default()
                    },
                )
                .await
                .unwrap(),
        );

        assert!(result.cancelled);
        assert_eq!(result.processed_count(), 0);
        assert_eq!(result.not_attempted, vec!["emp_001", "emp_002"]);
        assert_eq!(engine.runs().unwrap().len(), 1);
    }

    /// Cancels the run as soon as the first payslip is committed.
    struct CancelAfterFirstCommit {
        inner: InMemoryStore,
        cancel: CancelHandle,
    }

    impl PayrollStore for CancelAfterFirstCommit {
        fn employees(&self) -> EngineResult<Vec<Employee>> {
            self.inner.employees()
        }
        fn employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
            self.inner.employee(employee_id)
        }
        fn set_employee_active(&self, employee_id: &str, active: bool) -> EngineResult<()> {
            self.inner.set_employee_active(employee_id, active)
        }
        fn period(&self, key: PeriodKey) -> EngineResult<Option<PayrollPeriod>> {
            self.inner.period(key)
        }
        fn open_period(&self, key: PeriodKey) -> EngineResult<PayrollPeriod> {
            self.inner.open_period(key)
        }
        fn close_period(&self, key: PeriodKey) -> EngineResult<PayrollPeriod> {
            self.inner.close_period(key)
        }
        fn periods(&self) -> EngineResult<Vec<PayrollPeriod>> {
            self.inner.periods()
        }
        fn create_run(&self, run: &PayrollRun) -> EngineResult<()> {
            self.inner.create_run(run)
        }
        fn run(&self, run_id: Uuid) -> EngineResult<Option<PayrollRun>> {
            self.inner.run(run_id)
        }
        fn runs(&self) -> EngineResult<Vec<PayrollRun>> {
            self.inner.runs()
        }
        fn update_run_status(&self, run_id: Uuid, status: RunStatus) -> EngineResult<PayrollRun> {
            self.inner.update_run_status(run_id, status)
        }
        fn commit_payslip(&self, payslip: Payslip) -> EngineResult<()> {
            self.inner.commit_payslip(payslip)?;
            self.cancel.cancel();
            Ok(())
        }
        fn payslips(&self, filter: &PayslipFilter) -> EngineResult<Vec<Payslip>> {
            self.inner.payslips(filter)
        }
        fn payslip(&self, payslip_id: Uuid) -> EngineResult<Option<Payslip>> {
            self.inner.payslip(payslip_id)
        }
        fn save_run_result(&self, result: &RunResult) -> EngineResult<()> {
            self.inner.save_run_result(result)
        }
        fn run_result(&self, run_id: Uuid) -> EngineResult<Option<RunResult>> {
            self.inner.run_result(run_id)
        }
    }

    #[tokio::test]
    async fn test_cancel_mid_run_keeps_committed_payslips() {
        let cancel = CancelHandle::new();
        let store = CancelAfterFirstCommit {
            inner: InMemoryStore::new(vec![
                create_employee("emp_001", true, true),
                create_employee("emp_002", true, true),
                create_employee("emp_003", true, true),
            ]),
            cancel: cancel.clone(),
        };
        let engine = PayrollEngine::new(Arc::new(create_config(2)), Arc::new(store));

        let result = completed(
            engine
                .run_period(
                    period(),
                    RunOptions {
                        cancel: Some(cancel),
                        ..RunOptions::default()
                    },
                )
                .await
                .unwrap(),
        );

        assert!(result.cancelled);
        assert_eq!(result.processed, vec!["emp_001"]);
        assert_eq!(result.not_attempted, vec!["emp_002", "emp_003"]);

        let payslips = engine.run_payslips(result.run_id, None, None).unwrap();
        assert_eq!(payslips.len(), 1);
        assert_eq!(payslips[0].employee_id, "emp_001");
    }

    #[tokio::test]
    async fn test_period_lock_rejects_concurrent_run() {
        let engine = create_engine(vec![], 8);
        let _guard = engine.lock_period(period()).unwrap();

        let result = engine.run_period(period(), RunOptions::default()).await;
        assert!(matches!(result, Err(EngineError::RunInProgress { .. })));

        let result = engine.close_period(period());
        assert!(matches!(result, Err(EngineError::RunInProgress { .. })));
    }

    #[tokio::test]
    async fn test_period_lock_released_after_run() {
        let engine = create_engine(vec![create_employee("emp_001", true, true)], 8);

        engine
            .run_period(period(), RunOptions::default())
            .await
            .unwrap();
        engine
            .run_period(period(), RunOptions::default())
            .await
            .unwrap();

        assert_eq!(engine.runs().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_run_result_is_saved() {
        let engine = create_engine(vec![create_employee("emp_001", true, true)], 8);
        let result = completed(
            engine
                .run_period(
                    period(),
                    RunOptions {
                        created_by: "payroll_officer".to_string(),
                        ..RunOptions::default()
                    },
                )
                .await
                .unwrap(),
        );

        let (run, saved) = engine.run(result.run_id).unwrap();
        assert_eq!(run.created_by, "payroll_officer");
        assert_eq!(run.status, RunStatus::Draft);
        assert_eq!(saved, Some(result));
    }

    #[test]
    fn test_preview_does_not_persist() {
        let engine = create_engine(vec![], 8);
        let computation = engine
            .preview(&create_employee("emp_001", true, true), period(), None)
            .unwrap();

        assert_eq!(computation.net_pay, dec("4539.00"));
        assert!(engine.runs().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deactivated_employee_skipped_in_next_run() {
        let engine = create_engine(
            vec![
                create_employee("emp_001", true, true),
                create_employee("emp_002", true, true),
            ],
            8,
        );
        let employee = engine.set_employee_active("emp_002", false).unwrap();
        assert!(!employee.active);

        let result = completed(
            engine
                .run_period(period(), RunOptions::default())
                .await
                .unwrap(),
        );
        assert_eq!(result.processed, vec!["emp_001"]);
        assert_eq!(result.skipped[0].employee_id, "emp_002");
    }

    #[test]
    fn test_preview_employee_from_roster() {
        let engine = create_engine(vec![create_employee("emp_001", true, true)], 8);

        let computation = engine.preview_employee("emp_001", period(), None).unwrap();
        assert_eq!(computation.gross_pay, dec("6000.00"));

        assert!(matches!(
            engine.preview_employee("emp_404", period(), None),
            Err(EngineError::EmployeeNotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_run_is_not_found() {
        let engine = create_engine(vec![], 8);
        assert!(matches!(
            engine.run(Uuid::new_v4()),
            Err(EngineError::RunNotFound { .. })
        ));
        assert!(matches!(
            engine.run_payslips(Uuid::new_v4(), None, None),
            Err(EngineError::RunNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let engine = create_engine(
            vec![
                create_employee("emp_001", true, true),
                create_employee("emp_002", false, true),
            ],
            8,
        );
        engine
            .run_period(period(), RunOptions::default())
            .await
            .unwrap();

        let summary = engine.dashboard().unwrap();
        assert_eq!(summary.total_employees, 2);
        assert_eq!(summary.active_employees, 1);
        assert_eq!(summary.departments, 1);
        assert_eq!(summary.total_periods, 1);
        assert_eq!(summary.total_runs, 1);
        assert_eq!(summary.total_payslips, 1);
        assert!(summary.latest_run.is_some());
    }
}
