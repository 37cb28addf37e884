//! Payroll run orchestration and persistence.
//!
//! This module contains the [`PayrollEngine`] that executes payroll runs, the
//! [`PayrollStore`] boundary it persists through, an in-memory store, and the
//! cooperative [`CancelHandle`].

mod cancel;
mod runner;
mod store;

pub use cancel::CancelHandle;
pub use runner::{DEFAULT_CREATED_BY, DashboardSummary, PayrollEngine, RunOptions};
pub use store::{EmployeeFilter, InMemoryStore, PayrollStore, PayslipFilter};
