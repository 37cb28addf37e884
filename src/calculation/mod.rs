//! Calculation logic for the Payroll Engine.
//!
//! This module contains the pure, side-effect-free functions that compute one
//! employee's pay: effective-dated rate resolution, basic salary lookup,
//! allowance and deduction aggregation, statutory contributions, progressive
//! income tax, and the payslip builder that chains them together.

mod aggregation;
mod basic_salary;
mod money;
mod payslip_builder;
mod progressive_tax;
mod rate_resolver;
mod statutory;

pub use aggregation::{CompensationResult, aggregate_compensation};
pub use basic_salary::{BasicSalaryLookupResult, lookup_basic_salary};
pub use money::{
    MONEY_DECIMAL_PLACES, MONEY_MAX_DIGITS, is_valid_money_amount, max_money_amount, round_money,
};
pub use payslip_builder::compute_payslip;
pub use progressive_tax::{
    BandCharge, ProgressiveTaxResult, calculate_progressive_tax, compute_tax,
};
pub use rate_resolver::{
    RateSnapshot, ResolvedStatutoryRate, STATUTORY_RATE_MISSING, resolve_statutory_rate,
    resolve_tax_brackets,
};
pub use statutory::{
    STATUTORY_CONTRIBUTION_IS_PRE_TAX, StatutoryContributionResult,
    calculate_statutory_contribution,
};
