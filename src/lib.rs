//! Payroll Computation Engine
//!
//! This crate computes monthly payslips for a roster of employees: basic
//! salary from a grade scale, catalog-driven allowances and deductions,
//! versioned statutory contributions and progressive income tax. Runs are
//! executed per period, persisted through a store and exposed over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
