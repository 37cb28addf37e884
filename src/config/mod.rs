//! Configuration loading and management for the Payroll Engine.
//!
//! This module provides functionality to load payroll configurations from YAML files,
//! including the salary scale, allowance/deduction catalogs, versioned statutory rates,
//! progressive tax tables and the employee roster.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/demo").unwrap();
//! println!("Max parallel: {}", loader.config().settings().max_parallel);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BracketTable, Catalog, CatalogFile, ContributionBase, ContributionShare, EngineSettings,
    GradeStepsFile, GradeTable, PayrollConfig, RateTables, StatutoryConfig, TaxBracket,
    TaxBracketsFile,
};
