//! Application state for the Payroll Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::PayrollConfig;
use crate::engine::{InMemoryStore, PayrollEngine};
use crate::models::Employee;

/// Shared application state.
///
/// Holds the payroll engine, which in turn owns the loaded configuration
/// and the store.
#[derive(Clone)]
pub struct AppState {
    engine: PayrollEngine<InMemoryStore>,
}

impl AppState {
    /// Creates a state backed by an in-memory store seeded with a roster.
    pub fn new(config: PayrollConfig, employees: Vec<Employee>) -> Self {
        Self::from_engine(PayrollEngine::new(
            Arc::new(config),
            Arc::new(InMemoryStore::new(employees)),
        ))
    }

    /// Wraps an existing engine.
    pub fn from_engine(engine: PayrollEngine<InMemoryStore>) -> Self {
        Self { engine }
    }

    /// Returns the payroll engine.
    pub fn engine(&self) -> &PayrollEngine<InMemoryStore> {
        &self.engine
    }
}
