//! Cooperative cancellation for payroll runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable flag a caller can use to stop a run between employees.
///
/// Cancelling never rolls back committed payslips; employees not yet reached
/// are reported as not attempted.
///
/// # Example
///
/// ```
/// use payroll_engine::engine::CancelHandle;
///
/// let handle = CancelHandle::new();
/// let worker_view = handle.clone();
///
/// handle.cancel();
/// assert!(worker_view.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Creates a handle that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
