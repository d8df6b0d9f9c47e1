//! Scheduler error types.

use thiserror::Error;

use crate::state::TxId;

/// Scheduler error type.
///
/// The error surface is deliberately minimal: missing ids during filtering
/// are not errors, over-retried events convert to confirmation probes, and
/// transmit failures are invisible to the scheduler. Only a dependency cycle
/// in the pending set is reportable, and it aborts the offending tick without
/// touching any state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The transactions due in a slot form a dependency cycle.
    ///
    /// Carries the ids that could not be ordered, in schedule order.
    #[error("dependency cycle among pending transactions {pending:?}")]
    LoopDetected {
        /// Ids the topological sort could not place.
        pending: Vec<TxId>,
    },
}

/// Result type alias for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
