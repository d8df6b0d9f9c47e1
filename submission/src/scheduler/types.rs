//! Message types for inter-thread communication with the submission service.
//!
//! These types are passed through lock-free rtrb ring buffers between the
//! wallet, the host's chain-adoption pipeline, the slot clock and the
//! submission service thread.

use std::sync::Arc;

use crate::state::{Slot, TxAux, TxId};

/// A batch of newly pending transactions from the wallet.
///
/// Sent whenever the wallet originates transactions; the service announces
/// the whole batch to the scheduler in one step.
#[derive(Debug, Clone)]
pub struct PendingBatch {
    /// Transactions that just became pending.
    pub txs: Vec<TxAux>,
}

/// Notification that the chain adopted transactions (or the wallet dropped
/// them), so they are no longer pending.
#[derive(Debug, Clone)]
pub struct ConfirmedNotification {
    /// Ids that stopped being pending.
    pub ids: Vec<TxId>,
}

/// One advance of the slot clock.
///
/// The service processes one scheduler tick per message; the host chooses the
/// cadence.
#[derive(Debug, Clone, Copy)]
pub struct SlotTick;

/// A batch of transactions due for broadcast.
///
/// Produced by the service's transmit capability; the host forwards the
/// payloads to its diffusion layer. Best-effort: no delivery result flows
/// back.
#[derive(Debug, Clone)]
pub struct TransmitBatch {
    /// Transactions to broadcast, ancestors before descendants.
    pub txs: Vec<Arc<TxAux>>,
}

/// Transactions given up on during a tick.
///
/// A transaction lands here when its confirmation probe came due while it was
/// still pending; the host decides how to surface the loss (UI, logs,
/// metrics). Cascading eviction of dependents is the host's duty.
#[derive(Debug, Clone)]
pub struct EvictedNotification {
    /// Slot in which the eviction happened.
    pub slot: Slot,
    /// Ids removed from the pending set.
    pub ids: Vec<TxId>,
}
