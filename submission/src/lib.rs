//! Submission scheduler for locally originated wallet transactions.
//!
//! A wallet that creates a transaction cannot assume the network heard it the
//! first time. This crate keeps retransmitting every locally known pending
//! transaction on a slot-driven schedule until the chain adopts it (the host
//! reports adoption) or the retry policy gives up and the transaction is
//! evicted from the pending set.
//!
//! The core is a pure, single-owner [`Scheduler`]: the host tells it what is
//! pending ([`Scheduler::add_pending`]), what stopped being pending
//! ([`Scheduler::rem_pending`]), and when a slot elapses
//! ([`Scheduler::tick`]). Actual transmission is an injected capability; the
//! scheduler never talks to peers and never validates transactions.
//!
//! [`SubmissionService`] wraps the scheduler in a dedicated OS thread with
//! lock-free channel endpoints, for hosts that want the actor wiring done for
//! them.
//!
//! # Quick Start
//!
//! ```ignore
//! use submission::{ConstantRetry, DefaultResubmission, Pendings, Scheduler};
//!
//! let policy = ConstantRetry::new(1, 5);
//! let transmit = |txs: &[std::sync::Arc<submission::TxAux>]| {
//!     // hand the blobs to the diffusion layer
//! };
//! let mut scheduler = Scheduler::new(Box::new(DefaultResubmission::new(transmit, policy)));
//!
//! scheduler.add_pending(Pendings::from_iter([tx]));
//! loop {
//!     // once per slot, on whatever clock the host runs
//!     let evicted = scheduler.tick()?;
//!     for id in evicted {
//!         // surface "transaction lost" to the user layer
//!     }
//! }
//! ```

pub mod error;
pub mod scheduler;
pub mod state;

pub use error::{Result, SchedulerError};
pub use scheduler::{
    ChannelTransmit, ConfirmEvent, ConfirmedNotification, ConstantRetry, DefaultResubmission,
    EvictedNotification, ExponentialBackoff, NextEvent, PendingBatch, Resubmission, RetryPolicy,
    Schedule, ScheduleEvents, Scheduler, SendEvent, SlotTick, SubmissionChannels,
    SubmissionService, Transmit, TransmitBatch,
};
pub use state::{Pendings, Slot, TxAux, TxId, TxIn};

#[cfg(test)]
mod tests;
