//! Submission Scheduler - Slot-Driven Retransmission of Pending Transactions
//!
//! The scheduler keeps retransmitting every pending transaction until the
//! chain adopts it or the retry policy gives up. It is built from four pieces:
//!
//! 1. Schedule: slot-indexed buckets of send and confirm obligations, plus a
//!    nursery of sends deferred behind an in-flight ancestor
//! 2. Retry Policy: pure function deciding when (and whether) to try again
//! 3. Resubmission Function: transmits the batch due in a slot and reinserts
//!    each event per the policy
//! 4. Scheduler Core: owns the pending set, the schedule and the slot counter;
//!    runs the per-tick filter / topological sort / partition / evict cycle
//!
//! ## Architecture
//!
//!
//! Wallet ──[pending_channel]──► Submission ──[transmit_channel]──► Diffusion
//!                                    │
//!                                    ◄──[confirmed_channel]── Chain adoption
//!                                    │
//!                                    ├──[evicted_channel]──► Host UI/metrics
//!                                    │
//!                                    ◄──[tick_channel]────── Slot clock
//!
//!
//! The core is single-owner and does no I/O; [`SubmissionService`] provides
//! the dedicated-thread actor wiring shown above for hosts that want it.

pub mod core;
pub mod policy;
pub mod resubmission;
pub mod schedule;
pub mod service;
pub mod types;

pub use self::core::Scheduler;
pub use policy::{ConstantRetry, ExponentialBackoff, NextEvent, RetryPolicy};
pub use resubmission::{DefaultResubmission, Resubmission, Transmit};
pub use schedule::{ConfirmEvent, Schedule, ScheduleEvents, SendEvent};
pub use service::{ChannelTransmit, SubmissionChannels, SubmissionService};
pub use types::{
    ConfirmedNotification, EvictedNotification, PendingBatch, SlotTick, TransmitBatch,
};
