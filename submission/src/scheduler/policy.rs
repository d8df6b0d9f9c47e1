//! Retry policies.
//!
//! A policy is a pure, total function from (submissions performed, current
//! slot) to the next obligation for a transaction: try again in some future
//! slot, or stop sending and probe for confirmation instead. Policies never
//! error; any count at or beyond the retry budget keeps producing the same
//! confirmation probe.

use crate::state::Slot;

/// The next obligation for a transaction after a transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextEvent {
    /// Schedule another send at the given slot.
    SendIn(Slot),
    /// Give up sending; probe for confirmation at the given slot. If the
    /// transaction is still pending then, it is evicted.
    CheckConfirmedIn(Slot),
}

/// Decides when, and whether, a transaction is retransmitted.
///
/// `submission_count` is the number of transmissions already performed for
/// the event, including the one that triggered the consultation.
pub trait RetryPolicy: Send {
    /// Computes the next obligation given the submissions performed so far
    /// and the slot being processed.
    fn next_event(&self, submission_count: u32, current_slot: Slot) -> NextEvent;
}

/// Retries on a fixed cadence.
#[derive(Debug, Clone, Copy)]
pub struct ConstantRetry {
    skip: u64,
    max_retries: u32,
}

impl ConstantRetry {
    /// Retries every `skip` slots, giving up after `max_retries`
    /// transmissions. The gap clamps to at least one slot: a zero delay
    /// would land in the bucket the current tick already drained, stranding
    /// the event.
    pub fn new(skip: u64, max_retries: u32) -> Self {
        Self { skip, max_retries }
    }
}

impl RetryPolicy for ConstantRetry {
    fn next_event(&self, submission_count: u32, current_slot: Slot) -> NextEvent {
        let target = current_slot.plus(self.skip.max(1));
        if submission_count < self.max_retries {
            NextEvent::SendIn(target)
        } else {
            NextEvent::CheckConfirmedIn(target)
        }
    }
}

/// Retries with exponentially growing gaps.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    max_retries: u32,
    base: f64,
}

impl ExponentialBackoff {
    /// Waits `floor(base ^ (submission_count - 1))` slots between attempts,
    /// giving up after `max_retries` transmissions. With base 2 a transaction
    /// first sent at slot 1 is retried at slots 2, 4, 8, ...
    pub fn new(max_retries: u32, base: f64) -> Self {
        Self { max_retries, base }
    }

    fn delay(&self, submission_count: u32) -> u64 {
        let exponent = submission_count.saturating_sub(1);
        let delta = self.base.powi(exponent as i32).floor();
        if delta.is_finite() && delta >= 1.0 {
            delta as u64
        } else {
            // Non-finite or sub-slot delays clamp to the minimum gap.
            1
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn next_event(&self, submission_count: u32, current_slot: Slot) -> NextEvent {
        let target = current_slot.plus(self.delay(submission_count));
        if submission_count < self.max_retries {
            NextEvent::SendIn(target)
        } else {
            NextEvent::CheckConfirmedIn(target)
        }
    }
}
