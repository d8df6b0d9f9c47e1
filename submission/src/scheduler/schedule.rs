//! Slot-indexed submission obligations.
//!
//! The schedule maps each slot to a bucket of events due in that slot. A send
//! event obliges the scheduler to retransmit a transaction; a confirm event
//! marks a decision point: a transaction still pending when its confirm slot
//! arrives is evicted. The nursery holds send events deferred from an earlier
//! tick because an ancestor was still in flight; together the buckets and the
//! nursery completely describe the outstanding work.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::state::{Slot, TxAux, TxId};

/// An obligation to transmit a transaction in a given slot.
#[derive(Debug, Clone)]
pub struct SendEvent {
    /// Transaction id; kept alongside the envelope so filtering never needs
    /// to touch the payload.
    pub id: TxId,
    /// The transaction to transmit.
    pub tx: Arc<TxAux>,
    /// How many times this event has been transmitted so far.
    pub submission_count: u32,
}

impl SendEvent {
    /// A first-time send obligation for `tx`.
    pub fn initial(tx: Arc<TxAux>) -> Self {
        Self {
            id: tx.id(),
            tx,
            submission_count: 0,
        }
    }
}

/// An obligation to check whether a transaction is still pending; if it is,
/// it gets evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmEvent {
    /// Transaction id to probe.
    pub id: TxId,
}

/// The bucket of events due in one slot.
///
/// Order within each list is preserved across scheduling operations.
#[derive(Debug, Clone, Default)]
pub struct ScheduleEvents {
    /// Send obligations, most recently prepended first.
    pub to_send: Vec<SendEvent>,
    /// Confirm probes, most recently prepended first.
    pub to_confirm: Vec<ConfirmEvent>,
}

impl ScheduleEvents {
    /// Builds a bucket from its parts.
    pub fn new(to_send: Vec<SendEvent>, to_confirm: Vec<ConfirmEvent>) -> Self {
        Self {
            to_send,
            to_confirm,
        }
    }

    /// A bucket holding only send events.
    pub fn sends(to_send: Vec<SendEvent>) -> Self {
        Self::new(to_send, Vec::new())
    }

    /// A bucket holding only confirm events.
    pub fn confirms(to_confirm: Vec<ConfirmEvent>) -> Self {
        Self::new(Vec::new(), to_confirm)
    }

    /// Returns true if the bucket holds no events.
    pub fn is_empty(&self) -> bool {
        self.to_send.is_empty() && self.to_confirm.is_empty()
    }
}

/// All outstanding submission obligations.
///
/// Buckets are keyed by the slot's signed projection; the hot range is dense
/// around the current slot with a sparse tail of backoff targets. Buckets for
/// visited slots are removed by [`Schedule::pop`], so past slots do not
/// accumulate.
#[derive(Debug, Default)]
pub struct Schedule {
    scheduled: BTreeMap<i64, ScheduleEvents>,
    nursery: Vec<SendEvent>,
}

impl Schedule {
    /// An empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the bucket for `slot`; an empty bucket if none.
    /// The nursery is untouched.
    pub fn pop(&mut self, slot: Slot) -> ScheduleEvents {
        self.scheduled.remove(&slot.as_map_key()).unwrap_or_default()
    }

    /// Reads the bucket for `slot` without removing it.
    pub fn get(&self, slot: Slot) -> Option<&ScheduleEvents> {
        self.scheduled.get(&slot.as_map_key())
    }

    /// Concatenates `events` into the bucket at `slot`, creating it if
    /// absent. The most recent prepend comes first within the bucket.
    pub fn prepend(&mut self, slot: Slot, events: ScheduleEvents) {
        if events.is_empty() {
            return;
        }
        let bucket = self.scheduled.entry(slot.as_map_key()).or_default();
        bucket.to_send.splice(0..0, events.to_send);
        bucket.to_confirm.splice(0..0, events.to_confirm);
    }

    /// Replaces the nursery wholesale.
    ///
    /// The previous nursery must already have been folded into the current
    /// tick's candidates; merging here instead would grow it without bound.
    pub fn set_nursery(&mut self, events: Vec<SendEvent>) {
        self.nursery = events;
    }

    /// Send events deferred behind an in-flight ancestor.
    pub fn nursery(&self) -> &[SendEvent] {
        &self.nursery
    }

    /// Number of slots with a scheduled bucket.
    pub fn scheduled_slots(&self) -> usize {
        self.scheduled.len()
    }

    /// Returns true if no bucket and no nursery entry remains.
    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty() && self.nursery.is_empty()
    }

    /// Iterates buckets in slot-key order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &ScheduleEvents)> {
        self.scheduled
            .iter()
            .map(|(key, bucket)| (Slot::from_map_key(*key), bucket))
    }
}
