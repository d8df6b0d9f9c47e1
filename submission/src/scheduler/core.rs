//! Scheduler core.
//!
//! Owns the pending set, the schedule and the slot counter. Each tick drains
//! the bucket for the current slot together with the nursery, drops events
//! whose transaction is no longer pending, orders the rest so that no
//! transaction is sent before an ancestor it spends from, holds back
//! descendants of transactions that are not being sent this tick, hands the
//! ready batch to the resubmission function, and evicts every transaction
//! whose confirmation probe came due while it was still pending.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{Result, SchedulerError};
use crate::scheduler::resubmission::Resubmission;
use crate::scheduler::schedule::{ConfirmEvent, Schedule, ScheduleEvents, SendEvent};
use crate::state::{Pendings, Slot, TxId};

/// Slot-driven submission scheduler.
///
/// Single-owner and free of I/O: the only effect is the transmit capability
/// buried in the injected resubmission function, and the only suspension
/// point is whatever that capability chooses to do. Serialize all calls
/// against one scheduler through a single owner (see
/// [`SubmissionService`](crate::scheduler::service::SubmissionService) for a
/// ready-made mailbox).
pub struct Scheduler {
    pendings: Pendings,
    schedule: Schedule,
    slot: Slot,
    resubmission: Box<dyn Resubmission>,
}

impl Scheduler {
    /// A fresh scheduler at slot 0 with nothing pending.
    pub fn new(resubmission: Box<dyn Resubmission>) -> Self {
        Self {
            pendings: Pendings::new(),
            schedule: Schedule::new(),
            slot: Slot::default(),
            resubmission,
        }
    }

    /// Announces a batch of newly pending transactions.
    ///
    /// The batch is unioned into the pending set (entries already pending
    /// win), and a first send event for every id in the batch is scheduled
    /// one slot ahead, never the current slot, so a tick already in flight
    /// cannot double-emit the batch.
    pub fn add_pending(&mut self, batch: Pendings) {
        let sends: Vec<SendEvent> = batch
            .iter()
            .map(|(_, tx)| SendEvent::initial(Arc::clone(tx)))
            .collect();
        self.pendings.union(batch);
        self.schedule
            .prepend(self.slot.plus(1), ScheduleEvents::sends(sends));
    }

    /// Marks transactions as no longer pending (adopted by the chain, or
    /// dropped by the wallet).
    ///
    /// The schedule is not pruned here; stale events are filtered lazily on
    /// the tick that would have processed them.
    pub fn rem_pending(&mut self, ids: &[TxId]) {
        self.pendings.difference(ids);
    }

    /// Processes the current slot and advances the clock.
    ///
    /// Returns the ids evicted in this slot: transactions whose confirmation
    /// probe came due while they were still pending. Fails only when the due
    /// transactions form a dependency cycle, in which case nothing has
    /// changed, the slot counter included.
    pub fn tick(&mut self) -> Result<Vec<TxId>> {
        let slot = self.slot;

        // Candidates are assembled and ordered before any mutation, so a
        // cycle aborts the tick with the scheduler intact.
        let due_sends = self
            .schedule
            .get(slot)
            .map(|bucket| bucket.to_send.clone())
            .unwrap_or_default();
        let mut candidates = due_sends;
        candidates.extend_from_slice(self.schedule.nursery());
        candidates.retain(|ev| self.pendings.contains(&ev.id));
        let sorted = topological_sort(candidates)?;

        let bucket = self.schedule.pop(slot);
        let (ready, deferred) = partition_ready(sorted, &self.pendings);
        self.schedule.set_nursery(deferred);

        let schedule = std::mem::take(&mut self.schedule);
        self.schedule = self.resubmission.resubmit(slot, ready, schedule);

        let evicted: Vec<TxId> = bucket
            .to_confirm
            .iter()
            .map(|probe| probe.id)
            .filter(|id| self.pendings.contains(id))
            .collect();
        self.pendings.difference(&evicted);

        self.slot = slot.succ();
        Ok(evicted)
    }

    /// Splices extra events into the schedule, most recent first within the
    /// target bucket.
    pub fn add_to_schedule(
        &mut self,
        slot: Slot,
        sends: Vec<SendEvent>,
        confirms: Vec<ConfirmEvent>,
    ) {
        self.schedule
            .prepend(slot, ScheduleEvents::new(sends, confirms));
    }

    /// The pending set.
    pub fn pending(&self) -> &Pendings {
        &self.pendings
    }

    /// The outstanding schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// The slot the next tick will process.
    pub fn current_slot(&self) -> Slot {
        self.slot
    }

    /// The injected resubmission function.
    pub fn resubmission(&self) -> &dyn Resubmission {
        self.resubmission.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }
}

/// Orders `candidates` so every transaction follows the candidates it spends
/// from. Stable: independent events keep their relative order.
///
/// Dependencies on ids outside the candidate list are not edges here; they
/// are handled by [`partition_ready`].
fn topological_sort(candidates: Vec<SendEvent>) -> Result<Vec<SendEvent>> {
    let in_batch: BTreeSet<TxId> = candidates.iter().map(|ev| ev.id).collect();
    let mut remaining: Vec<Option<SendEvent>> = candidates.into_iter().map(Some).collect();
    let mut placed: BTreeSet<TxId> = BTreeSet::new();
    let mut left = remaining.len();
    let mut sorted = Vec::with_capacity(left);

    while left > 0 {
        let mut progressed = false;
        for entry in remaining.iter_mut() {
            let emittable = match entry.as_ref() {
                Some(ev) => ev
                    .tx
                    .input_sources()
                    .all(|src| !in_batch.contains(&src) || placed.contains(&src)),
                None => continue,
            };
            if emittable {
                if let Some(ev) = entry.take() {
                    placed.insert(ev.id);
                    sorted.push(ev);
                    left -= 1;
                    progressed = true;
                }
            }
        }
        if !progressed {
            let pending: Vec<TxId> = remaining.iter().flatten().map(|ev| ev.id).collect();
            return Err(SchedulerError::LoopDetected { pending });
        }
    }

    Ok(sorted)
}

/// Walks a topologically ordered list front to back, splitting it into the
/// events sendable this tick and the events that must wait in the nursery.
///
/// An event must wait when one of its inputs spends from a transaction that
/// is still pending but not part of the ready sequence built so far: its
/// ancestor is in flight, and broadcasting the descendant before the ancestor
/// lands wastes bandwidth at best. Order is preserved within both halves.
fn partition_ready(
    sorted: Vec<SendEvent>,
    pendings: &Pendings,
) -> (Vec<SendEvent>, Vec<SendEvent>) {
    let mut ready = Vec::with_capacity(sorted.len());
    let mut deferred = Vec::new();
    let mut ready_ids: BTreeSet<TxId> = BTreeSet::new();

    for ev in sorted {
        let must_wait = ev
            .tx
            .input_sources()
            .any(|src| pendings.contains(&src) && !ready_ids.contains(&src));
        if must_wait {
            deferred.push(ev);
        } else {
            ready_ids.insert(ev.id);
            ready.push(ev);
        }
    }

    (ready, deferred)
}
