//! The per-tick resubmission function.
//!
//! Once the scheduler has decided which send events are due in a slot, the
//! resubmission function transmits their payloads and reinserts each event
//! into the schedule according to the retry policy. It is a pure
//! schedule-to-schedule transformer apart from the injected transmit
//! capability, and it never touches the pending set.

use std::sync::Arc;

use crate::scheduler::policy::{NextEvent, RetryPolicy};
use crate::scheduler::schedule::{ConfirmEvent, Schedule, ScheduleEvents, SendEvent};
use crate::state::{Slot, TxAux};

/// Capability that hands a batch of transactions to the network.
///
/// The return is `()`: delivery is best-effort and the chain itself, via the
/// host's adoption notifications, is the only oracle of success.
pub trait Transmit: Send {
    /// Broadcasts the given transactions.
    fn transmit(&mut self, txs: &[Arc<TxAux>]);
}

impl<F> Transmit for F
where
    F: FnMut(&[Arc<TxAux>]) + Send,
{
    fn transmit(&mut self, txs: &[Arc<TxAux>]) {
        self(txs)
    }
}

/// Reschedules the events due in a slot, transmitting them along the way.
pub trait Resubmission: Send {
    /// Consumes the events due at `current_slot` and returns the schedule
    /// with their follow-up obligations inserted.
    fn resubmit(&mut self, current_slot: Slot, due: Vec<SendEvent>, schedule: Schedule)
        -> Schedule;
}

/// The standard resubmission function: one broadcast per tick, then one
/// policy consultation per event.
pub struct DefaultResubmission<T, P> {
    transmit: T,
    policy: P,
}

impl<T: Transmit, P: RetryPolicy> DefaultResubmission<T, P> {
    /// Couples a transmit capability with a retry policy.
    pub fn new(transmit: T, policy: P) -> Self {
        Self { transmit, policy }
    }
}

impl<T: Transmit, P: RetryPolicy> Resubmission for DefaultResubmission<T, P> {
    fn resubmit(
        &mut self,
        current_slot: Slot,
        due: Vec<SendEvent>,
        mut schedule: Schedule,
    ) -> Schedule {
        if due.is_empty() {
            return schedule;
        }

        let blobs: Vec<Arc<TxAux>> = due.iter().map(|ev| Arc::clone(&ev.tx)).collect();
        self.transmit.transmit(&blobs);

        for ev in due {
            let submission_count = ev.submission_count.saturating_add(1);
            match self.policy.next_event(submission_count, current_slot) {
                NextEvent::SendIn(slot) => schedule.prepend(
                    slot,
                    ScheduleEvents::sends(vec![SendEvent {
                        id: ev.id,
                        tx: ev.tx,
                        submission_count,
                    }]),
                ),
                NextEvent::CheckConfirmedIn(slot) => schedule.prepend(
                    slot,
                    ScheduleEvents::confirms(vec![ConfirmEvent { id: ev.id }]),
                ),
            }
        }

        schedule
    }
}
