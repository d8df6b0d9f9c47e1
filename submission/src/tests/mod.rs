//! Crate-internal end-to-end tests: full submission lifecycles against a
//! scheduler with a recording transmit capability, plus randomized invariant
//! checks.


use std::sync::{Arc, Mutex};

use crate::scheduler::{DefaultResubmission, RetryPolicy, Scheduler};
use crate::state::{TxAux, TxId, TxIn};

/// Log of transmit calls, one entry per broadcast, in call order.
pub(crate) type SentLog = Arc<Mutex<Vec<Vec<TxId>>>>;

/// A scheduler whose transmissions are recorded instead of broadcast.
pub(crate) fn recording_scheduler<P>(policy: P) -> (Scheduler, SentLog)
where
    P: RetryPolicy + 'static,
{
    let sent: SentLog = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&sent);
    let transmit = move |txs: &[Arc<TxAux>]| {
        recorder
            .lock()
            .unwrap()
            .push(txs.iter().map(|tx| tx.id()).collect());
    };
    let scheduler = Scheduler::new(Box::new(DefaultResubmission::new(transmit, policy)));
    (scheduler, sent)
}

pub(crate) fn tx(payload: &[u8]) -> TxAux {
    TxAux::new(payload.to_vec(), vec![])
}

pub(crate) fn tx_spending(payload: &[u8], parents: &[TxId]) -> TxAux {
    let inputs = parents
        .iter()
        .map(|parent| TxIn::Spend {
            source: *parent,
            index: 0,
        })
        .collect();
    TxAux::new(payload.to_vec(), inputs)
}
