//! End-to-end diffusion scenarios against the running service.
//!
//! These tests exercise the production wiring: wallet batches go in through
//! the pending channel, slot ticks drive the scheduler, broadcast batches
//! come out of the transmit channel, and losses surface on the eviction
//! channel.

#![cfg(test)]

use std::time::Duration;

use submission::{ConstantRetry, TxAux, TxId};

use super::helpers::{DiffusionHarness, child_of, transfer_tx};

#[test]
fn test_announced_batch_is_broadcast_and_retried() {
    let mut harness = DiffusionHarness::spawn(ConstantRetry::new(1, 5));

    let a = transfer_tx(1);
    let b = transfer_tx(2);
    let mut expected: Vec<TxId> = vec![a.id(), b.id()];
    expected.sort();

    harness.announce(vec![a, b]);
    // The batch is scheduled one slot ahead; three ticks yield two
    // broadcasts.
    harness.tick(3);

    let batches = harness.collect_broadcasts(2);
    assert_eq!(batches.len(), 2, "expected a first send and one retry");
    for batch in &batches {
        let mut ids = batch.clone();
        ids.sort();
        assert_eq!(ids, expected);
    }
}

#[test]
fn test_confirmation_stops_retransmission() {
    let mut harness = DiffusionHarness::spawn(ConstantRetry::new(1, 10));

    let a = transfer_tx(7);
    let id = a.id();
    harness.announce(vec![a]);
    harness.tick(2);

    let batches = harness.collect_broadcasts(1);
    assert_eq!(batches, vec![vec![id]]);

    // The chain adopts the transaction; further ticks stay silent.
    harness.confirm(vec![id]);
    std::thread::sleep(Duration::from_millis(50));
    harness.tick(4);
    harness.assert_quiet(Duration::from_millis(200));
}

#[test]
fn test_dependent_pair_survives_the_wire_in_order() {
    let mut harness = DiffusionHarness::spawn(ConstantRetry::new(1, 5));

    let parent = transfer_tx(3);
    let child = child_of(&parent, 3);
    harness.announce(vec![parent.clone(), child.clone()]);
    harness.tick(2);

    let envelopes = harness.collect_broadcast_envelopes(1);
    assert_eq!(envelopes.len(), 1);

    // Replay the host's wire hop for each envelope and check what a peer
    // would see: the same ids, ancestor first.
    let received: Vec<TxAux> = envelopes[0]
        .iter()
        .map(|tx| {
            let bytes = tx.to_bytes().expect("encode for the wire");
            TxAux::from_bytes(&bytes).expect("decode at the peer")
        })
        .collect();
    let ids: Vec<TxId> = received.iter().map(TxAux::id).collect();
    assert_eq!(ids, vec![parent.id(), child.id()]);
    assert_eq!(received[1].inputs, child.inputs);
}

#[test]
fn test_never_confirmed_transaction_is_reported_lost() {
    let mut harness = DiffusionHarness::spawn(ConstantRetry::new(1, 2));

    let doomed = transfer_tx(13);
    let id = doomed.id();
    harness.announce(vec![doomed]);
    // Two permitted sends at slots 1 and 2, the probe at slot 3.
    harness.tick(4);

    let notif = harness.wait_for_eviction().expect("eviction report");
    assert_eq!(notif.ids, vec![id]);
    assert_eq!(notif.slot.as_u64(), 3);

    // Given up for good: the clock keeps running but nothing more goes out.
    harness.tick(3);
    harness.assert_quiet(Duration::from_millis(200));
}
