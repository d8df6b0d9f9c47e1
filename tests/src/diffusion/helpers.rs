//! Test helpers for submission service diffusion tests.
//!
//! Provides a harness that spawns a real `SubmissionService` and plays the
//! three collaborators around it: the wallet announcing batches, the chain
//! adoption pipeline confirming ids, and the slot clock.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use slog::{Drain, Level, Logger};
use submission::{
    ConfirmedNotification, EvictedNotification, PendingBatch, RetryPolicy, SlotTick,
    SubmissionChannels, SubmissionService, TxAux, TxId, TxIn,
};

/// How long collection helpers poll before concluding nothing more arrives.
const COLLECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Poll interval while waiting on service output.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Creates a logger for integration tests with configurable log levels.
///
/// Respects the `RUST_LOG` environment variable:
/// - `error` - Only errors
/// - `warn` - Warnings and errors
/// - `info` - Info, warnings, and errors (default)
/// - `debug` - All messages including debug
pub fn create_test_logger() -> Logger {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|env_str| Level::from_str(&env_str).ok())
        .unwrap_or(Level::Info);

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain)
        .build()
        .fuse()
        .filter_level(log_level)
        .fuse();

    slog::Logger::root(drain, slog::o!())
}

/// A transaction with no dependencies.
pub fn transfer_tx(n: u64) -> TxAux {
    TxAux::new(format!("transfer-{n}").into_bytes(), vec![])
}

/// A transaction spending an output of `parent`.
pub fn child_of(parent: &TxAux, n: u64) -> TxAux {
    TxAux::new(
        format!("child-{n}").into_bytes(),
        vec![TxIn::Spend {
            source: parent.id(),
            index: 0,
        }],
    )
}

/// A running submission service plus the host-side channel endpoints.
pub struct DiffusionHarness {
    pub service: SubmissionService,
    pub channels: SubmissionChannels,
    pub logger: Logger,
}

impl DiffusionHarness {
    /// Spawns a service with the given retry policy.
    pub fn spawn<P: RetryPolicy + 'static>(policy: P) -> Self {
        let logger = create_test_logger();
        let shutdown = Arc::new(AtomicBool::new(false));
        let (service, channels) = SubmissionService::spawn(policy, shutdown, logger.clone());
        Self {
            service,
            channels,
            logger,
        }
    }

    /// Announces a batch of newly pending transactions.
    pub fn announce(&mut self, txs: Vec<TxAux>) {
        self.channels
            .pending_producer
            .push(PendingBatch { txs })
            .expect("pending channel full");
    }

    /// Reports ids as adopted by the chain.
    pub fn confirm(&mut self, ids: Vec<TxId>) {
        self.channels
            .confirmed_producer
            .push(ConfirmedNotification { ids })
            .expect("confirmed channel full");
    }

    /// Advances the slot clock by `n` ticks.
    pub fn tick(&mut self, n: usize) {
        for _ in 0..n {
            self.channels
                .tick_producer
                .push(SlotTick)
                .expect("tick channel full");
        }
    }

    /// Drains broadcast batches until `expected` have arrived or the
    /// collection window closes.
    pub fn collect_broadcasts(&mut self, expected: usize) -> Vec<Vec<TxId>> {
        let deadline = Instant::now() + COLLECT_TIMEOUT;
        let mut batches = Vec::new();
        while batches.len() < expected && Instant::now() < deadline {
            match self.channels.transmit_consumer.pop() {
                Ok(batch) => batches.push(batch.txs.iter().map(|tx| tx.id()).collect()),
                Err(_) => std::thread::sleep(POLL_INTERVAL),
            }
        }
        batches
    }

    /// Like [`Self::collect_broadcasts`] but keeps the full envelopes.
    pub fn collect_broadcast_envelopes(&mut self, expected: usize) -> Vec<Vec<Arc<TxAux>>> {
        let deadline = Instant::now() + COLLECT_TIMEOUT;
        let mut batches = Vec::new();
        while batches.len() < expected && Instant::now() < deadline {
            match self.channels.transmit_consumer.pop() {
                Ok(batch) => batches.push(batch.txs),
                Err(_) => std::thread::sleep(POLL_INTERVAL),
            }
        }
        batches
    }

    /// Waits for the next eviction report.
    pub fn wait_for_eviction(&mut self) -> Option<EvictedNotification> {
        let deadline = Instant::now() + COLLECT_TIMEOUT;
        while Instant::now() < deadline {
            if let Ok(notif) = self.channels.evicted_consumer.pop() {
                return Some(notif);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        None
    }

    /// Asserts that no broadcast arrives within a settle window.
    pub fn assert_quiet(&mut self, window: Duration) {
        let deadline = Instant::now() + window;
        while Instant::now() < deadline {
            if let Ok(batch) = self.channels.transmit_consumer.pop() {
                let ids: Vec<TxId> = batch.txs.iter().map(|tx| tx.id()).collect();
                panic!("unexpected broadcast: {ids:?}");
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}
