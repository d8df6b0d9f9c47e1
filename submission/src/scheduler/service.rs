//! Submission Service - Thread Management
//!
//! Spawns a dedicated OS thread that owns a [`Scheduler`], so wallet code,
//! chain adoption and the slot clock never contend on it directly. All
//! communication uses lock-free rtrb channels; the thread is the mailbox that
//! serializes every scheduler mutation.
//!
//! ## Responsibilities
//!
//! 1. Pending Ingestion: receive newly originated transaction batches from
//!    the wallet and announce them to the scheduler
//! 2. Adoption Cleanup: drop transactions the chain confirmed (or the wallet
//!    abandoned) from the pending set
//! 3. Tick Processing: run one scheduler tick per clock message, pushing each
//!    due batch to the host's diffusion layer
//! 4. Loss Reporting: forward eviction sets to the host with the slot they
//!    occurred in

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread::{self, JoinHandle};

use rtrb::{Consumer, Producer, RingBuffer};
use slog::Logger;

use crate::scheduler::core::Scheduler;
use crate::scheduler::policy::RetryPolicy;
use crate::scheduler::resubmission::{DefaultResubmission, Transmit};
use crate::scheduler::types::{
    ConfirmedNotification, EvictedNotification, PendingBatch, SlotTick, TransmitBatch,
};
use crate::state::{Pendings, TxAux};

/// Default ring buffer size for channels.
const RING_BUFFER_SIZE: usize = 256;

/// Ring buffer size for the pending-batch channel (larger, the wallet may
/// burst).
const PENDING_RING_BUFFER_SIZE: usize = 1024;

/// Number of pending batches to ingest per loop iteration (quota).
const BATCH_PROCESS_QUOTA: usize = 64;

/// Submission service running on a dedicated OS thread.
pub struct SubmissionService {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

/// Channel endpoints for communicating with the submission service.
pub struct SubmissionChannels {
    /// Producer for announcing newly pending batches (Wallet → Submission)
    pub pending_producer: Producer<PendingBatch>,
    /// Producer for reporting adopted ids (Chain adoption → Submission)
    pub confirmed_producer: Producer<ConfirmedNotification>,
    /// Producer for slot ticks (Clock → Submission)
    pub tick_producer: Producer<SlotTick>,
    /// Consumer for batches due for broadcast (Submission → Diffusion)
    pub transmit_consumer: Consumer<TransmitBatch>,
    /// Consumer for eviction reports (Submission → Host)
    pub evicted_consumer: Consumer<EvictedNotification>,
}

impl SubmissionService {
    /// Spawns the submission service on a new OS thread.
    ///
    /// # Arguments
    ///
    /// * policy - Retry policy applied to every transmission
    /// * shutdown - Shared shutdown signal
    /// * logger - Logger for diagnostics
    ///
    /// # Returns
    ///
    /// A tuple containing the service handle and channel endpoints.
    pub fn spawn<P>(
        policy: P,
        shutdown: Arc<AtomicBool>,
        logger: Logger,
    ) -> (Self, SubmissionChannels)
    where
        P: RetryPolicy + 'static,
    {
        // Pending batch channel (Wallet → Submission)
        let (pending_producer, pending_consumer) =
            RingBuffer::<PendingBatch>::new(PENDING_RING_BUFFER_SIZE);
        // Adoption channel (Chain adoption → Submission)
        let (confirmed_producer, confirmed_consumer) =
            RingBuffer::<ConfirmedNotification>::new(RING_BUFFER_SIZE);
        // Slot tick channel (Clock → Submission)
        let (tick_producer, tick_consumer) = RingBuffer::<SlotTick>::new(RING_BUFFER_SIZE);
        // Broadcast channel (Submission → Diffusion)
        let (transmit_producer, transmit_consumer) =
            RingBuffer::<TransmitBatch>::new(RING_BUFFER_SIZE);
        // Eviction channel (Submission → Host)
        let (evicted_producer, evicted_consumer) =
            RingBuffer::<EvictedNotification>::new(RING_BUFFER_SIZE);
        let shutdown_clone = Arc::clone(&shutdown);
        let logger_clone = logger.clone();
        let handle = thread::Builder::new()
            .name("submission".into())
            .spawn(move || {
                submission_loop(
                    policy,
                    pending_consumer,
                    confirmed_consumer,
                    tick_consumer,
                    transmit_producer,
                    evicted_producer,
                    shutdown_clone,
                    logger_clone,
                );
            })
            .expect("Failed to spawn submission thread");
        let channels = SubmissionChannels {
            pending_producer,
            confirmed_producer,
            tick_producer,
            transmit_consumer,
            evicted_consumer,
        };
        (
            Self {
                handle: Some(handle),
                shutdown,
            },
            channels,
        )
    }

    /// Signals shutdown and waits for the thread to terminate.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Returns true if the service is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SubmissionService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Transmit capability that pushes due batches to the host's diffusion layer.
pub struct ChannelTransmit {
    producer: Producer<TransmitBatch>,
    shutdown: Arc<AtomicBool>,
}

impl ChannelTransmit {
    /// Wraps a producer endpoint, aborting backpressure waits on shutdown.
    pub fn new(producer: Producer<TransmitBatch>, shutdown: Arc<AtomicBool>) -> Self {
        Self { producer, shutdown }
    }
}

impl Transmit for ChannelTransmit {
    fn transmit(&mut self, txs: &[Arc<TxAux>]) {
        let batch = TransmitBatch { txs: txs.to_vec() };
        push_with_backpressure(&mut self.producer, batch, &self.shutdown);
    }
}

/// Main submission event loop.
fn submission_loop<P>(
    policy: P,
    mut pending_consumer: Consumer<PendingBatch>,
    mut confirmed_consumer: Consumer<ConfirmedNotification>,
    mut tick_consumer: Consumer<SlotTick>,
    transmit_producer: Producer<TransmitBatch>,
    mut evicted_producer: Producer<EvictedNotification>,
    shutdown: Arc<AtomicBool>,
    logger: Logger,
) where
    P: RetryPolicy + 'static,
{
    let transmit = ChannelTransmit::new(transmit_producer, Arc::clone(&shutdown));
    let mut scheduler = Scheduler::new(Box::new(DefaultResubmission::new(transmit, policy)));
    let mut idle_count = 0_u32;
    let mut stats_interval = std::time::Instant::now();

    // Statistics
    let mut stats_batches = 0u64;
    let mut stats_txs_announced = 0u64;
    let mut stats_evicted = 0u64;
    let mut stats_tick_errors = 0u64;

    slog::info!(logger, "Submission service started");

    while !shutdown.load(Ordering::Acquire) {
        let mut did_work = false;

        // Priority 1: adoption notifications free dependents waiting in the
        // nursery, so apply them before the next tick.
        while let Ok(notif) = confirmed_consumer.pop() {
            did_work = true;
            scheduler.rem_pending(&notif.ids);
            slog::debug!(
            logger,
            "Removed confirmed transactions";
            "removed_count" => notif.ids.len(),
            "pending_size" => scheduler.pending().len(),
            );
        }

        // Priority 2: announce new batches (quota-limited)
        for _ in 0..BATCH_PROCESS_QUOTA {
            match pending_consumer.pop() {
                Ok(batch) => {
                    did_work = true;
                    let tx_count = batch.txs.len();
                    scheduler.add_pending(Pendings::from_iter(batch.txs));
                    stats_batches += 1;
                    stats_txs_announced += tx_count as u64;
                    slog::debug!(
                    logger,
                    "Pending batch announced";
                    "tx_count" => tx_count,
                    "pending_size" => scheduler.pending().len(),
                    );
                }
                Err(_) => break,
            }
        }

        // Priority 3: process slot ticks
        while let Ok(SlotTick) = tick_consumer.pop() {
            did_work = true;
            let slot = scheduler.current_slot();
            match scheduler.tick() {
                Ok(evicted) => {
                    if !evicted.is_empty() {
                        stats_evicted += evicted.len() as u64;
                        slog::info!(
                        logger,
                        "Evicted unconfirmed transactions";
                        "slot" => %slot,
                        "evicted_count" => evicted.len(),
                        "first" => evicted[0].short(),
                        );
                        let notif = EvictedNotification {
                            slot,
                            ids: evicted,
                        };
                        push_with_backpressure(&mut evicted_producer, notif, &shutdown);
                    }
                }
                Err(e) => {
                    // The tick left the scheduler untouched; the host gets
                    // another chance after it resolves the cycle.
                    stats_tick_errors += 1;
                    slog::error!(
                    logger,
                    "Tick aborted";
                    "slot" => %slot,
                    "error" => %e,
                    );
                }
            }
        }

        // Periodic stats logging
        if stats_interval.elapsed() >= std::time::Duration::from_secs(30) {
            slog::info!(
            logger,
            "Submission stats";
            "slot" => %scheduler.current_slot(),
            "pending_size" => scheduler.pending().len(),
            "scheduled_slots" => scheduler.schedule().scheduled_slots(),
            "nursery_size" => scheduler.schedule().nursery().len(),
            "batches_announced" => stats_batches,
            "txs_announced" => stats_txs_announced,
            "total_evicted" => stats_evicted,
            "tick_errors" => stats_tick_errors,
            );
            stats_interval = std::time::Instant::now();
        }

        // Progressive backoff when idle
        if did_work {
            idle_count = 0;
        } else {
            idle_count = idle_count.saturating_add(1);
            if idle_count < 10 {
                std::hint::spin_loop();
            } else if idle_count < 100 {
                std::thread::yield_now();
            } else {
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
        }
    }

    slog::info!(
        logger,
        "Submission service shutting down";
        "slot" => %scheduler.current_slot(),
        "pending_size" => scheduler.pending().len(),
        "batches_announced" => stats_batches,
        "total_evicted" => stats_evicted,
        "tick_errors" => stats_tick_errors,
    );
}

/// Push a value with backpressure handling.
fn push_with_backpressure<T>(producer: &mut Producer<T>, value: T, shutdown: &Arc<AtomicBool>) {
    let mut value = value;
    loop {
        match producer.push(value) {
            Ok(()) => break,
            Err(rtrb::PushError::Full(returned)) => {
                if shutdown.load(Ordering::Acquire) {
                    return;
                }
                std::thread::yield_now();
                value = returned;
            }
        }
    }
}
