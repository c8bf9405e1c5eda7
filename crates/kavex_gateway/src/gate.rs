//! One-shot readiness barrier with an ordered pending queue.
//!
//! Until the directory is populated, relay work cannot be processed. Items
//! submitted before the readiness signal are appended to a single FIFO queue
//! (arrival order across all links). The first queued item schedules exactly
//! one flush task for the lifetime of the gate; that task waits for readiness,
//! replays the queue through the normal processing path, and only then opens
//! the gate for direct processing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;
use tracing::{debug, info};

/// Processing step run for every item passing the gate.
#[async_trait]
pub trait PendingProcessor<T: Send + 'static>: Send + Sync {
    /// Process one item. Failures are handled (logged) inside.
    async fn process(&self, item: T);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Not ready, items are queued
    Buffering,
    /// Ready, the flush task is replaying the queue
    Draining,
    /// Queue drained, items bypass it
    Open,
}

struct GateState<T> {
    phase: Phase,
    ready: bool,
    flush_scheduled: bool,
    queue: VecDeque<T>,
}

enum Admission<T> {
    Direct(T),
    Queued { schedule_flush: bool },
}

/// Readiness gate in front of a [`PendingProcessor`].
pub struct ReadinessGate<T: Send + 'static> {
    state: Mutex<GateState<T>>,
    ready_tx: watch::Sender<bool>,
    open_tx: watch::Sender<bool>,
    flushes: AtomicUsize,
    processor: Arc<dyn PendingProcessor<T>>,
}

impl<T: Send + 'static> ReadinessGate<T> {
    /// Create a closed gate.
    pub fn new(processor: Arc<dyn PendingProcessor<T>>) -> Arc<Self> {
        let (ready_tx, _) = watch::channel(false);
        let (open_tx, _) = watch::channel(false);
        Arc::new(Self {
            state: Mutex::new(GateState {
                phase: Phase::Buffering,
                ready: false,
                flush_scheduled: false,
                queue: VecDeque::new(),
            }),
            ready_tx,
            open_tx,
            flushes: AtomicUsize::new(0),
            processor,
        })
    }

    /// Process `item` now if the gate is open, otherwise queue it.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn submit(self: &Arc<Self>, item: T) {
        let admission = {
            let mut state = self.state.lock();
            if state.phase == Phase::Open {
                Admission::Direct(item)
            } else {
                state.queue.push_back(item);
                let schedule_flush = !state.flush_scheduled;
                state.flush_scheduled = true;
                Admission::Queued { schedule_flush }
            }
        };

        match admission {
            Admission::Direct(item) => self.processor.process(item).await,
            Admission::Queued { schedule_flush: true } => {
                self.flushes.fetch_add(1, Ordering::SeqCst);
                debug!("Scheduling pending queue flush");
                let gate = Arc::clone(self);
                tokio::spawn(async move { gate.flush().await });
            }
            Admission::Queued { .. } => {}
        }
    }

    /// Fire the readiness signal. Later calls are no-ops.
    pub fn mark_ready(&self) {
        {
            let mut state = self.state.lock();
            if state.ready {
                debug!("Readiness already signalled");
                return;
            }
            state.ready = true;
            if state.flush_scheduled {
                state.phase = Phase::Draining;
            } else {
                state.phase = Phase::Open;
                self.open_tx.send_replace(true);
            }
        }
        info!("Directory ready");
        self.ready_tx.send_replace(true);
    }

    async fn flush(self: Arc<Self>) {
        let mut ready_rx = self.ready_tx.subscribe();
        let ready = ready_rx.wait_for(|ready| *ready).await.is_ok();
        if !ready {
            return;
        }

        let mut replayed = 0usize;
        loop {
            let next = {
                let mut state = self.state.lock();
                match state.queue.pop_front() {
                    Some(item) => Some(item),
                    None => {
                        state.phase = Phase::Open;
                        None
                    }
                }
            };
            let Some(item) = next else { break };
            self.processor.process(item).await;
            replayed += 1;
        }

        self.open_tx.send_replace(true);
        info!(replayed, "Pending queue drained");
    }

    /// Wait until the gate has opened (readiness fired and the queue drained).
    pub async fn opened(&self) {
        let mut open_rx = self.open_tx.subscribe();
        // The sender lives in `self`, so this only returns once open.
        let _ = open_rx.wait_for(|open| *open).await;
    }

    /// Whether the readiness signal has fired.
    pub fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    /// Whether new items bypass the queue.
    pub fn is_open(&self) -> bool {
        self.state.lock().phase == Phase::Open
    }

    /// Items waiting in the queue.
    pub fn pending_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Flush tasks ever scheduled (0 or 1).
    pub fn flushes_scheduled(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}
