/// Engine shell — the exclusion boundary between the producer and
/// consumer roles.
///
/// The producer (radio/bus driver callback, possibly ISR context)
/// classifies raw observations and hands the resulting events in,
/// either directly via [`Engine::ingest`] or through the bounded
/// [`IngestQueue`] with `try_send` (non-blocking, drops when full).
/// The consumer is a fixed-period loop calling [`Engine::pump`] and
/// [`Engine::run_cycle`], then reading the facade.
///
/// All store access goes through one `critical_section::Mutex`, so a
/// sequence of ingests applies atomically and in arrival order, the
/// consumer never observes a torn record, and `run_cycle` holds the
/// section across its whole evaluate-then-reset sequence: a concurrent
/// ingest lands entirely before or entirely after it, never in
/// between. Every operation here completes in bounded time.
///
/// Stopping a detector: call [`Engine::shutdown`], stop the capture
/// source, then [`Engine::drain`] the queue. After that no ingest can
/// land and the engine may be dropped. An ingest arriving after
/// shutdown is a programmer error in the integration and is reported
/// as [`Error::ProducerStillActive`].
use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};

use crate::alert::{self, AlertVec};
use crate::config::Thresholds;
use crate::error::Error;
use crate::event::{Event, Ticks};
use crate::store::Store;
use crate::view::{self, Detail, Key, ListVec};

/// Depth of the ISR-to-consumer event queue.
pub const INGEST_QUEUE_DEPTH: usize = 32;

/// Suggested consumer cadence between `run_cycle` calls, milliseconds.
pub const DEFAULT_CYCLE_MS: u64 = 1_000;

/// Bounded queue for events produced in a different execution context
/// than the consumer. Producers use `try_send`; a full queue drops the
/// observation rather than blocking.
pub type IngestQueue = Channel<CriticalSectionRawMutex, Event, INGEST_QUEUE_DEPTH>;

pub type IngestReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, Event, INGEST_QUEUE_DEPTH>;

struct EngineState {
    store: Store,
    thresholds: Thresholds,
}

/// What one consumer cycle produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub alerts: AlertVec,
    /// Change token taken after the reset, for `changed_since`.
    pub token: u32,
}

/// The shared detection engine. `const`-constructible so integrations
/// can keep it in a `static`.
pub struct Engine {
    state: Mutex<RefCell<EngineState>>,
    stopped: AtomicBool,
    /// Observations the classifier rejected (diagnostic only).
    malformed: AtomicU32,
}

impl Engine {
    pub const fn new(thresholds: Thresholds) -> Self {
        Self {
            state: Mutex::new(RefCell::new(EngineState {
                store: Store::new(),
                thresholds,
            })),
            stopped: AtomicBool::new(false),
            malformed: AtomicU32::new(0),
        }
    }

    // ── Producer side ───────────────────────────────────────────────

    /// Apply one event. Bounded time, safe from the capture context.
    pub fn ingest(&self, event: Event) -> Result<(), Error> {
        if self.stopped.load(Ordering::Acquire) {
            log::warn!("ingest after shutdown; producer not stopped");
            return Err(Error::ProducerStillActive);
        }
        critical_section::with(|cs| {
            self.state.borrow(cs).borrow_mut().store.ingest(event);
        });
        Ok(())
    }

    /// Record an observation the classifier dropped as malformed.
    pub fn note_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn malformed_dropped(&self) -> u32 {
        self.malformed.load(Ordering::Relaxed)
    }

    // ── Consumer side ───────────────────────────────────────────────

    /// Drain queued producer events into the store, in arrival order.
    /// Returns how many were applied.
    pub fn pump(&self, rx: &IngestReceiver<'_>) -> usize {
        let mut applied = 0;
        while let Ok(event) = rx.try_receive() {
            if self.ingest(event).is_err() {
                break;
            }
            applied += 1;
        }
        applied
    }

    /// Cycle boundary: evaluate the window that just closed, then
    /// reset per-cycle counters for the next one, as one atomic step.
    /// An event ingested concurrently lands either before the
    /// evaluation (counted in the closing window) or after the reset
    /// (counted in the new one) — never lost in between.
    pub fn run_cycle(&self, now: Ticks) -> CycleReport {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            let state = &mut *state;
            let alerts = alert::evaluate(&mut state.store, &state.thresholds);
            state.store.begin_cycle(now);
            CycleReport {
                alerts,
                token: state.store.snapshot_token(),
            }
        })
    }

    /// Recompute the current alert set without a cycle reset.
    pub fn alerts(&self) -> AlertVec {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            let state = &mut *state;
            alert::evaluate(&mut state.store, &state.thresholds)
        })
    }

    pub fn list_view(&self) -> ListVec {
        critical_section::with(|cs| {
            let state = self.state.borrow(cs).borrow();
            view::list_view(&state.store, &state.thresholds)
        })
    }

    pub fn detail_view(&self, key: &Key) -> Result<Detail, Error> {
        critical_section::with(|cs| {
            let state = self.state.borrow(cs).borrow();
            view::detail_view(&state.store, key)
        })
    }

    pub fn changed_since(&self, token: u32) -> bool {
        critical_section::with(|cs| self.state.borrow(cs).borrow().store.changed_since(token))
    }

    pub fn snapshot_token(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow(cs).borrow().store.snapshot_token())
    }

    pub fn usb_disconnected(&self) {
        critical_section::with(|cs| {
            self.state.borrow(cs).borrow_mut().store.usb_disconnected();
        });
    }

    // ── Configuration ───────────────────────────────────────────────

    /// Install validated thresholds. Out-of-range values never reach
    /// runtime state.
    pub fn set_thresholds(&self, thresholds: Thresholds) -> Result<(), Error> {
        thresholds.validate()?;
        critical_section::with(|cs| {
            self.state.borrow(cs).borrow_mut().thresholds = thresholds;
        });
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        critical_section::with(|cs| self.state.borrow(cs).borrow().thresholds)
    }

    // ── Shutdown ────────────────────────────────────────────────────

    /// Stop accepting producer ingests. The caller must also stop the
    /// capture source, then [`Engine::drain`] the queue.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::Release);
        log::info!("detection engine shut down");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Apply events that were already queued when `shutdown` was
    /// called, then leave the queue empty. Returns how many were
    /// applied. After this returns the engine holds no pending work.
    pub fn drain(&self, rx: &IngestReceiver<'_>) -> usize {
        let mut applied = 0;
        while let Ok(event) = rx.try_receive() {
            critical_section::with(|cs| {
                self.state.borrow(cs).borrow_mut().store.ingest(event);
            });
            applied += 1;
        }
        applied
    }
}
