//! Update scheduling: throttled previews, debounced final passes, and
//! coalesced backend syncs.
//!
//! The source of truth is an explicit state machine driven by "an edit
//! happened" events, not a reactive dependency graph. Timers are plain
//! deadlines that restart on every edit of the same class - last edit wins,
//! stale edits are never partially applied.

use crate::transport::SyncPayload;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Decides when regeneration passes run in response to edits.
///
/// Edits request a low-resolution preview through a throttle window and
/// restart the debounce deadline for the high-resolution final pass.
#[derive(Debug)]
pub struct RegenScheduler {
    throttle: Duration,
    debounce: Duration,
    last_preview: Option<Instant>,
    deadline: Option<Instant>,
}

impl RegenScheduler {
    pub fn new(throttle: Duration, debounce: Duration) -> Self {
        Self {
            throttle,
            debounce,
            last_preview: None,
            deadline: None,
        }
    }

    /// Record an edit at `now`. Returns true when a preview pass should run
    /// immediately; within the throttle window the edit only restarts the
    /// debounce deadline.
    pub fn note_edit(&mut self, now: Instant) -> bool {
        self.deadline = Some(now + self.debounce);
        match self.last_preview {
            Some(previous) if now.duration_since(previous) < self.throttle => false,
            _ => {
                self.last_preview = Some(now);
                true
            }
        }
    }

    /// True when the debounce deadline has passed with no further edits.
    /// Consumes the deadline, so the final pass runs once per quiet period.
    pub fn final_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// The pending final-pass deadline, if any edits are waiting on one.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[derive(Debug, Default)]
struct SyncState {
    in_flight: bool,
    queued: Option<SyncPayload>,
}

/// Coalesces outgoing syncs so at most one request is in flight.
///
/// A request arriving while one is outstanding replaces the single queued
/// slot - only the latest pending state survives - and is handed back by
/// [`SyncChannel::complete`] once the in-flight request finishes. The state
/// sits behind a mutex so a multi-threaded host keeps the single-in-flight
/// invariant.
#[derive(Debug, Default)]
pub struct SyncChannel {
    state: Mutex<SyncState>,
}

impl SyncChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a payload. Returns it back when the channel was idle (the
    /// caller must now send it and later call [`SyncChannel::complete`]);
    /// returns `None` when a request is in flight and the payload was
    /// queued instead.
    pub fn begin(&self, payload: SyncPayload) -> Option<SyncPayload> {
        let mut state = self.state.lock().expect("sync channel poisoned");
        if state.in_flight {
            state.queued = Some(payload);
            None
        } else {
            state.in_flight = true;
            Some(payload)
        }
    }

    /// Mark the in-flight request finished. Returns the queued payload when
    /// one accumulated; the channel then stays in flight and the caller
    /// sends it next.
    pub fn complete(&self) -> Option<SyncPayload> {
        let mut state = self.state.lock().expect("sync channel poisoned");
        match state.queued.take() {
            Some(next) => Some(next),
            None => {
                state.in_flight = false;
                None
            }
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.lock().expect("sync channel poisoned").in_flight
    }

    pub fn has_queued(&self) -> bool {
        self.state.lock().expect("sync channel poisoned").queued.is_some()
    }
}
