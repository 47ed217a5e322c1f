//! Lifecycle and progress events emitted by a sort run.
//!
//! The event channel is a thin wrapper around crossbeam-channel so any
//! front end (CLI, GUI, tests) can observe a run without the core knowing
//! about it. Sends never fail: a dropped receiver just discards events.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSummary {
    /// Eligible files found in the source tree
    pub total: usize,
    /// Files successfully sorted (or planned, in a dry run)
    pub sorted: usize,
    /// Files that failed and were skipped
    pub failed: usize,
}

/// Events emitted by [`crate::sorter::Sorter::run`], in order:
/// one `Started`, then one `Sorted` or `Failed` per file, then exactly one
/// terminal `Completed` or `Cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SortEvent {
    /// The run started; `total` eligible files will be processed
    Started { total: usize },
    /// One file was sorted (or its destination planned, in a dry run)
    Sorted {
        source: PathBuf,
        destination: PathBuf,
        /// Integer progress 0-100
        percent: u8,
    },
    /// One file failed; the run continues
    Failed { source: PathBuf, message: String },
    /// The run finished normally
    Completed { summary: SortSummary },
    /// The run was cancelled at a file boundary; nothing is rolled back
    Cancelled { summary: SortSummary },
}

/// Sends events from a sort run. Clone freely across threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<SortEvent>,
}

impl EventSender {
    /// Send an event, discarding it silently if the receiver is gone
    pub fn send(&self, event: SortEvent) {
        let _ = self.inner.send(event);
    }
}

/// Receives events from a sort run
pub struct EventReceiver {
    inner: Receiver<SortEvent>,
}

impl EventReceiver {
    /// Block until the next event, or None once the sender is dropped
    pub fn recv(&self) -> Option<SortEvent> {
        self.inner.recv().ok()
    }

    /// Receive without blocking
    pub fn try_recv(&self) -> Option<SortEvent> {
        self.inner.try_recv().ok()
    }

    /// Iterate over events until the sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = SortEvent> + '_ {
        self.inner.iter()
    }
}

/// Factory for event channel endpoints
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; events are small, this is the usual choice
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }

    /// Bounded channel for callers that want backpressure
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender with no receiver, for callers that don't observe progress
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
