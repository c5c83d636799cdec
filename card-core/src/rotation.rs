//! Testimonial rotation.
//!
//! [`Rotation`] is the state machine: `Idle` while there is at most one
//! review, `Rotating` otherwise, advancing one review per tick.
//! [`RotationTimer`] drives it on a tokio interval and is cancelled when
//! stopped or dropped, so a discarded view never leaks a timer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default time between testimonial advances.
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_millis(4000);

/// Rotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Rotation {
    /// At most one review; nothing to rotate.
    #[default]
    Idle,
    /// Cycling through `len` reviews.
    Rotating {
        /// Currently shown review, in `0..len`.
        index: usize,
        /// Number of reviews.
        len: usize,
    },
}

impl Rotation {
    /// Initial state for `len` reviews.
    #[must_use]
    pub fn for_len(len: usize) -> Self {
        Self::Idle.synced(len)
    }

    /// State after the review count changes to `len`.
    ///
    /// Entering `Rotating` starts at index 0; staying in `Rotating` keeps the
    /// index when it is still in range and resets it otherwise.
    #[must_use]
    pub fn synced(self, len: usize) -> Self {
        if len <= 1 {
            return Self::Idle;
        }
        match self {
            Self::Rotating { index, .. } if index < len => Self::Rotating { index, len },
            _ => Self::Rotating { index: 0, len },
        }
    }

    /// Update the review count in place.
    pub fn sync(&mut self, len: usize) {
        *self = self.synced(len);
    }

    /// Advance to the next review, wrapping around. No-op when idle.
    pub fn tick(&mut self) {
        if let Self::Rotating { index, len } = self {
            *index = (*index + 1) % *len;
        }
    }

    /// Currently shown review (0 when idle).
    #[must_use]
    pub fn current_index(&self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Rotating { index, .. } => *index,
        }
    }

    /// Check whether a timer should be armed.
    #[must_use]
    pub fn is_rotating(&self) -> bool {
        matches!(self, Self::Rotating { .. })
    }
}

/// Shortest tick a [`RotationTimer`] accepts; tokio intervals must be non-zero.
pub const MIN_ROTATION_INTERVAL: Duration = Duration::from_millis(1);

/// A running rotation timer.
///
/// The timer task is aborted on [`RotationTimer::stop`] or when the value is
/// dropped. Must be started from within a tokio runtime.
#[derive(Debug)]
pub struct RotationTimer {
    handle: JoinHandle<()>,
    index: watch::Receiver<usize>,
}

impl RotationTimer {
    /// Arm a timer for `len` reviews ticking every `interval`.
    ///
    /// Returns `None` when `len <= 1`: no timer is armed in the idle state.
    /// Intervals shorter than [`MIN_ROTATION_INTERVAL`] are raised to it.
    #[must_use]
    pub fn start(len: usize, interval: Duration) -> Option<Self> {
        let interval = interval.max(MIN_ROTATION_INTERVAL);
        let mut rotation = Rotation::for_len(len);
        if !rotation.is_rotating() {
            return None;
        }

        let (tx, rx) = watch::channel(rotation.current_index());
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                rotation.tick();
                if tx.send(rotation.current_index()).is_err() {
                    break;
                }
            }
        });
        tracing::debug!(len, interval = ?interval, "Rotation timer armed");

        Some(Self { handle, index: rx })
    }

    /// Index most recently published by the timer.
    #[must_use]
    pub fn current_index(&self) -> usize {
        *self.index.borrow()
    }

    /// Subscribe to index changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.index.clone()
    }

    /// Cancel the timer.
    pub fn stop(self) {
        // Drop aborts the task.
    }
}

impl Drop for RotationTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
