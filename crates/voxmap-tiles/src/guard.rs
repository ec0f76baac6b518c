//! Stampede guard: per-tile timestamps of the last render attempt.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::key::TileKey;

/// Window inside which repeated attempts on the same tile are coalesced.
pub const RENDER_GUARD_WINDOW: Duration = Duration::from_millis(250);

/// Last-attempt timestamps on the monotonic clock.
///
/// Purely an optimization; no correctness property depends on it.
pub struct RenderGuard {
    window: Duration,
    last_attempt: Mutex<FxHashMap<TileKey, Instant>>,
}

impl RenderGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_attempt: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records an attempt on `key` now, see [`record_attempt_at`](Self::record_attempt_at).
    pub fn record_attempt(&self, key: &TileKey) -> bool {
        self.record_attempt_at(key, Instant::now())
    }

    /// Returns `false` if the last recorded attempt on `key` is less than one
    /// window before `now`. Otherwise stores `now` and returns `true`.
    pub fn record_attempt_at(&self, key: &TileKey, now: Instant) -> bool {
        let mut last = self
            .last_attempt
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = last.get(key)
            && now.saturating_duration_since(*prev) < self.window
        {
            return false;
        }
        last.insert(key.clone(), now);
        true
    }

    /// Number of tiles with a recorded attempt.
    pub fn len(&self) -> usize {
        self.last_attempt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RenderGuard {
    fn default() -> Self {
        Self::new(RENDER_GUARD_WINDOW)
    }
}
