// src/utils/rate_limit.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Sliding-window attempt counter guarding sign-in calls.
///
/// Keyed by an opaque identifier (the submitted email). The store is owned
/// by [`crate::state::AppState`] and injected where needed, so tests can
/// construct their own instance and the map is never ambient module state.
/// It is still per-process: a multi-instance deployment would count
/// attempts independently on each instance.
#[derive(Clone)]
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    max_tracked: usize,
    entries: Arc<Mutex<HashMap<String, AttemptWindow>>>,
}

struct AttemptWindow {
    attempts: u32,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration, max_tracked: usize) -> Self {
        Self {
            max_attempts,
            window,
            max_tracked,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Records one attempt for `identifier` and reports whether it is blocked.
    ///
    /// Returns `true` when the identifier has exhausted its attempts for the
    /// current window; blocked checks do not consume further attempts.
    pub fn check(&self, identifier: &str) -> bool {
        self.check_at(identifier, Instant::now())
    }

    fn check_at(&self, identifier: &str, now: Instant) -> bool {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get_mut(identifier) {
            if now.duration_since(entry.window_start) <= self.window {
                if entry.attempts >= self.max_attempts {
                    return true;
                }
                entry.attempts += 1;
                return false;
            }
        }

        // First attempt, or the previous window expired.
        if entries.len() >= self.max_tracked && !entries.contains_key(identifier) {
            self.evict(&mut entries, now);
        }
        entries.insert(
            identifier.to_string(),
            AttemptWindow {
                attempts: 1,
                window_start: now,
            },
        );
        false
    }

    /// Drops expired windows; if everything is still live, drops the oldest.
    fn evict(&self, entries: &mut HashMap<String, AttemptWindow>, now: Instant) {
        entries.retain(|_, e| now.duration_since(e.window_start) <= self.window);

        if entries.len() >= self.max_tracked {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.window_start)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }
    }
}
