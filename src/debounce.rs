//! One parameterized debounce utility shared by every text filter.
//!
//! The original system duplicated the same delayed-dispatch logic per input
//! box; here a single [`Debouncer`] tracks a pending value per channel key.
//! Time is passed in explicitly so tests never sleep.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default settle delay for filter keystrokes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug)]
struct Pending {
    text: String,
    deadline: Instant,
}

/// Tracks the latest submitted value per channel and releases it once the
/// channel has been quiet for the configured delay.
#[derive(Debug)]
pub struct Debouncer<K> {
    delay: Duration,
    pending: HashMap<K, Pending>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Record a keystroke on `key`. Any value already pending on the same key
    /// is replaced and its deadline pushed out.
    pub fn submit(&mut self, key: K, text: impl Into<String>, now: Instant) {
        self.pending.insert(
            key,
            Pending {
                text: text.into(),
                deadline: now + self.delay,
            },
        );
    }

    /// Drop whatever is pending on `key` without releasing it.
    pub fn cancel(&mut self, key: &K) {
        self.pending.remove(key);
    }

    /// Release every channel whose settle deadline has passed.
    pub fn ready(&mut self, now: Instant) -> Vec<(K, String)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        due.into_iter()
            .filter_map(|key| {
                self.pending
                    .remove(&key)
                    .map(|pending| (key, pending.text))
            })
            .collect()
    }

    /// Earliest deadline among pending channels, for callers that sleep until
    /// the next poll.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.deadline).min()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases_after_delay() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.submit("agency", "alm", start);
        assert!(debouncer.ready(start + Duration::from_millis(299)).is_empty());
        let released = debouncer.ready(start + Duration::from_millis(300));
        assert_eq!(released, vec![("agency", "alm".to_string())]);
        assert!(debouncer.is_idle());
    }

    #[test]
    fn newer_keystroke_replaces_and_extends() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.submit("agency", "al", start);
        debouncer.submit("agency", "alm", start + Duration::from_millis(200));
        assert!(debouncer.ready(start + Duration::from_millis(400)).is_empty());
        let released = debouncer.ready(start + Duration::from_millis(500));
        assert_eq!(released, vec![("agency", "alm".to_string())]);
    }

    #[test]
    fn channels_settle_independently() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.submit("agency", "alm", start);
        debouncer.submit("sector", "pat", start + Duration::from_millis(150));
        let mut released = debouncer.ready(start + Duration::from_millis(320));
        assert_eq!(released, vec![("agency", "alm".to_string())]);
        released = debouncer.ready(start + Duration::from_millis(460));
        assert_eq!(released, vec![("sector", "pat".to_string())]);
    }

    #[test]
    fn cancel_discards_pending_value() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.submit("unit", "reit", start);
        debouncer.cancel(&"unit");
        assert!(debouncer.ready(start + Duration::from_millis(301)).is_empty());
    }
}
