//! Stale-response rejection via per-channel monotonic tokens.
//!
//! Every logical request channel (one per facet, one per hierarchy level)
//! carries a counter. Issuing a request bumps the counter and captures the new
//! value; a response is applied only while its captured token is still the
//! channel's current value. Responses that lose the race are discarded, which
//! is the sole ordering mechanism against network reordering.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// A set of independent request channels, each with its own token counter.
#[derive(Debug)]
pub struct RequestGuard {
    channels: Vec<AtomicU64>,
}

impl RequestGuard {
    /// Create a guard with `channels` independent counters, all starting at 0.
    #[must_use]
    pub fn new(channels: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Begin a new request on `channel`, returning the token the eventual
    /// response must present.
    pub fn issue(&self, channel: usize) -> u64 {
        self.channels[channel].fetch_add(1, AtomicOrdering::AcqRel) + 1
    }

    /// Invalidate whatever is in flight on `channel` without starting a new
    /// request. Used when an ancestor change makes pending fetches moot.
    pub fn invalidate(&self, channel: usize) {
        self.channels[channel].fetch_add(1, AtomicOrdering::AcqRel);
    }

    /// The token a response on `channel` would need to carry right now.
    #[must_use]
    pub fn current(&self, channel: usize) -> u64 {
        self.channels[channel].load(AtomicOrdering::Acquire)
    }

    /// Whether `token` still identifies the newest request on `channel`.
    #[must_use]
    pub fn is_current(&self, channel: usize, token: u64) -> bool {
        self.current(channel) == token
    }

    /// Number of channels this guard tracks.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
