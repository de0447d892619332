use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info};

use crate::metrics::THROTTLE_ENTRIES;

// Outcome of one throttle check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Rejected,
}

/// Per-address minimum-interval throttle.
///
/// Remembers when each client address was last let through. A request that
/// arrives sooner than `min_interval` after that is rejected and leaves the
/// stored instant untouched.
pub struct Throttle {
    last_seen: DashMap<String, Instant>,
    min_interval: Duration,
    ttl: Duration,
}

impl Throttle {
    pub fn new(min_interval: Duration, ttl: Duration) -> Self {
        Self {
            last_seen: DashMap::new(),
            min_interval,
            // an entry must outlive the interval it enforces
            ttl: ttl.max(min_interval),
        }
    }

    pub fn check(&self, address: &str) -> Decision {
        self.check_at(address, Instant::now())
    }

    // Check-and-update runs under the entry's shard lock, so two racing
    // requests from one address cannot both pass.
    pub fn check_at(&self, address: &str, now: Instant) -> Decision {
        match self.last_seen.entry(address.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(now);
                Decision::Allowed
            }
            Entry::Occupied(mut slot) => {
                let elapsed = now.saturating_duration_since(*slot.get());
                if elapsed < self.min_interval {
                    return Decision::Rejected;
                }
                *slot.get_mut() = now;
                Decision::Allowed
            }
        }
    }

    pub fn last_seen(&self, address: &str) -> Option<Instant> {
        self.last_seen.get(address).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    /// Drops every address idle for at least the TTL, returns how many went.
    pub fn evict_stale(&self, now: Instant) -> usize {
        let before = self.last_seen.len();
        self.last_seen
            .retain(|_, seen| now.saturating_duration_since(*seen) < self.ttl);
        before.saturating_sub(self.last_seen.len())
    }
}

// Sweeper - runs forever, evicting idle addresses
pub async fn throttle_sweeper(throttle: Arc<Throttle>, every: Duration) {
    let mut interval = interval(every);

    info!(?every, "throttle sweeper started");

    loop {
        interval.tick().await;

        let evicted = throttle.evict_stale(Instant::now());
        let remaining = throttle.len();
        THROTTLE_ENTRIES.set(remaining as f64);

        if evicted > 0 {
            debug!(evicted, remaining, "evicted stale throttle entries");
        }
    }
}
