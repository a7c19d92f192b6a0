mod model;

pub use model::ThrottleDecision;

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::{mapref::entry::Entry, DashMap};
use teloxide::types::UserId;
use tokio::task::JoinHandle;

/// One accepted print per user per window. Entries live in memory only.
#[derive(Clone)]
pub struct RateLimitService {
    last_print: Arc<DashMap<UserId, Instant>>,
    window: Duration,
}

impl RateLimitService {
    pub fn new(window_secs: u64) -> Self {
        Self {
            last_print: Arc::new(DashMap::new()),
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records `now` for `user` when allowed. A denied attempt leaves the stored time untouched.
    pub fn check(&self, user: UserId, now: Instant) -> ThrottleDecision {
        if self.window.is_zero() {
            return ThrottleDecision::Allowed;
        }

        // entry() holds the shard lock, so two concurrent checks cannot both pass
        match self.last_print.entry(user) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed < self.window {
                    return ThrottleDecision::Denied {
                        remaining: self.window - elapsed,
                    };
                }
                entry.insert(now);
                ThrottleDecision::Allowed
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                ThrottleDecision::Allowed
            }
        }
    }

    /// Drops users whose window has passed. Returns how many were evicted.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.last_print.len();
        self.last_print
            .retain(|_, last| now.saturating_duration_since(*last) < self.window);
        before - self.last_print.len()
    }

    pub fn tracked_users(&self) -> usize {
        self.last_print.len()
    }

    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = service.sweep(Instant::now());
                if evicted > 0 {
                    debug!(
                        "Rate limit sweep evicted {} users, {} still tracked",
                        evicted,
                        service.tracked_users()
                    );
                }
            }
        })
    }
}
