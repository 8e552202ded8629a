//! Latest-wins debouncing for asynchronous work.
//!
//! Every change issues a [`Ticket`] carrying a generation number taken from a
//! shared, monotonically increasing counter. A ticket is *current* while no newer
//! ticket has been issued. Work that waits out the quiet period with
//! [`Ticket::settle`] and then checks [`Ticket::is_current`] after each await
//! gets debounce semantics for free: a burst of changes leaves only the last
//! ticket current, so only the trailing change does any work, and a completion
//! from an older cycle can always be recognised and dropped.
//!
//! Nothing here aborts work that has already started; cancellation is
//! cooperative and relies on callers checking the ticket.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Hands out tickets for one stream of changes.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Debouncer {
        Debouncer {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start a new generation, making every earlier ticket stale.
    pub fn issue(&self) -> Ticket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        Ticket {
            generation,
            delay: self.delay,
            latest: self.latest.clone(),
        }
    }

    /// Make every outstanding ticket stale without starting new work.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }

    /// The generation of the most recently issued ticket.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}

/// One scheduled unit of work.
#[derive(Clone, Debug)]
pub struct Ticket {
    generation: u64,
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }

    /// Wait out the quiet period. Returns `false` if a newer ticket was issued in
    /// the meantime, in which case the caller should do nothing.
    pub async fn settle(&self) -> bool {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.is_current()
    }
}
