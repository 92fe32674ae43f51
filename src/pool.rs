//! Output-container pool.
//!
//! A generator may keep at most `2 × max_jobs` output records alive at
//! once: per job slot, one record in flight downstream and one being
//! filled. The pool hands out leases backed by a bounded channel of
//! tokens; a lease returns its token when dropped.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::error::PoolError;

/// Bounded pool of output-container slots.
#[derive(Debug)]
pub struct OutputPool {
    capacity: usize,
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl OutputPool {
    /// Number of containers a generator needs for `max_jobs` concurrent jobs.
    #[must_use]
    pub const fn instances_required(max_jobs: usize) -> usize {
        max_jobs.saturating_mul(2)
    }

    /// Creates a pool with `capacity` slots (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded::<()>(capacity);
        for _ in 0..capacity {
            if tx.try_send(()).is_err() {
                break;
            }
        }
        Self { capacity, tx, rx }
    }

    /// Creates a pool sized for `max_jobs` concurrent jobs.
    #[must_use]
    pub fn for_max_jobs(max_jobs: usize) -> Self {
        Self::new(Self::instances_required(max_jobs))
    }

    /// Total number of slots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently leased.
    #[must_use]
    pub fn available(&self) -> usize {
        self.rx.len()
    }

    /// Leases a slot without blocking.
    ///
    /// # Errors
    /// `PoolError::Exhausted` if every slot is leased.
    pub fn try_acquire(&self) -> Result<PoolLease, PoolError> {
        match self.rx.try_recv() {
            Ok(()) => Ok(self.lease()),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Err(PoolError::Exhausted {
                capacity: self.capacity,
            }),
        }
    }

    /// Leases a slot, waiting up to `timeout` for one to be released.
    ///
    /// # Errors
    /// `PoolError::Exhausted` if no slot frees up in time.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<PoolLease, PoolError> {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => Ok(self.lease()),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                Err(PoolError::Exhausted {
                    capacity: self.capacity,
                })
            }
        }
    }

    fn lease(&self) -> PoolLease {
        PoolLease {
            tx: self.tx.clone(),
        }
    }
}

/// A leased pool slot, returned to the pool on drop.
#[derive(Debug)]
pub struct PoolLease {
    tx: Sender<()>,
}

impl Drop for PoolLease {
    fn drop(&mut self) {
        // Cannot be full: every token in circulation came out of this channel.
        let _ = self.tx.try_send(());
    }
}
