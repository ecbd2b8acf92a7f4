// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A thread-safe handle over one [`BankerState`].
//!
//! The whole state is a single unit of mutual exclusion. `request`, `release`
//! and `relinquish` hold the write lock from start to finish, so nobody can
//! observe a tentative grant before it is committed or rolled back. Reads of
//! committed state share the read lock.
//!
//! # Waiting
//! The base operations never block: a request that cannot be satisfied yet
//! comes back as `MustWait` or `Unsafe`. [`SharedBanker::acquire`] layers a
//! retry policy on top, re-trying the request every time some process hands
//! resources back, until it is granted or a timeout expires.

use crate::{
    BankerError, BankerState, DecisionStats, RequestOutcome, SafetyReport, StateSnapshot, Units,
};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::Notify;

/// Shared between all clones of a [`SharedBanker`].
struct Inner {
    state: RwLock<BankerState>,
    /// Statistics (behind a Mutex since they are updated after the state lock is dropped).
    stats: Mutex<DecisionStats>,
    /// Signalled whenever units return to Available.
    returned: Notify,
}

/// Cloneable, `Send + Sync` handle to one allocator.
///
/// # Example
/// ```
/// use banker::{BankerState, SharedBanker};
///
/// let state = BankerState::initialize(vec![2], vec![vec![2], vec![1]], vec![vec![0], vec![0]]).unwrap();
/// let banker = SharedBanker::new(state);
///
/// let worker = banker.clone();
/// std::thread::spawn(move || worker.request(1, &[1]).unwrap())
///     .join()
///     .unwrap();
///
/// assert_eq!(banker.available().unwrap(), vec![1]);
/// assert_eq!(banker.stats().granted, 1);
/// ```
#[derive(Clone)]
pub struct SharedBanker {
    inner: Arc<Inner>,
}

impl SharedBanker {
    /// Takes ownership of `state`.
    pub fn new(state: BankerState) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                stats: Mutex::new(DecisionStats::default()),
                returned: Notify::new(),
            }),
        }
    }

    /// [`BankerState::request`] under the write lock.
    pub fn request(&self, pid: usize, req: &[Units]) -> Result<RequestOutcome, BankerError> {
        let result = {
            let mut state = self
                .inner
                .state
                .write()
                .map_err(|_| BankerError::StatePoisoned)?;
            state.request(pid, req)
        };

        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_request(&result);
        }
        result
    }

    /// [`BankerState::release`] under the write lock. Wakes waiting
    /// [`acquire`](Self::acquire) calls.
    pub fn release(&self, pid: usize) -> Result<Vec<Units>, BankerError> {
        let returned = {
            let mut state = self
                .inner
                .state
                .write()
                .map_err(|_| BankerError::StatePoisoned)?;
            state.release(pid)?
        };

        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_release();
        }
        self.inner.returned.notify_waiters();
        Ok(returned)
    }

    /// [`BankerState::relinquish`] under the write lock. Wakes waiting
    /// [`acquire`](Self::acquire) calls.
    pub fn relinquish(&self, pid: usize) -> Result<Vec<Units>, BankerError> {
        let returned = {
            let mut state = self
                .inner
                .state
                .write()
                .map_err(|_| BankerError::StatePoisoned)?;
            state.relinquish(pid)?
        };

        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_relinquish();
        }
        self.inner.returned.notify_waiters();
        Ok(returned)
    }

    /// [`BankerState::find_safe_sequence`] under the read lock.
    pub fn find_safe_sequence(&self) -> Result<SafetyReport, BankerError> {
        let report = self
            .inner
            .state
            .read()
            .map_err(|_| BankerError::StatePoisoned)?
            .find_safe_sequence();

        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_safety_check();
        }
        Ok(report)
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> Result<StateSnapshot, BankerError> {
        Ok(self
            .inner
            .state
            .read()
            .map_err(|_| BankerError::StatePoisoned)?
            .snapshot())
    }

    /// Copy of the committed Available vector.
    pub fn available(&self) -> Result<Vec<Units>, BankerError> {
        Ok(self
            .inner
            .state
            .read()
            .map_err(|_| BankerError::StatePoisoned)?
            .available()
            .to_vec())
    }

    /// Returns a snapshot of decision statistics.
    pub fn stats(&self) -> DecisionStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Requests `req` for `pid`, retrying whenever resources are returned,
    /// until the request is granted or `timeout` elapses.
    ///
    /// Returns the safe sequence of the committed state. Client errors
    /// (for example [`BankerError::ExceedsDeclaredNeed`]) are returned
    /// immediately; they would never succeed on retry.
    pub async fn acquire(
        &self,
        pid: usize,
        req: &[Units],
        timeout: Duration,
    ) -> Result<Vec<usize>, BankerError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            // Register interest before trying, so a release that lands between
            // the attempt and the await is not missed.
            let mut notified = std::pin::pin!(self.inner.returned.notified());
            notified.as_mut().enable();

            match self.request(pid, req)? {
                RequestOutcome::Granted { sequence } => return Ok(sequence),
                outcome => {
                    tracing::debug!(pid, outcome = outcome.label(), "waiting for resources");
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                tracing::warn!(pid, ?timeout, "gave up waiting for resources");
                return Err(BankerError::Timeout {
                    pid,
                    waited: timeout,
                });
            }
        }
    }
}

impl std::fmt::Debug for SharedBanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("SharedBanker");
        match self.inner.state.read() {
            Ok(state) => d
                .field("processes", &state.num_processes())
                .field("available", &state.available()),
            Err(_) => d.field("state", &"<poisoned>"),
        };
        d.finish()
    }
}
