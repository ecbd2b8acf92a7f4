// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Request, release and relinquish.
//!
//! A request runs four steps:
//!
//! 1. Every `req[r] <= Need[pid][r]`, or the request is a client error.
//! 2. Every `req[r] <= Available[r]`, or the process must wait.
//! 3. Tentatively grant: `Alloc += req`, `Available -= req`, `Need -= req`.
//! 4. Run the safety check. Safe: keep the grant. Unsafe: undo step 3.
//!
//! Steps 1 and 2 each scan the whole vector before deciding, so a need
//! violation on any resource type wins over a shortfall on any other.

use crate::{BankerError, BankerState, Units};

/// Non-error result of [`BankerState::request`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Committed. `sequence` is the safe completion order of the new state.
    Granted { sequence: Vec<usize> },
    /// Not enough free units right now. State unchanged; retry later.
    /// Reports the first resource type that is short.
    MustWait {
        resource: usize,
        requested: Units,
        available: Units,
    },
    /// Granting would leave no safe completion order. State rolled back.
    /// `partial` is the prefix the safety check managed to build.
    Unsafe { partial: Vec<usize> },
}

impl RequestOutcome {
    /// Whether the request was committed.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Granted { .. } => "granted",
            Self::MustWait { .. } => "must-wait",
            Self::Unsafe { .. } => "unsafe",
        }
    }
}

impl BankerState {
    /// Asks for `req` additional units on behalf of `pid`.
    ///
    /// Only a `Granted` outcome changes the state. `MustWait`, `Unsafe` and
    /// every error leave Available, Alloc and Need exactly as they were.
    ///
    /// # Example
    /// ```
    /// use banker::{BankerState, RequestOutcome};
    ///
    /// let mut state = BankerState::initialize(
    ///     vec![3, 3, 2],
    ///     vec![vec![7, 5, 3], vec![3, 2, 2], vec![9, 0, 2], vec![2, 2, 2], vec![4, 3, 3]],
    ///     vec![vec![0, 1, 0], vec![2, 0, 0], vec![3, 0, 2], vec![2, 1, 1], vec![0, 0, 2]],
    /// ).unwrap();
    ///
    /// let outcome = state.request(1, &[1, 0, 2]).unwrap();
    /// assert!(outcome.is_granted());
    /// assert_eq!(state.available(), &[2, 3, 0]);
    /// ```
    pub fn request(&mut self, pid: usize, req: &[Units]) -> Result<RequestOutcome, BankerError> {
        self.check_pid(pid)?;
        if req.len() != self.num_resources() {
            return Err(BankerError::DimensionMismatch {
                what: "request vector",
                expected: self.num_resources(),
                actual: req.len(),
            });
        }

        for (resource, (&requested, &need)) in req.iter().zip(&self.need[pid]).enumerate() {
            if requested > need {
                tracing::debug!(pid, resource, requested, need, "request exceeds declared need");
                return Err(BankerError::ExceedsDeclaredNeed {
                    pid,
                    resource,
                    requested,
                    need,
                });
            }
        }

        for (resource, (&requested, &available)) in req.iter().zip(&self.available).enumerate() {
            if requested > available {
                tracing::debug!(pid, resource, requested, available, "request must wait");
                return Ok(RequestOutcome::MustWait {
                    resource,
                    requested,
                    available,
                });
            }
        }

        self.grant(pid, req);
        let report = self.find_safe_sequence();

        if report.safe {
            tracing::debug!(pid, ?req, "granted, safe sequence {:?}", report.sequence);
            debug_assert!(self.check_invariants().is_ok());
            Ok(RequestOutcome::Granted {
                sequence: report.sequence,
            })
        } else {
            self.revoke(pid, req);
            tracing::warn!(pid, ?req, "denied: grant would leave the system unsafe");
            Ok(RequestOutcome::Unsafe {
                partial: report.sequence,
            })
        }
    }

    /// Terminates `pid`: everything it holds returns to Available and its
    /// remaining claim is forfeited (Alloc and Need become zero).
    ///
    /// Idempotent. Returns the units handed back, all zero on a repeat call.
    pub fn release(&mut self, pid: usize) -> Result<Vec<Units>, BankerError> {
        self.check_pid(pid)?;

        let zeros = vec![0; self.num_resources()];
        let returned = std::mem::replace(&mut self.alloc[pid], zeros);
        for (avail, units) in self.available.iter_mut().zip(&returned) {
            *avail += units;
        }
        self.need[pid].fill(0);
        self.terminated[pid] = true;

        tracing::debug!(pid, ?returned, "process released");
        debug_assert!(self.check_invariants().is_ok());
        Ok(returned)
    }

    /// Returns everything `pid` holds while keeping it alive: Alloc becomes
    /// zero and Need is reset to the declared Max, so the process may request
    /// again.
    ///
    /// Never turns a safe state unsafe.
    pub fn relinquish(&mut self, pid: usize) -> Result<Vec<Units>, BankerError> {
        self.check_pid(pid)?;
        if self.terminated[pid] {
            return Err(BankerError::ProcessTerminated { pid });
        }

        let zeros = vec![0; self.num_resources()];
        let returned = std::mem::replace(&mut self.alloc[pid], zeros);
        for (avail, units) in self.available.iter_mut().zip(&returned) {
            *avail += units;
        }
        self.need[pid].clone_from(&self.max[pid]);

        tracing::debug!(pid, ?returned, "process relinquished its holdings");
        debug_assert!(self.check_invariants().is_ok());
        Ok(returned)
    }

    /// Step 3. Callers have already checked `req <= Need` and `req <= Available`.
    fn grant(&mut self, pid: usize, req: &[Units]) {
        for (r, &units) in req.iter().enumerate() {
            self.alloc[pid][r] += units;
            self.available[r] -= units;
            self.need[pid][r] -= units;
        }
    }

    /// Exact inverse of [`grant`](Self::grant).
    fn revoke(&mut self, pid: usize, req: &[Units]) {
        for (r, &units) in req.iter().enumerate() {
            self.alloc[pid][r] -= units;
            self.available[r] += units;
            self.need[pid][r] += units;
        }
    }
}
