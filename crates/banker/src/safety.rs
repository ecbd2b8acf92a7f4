// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The safety check.
//!
//! A state is *safe* when some ordering of the processes lets each one
//! receive its full remaining Need, finish, and hand back everything it
//! holds. [`BankerState::find_safe_sequence`] searches for such an ordering
//! with repeated passes over the unfinished processes:
//!
//! ```text
//! work = Available
//! loop {
//!     for p in unfinished, ascending pid:
//!         if Need[p] <= work:  work += Alloc[p]; finish p
//!     if nothing finished this pass: break
//! }
//! ```
//!
//! Each pass finishes at least one process or ends the search, so there are
//! at most `n` passes.

use crate::{BankerState, Units};

/// Result of a safety check.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SafetyReport {
    /// Whether every process can run to completion.
    pub safe: bool,
    /// Completion order. When `safe` is false this is only the prefix of
    /// processes that could still finish, not a full ordering.
    pub sequence: Vec<usize>,
}

impl SafetyReport {
    /// Replays `sequence` against `state` and checks that each process's
    /// Need fits in the units freed so far.
    ///
    /// Returns `false` on an out-of-range or repeated pid, a step that does
    /// not fit, or a report marked safe that does not cover every process.
    pub fn verify(&self, state: &BankerState) -> bool {
        let n = state.num_processes();
        if self.safe && self.sequence.len() != n {
            return false;
        }

        let mut work: Vec<Units> = state.available.clone();
        let mut finished = vec![false; n];
        for &pid in &self.sequence {
            let (Some(need), Some(alloc)) = (state.need.get(pid), state.alloc.get(pid)) else {
                return false;
            };
            if finished[pid] || !fits(need, &work) {
                return false;
            }
            finished[pid] = true;
            release_into(&mut work, alloc);
        }
        true
    }

    /// Formats the sequence as `P1 -> P3 -> P4`.
    pub fn sequence_label(&self) -> String {
        self.sequence
            .iter()
            .map(|p| format!("P{p}"))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl BankerState {
    /// Searches for a safe completion order without touching the live state.
    ///
    /// Within a pass, grantable processes are taken in increasing pid order,
    /// so the result is deterministic.
    ///
    /// # Example
    /// ```
    /// use banker::BankerState;
    ///
    /// let state = BankerState::initialize(
    ///     vec![1, 0],
    ///     vec![vec![2, 1], vec![1, 1]],
    ///     vec![vec![1, 1], vec![0, 1]],
    /// ).unwrap();
    ///
    /// let report = state.find_safe_sequence();
    /// assert!(report.safe);
    /// assert_eq!(report.sequence, vec![0, 1]);
    /// ```
    pub fn find_safe_sequence(&self) -> SafetyReport {
        let n = self.num_processes();
        let mut work = self.available.clone();
        let mut finished = vec![false; n];
        let mut sequence = Vec::with_capacity(n);

        while sequence.len() < n {
            let mut progressed = false;

            for pid in 0..n {
                if finished[pid] || !fits(&self.need[pid], &work) {
                    continue;
                }
                release_into(&mut work, &self.alloc[pid]);
                finished[pid] = true;
                sequence.push(pid);
                progressed = true;
            }

            if !progressed {
                break;
            }
        }

        SafetyReport {
            safe: sequence.len() == n,
            sequence,
        }
    }

    /// Shorthand for `find_safe_sequence().safe`.
    pub fn is_safe(&self) -> bool {
        self.find_safe_sequence().safe
    }
}

/// `need <= work` component-wise.
fn fits(need: &[Units], work: &[Units]) -> bool {
    need.iter().zip(work).all(|(n, w)| n <= w)
}

/// `work += alloc`. Callers release each process at most once, so `work`
/// never exceeds Total and cannot overflow.
fn release_into(work: &mut [Units], alloc: &[Units]) {
    for (w, a) in work.iter_mut().zip(alloc) {
        *w += a;
    }
}
