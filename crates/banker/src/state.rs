// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Resource-accounting state.
//!
//! [`BankerState`] owns the four Banker's Algorithm structures for `n`
//! processes and `m` resource types:
//!
//! | Name | Shape | Meaning |
//! |---|---|---|
//! | Available | `m` | units of each type not held by anyone |
//! | Max | `n × m` | declared peak holding per process (immutable) |
//! | Alloc | `n × m` | units currently held |
//! | Need | `n × m` | `Max − Alloc`, the remaining entitlement |
//!
//! Plus `Total`, the per-type unit count fixed at construction. Every public
//! operation preserves:
//!
//! 1. `Alloc + Need == Max` per live process (both zero once terminated).
//! 2. All counts are non-negative (guaranteed by [`Units`] being unsigned).
//! 3. `Available + column-sum(Alloc) == Total` per resource type.

use crate::BankerError;

/// Count of fungible units of one resource type.
pub type Units = u32;

/// The complete allocator state for one simulation.
///
/// The state is a plain owned value with no interior mutability; wrap it in a
/// [`SharedBanker`](crate::SharedBanker) to share it between callers.
///
/// # Example
/// ```
/// use banker::BankerState;
///
/// let state = BankerState::initialize(
///     vec![3, 3, 2],
///     vec![vec![7, 5, 3], vec![3, 2, 2]],
///     vec![vec![0, 1, 0], vec![2, 0, 0]],
/// ).unwrap();
///
/// assert_eq!(state.num_processes(), 2);
/// assert_eq!(state.need(1), Some(&[1, 2, 2][..]));
/// assert_eq!(state.total(), &[5, 4, 2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankerState {
    pub(crate) available: Vec<Units>,
    pub(crate) total: Vec<Units>,
    pub(crate) max: Vec<Vec<Units>>,
    pub(crate) alloc: Vec<Vec<Units>>,
    pub(crate) need: Vec<Vec<Units>>,
    pub(crate) terminated: Vec<bool>,
}

/// A serialisable copy of every vector and matrix in a [`BankerState`].
///
/// Two snapshots compare equal exactly when the states are bit-for-bit
/// identical, which is how rollback exactness is checked.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateSnapshot {
    pub available: Vec<Units>,
    pub total: Vec<Units>,
    pub max: Vec<Vec<Units>>,
    pub alloc: Vec<Vec<Units>>,
    pub need: Vec<Vec<Units>>,
    pub terminated: Vec<bool>,
}

impl BankerState {
    /// Builds a state from Available, Max and Alloc. Need is derived as
    /// `Max − Alloc`.
    ///
    /// Fails with [`BankerError::MalformedConfiguration`] when there are no
    /// resource types, when any row has the wrong length, when an Alloc
    /// entry exceeds its Max, or when a resource total overflows. A state
    /// with no processes is accepted and is trivially safe.
    pub fn initialize(
        available: Vec<Units>,
        max: Vec<Vec<Units>>,
        alloc: Vec<Vec<Units>>,
    ) -> Result<Self, BankerError> {
        let m = available.len();
        let n = max.len();

        if m == 0 {
            return Err(BankerError::MalformedConfiguration(
                "at least one resource type is required".into(),
            ));
        }
        if alloc.len() != n {
            return Err(BankerError::MalformedConfiguration(format!(
                "max has {n} rows but alloc has {}",
                alloc.len()
            )));
        }

        for (pid, (max_row, alloc_row)) in max.iter().zip(&alloc).enumerate() {
            if max_row.len() != m {
                return Err(BankerError::MalformedConfiguration(format!(
                    "max row {pid} has {} entries, expected {m}",
                    max_row.len()
                )));
            }
            if alloc_row.len() != m {
                return Err(BankerError::MalformedConfiguration(format!(
                    "alloc row {pid} has {} entries, expected {m}",
                    alloc_row.len()
                )));
            }
        }

        let mut need = Vec::with_capacity(n);
        for (pid, (max_row, alloc_row)) in max.iter().zip(&alloc).enumerate() {
            let row = max_row
                .iter()
                .zip(alloc_row)
                .enumerate()
                .map(|(r, (&mx, &al))| {
                    mx.checked_sub(al).ok_or_else(|| {
                        BankerError::MalformedConfiguration(format!(
                            "process {pid} holds {al} units of resource {r}, above its declared max {mx}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            need.push(row);
        }

        let mut total = available.clone();
        for row in &alloc {
            for (r, &units) in row.iter().enumerate() {
                total[r] = total[r].checked_add(units).ok_or_else(|| {
                    BankerError::MalformedConfiguration(format!(
                        "total units of resource {r} overflow"
                    ))
                })?;
            }
        }

        tracing::info!(
            processes = n,
            resources = m,
            "allocator initialised with total {:?}, available {:?}",
            total,
            available,
        );

        Ok(Self {
            available,
            total,
            max,
            alloc,
            need,
            terminated: vec![false; n],
        })
    }

    /// Number of processes `n`.
    pub fn num_processes(&self) -> usize {
        self.max.len()
    }

    /// Number of resource types `m`.
    pub fn num_resources(&self) -> usize {
        self.available.len()
    }

    /// Units of each resource type currently unallocated.
    pub fn available(&self) -> &[Units] {
        &self.available
    }

    /// Units of each resource type in the whole system.
    pub fn total(&self) -> &[Units] {
        &self.total
    }

    /// Declared maximum of process `pid`.
    pub fn max(&self, pid: usize) -> Option<&[Units]> {
        self.max.get(pid).map(Vec::as_slice)
    }

    /// Units currently held by process `pid`.
    pub fn alloc(&self, pid: usize) -> Option<&[Units]> {
        self.alloc.get(pid).map(Vec::as_slice)
    }

    /// Remaining entitlement of process `pid`.
    pub fn need(&self, pid: usize) -> Option<&[Units]> {
        self.need.get(pid).map(Vec::as_slice)
    }

    /// Whether `pid` has been released. Unknown ids report `false`.
    pub fn is_terminated(&self, pid: usize) -> bool {
        self.terminated.get(pid).copied().unwrap_or(false)
    }

    /// Returns a copy of the full state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            available: self.available.clone(),
            total: self.total.clone(),
            max: self.max.clone(),
            alloc: self.alloc.clone(),
            need: self.need.clone(),
            terminated: self.terminated.clone(),
        }
    }

    /// Verifies the three accounting invariants.
    ///
    /// Returns the first violation found. Operations on a state built by
    /// [`initialize`](Self::initialize) never produce one.
    pub fn check_invariants(&self) -> Result<(), BankerError> {
        for pid in 0..self.num_processes() {
            for r in 0..self.num_resources() {
                let (al, nd, mx) = (self.alloc[pid][r], self.need[pid][r], self.max[pid][r]);
                if self.terminated[pid] {
                    if al != 0 || nd != 0 {
                        return Err(BankerError::InvariantViolation(format!(
                            "terminated process {pid} still has alloc {al} / need {nd} of resource {r}"
                        )));
                    }
                } else if al.checked_add(nd) != Some(mx) {
                    return Err(BankerError::InvariantViolation(format!(
                        "process {pid}, resource {r}: alloc {al} + need {nd} != max {mx}"
                    )));
                }
            }
        }

        for r in 0..self.num_resources() {
            let held: u64 = self.alloc.iter().map(|row| u64::from(row[r])).sum();
            let accounted = u64::from(self.available[r]) + held;
            if accounted != u64::from(self.total[r]) {
                return Err(BankerError::InvariantViolation(format!(
                    "resource {r}: available {} + allocated {held} != total {}",
                    self.available[r], self.total[r]
                )));
            }
        }

        Ok(())
    }

    /// Rejects out-of-range process ids.
    pub(crate) fn check_pid(&self, pid: usize) -> Result<(), BankerError> {
        if pid >= self.num_processes() {
            return Err(BankerError::UnknownProcess {
                pid,
                num_processes: self.num_processes(),
            });
        }
        Ok(())
    }
}
