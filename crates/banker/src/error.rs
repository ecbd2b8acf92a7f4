// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the allocator.
//!
//! Only client errors and construction failures are errors. A request that
//! has to wait, or that would make the system unsafe, is a normal
//! [`RequestOutcome`](crate::RequestOutcome).

use crate::Units;
use std::time::Duration;

/// Errors that can occur while building or driving a [`BankerState`](crate::BankerState).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankerError {
    /// The request asks for more than the process declared it would ever need.
    #[error("process {pid} requested {requested} units of resource {resource}, but its remaining need is {need}")]
    ExceedsDeclaredNeed {
        pid: usize,
        resource: usize,
        requested: Units,
        need: Units,
    },

    /// The process id is out of range.
    #[error("unknown process {pid} (system has {num_processes} processes)")]
    UnknownProcess { pid: usize, num_processes: usize },

    /// A request vector does not have one entry per resource type.
    #[error("{what}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The process has been released (terminated) and holds no further claim.
    #[error("process {pid} has terminated")]
    ProcessTerminated { pid: usize },

    /// The initial configuration is inconsistent. No state is created.
    #[error("malformed configuration: {0}")]
    MalformedConfiguration(String),

    /// An accounting invariant does not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A thread panicked while holding the state lock.
    #[error("allocator state lock poisoned")]
    StatePoisoned,

    /// [`SharedBanker::acquire`](crate::SharedBanker::acquire) gave up.
    #[error("process {pid} not granted within {waited:?}")]
    Timeout { pid: usize, waited: Duration },

    /// A scenario file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl BankerError {
    /// Returns `true` for errors caused by a bad request from a caller, as
    /// opposed to construction or infrastructure failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ExceedsDeclaredNeed { .. }
                | Self::UnknownProcess { .. }
                | Self::DimensionMismatch { .. }
                | Self::ProcessTerminated { .. }
        )
    }
}
