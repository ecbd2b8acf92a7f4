// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # banker
//!
//! Deadlock-avoidance resource allocation with the Banker's Algorithm.
//!
//! A fixed set of processes shares a fixed pool of countable resource types.
//! Each process declares up front the most it will ever hold. The allocator
//! grants a request only if, afterwards, there is still some order in which
//! every process can obtain its full declared maximum and finish.
//!
//! # Key Components
//!
//! - [`BankerState`]: Available, Max, Alloc and Need for one simulation,
//!   with [`request`](BankerState::request), [`release`](BankerState::release),
//!   [`relinquish`](BankerState::relinquish) and
//!   [`find_safe_sequence`](BankerState::find_safe_sequence).
//! - [`SharedBanker`]: a cloneable handle that serialises mutations behind
//!   one lock, tracks [`DecisionStats`], and can wait for resources with
//!   [`acquire`](SharedBanker::acquire).
//! - [`ScenarioConfig`]: initial matrices plus a script of steps, loaded
//!   from TOML.
//!
//! # Request Protocol
//!
//! ```text
//! request(pid, req)
//!       │
//!       ├── req > Need?       ──► Err(ExceedsDeclaredNeed)   state unchanged
//!       ├── req > Available?  ──► Ok(MustWait)               state unchanged
//!       ▼
//!   tentative grant
//!       │
//!   find_safe_sequence()
//!       ├── safe    ──► Ok(Granted { sequence })             committed
//!       └── unsafe  ──► Ok(Unsafe { partial })               rolled back
//! ```
//!
//! # Example
//! ```
//! use banker::{BankerState, RequestOutcome};
//!
//! let mut state = BankerState::initialize(
//!     vec![3, 3, 2],
//!     vec![vec![7, 5, 3], vec![3, 2, 2], vec![9, 0, 2], vec![2, 2, 2], vec![4, 3, 3]],
//!     vec![vec![0, 1, 0], vec![2, 0, 0], vec![3, 0, 2], vec![2, 1, 1], vec![0, 0, 2]],
//! ).unwrap();
//!
//! assert_eq!(state.find_safe_sequence().sequence, vec![1, 3, 4, 0, 2]);
//!
//! assert!(state.request(1, &[1, 0, 2]).unwrap().is_granted());
//! assert!(matches!(state.request(4, &[3, 3, 0]).unwrap(), RequestOutcome::MustWait { .. }));
//! assert!(matches!(state.request(0, &[0, 2, 0]).unwrap(), RequestOutcome::Unsafe { .. }));
//! assert_eq!(state.available(), &[2, 3, 0]);
//! ```

mod config;
mod error;
mod request;
mod safety;
mod shared;
mod state;
mod stats;

pub use config::{ScenarioConfig, Step, StepReport};
pub use error::BankerError;
pub use request::RequestOutcome;
pub use safety::SafetyReport;
pub use shared::SharedBanker;
pub use state::{BankerState, StateSnapshot, Units};
pub use stats::DecisionStats;
