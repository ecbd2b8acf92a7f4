// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: the textbook scenario end to end, concurrent use of a
//! shared allocator, and randomised checks of the accounting properties.

use banker::{
    BankerError, BankerState, RequestOutcome, ScenarioConfig, SharedBanker, StateSnapshot, Units,
};
use proptest::prelude::*;
use std::time::Duration;

// ── Helpers ────────────────────────────────────────────────────

/// The classic 5-process, 3-resource configuration.
fn textbook() -> BankerState {
    BankerState::initialize(
        vec![3, 3, 2],
        vec![
            vec![7, 5, 3],
            vec![3, 2, 2],
            vec![9, 0, 2],
            vec![2, 2, 2],
            vec![4, 3, 3],
        ],
        vec![
            vec![0, 1, 0],
            vec![2, 0, 0],
            vec![3, 0, 2],
            vec![2, 1, 1],
            vec![0, 0, 2],
        ],
    )
    .unwrap()
}

/// Conservation check usable on a snapshot taken from a shared handle.
fn assert_conserved(snap: &StateSnapshot) {
    for r in 0..snap.total.len() {
        let held: Units = snap.alloc.iter().map(|row| row[r]).sum();
        assert_eq!(snap.available[r] + held, snap.total[r], "resource {r}");
    }
}

// ── Textbook Scenario ──────────────────────────────────────────

#[test]
fn test_textbook_initial_state_is_safe() {
    let state = textbook();
    let report = state.find_safe_sequence();
    assert!(report.safe);
    assert_eq!(report.sequence, vec![1, 3, 4, 0, 2]);
    assert!(report.verify(&state));
}

#[test]
fn test_textbook_request_sequence() {
    let mut state = textbook();

    // Step 2: P1 asks for [1, 0, 2].
    let outcome = state.request(1, &[1, 0, 2]).unwrap();
    assert_eq!(
        outcome,
        RequestOutcome::Granted {
            sequence: vec![1, 3, 4, 0, 2]
        }
    );
    assert_eq!(state.available(), &[2, 3, 0]);
    let after_step_2 = state.snapshot();

    // Step 3: P4 asks for [3, 3, 0]; only 2 units of resource 0 are free.
    let outcome = state.request(4, &[3, 3, 0]).unwrap();
    assert_eq!(
        outcome,
        RequestOutcome::MustWait {
            resource: 0,
            requested: 3,
            available: 2
        }
    );
    assert_eq!(state.snapshot(), after_step_2);

    // Step 4: P0 asks for [0, 2, 0]; granting would strand everyone.
    let outcome = state.request(0, &[0, 2, 0]).unwrap();
    assert_eq!(outcome, RequestOutcome::Unsafe { partial: vec![] });
    assert_eq!(state.snapshot(), after_step_2);
    assert_eq!(state.available(), &[2, 3, 0]);
    state.check_invariants().unwrap();
}

#[test]
fn test_textbook_smaller_request_is_granted() {
    let mut state = textbook();
    state.request(1, &[1, 0, 2]).unwrap();
    state.request(4, &[3, 3, 0]).unwrap();

    let outcome = state.request(0, &[0, 1, 0]).unwrap();
    assert_eq!(
        outcome,
        RequestOutcome::Granted {
            sequence: vec![1, 3, 4, 0, 2]
        }
    );
    assert_eq!(state.available(), &[2, 2, 0]);
}

#[test]
fn test_textbook_release_unblocks_request() {
    let mut state = textbook();
    state.request(1, &[1, 0, 2]).unwrap();
    state.request(4, &[3, 3, 0]).unwrap();

    assert_eq!(state.release(4).unwrap(), vec![0, 0, 2]);
    assert_eq!(state.available(), &[2, 3, 2]);
    let report = state.find_safe_sequence();
    assert!(report.safe);
    assert_eq!(report.sequence, vec![1, 3, 4, 0, 2]);

    let outcome = state.request(0, &[0, 2, 0]).unwrap();
    assert_eq!(
        outcome,
        RequestOutcome::Granted {
            sequence: vec![3, 4, 1, 2, 0]
        }
    );
    assert_eq!(state.available(), &[2, 1, 2]);
    state.check_invariants().unwrap();
}

#[test]
fn test_independent_simulations_do_not_interfere() {
    let mut a = textbook();
    let b = textbook();
    a.request(1, &[1, 0, 2]).unwrap();
    assert_eq!(a.available(), &[2, 3, 0]);
    assert_eq!(b.available(), &[3, 3, 2]);
}

// ── Scenario Files ─────────────────────────────────────────────

#[test]
fn test_textbook_scenario_file() {
    let config = ScenarioConfig::from_toml(include_str!("../../../scenarios/textbook.toml")).unwrap();
    let banker = SharedBanker::new(config.build().unwrap());
    let reports = config.run_steps(&banker).unwrap();

    let results: Vec<_> = reports.iter().map(|r| r.result.as_str()).collect();
    assert_eq!(
        results,
        vec!["safe", "granted", "must-wait", "unsafe", "released", "granted", "safe"]
    );
    assert_eq!(reports[5].sequence, Some(vec![3, 4, 1, 2, 0]));
    assert_eq!(reports[6].available, vec![2, 1, 2]);
}

#[test]
fn test_relinquish_scenario_file() {
    let config =
        ScenarioConfig::from_toml(include_str!("../../../scenarios/relinquish.toml")).unwrap();
    let banker = SharedBanker::new(config.build().unwrap());
    let reports = config.run_steps(&banker).unwrap();

    let results: Vec<_> = reports.iter().map(|r| r.result.as_str()).collect();
    assert_eq!(
        results,
        vec!["must-wait", "rejected", "relinquished", "granted", "safe"]
    );
    assert_eq!(reports[3].sequence, Some(vec![0, 1, 2]));
    assert_eq!(banker.stats().rejected, 1);
}

// ── Shared Handle ──────────────────────────────────────────────

#[test]
fn test_concurrent_requests_preserve_accounting() {
    let banker = SharedBanker::new(textbook());

    let handles: Vec<_> = (0..5)
        .map(|pid| {
            let banker = banker.clone();
            std::thread::spawn(move || {
                for round in 0..50u32 {
                    let req = [round % 2, (round + pid as u32) % 2, 0];
                    let _ = banker.request(pid, &req);
                    if round % 10 == 9 {
                        banker.relinquish(pid).unwrap();
                    }
                    assert!(banker.find_safe_sequence().unwrap().safe);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let snap = banker.snapshot().unwrap();
    assert_conserved(&snap);
    assert_eq!(snap.total, vec![10, 5, 7]);
    assert!(banker.find_safe_sequence().unwrap().safe);
    assert_eq!(banker.stats().total_requests, 250);
    assert_eq!(banker.stats().relinquishes, 25);
}

#[tokio::test]
async fn test_acquire_wakes_on_release() {
    // Total 2. P0 takes everything, P1 waits until P0 terminates.
    let state = BankerState::initialize(vec![1], vec![vec![2], vec![2]], vec![vec![1], vec![0]])
        .unwrap();
    let banker = SharedBanker::new(state);
    assert!(banker.request(0, &[1]).unwrap().is_granted());

    let waiter = banker.clone();
    let task =
        tokio::spawn(async move { waiter.acquire(1, &[2], Duration::from_secs(5)).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!task.is_finished());
    banker.release(0).unwrap();

    let sequence = task.await.unwrap().unwrap();
    assert_eq!(sequence, vec![0, 1]);
    assert_eq!(banker.available().unwrap(), vec![0]);
    assert!(banker.stats().must_wait >= 1);
}

#[tokio::test]
async fn test_acquire_retries_unsafe_request() {
    // Textbook step 4: P0's [0, 2, 0] is unsafe until P4 terminates.
    let banker = SharedBanker::new(textbook());
    banker.request(1, &[1, 0, 2]).unwrap();

    let waiter = banker.clone();
    let task =
        tokio::spawn(async move { waiter.acquire(0, &[0, 2, 0], Duration::from_secs(5)).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    banker.release(4).unwrap();

    let sequence = task.await.unwrap().unwrap();
    assert_eq!(sequence, vec![3, 4, 1, 2, 0]);
    assert!(banker.stats().unsafe_denied >= 1);
}

#[tokio::test]
async fn test_acquire_after_release_exceeds_need() {
    let banker = SharedBanker::new(textbook());
    banker.release(2).unwrap();
    let err = banker
        .acquire(2, &[1, 0, 0], Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BankerError::ExceedsDeclaredNeed {
            pid: 2,
            resource: 0,
            requested: 1,
            need: 0,
        }
    );

    // An empty request from the finished process still passes the safety check.
    let sequence = banker
        .acquire(2, &[0, 0, 0], Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(sequence, vec![1, 2, 3, 4, 0]);
    assert_eq!(banker.available().unwrap(), vec![6, 3, 4]);
}

// ── Properties ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Request(usize, Vec<Units>),
    Release(usize),
    Relinquish(usize),
}

/// Random consistent configurations: up to 5 processes, 3 resource types.
fn arb_state() -> impl Strategy<Value = BankerState> {
    (1usize..6, 1usize..4)
        .prop_flat_map(|(n, m)| {
            (
                prop::collection::vec(0u32..6, m),
                prop::collection::vec(prop::collection::vec((0u32..6, 0u32..6), m), n),
            )
        })
        .prop_map(|(available, pairs)| {
            let max = pairs
                .iter()
                .map(|row| row.iter().map(|&(a, b)| a.max(b)).collect())
                .collect();
            let alloc = pairs
                .iter()
                .map(|row| row.iter().map(|&(a, b)| a.min(b)).collect())
                .collect();
            BankerState::initialize(available, max, alloc).unwrap()
        })
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            4 => (0usize..8, prop::collection::vec(0u32..4, 3))
                .prop_map(|(p, r)| Op::Request(p, r)),
            1 => (0usize..8).prop_map(Op::Release),
            1 => (0usize..8).prop_map(Op::Relinquish),
        ],
        0..25,
    )
}

proptest! {
    #[test]
    fn prop_operations_preserve_invariants(mut state in arb_state(), ops in arb_ops()) {
        let n = state.num_processes();
        let m = state.num_resources();
        let was_safe = state.is_safe();

        for op in ops {
            let before = state.snapshot();
            match op {
                Op::Request(p, req) => {
                    let pid = p % n;
                    match state.request(pid, &req[..m]) {
                        Ok(RequestOutcome::Granted { sequence }) => {
                            let report = state.find_safe_sequence();
                            prop_assert!(report.safe);
                            prop_assert_eq!(&report.sequence, &sequence);
                            prop_assert!(report.verify(&state));
                        }
                        Ok(RequestOutcome::MustWait { .. })
                        | Ok(RequestOutcome::Unsafe { .. })
                        | Err(_) => prop_assert_eq!(state.snapshot(), before),
                    }
                }
                Op::Release(p) => {
                    let pid = p % n;
                    let held = before.alloc[pid].clone();
                    prop_assert_eq!(state.release(pid).unwrap(), held.clone());
                    prop_assert!(state.alloc(pid).unwrap().iter().all(|&u| u == 0));
                    prop_assert!(state.need(pid).unwrap().iter().all(|&u| u == 0));
                    for r in 0..m {
                        prop_assert_eq!(state.available()[r], before.available[r] + held[r]);
                    }
                }
                Op::Relinquish(p) => {
                    let pid = p % n;
                    if state.relinquish(pid).is_ok() {
                        prop_assert_eq!(state.alloc(pid).unwrap(), &vec![0; m][..]);
                        prop_assert_eq!(state.need(pid).unwrap(), state.max(pid).unwrap());
                    } else {
                        prop_assert_eq!(state.snapshot(), before);
                    }
                }
            }

            prop_assert!(state.check_invariants().is_ok());
            if was_safe {
                prop_assert!(state.is_safe());
            }
        }
    }

    #[test]
    fn prop_safety_check_is_idempotent_and_valid(state in arb_state()) {
        let first = state.find_safe_sequence();
        let second = state.find_safe_sequence();
        prop_assert_eq!(&first, &second);
        if first.safe {
            prop_assert_eq!(first.sequence.len(), state.num_processes());
            prop_assert!(first.verify(&state));
        }
    }
}
