// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `banker demo` command: the textbook walkthrough.
//!
//! Three runs against a fresh copy of the classic 5-process / 3-resource
//! state. All start with P1 [1 0 2] and P4 [3 3 0], then:
//!
//! 1. P0 asks for [0 2 0]: denied as unsafe.
//! 2. P0 asks for [0 1 0]: granted.
//! 3. P4 terminates first, after which P0's [0 2 0] is granted.

use super::{describe, units};
use banker::{BankerState, SharedBanker, Units};

/// The classic textbook configuration.
pub fn textbook() -> anyhow::Result<BankerState> {
    Ok(BankerState::initialize(
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
    )?)
}

enum Action {
    Request(usize, [Units; 3]),
    Release(usize),
}

pub async fn execute() -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║          banker · Textbook Walkthrough              ║");
    println!("╚══════════════════════════════════════════════════════╝");

    let runs: [(&str, Vec<Action>); 3] = [
        (
            "Run 1",
            vec![
                Action::Request(1, [1, 0, 2]),
                Action::Request(4, [3, 3, 0]),
                Action::Request(0, [0, 2, 0]),
            ],
        ),
        (
            "Run 2",
            vec![
                Action::Request(1, [1, 0, 2]),
                Action::Request(4, [3, 3, 0]),
                Action::Request(0, [0, 1, 0]),
            ],
        ),
        (
            "Run 3",
            vec![
                Action::Request(1, [1, 0, 2]),
                Action::Request(4, [3, 3, 0]),
                Action::Release(4),
                Action::Request(0, [0, 2, 0]),
            ],
        ),
    ];

    for (title, actions) in runs {
        println!();
        println!("  {title}");
        let banker = SharedBanker::new(textbook()?);

        let report = banker.find_safe_sequence()?;
        let verdict = if report.safe {
            format!("safe, sequence {:?}", report.sequence)
        } else {
            "unsafe".to_string()
        };
        println!(
            "   {:<18} {:<58} Available {}",
            "initial state",
            verdict,
            units(&banker.available()?)
        );

        for action in actions {
            let (label, line) = match action {
                Action::Request(pid, req) => (
                    format!("P{pid} request {}", units(&req)),
                    describe(&banker.request(pid, &req)),
                ),
                Action::Release(pid) => {
                    banker.release(pid)?;
                    let report = banker.find_safe_sequence()?;
                    (
                        format!("P{pid} release"),
                        format!("released, safe={} sequence {:?}", report.safe, report.sequence),
                    )
                }
            };
            println!(
                "   {:<18} {:<58} Available {}",
                label,
                line,
                units(&banker.available()?)
            );
        }

        tracing::info!("{title}: {}", banker.stats().summary());
    }

    println!();
    Ok(())
}
