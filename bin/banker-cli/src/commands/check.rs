// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `banker check` command: is a scenario's initial state safe?

use super::units;
use banker::ScenarioConfig;
use std::path::PathBuf;

pub async fn execute(scenario: PathBuf) -> anyhow::Result<()> {
    let config = ScenarioConfig::from_file(&scenario).map_err(|e| {
        anyhow::anyhow!("failed to load scenario from '{}': {e}", scenario.display())
    })?;
    let state = config.build()?;

    println!("  Scenario:   {}", config.name);
    println!(
        "  Processes:  {}   Resource types: {}",
        state.num_processes(),
        state.num_resources()
    );
    println!("  Total:      {}", units(state.total()));
    println!("  Available:  {}", units(state.available()));
    println!();

    println!("  {:<5} {:<12} {:<12} {:<12}", "PID", "Max", "Alloc", "Need");
    println!("  {}", "-".repeat(44));
    for pid in 0..state.num_processes() {
        println!(
            "  P{:<4} {:<12} {:<12} {:<12}",
            pid,
            units(state.max(pid).unwrap_or_default()),
            units(state.alloc(pid).unwrap_or_default()),
            units(state.need(pid).unwrap_or_default()),
        );
    }
    println!();

    let report = state.find_safe_sequence();
    if report.safe {
        println!("  SAFE    sequence: {}", report.sequence_label());
    } else {
        println!("  UNSAFE  only these can finish: {}", report.sequence_label());
    }

    Ok(())
}
