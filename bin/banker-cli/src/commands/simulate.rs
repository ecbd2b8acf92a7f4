// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `banker simulate` command: run a scenario's scripted steps.

use super::units;
use banker::{ScenarioConfig, SharedBanker};
use std::path::PathBuf;

pub async fn execute(scenario: PathBuf, json: bool) -> anyhow::Result<()> {
    let config = ScenarioConfig::from_file(&scenario).map_err(|e| {
        anyhow::anyhow!("failed to load scenario from '{}': {e}", scenario.display())
    })?;
    if config.steps.is_empty() {
        tracing::warn!("scenario '{}' has no steps", config.name);
    }

    let banker = SharedBanker::new(config.build()?);
    let initial = banker.available()?;
    let reports = config.run_steps(&banker)?;
    let stats = banker.stats();

    if json {
        let out = serde_json::json!({
            "scenario": config.name,
            "initial_available": initial,
            "steps": reports,
            "final": banker.snapshot()?,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("  Scenario: {}   initial Available {}", config.name, units(&initial));
    println!();
    println!("  {:<4} {:<26} {:<14} {:<20} {}", "#", "Step", "Result", "Sequence", "Available");
    println!("  {}", "-".repeat(80));

    for (i, r) in reports.iter().enumerate() {
        let sequence = r
            .sequence
            .as_ref()
            .map(|s| format!("{s:?}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<4} {:<26} {:<14} {:<20} {}",
            i + 1,
            r.step,
            r.result,
            sequence,
            units(&r.available),
        );
        if let Some(err) = &r.error {
            println!("       {err}");
        }
    }

    println!();
    println!("{}", stats.summary());
    Ok(())
}
