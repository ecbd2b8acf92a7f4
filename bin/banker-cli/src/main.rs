// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # banker
//!
//! Command-line interface for the banker deadlock-avoidance engine.
//!
//! ## Usage
//! ```bash
//! # Replay the textbook 5-process / 3-resource walkthrough
//! banker demo
//!
//! # Check whether a scenario's initial state is safe
//! banker check --scenario ./scenarios/textbook.toml
//!
//! # Run a scenario's scripted steps
//! banker simulate --scenario ./scenarios/textbook.toml --json
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "banker",
    about = "Deadlock avoidance with the Banker's Algorithm",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the textbook walkthrough: three request sequences against the
    /// classic 5-process / 3-resource state.
    Demo,

    /// Load a scenario and report whether its initial state is safe.
    Check {
        /// Path to the scenario TOML file.
        #[arg(short, long)]
        scenario: std::path::PathBuf,
    },

    /// Load a scenario and run its steps in order.
    Simulate {
        /// Path to the scenario TOML file.
        #[arg(short, long)]
        scenario: std::path::PathBuf,

        /// Print the step reports and statistics as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Demo => commands::demo::execute().await,
        Commands::Check { scenario } => commands::check::execute(scenario).await,
        Commands::Simulate { scenario, json } => commands::simulate::execute(scenario, json).await,
    }
}
