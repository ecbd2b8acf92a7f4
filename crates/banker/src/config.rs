// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scenario configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! name = "textbook"
//! available = [3, 3, 2]
//! max = [[7, 5, 3], [3, 2, 2], [9, 0, 2], [2, 2, 2], [4, 3, 3]]
//! alloc = [[0, 1, 0], [2, 0, 0], [3, 0, 2], [2, 1, 1], [0, 0, 2]]
//!
//! [[steps]]
//! action = "request"
//! pid = 1
//! req = [1, 0, 2]
//!
//! [[steps]]
//! action = "release"
//! pid = 4
//!
//! [[steps]]
//! action = "check"
//! ```

use crate::{BankerError, BankerState, RequestOutcome, SharedBanker, Units};
use std::path::Path;

/// Initial allocator configuration plus an optional script of operations.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScenarioConfig {
    /// Label used in reports.
    #[serde(default = "default_name")]
    pub name: String,
    /// Free units per resource type.
    pub available: Vec<Units>,
    /// Declared maximum per process (rows) and resource type (columns).
    pub max: Vec<Vec<Units>>,
    /// Current holdings, same shape as `max`.
    pub alloc: Vec<Vec<Units>>,
    /// Operations to run in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_name() -> String {
    "scenario".to_string()
}

/// One scripted operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Request { pid: usize, req: Vec<Units> },
    Release { pid: usize },
    Relinquish { pid: usize },
    Check,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request { pid, req } => write!(f, "P{pid} request {req:?}"),
            Self::Release { pid } => write!(f, "P{pid} release"),
            Self::Relinquish { pid } => write!(f, "P{pid} relinquish"),
            Self::Check => write!(f, "safety check"),
        }
    }
}

/// What happened when a [`Step`] ran.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StepReport {
    /// The step, formatted.
    pub step: String,
    /// `granted`, `must-wait`, `unsafe`, `rejected`, `released`,
    /// `relinquished`, `safe` or `unsafe-state`.
    pub result: String,
    /// Safe sequence (or partial prefix) where the step produced one.
    pub sequence: Option<Vec<usize>>,
    /// Error message for rejected steps.
    pub error: Option<String>,
    /// Available after the step.
    pub available: Vec<Units>,
}

impl ScenarioConfig {
    /// Loads a scenario from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, BankerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BankerError::Config(format!("cannot read scenario '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses a scenario from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, BankerError> {
        toml::from_str(toml_str)
            .map_err(|e| BankerError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises the scenario to TOML.
    pub fn to_toml(&self) -> Result<String, BankerError> {
        toml::to_string_pretty(self)
            .map_err(|e| BankerError::Config(format!("TOML serialise error: {e}")))
    }

    /// Builds the initial state. Fails with
    /// [`BankerError::MalformedConfiguration`] on inconsistent matrices.
    pub fn build(&self) -> Result<BankerState, BankerError> {
        BankerState::initialize(self.available.clone(), self.max.clone(), self.alloc.clone())
    }

    /// Runs every step against `banker` in order.
    ///
    /// Client errors are recorded in the step's report and the script
    /// continues; only infrastructure failures (a poisoned lock) abort.
    pub fn run_steps(&self, banker: &SharedBanker) -> Result<Vec<StepReport>, BankerError> {
        let mut reports = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let (result, sequence, error) = match step {
                Step::Request { pid, req } => match banker.request(*pid, req) {
                    Ok(outcome) => {
                        let label = outcome.label().to_string();
                        let seq = match outcome {
                            RequestOutcome::Granted { sequence } => Some(sequence),
                            RequestOutcome::Unsafe { partial } => Some(partial),
                            RequestOutcome::MustWait { .. } => None,
                        };
                        (label, seq, None)
                    }
                    Err(e) => client_error(e)?,
                },
                Step::Release { pid } => match banker.release(*pid) {
                    Ok(_) => ("released".to_string(), None, None),
                    Err(e) => client_error(e)?,
                },
                Step::Relinquish { pid } => match banker.relinquish(*pid) {
                    Ok(_) => ("relinquished".to_string(), None, None),
                    Err(e) => client_error(e)?,
                },
                Step::Check => {
                    let report = banker.find_safe_sequence()?;
                    let label = if report.safe { "safe" } else { "unsafe-state" };
                    (label.to_string(), Some(report.sequence), None)
                }
            };

            tracing::debug!(scenario = %self.name, step = %step, result = %result, "step finished");

            reports.push(StepReport {
                step: step.to_string(),
                result,
                sequence,
                error,
                available: banker.available()?,
            });
        }

        Ok(reports)
    }
}

type StepResult = (String, Option<Vec<usize>>, Option<String>);

/// Turns a client error into a `rejected` report entry and passes anything
/// else through.
fn client_error(e: BankerError) -> Result<StepResult, BankerError> {
    if e.is_client_error() {
        Ok(("rejected".to_string(), None, Some(e.to_string())))
    } else {
        Err(e)
    }
}
