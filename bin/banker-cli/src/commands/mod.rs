// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared console helpers.

pub mod check;
pub mod demo;
pub mod simulate;

use banker::{BankerError, RequestOutcome, Units};
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbosity maps to
/// warn / info / debug / trace for the `banker` crate.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("banker={level},banker_cli={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// One-line description of a request result.
pub fn describe(result: &Result<RequestOutcome, BankerError>) -> String {
    match result {
        Ok(RequestOutcome::Granted { sequence }) => format!("granted, safe sequence {sequence:?}"),
        Ok(RequestOutcome::MustWait {
            resource,
            requested,
            available,
        }) => format!("must wait (resource {resource}: requested {requested}, {available} free)"),
        Ok(RequestOutcome::Unsafe { .. }) => "denied, would enter unsafe state".to_string(),
        Err(e) => format!("rejected: {e}"),
    }
}

/// Formats a vector as `[3 3 2]`.
pub fn units(v: &[Units]) -> String {
    let inner: Vec<String> = v.iter().map(|u| u.to_string()).collect();
    format!("[{}]", inner.join(" "))
}
