// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Decision statistics for diagnostics.
//!
//! [`DecisionStats`] counts what a [`SharedBanker`](crate::SharedBanker) has
//! decided so far: how many requests were granted, deferred, denied as
//! unsafe or rejected outright, and how often resources came back.

use crate::{BankerError, RequestOutcome};

/// Cumulative counters of allocator decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct DecisionStats {
    /// Total number of `request` calls, including rejected ones.
    pub total_requests: u64,
    /// Requests committed.
    pub granted: u64,
    /// Requests deferred for lack of free units.
    pub must_wait: u64,
    /// Requests rolled back because the result would be unsafe.
    pub unsafe_denied: u64,
    /// Requests rejected as client errors.
    pub rejected: u64,
    /// `release` calls.
    pub releases: u64,
    /// `relinquish` calls.
    pub relinquishes: u64,
    /// Standalone safety checks.
    pub safety_checks: u64,
}

impl DecisionStats {
    /// Fraction of requests that were granted, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if no requests have been made.
    pub fn grant_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.granted as f64 / self.total_requests as f64
    }

    /// Records the result of one `request` call.
    pub(crate) fn record_request(&mut self, result: &Result<RequestOutcome, BankerError>) {
        self.total_requests += 1;
        match result {
            Ok(RequestOutcome::Granted { .. }) => self.granted += 1,
            Ok(RequestOutcome::MustWait { .. }) => self.must_wait += 1,
            Ok(RequestOutcome::Unsafe { .. }) => self.unsafe_denied += 1,
            Err(_) => self.rejected += 1,
        }
    }

    pub(crate) fn record_release(&mut self) {
        self.releases += 1;
    }

    pub(crate) fn record_relinquish(&mut self) {
        self.relinquishes += 1;
    }

    pub(crate) fn record_safety_check(&mut self) {
        self.safety_checks += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Requests: {} total ({} granted, {} waiting, {} unsafe, {} rejected, {:.0}% grant rate), \
             {} releases, {} relinquishes, {} safety checks",
            self.total_requests,
            self.granted,
            self.must_wait,
            self.unsafe_denied,
            self.rejected,
            self.grant_ratio() * 100.0,
            self.releases,
            self.relinquishes,
            self.safety_checks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let s = DecisionStats::default();
        assert_eq!(s.total_requests, 0);
        assert_eq!(s.grant_ratio(), 0.0);
    }

    #[test]
    fn test_record_each_outcome() {
        let mut s = DecisionStats::default();
        s.record_request(&Ok(RequestOutcome::Granted { sequence: vec![0] }));
        s.record_request(&Ok(RequestOutcome::MustWait {
            resource: 0,
            requested: 2,
            available: 1,
        }));
        s.record_request(&Ok(RequestOutcome::Unsafe { partial: vec![] }));
        s.record_request(&Err(BankerError::ProcessTerminated { pid: 0 }));

        assert_eq!(s.total_requests, 4);
        assert_eq!(s.granted, 1);
        assert_eq!(s.must_wait, 1);
        assert_eq!(s.unsafe_denied, 1);
        assert_eq!(s.rejected, 1);
        assert!((s.grant_ratio() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_summary() {
        let mut s = DecisionStats::default();
        s.record_request(&Ok(RequestOutcome::Granted { sequence: vec![] }));
        s.record_release();
        s.record_safety_check();
        let summary = s.summary();
        assert!(summary.contains("1 total"));
        assert!(summary.contains("1 granted"));
        assert!(summary.contains("1 releases"));
        assert!(summary.contains("100% grant rate"));
    }
}
