// ProSim: Stochastic Process Simulator written in Rust
// Copyright (C) 2025 The ProSim Developers
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Module for the measurement and sampling utilities used by models.

use thiserror::Error;

pub mod markov;
pub mod search;

/// Errors of the measurement utilities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UtilsError {
    /// A rate update was attempted with a zero denominator.
    #[error("rate update with a zero denominator")]
    ZeroDenominator,
    /// The transition probabilities out of a state do not sum to one.
    #[error("the transition probabilities out of state {0} do not sum to one")]
    BadDistribution(usize),
}

/// A running rate measurement.
///
/// The rate is updated incrementally as `rate = rate * (last_denom / denom) + amount / denom`,
/// which keeps it equal to the total recorded amount divided by the latest denominator. Useful
/// for throughput, arrival rates or any per-unit metric of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateMeter {
    rate: f64,
    last_denom: f64,
    updated: bool,
}

impl RateMeter {
    /// Create a meter at rate zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `amount` and move the denominator to `denom` (typically the current simulated
    /// time).
    pub fn record(&mut self, amount: f64, denom: f64) -> Result<(), UtilsError> {
        if denom == 0.0 {
            return Err(UtilsError::ZeroDenominator);
        }
        self.rate = self.rate * (self.last_denom / denom) + amount / denom;
        self.last_denom = denom;
        self.updated = true;
        Ok(())
    }

    /// Move the denominator without recording anything.
    pub fn advance(&mut self, denom: f64) -> Result<(), UtilsError> {
        self.record(0.0, denom)
    }

    /// The current rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Whether the meter was updated since the last reset.
    pub fn updated(&self) -> bool {
        self.updated
    }

    /// Restore the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
