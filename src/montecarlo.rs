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

//! Module for the Monte Carlo driver.

use std::fmt;

use log::debug;

use crate::simulator::Simulator;

/// The Monte Carlo driver: repeated independent runs with a running average.
///
/// Each replication performs one full run of the wrapped simulator and folds the per-run value
/// (written by the model's end-of-run hook) into the running average with the incremental mean
/// update `avg = avg * i/(i+1) + value/(i+1)`, so after `k` replications the average equals the
/// arithmetic mean of the `k` per-run values without storing any sample.
pub struct MonteCarlo<S> {
    simulator: S,
}

impl<S: Simulator> MonteCarlo<S> {
    /// Create a Monte Carlo driver around a single-run driver.
    pub fn new(simulator: S) -> Self {
        Self { simulator }
    }

    /// Run `montecarlo_budget` replications, maintaining the running average in the shared
    /// state. The average is reset to zero before the first replication; the random source is
    /// left untouched between replications so that they are independent.
    pub fn run(&mut self) {
        let global = self.simulator.system_mut().global_mut();
        global.set_montecarlo_avg(0.0);
        let budget = global.montecarlo_budget();
        for i in 0..budget {
            self.simulator.run();
            let global = self.simulator.system_mut().global_mut();
            let avg = global.montecarlo_avg() * (i as f64 / (i + 1) as f64)
                + global.montecarlo_current() / (i + 1) as f64;
            global.set_montecarlo_avg(avg);
        }
        debug!(
            "montecarlo finished after {budget} replications, average {}",
            self.simulator.system().global().montecarlo_avg()
        );
    }

    /// The wrapped single-run driver.
    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// The wrapped single-run driver, mutably.
    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.simulator
    }

    /// Consume the driver and return the wrapped simulator.
    pub fn into_inner(self) -> S {
        self.simulator
    }
}

impl<S> fmt::Debug for MonteCarlo<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonteCarlo").finish_non_exhaustive()
    }
}
