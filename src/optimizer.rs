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

//! Module for the black-box parameter optimizer.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{montecarlo::MonteCarlo, simulator::Simulator, types::SimError};

/// Direction of an optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Keep the smallest objective value seen.
    Minimize,
    /// Keep the largest objective value seen.
    Maximize,
}

/// The black-box optimizer: uniform sampling over an axis-aligned parameter box.
///
/// The objective is an arbitrary closure over the wrapped [`MonteCarlo`] driver; the usual
/// composition writes the sampled parameters into the model state, runs the Monte Carlo driver
/// and returns the running average, but any deterministic or stochastic scalar function works.
pub struct Optimizer<S, F> {
    montecarlo: MonteCarlo<S>,
    objective: F,
}

impl<S, F> Optimizer<S, F>
where
    S: Simulator,
    F: FnMut(&mut MonteCarlo<S>, &[f64]) -> f64,
{
    /// Create an optimizer from a Monte Carlo driver and an objective function.
    pub fn new(montecarlo: MonteCarlo<S>, objective: F) -> Self {
        Self {
            montecarlo,
            objective,
        }
    }

    /// Sample `optimizer_budget` parameter vectors uniformly inside the box spanned by `lows`
    /// and `highs`, evaluate the objective on each, and store the best value and the best
    /// parameters in the shared state.
    ///
    /// The best value starts at `+inf` under [`Strategy::Minimize`] and at the lowest finite
    /// value under [`Strategy::Maximize`]; only strict improvements are kept.
    pub fn optimize(
        &mut self,
        strategy: Strategy,
        lows: &[f64],
        highs: &[f64],
    ) -> Result<(), SimError> {
        if lows.len() != highs.len() {
            return Err(SimError::BoundsMismatch {
                lows: lows.len(),
                highs: highs.len(),
            });
        }
        let dims = lows.len();
        let budget = self
            .montecarlo
            .simulator()
            .system()
            .global()
            .optimizer_budget();
        let mut best = match strategy {
            Strategy::Minimize => f64::INFINITY,
            Strategy::Maximize => f64::MIN,
        };
        let mut best_params = vec![0.0; dims];
        let mut params = vec![0.0; dims];
        for i in 0..budget {
            {
                let random = self
                    .montecarlo
                    .simulator_mut()
                    .system_mut()
                    .global_mut()
                    .random_mut();
                for k in 0..dims {
                    params[k] = random.uniform_real(lows[k], highs[k]);
                }
            }
            let value = (self.objective)(&mut self.montecarlo, &params);
            let improves = match strategy {
                Strategy::Minimize => value < best,
                Strategy::Maximize => value > best,
            };
            if improves {
                best = value;
                best_params.copy_from_slice(&params);
                debug!("sample {i}: new best {best} at {best_params:?}");
            }
        }
        let global = self.montecarlo.simulator_mut().system_mut().global_mut();
        global.set_optimizer_result(best);
        global.set_optimizer_params(best_params);
        Ok(())
    }

    /// One-dimensional convenience entry point.
    pub fn optimize_scalar(
        &mut self,
        strategy: Strategy,
        low: f64,
        high: f64,
    ) -> Result<(), SimError> {
        self.optimize(strategy, &[low], &[high])
    }

    /// The wrapped Monte Carlo driver.
    pub fn montecarlo(&self) -> &MonteCarlo<S> {
        &self.montecarlo
    }

    /// The wrapped Monte Carlo driver, mutably.
    pub fn montecarlo_mut(&mut self) -> &mut MonteCarlo<S> {
        &mut self.montecarlo
    }

    /// Consume the optimizer and return the wrapped Monte Carlo driver.
    pub fn into_inner(self) -> MonteCarlo<S> {
        self.montecarlo
    }
}

impl<S, F> fmt::Debug for Optimizer<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Optimizer").finish_non_exhaustive()
    }
}
