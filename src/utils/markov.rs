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

//! Module for sampling discrete-time Markov chains with transition costs.

use serde::{Deserialize, Serialize};

use super::UtilsError;
use crate::random::RandomSource;

/// A discrete-time Markov chain whose transitions carry a cost.
///
/// Entry `(i, j)` holds the pair `(probability, cost)` of the transition from state `i` to state
/// `j`; the probabilities of each row must sum to one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkovChain {
    matrix: Vec<Vec<(f64, f64)>>,
}

impl MarkovChain {
    /// Create a chain over `states` states with all transition probabilities at zero.
    pub fn new(states: usize) -> Self {
        Self {
            matrix: vec![vec![(0.0, 0.0); states]; states],
        }
    }

    /// The number of states.
    pub fn states(&self) -> usize {
        self.matrix.len()
    }

    /// Set the probability and the cost of the transition `from -> to`.
    ///
    /// # Panics
    /// Panics if either state is out of range.
    pub fn set_transition(&mut self, from: usize, to: usize, probability: f64, cost: f64) {
        self.matrix[from][to] = (probability, cost);
    }

    /// The probability of the transition `from -> to`.
    ///
    /// # Panics
    /// Panics if either state is out of range.
    pub fn probability(&self, from: usize, to: usize) -> f64 {
        self.matrix[from][to].0
    }

    /// The cost of the transition `from -> to`.
    ///
    /// # Panics
    /// Panics if either state is out of range.
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.matrix[from][to].1
    }

    /// Sample the successor of `current` by inverse transform over the row probabilities.
    ///
    /// # Panics
    /// Panics if `current` is out of range.
    pub fn next_state(
        &self,
        current: usize,
        random: &mut RandomSource,
    ) -> Result<usize, UtilsError> {
        let draw = random.uniform_real(0.0, 1.0);
        let mut acc = 0.0;
        for (next, (probability, _)) in self.matrix[current].iter().enumerate() {
            acc += probability;
            if *probability > 0.0 && draw <= acc {
                return Ok(next);
            }
        }
        Err(UtilsError::BadDistribution(current))
    }

    /// Sample the successor of `current` and return it together with the transition cost.
    pub fn transition(
        &self,
        current: usize,
        random: &mut RandomSource,
    ) -> Result<(usize, f64), UtilsError> {
        let next = self.next_state(current, random)?;
        Ok((next, self.cost(current, next)))
    }
}
