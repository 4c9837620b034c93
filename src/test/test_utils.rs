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

//! The measurement and sampling utilities.

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;

use crate::optimizer::Strategy;
use crate::random::RandomSource;
use crate::utils::markov::MarkovChain;
use crate::utils::search::arg_min_max;
use crate::utils::{RateMeter, UtilsError};

#[test]
fn rate_meter_tracks_amount_per_denominator() {
    let mut meter = RateMeter::new();
    assert!(!meter.updated());

    meter.record(2.0, 1.0).unwrap();
    assert_eq!(meter.rate(), 2.0);
    meter.advance(2.0).unwrap();
    assert_eq!(meter.rate(), 1.0);
    meter.record(4.0, 4.0).unwrap();
    // total of 6 over a denominator of 4
    assert_eq!(meter.rate(), 1.5);
    assert!(meter.updated());

    assert_eq!(meter.record(1.0, 0.0), Err(UtilsError::ZeroDenominator));

    meter.reset();
    assert_eq!(meter.rate(), 0.0);
    assert!(!meter.updated());
}

#[test]
fn markov_chain_samples_the_row_distribution() {
    let mut chain = MarkovChain::new(2);
    chain.set_transition(0, 0, 0.7, 0.5);
    chain.set_transition(0, 1, 0.3, 2.0);
    chain.set_transition(1, 1, 1.0, 0.0);
    assert_eq!(chain.states(), 2);
    assert_eq!(chain.probability(0, 1), 0.3);
    assert_eq!(chain.cost(0, 1), 2.0);

    let mut random = RandomSource::with_seed(5);
    let samples = 10_000;
    let mut moved = 0;
    for _ in 0..samples {
        let (next, cost) = chain.transition(0, &mut random).unwrap();
        if next == 1 {
            assert_eq!(cost, 2.0);
            moved += 1;
        } else {
            assert_eq!(cost, 0.5);
        }
    }
    assert_abs_diff_eq!(moved as f64 / samples as f64, 0.3, epsilon = 0.02);
}

#[test]
fn markov_chain_rejects_an_undefined_row() {
    let chain = MarkovChain::new(2);
    let mut random = RandomSource::with_seed(1);
    assert_eq!(
        chain.next_state(0, &mut random),
        Err(UtilsError::BadDistribution(0))
    );
}

#[test]
fn arg_min_max_finds_all_extrema() {
    // unique minimum of a separable quadratic
    let (bucket, best) = arg_min_max(
        &[(-3, 3), (-3, 3)],
        |p| ((p[0] - 2) * (p[0] - 2) + (p[1] + 1) * (p[1] + 1)) as f64,
        Strategy::Minimize,
    );
    assert_eq!(bucket, vec![vec![2, -1]]);
    assert_eq!(best, 0.0);

    // two symmetric minima, reported in enumeration order
    let (bucket, best) = arg_min_max(
        &[(-2, 2)],
        |p| {
            let square = (p[0] * p[0] - 1) as f64;
            square * square
        },
        Strategy::Minimize,
    );
    assert_eq!(bucket, vec![vec![-1], vec![1]]);
    assert_eq!(best, 0.0);

    // maximization over a linear objective
    let (bucket, best) = arg_min_max(&[(0, 3)], |p| p[0] as f64, Strategy::Maximize);
    assert_eq!(bucket, vec![vec![3]]);
    assert_eq!(best, 3.0);
}
