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

//! The black-box optimizer, on closed-form objectives and on Monte Carlo estimates.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::prelude::*;

fn dummy_runner(seed: u64, budget: usize) -> Runner<(), ()> {
    let mut system = System::new(GlobalState::with_seed(seed), ());
    system.global_mut().set_horizon(0.0);
    system.global_mut().set_optimizer_budget(budget);
    Runner::new(system)
}

#[test]
fn minimizes_a_shifted_quadratic() {
    let montecarlo = MonteCarlo::new(dummy_runner(42, 2000));
    let mut optimizer =
        Optimizer::new(montecarlo, |_, params: &[f64]| (params[0] - 1.3).powi(2));
    optimizer
        .optimize_scalar(Strategy::Minimize, -5.0, 5.0)
        .unwrap();

    let global = optimizer.montecarlo().simulator().system().global();
    assert!(global.optimizer_result() <= 0.0225);
    let best = global.optimizer_params()[0];
    assert!((1.15..=1.45).contains(&best), "best parameter {best}");
}

#[test]
fn best_result_is_the_extremum_of_all_evaluations() {
    let evaluations = Rc::new(RefCell::new(Vec::new()));
    let seen = evaluations.clone();

    let montecarlo = MonteCarlo::new(dummy_runner(8, 500));
    let mut optimizer = Optimizer::new(montecarlo, move |_, params: &[f64]| {
        let value = params[0] + params[1];
        seen.borrow_mut().push(value);
        value
    });
    optimizer
        .optimize(Strategy::Maximize, &[0.0, 0.0], &[1.0, 1.0])
        .unwrap();

    let global = optimizer.montecarlo().simulator().system().global();
    let evaluations = evaluations.borrow();
    assert_eq!(evaluations.len(), 500);
    let maximum = evaluations.iter().fold(f64::MIN, |a, &b| a.max(b));
    assert_eq!(global.optimizer_result(), maximum);
    assert!(global
        .optimizer_params()
        .iter()
        .all(|p| (0.0..1.0).contains(p)));
}

#[test]
fn mismatched_bounds_are_rejected() {
    let montecarlo = MonteCarlo::new(dummy_runner(1, 10));
    let mut optimizer = Optimizer::new(montecarlo, |_, _: &[f64]| 0.0);
    assert_eq!(
        optimizer.optimize(Strategy::Minimize, &[0.0], &[0.0, 1.0]),
        Err(SimError::BoundsMismatch { lows: 1, highs: 2 })
    );
}

/// Run-independent configuration written by the optimizer's objective: the per-run value is a
/// noiseless function of the configured target.
#[derive(Debug, Default)]
struct Config {
    target: f64,
}

impl UserState for Config {
    // the target is configuration, not run-local state, so reset keeps it
}

struct ConfiguredSim {
    system: System<(), Config>,
}

impl Simulator for ConfiguredSim {
    type Payload = ();
    type State = Config;

    fn system(&self) -> &System<(), Config> {
        &self.system
    }

    fn system_mut(&mut self) -> &mut System<(), Config> {
        &mut self.system
    }

    fn on_terminate(&mut self) {
        let value = (self.system.state().target - 2.0).powi(2);
        self.system.global_mut().set_montecarlo_current(value);
    }
}

#[test]
fn objective_composed_with_montecarlo() {
    let mut system = System::new(GlobalState::with_seed(6), Config::default());
    system.global_mut().set_horizon(0.0);
    system.global_mut().set_montecarlo_budget(3);
    system.global_mut().set_optimizer_budget(300);

    let montecarlo = MonteCarlo::new(ConfiguredSim { system });
    let mut optimizer = Optimizer::new(montecarlo, |mc: &mut MonteCarlo<ConfiguredSim>, p: &[f64]| {
        mc.simulator_mut().system_mut().state_mut().target = p[0];
        mc.run();
        mc.simulator().system().global().montecarlo_avg()
    });
    optimizer
        .optimize_scalar(Strategy::Minimize, -10.0, 10.0)
        .unwrap();

    let global = optimizer.montecarlo().simulator().system().global();
    assert!(global.optimizer_result() < 0.25);
    assert!((global.optimizer_params()[0] - 2.0).abs() < 0.5);
}
