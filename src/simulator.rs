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

//! Module for the single-run driver.

use log::trace;

use crate::{global::UserState, system::System};

/// The single-run driver of a system.
///
/// A run initializes the system and then steps it until the termination predicate holds.
/// Implementors provide access to their system and may override [`Simulator::should_terminate`]
/// (default: clock at or beyond the horizon) and [`Simulator::on_terminate`] (default: nothing;
/// models typically write the scalar per-run value into the shared state here, for the Monte
/// Carlo driver to pick up).
///
/// A run with no pending event saturates the clock at infinity, which the default predicate
/// treats as termination; a custom predicate must guard against stalling on its own, typically
/// through the horizon.
pub trait Simulator {
    /// Message payload of the simulated system.
    type Payload;
    /// Model state of the simulated system.
    type State: UserState;

    /// The driven system.
    fn system(&self) -> &System<Self::Payload, Self::State>;

    /// The driven system, mutably.
    fn system_mut(&mut self) -> &mut System<Self::Payload, Self::State>;

    /// Whether the run is over. The default compares the clock against the horizon.
    fn should_terminate(&self) -> bool {
        self.system().clock() >= self.system().global().horizon()
    }

    /// Invoked once after the run terminated.
    fn on_terminate(&mut self) {}

    /// Perform one full run: initialize, step until the predicate holds, then finalize.
    fn run(&mut self) {
        self.system_mut().init();
        while !self.should_terminate() {
            self.system_mut().step();
        }
        trace!("run terminated at time {}", self.system().clock());
        self.on_terminate();
    }
}

/// The plain horizon-bounded driver.
#[derive(Debug)]
pub struct Runner<M, G = ()> {
    system: System<M, G>,
}

impl<M, G: UserState> Runner<M, G> {
    /// Create a driver around a system.
    pub fn new(system: System<M, G>) -> Self {
        Self { system }
    }

    /// Consume the driver and return its system.
    pub fn into_inner(self) -> System<M, G> {
        self.system
    }
}

impl<M, G: UserState> Simulator for Runner<M, G> {
    type Payload = M;
    type State = G;

    fn system(&self) -> &System<M, G> {
        &self.system
    }

    fn system_mut(&mut self) -> &mut System<M, G> {
        &mut self.system
    }
}
