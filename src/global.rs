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

//! Module for the shared configuration and state container of a system.

use std::fmt;

use log::trace;

use crate::{
    message::{Channel, Message},
    random::RandomSource,
    types::{ProcessId, Time},
};

/// Model-specific shared state living next to the kernel's [`GlobalState`].
///
/// Implementors hold whatever the model needs to share between its routines, its drivers and its
/// monitors. [`UserState::reset`] is invoked by [`System::init`](crate::system::System::init) at
/// the start of every run, right after the kernel state was reset, so that Monte Carlo
/// replications start from identical conditions.
pub trait UserState {
    /// Restore the run-local part of the state. Configuration that must survive between
    /// replications is simply left untouched.
    fn reset(&mut self) {}
}

impl UserState for () {}

/// Shared configuration, channels and results of one system.
///
/// The container owns the [`RandomSource`], the per-process input and output channels, and the
/// simulation parameters and results exchanged between user hooks and the drivers. It is
/// constructed once per system; [`GlobalState::init`] is called at the start of every run.
pub struct GlobalState<M> {
    random: RandomSource,
    channel_in: Vec<Channel<M>>,
    channel_out: Vec<Channel<M>>,
    horizon: Time,
    montecarlo_budget: usize,
    optimizer_budget: usize,
    network_count: usize,
    montecarlo_avg: f64,
    montecarlo_current: f64,
    optimizer_result: f64,
    optimizer_params: Vec<f64>,
}

impl<M> GlobalState<M> {
    /// Create a container with a nondeterministically seeded random source. The horizon starts
    /// at infinity: either set one or terminate runs with a custom predicate.
    pub fn new() -> Self {
        Self::with_random(RandomSource::new())
    }

    /// Create a container with a seeded random source, the reproducible path.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_random(RandomSource::with_seed(seed))
    }

    /// Create a container around an existing random source.
    pub fn with_random(random: RandomSource) -> Self {
        Self {
            random,
            channel_in: Vec::new(),
            channel_out: Vec::new(),
            horizon: f64::INFINITY,
            montecarlo_budget: 0,
            optimizer_budget: 0,
            network_count: 0,
            montecarlo_avg: 0.0,
            montecarlo_current: 0.0,
            optimizer_result: 0.0,
            optimizer_params: Vec::new(),
        }
    }

    /// Reset the run-local state: clear every input and output channel and zero the per-run
    /// value. All other configuration and results are preserved. The random source is *not*
    /// reseeded, otherwise Monte Carlo replications would all be identical.
    pub fn init(&mut self) {
        for channel in &mut self.channel_in {
            channel.clear();
        }
        for channel in &mut self.channel_out {
            channel.clear();
        }
        self.montecarlo_current = 0.0;
        trace!("global state reset for a new run");
    }

    /// Mutable access to the shared random source.
    pub fn random_mut(&mut self) -> &mut RandomSource {
        &mut self.random
    }

    /// Push a message into its sender's output channel. This is the only path by which messages
    /// enter the system.
    ///
    /// # Panics
    /// Panics if the sender id does not belong to a registered process.
    pub fn send(&mut self, message: Message<M>) {
        self.channel_out[message.sender.index()].push_back(message);
    }

    /// Number of registered channel pairs, which equals the number of registered processes.
    pub fn channels(&self) -> usize {
        self.channel_out.len()
    }

    /// All input channels, indexed by absolute id.
    pub fn channels_in(&self) -> &[Channel<M>] {
        &self.channel_in
    }

    /// All output channels, indexed by absolute id.
    pub fn channels_out(&self) -> &[Channel<M>] {
        &self.channel_out
    }

    /// The input channel of the given process.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    pub fn channel_in(&self, id: ProcessId) -> &Channel<M> {
        &self.channel_in[id.index()]
    }

    /// The input channel of the given process, mutably.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    pub fn channel_in_mut(&mut self, id: ProcessId) -> &mut Channel<M> {
        &mut self.channel_in[id.index()]
    }

    /// The output channel of the given process.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    pub fn channel_out(&self, id: ProcessId) -> &Channel<M> {
        &self.channel_out[id.index()]
    }

    /// The output channel of the given process, mutably.
    ///
    /// # Panics
    /// Panics if the id is out of range.
    pub fn channel_out_mut(&mut self, id: ProcessId) -> &mut Channel<M> {
        &mut self.channel_out[id.index()]
    }

    /// Grow both channel vectors to hold `len` processes.
    pub(crate) fn grow(&mut self, len: usize) {
        self.channel_in.resize_with(len, Channel::new);
        self.channel_out.resize_with(len, Channel::new);
    }

    /// The default run-termination bound.
    pub fn horizon(&self) -> Time {
        self.horizon
    }

    /// Set the default run-termination bound.
    pub fn set_horizon(&mut self, horizon: Time) {
        self.horizon = horizon;
    }

    /// Number of replications the Monte Carlo driver performs.
    pub fn montecarlo_budget(&self) -> usize {
        self.montecarlo_budget
    }

    /// Set the number of Monte Carlo replications.
    pub fn set_montecarlo_budget(&mut self, budget: usize) {
        self.montecarlo_budget = budget;
    }

    /// Number of parameter samples the optimizer evaluates.
    pub fn optimizer_budget(&self) -> usize {
        self.optimizer_budget
    }

    /// Set the number of optimizer samples.
    pub fn set_optimizer_budget(&mut self, budget: usize) {
        self.optimizer_budget = budget;
    }

    /// Advisory network count, set and read by models.
    pub fn network_count(&self) -> usize {
        self.network_count
    }

    /// Set the advisory network count.
    pub fn set_network_count(&mut self, count: usize) {
        self.network_count = count;
    }

    /// Running average maintained by the Monte Carlo driver.
    pub fn montecarlo_avg(&self) -> f64 {
        self.montecarlo_avg
    }

    /// Overwrite the Monte Carlo running average.
    pub fn set_montecarlo_avg(&mut self, avg: f64) {
        self.montecarlo_avg = avg;
    }

    /// The per-run value, written by the end-of-run hook of the model and consumed by the Monte
    /// Carlo driver.
    pub fn montecarlo_current(&self) -> f64 {
        self.montecarlo_current
    }

    /// Write the per-run value.
    pub fn set_montecarlo_current(&mut self, current: f64) {
        self.montecarlo_current = current;
    }

    /// Best objective value found by the optimizer.
    pub fn optimizer_result(&self) -> f64 {
        self.optimizer_result
    }

    /// Overwrite the best objective value.
    pub fn set_optimizer_result(&mut self, result: f64) {
        self.optimizer_result = result;
    }

    /// Parameter vector achieving [`GlobalState::optimizer_result`].
    pub fn optimizer_params(&self) -> &[f64] {
        &self.optimizer_params
    }

    /// Overwrite the best parameter vector.
    pub fn set_optimizer_params(&mut self, params: Vec<f64>) {
        self.optimizer_params = params;
    }
}

impl<M> Default for GlobalState<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for GlobalState<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalState")
            .field("channels", &self.channel_out.len())
            .field("horizon", &self.horizon)
            .field("montecarlo_budget", &self.montecarlo_budget)
            .field("optimizer_budget", &self.optimizer_budget)
            .field("montecarlo_avg", &self.montecarlo_avg)
            .field("montecarlo_current", &self.montecarlo_current)
            .finish_non_exhaustive()
    }
}
