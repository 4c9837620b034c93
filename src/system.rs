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

//! # Top-level System module
//!
//! The [`System`] owns the virtual clock, the registered processes, the routing processes and
//! the world directory, and advances the simulation one step at a time.

use std::collections::HashMap;
use std::fmt;

use log::{debug, trace, warn};
use ordered_float::NotNan;
use rand::seq::SliceRandom;

use crate::{
    global::{GlobalState, UserState},
    message::Message,
    network::{PidHooks, Scanner, SLEEP_MIN},
    process::{Process, Task},
    types::{ProcessId, SimError, Time, WorldKey, DEFAULT_WORLD},
};

/// The world directory of a system: which processes belong to which world, and the inverse.
///
/// Absolute ids are dense and stable; relative ids within a world are dense and stable in
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    worlds: HashMap<WorldKey, Vec<ProcessId>>,
    entries: Vec<(WorldKey, usize)>,
}

impl Directory {
    /// Record a newly registered process and return its relative id.
    pub(crate) fn register(&mut self, world: WorldKey, id: ProcessId) -> usize {
        debug_assert_eq!(id.index(), self.entries.len());
        let members = self.worlds.entry(world.clone()).or_default();
        let rel_id = members.len();
        members.push(id);
        self.entries.push((world, rel_id));
        rel_id
    }

    /// Resolve `(world, rel_id)` to the absolute id of the `rel_id`-th process registered to the
    /// world.
    pub fn abs_id(&self, world: &str, rel_id: usize) -> Result<ProcessId, SimError> {
        let members = self
            .worlds
            .get(world)
            .ok_or_else(|| SimError::WorldNotFound(world.to_string()))?;
        members
            .get(rel_id)
            .copied()
            .ok_or_else(|| SimError::RelIdOutOfRange {
                world: world.to_string(),
                rel_id,
                size: members.len(),
            })
    }

    /// Resolve an absolute id to its `(world, rel_id)` pair.
    pub fn rel_id(&self, id: ProcessId) -> Result<(&str, usize), SimError> {
        self.entries
            .get(id.index())
            .map(|(world, rel_id)| (world.as_str(), *rel_id))
            .ok_or(SimError::ProcessNotFound(id))
    }

    /// The number of processes registered to a world.
    pub fn world_size(&self, world: &str) -> Result<usize, SimError> {
        self.worlds
            .get(world)
            .map(Vec::len)
            .ok_or_else(|| SimError::WorldNotFound(world.to_string()))
    }

    /// The absolute ids registered to a world, in registration order.
    pub fn members(&self, world: &str) -> Result<&[ProcessId], SimError> {
        self.worlds
            .get(world)
            .map(Vec::as_slice)
            .ok_or_else(|| SimError::WorldNotFound(world.to_string()))
    }

    /// The total number of worlds.
    pub fn worlds_count(&self) -> usize {
        self.worlds.len()
    }
}

/// Hook invoked at the end of every step, with full access to the system.
pub type EndStepHook<M, G> = Box<dyn FnMut(&mut System<M, G>)>;

/// # System struct
///
/// The system owns the virtual clock, the ordered set of processes, the routing processes, the
/// world directory, the shared [`GlobalState`] and the model state `G`.
///
/// A step advances the clock to the minimum next-due time over all enabled processes and all
/// routing processes, then schedules the enabled processes in a pseudo-random order drawn from
/// the shared random source, then the routing processes in declaration order, and finally runs
/// the end-of-step hook. [`System::init`] fully resets the run-local state, so that repeated
/// runs are independent replications given the random stream.
pub struct System<M, G = ()> {
    name: String,
    clock: Time,
    processes: Vec<Process<M, G>>,
    networks: Vec<Process<M, G>>,
    directory: Directory,
    global: GlobalState<M>,
    state: G,
    end_step_hook: Option<EndStepHook<M, G>>,
    stalled: bool,
}

impl<M, G: UserState> System<M, G> {
    /// Create a system from its shared kernel state and its model state.
    pub fn new(global: GlobalState<M>, state: G) -> Self {
        Self::named(global, state, "system")
    }

    /// Create a named system.
    pub fn named(global: GlobalState<M>, state: G, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clock: 0.0,
            processes: Vec::new(),
            networks: Vec::new(),
            directory: Directory::default(),
            global,
            state,
            end_step_hook: None,
            stalled: false,
        }
    }

    /// The name of the system.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current simulated time.
    pub fn clock(&self) -> Time {
        self.clock
    }

    /// Whether the last step found no pending event and saturated the clock at infinity.
    pub fn stalled(&self) -> bool {
        self.stalled
    }

    /// The shared kernel state.
    pub fn global(&self) -> &GlobalState<M> {
        &self.global
    }

    /// The shared kernel state, mutably.
    pub fn global_mut(&mut self) -> &mut GlobalState<M> {
        &mut self.global
    }

    /// The model state.
    pub fn state(&self) -> &G {
        &self.state
    }

    /// The model state, mutably.
    pub fn state_mut(&mut self) -> &mut G {
        &mut self.state
    }

    /// The world directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Register a process to the default world and return its absolute id.
    pub fn add_process(&mut self, process: Process<M, G>) -> ProcessId {
        self.add_process_to(process, DEFAULT_WORLD)
    }

    /// Register a process to the given world and return its absolute id.
    ///
    /// The absolute id is the number of processes registered so far; the relative id is the size
    /// of the world before the insertion. Both channel vectors grow to match.
    pub fn add_process_to(
        &mut self,
        mut process: Process<M, G>,
        world: impl Into<WorldKey>,
    ) -> ProcessId {
        let id = ProcessId(self.processes.len());
        let world = world.into();
        let rel_id = self.directory.register(world.clone(), id);
        process.assign(id, world, rel_id);
        self.processes.push(process);
        self.global.grow(self.processes.len());
        debug!("registered process {id} ({} total)", self.processes.len());
        id
    }

    /// Register a routing process. Routing processes are scheduled after every ordinary process
    /// within a step and are not part of any world.
    pub fn add_network(&mut self, network: Process<M, G>) {
        self.networks.push(network);
        debug!("registered routing process ({} total)", self.networks.len());
    }

    /// Register a default round-robin scanner network with the given timing.
    pub fn add_scanner_network(&mut self, compute: Time, sleep: Time, first_due: Time) {
        let network =
            Process::named("network").with_task(Task::new(compute, sleep, first_due, Scanner::new()));
        self.add_network(network);
    }

    /// Register a PID-controlled scanner network targeting the given mean channel occupancy.
    pub fn add_pid_network(&mut self, set_point: f64, first_due: Time, error_threshold: f64) {
        let network = Process::named("pid network").with_task(Task::new(
            0.2,
            SLEEP_MIN,
            first_due,
            Scanner::with_hooks(PidHooks::new(set_point, error_threshold)),
        ));
        self.add_network(network);
    }

    /// All registered processes, in registration order.
    pub fn processes(&self) -> &[Process<M, G>] {
        &self.processes
    }

    /// The process with the given absolute id.
    pub fn process(&self, id: ProcessId) -> Result<&Process<M, G>, SimError> {
        self.processes
            .get(id.index())
            .ok_or(SimError::ProcessNotFound(id))
    }

    /// All processes registered to a world, in registration order.
    pub fn processes_in(&self, world: &str) -> Result<Vec<&Process<M, G>>, SimError> {
        Ok(self
            .directory
            .members(world)?
            .iter()
            .map(|id| &self.processes[id.index()])
            .collect())
    }

    /// All routing processes, in declaration order.
    pub fn networks(&self) -> &[Process<M, G>] {
        &self.networks
    }

    /// Resolve `(world, rel_id)` to an absolute id.
    pub fn abs_id(&self, world: &str, rel_id: usize) -> Result<ProcessId, SimError> {
        self.directory.abs_id(world, rel_id)
    }

    /// Resolve an absolute id to its `(world, rel_id)` pair.
    pub fn rel_id(&self, id: ProcessId) -> Result<(&str, usize), SimError> {
        self.directory.rel_id(id)
    }

    /// The number of processes registered to a world.
    pub fn world_size(&self, world: &str) -> Result<usize, SimError> {
        self.directory.world_size(world)
    }

    /// The total number of worlds.
    pub fn worlds_count(&self) -> usize {
        self.directory.worlds_count()
    }

    /// Push a message into its sender's output channel.
    ///
    /// # Panics
    /// Panics if the sender id does not belong to a registered process.
    pub fn send(&mut self, message: Message<M>) {
        self.global.send(message);
    }

    /// Install the hook invoked at the end of every step.
    pub fn set_end_step_hook(&mut self, hook: impl FnMut(&mut System<M, G>) + 'static) {
        self.end_step_hook = Some(Box::new(hook));
    }

    /// Disable or re-enable a process.
    ///
    /// Disabled processes are skipped both in the clock computation and in scheduling.
    /// Re-enabling realigns the next-due times of the process's active tasks to the current
    /// clock, so no catch-up of missed activations fires.
    pub fn set_process_enabled(&mut self, id: ProcessId, enabled: bool) -> Result<(), SimError> {
        let clock = self.clock;
        let process = self
            .processes
            .get_mut(id.index())
            .ok_or(SimError::ProcessNotFound(id))?;
        process.set_enabled(enabled, clock);
        Ok(())
    }

    /// Reset the system for a new run: reset the shared state and the model state, re-enable and
    /// initialize every process and every routing process, and set the clock to zero.
    pub fn init(&mut self) {
        self.global.init();
        self.state.reset();
        for process in &mut self.processes {
            process.enable_for_run();
            process.init();
        }
        for network in &mut self.networks {
            network.init();
        }
        self.clock = 0.0;
        self.stalled = false;
    }

    /// Advance the simulation by one step.
    pub fn step(&mut self) {
        self.advance_clock();
        let clock = self.clock;
        let mut order: Vec<usize> = (0..self.processes.len()).collect();
        order.shuffle(self.global.random_mut().engine());
        {
            let Self {
                processes,
                networks,
                directory,
                global,
                state,
                ..
            } = self;
            for idx in order {
                let process = &mut processes[idx];
                if !process.is_enabled() {
                    continue;
                }
                process.schedule(clock, directory, global, state);
            }
            for network in networks.iter_mut() {
                network.schedule(clock, directory, global, state);
            }
        }
        if let Some(mut hook) = self.end_step_hook.take() {
            hook(self);
            if self.end_step_hook.is_none() {
                self.end_step_hook = Some(hook);
            }
        }
    }

    /// Set the clock to the minimum next-due time over all enabled processes and all routing
    /// processes. With no pending event the clock saturates at infinity.
    fn advance_clock(&mut self) {
        let next = self
            .processes
            .iter()
            .filter(|p| p.is_enabled())
            .map(Process::next_update_time)
            .chain(self.networks.iter().map(Process::next_update_time))
            .filter_map(|t| NotNan::new(t).ok())
            .min()
            .map(NotNan::into_inner)
            .unwrap_or(f64::INFINITY);
        if next.is_infinite() && !self.stalled {
            warn!("no pending event in system {}; the clock saturates", self.name);
            self.stalled = true;
        }
        trace!("step at time {next}");
        self.clock = next;
    }
}

impl<M, G> fmt::Debug for System<M, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("name", &self.name)
            .field("clock", &self.clock)
            .field("processes", &self.processes.len())
            .field("networks", &self.networks.len())
            .field("worlds", &self.directory.worlds_count())
            .finish_non_exhaustive()
    }
}
