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

//! Module for processes and their periodic tasks.
//!
//! A [`Process`] groups a set of [`Task`]s; each task wraps a user-defined [`Routine`] together
//! with its timing (compute time, sleep time and the simulated time it is next due). During a
//! step, the routine receives a [`Context`] exposing exactly the capabilities a step needs:
//! the clock, the identity of its process, its own timing, message passing, addressing and the
//! shared state.

use std::fmt;

use log::trace;
use rand::seq::SliceRandom;

use crate::{
    global::GlobalState,
    message::Message,
    random::RandomSource,
    system::Directory,
    types::{ProcessId, SimError, Time, WorldKey},
};

/// The user-defined step of a [`Task`].
///
/// `M` is the message payload type of the model and `G` its [`UserState`]. A step may send
/// messages, drain the input queue of its process, adjust its own timing for the next cycle, and
/// read or write the shared state.
///
/// [`UserState`]: crate::global::UserState
pub trait Routine<M, G> {
    /// Perform one activation of the task. Called whenever the task is due during a schedule
    /// pass.
    fn step(&mut self, cx: &mut Context<'_, M, G>);

    /// Restore routine-local state at the start of a run. The timing of the surrounding task is
    /// restored by the kernel; this hook only needs to reset what the routine itself owns.
    fn reset(&mut self) {}
}

/// Timing state of a task.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Timing {
    pub(crate) compute: Time,
    pub(crate) sleep: Time,
    pub(crate) next_due: Time,
    pub(crate) enabled: bool,
}

/// A periodic task: a [`Routine`] plus its timing.
///
/// After every activation the next-due time advances by `compute + sleep`, evaluated *after* the
/// step returned, so a step may dynamically choose its next period. The values given at
/// construction are captured and restored by [`Process::init`] at the start of every run.
pub struct Task<M, G> {
    timing: Timing,
    initial: Timing,
    routine: Box<dyn Routine<M, G>>,
}

impl<M, G> Task<M, G> {
    /// Create a task from its compute time, sleep time, first due time and routine.
    pub fn new<R>(compute: Time, sleep: Time, first_due: Time, routine: R) -> Self
    where
        R: Routine<M, G> + 'static,
    {
        let timing = Timing {
            compute,
            sleep,
            next_due: first_due,
            enabled: true,
        };
        Self {
            initial: timing.clone(),
            timing,
            routine: Box::new(routine),
        }
    }

    /// Restore the initial timing and reset the routine.
    pub fn init(&mut self) {
        self.timing = self.initial.clone();
        self.routine.reset();
    }

    /// The compute time of the task.
    pub fn compute_time(&self) -> Time {
        self.timing.compute
    }

    /// The sleep time of the task.
    pub fn sleep_time(&self) -> Time {
        self.timing.sleep
    }

    /// The simulated time at which the task is next due.
    pub fn next_due(&self) -> Time {
        self.timing.next_due
    }

    /// Whether the task participates in scheduling.
    pub fn is_enabled(&self) -> bool {
        self.timing.enabled
    }

    /// Run the step if the task is due at `now`, then advance the next-due time.
    pub(crate) fn schedule(
        &mut self,
        now: Time,
        meta: &ProcessMeta,
        directory: &Directory,
        global: &mut GlobalState<M>,
        state: &mut G,
    ) {
        if self.timing.next_due > now {
            return;
        }
        let mut cx = Context {
            now,
            meta,
            timing: &mut self.timing,
            directory,
            global,
            state,
        };
        self.routine.step(&mut cx);
        self.timing.next_due += self.timing.compute + self.timing.sleep;
    }

    pub(crate) fn realign(&mut self, clock: Time) {
        if self.timing.enabled {
            self.timing.next_due = clock;
        }
    }
}

impl<M, G> fmt::Debug for Task<M, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

/// Identity assigned to a process at registration.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProcessMeta {
    pub(crate) id: Option<ProcessId>,
    pub(crate) world: Option<WorldKey>,
    pub(crate) rel_id: Option<usize>,
}

/// A process: a named, ordered collection of periodic tasks.
///
/// A process may be scheduled only after it has been registered in a
/// [`System`](crate::system::System), which assigns its absolute id, its world and its relative
/// id within that world. The system exclusively owns its processes.
pub struct Process<M, G> {
    name: String,
    meta: ProcessMeta,
    tasks: Vec<Task<M, G>>,
    enabled: bool,
}

impl<M, G> Process<M, G> {
    /// Create an empty process with a default name.
    pub fn new() -> Self {
        Self::named("process")
    }

    /// Create an empty process with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: ProcessMeta::default(),
            tasks: Vec::new(),
            enabled: true,
        }
    }

    /// Append a task, consuming and returning the process for chaining.
    pub fn with_task(mut self, task: Task<M, G>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Append a task.
    pub fn add_task(&mut self, task: Task<M, G>) -> &mut Self {
        self.tasks.push(task);
        self
    }

    /// The name of the process.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The absolute id, if the process is registered.
    pub fn id(&self) -> Option<ProcessId> {
        self.meta.id
    }

    /// The world key, if the process is registered.
    pub fn world(&self) -> Option<&str> {
        self.meta.world.as_deref()
    }

    /// The relative id within the world, if the process is registered.
    pub fn rel_id(&self) -> Option<usize> {
        self.meta.rel_id
    }

    /// The tasks owned by this process, in declaration order.
    pub fn tasks(&self) -> &[Task<M, G>] {
        &self.tasks
    }

    /// Whether the process participates in scheduling.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Initialize every owned task for a new run.
    pub fn init(&mut self) {
        for task in &mut self.tasks {
            task.init();
        }
    }

    /// The minimum next-due time over the enabled tasks, or infinity if there is none.
    pub fn next_update_time(&self) -> Time {
        self.tasks
            .iter()
            .filter(|t| t.timing.enabled)
            .map(Task::next_due)
            .fold(f64::INFINITY, f64::min)
    }

    /// Schedule every enabled task at `now`, in a pseudo-random order drawn from the shared
    /// random source. The shuffle removes any bias from the task declaration order while keeping
    /// the run deterministic given the seed.
    pub(crate) fn schedule(
        &mut self,
        now: Time,
        directory: &Directory,
        global: &mut GlobalState<M>,
        state: &mut G,
    ) {
        let Self { meta, tasks, .. } = self;
        let mut order: Vec<usize> = (0..tasks.len()).collect();
        order.shuffle(global.random_mut().engine());
        for idx in order {
            let task = &mut tasks[idx];
            if !task.timing.enabled {
                continue;
            }
            task.schedule(now, meta, directory, global, state);
        }
    }

    pub(crate) fn assign(&mut self, id: ProcessId, world: WorldKey, rel_id: usize) {
        trace!("register process {} as {id} ({world}, {rel_id})", self.name);
        self.meta = ProcessMeta {
            id: Some(id),
            world: Some(world),
            rel_id: Some(rel_id),
        };
    }

    /// Flip the enabled flag. Re-enabling realigns the next-due time of every active task to the
    /// current clock, so that the process does not catch up on events it missed while disabled.
    /// Tasks that disabled themselves stay disabled.
    pub(crate) fn set_enabled(&mut self, enabled: bool, clock: Time) {
        self.enabled = enabled;
        if enabled {
            for task in &mut self.tasks {
                task.realign(clock);
            }
        }
    }

    /// Re-enable the process for a fresh run, without realignment.
    pub(crate) fn enable_for_run(&mut self) {
        self.enabled = true;
    }
}

impl<M, G> Default for Process<M, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, G> fmt::Debug for Process<M, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("name", &self.name)
            .field("meta", &self.meta)
            .field("tasks", &self.tasks.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// The capabilities available to a [`Routine`] during one activation.
///
/// The context replaces back-references from tasks to their process and system: it exposes the
/// clock, the identity of the owning process, the timing of the running task, message passing,
/// addressing and the shared state, and nothing else.
pub struct Context<'a, M, G> {
    now: Time,
    meta: &'a ProcessMeta,
    timing: &'a mut Timing,
    directory: &'a Directory,
    global: &'a mut GlobalState<M>,
    state: &'a mut G,
}

impl<M, G> Context<'_, M, G> {
    /// The current simulated time.
    pub fn time(&self) -> Time {
        self.now
    }

    /// The absolute id of the owning process.
    ///
    /// # Panics
    /// Panics if the process was never registered. The kernel only schedules registered
    /// processes, so this can only fire for routing processes, which have no world identity.
    pub fn id(&self) -> ProcessId {
        self.meta.id.expect("the process is not registered")
    }

    /// The world of the owning process, if it is registered to one.
    pub fn world(&self) -> Option<&str> {
        self.meta.world.as_deref()
    }

    /// The relative id of the owning process within its world, if it is registered to one.
    pub fn rel_id(&self) -> Option<usize> {
        self.meta.rel_id
    }

    /// The compute time of the running task.
    pub fn compute_time(&self) -> Time {
        self.timing.compute
    }

    /// Set the compute time of the running task, effective from the current activation.
    pub fn set_compute_time(&mut self, compute: Time) {
        self.timing.compute = compute;
    }

    /// The sleep time of the running task.
    pub fn sleep_time(&self) -> Time {
        self.timing.sleep
    }

    /// Set the sleep time of the running task, effective from the current activation.
    pub fn set_sleep_time(&mut self, sleep: Time) {
        self.timing.sleep = sleep;
    }

    /// The next-due time of the running task. During an activation this still holds the time the
    /// task became due.
    pub fn next_due(&self) -> Time {
        self.timing.next_due
    }

    /// Overwrite the next-due time of the running task. The kernel still adds
    /// `compute + sleep` when the step returns.
    pub fn set_next_due(&mut self, next_due: Time) {
        self.timing.next_due = next_due;
    }

    /// Remove the running task from all future schedule passes of this run.
    pub fn disable(&mut self) {
        self.timing.enabled = false;
    }

    /// Send a message to the process with the given absolute id.
    ///
    /// The envelope is filled from the owning process and the clock, and the message is enqueued
    /// into the *sender's own* output channel; a routing process moves it to the receiver later.
    ///
    /// # Panics
    /// Panics if the owning process is not registered to a world (routing processes cannot
    /// send).
    pub fn send(&mut self, receiver: ProcessId, payload: M) {
        let sender = self.meta.id.expect("only a registered process can send");
        let sender_world = self
            .meta
            .world
            .clone()
            .expect("only a process registered to a world can send");
        let sender_rel_id = self
            .meta
            .rel_id
            .expect("only a process registered to a world can send");
        self.global.send(Message {
            receiver,
            sender,
            sender_rel_id,
            sender_world,
            timestamp: self.now,
            payload,
        });
    }

    /// Send a message to the process addressed by `(world, rel_id)`.
    pub fn send_to(&mut self, world: &str, rel_id: usize, payload: M) -> Result<(), SimError> {
        let receiver = self.directory.abs_id(world, rel_id)?;
        self.send(receiver, payload);
        Ok(())
    }

    /// Dequeue one message from the input channel of the owning process, or `None` if the
    /// channel is empty. The caller decides whether to drain the channel or to stop after one
    /// message per step.
    ///
    /// # Panics
    /// Panics if the front message is not addressed to the owning process. If that fires,
    /// something went really wrong inside the routing layer.
    pub fn recv(&mut self) -> Option<Message<M>> {
        let id = self.meta.id.expect("only a registered process can receive");
        let message = self.global.channel_in_mut(id).pop_front()?;
        assert_eq!(
            message.receiver, id,
            "message for {} delivered to {}",
            message.receiver, id
        );
        Some(message)
    }

    /// Resolve `(world, rel_id)` to an absolute id.
    pub fn abs_id(&self, world: &str, rel_id: usize) -> Result<ProcessId, SimError> {
        self.directory.abs_id(world, rel_id)
    }

    /// Resolve an absolute id to its `(world, rel_id)` pair.
    pub fn rel_of(&self, id: ProcessId) -> Result<(&str, usize), SimError> {
        self.directory.rel_id(id)
    }

    /// The number of processes registered to a world.
    pub fn world_size(&self, world: &str) -> Result<usize, SimError> {
        self.directory.world_size(world)
    }

    /// The shared kernel state.
    pub fn global(&self) -> &GlobalState<M> {
        &*self.global
    }

    /// The shared kernel state, mutably.
    pub fn global_mut(&mut self) -> &mut GlobalState<M> {
        &mut *self.global
    }

    /// The model state.
    pub fn state(&self) -> &G {
        &*self.state
    }

    /// The model state, mutably.
    pub fn state_mut(&mut self) -> &mut G {
        &mut *self.state
    }

    /// The shared random source.
    pub fn random(&mut self) -> &mut RandomSource {
        self.global.random_mut()
    }

    /// Both the model state and the kernel state, borrowed at once. Useful when a sampling
    /// helper held in the model state needs the shared random source.
    pub fn split(&mut self) -> (&mut G, &mut GlobalState<M>) {
        (&mut *self.state, &mut *self.global)
    }
}

impl<M, G> fmt::Debug for Context<'_, M, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("now", &self.now)
            .field("meta", &self.meta)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
