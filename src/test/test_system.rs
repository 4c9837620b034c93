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

//! Registration, addressing, stepping and reset behavior of the system.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use crate::prelude::*;

#[derive(Debug, Default)]
struct Log {
    timestamps: Vec<Time>,
}

impl UserState for Log {
    fn reset(&mut self) {
        self.timestamps.clear();
    }
}

/// A task that drains its input queue into the log and then messages itself.
struct SelfPing;

impl Routine<(), Log> for SelfPing {
    fn step(&mut self, cx: &mut Context<'_, (), Log>) {
        while let Some(message) = cx.recv() {
            cx.state_mut().timestamps.push(message.timestamp);
        }
        let me = cx.id();
        cx.send(me, ());
    }
}

struct Noop;

impl<M, G> Routine<M, G> for Noop {
    fn step(&mut self, _cx: &mut Context<'_, M, G>) {}
}

#[test]
fn registration_assigns_dense_and_stable_ids() {
    let mut system: System<(), ()> = System::new(GlobalState::with_seed(1), ());
    let a0 = system.add_process_to(Process::named("a0"), "a");
    let a1 = system.add_process_to(Process::named("a1"), "a");
    let b0 = system.add_process_to(Process::named("b0"), "b");

    assert_eq!(a0, ProcessId(0));
    assert_eq!(a1, ProcessId(1));
    assert_eq!(b0, ProcessId(2));

    assert_eq!(system.worlds_count(), 2);
    assert_eq!(system.world_size("a").unwrap(), 2);
    assert_eq!(system.world_size("b").unwrap(), 1);

    // channel accounting follows registration
    assert_eq!(system.global().channels(), 3);
    assert_eq!(system.global().channels_in().len(), 3);
    assert_eq!(system.global().channels_out().len(), 3);

    // addressing round trip
    for (world, rel_id, id) in [("a", 0, a0), ("a", 1, a1), ("b", 0, b0)] {
        assert_eq!(system.abs_id(world, rel_id).unwrap(), id);
        assert_eq!(system.rel_id(id).unwrap(), (world, rel_id));
        let process = system.process(id).unwrap();
        assert_eq!(process.id(), Some(id));
        assert_eq!(process.world(), Some(world));
        assert_eq!(process.rel_id(), Some(rel_id));
    }

    let names: Vec<&str> = system
        .processes_in("a")
        .unwrap()
        .iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(names, vec!["a0", "a1"]);
}

#[test]
fn addressing_errors() {
    let mut system: System<(), ()> = System::new(GlobalState::with_seed(1), ());
    system.add_process_to(Process::named("a0"), "a");

    assert_eq!(
        system.abs_id("c", 0),
        Err(SimError::WorldNotFound("c".to_string()))
    );
    assert_eq!(
        system.abs_id("a", 2),
        Err(SimError::RelIdOutOfRange {
            world: "a".to_string(),
            rel_id: 2,
            size: 1,
        })
    );
    assert_eq!(
        system.rel_id(ProcessId(9)),
        Err(SimError::ProcessNotFound(ProcessId(9)))
    );
}

#[test]
fn periodic_self_sender() {
    let mut system = System::new(GlobalState::with_seed(3), Log::default());
    system.global_mut().set_horizon(10.0);
    let id = system.add_process(Process::named("pinger").with_task(Task::new(
        1.0,
        0.0,
        1.0,
        SelfPing,
    )));
    system.add_scanner_network(0.5, 0.5, 0.0);

    let trace = Rc::new(RefCell::new(Vec::new()));
    let observed = trace.clone();
    system.set_end_step_hook(move |sys| observed.borrow_mut().push(sys.clock()));

    let mut runner = Runner::new(system);
    runner.run();
    let system = runner.into_inner();

    // the clock advances in unit steps, monotonically
    let expected: Vec<Time> = (0..=10).map(|k| k as Time).collect();
    assert_eq!(*trace.borrow(), expected);

    // one message per period was delivered back, with distinct timestamps; the message sent at
    // the horizon is still in the input queue
    let drained: Vec<Time> = (1..=9).map(|k| k as Time).collect();
    assert_eq!(system.state().timestamps, drained);
    let channel = system.global().channel_in(id);
    assert_eq!(channel.len(), 1);
    assert_eq!(channel.front().unwrap().timestamp, 10.0);
}

#[derive(Debug, Default)]
struct Inbox {
    got: Vec<(Time, WorldKey, usize, u32)>,
}

impl UserState for Inbox {
    fn reset(&mut self) {
        self.got.clear();
    }
}

struct SendPair;

impl Routine<u32, Inbox> for SendPair {
    fn step(&mut self, cx: &mut Context<'_, u32, Inbox>) {
        cx.send_to("b", 0, 1).unwrap();
        cx.send_to("b", 0, 2).unwrap();
    }
}

struct Collect;

impl Routine<u32, Inbox> for Collect {
    fn step(&mut self, cx: &mut Context<'_, u32, Inbox>) {
        while let Some(message) = cx.recv() {
            let entry = (
                message.timestamp,
                message.sender_world.clone(),
                message.sender_rel_id,
                message.payload,
            );
            cx.state_mut().got.push(entry);
        }
    }
}

#[test]
fn two_worlds_round_trip() {
    let mut system = System::new(GlobalState::with_seed(7), Inbox::default());
    system.global_mut().set_horizon(2.0);

    // a0 fires once at 0.5 and sends two messages to (b, 0)
    system.add_process_to(
        Process::named("a0").with_task(Task::new(0.0, 1000.0, 0.5, SendPair)),
        "a",
    );
    system.add_process_to(Process::named("a1"), "a");
    system.add_process_to(
        Process::named("b0").with_task(Task::new(0.05, 0.05, 0.1, Collect)),
        "b",
    );
    system.add_scanner_network(0.05, 0.05, 0.1);

    let mut runner = Runner::new(system);
    runner.run();
    let system = runner.into_inner();

    // both messages arrived, in sending order, with full sender metadata
    assert_eq!(
        system.state().got,
        vec![
            (0.5, "a".to_string(), 0, 1),
            (0.5, "a".to_string(), 0, 2),
        ]
    );
}

#[derive(Debug, Default)]
struct Fires {
    at: Vec<Time>,
}

impl UserState for Fires {
    fn reset(&mut self) {
        self.at.clear();
    }
}

struct Recorder;

impl Routine<(), Fires> for Recorder {
    fn step(&mut self, cx: &mut Context<'_, (), Fires>) {
        let now = cx.time();
        cx.state_mut().at.push(now);
    }
}

#[test]
fn disable_and_enable_realign_without_catch_up() {
    let mut system = System::new(GlobalState::with_seed(5), Fires::default());
    system.global_mut().set_horizon(10.0);
    let target = system.add_process(
        Process::named("target").with_task(Task::new(1.0, 0.0, 1.0, Recorder)),
    );
    system.add_process(Process::named("pacer").with_task(Task::new(1.0, 0.0, 1.0, Noop)));

    let mut disabled = false;
    let mut enabled = false;
    system.set_end_step_hook(move |sys| {
        if sys.clock() == 3.0 && !disabled {
            sys.set_process_enabled(target, false).unwrap();
            disabled = true;
        }
        if sys.clock() == 7.0 && !enabled {
            sys.set_process_enabled(target, true).unwrap();
            enabled = true;
        }
    });

    let mut runner = Runner::new(system);
    runner.run();
    let system = runner.into_inner();

    // while disabled the target contributes no event; on re-enable its next due time realigns
    // to the clock, so the missed activations at 4, 5 and 6 never fire
    assert_eq!(system.state().at, vec![1.0, 2.0, 3.0, 7.0, 8.0, 9.0, 10.0]);
    assert!(system.process(target).unwrap().is_enabled());
}

struct SlowDown;

impl Routine<(), ()> for SlowDown {
    fn step(&mut self, cx: &mut Context<'_, (), ()>) {
        let me = cx.id();
        cx.send(me, ());
        cx.set_sleep_time(0.9);
    }
}

#[test]
fn init_resets_channels_clock_and_timing() {
    let mut system: System<(), ()> = System::new(GlobalState::with_seed(9), ());
    let id = system.add_process(Process::named("loner").with_task(Task::new(
        0.1,
        0.2,
        0.3,
        SlowDown,
    )));
    // no routing process: sent messages accumulate in the output channel

    system.init();
    for _ in 0..5 {
        system.step();
    }
    system.global_mut().set_montecarlo_current(3.25);
    system.global_mut().set_montecarlo_avg(7.5);
    assert!(!system.global().channel_out(id).is_empty());
    assert_ne!(system.processes()[0].tasks()[0].sleep_time(), 0.2);

    system.init();

    assert_eq!(system.clock(), 0.0);
    assert!(system.global().channel_in(id).is_empty());
    assert!(system.global().channel_out(id).is_empty());
    assert_eq!(system.global().montecarlo_current(), 0.0);
    // results survive the reset; only run-local state is cleared
    assert_eq!(system.global().montecarlo_avg(), 7.5);
    let task = &system.processes()[0].tasks()[0];
    assert_eq!(task.compute_time(), 0.1);
    assert_eq!(task.sleep_time(), 0.2);
    assert_eq!(task.next_due(), 0.3);
    assert!(task.is_enabled());
}

#[derive(Debug, Default)]
struct Sum {
    total: f64,
}

impl UserState for Sum {
    fn reset(&mut self) {
        self.total = 0.0;
    }
}

struct Walker;

impl Routine<f64, Sum> for Walker {
    fn step(&mut self, cx: &mut Context<'_, f64, Sum>) {
        while let Some(message) = cx.recv() {
            cx.state_mut().total += message.payload;
        }
        let pause = cx.random().uniform_real(0.5, 1.5);
        cx.set_sleep_time(pause);
        let peer = (cx.rel_id().unwrap() + 1) % 2;
        cx.send_to("walkers", peer, pause).unwrap();
    }
}

fn run_walkers(seed: u64) -> (Vec<Time>, f64, Time) {
    let mut system = System::new(GlobalState::with_seed(seed), Sum::default());
    system.global_mut().set_horizon(20.0);
    for name in ["w0", "w1"] {
        system.add_process_to(
            Process::named(name).with_task(Task::new(0.1, 0.5, 0.5, Walker)),
            "walkers",
        );
    }
    system.add_scanner_network(0.1, 0.1, 0.0);

    let trace = Rc::new(RefCell::new(Vec::new()));
    let observed = trace.clone();
    system.set_end_step_hook(move |sys| observed.borrow_mut().push(sys.clock()));

    let mut runner = Runner::new(system);
    runner.run();
    let system = runner.into_inner();
    let clocks = trace.borrow().clone();
    (clocks, system.state().total, system.clock())
}

#[test]
fn identical_seeds_give_identical_trajectories() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (clocks_a, total_a, end_a) = run_walkers(11);
    let (clocks_b, total_b, end_b) = run_walkers(11);
    assert!(!clocks_a.is_empty());
    assert_eq!(clocks_a, clocks_b);
    assert_eq!(total_a, total_b);
    assert_eq!(end_a, end_b);
    // the clock never goes backwards
    assert!(clocks_a.windows(2).all(|w| w[0] <= w[1]));
}

struct FireOnce;

impl Routine<(), ()> for FireOnce {
    fn step(&mut self, cx: &mut Context<'_, (), ()>) {
        cx.disable();
    }
}

#[test]
fn run_without_pending_events_saturates_the_clock() {
    let mut system: System<(), ()> = System::new(GlobalState::with_seed(2), ());
    system.global_mut().set_horizon(5.0);
    system.add_process(Process::named("oneshot").with_task(Task::new(0.0, 1.0, 1.0, FireOnce)));

    let mut runner = Runner::new(system);
    runner.run();
    let system = runner.into_inner();

    assert!(system.stalled());
    assert!(system.clock().is_infinite());
}

struct Drain;

impl Routine<(), ()> for Drain {
    fn step(&mut self, cx: &mut Context<'_, (), ()>) {
        while cx.recv().is_some() {}
    }
}

#[test]
#[should_panic(expected = "delivered to")]
fn misdelivered_message_is_fatal() {
    let mut system: System<(), ()> = System::new(GlobalState::with_seed(4), ());
    let id = system.add_process(Process::named("victim").with_task(Task::new(
        1.0,
        0.0,
        0.0,
        Drain,
    )));
    system.init();
    system.global_mut().channel_in_mut(id).push_back(Message {
        receiver: ProcessId(5),
        sender: id,
        sender_rel_id: 0,
        sender_world: DEFAULT_WORLD.to_string(),
        timestamp: 0.0,
        payload: (),
    });
    system.step();
}
