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

#![deny(missing_docs, missing_debug_implementations)]

//! # ProSim
//!
//! This is a library for building and evaluating discrete-event models of stochastic systems.
//!
//! A model is a set of [`process::Process`]es, each grouping periodic [`process::Task`]s that
//! exchange messages through per-process channels. The [`system::System`] owns the virtual
//! clock: every step jumps the clock to the earliest next-due time across all tasks, schedules
//! the due tasks (in a pseudo-random but seed-reproducible order), and lets the routing
//! processes move messages from the senders' output queues into the receivers' input queues.
//! On top of a single run, the [`montecarlo::MonteCarlo`] driver estimates the expected value
//! of a per-run scalar over repeated independent replications, and the
//! [`optimizer::Optimizer`] searches an axis-aligned parameter box for the configuration that
//! minimizes or maximizes such an estimate.
//!
//! ## Main concepts
//!
//! - Every stochastic decision routes through one [`random::RandomSource`], so a run is fully
//!   reproducible from its seed.
//! - Processes are registered to named *worlds* and can be addressed either by absolute id or by
//!   `(world, relative id)`, see [`system::System::abs_id`] and [`system::System::rel_id`].
//! - The user step is the [`process::Routine`] trait; it receives a [`process::Context`] that
//!   exposes the clock, the identity of its process, its own timing, message passing and the
//!   shared state. Model-wide state lives in a [`global::UserState`] value next to the kernel's
//!   [`global::GlobalState`].
//! - Message routing is itself a process: the default [`network::Scanner`] moves one message
//!   per activation in an amortized round-robin, and its policy can be specialized through
//!   [`network::ScanHooks`] (e.g. timestamp-ordered delivery, or a PID controller steering the
//!   scan rate toward a channel-occupancy set-point).
//! - Drivers are specialized through the [`simulator::Simulator`] trait: override the
//!   termination predicate and the end-of-run hook that writes the per-run value.
//!
//! ## Example usage
//!
//! The following model has a pinger greeting an echo process once per time unit; a scanner
//! network carries the messages across:
//!
//! ```
//! use prosim::prelude::*;
//!
//! // model-wide shared state
//! #[derive(Debug, Default)]
//! struct Tally {
//!     received: usize,
//! }
//!
//! impl UserState for Tally {
//!     fn reset(&mut self) {
//!         self.received = 0;
//!     }
//! }
//!
//! struct Pinger;
//!
//! impl Routine<&'static str, Tally> for Pinger {
//!     fn step(&mut self, cx: &mut Context<'_, &'static str, Tally>) {
//!         cx.send_to("sinks", 0, "ping").expect("the echo process is registered");
//!     }
//! }
//!
//! struct Echo;
//!
//! impl Routine<&'static str, Tally> for Echo {
//!     fn step(&mut self, cx: &mut Context<'_, &'static str, Tally>) {
//!         while let Some(message) = cx.recv() {
//!             assert_eq!(message.payload, "ping");
//!             assert_eq!(message.sender_world, "sources");
//!             cx.state_mut().received += 1;
//!         }
//!     }
//! }
//!
//! let mut system = System::new(GlobalState::with_seed(42), Tally::default());
//! system.global_mut().set_horizon(10.0);
//!
//! system.add_process_to(
//!     Process::named("pinger").with_task(Task::new(1.0, 0.0, 1.0, Pinger)),
//!     "sources",
//! );
//! system.add_process_to(
//!     Process::named("echo").with_task(Task::new(1.0, 0.0, 1.0, Echo)),
//!     "sinks",
//! );
//! // one full scan cycle over both output queues per time unit
//! system.add_scanner_network(0.25, 0.25, 0.0);
//!
//! let mut runner = Runner::new(system);
//! runner.run();
//!
//! // the last ping may still be in flight when the horizon strikes
//! assert!(runner.system().state().received >= 8);
//! ```
//!
//! To estimate a quantity over many replications, write it into the shared state from the
//! end-of-run hook of a custom [`simulator::Simulator`] and wrap the driver in a
//! [`montecarlo::MonteCarlo`]; to tune parameters, wrap the Monte Carlo driver in an
//! [`optimizer::Optimizer`].

pub mod global;
pub mod io;
pub mod message;
pub mod montecarlo;
pub mod network;
pub mod optimizer;
pub mod prelude;
pub mod process;
pub mod random;
pub mod simulator;
pub mod system;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test;
