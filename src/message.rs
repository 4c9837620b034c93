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

//! Module for the message envelope and the per-process channels.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::{ProcessId, Time, WorldKey};

/// A message travelling between two processes.
///
/// The envelope fields are filled in by [`Context::send`](crate::process::Context::send) from the
/// sending process and the system clock; the payload type `M` is chosen by the model and threaded
/// through the whole kernel, so no downcasting is ever necessary on reception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "M: serde::Serialize",
    deserialize = "M: for<'a> serde::Deserialize<'a>"
))]
pub struct Message<M> {
    /// Absolute id of the receiving process.
    pub receiver: ProcessId,
    /// Absolute id of the sending process.
    pub sender: ProcessId,
    /// Relative id of the sender within its world.
    pub sender_rel_id: usize,
    /// World the sender is registered to.
    pub sender_world: WorldKey,
    /// Simulated time at which the message was sent.
    pub timestamp: Time,
    /// Model-defined content.
    pub payload: M,
}

/// A FIFO queue of messages. Every process owns exactly one input and one output channel,
/// indexed by its absolute id.
pub type Channel<M> = VecDeque<Message<M>>;
