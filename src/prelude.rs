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

//! Convenience re-export of common members.

pub use crate::global::{GlobalState, UserState};
pub use crate::message::{Channel, Message};
pub use crate::montecarlo::MonteCarlo;
pub use crate::network::{OrderedHooks, PidHooks, ScanHooks, Scanner};
pub use crate::optimizer::{Optimizer, Strategy};
pub use crate::process::{Context, Process, Routine, Task};
pub use crate::random::RandomSource;
pub use crate::simulator::{Runner, Simulator};
pub use crate::system::System;
pub use crate::types::{ProcessId, SimError, Time, WorldKey, DEFAULT_WORLD};
