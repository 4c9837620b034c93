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

//! Module containing all type definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulated time. Time is a nonnegative real number; `f64::INFINITY` is admissible and stands
/// for "no pending event".
pub type Time = f64;

/// Key of a world, an application-defined logical grouping of processes (e.g. `"customers"`).
pub type WorldKey = String;

/// The world a process is registered to when no world is named explicitly.
pub const DEFAULT_WORLD: &str = "default";

/// Process identification: the absolute id of a process within a system, assigned densely in
/// registration order as `0, 1, 2, ...`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessId(pub usize);

impl ProcessId {
    /// Index into the per-process channel vectors.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl From<usize> for ProcessId {
    fn from(x: usize) -> Self {
        Self(x)
    }
}

/// Simulation Errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The named world was never registered in the system.
    #[error("world key not found: {0}")]
    WorldNotFound(WorldKey),
    /// A relative id was requested beyond the size of its world.
    #[error("relative id {rel_id} is out of range for world {world} of size {size}")]
    RelIdOutOfRange {
        /// The world that was addressed.
        world: WorldKey,
        /// The requested relative id.
        rel_id: usize,
        /// The number of processes registered to the world.
        size: usize,
    },
    /// An absolute id does not refer to any registered process.
    #[error("process {0} is not registered in the system")]
    ProcessNotFound(ProcessId),
    /// The optimizer was given bound vectors of different dimensions.
    #[error("optimizer bounds disagree: {lows} lower bounds against {highs} upper bounds")]
    BoundsMismatch {
        /// Number of lower bounds.
        lows: usize,
        /// Number of upper bounds.
        highs: usize,
    },
}
