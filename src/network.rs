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

//! Module for the routing processes that move messages between channels.
//!
//! A routing process is an ordinary [`Process`](crate::process::Process) registered through
//! [`System::add_network`](crate::system::System::add_network) whose task runs a [`Scanner`]:
//! every activation examines the output queue of one process (in an amortized round-robin
//! order) and, if a message is pending and accepted, moves it into the receiver's input queue.
//! The selection and filter policy is pluggable through [`ScanHooks`].

use log::trace;
use ordered_float::NotNan;
use rand::seq::SliceRandom;

use crate::{
    message::Channel,
    process::{Context, Routine},
    types::{ProcessId, Time},
};

/// Lower clamp of the sleep time controlled by [`PidHooks`].
pub const SLEEP_MIN: Time = 0.0;
/// Upper clamp of the sleep time controlled by [`PidHooks`].
pub const SLEEP_MAX: Time = 1800.0;
/// Default error threshold below which [`PidHooks`] zeroes its integral term.
pub const ERROR_THRESHOLD: f64 = 0.1;

const KP: f64 = 0.1;
const KI: f64 = 0.05;
const KD: f64 = 0.01;
const DERIVATIVE_ALPHA: f64 = 0.2;

/// Policy hooks of a [`Scanner`].
///
/// The default implementations make the scanner a plain round-robin mover: no cycle setup and
/// every queue accepted.
pub trait ScanHooks<M, G> {
    /// Called when a new scan cycle begins, right after the scan order was reshuffled.
    fn on_start_scan(&mut self, _cx: &mut Context<'_, M, G>) {}

    /// Decide whether the front message of the scanned output queue may be moved in this
    /// activation. A rejected message stays in the queue and is reconsidered on a later cycle.
    fn accept(&mut self, _queue: &Channel<M>) -> bool {
        true
    }

    /// Restore hook-local state at the start of a run.
    fn reset(&mut self) {}
}

impl<M, G> ScanHooks<M, G> for () {}

/// The routing routine: an amortized round-robin scan over the output queues.
///
/// Each activation handles at most one message. When the cursor has walked the whole
/// permutation, the permutation is reshuffled through the shared random source and the hooks are
/// told that a new cycle begins. The permutation is rebuilt whenever the number of registered
/// processes changed.
#[derive(Debug, Clone)]
pub struct Scanner<H = ()> {
    order: Vec<usize>,
    cursor: usize,
    hooks: H,
}

impl Scanner<()> {
    /// Create the default round-robin scanner.
    pub fn new() -> Self {
        Self::with_hooks(())
    }
}

impl Default for Scanner<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner<OrderedHooks> {
    /// Create a scanner that delivers messages in global timestamp order.
    pub fn ordered() -> Self {
        Self::with_hooks(OrderedHooks::new())
    }
}

impl<H> Scanner<H> {
    /// Create a scanner around the given policy hooks.
    pub fn with_hooks(hooks: H) -> Self {
        Self {
            order: Vec::new(),
            cursor: 0,
            hooks,
        }
    }

    /// The policy hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    fn rebuild(&mut self, len: usize) {
        self.order = (0..len).collect();
        // force a reshuffle on the next activation
        self.cursor = len;
    }
}

impl<M, G, H: ScanHooks<M, G>> Routine<M, G> for Scanner<H> {
    fn step(&mut self, cx: &mut Context<'_, M, G>) {
        let len = cx.global().channels();
        if len != self.order.len() {
            self.rebuild(len);
        }
        if self.cursor >= self.order.len() {
            self.order.shuffle(cx.random().engine());
            self.cursor = 0;
            self.hooks.on_start_scan(cx);
        }
        let Some(&scanned) = self.order.get(self.cursor) else {
            return;
        };
        self.cursor += 1;

        {
            let queue = cx.global().channel_out(ProcessId(scanned));
            if queue.is_empty() || !self.hooks.accept(queue) {
                return;
            }
        }
        let Some(message) = cx.global_mut().channel_out_mut(ProcessId(scanned)).pop_front() else {
            return;
        };
        assert_eq!(
            message.sender.index(),
            scanned,
            "output channel {scanned} held a message of sender {}",
            message.sender
        );
        trace!(
            "deliver {} -> {} (sent at {})",
            message.sender,
            message.receiver,
            message.timestamp
        );
        let receiver = message.receiver;
        cx.global_mut().channel_in_mut(receiver).push_back(message);
    }

    fn reset(&mut self) {
        self.order.clear();
        self.cursor = 0;
        self.hooks.reset();
    }
}

/// Hooks of the timestamp-ordered scanner.
///
/// At the start of every cycle the minimum timestamp among the front messages of all non-empty
/// output queues is snapshot; messages sent later than that are rejected for the rest of the
/// cycle, so deliveries happen in global timestamp order across senders.
#[derive(Debug, Clone)]
pub struct OrderedHooks {
    cutoff: Time,
}

impl OrderedHooks {
    /// Create the hooks with an open cutoff.
    pub fn new() -> Self {
        Self {
            cutoff: f64::INFINITY,
        }
    }
}

impl Default for OrderedHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, G> ScanHooks<M, G> for OrderedHooks {
    fn on_start_scan(&mut self, cx: &mut Context<'_, M, G>) {
        self.cutoff = cx
            .global()
            .channels_out()
            .iter()
            .filter_map(|queue| queue.front())
            .map(|message| NotNan::new(message.timestamp).expect("time is never NaN"))
            .min()
            .map(NotNan::into_inner)
            .unwrap_or(f64::INFINITY);
    }

    fn accept(&mut self, queue: &Channel<M>) -> bool {
        queue
            .front()
            .map(|message| message.timestamp <= self.cutoff)
            .unwrap_or(false)
    }

    fn reset(&mut self) {
        self.cutoff = f64::INFINITY;
    }
}

/// Hooks of the PID-controlled scanner.
///
/// At the start of every cycle the sleep time of the scanner task is adjusted to steer the mean
/// output-channel occupancy toward a set-point, using proportional, integral and derivative
/// terms. The derivative is exponentially smoothed, the integral is zeroed inside the error
/// threshold and is only updated when the tentative sleep stays inside
/// `[SLEEP_MIN, SLEEP_MAX]` (anti-windup), and the final sleep is clamped to the same range.
#[derive(Debug, Clone)]
pub struct PidHooks {
    set_point: f64,
    error_threshold: f64,
    integral: f64,
    prev_error: f64,
    prev_dv: f64,
    last_time: Time,
}

impl PidHooks {
    /// Create the hooks for a mean-occupancy set-point.
    pub fn new(set_point: f64, error_threshold: f64) -> Self {
        Self {
            set_point,
            error_threshold,
            integral: 0.0,
            prev_error: 0.0,
            prev_dv: 0.0,
            last_time: 0.0,
        }
    }
}

impl<M, G> ScanHooks<M, G> for PidHooks {
    fn on_start_scan(&mut self, cx: &mut Context<'_, M, G>) {
        let now = cx.next_due();
        if now == 0.0 {
            return;
        }
        let dt = now - self.last_time;
        if dt <= 0.0 {
            return;
        }
        let queues = cx.global().channels_out();
        if queues.is_empty() {
            return;
        }
        let occupancy =
            queues.iter().map(|queue| queue.len() as f64).sum::<f64>() / queues.len() as f64;
        let error = occupancy - self.set_point;
        let dv = (error - self.prev_error) / dt;
        let smooth_dv = (1.0 - DERIVATIVE_ALPHA) * self.prev_dv + DERIVATIVE_ALPHA * dv;
        let control_pd = KP * error + KD * smooth_dv;
        if error.abs() < self.error_threshold {
            self.integral = 0.0;
        } else {
            let tentative = self.integral + error * dt;
            let tentative_sleep = cx.sleep_time() - (control_pd + tentative * KI);
            if tentative_sleep > SLEEP_MIN && tentative_sleep < SLEEP_MAX {
                self.integral = tentative;
            }
        }
        let control = control_pd + self.integral * KI;
        let sleep = (cx.sleep_time() - control).clamp(SLEEP_MIN, SLEEP_MAX);
        trace!("pid scan at {now}: occupancy {occupancy}, sleep {sleep}");
        cx.set_sleep_time(sleep);
        self.prev_error = error;
        self.prev_dv = smooth_dv;
        self.last_time = now;
    }

    fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.prev_dv = 0.0;
        self.last_time = 0.0;
    }
}
