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

//! Module for exhaustive search over discrete parameter boxes.
//!
//! Where the black-box [`Optimizer`](crate::optimizer::Optimizer) samples a continuous box, this
//! helper enumerates every point of a small discrete box by backtracking and returns *all*
//! argmin (or argmax) vectors, which is handy to cross-check a stochastic optimization on a
//! coarse grid.

use crate::optimizer::Strategy;

/// Enumerate the integer box spanned by the inclusive `ranges` and return every parameter
/// vector achieving the optimum, together with the optimal value.
///
/// With an empty range list the objective is evaluated once on the empty vector.
pub fn arg_min_max<F>(
    ranges: &[(i64, i64)],
    mut objective: F,
    strategy: Strategy,
) -> (Vec<Vec<i64>>, f64)
where
    F: FnMut(&[i64]) -> f64,
{
    let mut best = match strategy {
        Strategy::Minimize => f64::INFINITY,
        Strategy::Maximize => f64::MIN,
    };
    let mut bucket = Vec::new();
    let mut point = vec![0; ranges.len()];
    backtrack(
        ranges,
        &mut point,
        0,
        strategy,
        &mut best,
        &mut bucket,
        &mut objective,
    );
    (bucket, best)
}

fn backtrack<F>(
    ranges: &[(i64, i64)],
    point: &mut Vec<i64>,
    depth: usize,
    strategy: Strategy,
    best: &mut f64,
    bucket: &mut Vec<Vec<i64>>,
    objective: &mut F,
) where
    F: FnMut(&[i64]) -> f64,
{
    if depth == ranges.len() {
        let value = objective(point);
        let improves = match strategy {
            Strategy::Minimize => value < *best,
            Strategy::Maximize => value > *best,
        };
        if improves {
            bucket.clear();
            bucket.push(point.clone());
            *best = value;
        } else if value == *best {
            bucket.push(point.clone());
        }
        return;
    }
    let (low, high) = ranges[depth];
    for value in low..=high {
        point[depth] = value;
        backtrack(ranges, point, depth + 1, strategy, best, bucket, objective);
    }
}
