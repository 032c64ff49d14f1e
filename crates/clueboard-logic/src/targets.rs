//! Exact-roll movement targets.
//!
//! A roll is spent in full: a target is either a cell reached with the
//! last step, or a room center, which ends movement the moment it is
//! entered. Paths never revisit a cell, and corridor cells holding a token
//! cannot be stepped on. Room cells ignore occupancy.

use std::collections::BTreeSet;

use crate::adjacency::adjacent;
use crate::board::{Board, Position};

/// All valid stopping cells for a roll of `steps` from `start`.
///
/// Movement may only begin on a walkway or a room center; any other start,
/// and a zero roll, give an empty set.
pub fn calc_targets(board: &Board, start: Position, steps: u32) -> BTreeSet<Position> {
    let mut targets = BTreeSet::new();
    let Some(cell) = board.cell_at(start) else {
        log::warn!("calc_targets from off-board position {start}");
        return targets;
    };
    if !(cell.is_walkway() || cell.is_room_center()) {
        log::warn!("calc_targets from {start}: not a walkway or room center");
        return targets;
    }
    if steps == 0 {
        return targets;
    }

    let mut path = BTreeSet::from([start]);
    walk(board, start, steps, &mut path, &mut targets);
    log::debug!(
        "calc_targets from {start} with {steps}: {} targets",
        targets.len()
    );
    targets
}

fn walk(
    board: &Board,
    from: Position,
    remaining: u32,
    path: &mut BTreeSet<Position>,
    targets: &mut BTreeSet<Position>,
) {
    for next in adjacent(board, from.row, from.col) {
        if path.contains(&next) {
            continue;
        }
        let Some(cell) = board.cell_at(next) else {
            continue;
        };
        if cell.is_occupied() && !cell.is_room() {
            continue;
        }
        if cell.is_room_center() || remaining == 1 {
            targets.insert(next);
            continue;
        }
        path.insert(next);
        walk(board, next, remaining - 1, path, targets);
        path.remove(&next);
    }
}

/// Holder for the "compute, then read" calling style used by UI code.
///
/// Each `calc_targets` call replaces the previous result.
#[derive(Debug, Clone, Default)]
pub struct TargetSearch {
    targets: BTreeSet<Position>,
}

impl TargetSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calc_targets(&mut self, board: &Board, start: Position, steps: u32) {
        self.targets = calc_targets(board, start, steps);
    }

    pub fn targets(&self) -> &BTreeSet<Position> {
        &self.targets
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.targets.contains(&pos)
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }
}
