//! One-step adjacency over the board.
//!
//! Corridor-to-corridor edges are symmetric. Door and room edges are
//! directed: a doorway points at the center of the room it faces, and a
//! room center points at every doorway facing into it plus the far end of
//! its secret passage. Occupancy plays no part here; the target search
//! applies it.

use std::collections::BTreeSet;

use crate::board::{Board, Cell, DoorDirection, Position};

const ORTHOGONAL: [DoorDirection; 4] = [
    DoorDirection::Up,
    DoorDirection::Down,
    DoorDirection::Left,
    DoorDirection::Right,
];

/// Cells reachable in one step from (row, col).
///
/// Out-of-range coordinates, room interiors and unused squares have no
/// neighbors.
pub fn adjacent(board: &Board, row: usize, col: usize) -> BTreeSet<Position> {
    let mut adj = BTreeSet::new();
    let Some(cell) = board.cell(row, col) else {
        return adj;
    };

    if cell.is_room_center() {
        room_exits(board, cell, &mut adj);
    } else if cell.is_walkway() {
        corridor_neighbors(board, cell.position(), &mut adj);
        if cell.is_doorway() {
            if let Some(center) = door_entry(board, cell) {
                adj.insert(center);
            }
        }
    }
    adj
}

fn corridor_neighbors(board: &Board, pos: Position, adj: &mut BTreeSet<Position>) {
    for dir in ORTHOGONAL {
        let Some(next) = board.step(pos, dir) else {
            continue;
        };
        if board.cell_at(next).is_some_and(Cell::is_walkway) {
            adj.insert(next);
        }
    }
}

/// Center of the room a doorway faces, if the step lands on a room that has one.
fn door_entry(board: &Board, door: &Cell) -> Option<Position> {
    let facing = board.step(door.position(), door.door_direction())?;
    board.room_of(facing)?.center()
}

fn room_exits(board: &Board, center: &Cell, adj: &mut BTreeSet<Position>) {
    let symbol = center.symbol();
    for cell in board.cells().filter(|c| c.is_doorway() && c.is_walkway()) {
        let faces_this_room = board
            .step(cell.position(), cell.door_direction())
            .and_then(|p| board.cell_at(p))
            .is_some_and(|c| c.symbol() == symbol);
        if faces_this_room {
            adj.insert(cell.position());
        }
    }

    if let Some(target) = center.secret_passage() {
        if let Some(far) = board.room(target).and_then(|r| r.center()) {
            adj.insert(far);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Room;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    // row 0:  K*  K   W   W
    // row 1:  K   K   W<  W
    // row 2:  W   Wv  W   L*
    // row 3:  X   W   W   L
    //
    // K has a secret passage to L (marked on K's (1,0)).
    fn board() -> Board {
        let rooms = vec![
            Room::new("Kitchen", 'K'),
            Room::new("Library", 'L'),
            Room::space("Walkway", 'W'),
            Room::space("Unused", 'X'),
        ];
        let cells = vec![
            Cell::new(0, 0, 'K').with_center(),
            Cell::new(0, 1, 'K'),
            Cell::new(0, 2, 'W'),
            Cell::new(0, 3, 'W'),
            Cell::new(1, 0, 'K').with_secret_passage('L'),
            Cell::new(1, 1, 'K'),
            Cell::new(1, 2, 'W').with_door(DoorDirection::Left),
            Cell::new(1, 3, 'W'),
            Cell::new(2, 0, 'W'),
            Cell::new(2, 1, 'W').with_door(DoorDirection::Up),
            Cell::new(2, 2, 'W'),
            Cell::new(2, 3, 'L').with_center(),
            Cell::new(3, 0, 'X'),
            Cell::new(3, 1, 'W'),
            Cell::new(3, 2, 'W'),
            Cell::new(3, 3, 'L'),
        ];
        Board::from_parts(4, 4, cells, rooms).unwrap()
    }

    #[test]
    fn test_corridor_only_corridor_neighbors() {
        let b = board();
        let adj = adjacent(&b, 3, 2);
        assert_eq!(adj, BTreeSet::from([p(2, 2), p(3, 1)]));
    }

    #[test]
    fn test_corridor_never_returns_center() {
        let b = board();
        // (2,2) borders L's center at (2,3) but is not a door
        let adj = adjacent(&b, 2, 2);
        assert!(!adj.contains(&p(2, 3)));
        assert_eq!(adj, BTreeSet::from([p(1, 2), p(2, 1), p(3, 2)]));
    }

    #[test]
    fn test_doorway_adds_room_center() {
        let b = board();
        let adj = adjacent(&b, 1, 2);
        assert_eq!(adj, BTreeSet::from([p(0, 2), p(1, 3), p(2, 2), p(0, 0)]));
        let adj = adjacent(&b, 2, 1);
        assert_eq!(adj, BTreeSet::from([p(2, 0), p(2, 2), p(3, 1), p(0, 0)]));
    }

    #[test]
    fn test_center_lists_doors_and_passage() {
        let b = board();
        let adj = adjacent(&b, 0, 0);
        assert_eq!(adj, BTreeSet::from([p(1, 2), p(2, 1), p(2, 3)]));
    }

    #[test]
    fn test_room_edges_are_directed() {
        let b = board();
        // L has no doors and no passage back
        assert!(adjacent(&b, 2, 3).is_empty());
        assert!(adjacent(&b, 0, 0).contains(&p(2, 3)));
    }

    #[test]
    fn test_room_interior_and_out_of_range_empty() {
        let b = board();
        assert!(adjacent(&b, 1, 1).is_empty());
        assert!(adjacent(&b, 3, 0).is_empty());
        assert!(adjacent(&b, 9, 9).is_empty());
    }

    #[test]
    fn test_door_facing_off_board_is_omitted() {
        let rooms = vec![Room::space("Walkway", 'W')];
        let cells = vec![
            Cell::new(0, 0, 'W').with_door(DoorDirection::Up),
            Cell::new(0, 1, 'W'),
        ];
        let b = Board::from_parts(1, 2, cells, rooms).unwrap();
        assert_eq!(adjacent(&b, 0, 0), BTreeSet::from([p(0, 1)]));
    }

    #[test]
    fn test_room_cell_door_is_not_an_exit() {
        let rooms = vec![
            Room::new("Kitchen", 'K'),
            Room::new("Library", 'L'),
            Room::space("Walkway", 'W'),
        ];
        // L's (0,1) carries a door facing K; only walkway doors count
        let cells = vec![
            Cell::new(0, 0, 'K').with_center(),
            Cell::new(0, 1, 'L').with_door(DoorDirection::Left),
            Cell::new(0, 2, 'L').with_center(),
            Cell::new(1, 0, 'W').with_door(DoorDirection::Up),
            Cell::new(1, 1, 'W'),
            Cell::new(1, 2, 'W'),
        ];
        let b = Board::from_parts(2, 3, cells, rooms).unwrap();
        assert_eq!(adjacent(&b, 0, 0), BTreeSet::from([p(1, 0)]));
    }
}
