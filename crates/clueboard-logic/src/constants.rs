//! Game constants: reserved board symbols, layout token markers, dice.
//!
//! These are plain `char`/integer constants with no I/O dependency.
//! Both the table loader and the harness use them.

/// Board surfaces that are never card-bearing rooms.
pub mod symbols {
    /// Open corridor: walkable, single occupancy.
    pub const WALKWAY: char = 'W';
    /// Unused board area: not walkable, never a room.
    pub const UNUSED: char = 'X';

    /// Whether a symbol belongs to a room (as opposed to a reserved surface).
    ///
    /// This is the one room predicate used everywhere occupancy or
    /// room-entry rules are checked.
    pub fn is_room(symbol: char) -> bool {
        symbol != WALKWAY && symbol != UNUSED
    }
}

/// Second-character markers in layout tokens.
pub mod markers {
    pub const CENTER: char = '*';
    pub const LABEL: char = '#';
    pub const DOOR_UP: char = '^';
    pub const DOOR_DOWN: char = 'v';
    pub const DOOR_LEFT: char = '<';
    pub const DOOR_RIGHT: char = '>';

    /// Characters that may not be used as room symbols.
    pub const RESERVED: [char; 6] = [CENTER, LABEL, DOOR_UP, DOOR_DOWN, DOOR_LEFT, DOOR_RIGHT];

    pub fn is_reserved(c: char) -> bool {
        RESERVED.contains(&c)
    }
}

/// Faces on the standard movement die.
pub const DEFAULT_DIE_SIDES: u32 = 6;

/// Cards held back as the hidden solution: one person, one weapon, one room.
pub const SOLUTION_SIZE: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_surfaces_are_not_rooms() {
        assert!(!symbols::is_room(symbols::WALKWAY));
        assert!(!symbols::is_room(symbols::UNUSED));
        assert!(symbols::is_room('K'));
    }

    #[test]
    fn test_markers_reserved() {
        assert!(markers::is_reserved('*'));
        assert!(markers::is_reserved('v'));
        assert!(!markers::is_reserved('V'));
    }
}
