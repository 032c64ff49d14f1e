//! The cell grid and room table.
//!
//! `Board` owns a row-major arena of `Cell`s plus the room table keyed by
//! symbol. Cells are addressed by `Position` (row, column), so two handles
//! to the same square always compare equal. After linking, the only thing
//! that changes during play is each cell's `occupied` flag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::constants::{markers, symbols};

/// A square on the board, by row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Which way a doorway faces. `None` for every non-door cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorDirection {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl DoorDirection {
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            markers::DOOR_UP => Some(DoorDirection::Up),
            markers::DOOR_DOWN => Some(DoorDirection::Down),
            markers::DOOR_LEFT => Some(DoorDirection::Left),
            markers::DOOR_RIGHT => Some(DoorDirection::Right),
            _ => None,
        }
    }

    /// Row/column delta of one step in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            DoorDirection::None => (0, 0),
            DoorDirection::Up => (-1, 0),
            DoorDirection::Down => (1, 0),
            DoorDirection::Left => (0, -1),
            DoorDirection::Right => (0, 1),
        }
    }
}

/// One square of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    row: usize,
    col: usize,
    symbol: char,
    door: DoorDirection,
    room_center: bool,
    room_label: bool,
    secret_passage: Option<char>,
    occupied: bool,
}

impl Cell {
    /// A plain cell of the given surface with no door, center, label or passage.
    pub fn new(row: usize, col: usize, symbol: char) -> Self {
        Self {
            row,
            col,
            symbol,
            door: DoorDirection::None,
            room_center: false,
            room_label: false,
            secret_passage: None,
            occupied: false,
        }
    }

    pub fn with_door(mut self, door: DoorDirection) -> Self {
        self.door = door;
        self
    }

    pub fn with_center(mut self) -> Self {
        self.room_center = true;
        self
    }

    pub fn with_label(mut self) -> Self {
        self.room_label = true;
        self
    }

    pub fn with_secret_passage(mut self, target: char) -> Self {
        self.secret_passage = Some(target);
        self
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn door_direction(&self) -> DoorDirection {
        self.door
    }

    pub fn is_doorway(&self) -> bool {
        self.door != DoorDirection::None
    }

    pub fn is_room_center(&self) -> bool {
        self.room_center
    }

    pub fn is_label(&self) -> bool {
        self.room_label
    }

    pub fn secret_passage(&self) -> Option<char> {
        self.secret_passage
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn is_walkway(&self) -> bool {
        self.symbol == symbols::WALKWAY
    }

    /// Room cells may hold any number of tokens; see [`symbols::is_room`].
    pub fn is_room(&self) -> bool {
        symbols::is_room(self.symbol)
    }
}

/// An entry of the room table. Reserved surfaces (walkway, unused) are
/// rooms too, they just never carry a card or a center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    name: String,
    symbol: char,
    card_room: bool,
    center: Option<Position>,
    label: Option<Position>,
}

impl Room {
    /// A card-bearing room (`Room` record in the setup table).
    pub fn new(name: impl Into<String>, symbol: char) -> Self {
        Self {
            name: name.into(),
            symbol,
            card_room: true,
            center: None,
            label: None,
        }
    }

    /// A surface with no card (`Space` record in the setup table).
    pub fn space(name: impl Into<String>, symbol: char) -> Self {
        Self {
            card_room: false,
            ..Self::new(name, symbol)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn is_card_room(&self) -> bool {
        self.card_room
    }

    pub fn center(&self) -> Option<Position> {
        self.center
    }

    pub fn label(&self) -> Option<Position> {
        self.label
    }
}

/// Linked, immutable-shape board.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    rooms: BTreeMap<char, Room>,
}

impl Board {
    /// Link a row-major cell list against the room table.
    ///
    /// Assigns every room its center and label, moves secret passages onto
    /// room centers and rejects any symbol with no room entry. Each cell must
    /// sit at its own row-major index. Either the
    /// whole board is returned or an error, never a half-linked grid.
    pub fn from_parts(
        rows: usize,
        cols: usize,
        mut cells: Vec<Cell>,
        rooms: Vec<Room>,
    ) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::Empty("layout"));
        }
        if cells.len() != rows * cols {
            return Err(ConfigError::ShapeMismatch {
                expected: rows * cols,
                found: cells.len(),
            });
        }

        let mut table: BTreeMap<char, Room> = BTreeMap::new();
        for room in rooms {
            if table.contains_key(&room.symbol) {
                return Err(ConfigError::DuplicateSymbol(room.symbol));
            }
            table.insert(room.symbol, room);
        }

        let mut passages: Vec<(char, char)> = Vec::new();
        for (index, cell) in cells.iter().enumerate() {
            if cell.col >= cols || cell.row * cols + cell.col != index {
                return Err(ConfigError::MisplacedCell {
                    index,
                    row: cell.row,
                    col: cell.col,
                });
            }
            let Some(room) = table.get_mut(&cell.symbol) else {
                return Err(ConfigError::UnknownSymbol {
                    row: cell.row,
                    col: cell.col,
                    symbol: cell.symbol,
                });
            };
            if cell.room_center {
                if room.center.is_some() {
                    return Err(ConfigError::DuplicateCenter(cell.symbol));
                }
                room.center = Some(cell.position());
            }
            if cell.room_label {
                if room.label.is_some() {
                    return Err(ConfigError::DuplicateLabel(cell.symbol));
                }
                room.label = Some(cell.position());
            }
            if let Some(target) = cell.secret_passage {
                if !table.contains_key(&target) {
                    return Err(ConfigError::UnknownPassage {
                        row: cell.row,
                        col: cell.col,
                        symbol: target,
                    });
                }
                passages.push((cell.symbol, target));
            }
        }

        for room in table.values() {
            if room.card_room && room.center.is_none() {
                return Err(ConfigError::MissingCenter(room.symbol));
            }
        }

        for (from, to) in passages {
            let center = table.get(&from).and_then(|r| r.center);
            let Some(center) = center else {
                return Err(ConfigError::MissingCenter(from));
            };
            cells[center.row * cols + center.col].secret_passage = Some(to);
        }

        Ok(Self {
            rows,
            cols,
            cells,
            rooms: table,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.row * self.cols + pos.col)
    }

    /// Cell at (row, column), or `None` when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cell_at(Position::new(row, col))
    }

    pub fn cell_at(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn room(&self, symbol: char) -> Option<&Room> {
        self.rooms.get(&symbol)
    }

    /// Room the cell belongs to (walkway and unused included).
    pub fn room_of(&self, pos: Position) -> Option<&Room> {
        self.cell_at(pos).and_then(|c| self.rooms.get(&c.symbol))
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Rooms that carry a card, in symbol order.
    pub fn card_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values().filter(|r| r.card_room)
    }

    /// Neighbor one step in `dir`, or `None` off the edge.
    pub fn step(&self, pos: Position, dir: DoorDirection) -> Option<Position> {
        let (dr, dc) = dir.offset();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        self.contains(next).then_some(next)
    }

    /// Mark a cell occupied or free. Returns `false` for out-of-range positions.
    pub fn set_occupied(&mut self, pos: Position, occupied: bool) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i].occupied = occupied;
                true
            }
            None => false,
        }
    }

    pub fn clear_occupancy(&mut self) {
        for cell in &mut self.cells {
            cell.occupied = false;
        }
    }
}
