//! Table loading and game configuration.
//!
//! Two text tables describe a game:
//!
//! - the **setup** table, one comma-separated record per line:
//!   `Room,<name>,<symbol>`, `Space,<name>,<symbol>`,
//!   `Player|Computer,<name>,<color>,<row>,<col>`, `Weapon,<name>`.
//!   Blank lines and `//` comments are skipped.
//! - the **layout** table, one comma-separated row of cell tokens per line.
//!   A token is a symbol, optionally followed by `*` (room center), `#`
//!   (room label), a door marker (`^ v < >`) or an uppercase letter (secret
//!   passage target). A token starting with a door marker (`^M`) is a
//!   walkway door facing into room `M`.
//!
//! Any defect aborts loading with a single [`ConfigError`]; callers never
//! see a partially-built board.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Cell, DoorDirection, Position, Room};
use crate::cards::{Card, CardKind, Deck};
use crate::constants::{markers, symbols, DEFAULT_DIE_SIDES};
use crate::player::{Player, PlayerKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} table is empty")]
    Empty(&'static str),
    #[error("setup line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("setup line {line}: unknown record kind {kind:?}")]
    UnknownRecordKind { line: usize, kind: String },
    #[error("setup line {line}: invalid room symbol {value:?}")]
    InvalidSymbol { line: usize, value: String },
    #[error("symbol {0:?} is defined more than once")]
    DuplicateSymbol(char),
    #[error("setup line {line}: {kind} card {name:?} is defined more than once")]
    DuplicateCard {
        line: usize,
        name: String,
        kind: CardKind,
    },
    #[error("setup line {line}: {value:?} is not a board coordinate")]
    InvalidNumber { line: usize, value: String },
    #[error("layout row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("layout cell ({row}, {col}): malformed token {token:?}")]
    MalformedToken {
        row: usize,
        col: usize,
        token: String,
    },
    #[error("layout cell ({row}, {col}): symbol {symbol:?} has no setup entry")]
    UnknownSymbol { row: usize, col: usize, symbol: char },
    #[error("expected {expected} cells, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("room {0:?} has more than one center")]
    DuplicateCenter(char),
    #[error("room {0:?} has more than one label")]
    DuplicateLabel(char),
    #[error("room {0:?} has no center")]
    MissingCenter(char),
    #[error("cell {index} claims position ({row}, {col})")]
    MisplacedCell { index: usize, row: usize, col: usize },
    #[error("layout cell ({row}, {col}): door does not face room {symbol:?}")]
    DoorMismatch { row: usize, col: usize, symbol: char },
    #[error("layout cell ({row}, {col}): secret passage to unknown room {symbol:?}")]
    UnknownPassage { row: usize, col: usize, symbol: char },
    #[error("{name} starts at ({row}, {col}), outside the board")]
    StartOutOfBounds { name: String, row: usize, col: usize },
    #[error("{name} starts at ({row}, {col}), which is not a walkway or room center")]
    StartNotWalkable { name: String, row: usize, col: usize },
    #[error("setup defines no {0} cards")]
    MissingCardKind(CardKind),
    #[error("setup defines no players")]
    NoPlayers,
    #[error("die must have at least one side, got {0}")]
    InvalidDie(u32),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Game configuration ──────────────────────────────────────────────────

/// Runtime knobs that are not part of the board tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the session RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Faces on the movement die.
    pub die_sides: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            die_sides: DEFAULT_DIE_SIDES,
        }
    }
}

impl GameConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.die_sides == 0 {
            return Err(ConfigError::InvalidDie(self.die_sides));
        }
        Ok(())
    }
}

// ── Setup table ─────────────────────────────────────────────────────────

/// Everything the setup table defines.
#[derive(Debug, Clone)]
pub struct GameSetup {
    pub rooms: Vec<Room>,
    pub deck: Deck,
    pub players: Vec<Player>,
}

pub fn load_setup(text: &str) -> Result<GameSetup, ConfigError> {
    let mut rooms = Vec::new();
    let mut cards = Vec::new();
    let mut players = Vec::new();
    let mut symbols_seen = BTreeSet::new();
    let mut cards_seen = BTreeSet::new();
    let mut records = 0;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        records += 1;
        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let arity = |n: usize| -> Result<(), ConfigError> {
            if fields.len() != n || fields.iter().any(|f| f.is_empty()) {
                return Err(ConfigError::MalformedRecord {
                    line,
                    reason: format!("{} record needs {} non-empty fields", fields[0], n),
                });
            }
            Ok(())
        };

        match fields[0] {
            "Room" | "Space" => {
                arity(3)?;
                let symbol = parse_symbol(fields[2], line)?;
                if !symbols_seen.insert(symbol) {
                    return Err(ConfigError::DuplicateSymbol(symbol));
                }
                if fields[0] == "Room" {
                    rooms.push(Room::new(fields[1], symbol));
                    cards.push(unique_card(Card::room(fields[1]), line, &mut cards_seen)?);
                } else {
                    rooms.push(Room::space(fields[1], symbol));
                }
            }
            "Player" | "Computer" => {
                arity(5)?;
                let row = parse_coord(fields[3], line)?;
                let col = parse_coord(fields[4], line)?;
                let kind = if fields[0] == "Player" {
                    PlayerKind::Human
                } else {
                    PlayerKind::Computer
                };
                let card = unique_card(Card::person(fields[1]), line, &mut cards_seen)?;
                players.push(Player::new(fields[1], fields[2], kind, Position::new(row, col)));
                cards.push(card);
            }
            "Weapon" => {
                arity(2)?;
                cards.push(unique_card(Card::weapon(fields[1]), line, &mut cards_seen)?);
            }
            other => {
                return Err(ConfigError::UnknownRecordKind {
                    line,
                    kind: other.to_string(),
                })
            }
        }
    }

    if records == 0 {
        return Err(ConfigError::Empty("setup"));
    }
    Ok(GameSetup {
        rooms,
        deck: Deck::new(cards),
        players,
    })
}

fn unique_card(card: Card, line: usize, seen: &mut BTreeSet<Card>) -> Result<Card, ConfigError> {
    if seen.contains(&card) {
        return Err(ConfigError::DuplicateCard {
            line,
            name: card.name,
            kind: card.kind,
        });
    }
    seen.insert(card.clone());
    Ok(card)
}

fn parse_symbol(value: &str, line: usize) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !markers::is_reserved(c) && !c.is_whitespace() => Ok(c),
        _ => Err(ConfigError::InvalidSymbol {
            line,
            value: value.to_string(),
        }),
    }
}

fn parse_coord(value: &str, line: usize) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}

// ── Layout table ────────────────────────────────────────────────────────

/// Parse the layout table and link it against `rooms`.
pub fn load_layout(text: &str, rooms: Vec<Room>) -> Result<Board, ConfigError> {
    let known: BTreeSet<char> = rooms.iter().map(Room::symbol).collect();
    let mut cells = Vec::new();
    let mut door_targets = Vec::new();
    let mut cols = 0;
    let mut rows = 0;

    for raw in text.lines() {
        let line = raw.trim().trim_start_matches('\u{feff}');
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
        if rows == 0 {
            cols = tokens.len();
        } else if tokens.len() != cols {
            return Err(ConfigError::RaggedRow {
                row: rows,
                expected: cols,
                found: tokens.len(),
            });
        }
        for (col, token) in tokens.iter().enumerate() {
            let (cell, faces) = parse_token(token, rows, col, &known)?;
            if let Some(symbol) = faces {
                door_targets.push((cell.position(), cell.door_direction(), symbol));
            }
            cells.push(cell);
        }
        rows += 1;
    }

    if rows == 0 {
        return Err(ConfigError::Empty("layout"));
    }
    let board = Board::from_parts(rows, cols, cells, rooms)?;

    // `^M` doors must actually face M
    for (pos, dir, symbol) in door_targets {
        let faced = board.step(pos, dir).and_then(|p| board.cell_at(p));
        if !faced.is_some_and(|c| c.symbol() == symbol) {
            return Err(ConfigError::DoorMismatch {
                row: pos.row,
                col: pos.col,
                symbol,
            });
        }
    }
    Ok(board)
}

/// One layout token. The second value is the room a `^M`-style door names.
fn parse_token(
    token: &str,
    row: usize,
    col: usize,
    known: &BTreeSet<char>,
) -> Result<(Cell, Option<char>), ConfigError> {
    let malformed = || ConfigError::MalformedToken {
        row,
        col,
        token: token.to_string(),
    };
    let mut chars = token.chars();
    let (first, second) = match (chars.next(), chars.next(), chars.next()) {
        (Some(a), b, None) => (a, b),
        _ => return Err(malformed()),
    };

    // `^M` form: walkway door facing into M
    if let Some(dir) = DoorDirection::from_marker(first) {
        let target = second.ok_or_else(malformed)?;
        if !known.contains(&target) {
            return Err(ConfigError::UnknownSymbol {
                row,
                col,
                symbol: target,
            });
        }
        let door = Cell::new(row, col, symbols::WALKWAY).with_door(dir);
        return Ok((door, Some(target)));
    }
    if markers::is_reserved(first) {
        return Err(malformed());
    }

    let cell = Cell::new(row, col, first);
    let Some(second) = second else {
        return Ok((cell, None));
    };
    let cell = match second {
        markers::CENTER => cell.with_center(),
        markers::LABEL => cell.with_label(),
        c if c.is_ascii_uppercase() => cell.with_secret_passage(c),
        // only walkway cells can be doorways
        c if first == symbols::WALKWAY => DoorDirection::from_marker(c)
            .map(|dir| cell.with_door(dir))
            .ok_or_else(malformed)?,
        _ => return Err(malformed()),
    };
    Ok((cell, None))
}

// ── Whole game ──────────────────────────────────────────────────────────

/// Load both tables and check they describe a playable game.
pub fn load_game(setup_text: &str, layout_text: &str) -> Result<(Board, GameSetup), ConfigError> {
    let setup = load_setup(setup_text)?;
    let board = load_layout(layout_text, setup.rooms.clone())?;

    for kind in CardKind::ALL {
        if setup.deck.of_kind(kind).next().is_none() {
            return Err(ConfigError::MissingCardKind(kind));
        }
    }
    if setup.players.is_empty() {
        return Err(ConfigError::NoPlayers);
    }
    for player in &setup.players {
        let pos = player.position();
        let Some(cell) = board.cell_at(pos) else {
            return Err(ConfigError::StartOutOfBounds {
                name: player.name.clone(),
                row: pos.row,
                col: pos.col,
            });
        };
        if !(cell.is_walkway() || cell.is_room_center()) {
            return Err(ConfigError::StartNotWalkable {
                name: player.name.clone(),
                row: pos.row,
                col: pos.col,
            });
        }
    }

    log::info!(
        "Loaded {}x{} board, {} rooms, {} cards, {} players",
        board.num_rows(),
        board.num_columns(),
        board.card_rooms().count(),
        setup.deck.len(),
        setup.players.len()
    );
    Ok((board, setup))
}

/// File-based form of [`load_game`].
pub fn load_game_files(
    setup_path: impl AsRef<Path>,
    layout_path: impl AsRef<Path>,
) -> Result<(Board, GameSetup), ConfigError> {
    let setup = std::fs::read_to_string(setup_path)?;
    let layout = std::fs::read_to_string(layout_path)?;
    load_game(&setup, &layout)
}
