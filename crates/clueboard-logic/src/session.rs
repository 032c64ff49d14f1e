//! A running game.
//!
//! [`GameSession`] owns the board, the players, the deck, the hidden
//! solution and the one RNG every random choice draws from. A fixed seed
//! replays a whole game move for move.
//!
//! Turn flow: [`GameSession::start_turn`] picks the next active seat, rolls
//! and computes targets; the seat then moves with
//! [`GameSession::move_current_player_to`], may [`GameSession::suggest`]
//! from a room and may [`GameSession::accuse`]. Computer seats do all of
//! this through [`GameSession::play_computer_turn`].

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adjacency;
use crate::board::{Board, Position, Room};
use crate::cards::{Card, CardKind, Deck, Solution};
use crate::config::{load_game, ConfigError, GameConfig, GameSetup};
use crate::deal::{deal_game, DealError};
use crate::player::{Player, PlayerKind};
use crate::strategy::{
    accusation_from, create_suggestion, room_card_at, ChoiceHandle, ComputerSelector,
    ExternalSelector, SelectionContext, TargetSelector,
};
use crate::suggestion::{self, Disproof};
use crate::targets::TargetSearch;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Deal(#[from] DealError),
    #[error("no player in seat {0}")]
    NoSuchPlayer(usize),
    #[error("({row}, {col}) is not a target this turn")]
    NotATarget { row: usize, col: usize },
    #[error("out of turn: {0}")]
    OutOfTurn(&'static str),
    #[error("seat {0} has been eliminated")]
    Eliminated(usize),
    #[error("the game is over")]
    GameOver,
    #[error("{name} is not in a room")]
    NotInRoom { name: String },
    #[error("no {kind} card named '{name}'")]
    UnknownCard { name: String, kind: CardKind },
}

/// Returned by [`GameSession::start_turn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStart {
    pub seat: usize,
    pub roll: u32,
    pub targets: BTreeSet<Position>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccusationOutcome {
    Correct,
    /// The accuser is out. `game_over` is set when nobody is left.
    Incorrect { game_over: bool },
}

/// Everything that happened during one automated turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub seat: usize,
    pub player: String,
    pub roll: u32,
    pub from: Position,
    pub to: Option<Position>,
    pub suggestion: Option<Solution>,
    pub disproof: Option<Disproof>,
    pub accusation: Option<Solution>,
    pub outcome: Option<AccusationOutcome>,
}

#[derive(Debug)]
pub struct GameSession<R: Rng = StdRng> {
    board: Board,
    players: Vec<Player>,
    deck: Deck,
    solution: Solution,
    rng: R,
    die_sides: u32,
    selectors: Vec<Box<dyn TargetSelector>>,
    handles: Vec<Option<ChoiceHandle>>,
    // Last suggestion per seat, kept only while nobody could refute it.
    unrefuted: Vec<Option<Solution>>,
    current: Option<usize>,
    roll: Option<u32>,
    search: TargetSearch,
    moved: bool,
    winner: Option<usize>,
    over: bool,
    turns: u64,
}

impl GameSession<StdRng> {
    /// Parse both tables and start a game with the configured seed.
    pub fn from_tables(
        setup_text: &str,
        layout_text: &str,
        config: &GameConfig,
    ) -> Result<Self, SessionError> {
        let (board, setup) = load_game(setup_text, layout_text)?;
        Self::new(board, setup, config)
    }

    pub fn new(board: Board, setup: GameSetup, config: &GameConfig) -> Result<Self, SessionError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(board, setup, config, rng)
    }
}

impl<R: Rng> GameSession<R> {
    /// Deal and seat everyone. `config.seed` is ignored; `rng` is used as is.
    pub fn with_rng(
        mut board: Board,
        setup: GameSetup,
        config: &GameConfig,
        mut rng: R,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let GameSetup { deck, mut players, .. } = setup;
        let deal = deal_game(&deck, players.len(), &mut rng)?;

        for (player, hand) in players.iter_mut().zip(deal.hands) {
            player.clear_hand();
            for card in hand {
                player.add_card(card);
            }
        }

        board.clear_occupancy();
        for player in &players {
            board.set_occupied(player.position(), true);
        }

        let mut selectors: Vec<Box<dyn TargetSelector>> = Vec::with_capacity(players.len());
        let mut handles = Vec::with_capacity(players.len());
        for player in &players {
            match player.kind {
                PlayerKind::Computer => {
                    selectors.push(Box::new(ComputerSelector));
                    handles.push(None);
                }
                PlayerKind::Human => {
                    let selector = ExternalSelector::new();
                    handles.push(Some(selector.handle()));
                    selectors.push(Box::new(selector));
                }
            }
        }

        log::info!(
            "New game: {} players, {}-sided die",
            players.len(),
            config.die_sides
        );
        Ok(Self {
            unrefuted: vec![None; players.len()],
            board,
            players,
            deck,
            solution: deal.solution,
            rng,
            die_sides: config.die_sides,
            selectors,
            handles,
            current: None,
            roll: None,
            search: TargetSearch::new(),
            moved: false,
            winner: None,
            over: false,
            turns: 0,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.get(seat)
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.and_then(|seat| self.players.get(seat))
    }

    pub fn winner_seat(&self) -> Option<usize> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    pub fn die_sides(&self) -> u32 {
        self.die_sides
    }

    pub fn people_names(&self) -> Vec<&str> {
        self.deck.names(CardKind::Person)
    }

    pub fn weapon_names(&self) -> Vec<&str> {
        self.deck.names(CardKind::Weapon)
    }

    pub fn room_names(&self) -> Vec<&str> {
        self.deck.names(CardKind::Room)
    }

    /// Replace the selector of a seat. The seat loses its choice handle.
    pub fn set_selector(
        &mut self,
        seat: usize,
        selector: Box<dyn TargetSelector>,
    ) -> Result<(), SessionError> {
        let slot = self
            .selectors
            .get_mut(seat)
            .ok_or(SessionError::NoSuchPlayer(seat))?;
        *slot = selector;
        self.handles[seat] = None;
        Ok(())
    }

    /// Where the UI writes a human seat's chosen target.
    pub fn choice_handle(&self, seat: usize) -> Option<ChoiceHandle> {
        self.handles.get(seat).cloned().flatten()
    }

    // ── Board queries ───────────────────────────────────────────────────

    pub fn adjacent(&self, row: usize, col: usize) -> BTreeSet<Position> {
        adjacency::adjacent(&self.board, row, col)
    }

    /// Compute targets for an arbitrary start; read them with [`Self::targets`].
    pub fn calc_targets(&mut self, start: Position, steps: u32) {
        self.search.calc_targets(&self.board, start, steps);
    }

    pub fn targets(&self) -> &BTreeSet<Position> {
        self.search.targets()
    }

    pub fn is_target(&self, pos: Position) -> bool {
        self.search.contains(pos)
    }

    pub fn roll_die(&mut self) -> u32 {
        self.rng.gen_range(1..=self.die_sides)
    }

    // ── Turns ───────────────────────────────────────────────────────────

    pub fn current_seat(&self) -> Option<usize> {
        self.current
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.current.and_then(|seat| self.players.get(seat))
    }

    pub fn current_roll(&self) -> Option<u32> {
        self.roll
    }

    /// The card room the current player stands in, if any.
    pub fn current_room(&self) -> Option<&Room> {
        let player = self.current_player()?;
        self.board
            .room_of(player.position())
            .filter(|room| room.is_card_room())
    }

    /// Advance to the next seat still in the game, roll and compute targets.
    pub fn start_turn(&mut self) -> Result<TurnStart, SessionError> {
        if self.over {
            return Err(SessionError::GameOver);
        }
        let n = self.players.len();
        let first = self.current.map_or(0, |seat| seat + 1);
        let Some(seat) = (0..n)
            .map(|offset| (first + offset) % n)
            .find(|&seat| !self.players[seat].is_eliminated())
        else {
            self.over = true;
            return Err(SessionError::GameOver);
        };

        let roll = self.roll_die();
        let from = self.players[seat].position();
        self.current = Some(seat);
        self.roll = Some(roll);
        self.moved = false;
        self.turns += 1;
        self.search.calc_targets(&self.board, from, roll);

        log::info!(
            "Turn {}: {} rolls {} ({} targets)",
            self.turns,
            self.players[seat].name,
            roll,
            self.search.targets().len()
        );
        Ok(TurnStart {
            seat,
            roll,
            targets: self.search.targets().clone(),
        })
    }

    /// Move the current player to one of this turn's targets.
    pub fn move_current_player_to(&mut self, pos: Position) -> Result<(), SessionError> {
        if self.over {
            return Err(SessionError::GameOver);
        }
        let seat = self
            .current
            .ok_or(SessionError::OutOfTurn("no turn has started"))?;
        if self.moved {
            return Err(SessionError::OutOfTurn("already moved this turn"));
        }
        if !self.search.contains(pos) {
            return Err(SessionError::NotATarget {
                row: pos.row,
                col: pos.col,
            });
        }
        self.move_player(seat, pos)?;
        self.moved = true;
        self.search.clear();
        Ok(())
    }

    /// Put a token on `pos` with no turn checks.
    pub fn move_player(&mut self, seat: usize, pos: Position) -> Result<(), SessionError> {
        let from = self
            .players
            .get(seat)
            .ok_or(SessionError::NoSuchPlayer(seat))?
            .position();
        if !self.board.contains(pos) {
            return Err(SessionError::NotATarget {
                row: pos.row,
                col: pos.col,
            });
        }

        self.players[seat].set_position(pos);
        let still_held = self
            .players
            .iter()
            .any(|p| p.position() == from);
        self.board.set_occupied(from, still_held);
        self.board.set_occupied(pos, true);
        log::info!("{} moves {} -> {}", self.players[seat].name, from, pos);
        Ok(())
    }

    // ── Suggestions and accusations ─────────────────────────────────────

    /// Suggest `person` with `weapon` in the current player's room.
    ///
    /// A refuting card is recorded as seen by the suggester.
    pub fn suggest(
        &mut self,
        person: Card,
        weapon: Card,
    ) -> Result<Option<Disproof>, SessionError> {
        if self.over {
            return Err(SessionError::GameOver);
        }
        let seat = self
            .current
            .ok_or(SessionError::OutOfTurn("no turn has started"))?;
        if self.players[seat].is_eliminated() {
            return Err(SessionError::Eliminated(seat));
        }
        let player = &self.players[seat];
        let room = room_card_at(&self.board, player.position()).ok_or_else(|| {
            SessionError::NotInRoom {
                name: player.name.clone(),
            }
        })?;
        Ok(self.record_suggestion(seat, Solution::new(person, weapon, room)))
    }

    /// [`Self::suggest`] by card name, as a dialog would supply them.
    pub fn suggest_by_name(
        &mut self,
        person: &str,
        weapon: &str,
    ) -> Result<Option<Disproof>, SessionError> {
        let person = self.find_card(person, CardKind::Person)?;
        let weapon = self.find_card(weapon, CardKind::Weapon)?;
        self.suggest(person, weapon)
    }

    fn find_card(&self, name: &str, kind: CardKind) -> Result<Card, SessionError> {
        self.deck
            .find(name, kind)
            .cloned()
            .ok_or_else(|| SessionError::UnknownCard {
                name: name.to_string(),
                kind,
            })
    }

    fn record_suggestion(&mut self, seat: usize, suggestion: Solution) -> Option<Disproof> {
        log::info!("{} suggests {}", self.players[seat].name, suggestion);
        let disproof =
            suggestion::resolve_suggestion(&self.players, seat, &suggestion, &mut self.rng);
        match &disproof {
            Some(d) => {
                log::debug!(
                    "{} shows {} to {}",
                    self.players[d.player].name,
                    d.card,
                    self.players[seat].name
                );
                self.players[seat].mark_seen(d.card.clone());
                self.unrefuted[seat] = None;
            }
            None => {
                log::info!("Nobody can disprove {}", suggestion);
                self.unrefuted[seat] = Some(suggestion);
            }
        }
        disproof
    }

    /// Ask the other seats to disprove `suggestion`; see
    /// [`suggestion::handle_suggestion`].
    pub fn handle_suggestion(&mut self, suggester: usize, suggestion: &Solution) -> Option<Card> {
        suggestion::handle_suggestion(&self.players, suggester, suggestion, &mut self.rng)
    }

    pub fn resolve_suggestion(
        &mut self,
        suggester: usize,
        suggestion: &Solution,
    ) -> Option<Disproof> {
        suggestion::resolve_suggestion(&self.players, suggester, suggestion, &mut self.rng)
    }

    pub fn check_accusation(&self, accusation: &Solution) -> bool {
        suggestion::check_accusation(&self.solution, accusation)
    }

    /// Accuse on `seat`'s turn. A wrong accusation eliminates the seat.
    pub fn accuse(
        &mut self,
        seat: usize,
        accusation: &Solution,
    ) -> Result<AccusationOutcome, SessionError> {
        if self.over {
            return Err(SessionError::GameOver);
        }
        let player = self
            .players
            .get(seat)
            .ok_or(SessionError::NoSuchPlayer(seat))?;
        if player.is_eliminated() {
            return Err(SessionError::Eliminated(seat));
        }
        if self.current != Some(seat) {
            return Err(SessionError::OutOfTurn("accusations are made on your own turn"));
        }

        if self.check_accusation(accusation) {
            log::info!("{} wins: {}", self.players[seat].name, accusation);
            self.winner = Some(seat);
            self.over = true;
            return Ok(AccusationOutcome::Correct);
        }

        self.players[seat].eliminate();
        self.search.clear();
        let game_over = self.players.iter().all(Player::is_eliminated);
        if game_over {
            self.over = true;
        }
        log::info!(
            "{} accused wrongly ({}) and is out",
            self.players[seat].name,
            accusation
        );
        Ok(AccusationOutcome::Incorrect { game_over })
    }

    // ── Automated play ──────────────────────────────────────────────────

    /// Start the next turn and play it. Computer seats play in full; other
    /// seats move to their pending choice, if any, and stop there.
    pub fn play_turn(&mut self) -> Result<TurnReport, SessionError> {
        let start = self.start_turn()?;
        if self.players[start.seat].kind == PlayerKind::Computer {
            return self.play_computer_turn();
        }
        let mut report = self.empty_report(start.seat, start.roll);
        report.to = self.select_and_move(start.seat)?;
        Ok(report)
    }

    /// Finish a started turn for a computer seat: accuse if a previous
    /// suggestion went unrefuted, otherwise move and suggest from any room
    /// entered.
    pub fn play_computer_turn(&mut self) -> Result<TurnReport, SessionError> {
        if self.over {
            return Err(SessionError::GameOver);
        }
        let (seat, roll) = match (self.current, self.roll) {
            (Some(seat), Some(roll)) if !self.moved => (seat, roll),
            _ => return Err(SessionError::OutOfTurn("no turn in progress")),
        };
        if self.players[seat].kind != PlayerKind::Computer {
            return Err(SessionError::OutOfTurn("seat is not computer-controlled"));
        }
        let mut report = self.empty_report(seat, roll);

        let unrefuted = self.unrefuted[seat].as_ref();
        if let Some(accusation) = accusation_from(&self.players[seat], unrefuted) {
            report.outcome = Some(self.accuse(seat, &accusation)?);
            report.accusation = Some(accusation);
            return Ok(report);
        }

        report.to = self.select_and_move(seat)?;
        if report.to.is_some() {
            let pos = self.players[seat].position();
            let entered_room = self.board.cell_at(pos).is_some_and(|c| c.is_room_center());
            if let Some(room) = room_card_at(&self.board, pos).filter(|_| entered_room) {
                if let Some(suggestion) =
                    create_suggestion(&self.players[seat], &self.deck, room, &mut self.rng)
                {
                    report.disproof = self.record_suggestion(seat, suggestion.clone());
                    report.suggestion = Some(suggestion);
                }
            }
        }
        Ok(report)
    }

    fn select_and_move(&mut self, seat: usize) -> Result<Option<Position>, SessionError> {
        let ctx = SelectionContext {
            board: &self.board,
            player: &self.players[seat],
        };
        let choice = self.selectors[seat].select_target(self.search.targets(), &ctx, &mut self.rng);
        match choice {
            Some(pos) => {
                self.move_current_player_to(pos)?;
                Ok(Some(pos))
            }
            None => {
                log::debug!("{} stays put", self.players[seat].name);
                Ok(None)
            }
        }
    }

    fn empty_report(&self, seat: usize, roll: u32) -> TurnReport {
        TurnReport {
            seat,
            player: self.players[seat].name.clone(),
            roll,
            from: self.players[seat].position(),
            to: None,
            suggestion: None,
            disproof: None,
            accusation: None,
            outcome: None,
        }
    }
}
