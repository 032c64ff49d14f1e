//! Pluggable seat behavior.
//!
//! Every seat has a [`TargetSelector`]. Computer seats use
//! [`ComputerSelector`]; human seats use [`ExternalSelector`], which hands
//! back whatever cell the UI picked through its [`ChoiceHandle`].
//!
//! The computer's suggestion and accusation policy also lives here. It is
//! deliberately simple: random among cards it has not ruled out.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, RngCore};

use crate::board::{Board, Position};
use crate::cards::{Card, CardKind, Deck, Solution};
use crate::player::Player;

/// What a selector may look at when choosing.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub board: &'a Board,
    pub player: &'a Player,
}

pub trait TargetSelector: std::fmt::Debug {
    /// Pick one of `candidates`, or `None` to stay put.
    fn select_target(
        &mut self,
        candidates: &BTreeSet<Position>,
        ctx: &SelectionContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<Position>;
}

/// Prefer a room whose card this player has not ruled out; otherwise any
/// target, uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputerSelector;

impl TargetSelector for ComputerSelector {
    fn select_target(
        &mut self,
        candidates: &BTreeSet<Position>,
        ctx: &SelectionContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<Position> {
        let unseen_rooms: Vec<Position> = candidates
            .iter()
            .copied()
            .filter(|&pos| {
                ctx.board.cell_at(pos).is_some_and(|c| c.is_room_center())
                    && room_card_at(ctx.board, pos).is_some_and(|card| !ctx.player.knows(&card))
            })
            .collect();
        if let Some(pos) = unseen_rooms.choose(&mut *rng) {
            return Some(*pos);
        }
        candidates.iter().copied().choose(rng)
    }
}

/// Shared slot the UI writes a clicked cell into.
#[derive(Debug, Clone, Default)]
pub struct ChoiceHandle(Rc<RefCell<Option<Position>>>);

impl ChoiceHandle {
    pub fn choose(&self, pos: Position) {
        *self.0.borrow_mut() = Some(pos);
    }

    pub fn clear(&self) {
        *self.0.borrow_mut() = None;
    }

    pub fn pending(&self) -> Option<Position> {
        *self.0.borrow()
    }
}

/// Defers the choice to an outside caller.
///
/// A pending choice that is not among the candidates is discarded.
#[derive(Debug, Clone, Default)]
pub struct ExternalSelector {
    choice: ChoiceHandle,
}

impl ExternalSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ChoiceHandle {
        self.choice.clone()
    }
}

impl TargetSelector for ExternalSelector {
    fn select_target(
        &mut self,
        candidates: &BTreeSet<Position>,
        _ctx: &SelectionContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Option<Position> {
        let picked = self.choice.0.borrow_mut().take()?;
        candidates.contains(&picked).then_some(picked)
    }
}

/// Room card for the room the cell at `pos` belongs to, if it is a card room.
pub fn room_card_at(board: &Board, pos: Position) -> Option<Card> {
    board
        .room_of(pos)
        .filter(|room| room.is_card_room())
        .map(|room| Card::room(room.name()))
}

/// A suggestion for `room`: random person and weapon the player has not
/// ruled out, or any of that kind once everything is known.
pub fn create_suggestion<R: Rng + ?Sized>(
    player: &Player,
    deck: &Deck,
    room: Card,
    rng: &mut R,
) -> Option<Solution> {
    let mut pick = |kind: CardKind| -> Option<Card> {
        let unknown = player.unknown(deck.cards(), kind);
        let card = match unknown.choose(&mut *rng) {
            Some(card) => *card,
            None => deck.of_kind(kind).choose(&mut *rng)?,
        };
        Some(card.clone())
    };
    let person = pick(CardKind::Person)?;
    let weapon = pick(CardKind::Weapon)?;
    Some(Solution::new(person, weapon, room))
}

/// Accuse with an unrefuted suggestion unless the player holds one of its
/// cards (in which case nobody else could have refuted it).
pub fn accusation_from(player: &Player, unrefuted: Option<&Solution>) -> Option<Solution> {
    let suggestion = unrefuted?;
    let holds_any = suggestion.cards().iter().any(|c| player.hand().contains(c));
    (!holds_any).then(|| suggestion.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, DoorDirection, Room};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    // row 0:  K*  W<  W   W>  L*
    fn board() -> Board {
        let rooms = vec![
            Room::new("Kitchen", 'K'),
            Room::new("Library", 'L'),
            Room::space("Walkway", 'W'),
        ];
        let cells = vec![
            Cell::new(0, 0, 'K').with_center(),
            Cell::new(0, 1, 'W').with_door(DoorDirection::Left),
            Cell::new(0, 2, 'W'),
            Cell::new(0, 3, 'W').with_door(DoorDirection::Right),
            Cell::new(0, 4, 'L').with_center(),
        ];
        Board::from_parts(1, 5, cells, rooms).unwrap()
    }

    fn deck() -> Deck {
        Deck::new(vec![
            Card::person("Plum"),
            Card::person("Scarlet"),
            Card::weapon("Rope"),
            Card::weapon("Knife"),
            Card::room("Kitchen"),
            Card::room("Library"),
        ])
    }

    #[test]
    fn test_computer_prefers_unseen_room() {
        let b = board();
        let mut player = Player::computer("Plum", "purple", p(0, 2));
        player.mark_seen(Card::room("Kitchen"));
        let candidates = BTreeSet::from([p(0, 0), p(0, 2), p(0, 4)]);
        let ctx = SelectionContext {
            board: &b,
            player: &player,
        };
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..30 {
            let pick = ComputerSelector.select_target(&candidates, &ctx, &mut rng);
            assert_eq!(pick, Some(p(0, 4)));
        }
    }

    #[test]
    fn test_computer_falls_back_to_any_target() {
        let b = board();
        let mut player = Player::computer("Plum", "purple", p(0, 2));
        player.add_card(Card::room("Kitchen"));
        player.mark_seen(Card::room("Library"));
        let candidates = BTreeSet::from([p(0, 0), p(0, 1), p(0, 4)]);
        let ctx = SelectionContext {
            board: &b,
            player: &player,
        };
        let mut rng = StdRng::seed_from_u64(9);
        let mut picked = BTreeSet::new();
        for _ in 0..100 {
            picked.insert(
                ComputerSelector
                    .select_target(&candidates, &ctx, &mut rng)
                    .unwrap(),
            );
        }
        assert_eq!(picked, candidates);
    }

    #[test]
    fn test_computer_with_no_candidates() {
        let b = board();
        let player = Player::computer("Plum", "purple", p(0, 2));
        let ctx = SelectionContext {
            board: &b,
            player: &player,
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            ComputerSelector.select_target(&BTreeSet::new(), &ctx, &mut rng),
            None
        );
    }

    #[test]
    fn test_external_selector_uses_handle_once() {
        let b = board();
        let player = Player::human("Scarlet", "red", p(0, 2));
        let ctx = SelectionContext {
            board: &b,
            player: &player,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = BTreeSet::from([p(0, 1), p(0, 3)]);

        let mut selector = ExternalSelector::new();
        let handle = selector.handle();
        assert_eq!(selector.select_target(&candidates, &ctx, &mut rng), None);

        handle.choose(p(0, 3));
        assert_eq!(handle.pending(), Some(p(0, 3)));
        assert_eq!(selector.select_target(&candidates, &ctx, &mut rng), Some(p(0, 3)));
        assert_eq!(handle.pending(), None);

        handle.choose(p(0, 0));
        assert_eq!(selector.select_target(&candidates, &ctx, &mut rng), None);
    }

    #[test]
    fn test_suggestion_avoids_known_cards() {
        let mut player = Player::computer("Plum", "purple", p(0, 0));
        player.add_card(Card::person("Plum"));
        player.mark_seen(Card::weapon("Rope"));
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            let s = create_suggestion(&player, &deck(), Card::room("Kitchen"), &mut rng).unwrap();
            assert_eq!(s.person, Card::person("Scarlet"));
            assert_eq!(s.weapon, Card::weapon("Knife"));
            assert_eq!(s.room, Card::room("Kitchen"));
        }
    }

    #[test]
    fn test_suggestion_when_everything_known() {
        let mut player = Player::computer("Plum", "purple", p(0, 0));
        for card in deck().cards() {
            player.add_card(card.clone());
        }
        let mut rng = StdRng::seed_from_u64(2);
        let s = create_suggestion(&player, &deck(), Card::room("Library"), &mut rng).unwrap();
        assert_eq!(s.person.kind, CardKind::Person);
        assert_eq!(s.weapon.kind, CardKind::Weapon);
    }

    #[test]
    fn test_accusation_policy() {
        let mut player = Player::computer("Plum", "purple", p(0, 0));
        let s = Solution::new(
            Card::person("Scarlet"),
            Card::weapon("Knife"),
            Card::room("Library"),
        );
        assert_eq!(accusation_from(&player, None), None);
        assert_eq!(accusation_from(&player, Some(&s)), Some(s.clone()));
        player.add_card(Card::weapon("Knife"));
        assert_eq!(accusation_from(&player, Some(&s)), None);
    }

    #[test]
    fn test_room_card_at() {
        let b = board();
        assert_eq!(room_card_at(&b, p(0, 0)), Some(Card::room("Kitchen")));
        assert_eq!(room_card_at(&b, p(0, 2)), None);
    }
}
