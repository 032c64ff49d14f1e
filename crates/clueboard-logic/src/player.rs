//! Player data: seat, token position, hand and what they have been shown.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::cards::{Card, CardKind, Solution};

/// Who drives a seat. Selection behavior lives in [`crate::strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    Human,
    Computer,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub color: String,
    pub kind: PlayerKind,
    position: Position,
    hand: Vec<Card>,
    seen: BTreeSet<Card>,
    eliminated: bool,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        kind: PlayerKind,
        position: Position,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            kind,
            position,
            hand: Vec::new(),
            seen: BTreeSet::new(),
            eliminated: false,
        }
    }

    pub fn human(name: impl Into<String>, color: impl Into<String>, position: Position) -> Self {
        Self::new(name, color, PlayerKind::Human, position)
    }

    pub fn computer(name: impl Into<String>, color: impl Into<String>, position: Position) -> Self {
        Self::new(name, color, PlayerKind::Computer, position)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    /// Add a card to the hand. A card already held is ignored.
    pub fn add_card(&mut self, card: Card) {
        if !self.hand.contains(&card) {
            self.hand.push(card);
        }
    }

    pub fn clear_hand(&mut self) {
        self.hand.clear();
    }

    pub fn seen(&self) -> &BTreeSet<Card> {
        &self.seen
    }

    pub fn mark_seen(&mut self, card: Card) {
        if !self.hand.contains(&card) {
            self.seen.insert(card);
        }
    }

    /// In hand or shown by someone.
    pub fn knows(&self, card: &Card) -> bool {
        self.hand.contains(card) || self.seen.contains(card)
    }

    /// Cards of `kind` from `pool` this player has not ruled out.
    pub fn unknown<'a>(
        &self,
        pool: impl IntoIterator<Item = &'a Card>,
        kind: CardKind,
    ) -> Vec<&'a Card> {
        pool.into_iter()
            .filter(|c| c.kind == kind && !self.knows(c))
            .collect()
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated
    }

    pub(crate) fn eliminate(&mut self) {
        self.eliminated = true;
    }

    /// A random card from this hand that matches the suggestion, or `None`.
    pub fn disprove_suggestion<R: Rng + ?Sized>(
        &self,
        suggestion: &Solution,
        rng: &mut R,
    ) -> Option<Card> {
        let matches: Vec<&Card> = self
            .hand
            .iter()
            .filter(|c| suggestion.contains(c))
            .collect();
        matches.choose(rng).map(|c| (*c).clone())
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.name, self.position)
    }
}
