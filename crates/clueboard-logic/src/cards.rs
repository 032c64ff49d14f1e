//! Cards, the hidden solution, and the full deck.

use serde::{Deserialize, Serialize};

/// The three card categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Person,
    Weapon,
    Room,
}

impl CardKind {
    pub const ALL: [CardKind; 3] = [CardKind::Person, CardKind::Weapon, CardKind::Room];
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CardKind::Person => "PERSON",
            CardKind::Weapon => "WEAPON",
            CardKind::Room => "ROOM",
        };
        f.write_str(s)
    }
}

/// A card. Two cards are the same card iff name and kind both match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub kind: CardKind,
}

impl Card {
    pub fn new(name: impl Into<String>, kind: CardKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn person(name: impl Into<String>) -> Self {
        Self::new(name, CardKind::Person)
    }

    pub fn weapon(name: impl Into<String>) -> Self {
        Self::new(name, CardKind::Weapon)
    }

    pub fn room(name: impl Into<String>) -> Self {
        Self::new(name, CardKind::Room)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// One person, one weapon, one room. Used for the hidden answer as well as
/// for suggestions and accusations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solution {
    pub person: Card,
    pub weapon: Card,
    pub room: Card,
}

impl Solution {
    pub fn new(person: Card, weapon: Card, room: Card) -> Self {
        Self {
            person,
            weapon,
            room,
        }
    }

    pub fn cards(&self) -> [&Card; 3] {
        [&self.person, &self.weapon, &self.room]
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards().contains(&card)
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} with the {} in the {}",
            self.person.name, self.weapon.name, self.room.name
        )
    }
}

/// Every card in the game, in setup-table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }

    pub fn of_kind(&self, kind: CardKind) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(move |c| c.kind == kind)
    }

    /// Card names of one kind, for dialog lists.
    pub fn names(&self, kind: CardKind) -> Vec<&str> {
        self.of_kind(kind).map(|c| c.name.as_str()).collect()
    }

    pub fn find(&self, name: &str, kind: CardKind) -> Option<&Card> {
        self.cards.iter().find(|c| c.kind == kind && c.name == name)
    }

    /// Build a triple from the names picked in a dialog. `None` if any name
    /// is not a card of the expected kind.
    pub fn solution_from_names(&self, person: &str, weapon: &str, room: &str) -> Option<Solution> {
        Some(Solution::new(
            self.find(person, CardKind::Person)?.clone(),
            self.find(weapon, CardKind::Weapon)?.clone(),
            self.find(room, CardKind::Room)?.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Deck {
        Deck::new(vec![
            Card::room("Kitchen"),
            Card::person("Mustard"),
            Card::person("Plum"),
            Card::weapon("Rope"),
        ])
    }

    #[test]
    fn test_identity_is_name_and_kind() {
        assert_eq!(Card::person("Rope"), Card::person("Rope"));
        assert_ne!(Card::person("Rope"), Card::weapon("Rope"));
    }

    #[test]
    fn test_names_by_kind() {
        let d = deck();
        assert_eq!(d.names(CardKind::Person), vec!["Mustard", "Plum"]);
        assert_eq!(d.names(CardKind::Room), vec!["Kitchen"]);
    }

    #[test]
    fn test_solution_from_names() {
        let d = deck();
        let s = d.solution_from_names("Plum", "Rope", "Kitchen").unwrap();
        assert_eq!(s.person, Card::person("Plum"));
        assert!(s.contains(&Card::weapon("Rope")));
        // wrong kind
        assert!(d.solution_from_names("Rope", "Rope", "Kitchen").is_none());
    }

    #[test]
    fn test_display() {
        let s = Solution::new(
            Card::person("Plum"),
            Card::weapon("Rope"),
            Card::room("Kitchen"),
        );
        assert_eq!(s.to_string(), "Plum with the Rope in the Kitchen");
        assert_eq!(Card::room("Kitchen").to_string(), "Kitchen (ROOM)");
    }
}
