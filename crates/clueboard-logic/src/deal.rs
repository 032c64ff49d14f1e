//! Picking the hidden solution and dealing the rest.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::cards::{Card, CardKind, Deck, Solution};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DealError {
    #[error("deck has no {0} cards")]
    MissingKind(CardKind),
    #[error("cannot deal to zero players")]
    NoPlayers,
}

/// Result of dealing a deck: the hidden answer plus one hand per seat.
#[derive(Debug, Clone)]
pub struct Deal {
    pub solution: Solution,
    pub hands: Vec<Vec<Card>>,
}

impl Deal {
    /// Total cards in all hands.
    pub fn dealt_count(&self) -> usize {
        self.hands.iter().map(Vec::len).sum()
    }
}

/// Draw one random card of each kind as the solution, shuffle the rest and
/// deal it round-robin so hand sizes differ by at most one.
pub fn deal_game<R: Rng + ?Sized>(
    deck: &Deck,
    player_count: usize,
    rng: &mut R,
) -> Result<Deal, DealError> {
    if player_count == 0 {
        return Err(DealError::NoPlayers);
    }

    let mut pick = |kind: CardKind| -> Result<Card, DealError> {
        let group: Vec<&Card> = deck.of_kind(kind).collect();
        group
            .choose(&mut *rng)
            .map(|c| (*c).clone())
            .ok_or(DealError::MissingKind(kind))
    };
    let solution = Solution::new(
        pick(CardKind::Person)?,
        pick(CardKind::Weapon)?,
        pick(CardKind::Room)?,
    );

    let mut pool: Vec<Card> = deck
        .cards()
        .iter()
        .filter(|c| !solution.contains(c))
        .cloned()
        .collect();
    pool.shuffle(rng);

    let mut hands = vec![Vec::new(); player_count];
    for (i, card) in pool.into_iter().enumerate() {
        hands[i % player_count].push(card);
    }

    log::info!(
        "Dealt {} cards to {} players; solution hidden",
        hands.iter().map(Vec::len).sum::<usize>(),
        player_count
    );
    Ok(Deal { solution, hands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn deck() -> Deck {
        let mut cards = Vec::new();
        for name in ["Scarlet", "Mustard", "White", "Green", "Peacock", "Plum"] {
            cards.push(Card::person(name));
        }
        for name in ["Rope", "Pipe", "Knife", "Wrench", "Candlestick", "Revolver"] {
            cards.push(Card::weapon(name));
        }
        for name in [
            "Kitchen", "Ballroom", "Conservatory", "Billiard", "Library", "Study", "Hall",
            "Lounge", "Dining",
        ] {
            cards.push(Card::room(name));
        }
        Deck::new(cards)
    }

    #[test]
    fn test_solution_has_one_of_each_kind() {
        let mut rng = StdRng::seed_from_u64(7);
        let deal = deal_game(&deck(), 6, &mut rng).unwrap();
        assert_eq!(deal.solution.person.kind, CardKind::Person);
        assert_eq!(deal.solution.weapon.kind, CardKind::Weapon);
        assert_eq!(deal.solution.room.kind, CardKind::Room);
    }

    #[test]
    fn test_conservation_and_no_duplicates() {
        let d = deck();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let deal = deal_game(&d, 6, &mut rng).unwrap();
            assert_eq!(deal.dealt_count() + 3, d.len());

            let mut seen = HashSet::new();
            for card in deal.hands.iter().flatten() {
                assert!(seen.insert(card.clone()), "duplicate {card}");
                assert!(!deal.solution.contains(card));
            }
        }
    }

    #[test]
    fn test_hand_sizes_balanced() {
        let d = deck();
        for players in 1..=7 {
            let mut rng = StdRng::seed_from_u64(players as u64);
            let deal = deal_game(&d, players, &mut rng).unwrap();
            let min = deal.hands.iter().map(Vec::len).min().unwrap();
            let max = deal.hands.iter().map(Vec::len).max().unwrap();
            assert!(max - min <= 1, "{players} players: {min}..{max}");
        }
    }

    #[test]
    fn test_same_seed_same_deal() {
        let d = deck();
        let a = deal_game(&d, 4, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = deal_game(&d, 4, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a.solution, b.solution);
        assert_eq!(a.hands, b.hands);
    }

    #[test]
    fn test_missing_kind_and_no_players() {
        let d = Deck::new(vec![Card::person("Plum"), Card::room("Hall")]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            deal_game(&d, 2, &mut rng).unwrap_err(),
            DealError::MissingKind(CardKind::Weapon)
        );
        assert_eq!(
            deal_game(&deck(), 0, &mut rng).unwrap_err(),
            DealError::NoPlayers
        );
    }
}
