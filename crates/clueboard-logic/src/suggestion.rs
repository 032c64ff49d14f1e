//! Suggestion disproof and accusation checking.
//!
//! Disproof goes around the table starting with the seat after the
//! suggester, skipping the suggester, and stops at the first player who can
//! show a card. Eliminated players still show cards.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Solution};
use crate::player::Player;

/// Who refuted a suggestion, and with which card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disproof {
    pub player: usize,
    pub card: Card,
}

/// Ask each other player in turn order to disprove `suggestion`.
///
/// Returns `None` when nobody can, or when `suggester` is not a seat.
pub fn resolve_suggestion<R: Rng + ?Sized>(
    players: &[Player],
    suggester: usize,
    suggestion: &Solution,
    rng: &mut R,
) -> Option<Disproof> {
    let n = players.len();
    if suggester >= n {
        return None;
    }
    (1..n)
        .map(|offset| (suggester + offset) % n)
        .find_map(|seat| {
            players[seat]
                .disprove_suggestion(suggestion, &mut *rng)
                .map(|card| Disproof { player: seat, card })
        })
}

/// Card-only form of [`resolve_suggestion`].
pub fn handle_suggestion<R: Rng + ?Sized>(
    players: &[Player],
    suggester: usize,
    suggestion: &Solution,
    rng: &mut R,
) -> Option<Card> {
    resolve_suggestion(players, suggester, suggestion, rng).map(|d| d.card)
}

/// True iff person, weapon and room each match the hidden solution.
pub fn check_accusation(solution: &Solution, accusation: &Solution) -> bool {
    accusation.person == solution.person
        && accusation.weapon == solution.weapon
        && accusation.room == solution.room
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn vader() -> Card {
        Card::person("Darth Vader")
    }
    fn leia() -> Card {
        Card::person("Princess Leia")
    }
    fn lightsaber() -> Card {
        Card::weapon("Lightsaber")
    }
    fn detonator() -> Card {
        Card::weapon("Thermal Detonator")
    }
    fn cantina() -> Card {
        Card::room("Mos Eisley Cantina")
    }
    fn control_room() -> Card {
        Card::room("Death Star Control Room")
    }

    fn table() -> Vec<Player> {
        ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|n| Player::computer(*n, "grey", Position::new(0, 0)))
            .collect()
    }

    #[test]
    fn test_accusation_exact_match() {
        let answer = Solution::new(vader(), lightsaber(), cantina());
        assert!(check_accusation(&answer, &answer.clone()));
    }

    #[test]
    fn test_accusation_any_wrong_field_fails() {
        let answer = Solution::new(vader(), lightsaber(), cantina());
        assert!(!check_accusation(
            &answer,
            &Solution::new(leia(), lightsaber(), cantina())
        ));
        assert!(!check_accusation(
            &answer,
            &Solution::new(vader(), detonator(), cantina())
        ));
        assert!(!check_accusation(
            &answer,
            &Solution::new(vader(), lightsaber(), control_room())
        ));
    }

    #[test]
    fn test_accusation_same_names_wrong_kind_fails() {
        let answer = Solution::new(vader(), lightsaber(), cantina());
        let odd = Solution::new(vader(), Card::room("Lightsaber"), cantina());
        assert!(!check_accusation(&answer, &odd));
    }

    #[test]
    fn test_nobody_can_disprove() {
        let players = table();
        let mut rng = StdRng::seed_from_u64(1);
        let s = Solution::new(vader(), detonator(), cantina());
        assert_eq!(handle_suggestion(&players, 0, &s, &mut rng), None);
    }

    #[test]
    fn test_suggester_is_never_asked() {
        let mut players = table();
        players[0].add_card(vader());
        let mut rng = StdRng::seed_from_u64(1);
        let s = Solution::new(vader(), detonator(), cantina());
        assert_eq!(handle_suggestion(&players, 0, &s, &mut rng), None);
    }

    #[test]
    fn test_only_d_holds_a_match() {
        let mut players = table();
        players[0].add_card(cantina());
        players[3].add_card(detonator());
        let s = Solution::new(vader(), detonator(), cantina());
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let d = resolve_suggestion(&players, 0, &s, &mut rng).unwrap();
            assert_eq!(d.player, 3);
            assert_eq!(d.card, detonator());
        }
    }

    #[test]
    fn test_first_in_order_wins() {
        let mut players = table();
        players[1].add_card(vader());
        players[2].add_card(detonator());
        let mut rng = StdRng::seed_from_u64(1);
        let s = Solution::new(vader(), detonator(), cantina());
        assert_eq!(handle_suggestion(&players, 0, &s, &mut rng), Some(vader()));
    }

    #[test]
    fn test_order_wraps_around() {
        let mut players = table();
        players[1].add_card(vader());
        players[5].add_card(detonator());
        let mut rng = StdRng::seed_from_u64(1);
        let s = Solution::new(vader(), detonator(), cantina());
        // suggester E (4): F is asked before B
        let d = resolve_suggestion(&players, 4, &s, &mut rng).unwrap();
        assert_eq!(d.player, 5);
    }

    #[test]
    fn test_eliminated_players_still_disprove() {
        let mut players = table();
        players[2].add_card(cantina());
        players[2].eliminate();
        let mut rng = StdRng::seed_from_u64(1);
        let s = Solution::new(vader(), detonator(), cantina());
        assert_eq!(handle_suggestion(&players, 0, &s, &mut rng), Some(cantina()));
    }

    #[test]
    fn test_bad_suggester_seat() {
        let players = table();
        let mut rng = StdRng::seed_from_u64(1);
        let s = Solution::new(vader(), detonator(), cantina());
        assert_eq!(handle_suggestion(&players, 17, &s, &mut rng), None);
    }
}
