//! Integration tests for whole games on the bundled board.

use clueboard_logic::board::Position;
use clueboard_logic::cards::CardKind;
use clueboard_logic::config::{load_game, GameConfig};
use clueboard_logic::player::PlayerKind;
use clueboard_logic::session::{AccusationOutcome, GameSession, SessionError};

const SETUP: &str = include_str!("../../../data/ClueSetup.txt");
const LAYOUT: &str = include_str!("../../../data/ClueLayout.csv");

fn computers_only(seed: u64) -> GameSession {
    let (board, mut setup) = load_game(SETUP, LAYOUT).unwrap();
    for player in &mut setup.players {
        player.kind = PlayerKind::Computer;
    }
    GameSession::new(board, setup, &GameConfig::seeded(seed)).unwrap()
}

#[test]
fn session_from_bundled_tables() {
    let s = GameSession::from_tables(SETUP, LAYOUT, &GameConfig::seeded(1)).unwrap();
    assert_eq!(s.players().len(), 6);
    assert!(s.players().iter().all(|p| p.hand().len() == 3));
    assert_eq!(s.people_names().len(), 6);
    assert_eq!(s.weapon_names().len(), 6);
    assert_eq!(s.room_names().len(), 9);
    for player in s.players() {
        assert!(s.board().cell_at(player.position()).unwrap().is_occupied());
    }
}

#[test]
fn human_turn_from_start() {
    let config = GameConfig {
        seed: Some(7),
        die_sides: 2,
    };
    let mut s = GameSession::from_tables(SETUP, LAYOUT, &config).unwrap();
    let turn = s.start_turn().unwrap();
    assert_eq!(turn.seat, 0);
    assert_eq!(s.current_player().unwrap().name, "Luke Skywalker");
    match turn.roll {
        1 => assert_eq!(turn.targets.len(), 1),
        2 => assert!(turn.targets.contains(&Position::new(7, 2))),
        other => panic!("roll {other} on a two-sided die"),
    }
    let first = *turn.targets.iter().next().unwrap();
    s.move_current_player_to(first).unwrap();
    assert_eq!(s.players()[0].position(), first);
    assert!(!s.board().cell(4, 0).unwrap().is_occupied());
}

#[test]
fn wrong_accusation_from_bundled_game() {
    let mut s = GameSession::from_tables(SETUP, LAYOUT, &GameConfig::seeded(3)).unwrap();
    let mut wrong = s.solution().clone();
    wrong.weapon = s
        .deck()
        .of_kind(CardKind::Weapon)
        .find(|c| **c != s.solution().weapon)
        .cloned()
        .unwrap();
    s.start_turn().unwrap();
    assert_eq!(
        s.accuse(0, &wrong).unwrap(),
        AccusationOutcome::Incorrect { game_over: false }
    );
    assert_eq!(s.start_turn().unwrap().seat, 1);
    assert!(matches!(s.accuse(0, &wrong), Err(SessionError::Eliminated(0))));
}

#[test]
fn seeded_self_play_finishes_correctly() {
    for seed in [1, 2, 3] {
        let mut s = computers_only(seed);
        while !s.is_over() && s.turns() < 20_000 {
            s.play_turn().unwrap();
        }
        assert!(s.is_over(), "seed {seed} still running");
        let winner = s.winner_seat().expect("winner");
        assert!(!s.players()[winner].is_eliminated());
        // the winner never held a card of the answer
        for card in s.solution().cards() {
            assert!(!s.players()[winner].hand().contains(card));
        }
    }
}

#[test]
fn same_seed_replays_the_same_game() {
    let mut a = computers_only(11);
    let mut b = computers_only(11);
    for _ in 0..60 {
        if a.is_over() {
            break;
        }
        assert_eq!(a.play_turn().unwrap(), b.play_turn().unwrap());
    }
    assert_eq!(a.solution(), b.solution());
}
