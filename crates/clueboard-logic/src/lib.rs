//! Pure game logic for Clueboard.
//!
//! This crate contains the board, movement and deduction rules of the game,
//! independent of any window, dialog or file format beyond the two plain-text
//! tables it parses. Functions take plain data and return results, so the
//! same logic drives a desktop UI, the headless self-play harness and the
//! tests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`adjacency`] | One-step neighbors: corridors, doors, room centers, secret passages |
//! | [`board`] | Cell grid, room table, occupancy |
//! | [`cards`] | Card kinds, cards, the three-card solution, the deck |
//! | [`config`] | Setup/layout table loading and runtime configuration |
//! | [`constants`] | Reserved symbols, token markers, default die size |
//! | [`deal`] | Hidden solution selection and round-robin dealing |
//! | [`player`] | Players, hands, seen cards, disproving a suggestion |
//! | [`session`] | A running game: turns, moves, suggestions, accusations |
//! | [`strategy`] | Target selection per seat and computer suggestion policy |
//! | [`suggestion`] | Round-robin suggestion disproof, accusation checks |
//! | [`targets`] | Exact-roll reachability search |

pub mod adjacency;
pub mod board;
pub mod cards;
pub mod config;
pub mod constants;
pub mod deal;
pub mod player;
pub mod session;
pub mod strategy;
pub mod suggestion;
pub mod targets;
