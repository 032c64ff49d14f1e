//! Clueboard Headless Self-Play Harness
//!
//! Validates board data, movement rules and the deduction protocol, then
//! plays seeded computer-only games to completion. Runs entirely
//! in-process: no window, no dialogs.
//!
//! Usage:
//!   cargo run -p clueboard-simtest
//!   cargo run -p clueboard-simtest -- --games 20 --seed 7 --verbose
//!   RUST_LOG=debug cargo run -p clueboard-simtest -- --games 1

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Parser;
use clueboard_logic::adjacency::adjacent;
use clueboard_logic::board::{Board, Position};
use clueboard_logic::cards::{CardKind, Solution};
use clueboard_logic::config::{load_game, load_game_files, ConfigError, GameConfig, GameSetup};
use clueboard_logic::deal::deal_game;
use clueboard_logic::player::{Player, PlayerKind};
use clueboard_logic::session::{AccusationOutcome, GameSession};
use clueboard_logic::suggestion::resolve_suggestion;
use clueboard_logic::targets::calc_targets;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

// ── Bundled tables (same files the desktop game ships) ──────────────────
const SETUP_TXT: &str = include_str!("../../../data/ClueSetup.txt");
const LAYOUT_CSV: &str = include_str!("../../../data/ClueLayout.csv");

/// Turn cap per self-play game; a game still running after this many turns
/// counts as a failure.
const MAX_TURNS: u64 = 20_000;

#[derive(Parser, Debug)]
#[command(name = "clueboard-simtest")]
#[command(about = "Headless validation and self-play for Clueboard", long_about = None)]
struct Args {
    /// Base seed; game N uses seed + N. Overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of self-play games.
    #[arg(long, default_value_t = 10)]
    games: u32,

    /// Layout table (CSV). Defaults to the bundled board.
    #[arg(long, requires = "setup")]
    layout: Option<PathBuf>,

    /// Setup table. Defaults to the bundled setup.
    #[arg(long, requires = "layout")]
    setup: Option<PathBuf>,

    /// JSON game config (`seed`, `die_sides`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every check, not just failures.
    #[arg(short, long)]
    verbose: bool,

    /// Print the full report as JSON instead of the summary.
    #[arg(long)]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GameSummary {
    seed: u64,
    turns: u64,
    winner: Option<String>,
    solution: Solution,
    suggestions: u32,
    unrefuted: u32,
}

#[derive(Debug, Serialize)]
struct Report {
    config: GameConfig,
    results: Vec<TestResult>,
    games: Vec<GameSummary>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.json {
        println!("=== Clueboard Simulation Harness ===\n");
    }

    let mut config = match &args.config {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|text| GameConfig::from_json(&text))
        {
            Ok(c) => c,
            Err(e) => fail_early("config_load", format!("{}: {}", path.display(), e)),
        },
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let base_seed = config.seed.unwrap_or(1);

    let loaded = match (&args.setup, &args.layout) {
        (Some(setup), Some(layout)) => load_game_files(setup, layout),
        _ => load_game(SETUP_TXT, LAYOUT_CSV),
    };
    let (board, setup) = match loaded {
        Ok(game) => game,
        Err(e) => fail_early("tables_load", e.to_string()),
    };

    let header = |name: &str| {
        if !args.json {
            println!("--- {} ---", name);
        }
    };
    let mut results = Vec::new();

    // 1. Board data
    header("Tables");
    results.extend(validate_tables(&board, &setup, args.verbose && !args.json));

    // 2. Adjacency graph shape
    header("Adjacency");
    results.extend(validate_adjacency(&board));

    // 3. Target search sweep
    header("Targets");
    results.extend(validate_targets(&board));

    // 4. Dealing
    header("Dealing");
    results.extend(validate_dealing(&setup, base_seed));

    // 5. Suggestion protocol
    header("Suggestions");
    results.extend(validate_suggestions(&setup, base_seed));

    // 6. Self-play
    header("Self-play");
    let (game_results, games) = run_self_play(&board, &setup, &config, base_seed, args.games);
    results.extend(game_results);

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if args.json {
        let report = Report {
            config,
            results,
            games,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to encode report: {}", e),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || args.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed, total, failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn fail_early(name: &str, detail: String) -> ! {
    println!("  ✗ {}: {}", name, detail);
    println!("\n=== RESULT: 0/1 passed, 1 failed ===");
    std::process::exit(1);
}

fn walkable(board: &Board) -> Vec<Position> {
    board
        .cells()
        .filter(|c| c.is_walkway() || c.is_room_center())
        .map(|c| c.position())
        .collect()
}

// ── 1. Tables ───────────────────────────────────────────────────────────

fn validate_tables(board: &Board, setup: &GameSetup, verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();

    results.push(TestResult::new(
        "board_not_empty",
        board.num_rows() > 0 && board.num_columns() > 0,
        format!("{}x{} board", board.num_rows(), board.num_columns()),
    ));

    let rooms: Vec<_> = board.card_rooms().collect();
    if verbose {
        for room in &rooms {
            if let Some(center) = room.center() {
                println!("    {} '{}' center {}", room.name(), room.symbol(), center);
            }
        }
    }
    let card_rooms = setup.deck.of_kind(CardKind::Room).count();
    results.push(TestResult::new(
        "one_card_per_room",
        rooms.len() == card_rooms,
        format!("{} rooms, {} room cards", rooms.len(), card_rooms),
    ));

    // Every doorway must lead into a room that has a center
    let dead_doors: Vec<Position> = board
        .cells()
        .filter(|c| c.is_doorway() && c.is_walkway())
        .filter(|c| {
            board
                .step(c.position(), c.door_direction())
                .and_then(|p| board.room_of(p))
                .and_then(|r| r.center())
                .is_none()
        })
        .map(|c| c.position())
        .collect();
    results.push(TestResult::new(
        "doors_lead_to_rooms",
        dead_doors.is_empty(),
        if dead_doors.is_empty() {
            "every doorway faces a room with a center".to_string()
        } else {
            format!("doorways facing nowhere: {:?}", dead_doors)
        },
    ));

    // Every card room must be enterable
    let sealed: Vec<&str> = rooms
        .iter()
        .filter(|r| {
            r.center()
                .map_or(true, |c| adjacent(board, c.row, c.col).is_empty())
        })
        .map(|r| r.name())
        .collect();
    results.push(TestResult::new(
        "rooms_have_exits",
        sealed.is_empty(),
        if sealed.is_empty() {
            "every room has a door or passage".to_string()
        } else {
            format!("sealed rooms: {}", sealed.join(", "))
        },
    ));

    let starts: BTreeSet<Position> = setup.players.iter().map(Player::position).collect();
    results.push(TestResult::new(
        "distinct_start_cells",
        starts.len() == setup.players.len(),
        format!("{} players, {} start cells", setup.players.len(), starts.len()),
    ));

    for kind in CardKind::ALL {
        let count = setup.deck.of_kind(kind).count();
        results.push(TestResult::new(
            &format!("deck_has_{}", kind.to_string().to_lowercase()),
            count > 0,
            format!("{} {} cards", count, kind),
        ));
    }

    results
}

// ── 2. Adjacency ────────────────────────────────────────────────────────

fn validate_adjacency(board: &Board) -> Vec<TestResult> {
    let mut results = Vec::new();

    // Corridor-to-corridor edges are symmetric
    let mut asymmetric = Vec::new();
    for cell in board.cells().filter(|c| c.is_walkway()) {
        let from = cell.position();
        for to in adjacent(board, from.row, from.col) {
            let back = board.cell_at(to).is_some_and(|c| c.is_walkway());
            if back && !adjacent(board, to.row, to.col).contains(&from) {
                asymmetric.push((from, to));
            }
        }
    }
    results.push(TestResult::new(
        "corridor_edges_symmetric",
        asymmetric.is_empty(),
        format!("{} asymmetric corridor edges", asymmetric.len()),
    ));

    // Neighbors are always walkable cells
    let bad: usize = board
        .cells()
        .map(|c| {
            adjacent(board, c.row(), c.col())
                .into_iter()
                .filter(|p| {
                    board
                        .cell_at(*p)
                        .map_or(true, |n| !(n.is_walkway() || n.is_room_center()))
                })
                .count()
        })
        .sum();
    results.push(TestResult::new(
        "neighbors_walkable",
        bad == 0,
        format!("{} edges into interiors or unused cells", bad),
    ));

    // Interiors are dead ends
    let leaking = board
        .cells()
        .filter(|c| c.is_room() && !c.is_room_center())
        .filter(|c| !adjacent(board, c.row(), c.col()).is_empty())
        .count();
    results.push(TestResult::new(
        "interiors_isolated",
        leaking == 0,
        format!("{} room interior cells with neighbors", leaking),
    ));

    results
}

// ── 3. Targets ──────────────────────────────────────────────────────────

fn validate_targets(board: &Board) -> Vec<TestResult> {
    let mut results = Vec::new();
    let starts = walkable(board);

    let mut violations = Vec::new();
    let mut total = 0usize;
    for &start in &starts {
        for steps in 1..=6 {
            let targets = calc_targets(board, start, steps);
            total += targets.len();
            if targets.contains(&start) {
                violations.push(format!("{} roll {} includes start", start, steps));
            }
            for t in &targets {
                let ok = board
                    .cell_at(*t)
                    .is_some_and(|c| c.is_walkway() || c.is_room_center());
                if !ok {
                    violations.push(format!("{} roll {} reaches {}", start, steps, t));
                }
            }
        }
    }
    results.push(TestResult::new(
        "targets_walkable_and_exclude_start",
        violations.is_empty(),
        if violations.is_empty() {
            format!("{} starts x 6 rolls, {} targets total", starts.len(), total)
        } else {
            violations.join("; ")
        },
    ));

    // Single-step targets are exactly the unblocked neighbors
    let mismatched = starts
        .iter()
        .filter(|s| calc_targets(board, **s, 1) != adjacent(board, s.row, s.col))
        .count();
    results.push(TestResult::new(
        "roll_one_equals_adjacency",
        mismatched == 0,
        format!("{} starts disagree", mismatched),
    ));

    let zero = starts
        .iter()
        .filter(|s| !calc_targets(board, **s, 0).is_empty())
        .count();
    results.push(TestResult::new(
        "zero_roll_empty",
        zero == 0,
        format!("{} non-empty zero-roll results", zero),
    ));

    // Blocking a corridor cell removes it from every result
    let mut blocked = board.clone();
    let mut leaked = 0;
    if let Some(&victim) = starts
        .iter()
        .find(|p| blocked.cell_at(**p).is_some_and(|c| c.is_walkway()))
    {
        blocked.set_occupied(victim, true);
        for &start in starts.iter().filter(|s| **s != victim) {
            for steps in 1..=6 {
                if calc_targets(&blocked, start, steps).contains(&victim) {
                    leaked += 1;
                }
            }
        }
    }
    results.push(TestResult::new(
        "occupied_corridor_blocked",
        leaked == 0,
        format!("{} results include an occupied corridor cell", leaked),
    ));

    results
}

// ── 4. Dealing ──────────────────────────────────────────────────────────

fn validate_dealing(setup: &GameSetup, base_seed: u64) -> Vec<TestResult> {
    let mut results = Vec::new();
    let deck_size = setup.deck.len();

    let mut bad = Vec::new();
    for players in 1..=setup.players.len().max(1) {
        for offset in 0..20 {
            let seed = base_seed.wrapping_add(offset);
            let mut rng = StdRng::seed_from_u64(seed);
            let deal = match deal_game(&setup.deck, players, &mut rng) {
                Ok(d) => d,
                Err(e) => {
                    bad.push(format!("{} players seed {}: {}", players, seed, e));
                    continue;
                }
            };
            let mut all: BTreeSet<_> = deal.hands.iter().flatten().cloned().collect();
            let dealt = deal.dealt_count();
            all.extend(deal.solution.cards().into_iter().cloned());
            let min = deal.hands.iter().map(Vec::len).min().unwrap_or(0);
            let max = deal.hands.iter().map(Vec::len).max().unwrap_or(0);
            if all.len() != deck_size || dealt + 3 != deck_size || max - min > 1 {
                bad.push(format!(
                    "{} players seed {}: {} distinct, {} dealt, hands {}..{}",
                    players, seed, all.len(), dealt, min, max
                ));
            }
        }
    }
    results.push(TestResult::new(
        "deal_conserves_cards",
        bad.is_empty(),
        if bad.is_empty() {
            format!("{} cards, 1..={} players", deck_size, setup.players.len())
        } else {
            bad.join("; ")
        },
    ));

    results
}

// ── 5. Suggestions ──────────────────────────────────────────────────────

fn validate_suggestions(setup: &GameSetup, base_seed: u64) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(base_seed);

    let mut players = setup.players.clone();
    let Ok(deal) = deal_game(&setup.deck, players.len(), &mut rng) else {
        results.push(TestResult::new("suggestion_setup", false, "deal failed"));
        return results;
    };
    for (player, hand) in players.iter_mut().zip(deal.hands) {
        player.clear_hand();
        for card in hand {
            player.add_card(card);
        }
    }

    let people: Vec<_> = setup.deck.of_kind(CardKind::Person).collect();
    let weapons: Vec<_> = setup.deck.of_kind(CardKind::Weapon).collect();
    let rooms: Vec<_> = setup.deck.of_kind(CardKind::Room).collect();

    let mut wrong = 0;
    let mut unrefuted = 0;
    let n = players.len();
    for round in 0..500 {
        let suggester = round % n;
        let (Some(p), Some(w), Some(r)) = (
            people.choose(&mut rng),
            weapons.choose(&mut rng),
            rooms.choose(&mut rng),
        ) else {
            break;
        };
        let suggestion = Solution::new((*p).clone(), (*w).clone(), (*r).clone());

        // First seat after the suggester holding a match, by brute force
        let expected = (1..n)
            .map(|k| (suggester + k) % n)
            .find(|&seat| players[seat].hand().iter().any(|c| suggestion.contains(c)));

        let got = resolve_suggestion(&players, suggester, &suggestion, &mut rng);
        match (&got, expected) {
            (Some(d), Some(seat))
                if d.player == seat && players[seat].hand().contains(&d.card) => {}
            (None, None) => unrefuted += 1,
            _ => wrong += 1,
        }
    }
    results.push(TestResult::new(
        "disproof_order",
        wrong == 0,
        format!("500 suggestions, {} unrefuted, {} wrong", unrefuted, wrong),
    ));

    results
}

// ── 6. Self-play ────────────────────────────────────────────────────────

fn run_self_play(
    board: &Board,
    setup: &GameSetup,
    config: &GameConfig,
    base_seed: u64,
    games: u32,
) -> (Vec<TestResult>, Vec<GameSummary>) {
    let mut results = Vec::new();
    let mut summaries = Vec::new();

    for game in 0..games {
        let seed = base_seed.wrapping_add(u64::from(game));
        let mut setup = setup.clone();
        for player in &mut setup.players {
            player.kind = PlayerKind::Computer;
        }
        let game_config = GameConfig {
            seed: Some(seed),
            ..config.clone()
        };
        let mut session = match GameSession::new(board.clone(), setup, &game_config) {
            Ok(s) => s,
            Err(e) => {
                results.push(TestResult::new(&format!("game_{}", seed), false, e.to_string()));
                continue;
            }
        };

        let mut suggestions = 0;
        let mut unrefuted = 0;
        let mut wrong_accusations = 0;
        let mut error = None;
        while !session.is_over() && session.turns() < MAX_TURNS {
            match session.play_turn() {
                Ok(report) => {
                    if report.suggestion.is_some() {
                        suggestions += 1;
                        if report.disproof.is_none() {
                            unrefuted += 1;
                        }
                    }
                    if let Some(AccusationOutcome::Incorrect { .. }) = report.outcome {
                        wrong_accusations += 1;
                    }
                }
                Err(e) => {
                    error = Some(e.to_string());
                    break;
                }
            }
        }

        let winner = session.winner().map(|p| p.name.clone());
        let passed = error.is_none() && winner.is_some() && wrong_accusations == 0;
        let detail = match (&error, &winner) {
            (Some(e), _) => format!("error after {} turns: {}", session.turns(), e),
            (None, Some(name)) => format!(
                "{} wins in {} turns ({} suggestions, {} wrong accusations)",
                name,
                session.turns(),
                suggestions,
                wrong_accusations
            ),
            (None, None) => format!("no winner after {} turns", session.turns()),
        };
        log::info!("game {}: {}", seed, detail);
        results.push(TestResult::new(&format!("game_{}", seed), passed, detail));
        summaries.push(GameSummary {
            seed,
            turns: session.turns(),
            winner,
            solution: session.solution().clone(),
            suggestions,
            unrefuted,
        });
    }

    if !summaries.is_empty() {
        let mean = summaries.iter().map(|g| g.turns).sum::<u64>() / summaries.len() as u64;
        results.push(TestResult::new(
            "self_play_mean_turns",
            true,
            format!("{} turns per game", mean),
        ));
    }

    (results, summaries)
}
