//! Planet 2500 Headless Simulation Harness
//!
//! Plays seeded games through the turn engine with a scripted policy and
//! validates the rules, the engine invariants and persistence. Runs entirely
//! in-process: no UI, no storage.
//!
//! Usage:
//!   cargo run -p planet-simtest
//!   cargo run -p planet-simtest -- --games 20 --verbose

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use planet_core::persistence;
use planet_core::prelude::*;
use planet_logic::decisions::{self, DECISIONS};
use planet_logic::energy;
use planet_logic::events::{self, EVENTS};
use planet_logic::state::{Capacity, EnergySource, GameLog, LogEntry};
use planet_logic::victory::{self, DefeatKind};

const DEFAULT_CONFIG: &str = include_str!("../../../data/default_config.toml");

#[derive(Parser, Debug)]
#[command(name = "planet-simtest")]
#[command(about = "Play seeded Planet 2500 games and validate the turn engine")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 20)]
    games: u32,

    /// Seed of the first game; game i uses seed + i
    #[arg(long, default_value_t = 2500)]
    seed: u64,

    /// Turn limit per game
    #[arg(long, default_value_t = 60)]
    turns: u32,

    /// Engine config (TOML). Defaults to data/default_config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every check, not only failures
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    println!("=== Planet 2500 Simulation Harness ===\n");

    let config = match &args.config {
        Some(path) => GameConfig::load(path),
        None => GameConfig::from_toml_str(DEFAULT_CONFIG),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("config error: {}", e);
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();

    // 1. Event and decision catalogs
    results.extend(validate_catalogs());

    // 2. Rule properties over a parameter sweep
    results.extend(validate_rules());

    // 3. Fixed scenarios with known numbers
    results.extend(validate_scenarios());

    // 4. Seeded games with a scripted policy
    results.extend(validate_games(&args, &config));

    // 5. Same seed, same game
    results.extend(validate_determinism(&args, &config));

    // 6. Save/load round-trips
    results.extend(validate_persistence(&config));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

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

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Catalogs ─────────────────────────────────────────────────────────

fn validate_catalogs() -> Vec<TestResult> {
    println!("--- Catalogs ---");
    let mut results = Vec::new();

    let mut event_ids: Vec<&str> = EVENTS.iter().map(|e| e.id).collect();
    event_ids.sort_unstable();
    event_ids.dedup();
    results.push(TestResult {
        name: "events_unique_ids".into(),
        passed: event_ids.len() == EVENTS.len() && EVENTS.len() == 15,
        detail: format!("{} events, {} unique ids", EVENTS.len(), event_ids.len()),
    });

    let bad_windows: Vec<&str> = EVENTS
        .iter()
        .filter(|e| e.weight <= 0.0 || e.min_turn > e.max_turn)
        .map(|e| e.id)
        .collect();
    results.push(TestResult {
        name: "events_weights_and_windows".into(),
        passed: bad_windows.is_empty(),
        detail: format!("invalid: {:?}", bad_windows),
    });

    let lookups_ok = EVENTS
        .iter()
        .all(|e| events::event_by_id(e.id).map(|found| found.id) == Some(e.id));
    results.push(TestResult {
        name: "events_lookup_by_id".into(),
        passed: lookups_ok && events::event_by_id("meteor_strike").is_none(),
        detail: "every id resolves, unknown ids do not".into(),
    });

    let mut decision_ids: Vec<&str> = DECISIONS.iter().map(|d| d.id).collect();
    decision_ids.sort_unstable();
    decision_ids.dedup();
    results.push(TestResult {
        name: "decisions_unique_ids".into(),
        passed: decision_ids.len() == DECISIONS.len() && DECISIONS.len() == 5,
        detail: format!("{} decisions", DECISIONS.len()),
    });

    let cooldowns_ok = DECISIONS.iter().all(|d| d.cooldown > 0);
    results.push(TestResult {
        name: "decisions_have_cooldowns".into(),
        passed: cooldowns_ok
            && DECISIONS
                .iter()
                .all(|d| decisions::decision_by_id(d.id).is_some()),
        detail: "every decision restarts a positive cooldown".into(),
    });

    results
}

// ── 2. Rules ────────────────────────────────────────────────────────────

fn validate_rules() -> Vec<TestResult> {
    println!("--- Rules ---");
    let mut results = Vec::new();

    // Efficiency stays in [0, 1] over the whole environment domain
    let mut worst = (f64::MAX, f64::MIN);
    for p in 0..=20 {
        for t in 15..=50 {
            let mut state = GameState::new();
            state.pollution = p as f64 * 5.0;
            state.temperature = t as f64;
            for source in EnergySource::ALL {
                let eff = energy::effective_efficiency(source, &state);
                worst = (worst.0.min(eff), worst.1.max(eff));
            }
        }
    }
    results.push(TestResult {
        name: "efficiency_unit_range".into(),
        passed: worst.0 >= 0.0 && worst.1 <= 1.0,
        detail: format!("min {:.3}, max {:.3}", worst.0, worst.1),
    });

    results.push(TestResult {
        name: "renewable_ratio_zero_capacity".into(),
        passed: energy::renewable_ratio(&Capacity::default()) == 0.0,
        detail: "no capacity means ratio 0".into(),
    });

    let mut storage = 100;
    let mut monotone = true;
    for _ in 0..300 {
        let next = energy::update_storage(storage, 0, 0, 100);
        monotone &= next <= storage;
        storage = next;
    }
    results.push(TestResult {
        name: "storage_idle_decay".into(),
        passed: monotone && storage == 0,
        detail: format!("after 300 idle turns: {} MW", storage),
    });

    let mut doomed = GameState::new();
    doomed.credits = 0;
    doomed.pollution = 100.0;
    doomed.temperature = 50.0;
    let verdict = victory::evaluate(&doomed);
    results.push(TestResult {
        name: "defeat_priority".into(),
        passed: verdict
            == Some(GameResult::Defeat {
                kind: DefeatKind::Bankruptcy,
            }),
        detail: format!("{:?}", verdict),
    });

    results
}

// ── 3. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios() -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    let mut engine = GameEngine::new(GameConfig::deterministic());
    let applied = engine.apply_named_action("expandSolar", 1).is_ok();
    let after_action = engine.state();
    let turn = engine.end_turn();
    let state = engine.state();

    results.push(TestResult {
        name: "scenario_solar_action".into(),
        passed: applied
            && after_action.credits == 800
            && after_action.energy.capacity.solar == 10,
        detail: format!(
            "credits {}, solar {} MW",
            after_action.credits, after_action.energy.capacity.solar
        ),
    });
    results.push(TestResult {
        name: "scenario_solar_end_turn".into(),
        passed: matches!(turn, Ok(TurnOutcome::Continue))
            && state.turn == 2
            && state.energy.production == 52
            && state.pollution == 91.0
            && state.credits == 2235,
        detail: format!(
            "production {}, pollution {}, temperature {}, credits {}",
            state.energy.production, state.pollution, state.temperature, state.credits
        ),
    });

    let mut engine = GameEngine::new(GameConfig::deterministic());
    let mut ended_on = None;
    for _ in 0..5 {
        if let Ok(TurnOutcome::GameOver(result)) = engine.end_turn() {
            ended_on = Some((engine.state().turn, result));
            break;
        }
    }
    results.push(TestResult {
        name: "scenario_idle_ecological_disaster".into(),
        passed: matches!(
            ended_on,
            Some((
                3,
                GameResult::Defeat {
                    kind: DefeatKind::EcologicalDisaster
                }
            ))
        ),
        detail: format!("{:?}", ended_on),
    });

    results
}

// ── 4. Seeded games ─────────────────────────────────────────────────────

/// Actions the policy may take before ending a turn.
const MAX_ACTIONS_PER_TURN: usize = 16;

/// Scripted player: build wind until it alone covers demand, retire fossil
/// as soon as it does, and keep a cleanup program running while the air is
/// dirty. Called repeatedly within a turn until it returns `None`.
fn choose_action(state: &GameState) -> Option<Action> {
    let demand = energy::effective_consumption(state.energy.consumption_base, false);
    let fossil =
        energy::source_production(EnergySource::Fossil, state.energy.capacity.fossil, state);
    let renewable = energy::total_production(&state.energy.capacity, state) - fossil;
    let cleanup_idle = state.cleanup_turns == 0 && state.credits >= 150;

    if state.pollution > 60.0 && cleanup_idle {
        return Some(Action::new(ActionKind::EnvironmentalProgram));
    }
    if renewable < demand + 5 && state.credits >= 300 {
        return Some(Action::with_batches(ActionKind::ExpandWind, 2));
    }
    if state.energy.capacity.fossil > 0 && renewable >= demand {
        return Some(Action::new(ActionKind::ReduceFossil));
    }
    if state.pollution > 20.0 && cleanup_idle {
        return Some(Action::new(ActionKind::EnvironmentalProgram));
    }
    if state.average_popularity() < 45.0 && state.credits >= 250 {
        return Some(Action::new(ActionKind::PublicCampaign));
    }
    None
}

fn choose_answer(state: &GameState) -> Choice {
    if state.credits > 400 {
        Choice::Accept
    } else {
        Choice::Reject
    }
}

struct GameSummary {
    seed: u64,
    turns: u32,
    result: Option<GameResult>,
    decisions: u32,
    events: u32,
    violations: Vec<String>,
    final_state: GameState,
}

fn play_game(seed: u64, turns: u32, config: &GameConfig) -> GameSummary {
    let mut engine = GameEngine::new(GameConfig {
        seed,
        ..config.clone()
    });
    let mut violations = Vec::new();
    let mut decisions = 0;
    let mut events = 0;

    for _ in 0..turns {
        for _ in 0..MAX_ACTIONS_PER_TURN {
            let Some(action) = choose_action(engine.state_ref()) else {
                break;
            };
            if let Err(e) = engine.apply_action(action) {
                tracing::debug!(seed, "policy action rejected: {}", e);
                break;
            }
        }

        let outcome = engine.end_turn();
        if engine.last_report().and_then(|r| r.event.as_ref()).is_some() {
            events += 1;
        }
        match outcome {
            Ok(TurnOutcome::DecisionRequired(decision)) => {
                decisions += 1;
                let choice = choose_answer(engine.state_ref());
                engine.resolve_decision(choice);
                let cooldown = engine.state_ref().cooldowns.decision;
                if cooldown != decision.cooldown {
                    violations.push(format!(
                        "turn {}: cooldown {} after {}, expected {}",
                        engine.state_ref().turn,
                        cooldown,
                        decision.id,
                        decision.cooldown
                    ));
                }
            }
            Ok(TurnOutcome::Continue) | Ok(TurnOutcome::GameOver(_)) => {}
            Err(e) => {
                violations.push(format!("end_turn failed: {}", e));
                break;
            }
        }

        if let Err(e) = engine.state_ref().validate() {
            violations.push(format!("turn {}: {}", engine.state_ref().turn, e));
        }
        if engine.state_ref().logs.len() > 50 {
            violations.push("log exceeded 50 entries".into());
        }
        if !engine.is_running() {
            break;
        }
    }

    GameSummary {
        seed,
        turns: engine.state_ref().turn,
        result: engine.result(),
        decisions,
        events,
        violations,
        final_state: engine.state(),
    }
}

fn validate_games(args: &Args, config: &GameConfig) -> Vec<TestResult> {
    println!("--- Seeded Games ---");
    let mut results = Vec::new();
    let mut outcomes: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut longest = 0;
    let mut outlived_pollution = false;

    for i in 0..args.games {
        let game = play_game(args.seed + u64::from(i), args.turns, config);
        let label = game.result.map(|r| r.id()).unwrap_or("running");
        *outcomes.entry(label).or_insert(0) += 1;
        longest = longest.max(game.turns);
        if !matches!(
            game.result,
            Some(GameResult::Defeat {
                kind: DefeatKind::EcologicalDisaster
            })
        ) {
            outlived_pollution = true;
        }

        tracing::info!(
            seed = game.seed,
            turns = game.turns,
            decisions = game.decisions,
            events = game.events,
            outcome = label,
            "game finished"
        );

        results.push(TestResult {
            name: format!("game_{}_invariants", game.seed),
            passed: game.violations.is_empty(),
            detail: if game.violations.is_empty() {
                format!(
                    "{} after {} turns, credits {}, pollution {:.1}",
                    label, game.turns, game.final_state.credits, game.final_state.pollution
                )
            } else {
                game.violations.join("; ")
            },
        });

        if let Some(result) = game.result {
            let report = victory::final_report(&game.final_state, &result);
            results.push(TestResult {
                name: format!("game_{}_final_report", game.seed),
                passed: report.turns_survived == game.turns
                    && report.victory == result.is_victory(),
                detail: report.closing_message(&result),
            });
        }
    }

    let summary: Vec<String> = outcomes
        .iter()
        .map(|(outcome, count)| format!("{}={}", outcome, count))
        .collect();
    println!("  Outcomes: {}", summary.join(", "));

    // At least one game has to outlast the opening pollution spike
    results.push(TestResult {
        name: "policy_survives".into(),
        passed: args.games == 0 || longest >= 20 || outlived_pollution,
        detail: format!(
            "longest game {} turns, outcomes: {}",
            longest,
            summary.join(", ")
        ),
    });

    results
}

// ── 5. Determinism ──────────────────────────────────────────────────────

/// State as JSON with log timestamps zeroed, for comparing replays.
fn fingerprint(state: &GameState) -> String {
    let mut state = state.clone();
    let mut logs = GameLog::new();
    for entry in state.logs.iter() {
        logs.push_entry(LogEntry {
            timestamp: 0,
            ..entry.clone()
        });
    }
    state.logs = logs;
    serde_json::to_string(&state).unwrap_or_default()
}

fn validate_determinism(args: &Args, config: &GameConfig) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    for i in 0..args.games.min(5) {
        let seed = args.seed + u64::from(i);
        let a = play_game(seed, args.turns, config);
        let b = play_game(seed, args.turns, config);
        let same = fingerprint(&a.final_state) == fingerprint(&b.final_state)
            && a.result == b.result;
        results.push(TestResult {
            name: format!("replay_seed_{}", seed),
            passed: same,
            detail: format!("{} turns, {} decisions", a.turns, a.decisions),
        });
    }

    results
}

// ── 6. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let state = play_game(config.seed, 8, config).final_state;

    let json = persistence::to_json_string(&state).and_then(|s| persistence::from_json_str(&s));
    results.push(TestResult {
        name: "json_roundtrip".into(),
        passed: matches!(&json, Ok(loaded) if *loaded == state),
        detail: match &json {
            Ok(_) => format!("turn {} restored", state.turn),
            Err(e) => e.to_string(),
        },
    });

    let mut buf = Vec::new();
    let snapshot = persistence::save_snapshot(&mut buf, &state)
        .and_then(|_| persistence::load_snapshot(&buf[..]));
    results.push(TestResult {
        name: "snapshot_roundtrip".into(),
        passed: matches!(&snapshot, Ok(loaded) if *loaded == state),
        detail: format!("{} bytes", buf.len()),
    });

    let mut corrupt = state.clone();
    corrupt.popularity.rich = 140;
    let rejected = persistence::to_json_string(&corrupt)
        .and_then(|s| persistence::from_json_str(&s))
        .is_err();
    results.push(TestResult {
        name: "invalid_state_rejected".into(),
        passed: rejected,
        detail: "popularity 140 must not load".into(),
    });

    let mut engine = GameEngine::new(config.clone());
    let before = engine.state();
    let refused = engine.load_state(corrupt).is_err();
    results.push(TestResult {
        name: "engine_keeps_state_on_bad_load".into(),
        passed: refused && engine.state() == before,
        detail: "failed load leaves the engine untouched".into(),
    });

    results
}
