//! The per-turn pipeline.
//!
//! Stages run in a fixed order, each reading the previous stage's output:
//! energy, environment, economy, society, random event, scripted decision.
//! Nothing here touches the engine; it returns the staged state and leaves
//! committing (turn counter, cooldown) to the caller.

use planet_logic::decisions::{self, DecisionDef};
use planet_logic::economy::{self, EconomyReport};
use planet_logic::energy::{self, EnergyReport};
use planet_logic::environment::{self, EnvironmentReport};
use planet_logic::events;
use planet_logic::society::{self, SocietyContext, SocietyReport};
use planet_logic::state::{GameState, LogKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Pollution added in one turn above which the log carries a warning.
const POLLUTION_WARNING_STEP: f64 = 5.0;

/// Everything computed during one end of turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Turn number the report belongs to (before it advanced)
    pub turn: u32,
    pub energy: EnergyReport,
    pub environment: EnvironmentReport,
    pub economy: EconomyReport,
    pub society: SocietyReport,
    /// Id of the random event that fired, if any
    pub event: Option<String>,
}

/// Result of running the pipeline once.
#[derive(Debug, Clone)]
pub struct StagedTurn {
    /// Post-event state, turn counter and cooldown not yet advanced
    pub state: GameState,
    pub report: TurnReport,
    pub decision: Option<&'static DecisionDef>,
}

/// Run every stage against `state`. Draws exactly four rolls from `rng`
/// whatever the configuration, so toggling a feature never shifts the
/// random stream of later turns.
pub fn run_pipeline<R: Rng>(state: &GameState, config: &GameConfig, rng: &mut R) -> StagedTurn {
    let energy = energy::simulate_energy(state);
    let environment = environment::simulate_environment(state);
    let economy =
        economy::simulate_economy(&state.popularity, &state.energy.capacity, state.credits);
    let society = society::simulate_society(
        &state.popularity,
        &SocietyContext {
            pollution: environment.pollution,
            temperature: environment.temperature,
            credits: state.credits,
            production: energy.production,
            consumption: energy.consumption,
        },
    );

    let mut next = state.clone();
    next.energy.production = energy.production;
    next.energy.consumption = energy.consumption;
    next.energy.storage = energy.storage;
    next.pollution = environment.pollution;
    next.temperature = environment.temperature;
    next.credits = economy.final_credits.max(0);
    next.popularity = society.popularity;
    next.cleanup_turns = next.cleanup_turns.saturating_sub(1);

    next.logs.push(
        format!(
            "Turn {}: {} MW produced, {} MW consumed, {:+} credits",
            state.turn,
            energy.production,
            energy.consumption,
            economy.net_income()
        ),
        LogKind::Info,
    );
    if environment.pollution_generated > POLLUTION_WARNING_STEP {
        next.logs.push(
            format!(
                "Pollution rising: +{:.1} this turn",
                environment.pollution_generated
            ),
            LogKind::Warning,
        );
    }
    if energy.critical_deficit {
        next.logs.push(
            format!("Critical energy deficit: {} MW", energy.balance),
            LogKind::Warning,
        );
    }

    let trigger_roll: f64 = rng.gen();
    let select_roll: f64 = rng.gen();
    let mut event_id = None;
    if config.events_enabled {
        let outcome =
            events::simulate_events(&next, trigger_roll, select_roll, config.event_chance_bonus);
        next = outcome.state;
        if let Some(event) = outcome.event {
            log::info!("turn {}: event {} fired", state.turn, event.id);
            next.logs.push(event.log_message, LogKind::Event);
            event_id = Some(event.id.to_string());
        }
    }

    let decision_roll: f64 = rng.gen();
    let choice_roll: f64 = rng.gen();
    let decision = if config.decisions_enabled {
        decisions::should_show_decision(&next, decision_roll, choice_roll)
    } else {
        None
    };

    StagedTurn {
        state: next,
        report: TurnReport {
            turn: state.turn,
            energy,
            environment,
            economy,
            society,
            event: event_id,
        },
        decision,
    }
}

/// Advance the turn counter and tick the decision cooldown down.
pub fn commit(state: &mut GameState) {
    state.turn += 1;
    state.cooldowns.decision = state.cooldowns.decision.saturating_sub(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_logic::state::EnergySource;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quiet() -> GameConfig {
        GameConfig::deterministic()
    }

    #[test]
    fn test_pipeline_on_fresh_state() {
        let state = GameState::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let staged = run_pipeline(&state, &quiet(), &mut rng);

        // 50 MW fossil at 0.9 efficiency
        assert_eq!(staged.report.energy.production, 45);
        assert_eq!(staged.report.energy.consumption, 50);
        assert_eq!(staged.state.energy.production, 45);
        assert_eq!(staged.state.turn, 1);
        assert!(staged.decision.is_none());
        assert!(staged.report.event.is_none());
    }

    #[test]
    fn test_pipeline_does_not_touch_input() {
        let state = GameState::new();
        let before = state.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let _ = run_pipeline(&state, &GameConfig::default(), &mut rng);
        assert_eq!(state, before);
    }

    #[test]
    fn test_cleanup_counter_ticks_down() {
        let mut state = GameState::new();
        state.cleanup_turns = 2;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let staged = run_pipeline(&state, &quiet(), &mut rng);
        assert_eq!(staged.state.cleanup_turns, 1);
    }

    #[test]
    fn test_commit_floors_cooldown() {
        let mut state = GameState::new();
        state.cooldowns.decision = 1;
        commit(&mut state);
        assert_eq!(state.turn, 2);
        assert_eq!(state.cooldowns.decision, 0);
        commit(&mut state);
        assert_eq!(state.turn, 3);
        assert_eq!(state.cooldowns.decision, 0);
    }

    #[test]
    fn test_same_rolls_same_result() {
        let mut state = GameState::new();
        state.energy.capacity.adjust(EnergySource::Wind, 40);
        let config = GameConfig {
            event_chance_bonus: 90.0,
            ..Default::default()
        };
        let a = run_pipeline(&state, &config, &mut ChaCha8Rng::seed_from_u64(9));
        let b = run_pipeline(&state, &config, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a.report, b.report);
        assert_eq!(a.decision.map(|d| d.id), b.decision.map(|d| d.id));
    }

    #[test]
    fn test_forced_event_is_reported() {
        // strong_wind is the only event open on turn 1 with wind installed
        let mut state = GameState::new();
        state.energy.capacity.adjust(EnergySource::Wind, 20);
        let config = GameConfig {
            event_chance_bonus: 100.0,
            decisions_enabled: false,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let staged = run_pipeline(&state, &config, &mut rng);
        assert_eq!(staged.report.event.as_deref(), Some("strong_wind"));
        assert_eq!(staged.state.energy.capacity.wind, 23);
        assert_eq!(staged.state.logs.latest().map(|e| e.kind), Some(LogKind::Event));
    }
}
