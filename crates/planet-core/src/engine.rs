//! Game engine - owns one game and runs its turns

use planet_logic::actions::{self, Action, ActionError, ActionKind};
use planet_logic::decisions::{self, Choice, DecisionDef};
use planet_logic::state::{GameState, LogKind};
use planet_logic::victory::{self, FinalReport, GameResult};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::{Read, Write};

use crate::config::GameConfig;
use crate::error::EngineError;
use crate::persistence::{self, SaveError};
use crate::turn::{self, TurnReport};

/// What the caller has to do after [`GameEngine::end_turn`].
#[derive(Debug, Clone, Copy)]
pub enum TurnOutcome {
    /// The turn was committed and the game goes on
    Continue,
    /// The turn is on hold until [`GameEngine::resolve_decision`] is called
    DecisionRequired(&'static DecisionDef),
    /// The committed state is terminal
    GameOver(GameResult),
}

/// A turn held back by a scripted decision.
#[derive(Debug, Clone)]
struct PendingDecision {
    decision: &'static DecisionDef,
    staged: GameState,
}

/// One game session.
///
/// The engine is the only owner of the authoritative state. Callers get
/// copies through [`state`](Self::state) and change the game through actions,
/// turns and decisions.
pub struct GameEngine {
    state: GameState,
    config: GameConfig,
    rng: ChaCha8Rng,
    pending: Option<PendingDecision>,
    result: Option<GameResult>,
    last_report: Option<TurnReport>,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        let mut state = GameState::new();
        state
            .logs
            .push("Planet 2500: a new administration takes office", LogKind::Info);
        Self {
            state,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            pending: None,
            result: None,
            last_report: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Snapshot of the current state. Changing it has no effect on the game.
    pub fn state(&self) -> GameState {
        self.state.clone()
    }

    /// Borrow the current state without copying.
    pub fn state_ref(&self) -> &GameState {
        &self.state
    }

    /// Replace the current state, e.g. from a save.
    ///
    /// The state must satisfy every invariant; on error the engine keeps what
    /// it had. Any pending decision and terminal result are dropped.
    pub fn load_state(&mut self, state: GameState) -> Result<(), EngineError> {
        if let Err(err) = state.validate() {
            log::warn!("rejected state load: {}", err);
            return Err(err.into());
        }
        self.install(state);
        Ok(())
    }

    fn install(&mut self, state: GameState) {
        self.state = state;
        self.pending = None;
        self.result = None;
        self.last_report = None;
        log::info!("state loaded at turn {}", self.state.turn);
    }

    /// Start over from the initial state and the configured seed.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
        log::info!("game reset");
    }

    pub fn is_running(&self) -> bool {
        self.result.is_none()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn pending_decision(&self) -> Option<&'static DecisionDef> {
        self.pending.as_ref().map(|p| p.decision)
    }

    /// Report of the most recent end of turn.
    pub fn last_report(&self) -> Option<&TurnReport> {
        self.last_report.as_ref()
    }

    /// Closing summary, once the game has ended.
    pub fn final_report(&self) -> Option<FinalReport> {
        self.result
            .as_ref()
            .map(|result| victory::final_report(&self.state, result))
    }

    fn ensure_accepting(&self) -> Result<(), EngineError> {
        if self.result.is_some() {
            return Err(EngineError::GameOver);
        }
        if self.pending.is_some() {
            return Err(EngineError::DecisionPending);
        }
        Ok(())
    }

    /// Carry out a player action immediately.
    ///
    /// A rejected action leaves the state as it was apart from a log entry.
    pub fn apply_action(&mut self, action: Action) -> Result<(), EngineError> {
        self.ensure_accepting()?;

        match actions::apply_action(&self.state, &action, self.config.cleanup_program_turns) {
            Ok(outcome) => {
                self.state = outcome.state;
                self.state.logs.push(
                    format!("{} for {} credits", action.kind.label(), outcome.cost),
                    LogKind::Success,
                );
                if outcome.fossil_retired > 0 {
                    self.state.logs.push(
                        format!(
                            "Automatic transition: {} MW of fossil capacity retired",
                            outcome.fossil_retired
                        ),
                        LogKind::Info,
                    );
                }
                log::debug!(
                    "turn {}: {} applied, cost {}",
                    self.state.turn,
                    action.kind,
                    outcome.cost
                );
                Ok(())
            }
            Err(err) => {
                self.reject(&err);
                Err(err.into())
            }
        }
    }

    /// Apply an action by its wire name, e.g. `"expandSolar"`.
    pub fn apply_named_action(&mut self, name: &str, batches: u32) -> Result<(), EngineError> {
        self.ensure_accepting()?;
        match name.parse::<ActionKind>() {
            Ok(kind) => self.apply_action(Action::with_batches(kind, batches)),
            Err(err) => {
                self.reject(&err);
                Err(err.into())
            }
        }
    }

    fn reject(&mut self, err: &ActionError) {
        let kind = match err {
            ActionError::InsufficientCredits { .. } | ActionError::NoFossilCapacity => {
                LogKind::Warning
            }
            ActionError::InvalidAction(_) | ActionError::InvalidBatchCount => LogKind::Error,
        };
        log::warn!("turn {}: action rejected: {}", self.state.turn, err);
        self.state.logs.push(err.to_string(), kind);
    }

    /// Run the turn pipeline.
    ///
    /// While a decision is pending this returns the same
    /// [`TurnOutcome::DecisionRequired`] without doing anything else.
    pub fn end_turn(&mut self) -> Result<TurnOutcome, EngineError> {
        if self.result.is_some() {
            return Err(EngineError::GameOver);
        }
        if let Some(pending) = &self.pending {
            return Ok(TurnOutcome::DecisionRequired(pending.decision));
        }

        let staged = turn::run_pipeline(&self.state, &self.config, &mut self.rng);
        self.last_report = Some(staged.report);

        if let Some(decision) = staged.decision {
            let mut held = staged.state;
            held.logs
                .push(format!("Decision required: {}", decision.title), LogKind::Warning);
            log::info!("turn {}: decision {} raised", self.state.turn, decision.id);
            self.pending = Some(PendingDecision {
                decision,
                staged: held,
            });
            return Ok(TurnOutcome::DecisionRequired(decision));
        }

        let mut next = staged.state;
        turn::commit(&mut next);
        Ok(self.commit(next))
    }

    /// Answer the pending decision and finish the held turn.
    ///
    /// Does nothing and returns `None` when no decision is pending. Otherwise
    /// returns the game result if the committed state is terminal.
    pub fn resolve_decision(&mut self, choice: Choice) -> Option<GameResult> {
        let Some(pending) = self.pending.take() else {
            log::debug!("resolve_decision called with nothing pending");
            return None;
        };

        // The decision sets its own cooldown, so only the turn advances here.
        let mut next = decisions::apply_decision(&pending.staged, pending.decision, choice);
        next.turn += 1;
        let verdict = match choice {
            Choice::Accept => "accepted",
            Choice::Reject => "rejected",
        };
        next.logs.push(
            format!("{}: {}", pending.decision.title, verdict),
            LogKind::Info,
        );
        log::info!("decision {} {}", pending.decision.id, verdict);

        match self.commit(next) {
            TurnOutcome::GameOver(result) => Some(result),
            _ => None,
        }
    }

    fn commit(&mut self, mut next: GameState) -> TurnOutcome {
        let outcome = match victory::evaluate(&next) {
            Some(result) => {
                let kind = if result.is_victory() {
                    LogKind::Success
                } else {
                    LogKind::Error
                };
                next.logs.push(format!("Game over: {}", result.title()), kind);
                log::info!("game over at turn {}: {}", next.turn, result.id());
                self.result = Some(result);
                TurnOutcome::GameOver(result)
            }
            None => TurnOutcome::Continue,
        };
        log::debug!("turn {} committed", next.turn);
        self.state = next;
        outcome
    }

    /// Save the current state as a versioned JSON envelope
    pub fn save_json<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_json(writer, &self.state)
    }

    /// Load a JSON envelope, replacing the current state
    pub fn load_json<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        self.install(persistence::load_json(reader)?);
        Ok(())
    }

    /// Save the current state as a bincode snapshot
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_snapshot(writer, &self.state)
    }

    /// Load a bincode snapshot, replacing the current state
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        self.install(persistence::load_snapshot(reader)?);
        Ok(())
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_engine() -> GameEngine {
        GameEngine::new(GameConfig::deterministic())
    }

    #[test]
    fn test_engine_creation() {
        let engine = GameEngine::default();
        let state = engine.state();
        assert_eq!(state.turn, 1);
        assert_eq!(state.credits, 1000);
        assert!(engine.is_running());
        assert!(engine.pending_decision().is_none());
        assert!(engine.last_report().is_none());
    }

    #[test]
    fn test_action_applies_immediately() {
        let mut engine = quiet_engine();
        engine
            .apply_action(Action::new(ActionKind::ExpandWind))
            .unwrap();
        let state = engine.state();
        assert_eq!(state.credits, 850);
        assert_eq!(state.energy.capacity.wind, 10);
        assert_eq!(state.logs.latest().map(|e| e.kind), Some(LogKind::Success));
    }

    #[test]
    fn test_insufficient_credits_is_a_warning() {
        let mut engine = quiet_engine();
        let mut state = engine.state();
        state.credits = 100;
        engine.load_state(state).unwrap();

        let before = engine.state();
        let err = engine
            .apply_action(Action::new(ActionKind::ExpandHydro))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Action(ActionError::InsufficientCredits { .. })
        ));
        let after = engine.state();
        assert_eq!(after.credits, before.credits);
        assert_eq!(after.energy.capacity, before.energy.capacity);
        assert_eq!(after.logs.latest().map(|e| e.kind), Some(LogKind::Warning));
    }

    #[test]
    fn test_unknown_action_is_an_error() {
        let mut engine = quiet_engine();
        let err = engine.apply_named_action("buildDeathRay", 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Action(ActionError::InvalidAction(_))
        ));
        assert_eq!(
            engine.state().logs.latest().map(|e| e.kind),
            Some(LogKind::Error)
        );
    }

    #[test]
    fn test_named_action_with_batches() {
        let mut engine = quiet_engine();
        engine.apply_named_action("expandSolar", 2).unwrap();
        let state = engine.state();
        assert_eq!(state.credits, 600);
        assert_eq!(state.energy.capacity.solar, 20);
        // 20 MW renewable order retires 2 MW fossil
        assert_eq!(state.energy.capacity.fossil, 48);
    }

    #[test]
    fn test_end_turn_advances() {
        let mut engine = quiet_engine();
        let outcome = engine.end_turn().unwrap();
        assert!(matches!(outcome, TurnOutcome::Continue));
        assert_eq!(engine.state().turn, 2);
        assert_eq!(engine.last_report().map(|r| r.turn), Some(1));
    }

    #[test]
    fn test_decision_holds_the_turn() {
        let mut engine = GameEngine::new(GameConfig {
            events_enabled: false,
            ..Default::default()
        });

        // Keep ending turns until a decision shows up
        let mut raised = None;
        for _ in 0..40 {
            match engine.end_turn().unwrap() {
                TurnOutcome::DecisionRequired(decision) => {
                    raised = Some(decision);
                    break;
                }
                TurnOutcome::GameOver(_) => break,
                TurnOutcome::Continue => {}
            }
        }
        let decision = raised.expect("default seed raises a decision");

        let held_turn = engine.state().turn;
        assert_eq!(engine.pending_decision().map(|d| d.id), Some(decision.id));
        assert!(matches!(
            engine.apply_action(Action::new(ActionKind::PublicCampaign)),
            Err(EngineError::DecisionPending)
        ));
        assert!(matches!(
            engine.end_turn().unwrap(),
            TurnOutcome::DecisionRequired(d) if d.id == decision.id
        ));
        assert_eq!(engine.state().turn, held_turn);

        let result = engine.resolve_decision(Choice::Reject);
        let state = engine.state();
        assert_eq!(state.turn, held_turn + 1);
        assert_eq!(state.cooldowns.decision, decision.cooldown);
        assert!(engine.pending_decision().is_none());
        assert_eq!(result, engine.result());
    }

    #[test]
    fn test_resolve_without_pending_is_noop() {
        let mut engine = quiet_engine();
        let before = engine.state();
        assert!(engine.resolve_decision(Choice::Accept).is_none());
        assert_eq!(engine.state(), before);
    }

    #[test]
    fn test_game_over_stops_the_engine() {
        let mut engine = quiet_engine();
        let mut state = engine.state();
        state.credits = 1;
        state.popularity.poor = 0;
        state.popularity.middle = 0;
        state.popularity.rich = 0;
        engine.load_state(state).unwrap();

        match engine.end_turn().unwrap() {
            TurnOutcome::GameOver(result) => assert!(!result.is_victory()),
            other => panic!("expected game over, got {:?}", other),
        }
        assert!(!engine.is_running());
        assert!(engine.final_report().is_some());
        assert_eq!(engine.end_turn().unwrap_err(), EngineError::GameOver);
        assert_eq!(
            engine
                .apply_action(Action::new(ActionKind::PublicCampaign))
                .unwrap_err(),
            EngineError::GameOver
        );
    }

    #[test]
    fn test_load_state_rejects_invalid() {
        let mut engine = quiet_engine();
        let before = engine.state();
        let mut bad = engine.state();
        bad.temperature = 80.0;
        assert!(matches!(
            engine.load_state(bad),
            Err(EngineError::InvalidState(_))
        ));
        assert_eq!(engine.state(), before);
    }

    #[test]
    fn test_reset() {
        let mut engine = quiet_engine();
        engine
            .apply_action(Action::new(ActionKind::ExpandGeo))
            .unwrap();
        engine.end_turn().unwrap();
        engine.reset();
        let state = engine.state();
        assert_eq!(state.turn, 1);
        assert_eq!(state.credits, 1000);
        assert_eq!(state.energy.capacity.geo, 0);
        assert!(engine.is_running());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut engine = quiet_engine();
        engine
            .apply_action(Action::new(ActionKind::ExpandWind))
            .unwrap();
        engine.end_turn().unwrap();

        let mut buf = Vec::new();
        engine.save(&mut buf).unwrap();

        let mut engine2 = quiet_engine();
        engine2.load(&buf[..]).unwrap();
        assert_eq!(engine2.state(), engine.state());

        let mut json = Vec::new();
        engine.save_json(&mut json).unwrap();
        let mut engine3 = quiet_engine();
        engine3.load_json(&json[..]).unwrap();
        assert_eq!(engine3.state(), engine.state());
    }
}
