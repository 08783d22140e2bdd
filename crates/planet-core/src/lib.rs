//! Planet Core - Turn Engine for the planet management simulation
//!
//! Owns the authoritative [`GameState`](planet_logic::state::GameState) of one
//! game and drives it through the fixed turn pipeline defined by the rules in
//! `planet-logic`.
//!
//! # Architecture
//!
//! - **Rules** (`planet-logic`): pure functions over plain state
//! - **Engine** ([`engine::GameEngine`]): one session per game, holding the
//!   seeded RNG, the pending decision and the terminal result
//! - **Persistence**: versioned JSON envelopes and compact bincode snapshots
//!
//! # Example
//!
//! ```rust,no_run
//! use planet_core::prelude::*;
//!
//! let mut engine = GameEngine::new(GameConfig::default());
//! engine.apply_named_action("expandSolar", 1).ok();
//!
//! loop {
//!     match engine.end_turn() {
//!         Ok(TurnOutcome::Continue) => continue,
//!         Ok(TurnOutcome::DecisionRequired(_)) => {
//!             engine.resolve_decision(Choice::Accept);
//!         }
//!         Ok(TurnOutcome::GameOver(_)) | Err(_) => break,
//!     }
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod turn;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::GameConfig;
    pub use crate::engine::{GameEngine, TurnOutcome};
    pub use crate::error::EngineError;
    pub use crate::turn::TurnReport;
    pub use planet_logic::actions::{Action, ActionKind};
    pub use planet_logic::decisions::Choice;
    pub use planet_logic::state::GameState;
    pub use planet_logic::victory::GameResult;
}
