//! Engine-level errors.

use planet_logic::actions::ActionError;
use planet_logic::state::StateError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("a decision is pending and must be resolved first")]
    DecisionPending,
    #[error("the game is over")]
    GameOver,
    #[error("rejected state: {0}")]
    InvalidState(#[from] StateError),
}
