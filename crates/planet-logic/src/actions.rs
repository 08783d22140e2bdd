//! Player actions issued between turns.
//!
//! An action is validated against the current state and, if affordable,
//! produces a complete new state. Rejected actions never touch the state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{self, bounds};
use crate::energy;
use crate::society;
use crate::state::{EnergySource, GameState};

/// Upper bound on batches per expansion order.
pub const MAX_BATCHES: u32 = 10;

/// MW of fossil capacity retired by one `ReduceFossil` action.
pub const FOSSIL_REDUCTION_MW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    ExpandSolar,
    ExpandWind,
    ExpandHydro,
    ExpandGeo,
    ExpandFossil,
    ReduceFossil,
    InvestResearch,
    PublicCampaign,
    EnvironmentalProgram,
}

impl ActionKind {
    pub const ALL: [ActionKind; 9] = [
        ActionKind::ExpandSolar,
        ActionKind::ExpandWind,
        ActionKind::ExpandHydro,
        ActionKind::ExpandGeo,
        ActionKind::ExpandFossil,
        ActionKind::ReduceFossil,
        ActionKind::InvestResearch,
        ActionKind::PublicCampaign,
        ActionKind::EnvironmentalProgram,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::ExpandSolar => "expandSolar",
            ActionKind::ExpandWind => "expandWind",
            ActionKind::ExpandHydro => "expandHydro",
            ActionKind::ExpandGeo => "expandGeo",
            ActionKind::ExpandFossil => "expandFossil",
            ActionKind::ReduceFossil => "reduceFossil",
            ActionKind::InvestResearch => "investResearch",
            ActionKind::PublicCampaign => "publicCampaign",
            ActionKind::EnvironmentalProgram => "environmentalProgram",
        }
    }

    /// Human-readable label for log messages.
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::ExpandSolar => "Expand solar power",
            ActionKind::ExpandWind => "Expand wind power",
            ActionKind::ExpandHydro => "Expand hydro power",
            ActionKind::ExpandGeo => "Expand geothermal power",
            ActionKind::ExpandFossil => "Expand fossil power",
            ActionKind::ReduceFossil => "Reduce fossil power",
            ActionKind::InvestResearch => "Invest in research",
            ActionKind::PublicCampaign => "Public campaign",
            ActionKind::EnvironmentalProgram => "Environmental program",
        }
    }

    /// The source this action builds, if it is an expansion.
    pub fn expansion_source(self) -> Option<EnergySource> {
        match self {
            ActionKind::ExpandSolar => Some(EnergySource::Solar),
            ActionKind::ExpandWind => Some(EnergySource::Wind),
            ActionKind::ExpandHydro => Some(EnergySource::Hydro),
            ActionKind::ExpandGeo => Some(EnergySource::Geo),
            ActionKind::ExpandFossil => Some(EnergySource::Fossil),
            _ => None,
        }
    }

    /// Credits for a single batch.
    pub fn base_cost(self) -> i64 {
        match self {
            ActionKind::ReduceFossil => 0,
            ActionKind::InvestResearch => 100,
            ActionKind::PublicCampaign => 50,
            ActionKind::EnvironmentalProgram => 150,
            _ => self
                .expansion_source()
                .map(constants::expansion_cost)
                .unwrap_or(0),
        }
    }

    /// Immediate pollution change when the action is carried out.
    pub fn pollution(self) -> f64 {
        match self {
            ActionKind::ExpandSolar => 2.0,
            ActionKind::ExpandWind => 1.0,
            ActionKind::ExpandHydro => 3.0,
            ActionKind::ExpandGeo => 1.0,
            ActionKind::ExpandFossil => 5.0,
            ActionKind::ReduceFossil => -5.0,
            ActionKind::InvestResearch | ActionKind::PublicCampaign => 0.0,
            ActionKind::EnvironmentalProgram => -10.0,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ActionError::InvalidAction(s.to_string()))
    }
}

/// An action with its batch count. Only expansions accept more than one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub batches: u32,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self { kind, batches: 1 }
    }

    pub fn with_batches(kind: ActionKind, batches: u32) -> Self {
        Self { kind, batches }
    }

    pub fn cost(&self) -> i64 {
        self.kind.base_cost() * self.batches as i64
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Action::new(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: i64, available: i64 },
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("no fossil capacity left to reduce")]
    NoFossilCapacity,
    #[error("batch count must be between 1 and 10, and exactly 1 for non-expansions")]
    InvalidBatchCount,
}

/// Result of an accepted action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub state: GameState,
    pub cost: i64,
    /// Capacity change on the affected source, in MW (negative for reductions).
    pub capacity_change: i32,
    /// Fossil MW retired by the automatic transition rule.
    pub fossil_retired: u32,
}

fn validate(state: &GameState, action: &Action) -> Result<(), ActionError> {
    let max = if action.kind.expansion_source().is_some() {
        MAX_BATCHES
    } else {
        1
    };
    if action.batches == 0 || action.batches > max {
        return Err(ActionError::InvalidBatchCount);
    }
    if action.kind == ActionKind::ReduceFossil && state.energy.capacity.fossil == 0 {
        return Err(ActionError::NoFossilCapacity);
    }
    let required = action.cost();
    if state.credits < required {
        return Err(ActionError::InsufficientCredits {
            required,
            available: state.credits,
        });
    }
    Ok(())
}

/// Validate and carry out an action.
///
/// Order: pay, build or retire capacity, immediate pollution, class reactions,
/// cleanup program, then the automatic fossil phase-out for large renewable
/// orders.
pub fn apply_action(
    state: &GameState,
    action: &Action,
    cleanup_program_turns: u32,
) -> Result<ActionOutcome, ActionError> {
    validate(state, action)?;

    let mut next = state.clone();
    let cost = action.cost();
    next.credits = (next.credits - cost).max(0);

    let mut capacity_change = 0i32;
    if let Some(source) = action.kind.expansion_source() {
        let mw = constants::expansion_batch_mw(source) * action.batches;
        next.energy.capacity.adjust(source, mw as i32);
        capacity_change = mw as i32;
    } else if action.kind == ActionKind::ReduceFossil {
        let retired = FOSSIL_REDUCTION_MW.min(next.energy.capacity.fossil);
        next.energy.capacity.fossil -= retired;
        capacity_change = -(retired as i32);
    }

    next.pollution = (next.pollution + action.kind.pollution())
        .clamp(bounds::POLLUTION_MIN, bounds::POLLUTION_MAX);
    next.popularity = next
        .popularity
        .apply(society::action_popularity(action.kind));

    if action.kind == ActionKind::EnvironmentalProgram {
        next.cleanup_turns = next.cleanup_turns.max(cleanup_program_turns);
    }

    let mut fossil_retired = 0;
    if let Some(source) = action.kind.expansion_source() {
        if source.is_renewable() {
            let (capacity, retired) =
                energy::apply_automatic_transition(&next.energy.capacity, capacity_change as u32);
            next.energy.capacity = capacity;
            fossil_retired = retired;
        }
    }

    Ok(ActionOutcome {
        state: next,
        cost,
        capacity_change,
        fossil_retired,
    })
}
