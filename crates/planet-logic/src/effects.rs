//! Partial state deltas carried by events and decision branches.

use serde::Serialize;

use crate::constants::bounds;
use crate::state::{CapacityDelta, GameState, PopularityDelta};

/// A bundle of one-shot changes. Fields left at zero have no effect.
///
/// Built in `const` context so the event and decision catalogs can be
/// static tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Effects {
    pub credits: i64,
    /// Foreign aid; treated as extra credits.
    pub international_aid: i64,
    pub pollution: f64,
    pub temperature: f64,
    pub capacity: CapacityDelta,
    pub popularity: PopularityDelta,
    /// Added to the permanent efficiency bonus.
    pub efficiency_bonus: f64,
    /// Added to the permanent renewable bonus.
    pub renewable_bonus: f64,
    /// MW added to the storage ceiling.
    pub storage_capacity: u32,
}

impl Effects {
    pub const NONE: Effects = Effects {
        credits: 0,
        international_aid: 0,
        pollution: 0.0,
        temperature: 0.0,
        capacity: CapacityDelta::ZERO,
        popularity: PopularityDelta::ZERO,
        efficiency_bonus: 0.0,
        renewable_bonus: 0.0,
        storage_capacity: 0,
    };

    /// Net credit change, aid included.
    pub fn credit_delta(&self) -> i64 {
        self.credits + self.international_aid
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::NONE
    }
}

/// Apply effects to a copy of `state`, clamping every field to its domain.
pub fn apply_effects(state: &GameState, effects: &Effects) -> GameState {
    let mut next = state.clone();

    next.energy.capacity.apply(&effects.capacity);

    next.pollution = (next.pollution + effects.pollution)
        .clamp(bounds::POLLUTION_MIN, bounds::POLLUTION_MAX);
    next.temperature = (next.temperature + effects.temperature)
        .clamp(bounds::TEMPERATURE_MIN, bounds::TEMPERATURE_MAX);

    next.credits = (next.credits + effects.credit_delta()).max(0);
    next.popularity = next.popularity.apply(effects.popularity);

    next.efficiency_bonus += effects.efficiency_bonus;
    next.renewable_bonus += effects.renewable_bonus;
    next.energy.max_storage = next
        .energy
        .max_storage
        .saturating_add(effects.storage_capacity);

    next
}
