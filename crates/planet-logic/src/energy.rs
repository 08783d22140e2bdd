//! Energy grid: effective production, demand, storage and the fossil phase-out.
//!
//! Production is `floor(capacity × efficiency)` per source, where efficiency is
//! the base table value bent by pollution and temperature. All results are
//! integer MW.

use serde::{Deserialize, Serialize};

use crate::constants::{self, energy::*};
use crate::state::{Capacity, EnergySource, GameState};

/// Efficiency of a source under the current environment, in `[0, 1]`.
///
/// Solar loses output to smog, wind and hydro react to temperature. The
/// permanent bonuses from events and decisions apply to renewables only.
pub fn effective_efficiency(source: EnergySource, state: &GameState) -> f64 {
    let mut efficiency = constants::base_efficiency(source);

    match source {
        EnergySource::Solar => {
            efficiency -= constants::pollution_solar_penalty(state.pollution);
        }
        EnergySource::Wind => {
            efficiency += constants::temperature_wind_modifier(state.temperature);
        }
        EnergySource::Hydro => {
            efficiency -= constants::temperature_hydro_penalty(state.temperature);
        }
        EnergySource::Geo | EnergySource::Fossil => {}
    }

    if source.is_renewable() {
        efficiency += state.efficiency_bonus + state.renewable_bonus;
    }

    if efficiency.is_nan() {
        return 0.0;
    }
    efficiency.clamp(0.0, 1.0)
}

/// MW delivered by one source with the given installed capacity.
pub fn source_production(source: EnergySource, capacity: u32, state: &GameState) -> i32 {
    if capacity == 0 {
        return 0;
    }
    (capacity as f64 * effective_efficiency(source, state)).floor() as i32
}

/// Per-source production, in `EnergySource::ALL` order.
pub fn production_by_source(capacity: &Capacity, state: &GameState) -> [(EnergySource, i32); 5] {
    EnergySource::ALL.map(|source| {
        (
            source,
            source_production(source, capacity.get(source), state),
        )
    })
}

pub fn total_production(capacity: &Capacity, state: &GameState) -> i32 {
    production_by_source(capacity, state)
        .iter()
        .map(|(_, mw)| mw)
        .sum()
}

/// Grid demand. The upgrade flag is reserved for a future efficiency tech.
pub fn effective_consumption(base: i32, has_efficiency_upgrade: bool) -> i32 {
    if has_efficiency_upgrade {
        (base as f64 * EFFICIENCY_CONSUMPTION_FACTOR).floor() as i32
    } else {
        base
    }
}

/// Bank the turn's surplus (or draw the deficit), lose 2 % to leakage, then
/// clamp to `[0, max_storage]`.
pub fn update_storage(storage: u32, production: i32, consumption: i32, max_storage: u32) -> u32 {
    let banked = storage as f64 + (production - consumption) as f64;
    let after_loss = (banked * (1.0 - STORAGE_LOSS_RATE)).floor();
    after_loss.clamp(0.0, max_storage as f64) as u32
}

pub fn energy_balance(production: i32, consumption: i32) -> i32 {
    production - consumption
}

pub fn is_critical_deficit(balance: i32) -> bool {
    balance <= -CRITICAL_DEFICIT_MW
}

/// Share of installed capacity that is renewable. Zero when nothing is built.
pub fn renewable_ratio(capacity: &Capacity) -> f64 {
    let total = capacity.total();
    if total == 0 {
        return 0.0;
    }
    capacity.renewable_total() as f64 / total as f64
}

/// Capacity-weighted mean efficiency across installed sources.
pub fn average_efficiency(capacity: &Capacity, state: &GameState) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for source in EnergySource::ALL {
        let mw = capacity.get(source) as f64;
        if mw > 0.0 {
            weighted += mw * effective_efficiency(source, state);
            total += mw;
        }
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Credits needed to build `batches` expansion batches of a source.
pub fn expansion_cost(source: EnergySource, batches: u32) -> i64 {
    constants::expansion_cost(source) * batches as i64
}

pub fn can_afford_expansion(credits: i64, source: EnergySource, batches: u32) -> bool {
    credits >= expansion_cost(source, batches)
}

/// Fossil MW retired when a single action adds `renewable_increase` MW of
/// renewables. Zero below the 20 MW threshold.
pub fn transition_reduction(renewable_increase: u32) -> u32 {
    if renewable_increase >= TRANSITION_THRESHOLD_MW {
        TRANSITION_MAX_REDUCTION_MW.min(renewable_increase / 10)
    } else {
        0
    }
}

/// Apply the automatic fossil phase-out. Returns the new capacity and the MW
/// actually retired.
pub fn apply_automatic_transition(capacity: &Capacity, renewable_increase: u32) -> (Capacity, u32) {
    let mut next = *capacity;
    let wanted = transition_reduction(renewable_increase);
    let retired = wanted.min(next.fossil);
    next.fossil -= retired;
    (next, retired)
}

/// Energy results for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReport {
    pub production: i32,
    pub consumption: i32,
    pub balance: i32,
    pub storage: u32,
    pub renewable_ratio: f64,
    pub average_efficiency: f64,
    pub critical_deficit: bool,
}

/// Run the energy step of a turn from the current capacity and environment.
pub fn simulate_energy(state: &GameState) -> EnergyReport {
    let capacity = &state.energy.capacity;
    let production = total_production(capacity, state);
    let consumption = effective_consumption(state.energy.consumption_base, false);
    let balance = energy_balance(production, consumption);
    let storage = update_storage(
        state.energy.storage,
        production,
        consumption,
        state.energy.max_storage,
    );

    EnergyReport {
        production,
        consumption,
        balance,
        storage,
        renewable_ratio: renewable_ratio(capacity),
        average_efficiency: average_efficiency(capacity, state),
        critical_deficit: is_critical_deficit(balance),
    }
}
