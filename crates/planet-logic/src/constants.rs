//! Balance constants: efficiencies, rates, costs and thresholds.
//!
//! Everything tunable lives here so subsystems share one source of truth.
//! Per-source tables are exposed as lookup functions keyed on `EnergySource`.

use crate::state::{EnergySource, SocialClass};

/// Entries kept in the in-game log.
pub const LOG_CAPACITY: usize = 50;

pub mod bounds {
    pub const POLLUTION_MIN: f64 = 0.0;
    pub const POLLUTION_MAX: f64 = 100.0;
    pub const TEMPERATURE_MIN: f64 = 15.0;
    pub const TEMPERATURE_MAX: f64 = 50.0;
    pub const POPULARITY_MIN: i32 = 0;
    pub const POPULARITY_MAX: i32 = 100;
}

pub mod energy {
    /// Base grid demand in MW.
    pub const CONSUMPTION_BASE: i32 = 50;
    /// Demand multiplier once an efficiency upgrade exists.
    pub const EFFICIENCY_CONSUMPTION_FACTOR: f64 = 0.95;
    pub const DEFAULT_MAX_STORAGE: u32 = 100;
    /// Fraction of stored energy lost per turn.
    pub const STORAGE_LOSS_RATE: f64 = 0.02;
    /// Renewable MW added in a single action that triggers the fossil phase-out.
    pub const TRANSITION_THRESHOLD_MW: u32 = 20;
    pub const TRANSITION_MAX_REDUCTION_MW: u32 = 5;
    /// Deficit (consumption − production) considered critical.
    pub const CRITICAL_DEFICIT_MW: i32 = 30;
}

pub mod environment {
    /// Temperature rise per point of pollution generated.
    pub const POLLUTION_WARMING: f64 = 0.1;
    /// Cooling per unit of renewable ratio.
    pub const RENEWABLE_MITIGATION: f64 = 0.5;
    /// Above this temperature the planet sheds a little heat each turn.
    pub const PASSIVE_COOLING_ABOVE: f64 = 25.0;
    pub const PASSIVE_COOLING: f64 = 0.1;
    /// Pollution removed per turn by an active cleanup program.
    pub const CLEANUP_REDUCTION: f64 = 2.0;
    pub const PURIFICATION_RATE: f64 = 0.02;
    pub const PURIFICATION_CAP: f64 = 1.0;
}

pub mod economy {
    /// Rich popularity below which the authoritarian tax applies.
    pub const TAX_RICH_BELOW: i32 = 40;
    pub const TAX_RATE: f64 = 0.10;
    /// Poor popularity below which the subsidy applies.
    pub const SUBSIDY_POOR_BELOW: i32 = 30;
    pub const SUBSIDY_RATE: f64 = 0.05;
}

pub mod events {
    /// Percent chance that any event fires in a turn.
    pub const BASE_TRIGGER_CHANCE: f64 = 10.0;
}

pub mod decisions {
    pub const BASE_CHANCE: f64 = 10.0;
    pub const LOW_POPULARITY_BONUS: f64 = 15.0;
    pub const LOW_POPULARITY_BELOW: i32 = 50;
    pub const CRISIS_BONUS: f64 = 10.0;
    pub const CRISIS_POLLUTION_ABOVE: f64 = 70.0;
    pub const CRISIS_DEFICIT_BELOW: i32 = -20;
    pub const MAX_CHANCE: f64 = 50.0;
    /// A class must trail the average by more than this to be targeted.
    pub const TARGET_DEVIATION: f64 = 10.0;
}

/// Defeat thresholds, checked in this order.
pub mod defeat {
    pub const CREDITS_AT_OR_BELOW: i64 = 0;
    pub const POLLUTION_AT_OR_ABOVE: f64 = 100.0;
    pub const TEMPERATURE_AT_OR_ABOVE: f64 = 45.0;
    pub const AVG_POPULARITY_AT_OR_BELOW: f64 = 20.0;
    pub const DEFICIT_AT_OR_ABOVE: i32 = 30;
}

/// Victory tiers, checked in this order.
pub mod victory {
    pub const SUSTAINABLE_MAX_POLLUTION: f64 = 10.0;
    pub const SUSTAINABLE_MIN_RENEWABLE_RATIO: f64 = 0.8;
    pub const SUSTAINABLE_MIN_POPULARITY: f64 = 70.0;
    pub const SUSTAINABLE_MAX_TURN: u32 = 50;

    pub const ENERGETIC_MIN_SURPLUS: i32 = 20;
    pub const ENERGETIC_MAX_POLLUTION: f64 = 50.0;
    pub const ENERGETIC_MAX_TURN: u32 = 30;

    pub const PARTIAL_MAX_POLLUTION: f64 = 30.0;
    pub const PARTIAL_MIN_POPULARITY: f64 = 60.0;
    pub const PARTIAL_MIN_CREDITS: i64 = 500;
    pub const PARTIAL_MAX_TURN: u32 = 40;

    /// Turn horizon used for the turns-remaining score bonus.
    pub const SCORE_TURN_HORIZON: u32 = 50;
    pub const MAX_SCORE: u32 = 100;
}

/// Base conversion efficiency before environmental modifiers.
pub fn base_efficiency(source: EnergySource) -> f64 {
    match source {
        EnergySource::Solar => 0.80,
        EnergySource::Wind => 0.90,
        EnergySource::Hydro => 0.85,
        EnergySource::Geo => 0.95,
        EnergySource::Fossil => 0.90,
    }
}

/// Pollution generated per MW actually produced.
pub fn pollution_rate(source: EnergySource) -> f64 {
    match source {
        EnergySource::Solar => 0.1,
        EnergySource::Wind => 0.05,
        EnergySource::Hydro => 0.2,
        EnergySource::Geo => 0.15,
        EnergySource::Fossil => 2.0,
    }
}

/// Upkeep in credits per 10 MW installed.
pub fn maintenance_per_10mw(source: EnergySource) -> f64 {
    match source {
        EnergySource::Solar => 10.0,
        EnergySource::Wind => 8.0,
        EnergySource::Hydro => 15.0,
        EnergySource::Geo => 12.0,
        EnergySource::Fossil => 20.0,
    }
}

/// Credits per expansion batch.
pub fn expansion_cost(source: EnergySource) -> i64 {
    match source {
        EnergySource::Solar => 200,
        EnergySource::Wind => 150,
        EnergySource::Hydro => 300,
        EnergySource::Geo => 250,
        EnergySource::Fossil => 100,
    }
}

/// MW added per expansion batch.
pub fn expansion_batch_mw(source: EnergySource) -> u32 {
    match source {
        EnergySource::Solar => 10,
        EnergySource::Wind => 10,
        EnergySource::Hydro => 15,
        EnergySource::Geo => 8,
        EnergySource::Fossil => 10,
    }
}

/// Credits collected per popularity point.
pub fn income_rate(class: SocialClass) -> f64 {
    match class {
        SocialClass::Poor => 5.0,
        SocialClass::Middle => 10.0,
        SocialClass::Rich => 15.0,
    }
}

/// Solar penalty from smog: up to −0.5 at pollution 100.
pub fn pollution_solar_penalty(pollution: f64) -> f64 {
    (pollution / 200.0).max(0.0)
}

/// Wind modifier from temperature: weak in the cold, gusty in the heat,
/// mildly favourable in between.
pub fn temperature_wind_modifier(temperature: f64) -> f64 {
    if temperature < 15.0 {
        -0.2
    } else if temperature > 35.0 {
        -0.15
    } else {
        temperature / 50.0
    }
}

/// Hydro penalty from drought above 30°C, capped at 0.3.
pub fn temperature_hydro_penalty(temperature: f64) -> f64 {
    if temperature > 30.0 {
        ((temperature - 30.0) / 20.0).min(0.3)
    } else {
        0.0
    }
}
