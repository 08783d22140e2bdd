//! Pollution and temperature feedback.
//!
//! Pollution accumulates from realized production, decays slowly through
//! natural purification, and warms the planet. Renewables and an active
//! cleanup program push back.

use serde::{Deserialize, Serialize};

use crate::constants::{self, bounds, environment::*};
use crate::energy;
use crate::state::{Capacity, EnergySource, GameState};

/// Pollution emitted by one source for the MW it actually produced.
pub fn source_pollution(source: EnergySource, production: i32) -> f64 {
    production.max(0) as f64 * constants::pollution_rate(source)
}

/// Total pollution generated by the grid this turn, floored.
pub fn generated_pollution(capacity: &Capacity, state: &GameState) -> f64 {
    energy::production_by_source(capacity, state)
        .iter()
        .map(|(source, mw)| source_pollution(*source, *mw))
        .sum::<f64>()
        .floor()
}

/// Unclamped temperature change for a turn.
pub fn temperature_change(current_temperature: f64, generated: f64, renewable_ratio: f64) -> f64 {
    let mut change = generated * POLLUTION_WARMING - renewable_ratio * RENEWABLE_MITIGATION;
    if current_temperature > PASSIVE_COOLING_ABOVE {
        change -= PASSIVE_COOLING;
    }
    change
}

fn floor_one_decimal(value: f64) -> f64 {
    (value * 10.0).floor() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReport {
    pub pollution: f64,
    pub temperature: f64,
    pub pollution_generated: f64,
    pub temperature_change: f64,
}

/// Advance pollution and temperature by one turn.
///
/// Order: accumulate, cleanup (−2), purification (`min(1, 2 %)`), clamp, then
/// floor both values to one decimal.
pub fn update_environment(
    pollution: f64,
    temperature: f64,
    generated: f64,
    renewable_ratio: f64,
    cleanup_active: bool,
) -> EnvironmentReport {
    let change = temperature_change(temperature, generated, renewable_ratio);
    let next_temperature = temperature + change;

    let mut next_pollution = pollution + generated;
    if cleanup_active {
        next_pollution = (next_pollution - CLEANUP_REDUCTION).max(0.0);
    }
    let purification = (next_pollution * PURIFICATION_RATE).min(PURIFICATION_CAP);
    next_pollution = (next_pollution - purification).max(0.0);

    let next_pollution = next_pollution.clamp(bounds::POLLUTION_MIN, bounds::POLLUTION_MAX);
    let next_temperature =
        next_temperature.clamp(bounds::TEMPERATURE_MIN, bounds::TEMPERATURE_MAX);

    EnvironmentReport {
        pollution: floor_one_decimal(next_pollution),
        temperature: floor_one_decimal(next_temperature),
        pollution_generated: generated,
        temperature_change: change,
    }
}

/// Run the environment step from the current state.
pub fn simulate_environment(state: &GameState) -> EnvironmentReport {
    let capacity = &state.energy.capacity;
    let generated = generated_pollution(capacity, state);
    update_environment(
        state.pollution,
        state.temperature,
        generated,
        energy::renewable_ratio(capacity),
        state.cleanup_turns > 0,
    )
}

/// Qualitative environmental health band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HealthBand::Excellent
        } else if score >= 60.0 {
            HealthBand::Good
        } else if score >= 40.0 {
            HealthBand::Fair
        } else if score >= 20.0 {
            HealthBand::Poor
        } else {
            HealthBand::Critical
        }
    }
}

/// Advisory output only, never read back from a save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentalHealth {
    /// Rounded score in `[0, 100]`.
    pub score: u32,
    pub band: HealthBand,
    pub recommendations: Vec<&'static str>,
}

/// Advisory assessment. Does not feed back into the simulation.
pub fn environmental_health(state: &GameState) -> EnvironmentalHealth {
    let mut score = 100.0 - state.pollution * 0.8;
    if state.temperature > 25.0 {
        score -= (state.temperature - 25.0) * 2.0;
    }
    let score = score.clamp(0.0, 100.0);

    EnvironmentalHealth {
        score: score.round() as u32,
        band: HealthBand::from_score(score),
        recommendations: recommendations(state),
    }
}

fn recommendations(state: &GameState) -> Vec<&'static str> {
    let mut out = Vec::new();
    if state.pollution > 50.0 {
        out.push("Run environmental programs to bring pollution down");
    }
    if state.temperature > 30.0 {
        out.push("Invest in cooling technology and renewable sources");
    }
    if state.pollution > 30.0 && state.temperature > 25.0 {
        out.push("Pair emission cuts with the energy transition");
    }
    if energy::renewable_ratio(&state.energy.capacity) < 0.5 {
        out.push("Raise the renewable share of the energy mix");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fossil_start_pollutes_heavily() {
        let state = GameState::new();
        // 45 MW fossil × 2.0
        assert_eq!(generated_pollution(&state.energy.capacity, &state), 90.0);
    }

    #[test]
    fn test_generated_pollution_is_floored() {
        let state = GameState::new();
        let cap = Capacity {
            solar: 10,
            fossil: 50,
            ..Default::default()
        };
        // solar 7 MW × 0.1 = 0.7, fossil 90
        assert_eq!(generated_pollution(&cap, &state), 90.0);
    }

    #[test]
    fn test_temperature_change_components() {
        assert!((temperature_change(20.0, 10.0, 0.0) - 1.0).abs() < 1e-9);
        assert!((temperature_change(20.0, 0.0, 1.0) + 0.5).abs() < 1e-9);
        assert!((temperature_change(30.0, 0.0, 0.0) + 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_update_environment_purifies_and_floors() {
        let report = update_environment(2.0, 20.0, 90.0, 10.0 / 60.0, false);
        assert_eq!(report.pollution, 91.0);
        assert_eq!(report.temperature, 28.9);
    }

    #[test]
    fn test_cleanup_program_reduces_pollution() {
        let without = update_environment(10.0, 20.0, 0.0, 0.0, false);
        let with = update_environment(10.0, 20.0, 0.0, 0.0, true);
        assert_eq!(without.pollution, 9.8);
        assert_eq!(with.pollution, 7.8);
    }

    #[test]
    fn test_update_environment_clamps() {
        let report = update_environment(99.0, 49.0, 500.0, 0.0, false);
        assert_eq!(report.pollution, 100.0);
        assert_eq!(report.temperature, 50.0);

        let report = update_environment(0.0, 15.0, 0.0, 1.0, true);
        assert_eq!(report.pollution, 0.0);
        assert_eq!(report.temperature, 15.0);
    }

    #[test]
    fn test_environmental_health_bands() {
        let clean = GameState::new();
        let health = environmental_health(&clean);
        assert_eq!(health.score, 100);
        assert_eq!(health.band, HealthBand::Excellent);

        let dirty = GameState {
            pollution: 80.0,
            temperature: 35.0,
            ..Default::default()
        };
        let health = environmental_health(&dirty);
        assert_eq!(health.score, 16);
        assert_eq!(health.band, HealthBand::Critical);
        assert!(!health.recommendations.is_empty());
    }

    #[test]
    fn test_health_report_serializes() {
        let health = environmental_health(&GameState::new());
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["band"], "excellent");
        assert_eq!(
            json["recommendations"][0],
            "Raise the renewable share of the energy mix"
        );
    }
}
