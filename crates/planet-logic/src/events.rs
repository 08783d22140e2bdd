//! Random events: a static catalog, eligibility, weighted selection.
//!
//! At most one event fires per turn. The caller supplies uniform rolls in
//! `[0, 1)` so selection stays deterministic under a seeded RNG.

use serde::{Deserialize, Serialize};

use crate::constants::events::BASE_TRIGGER_CHANCE;
use crate::effects::{apply_effects, Effects};
use crate::state::{CapacityDelta, GameState, PopularityDelta};

/// How long an event's effects are meant to last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDuration {
    /// Applied once and left in place.
    Instant,
    /// Flavored as a one-turn boost. Not reverted.
    Temporary,
    /// Accumulates into the permanent bonuses.
    Permanent,
}

#[derive(Debug, Clone, Copy)]
pub struct EventDef {
    pub id: &'static str,
    pub name: &'static str,
    /// Relative selection weight.
    pub weight: f64,
    pub min_turn: u32,
    pub max_turn: u32,
    pub precondition: fn(&GameState) -> bool,
    pub effects: Effects,
    pub duration: EffectDuration,
    pub description: &'static str,
    pub log_message: &'static str,
}

fn always(_: &GameState) -> bool {
    true
}

pub static EVENTS: [EventDef; 15] = [
    EventDef {
        id: "sabotage",
        name: "Corporate Sabotage",
        weight: 5.0,
        min_turn: 3,
        max_turn: 50,
        precondition: |s| s.energy.capacity.fossil > 20,
        effects: Effects {
            pollution: 5.0,
            popularity: PopularityDelta::new(-5, -3, 2),
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "Fossil fuel corporations sabotage renewable infrastructure in retaliation.",
        log_message: "Corporate sabotage raises pollution and sours public mood.",
    },
    EventDef {
        id: "natural_disaster",
        name: "Natural Disaster",
        weight: 8.0,
        min_turn: 2,
        max_turn: 50,
        precondition: |s| s.temperature > 25.0 || s.pollution > 30.0,
        effects: Effects {
            temperature: 3.0,
            pollution: 3.0,
            capacity: CapacityDelta {
                solar: -2,
                wind: -3,
                ..CapacityDelta::ZERO
            },
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "A severe storm damages energy infrastructure.",
        log_message: "Natural disaster damages renewable plants and raises pollution.",
    },
    EventDef {
        id: "panel_breakage",
        name: "Panel Breakage",
        weight: 12.0,
        min_turn: 1,
        max_turn: 50,
        precondition: |s| s.energy.capacity.solar > 10,
        effects: Effects {
            capacity: CapacityDelta {
                solar: -1,
                ..CapacityDelta::ZERO
            },
            pollution: 1.0,
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "Weather and wear crack a batch of solar panels.",
        log_message: "Broken solar panels cut capacity and leave debris.",
    },
    EventDef {
        id: "sunny_day",
        name: "Sunny Day",
        weight: 20.0,
        min_turn: 1,
        max_turn: 50,
        precondition: |s| s.energy.capacity.solar > 0,
        effects: Effects {
            capacity: CapacityDelta {
                solar: 2,
                ..CapacityDelta::ZERO
            },
            ..Effects::NONE
        },
        duration: EffectDuration::Temporary,
        description: "Perfect sunshine lifts solar output.",
        log_message: "An exceptionally sunny day boosts solar production.",
    },
    EventDef {
        id: "strong_wind",
        name: "Strong Wind",
        weight: 15.0,
        min_turn: 1,
        max_turn: 50,
        precondition: |s| s.energy.capacity.wind > 0,
        effects: Effects {
            capacity: CapacityDelta {
                wind: 3,
                ..CapacityDelta::ZERO
            },
            ..Effects::NONE
        },
        duration: EffectDuration::Temporary,
        description: "Unusually strong winds drive the turbines harder.",
        log_message: "Strong winds boost wind production.",
    },
    EventDef {
        id: "tech_discovery",
        name: "Technology Discovery",
        weight: 3.0,
        min_turn: 5,
        max_turn: 50,
        precondition: |s| s.credits >= 200,
        effects: Effects {
            efficiency_bonus: 0.05,
            ..Effects::NONE
        },
        duration: EffectDuration::Permanent,
        description: "A scientific advance improves every renewable source.",
        log_message: "Technology discovery permanently raises energy efficiency.",
    },
    EventDef {
        id: "battery_advance",
        name: "Battery Advance",
        weight: 4.0,
        min_turn: 4,
        max_turn: 50,
        precondition: |s| s.energy.storage < 50,
        effects: Effects {
            storage_capacity: 10,
            ..Effects::NONE
        },
        duration: EffectDuration::Permanent,
        description: "Better battery chemistry expands storage.",
        log_message: "Battery advance expands storage capacity.",
    },
    EventDef {
        id: "policy_shift",
        name: "Policy Shift",
        weight: 6.0,
        min_turn: 3,
        max_turn: 50,
        precondition: always,
        effects: Effects {
            popularity: PopularityDelta::new(0, 5, 3),
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "The political climate turns in favor of green investment.",
        log_message: "A policy shift builds support for renewables.",
    },
    EventDef {
        id: "economic_boom",
        name: "Economic Boom",
        weight: 7.0,
        min_turn: 2,
        max_turn: 40,
        precondition: |s| s.credits < 800,
        effects: Effects {
            credits: 150,
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "Unexpected growth swells tax revenue.",
        log_message: "An economic boom brings extra credits.",
    },
    EventDef {
        id: "public_protest",
        name: "Public Protest",
        weight: 10.0,
        min_turn: 2,
        max_turn: 50,
        precondition: |s| s.average_popularity() < 40.0,
        effects: Effects {
            popularity: PopularityDelta::new(10, 5, 0),
            credits: -50,
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "Street protests force a rethink of energy policy.",
        log_message: "Public protests increase pressure for change.",
    },
    EventDef {
        id: "international_aid",
        name: "International Aid",
        weight: 4.0,
        min_turn: 5,
        max_turn: 50,
        precondition: |s| s.pollution > 40.0 || s.temperature > 28.0,
        effects: Effects {
            credits: 200,
            pollution: -3.0,
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "The international community funds climate projects.",
        log_message: "International aid arrives for environmental projects.",
    },
    EventDef {
        id: "corporate_scandal",
        name: "Corporate Scandal",
        weight: 6.0,
        min_turn: 4,
        max_turn: 50,
        precondition: |s| s.energy.capacity.fossil > 30,
        effects: Effects {
            popularity: PopularityDelta::new(8, 5, -10),
            credits: -100,
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "A scandal at the fossil energy companies comes to light.",
        log_message: "Corporate scandal damages the energy companies' reputation.",
    },
    EventDef {
        id: "scientific_breakthrough",
        name: "Scientific Breakthrough",
        weight: 2.0,
        min_turn: 8,
        max_turn: 50,
        precondition: |s| s.credits >= 300,
        effects: Effects {
            efficiency_bonus: 0.08,
            popularity: PopularityDelta::new(0, 3, 0),
            ..Effects::NONE
        },
        duration: EffectDuration::Permanent,
        description: "A breakthrough in applied physics transforms energy conversion.",
        log_message: "Scientific breakthrough sharply raises energy efficiency.",
    },
    EventDef {
        id: "climate_miracle",
        name: "Climate Miracle",
        weight: 1.0,
        min_turn: 10,
        max_turn: 50,
        precondition: |s| s.pollution > 60.0 && s.temperature > 32.0,
        effects: Effects {
            pollution: -10.0,
            temperature: -5.0,
            popularity: PopularityDelta::new(5, 5, 5),
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "A rare weather pattern scrubs the air and cools the planet.",
        log_message: "A rare climate miracle improves conditions.",
    },
    EventDef {
        id: "energy_crisis",
        name: "Global Energy Crisis",
        weight: 3.0,
        min_turn: 6,
        max_turn: 50,
        precondition: |s| s.energy.balance() < 0,
        effects: Effects {
            popularity: PopularityDelta::new(-8, -5, -3),
            credits: -200,
            ..Effects::NONE
        },
        duration: EffectDuration::Instant,
        description: "A global energy crisis drives up prices.",
        log_message: "Global energy crisis hits the economy and society.",
    },
];

/// Turn window and precondition both hold.
pub fn is_eligible(event: &EventDef, state: &GameState) -> bool {
    (event.min_turn..=event.max_turn).contains(&state.turn) && (event.precondition)(state)
}

pub fn eligible_events(state: &GameState) -> Vec<&'static EventDef> {
    EVENTS.iter().filter(|e| is_eligible(e, state)).collect()
}

/// Selection weight adjusted for the current situation. Affects the relative
/// draw only, never the trigger roll.
pub fn modified_weight(event: &EventDef, state: &GameState) -> f64 {
    let mut weight = event.weight;

    if state.pollution > 70.0 {
        match event.id {
            "natural_disaster" => weight *= 1.5,
            "climate_miracle" => weight *= 2.0,
            _ => {}
        }
    }
    if state.temperature > 35.0 {
        match event.id {
            "natural_disaster" => weight *= 1.3,
            "international_aid" => weight *= 1.8,
            _ => {}
        }
    }
    if state.average_popularity() < 30.0 && event.id == "public_protest" {
        weight *= 2.0;
    }
    if state.energy.capacity.fossil > 40 && event.id == "corporate_scandal" {
        weight *= 1.5;
    }

    weight
}

/// Weighted draw over eligible events. `roll` is uniform in `[0, 1)`.
pub fn select_event(state: &GameState, roll: f64) -> Option<&'static EventDef> {
    let eligible = eligible_events(state);
    let first = *eligible.first()?;

    let weights: Vec<f64> = eligible
        .iter()
        .map(|e| modified_weight(e, state))
        .collect();
    let total: f64 = weights.iter().sum();

    let mut remaining = roll * total;
    for (event, weight) in eligible.iter().zip(&weights) {
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(*event);
        }
    }
    Some(first)
}

/// Percent chance that an event fires this turn.
pub fn trigger_chance(bonus: f64) -> f64 {
    BASE_TRIGGER_CHANCE + bonus
}

pub fn should_trigger(roll: f64, bonus: f64) -> bool {
    roll * 100.0 < trigger_chance(bonus)
}

pub fn event_by_id(id: &str) -> Option<&'static EventDef> {
    EVENTS.iter().find(|e| e.id == id)
}

pub fn apply_event(state: &GameState, event: &EventDef) -> GameState {
    apply_effects(state, &event.effects)
}

#[derive(Debug, Clone)]
pub struct EventOutcome {
    pub event: Option<&'static EventDef>,
    pub state: GameState,
}

/// Roll for and apply at most one event.
pub fn simulate_events(
    state: &GameState,
    trigger_roll: f64,
    select_roll: f64,
    bonus: f64,
) -> EventOutcome {
    let event = if should_trigger(trigger_roll, bonus) {
        select_event(state, select_roll)
    } else {
        None
    };

    let state = match event {
        Some(event) => apply_event(state, event),
        None => state.clone(),
    };
    EventOutcome { event, state }
}
