//! Scripted accept/reject dilemmas aimed at the most disgruntled class.
//!
//! A decision can surface only when the shared cooldown is zero and its own
//! predicate holds. Resolving one restarts the cooldown with that decision's
//! value, which blocks every decision until it runs out.

use serde::{Deserialize, Serialize};

use crate::constants::decisions::*;
use crate::effects::{apply_effects, Effects};
use crate::state::{CapacityDelta, GameState, PopularityDelta, SocialClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionCategory {
    Economic,
    Social,
    Environmental,
    Technological,
}

#[derive(Debug, Clone, Copy)]
pub struct DecisionDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub target_class: SocialClass,
    pub accept: Effects,
    pub reject: Effects,
    /// Turns every decision stays blocked after this one is resolved.
    pub cooldown: u32,
    pub category: DecisionCategory,
    pub predicate: fn(&GameState) -> bool,
}

impl DecisionDef {
    pub fn effects(&self, choice: Choice) -> &Effects {
        match choice {
            Choice::Accept => &self.accept,
            Choice::Reject => &self.reject,
        }
    }
}

pub static DECISIONS: [DecisionDef; 5] = [
    DecisionDef {
        id: "corporate_pressure",
        title: "Corporate Pressure",
        description: "Fossil energy companies offer a generous payment to keep the old plants running.",
        target_class: SocialClass::Rich,
        accept: Effects {
            credits: 200,
            popularity: PopularityDelta::new(-5, -2, 10),
            capacity: CapacityDelta {
                fossil: 5,
                ..CapacityDelta::ZERO
            },
            ..Effects::NONE
        },
        reject: Effects {
            popularity: PopularityDelta::new(5, 2, -5),
            ..Effects::NONE
        },
        cooldown: 3,
        category: DecisionCategory::Economic,
        predicate: |s| s.energy.capacity.fossil > 20 && s.credits < 500,
    },
    DecisionDef {
        id: "green_initiative",
        title: "Green Initiative",
        description: "A grassroots movement demands an immediate, heavily funded switch to renewables.",
        target_class: SocialClass::Poor,
        accept: Effects {
            popularity: PopularityDelta::new(15, 5, 0),
            renewable_bonus: 0.1,
            credits: -150,
            ..Effects::NONE
        },
        reject: Effects {
            popularity: PopularityDelta::new(-10, -5, 0),
            renewable_bonus: -0.05,
            ..Effects::NONE
        },
        cooldown: 3,
        category: DecisionCategory::Social,
        predicate: |s| {
            s.popularity.poor < 40 && s.energy.capacity.solar + s.energy.capacity.wind < 50
        },
    },
    DecisionDef {
        id: "climate_summit",
        title: "Climate Summit",
        description: "An international conference proposes ambitious emission targets.",
        target_class: SocialClass::Middle,
        accept: Effects {
            pollution: -5.0,
            international_aid: 100,
            popularity: PopularityDelta::new(0, 8, 0),
            ..Effects::NONE
        },
        reject: Effects {
            temperature: 2.0,
            pollution: 3.0,
            credits: -50,
            ..Effects::NONE
        },
        cooldown: 4,
        category: DecisionCategory::Environmental,
        predicate: |s| (s.pollution > 40.0 || s.temperature > 28.0) && s.turn >= 5,
    },
    DecisionDef {
        id: "tech_breakthrough",
        title: "Technology Breakthrough",
        description: "Researchers have found a new way to store energy. Funding it is expensive.",
        target_class: SocialClass::Rich,
        accept: Effects {
            storage_capacity: 20,
            efficiency_bonus: 0.1,
            credits: -200,
            ..Effects::NONE
        },
        reject: Effects {
            credits: -50,
            efficiency_bonus: -0.05,
            ..Effects::NONE
        },
        cooldown: 5,
        category: DecisionCategory::Technological,
        predicate: |s| s.energy.storage < 30 && s.credits >= 300,
    },
    DecisionDef {
        id: "economic_crisis",
        title: "Economic Crisis",
        description: "A global recession hits energy investment. Intervene with subsidies or let the market settle.",
        target_class: SocialClass::Middle,
        accept: Effects {
            credits: -100,
            capacity: CapacityDelta {
                fossil: -10,
                ..CapacityDelta::ZERO
            },
            popularity: PopularityDelta::new(5, 10, 0),
            ..Effects::NONE
        },
        reject: Effects {
            credits: -200,
            popularity: PopularityDelta::new(0, -10, 0),
            renewable_bonus: -0.1,
            ..Effects::NONE
        },
        cooldown: 2,
        category: DecisionCategory::Economic,
        predicate: |s| s.credits < 300 && s.energy.capacity.fossil > 30,
    },
];

/// Cooldown elapsed and the decision's own predicate holds.
pub fn is_available(decision: &DecisionDef, state: &GameState) -> bool {
    state.cooldowns.decision == 0 && (decision.predicate)(state)
}

pub fn available_decisions(state: &GameState) -> Vec<&'static DecisionDef> {
    DECISIONS.iter().filter(|d| is_available(d, state)).collect()
}

/// The class trailing the average by the widest margin (more than 10 points,
/// no tie). Otherwise a contextual guess.
pub fn target_class(state: &GameState) -> SocialClass {
    let average = state.average_popularity();
    let deficits = SocialClass::ALL.map(|class| (class, average - state.popularity.get(class) as f64));

    let mut best: Option<(SocialClass, f64)> = None;
    let mut tied = false;
    for (class, deficit) in deficits {
        if deficit <= TARGET_DEVIATION {
            continue;
        }
        match best {
            Some((_, top)) if deficit == top => tied = true,
            Some((_, top)) if deficit < top => {}
            _ => {
                best = Some((class, deficit));
                tied = false;
            }
        }
    }
    if let (Some((class, _)), false) = (best, tied) {
        return class;
    }

    if state.pollution > 60.0 {
        SocialClass::Middle
    } else if state.credits < 200 {
        SocialClass::Rich
    } else if state.energy.production < state.energy.consumption {
        SocialClass::Poor
    } else {
        SocialClass::Middle
    }
}

/// Percent chance that a decision surfaces this turn, capped at 50.
pub fn decision_probability(state: &GameState) -> f64 {
    let mut chance = BASE_CHANCE;

    let target = target_class(state);
    if state.popularity.get(target) < LOW_POPULARITY_BELOW {
        chance += LOW_POPULARITY_BONUS;
    }
    if state.pollution > CRISIS_POLLUTION_ABOVE || state.energy.balance() < CRISIS_DEFICIT_BELOW {
        chance += CRISIS_BONUS;
    }

    chance.min(MAX_CHANCE)
}

/// Pick uniformly among available decisions aimed at the target class, or
/// among all available ones when none are. `roll` is uniform in `[0, 1)`.
pub fn select_decision(state: &GameState, roll: f64) -> Option<&'static DecisionDef> {
    let available = available_decisions(state);
    if available.is_empty() {
        return None;
    }

    let target = target_class(state);
    let targeted: Vec<_> = available
        .iter()
        .copied()
        .filter(|d| d.target_class == target)
        .collect();
    let pool = if targeted.is_empty() {
        &available
    } else {
        &targeted
    };

    let index = ((roll * pool.len() as f64) as usize).min(pool.len() - 1);
    pool.get(index).copied()
}

/// Cooldown check, probability roll, then selection.
pub fn should_show_decision(
    state: &GameState,
    trigger_roll: f64,
    select_roll: f64,
) -> Option<&'static DecisionDef> {
    if state.cooldowns.decision > 0 {
        return None;
    }
    if trigger_roll * 100.0 >= decision_probability(state) {
        return None;
    }
    select_decision(state, select_roll)
}

/// Apply the chosen branch and restart the shared cooldown.
pub fn apply_decision(state: &GameState, decision: &DecisionDef, choice: Choice) -> GameState {
    let mut next = apply_effects(state, decision.effects(choice));
    next.cooldowns.decision = decision.cooldown;
    next
}

pub fn decision_by_id(id: &str) -> Option<&'static DecisionDef> {
    DECISIONS.iter().find(|d| d.id == id)
}
