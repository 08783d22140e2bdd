//! Class popularity: action reactions, long-term drift, migration and unrest.

use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::state::{Popularity, PopularityDelta, SocialClass};

/// How each class reacts to a player action.
pub fn action_popularity(kind: ActionKind) -> PopularityDelta {
    match kind {
        ActionKind::ExpandSolar => PopularityDelta::new(0, 3, 1),
        ActionKind::ExpandWind => PopularityDelta::new(2, 2, 1),
        ActionKind::ExpandHydro => PopularityDelta::new(-1, 1, 2),
        ActionKind::ExpandGeo => PopularityDelta::new(0, 2, 2),
        ActionKind::ExpandFossil => PopularityDelta::new(-3, -1, 5),
        ActionKind::ReduceFossil => PopularityDelta::new(4, 2, -3),
        ActionKind::InvestResearch => PopularityDelta::new(0, 3, 2),
        ActionKind::PublicCampaign => PopularityDelta::new(3, 1, 0),
        ActionKind::EnvironmentalProgram => PopularityDelta::new(4, 3, -2),
    }
}

/// Conditions the drift step reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocietyContext {
    pub pollution: f64,
    pub temperature: f64,
    pub credits: i64,
    pub production: i32,
    pub consumption: i32,
}

/// Slow erosion of approval under environmental, fiscal and grid stress.
pub fn long_term_drift(ctx: &SocietyContext) -> PopularityDelta {
    let mut drift = PopularityDelta::ZERO;

    if ctx.pollution > 50.0 {
        drift.poor -= (ctx.pollution / 20.0).floor() as i32;
        drift.middle -= (ctx.pollution / 30.0).floor() as i32;
    }
    if ctx.temperature > 35.0 {
        let excess = ctx.temperature - 35.0;
        drift.poor -= (excess / 2.0).floor() as i32;
        drift.middle -= (excess / 3.0).floor() as i32;
    }
    if ctx.credits < 200 {
        drift.poor -= 2;
        drift.middle -= 1;
    }
    if ctx.production - ctx.consumption < -10 {
        drift = drift.combined(PopularityDelta::new(-2, -1, -1));
    }

    drift
}

/// Movement between classes. A squeezed middle class falling into poverty
/// takes precedence over poor emigration.
pub fn class_migration(popularity: &Popularity) -> PopularityDelta {
    let mut migration = PopularityDelta::ZERO;

    if popularity.poor < 20 {
        migration.poor = -1;
    }
    if popularity.middle < 30 {
        migration.middle = -1;
        migration.poor = 1;
    } else if popularity.middle > 80 {
        migration.middle = -1;
        migration.rich = 1;
    }

    migration
}

/// Percent chance of revolt: 0 at an average of 60 or more, rising linearly
/// to 100 at 20 or less.
pub fn revolt_probability(popularity: &Popularity) -> f64 {
    ((60.0 - popularity.average()) / 40.0 * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Satisfaction {
    Satisfied,
    Neutral,
    Dissatisfied,
    Revolting,
}

impl Satisfaction {
    pub fn from_popularity(value: i32) -> Self {
        if value >= 70 {
            Satisfaction::Satisfied
        } else if value >= 50 {
            Satisfaction::Neutral
        } else if value >= 30 {
            Satisfaction::Dissatisfied
        } else {
            Satisfaction::Revolting
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSatisfaction {
    pub poor: Satisfaction,
    pub middle: Satisfaction,
    pub rich: Satisfaction,
    pub overall: Satisfaction,
}

impl ClassSatisfaction {
    pub fn get(&self, class: SocialClass) -> Satisfaction {
        match class {
            SocialClass::Poor => self.poor,
            SocialClass::Middle => self.middle,
            SocialClass::Rich => self.rich,
        }
    }
}

pub fn satisfaction(popularity: &Popularity) -> ClassSatisfaction {
    ClassSatisfaction {
        poor: Satisfaction::from_popularity(popularity.poor),
        middle: Satisfaction::from_popularity(popularity.middle),
        rich: Satisfaction::from_popularity(popularity.rich),
        overall: Satisfaction::from_popularity(popularity.average().round() as i32),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocietyReport {
    pub popularity: Popularity,
    pub average: f64,
    pub satisfaction: ClassSatisfaction,
    pub revolt_probability: f64,
    pub drift: PopularityDelta,
    pub migration: PopularityDelta,
}

/// Drift, then migration on the drifted values, then one clamp.
pub fn simulate_society(popularity: &Popularity, ctx: &SocietyContext) -> SocietyReport {
    let drift = long_term_drift(ctx);
    let drifted = popularity.shifted(drift);
    let migration = class_migration(&drifted);
    let next = drifted.shifted(migration).clamped();

    SocietyReport {
        popularity: next,
        average: next.average(),
        satisfaction: satisfaction(&next),
        revolt_probability: revolt_probability(&next),
        drift,
        migration,
    }
}
