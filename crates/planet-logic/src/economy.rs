//! Treasury: class income, tax and subsidy, infrastructure upkeep.

use serde::{Deserialize, Serialize};

use crate::constants::{self, economy::*};
use crate::state::{Capacity, EnergySource, Popularity, SocialClass};

/// Income contributed by each class, `floor(popularity × rate)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassIncome {
    pub poor: i64,
    pub middle: i64,
    pub rich: i64,
}

impl ClassIncome {
    pub fn total(&self) -> i64 {
        self.poor + self.middle + self.rich
    }
}

pub fn income_by_class(popularity: &Popularity) -> ClassIncome {
    let income = |class: SocialClass| {
        (popularity.get(class) as f64 * constants::income_rate(class)).floor() as i64
    };
    ClassIncome {
        poor: income(SocialClass::Poor),
        middle: income(SocialClass::Middle),
        rich: income(SocialClass::Rich),
    }
}

pub fn base_income(popularity: &Popularity) -> i64 {
    income_by_class(popularity).total()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeModifiers {
    /// Net adjustment to base income (negative for tax).
    pub modifier: i64,
    /// `max(0, base + modifier)`.
    pub effective_income: i64,
    pub tax_rate: f64,
    pub subsidy_rate: f64,
}

/// Authoritarian tax when the rich are unhappy, subsidy when the poor are.
/// Both may apply at once.
pub fn apply_tax_subsidy(popularity: &Popularity, base_income: i64) -> IncomeModifiers {
    let taxed = popularity.rich < TAX_RICH_BELOW;
    let subsidized = popularity.poor < SUBSIDY_POOR_BELOW;

    let mut modifier = 0;
    if taxed {
        modifier -= (base_income as f64 * TAX_RATE).floor() as i64;
    }
    if subsidized {
        modifier += (base_income as f64 * SUBSIDY_RATE).floor() as i64;
    }

    IncomeModifiers {
        modifier,
        effective_income: (base_income + modifier).max(0),
        tax_rate: if taxed { TAX_RATE } else { 0.0 },
        subsidy_rate: if subsidized { SUBSIDY_RATE } else { 0.0 },
    }
}

/// Upkeep for installed capacity, floored per source.
pub fn maintenance_cost(capacity: &Capacity) -> i64 {
    EnergySource::ALL
        .iter()
        .map(|&source| {
            let mw = capacity.get(source) as f64;
            (mw / 10.0 * constants::maintenance_per_10mw(source)).floor() as i64
        })
        .sum()
}

/// `max(0, floor(credits + income − expenses))`.
pub fn update_credits(current: i64, income: i64, expenses: i64) -> i64 {
    (current + income - expenses).max(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyReport {
    pub base_income: i64,
    pub modifiers: IncomeModifiers,
    pub effective_income: i64,
    pub maintenance_cost: i64,
    /// Credits after the turn, never negative. Decision credits are applied
    /// later through `effects::apply_effects`.
    pub final_credits: i64,
}

impl EconomyReport {
    pub fn net_income(&self) -> i64 {
        self.effective_income - self.maintenance_cost
    }
}

pub fn simulate_economy(
    popularity: &Popularity,
    capacity: &Capacity,
    current_credits: i64,
) -> EconomyReport {
    let base = base_income(popularity);
    let modifiers = apply_tax_subsidy(popularity, base);
    let maintenance = maintenance_cost(capacity);
    let effective_income = modifiers.effective_income;
    let final_credits = update_credits(current_credits, effective_income, maintenance);

    EconomyReport {
        base_income: base,
        modifiers,
        effective_income,
        maintenance_cost: maintenance,
        final_credits,
    }
}

/// Advisory treasury band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicHealth {
    Critical,
    Worrying,
    Deficit,
    Stable,
    Prosperous,
}

pub fn economic_health(credits: i64, income: i64, expenses: i64) -> EconomicHealth {
    let balance = income - expenses;
    if credits < 100 {
        EconomicHealth::Critical
    } else if credits < 500 {
        EconomicHealth::Worrying
    } else if balance < 0 {
        EconomicHealth::Deficit
    } else if balance < 100 {
        EconomicHealth::Stable
    } else {
        EconomicHealth::Prosperous
    }
}
