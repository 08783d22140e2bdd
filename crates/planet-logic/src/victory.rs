//! End-of-game evaluation: defeat first, then victory tiers, then the score.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{defeat, victory::*};
use crate::energy;
use crate::state::GameState;

/// Ways to lose, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeatKind {
    Bankruptcy,
    EcologicalDisaster,
    ClimateCatastrophe,
    SocialRevolution,
    EnergyCrisis,
}

impl DefeatKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefeatKind::Bankruptcy => "bankruptcy",
            DefeatKind::EcologicalDisaster => "ecological_disaster",
            DefeatKind::ClimateCatastrophe => "climate_catastrophe",
            DefeatKind::SocialRevolution => "social_revolution",
            DefeatKind::EnergyCrisis => "energy_crisis",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DefeatKind::Bankruptcy => "National Bankruptcy",
            DefeatKind::EcologicalDisaster => "Ecological Disaster",
            DefeatKind::ClimateCatastrophe => "Climate Catastrophe",
            DefeatKind::SocialRevolution => "Social Revolution",
            DefeatKind::EnergyCrisis => "Energy Crisis",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            DefeatKind::Bankruptcy => "The treasury ran dry and the government collapsed.",
            DefeatKind::EcologicalDisaster => {
                "Pollution reached catastrophic levels. The planet is uninhabitable."
            }
            DefeatKind::ClimateCatastrophe => "Global warming made the planet uninhabitable.",
            DefeatKind::SocialRevolution => "The people rose up against an unpopular government.",
            DefeatKind::EnergyCrisis => "A critical energy deficit brought down the grid.",
        }
    }
}

impl fmt::Display for DefeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Victory tiers from most to least demanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryTier {
    SustainableComplete,
    Energetic,
    Partial,
}

impl VictoryTier {
    pub fn as_str(self) -> &'static str {
        match self {
            VictoryTier::SustainableComplete => "sustainable_complete",
            VictoryTier::Energetic => "energy_victory",
            VictoryTier::Partial => "partial_victory",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            VictoryTier::SustainableComplete => "Complete Sustainable Victory",
            VictoryTier::Energetic => "Energy Victory",
            VictoryTier::Partial => "Partial Victory",
        }
    }

    pub fn achievements(self) -> &'static [&'static str] {
        match self {
            VictoryTier::SustainableComplete => {
                &["Complete Transition", "Total Sustainability", "Social Harmony"]
            }
            VictoryTier::Energetic => &["Energy Abundance", "Robust Infrastructure"],
            VictoryTier::Partial => &["Balance Achieved", "Steady Progress"],
        }
    }
}

impl fmt::Display for VictoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GameResult {
    Defeat { kind: DefeatKind },
    Victory { tier: VictoryTier, score: u32 },
}

impl GameResult {
    pub fn is_victory(&self) -> bool {
        matches!(self, GameResult::Victory { .. })
    }

    pub fn id(&self) -> &'static str {
        match self {
            GameResult::Defeat { kind } => kind.as_str(),
            GameResult::Victory { tier, .. } => tier.as_str(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameResult::Defeat { kind } => kind.title(),
            GameResult::Victory { tier, .. } => tier.title(),
        }
    }
}

/// First matching defeat condition, if any.
pub fn check_defeat(state: &GameState) -> Option<DefeatKind> {
    if state.credits <= defeat::CREDITS_AT_OR_BELOW {
        return Some(DefeatKind::Bankruptcy);
    }
    if state.pollution >= defeat::POLLUTION_AT_OR_ABOVE {
        return Some(DefeatKind::EcologicalDisaster);
    }
    if state.temperature >= defeat::TEMPERATURE_AT_OR_ABOVE {
        return Some(DefeatKind::ClimateCatastrophe);
    }
    if state.average_popularity() <= defeat::AVG_POPULARITY_AT_OR_BELOW {
        return Some(DefeatKind::SocialRevolution);
    }
    if state.energy.consumption - state.energy.production >= defeat::DEFICIT_AT_OR_ABOVE {
        return Some(DefeatKind::EnergyCrisis);
    }
    None
}

/// Highest victory tier reached, if any.
pub fn check_victory(state: &GameState) -> Option<VictoryTier> {
    let ratio = energy::renewable_ratio(&state.energy.capacity);
    let average = state.average_popularity();
    let surplus = state.energy.balance();

    if state.pollution <= SUSTAINABLE_MAX_POLLUTION
        && ratio >= SUSTAINABLE_MIN_RENEWABLE_RATIO
        && average >= SUSTAINABLE_MIN_POPULARITY
        && state.turn <= SUSTAINABLE_MAX_TURN
    {
        return Some(VictoryTier::SustainableComplete);
    }
    if surplus >= ENERGETIC_MIN_SURPLUS
        && state.pollution <= ENERGETIC_MAX_POLLUTION
        && state.turn <= ENERGETIC_MAX_TURN
    {
        return Some(VictoryTier::Energetic);
    }
    if state.pollution <= PARTIAL_MAX_POLLUTION
        && average >= PARTIAL_MIN_POPULARITY
        && state.credits >= PARTIAL_MIN_CREDITS
        && state.turn <= PARTIAL_MAX_TURN
    {
        return Some(VictoryTier::Partial);
    }
    None
}

/// Composite score in `[0, 100]`.
pub fn victory_score(state: &GameState) -> u32 {
    let mut score = 0;

    score += match state.pollution {
        p if p <= 20.0 => 30,
        p if p <= 40.0 => 20,
        p if p <= 60.0 => 10,
        _ => 0,
    };

    score += match state.energy.balance() {
        s if s >= 20 => 25,
        s if s >= 0 => 15,
        _ => 5,
    };

    score += match state.average_popularity() {
        a if a >= 80.0 => 25,
        a if a >= 60.0 => 15,
        a if a >= 40.0 => 10,
        _ => 0,
    };

    score += match state.credits {
        c if c >= 1000 => 20,
        c if c >= 500 => 10,
        _ => 0,
    };

    score += SCORE_TURN_HORIZON.saturating_sub(state.turn) / 2;

    score.min(MAX_SCORE)
}

/// Defeat takes priority; `None` means the game goes on.
pub fn evaluate(state: &GameState) -> Option<GameResult> {
    if let Some(kind) = check_defeat(state) {
        return Some(GameResult::Defeat { kind });
    }
    check_victory(state).map(|tier| GameResult::Victory {
        tier,
        score: victory_score(state),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcologyRating {
    Excellent,
    Good,
    Fair,
    Poor,
    Disastrous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocietyRating {
    Harmonious,
    Stable,
    Tense,
    Unstable,
    Chaotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomyRating {
    Prosperous,
    Stable,
    Worrying,
    Critical,
}

pub fn ecology_rating(pollution: f64, temperature: f64) -> EcologyRating {
    if pollution <= 10.0 && temperature <= 20.0 {
        EcologyRating::Excellent
    } else if pollution <= 30.0 && temperature <= 25.0 {
        EcologyRating::Good
    } else if pollution <= 50.0 && temperature <= 30.0 {
        EcologyRating::Fair
    } else if pollution <= 70.0 && temperature <= 35.0 {
        EcologyRating::Poor
    } else {
        EcologyRating::Disastrous
    }
}

pub fn society_rating(average_popularity: f64) -> SocietyRating {
    if average_popularity >= 80.0 {
        SocietyRating::Harmonious
    } else if average_popularity >= 60.0 {
        SocietyRating::Stable
    } else if average_popularity >= 40.0 {
        SocietyRating::Tense
    } else if average_popularity >= 20.0 {
        SocietyRating::Unstable
    } else {
        SocietyRating::Chaotic
    }
}

pub fn economy_rating(credits: i64) -> EconomyRating {
    if credits >= 1000 {
        EconomyRating::Prosperous
    } else if credits >= 500 {
        EconomyRating::Stable
    } else if credits >= 200 {
        EconomyRating::Worrying
    } else {
        EconomyRating::Critical
    }
}

/// Summary shown once the game ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub turns_survived: u32,
    pub credits: i64,
    pub pollution: f64,
    pub temperature: f64,
    pub average_popularity: f64,
    pub total_capacity: u32,
    pub renewable_capacity: u32,
    pub renewable_ratio: f64,
    pub production: i32,
    pub consumption: i32,
    pub storage: u32,
    pub victory: bool,
    pub ecology: EcologyRating,
    pub society: SocietyRating,
    pub economy: EconomyRating,
}

impl FinalReport {
    pub fn closing_message(&self, result: &GameResult) -> String {
        if self.victory {
            format!(
                "Congratulations! You achieved a {} in {} turns. The planet thrives under your leadership.",
                result.title(),
                self.turns_survived
            )
        } else {
            format!(
                "Your government fell after {} turns ({}). Future leaders will learn from it.",
                self.turns_survived,
                result.title()
            )
        }
    }
}

pub fn final_report(state: &GameState, result: &GameResult) -> FinalReport {
    let capacity = &state.energy.capacity;
    let average = state.average_popularity();
    FinalReport {
        turns_survived: state.turn,
        credits: state.credits,
        pollution: state.pollution,
        temperature: state.temperature,
        average_popularity: average,
        total_capacity: capacity.total(),
        renewable_capacity: capacity.renewable_total(),
        renewable_ratio: energy::renewable_ratio(capacity),
        production: state.energy.production,
        consumption: state.energy.consumption,
        storage: state.energy.storage,
        victory: result.is_victory(),
        ecology: ecology_rating(state.pollution, state.temperature),
        society: society_rating(average),
        economy: economy_rating(state.credits),
    }
}
