//! Game state, the single root every subsystem reads from.
//!
//! `GameState` is plain data. The turn engine owns the authoritative copy and
//! replaces it wholesale after each committed transition; subsystems only ever
//! see borrowed slices and return results.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{bounds, energy as energy_consts, LOG_CAPACITY};

/// The five installable energy sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergySource {
    Solar,
    Wind,
    Hydro,
    Geo,
    Fossil,
}

impl EnergySource {
    pub const ALL: [EnergySource; 5] = [
        EnergySource::Solar,
        EnergySource::Wind,
        EnergySource::Hydro,
        EnergySource::Geo,
        EnergySource::Fossil,
    ];

    pub const RENEWABLE: [EnergySource; 4] = [
        EnergySource::Solar,
        EnergySource::Wind,
        EnergySource::Hydro,
        EnergySource::Geo,
    ];

    pub fn is_renewable(self) -> bool {
        self != EnergySource::Fossil
    }

    pub fn name(self) -> &'static str {
        match self {
            EnergySource::Solar => "solar",
            EnergySource::Wind => "wind",
            EnergySource::Hydro => "hydro",
            EnergySource::Geo => "geo",
            EnergySource::Fossil => "fossil",
        }
    }
}

/// The three social classes whose approval drives income and stability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialClass {
    Poor,
    Middle,
    Rich,
}

impl SocialClass {
    pub const ALL: [SocialClass; 3] = [SocialClass::Poor, SocialClass::Middle, SocialClass::Rich];

    pub fn name(self) -> &'static str {
        match self {
            SocialClass::Poor => "poor",
            SocialClass::Middle => "middle",
            SocialClass::Rich => "rich",
        }
    }
}

/// Installed capacity per source, in MW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capacity {
    pub solar: u32,
    pub wind: u32,
    pub hydro: u32,
    pub geo: u32,
    pub fossil: u32,
}

impl Capacity {
    pub fn get(&self, source: EnergySource) -> u32 {
        match source {
            EnergySource::Solar => self.solar,
            EnergySource::Wind => self.wind,
            EnergySource::Hydro => self.hydro,
            EnergySource::Geo => self.geo,
            EnergySource::Fossil => self.fossil,
        }
    }

    fn slot_mut(&mut self, source: EnergySource) -> &mut u32 {
        match source {
            EnergySource::Solar => &mut self.solar,
            EnergySource::Wind => &mut self.wind,
            EnergySource::Hydro => &mut self.hydro,
            EnergySource::Geo => &mut self.geo,
            EnergySource::Fossil => &mut self.fossil,
        }
    }

    /// Add a signed delta to one source. Capacity never goes below zero.
    pub fn adjust(&mut self, source: EnergySource, delta: i32) {
        let slot = self.slot_mut(source);
        *slot = slot.saturating_add_signed(delta);
    }

    /// Apply a per-source delta.
    pub fn apply(&mut self, delta: &CapacityDelta) {
        for source in EnergySource::ALL {
            self.adjust(source, delta.get(source));
        }
    }

    pub fn total(&self) -> u32 {
        EnergySource::ALL.iter().map(|s| self.get(*s)).sum()
    }

    pub fn renewable_total(&self) -> u32 {
        EnergySource::RENEWABLE.iter().map(|s| self.get(*s)).sum()
    }
}

/// Signed per-source capacity change carried by effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapacityDelta {
    pub solar: i32,
    pub wind: i32,
    pub hydro: i32,
    pub geo: i32,
    pub fossil: i32,
}

impl CapacityDelta {
    pub const ZERO: CapacityDelta = CapacityDelta {
        solar: 0,
        wind: 0,
        hydro: 0,
        geo: 0,
        fossil: 0,
    };

    pub fn get(&self, source: EnergySource) -> i32 {
        match source {
            EnergySource::Solar => self.solar,
            EnergySource::Wind => self.wind,
            EnergySource::Hydro => self.hydro,
            EnergySource::Geo => self.geo,
            EnergySource::Fossil => self.fossil,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Approval per class, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popularity {
    pub poor: i32,
    pub middle: i32,
    pub rich: i32,
}

impl Default for Popularity {
    fn default() -> Self {
        Self {
            poor: 50,
            middle: 50,
            rich: 50,
        }
    }
}

impl Popularity {
    pub fn get(&self, class: SocialClass) -> i32 {
        match class {
            SocialClass::Poor => self.poor,
            SocialClass::Middle => self.middle,
            SocialClass::Rich => self.rich,
        }
    }

    /// Add a delta without clamping. Callers clamp once the compound update is done.
    pub fn shifted(&self, delta: PopularityDelta) -> Popularity {
        Popularity {
            poor: self.poor + delta.poor,
            middle: self.middle + delta.middle,
            rich: self.rich + delta.rich,
        }
    }

    pub fn clamped(&self) -> Popularity {
        let (lo, hi) = (bounds::POPULARITY_MIN, bounds::POPULARITY_MAX);
        Popularity {
            poor: self.poor.clamp(lo, hi),
            middle: self.middle.clamp(lo, hi),
            rich: self.rich.clamp(lo, hi),
        }
    }

    /// Shift then clamp, the common case for one-shot effects.
    pub fn apply(&self, delta: PopularityDelta) -> Popularity {
        self.shifted(delta).clamped()
    }

    /// Unrounded mean of the three classes.
    pub fn average(&self) -> f64 {
        (self.poor + self.middle + self.rich) as f64 / 3.0
    }
}

/// Signed per-class popularity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopularityDelta {
    pub poor: i32,
    pub middle: i32,
    pub rich: i32,
}

impl PopularityDelta {
    pub const ZERO: PopularityDelta = PopularityDelta::new(0, 0, 0);

    pub const fn new(poor: i32, middle: i32, rich: i32) -> Self {
        Self { poor, middle, rich }
    }

    pub fn combined(self, other: PopularityDelta) -> PopularityDelta {
        PopularityDelta {
            poor: self.poor + other.poor,
            middle: self.middle + other.middle,
            rich: self.rich + other.rich,
        }
    }
}

/// Energy grid state. `production` and `consumption` are the values realized
/// on the most recent turn; both are zero before the first turn runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyState {
    pub capacity: Capacity,
    pub storage: u32,
    pub max_storage: u32,
    pub consumption_base: i32,
    pub production: i32,
    pub consumption: i32,
}

impl Default for EnergyState {
    fn default() -> Self {
        Self {
            capacity: Capacity {
                fossil: 50,
                ..Default::default()
            },
            storage: 0,
            max_storage: energy_consts::DEFAULT_MAX_STORAGE,
            consumption_base: energy_consts::CONSUMPTION_BASE,
            production: 0,
            consumption: 0,
        }
    }
}

impl EnergyState {
    /// Production minus consumption for the last simulated turn.
    pub fn balance(&self) -> i32 {
        self.production - self.consumption
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cooldowns {
    /// Turns remaining before any scripted decision may trigger again.
    pub decision: u32,
}

/// Severity tag for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Seconds since the unix epoch when the entry was recorded.
    pub timestamp: u64,
    pub message: String,
    pub kind: LogKind,
}

/// Ring buffer of the most recent `LOG_CAPACITY` entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameLog {
    entries: VecDeque<LogEntry>,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, kind: LogKind) {
        self.push_entry(LogEntry {
            timestamp: unix_now(),
            message: message.into(),
            kind,
        });
    }

    pub fn push_entry(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub turn: u32,
    pub credits: i64,
    /// Pollution index in `[0, 100]`.
    pub pollution: f64,
    /// Mean temperature in °C, in `[15, 50]`.
    pub temperature: f64,
    pub popularity: Popularity,
    pub energy: EnergyState,
    pub cooldowns: Cooldowns,
    /// Turns left on an active cleanup program.
    pub cleanup_turns: u32,
    /// Permanent efficiency modifier accumulated from events and decisions.
    pub efficiency_bonus: f64,
    /// Permanent renewable modifier accumulated from decisions.
    pub renewable_bonus: f64,
    pub logs: GameLog,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            turn: 1,
            credits: 1000,
            pollution: 0.0,
            temperature: 20.0,
            popularity: Popularity::default(),
            energy: EnergyState::default(),
            cooldowns: Cooldowns::default(),
            cleanup_turns: 0,
            efficiency_bonus: 0.0,
            renewable_bonus: 0.0,
            logs: GameLog::new(),
        }
    }
}

/// Invariant violations detected when adopting an external state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("turn must be >= 1, found {0}")]
    InvalidTurn(u32),
    #[error("credits must be >= 0, found {0}")]
    NegativeCredits(i64),
    #[error("pollution must be within [0, 100], found {0}")]
    PollutionOutOfRange(f64),
    #[error("temperature must be within [15, 50], found {0}")]
    TemperatureOutOfRange(f64),
    #[error("{class} popularity must be within [0, 100], found {value}")]
    PopularityOutOfRange { class: &'static str, value: i32 },
    #[error("storage {storage} exceeds max storage {max}")]
    StorageOverflow { storage: u32, max: u32 },
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

impl GameState {
    /// Fresh game: turn 1, 1000 credits, clean air, 50 MW of fossil power.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn average_popularity(&self) -> f64 {
        self.popularity.average()
    }

    /// Check the invariants every committed state must satisfy.
    pub fn validate(&self) -> Result<(), StateError> {
        for (name, value) in [
            ("pollution", self.pollution),
            ("temperature", self.temperature),
            ("efficiency_bonus", self.efficiency_bonus),
            ("renewable_bonus", self.renewable_bonus),
        ] {
            if !value.is_finite() {
                return Err(StateError::NonFinite(name));
            }
        }
        if self.turn < 1 {
            return Err(StateError::InvalidTurn(self.turn));
        }
        if self.credits < 0 {
            return Err(StateError::NegativeCredits(self.credits));
        }
        if !(bounds::POLLUTION_MIN..=bounds::POLLUTION_MAX).contains(&self.pollution) {
            return Err(StateError::PollutionOutOfRange(self.pollution));
        }
        if !(bounds::TEMPERATURE_MIN..=bounds::TEMPERATURE_MAX).contains(&self.temperature) {
            return Err(StateError::TemperatureOutOfRange(self.temperature));
        }
        for class in SocialClass::ALL {
            let value = self.popularity.get(class);
            if !(bounds::POPULARITY_MIN..=bounds::POPULARITY_MAX).contains(&value) {
                return Err(StateError::PopularityOutOfRange {
                    class: class.name(),
                    value,
                });
            }
        }
        if self.energy.storage > self.energy.max_storage {
            return Err(StateError::StorageOverflow {
                storage: self.energy.storage,
                max: self.energy.max_storage,
            });
        }
        Ok(())
    }
}
