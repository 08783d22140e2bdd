//! Pure simulation rules for Planet 2500.
//!
//! This crate contains every rule of the planetary simulation that is
//! independent of any engine, RNG or storage. Functions take plain data and
//! return results; randomness arrives as caller-supplied rolls in `[0, 1)`.
//! That keeps every subsystem unit-testable and lets the turn engine replay
//! games exactly from a seed.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actions`] | Player actions: validation, costs, capacity changes, fossil phase-out |
//! | [`constants`] | Efficiencies, pollution rates, costs and win/loss thresholds |
//! | [`decisions`] | Cooldown-gated accept/reject dilemmas aimed at the unhappiest class |
//! | [`economy`] | Class income, tax and subsidy, maintenance, treasury health |
//! | [`effects`] | Partial state deltas shared by events and decisions |
//! | [`energy`] | Effective production, demand, storage and renewable ratio |
//! | [`environment`] | Pollution accumulation, purification and warming |
//! | [`events`] | Random event catalog and weighted selection |
//! | [`society`] | Popularity drift, class migration, revolt risk |
//! | [`state`] | `GameState` and its invariants, the in-game log |
//! | [`victory`] | Defeat priority, victory tiers, score and final report |

pub mod actions;
pub mod constants;
pub mod decisions;
pub mod economy;
pub mod effects;
pub mod energy;
pub mod environment;
pub mod events;
pub mod society;
pub mod state;
pub mod victory;
