//! Property tests over arbitrary valid game states.
//!
//! Every subsystem must keep the state inside its domain no matter how the
//! inputs are combined.

use planet_logic::decisions::{self, Choice, DECISIONS};
use planet_logic::effects::{apply_effects, Effects};
use planet_logic::energy;
use planet_logic::environment;
use planet_logic::events::{self, EVENTS};
use planet_logic::society::{self, SocietyContext};
use planet_logic::state::{Capacity, EnergySource, GameState, Popularity, PopularityDelta};
use planet_logic::victory::{self, DefeatKind, GameResult};
use proptest::prelude::*;

fn arb_capacity() -> impl Strategy<Value = Capacity> {
    (0_u32..300, 0_u32..300, 0_u32..300, 0_u32..300, 0_u32..300).prop_map(
        |(solar, wind, hydro, geo, fossil)| Capacity {
            solar,
            wind,
            hydro,
            geo,
            fossil,
        },
    )
}

fn arb_popularity() -> impl Strategy<Value = Popularity> {
    (0_i32..=100, 0_i32..=100, 0_i32..=100).prop_map(|(poor, middle, rich)| Popularity {
        poor,
        middle,
        rich,
    })
}

prop_compose! {
    fn arb_state()(
        turn in 1_u32..60,
        credits in 0_i64..5_000,
        pollution in 0.0_f64..=100.0,
        temperature in 15.0_f64..=50.0,
        popularity in arb_popularity(),
        capacity in arb_capacity(),
        storage in 0_u32..=100,
        production in 0_i32..400,
        efficiency_bonus in -0.3_f64..0.3,
        renewable_bonus in -0.3_f64..0.3,
    ) -> GameState {
        let mut state = GameState::new();
        state.turn = turn;
        state.credits = credits;
        state.pollution = pollution;
        state.temperature = temperature;
        state.popularity = popularity;
        state.energy.capacity = capacity;
        state.energy.storage = storage;
        state.energy.production = production;
        state.energy.consumption = 50;
        state.efficiency_bonus = efficiency_bonus;
        state.renewable_bonus = renewable_bonus;
        state
    }
}

proptest! {
    #[test]
    fn efficiency_stays_in_unit_range(state in arb_state()) {
        for source in EnergySource::ALL {
            let eff = energy::effective_efficiency(source, &state);
            prop_assert!((0.0..=1.0).contains(&eff), "{:?} -> {}", source, eff);
        }
    }

    #[test]
    fn renewable_ratio_stays_in_unit_range(capacity in arb_capacity()) {
        let ratio = energy::renewable_ratio(&capacity);
        prop_assert!((0.0..=1.0).contains(&ratio));
        if capacity.total() == 0 {
            prop_assert_eq!(ratio, 0.0);
        }
    }

    #[test]
    fn idle_storage_decays_monotonically(start in 0_u32..=100) {
        let mut storage = start;
        for _ in 0..200 {
            let next = energy::update_storage(storage, 0, 0, 100);
            prop_assert!(next <= storage);
            storage = next;
        }
        prop_assert!(storage < 50);
    }

    #[test]
    fn environment_stays_in_domain(state in arb_state(), cleanup in any::<bool>()) {
        let generated = environment::generated_pollution(&state.energy.capacity, &state);
        let ratio = energy::renewable_ratio(&state.energy.capacity);
        let report = environment::update_environment(
            state.pollution,
            state.temperature,
            generated,
            ratio,
            cleanup,
        );
        prop_assert!((0.0..=100.0).contains(&report.pollution));
        prop_assert!((15.0..=50.0).contains(&report.temperature));
    }

    #[test]
    fn society_keeps_popularity_clamped(
        popularity in arb_popularity(),
        pollution in 0.0_f64..=100.0,
        temperature in 15.0_f64..=50.0,
        credits in 0_i64..2_000,
        production in 0_i32..200,
    ) {
        let ctx = SocietyContext { pollution, temperature, credits, production, consumption: 50 };
        let report = society::simulate_society(&popularity, &ctx);
        for value in [report.popularity.poor, report.popularity.middle, report.popularity.rich] {
            prop_assert!((0..=100).contains(&value));
        }
        prop_assert!((0.0..=100.0).contains(&report.revolt_probability));
    }

    #[test]
    fn random_effects_keep_state_valid(
        state in arb_state(),
        poor in -200_i32..200,
        middle in -200_i32..200,
        rich in -200_i32..200,
        credits in -10_000_i64..10_000,
        pollution in -200.0_f64..200.0,
        temperature in -100.0_f64..100.0,
    ) {
        let effects = Effects {
            credits,
            pollution,
            temperature,
            popularity: PopularityDelta::new(poor, middle, rich),
            ..Effects::NONE
        };
        let next = apply_effects(&state, &effects);
        prop_assert!(next.validate().is_ok(), "{:?}", next.validate());
    }

    #[test]
    fn every_event_keeps_state_valid(state in arb_state(), index in 0_usize..15) {
        let next = events::apply_event(&state, &EVENTS[index]);
        prop_assert!(next.validate().is_ok());
    }

    #[test]
    fn every_decision_keeps_state_valid(state in arb_state(), index in 0_usize..5, accept in any::<bool>()) {
        let choice = if accept { Choice::Accept } else { Choice::Reject };
        let decision = &DECISIONS[index];
        let next = decisions::apply_decision(&state, decision, choice);
        prop_assert!(next.validate().is_ok());
        prop_assert_eq!(next.cooldowns.decision, decision.cooldown);
    }

    #[test]
    fn selected_event_is_eligible(state in arb_state(), roll in 0.0_f64..1.0) {
        if let Some(event) = events::select_event(&state, roll) {
            prop_assert!(events::is_eligible(event, &state));
        }
    }

    #[test]
    fn decision_probability_capped(state in arb_state()) {
        let chance = decisions::decision_probability(&state);
        prop_assert!((10.0..=50.0).contains(&chance));
    }

    #[test]
    fn bankruptcy_wins_over_everything(state in arb_state()) {
        let mut state = state;
        state.credits = 0;
        prop_assert_eq!(
            victory::evaluate(&state),
            Some(GameResult::Defeat { kind: DefeatKind::Bankruptcy })
        );
    }

    #[test]
    fn score_is_bounded(state in arb_state()) {
        prop_assert!(victory::victory_score(&state) <= 100);
    }
}
