//! Property tests for the line follower state table.

use line_follower::fsm::StateName;
use line_follower::{InvalidSymbolError, StateId, build_state_table};
use proptest::prelude::*;

prop_compose! {
    fn any_state()(name in prop::sample::select(StateName::ALL.to_vec())) -> StateId {
        name.id()
    }
}

proptest! {
    #[test]
    fn step_is_deterministic(state in any_state(), symbol in 0u8..4) {
        let table = build_state_table().unwrap();
        let first = table.step(state, symbol);
        let second = table.step(state, symbol);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn step_outputs_the_state_being_left(state in any_state(), symbol in 0u8..4) {
        let table = build_state_table().unwrap();
        let row = table.state(state).unwrap();
        let step = table.step(state, symbol).unwrap();
        prop_assert_eq!(step.output, row.output);
        prop_assert_eq!(step.dwell_ms, row.dwell_ms);
        prop_assert_eq!(step.next, row.next[symbol as usize]);
        prop_assert!(table.state(step.next).is_some());
    }

    #[test]
    fn out_of_range_symbols_never_wrap(state in any_state(), symbol in 4u8..) {
        let table = build_state_table().unwrap();
        prop_assert_eq!(table.step(state, symbol), Err(InvalidSymbolError { symbol }));
    }

    #[test]
    fn any_input_sequence_stays_in_the_table(symbols in prop::collection::vec(0u8..4, 0..64)) {
        let table = build_state_table().unwrap();
        let mut current = table.initial();
        for symbol in symbols {
            current = table.step(current, symbol).unwrap().next;
            prop_assert!(StateName::from_id(current).is_some());
        }
    }

    #[test]
    fn on_line_input_returns_to_center_within_two_steps(state in any_state()) {
        let table = build_state_table().unwrap();
        let once = table.step(state, 3).unwrap().next;
        let twice = table.step(once, 3).unwrap().next;
        prop_assert_eq!(twice, StateName::Center.id());
    }
}
