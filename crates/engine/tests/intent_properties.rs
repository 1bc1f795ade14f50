//! Property tests for input sequences against the calculator engine.

use calc_engine::calculator::{format_number, parse_number};
use calc_engine::{CalculatorEngine, Digit, Intent, Operator};
use proptest::prelude::*;

// ===== Strategy definitions =====

fn digit_strategy() -> impl Strategy<Value = Digit> {
    (0u8..=9u8).prop_map(|n| Digit::new(n).unwrap())
}

fn operator_strategy() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Add),
        Just(Operator::Subtract),
        Just(Operator::Multiply),
        Just(Operator::Divide),
    ]
}

/// Digit or decimal point, i.e. number entry only.
fn entry_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        4 => digit_strategy().prop_map(Intent::Digit),
        1 => Just(Intent::Decimal),
    ]
}

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        6 => digit_strategy().prop_map(Intent::Digit),
        1 => Just(Intent::Decimal),
        3 => operator_strategy().prop_map(Intent::Operator),
        2 => Just(Intent::Equals),
        1 => Just(Intent::Clear),
        1 => Just(Intent::ClearAll),
        1 => Just(Intent::ToggleHistory),
    ]
}

/// Buffer text the engine should hold after typing `entries` from scratch.
fn expected_buffer(entries: &[Intent]) -> String {
    let mut buf = String::from("0");
    for intent in entries {
        match intent {
            Intent::Digit(d) if buf == "0" => buf = d.to_string(),
            Intent::Digit(d) => buf.push_str(&d.to_string()),
            Intent::Decimal if !buf.contains('.') => buf.push('.'),
            _ => {}
        }
    }
    buf
}

// ===== Number entry =====

proptest! {
    /// Typing digits collapses leading zeros and never admits a second '.'.
    #[test]
    fn prop_entry_builds_literal(entries in prop::collection::vec(entry_strategy(), 0..24)) {
        let mut calc = CalculatorEngine::new();
        for intent in &entries {
            calc.apply_intent(*intent);
        }
        prop_assert_eq!(calc.input(), expected_buffer(&entries));
        prop_assert_eq!(calc.display(), calc.input());
        prop_assert!(calc.input().matches('.').count() <= 1);
        prop_assert!(calc.history().is_empty());
    }
}

// ===== Whole-session invariants =====

proptest! {
    /// The buffer never holds two decimal points, whatever the sequence.
    #[test]
    fn prop_single_decimal_point(intents in prop::collection::vec(intent_strategy(), 0..48)) {
        let mut calc = CalculatorEngine::new();
        for intent in intents {
            calc.apply_intent(intent);
            prop_assert!(calc.input().matches('.').count() <= 1);
        }
    }

    /// History grows by one on equals-while-pending, or on an operator press
    /// while pending with a non-zero left operand.
    #[test]
    fn prop_history_tracks_completed_operations(intents in prop::collection::vec(intent_strategy(), 0..48)) {
        let mut calc = CalculatorEngine::new();
        for intent in intents {
            let before = calc.history().len();
            let pending = calc.pending_operator().is_some();
            let chains = calc.accumulated_value().is_some_and(|v| v != 0.0);
            calc.apply_intent(intent);
            let after = calc.history().len();
            match intent {
                Intent::Operator(_) if chains => prop_assert_eq!(after, before + 1),
                Intent::Equals if pending => prop_assert_eq!(after, before + 1),
                Intent::ClearAll => prop_assert_eq!(after, 0),
                _ => prop_assert_eq!(after, before),
            }
        }
    }

    /// clear is idempotent and keeps history; clear_all always empties it.
    #[test]
    fn prop_clear_semantics(intents in prop::collection::vec(intent_strategy(), 0..48)) {
        let mut calc = CalculatorEngine::new();
        for intent in intents {
            calc.apply_intent(intent);
        }
        let history = calc.history().to_vec();
        calc.clear();
        let once = calc.snapshot();
        calc.clear();
        prop_assert_eq!(calc.snapshot(), once);
        prop_assert_eq!(calc.history(), history.as_slice());
        prop_assert_eq!(calc.display(), "0");

        calc.clear_all();
        prop_assert!(calc.history().is_empty());
    }

    /// Toggling the history view twice is invisible to calculation state.
    #[test]
    fn prop_toggle_twice_restores(intents in prop::collection::vec(intent_strategy(), 0..32)) {
        let mut calc = CalculatorEngine::new();
        for intent in intents {
            calc.apply_intent(intent);
        }
        let before = calc.snapshot();
        calc.toggle_history_view();
        prop_assert_eq!(calc.history_visible(), !before.history_visible);
        prop_assert_eq!(calc.display(), before.display.as_str());
        calc.toggle_history_view();
        prop_assert_eq!(calc.snapshot(), before);
    }

    /// Equals with nothing pending changes nothing.
    #[test]
    fn prop_equals_without_pending_is_noop(intents in prop::collection::vec(intent_strategy(), 0..32)) {
        let mut calc = CalculatorEngine::new();
        for intent in intents {
            calc.apply_intent(intent);
        }
        if calc.pending_operator().is_none() {
            let before = calc.snapshot();
            calc.equals();
            prop_assert_eq!(calc.snapshot(), before);
        }
    }

    /// a op b = gives the IEEE result, rendered by the display formatter.
    #[test]
    fn prop_single_operation_result(a in 0u32..100_000, b in 0u32..100_000, op in operator_strategy()) {
        let mut calc = CalculatorEngine::new();
        for c in a.to_string().chars() {
            calc.digit(Digit::from_char(c).unwrap());
        }
        calc.operator(op);
        for c in b.to_string().chars() {
            calc.digit(Digit::from_char(c).unwrap());
        }
        calc.equals();
        let expected = op.apply(a as f64, b as f64);
        prop_assert_eq!(calc.display(), format_number(expected));
        prop_assert_eq!(calc.history().len(), 1);
    }

    /// Display text parses back to the value it was rendered from.
    #[test]
    fn prop_format_parse_agree(x in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let back = parse_number(&format_number(x));
        prop_assert_eq!(back, if x == 0.0 { 0.0 } else { x });
    }
}
