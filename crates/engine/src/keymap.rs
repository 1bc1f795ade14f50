//! Intents and the keyboard mapping front ends use to produce them.
//!
//! Key names follow the browser `KeyboardEvent.key` values (`Enter`,
//! `Escape`, `Delete`, single characters). Unmapped keys yield `None` and
//! are ignored by the host.

use crate::calculator::{Digit, Operator};
use serde::{Deserialize, Serialize};

/// One discrete user action accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "intent", content = "value", rename_all = "snake_case")]
pub enum Intent {
    Digit(Digit),
    Decimal,
    Operator(Operator),
    Equals,
    Clear,
    ClearAll,
    ToggleHistory,
}

/// Named key for the history toggle. Browsers have no key for it; headless
/// hosts use this name so every intent is reachable from a key sequence.
pub const HISTORY_KEY: &str = "History";

/// Map a key name to its intent.
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "Enter" | "=" => return Some(Intent::Equals),
        "Escape" => return Some(Intent::Clear),
        "Delete" => return Some(Intent::ClearAll),
        "." | "," => return Some(Intent::Decimal),
        HISTORY_KEY => return Some(Intent::ToggleHistory),
        _ => {}
    }

    if let Some(op) = Operator::from_symbol(key) {
        return Some(Intent::Operator(op));
    }

    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Digit::from_char(c).map(Intent::Digit),
        _ => None,
    }
}

/// Button caption for an intent, as on the on-screen keypad.
pub fn button_label(intent: Intent) -> String {
    match intent {
        Intent::Digit(d) => d.to_string(),
        Intent::Decimal => ".".to_string(),
        Intent::Operator(op) => op.symbol().to_string(),
        Intent::Equals => "=".to_string(),
        Intent::Clear => "C".to_string(),
        Intent::ClearAll => "CE".to_string(),
        Intent::ToggleHistory => "History".to_string(),
    }
}
