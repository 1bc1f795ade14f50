//! Plain-text rendering of the calculator for headless front ends.

use crate::calculator::{Digit, Operator};
use crate::keymap::{button_label, Intent};
use crate::types::Snapshot;

pub const EMPTY_HISTORY: &str = "No calculations yet";

pub fn history_toggle_label(visible: bool) -> &'static str {
    if visible {
        "Hide History"
    } else {
        "Show History"
    }
}

/// Display line, followed by the history section when it is visible.
pub fn render_panel(snapshot: &Snapshot) -> String {
    let mut out = format!("Display: {}\n", snapshot.display);
    if snapshot.history_visible {
        out.push_str("Calculation History\n");
        if snapshot.history.is_empty() {
            out.push_str("  ");
            out.push_str(EMPTY_HISTORY);
            out.push('\n');
        }
        for entry in &snapshot.history {
            out.push_str("  ");
            out.push_str(entry);
            out.push('\n');
        }
    }
    out
}

/// The on-screen keypad: digit rows, operators, then actions.
pub fn render_keypad(history_visible: bool) -> String {
    let digit = |n: u8| Digit::new(n).map(Intent::Digit);
    let rows: [Vec<Option<Intent>>; 4] = [
        vec![digit(1), digit(2), digit(3)],
        vec![digit(4), digit(5), digit(6)],
        vec![digit(7), digit(8), digit(9)],
        vec![digit(0), Some(Intent::Decimal)],
    ];

    let mut out = String::new();
    for row in rows {
        let labels: Vec<String> = row.into_iter().flatten().map(button_label).collect();
        out.push_str(&format!("[{}]\n", labels.join("] [")));
    }

    let ops: Vec<String> = Operator::ALL
        .into_iter()
        .map(|op| button_label(Intent::Operator(op)))
        .collect();
    out.push_str(&format!("[{}]\n", ops.join("] [")));

    out.push_str(&format!(
        "[{}] [{}] [{}] [{}]\n",
        button_label(Intent::Equals),
        button_label(Intent::Clear),
        button_label(Intent::ClearAll),
        history_toggle_label(history_visible)
    ));
    out
}
