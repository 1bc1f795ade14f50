//! Calculator state machine – digit entry, operator chaining, equals, clears.
//!
//! Every operator press evaluates immediately against the accumulated value
//! (no precedence). All operations are total: division by zero produces an
//! IEEE infinity/NaN which flows into the display and history unchanged.

use crate::keymap::Intent;
use crate::types::Snapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Operands and operators
// ---------------------------------------------------------------------------

/// A single decimal digit, 0–9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("digit out of range: {0} (expected 0-9)")]
pub struct DigitOutOfRange(pub u8);

impl Digit {
    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Self(value))
    }

    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Self(d as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Digit {
    type Error = DigitOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(DigitOutOfRange(value))
    }
}

impl From<Digit> for u8 {
    fn from(d: Digit) -> Self {
        d.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "×")]
    Multiply,
    #[serde(rename = "÷")]
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    /// Parse a display symbol. The ASCII keyboard forms `*` and `/` are
    /// accepted as aliases for `×` and `÷`.
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "×" | "*" => Some(Operator::Multiply),
            "÷" | "/" => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => lhs / rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Number text
// ---------------------------------------------------------------------------

/// Render a value the way the display shows it: shortest round-trip digits,
/// no trailing `.0`, exponent form outside `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // also folds -0
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let s = format!("{:e}", value);
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s,
    }
}

/// Parse the longest numeric prefix of `text`. Text without one is NaN.
pub fn parse_number(text: &str) -> f64 {
    let text = text.trim_start();
    let negative = text.starts_with('-');
    let unsigned = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);

    if unsigned.starts_with("Infinity") {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let bytes = unsigned.as_bytes();
    let mut end = 0;
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    let magnitude = unsigned[..end].parse::<f64>().unwrap_or(f64::NAN);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Left operand plus the operator waiting for its right operand.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingOperation {
    lhs: f64,
    op: Operator,
}

/// Owns all calculator state for one session.
#[derive(Debug, Clone)]
pub struct CalculatorEngine {
    pending: Option<PendingOperation>,
    input: String,
    awaiting_operand: bool,
    display: String,
    history: Vec<String>,
    /// Presentation only. Never read by the calculation paths.
    history_visible: bool,
}

impl Default for CalculatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorEngine {
    pub fn new() -> Self {
        Self {
            pending: None,
            input: "0".to_string(),
            awaiting_operand: false,
            display: "0".to_string(),
            history: Vec::new(),
            history_visible: false,
        }
    }

    pub fn with_history_visible(mut self, visible: bool) -> Self {
        self.history_visible = visible;
        self
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn history_visible(&self) -> bool {
        self.history_visible
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending.map(|p| p.op)
    }

    pub fn accumulated_value(&self) -> Option<f64> {
        self.pending.map(|p| p.lhs)
    }

    pub fn is_awaiting_operand(&self) -> bool {
        self.awaiting_operand
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            display: self.display.clone(),
            input: self.input.clone(),
            pending_operator: self.pending_operator(),
            accumulated_value: self.accumulated_value().map(format_number),
            awaiting_operand: self.awaiting_operand,
            history: self.history.clone(),
            history_visible: self.history_visible,
        }
    }

    /// Dispatch one intent to the matching operation.
    pub fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Digit(d) => self.digit(d),
            Intent::Decimal => self.decimal_point(),
            Intent::Operator(op) => self.operator(op),
            Intent::Equals => self.equals(),
            Intent::Clear => self.clear(),
            Intent::ClearAll => self.clear_all(),
            Intent::ToggleHistory => self.toggle_history_view(),
        }
    }

    pub fn digit(&mut self, digit: Digit) {
        let text = digit.to_string();
        if self.awaiting_operand {
            self.input = text;
            self.awaiting_operand = false;
        } else if self.input == "0" {
            self.input = text;
        } else {
            self.input.push_str(&text);
        }
        self.render_entry();
        tracing::debug!(digit = digit.get(), display = %self.display, "digit");
    }

    pub fn decimal_point(&mut self) {
        if self.input.contains('.') {
            tracing::debug!(input = %self.input, "decimal point ignored");
            return;
        }
        if self.awaiting_operand {
            self.input = "0.".to_string();
            self.awaiting_operand = false;
        } else {
            self.input.push('.');
        }
        self.render_entry();
        tracing::debug!(display = %self.display, "decimal point");
    }

    pub fn operator(&mut self, op: Operator) {
        let rhs = parse_number(&self.input);
        // A zero left operand counts as unset and restarts from the buffer.
        let lhs = match self.pending.take() {
            Some(prev) if prev.lhs != 0.0 => {
                let result = self.complete(prev, rhs);
                self.input = format_number(result);
                self.display = format!("{} {}", self.input, op);
                result
            }
            _ => {
                self.display = format!("{} {}", format_number(rhs), op);
                rhs
            }
        };
        self.pending = Some(PendingOperation { lhs, op });
        self.awaiting_operand = true;
        tracing::debug!(operator = %op, display = %self.display, "operator");
    }

    pub fn equals(&mut self) {
        let Some(prev) = self.pending.take() else {
            tracing::debug!("equals with nothing pending");
            return;
        };
        let rhs = parse_number(&self.input);
        let result = self.complete(prev, rhs);
        self.input = format_number(result);
        self.display = self.input.clone();
        self.awaiting_operand = true;
        tracing::debug!(display = %self.display, "equals");
    }

    /// Reset the calculation. History is kept.
    pub fn clear(&mut self) {
        self.pending = None;
        self.input = "0".to_string();
        self.display = "0".to_string();
        self.awaiting_operand = false;
        tracing::debug!("clear");
    }

    /// Reset the calculation and drop the history.
    pub fn clear_all(&mut self) {
        self.clear();
        self.history.clear();
        tracing::debug!("history cleared");
    }

    pub fn toggle_history_view(&mut self) {
        self.history_visible = !self.history_visible;
        tracing::debug!(visible = self.history_visible, "history view toggled");
    }

    // -- internals ----------------------------------------------------------

    fn render_entry(&mut self) {
        self.display = match self.pending {
            Some(p) if p.lhs != 0.0 => {
                format!("{} {} {}", format_number(p.lhs), p.op, self.input)
            }
            _ => self.input.clone(),
        };
    }

    fn complete(&mut self, prev: PendingOperation, rhs: f64) -> f64 {
        let result = prev.op.apply(prev.lhs, rhs);
        let entry = format!(
            "{} {} {} = {}",
            format_number(prev.lhs),
            prev.op,
            format_number(rhs),
            format_number(result)
        );
        tracing::info!(entry = %entry, "calculation completed");
        self.history.push(entry);
        result
    }
}

// ===========================================================================
// Tests
// ===========================================================================
