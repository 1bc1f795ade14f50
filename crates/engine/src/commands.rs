//! Command registry – named calculator intents invoked with JSON input.
//!
//! Every successful command returns the session snapshot as its data, so a
//! caller can render straight from the result.

use crate::calculator::{Digit, Operator};
use crate::context::AppContext;
use crate::keymap::{intent_for_key, Intent};
use crate::types::*;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// Signature for all engine commands.
pub type CommandHandler = fn(Value, &mut AppContext) -> Result<Value, CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unmapped key: {0}")]
    UnmappedKey(String),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CommandError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CommandError::InvalidInput(_) => ErrorCode::InvalidInput,
            CommandError::UnmappedKey(_) => ErrorCode::Unsupported,
            CommandError::Serialization(_) => ErrorCode::InternalError,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            handlers: HashMap::new(),
        };
        reg.register("digit", cmd_digit);
        reg.register("decimal", cmd_decimal);
        reg.register("operator", cmd_operator);
        reg.register("equals", cmd_equals);
        reg.register("clear", cmd_clear);
        reg.register("clear_all", cmd_clear_all);
        reg.register("toggle_history", cmd_toggle_history);
        reg.register("key", cmd_key);
        reg.register("intent", cmd_intent);
        reg.register("state", cmd_state);
        reg
    }

    pub fn register(&mut self, name: &str, handler: CommandHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Execute a command by name and return a full CommandResult.
    pub fn execute(&self, name: &str, args: Value, ctx: &mut AppContext) -> CommandResult {
        let run_id = new_run_id();
        let start = Instant::now();

        let handler = match self.handlers.get(name) {
            Some(h) => h,
            None => {
                return result_err(
                    "call",
                    name,
                    &run_id,
                    start.elapsed().as_millis() as u64,
                    ErrorCode::InvalidInput,
                    format!("unknown command: {}", name),
                );
            }
        };

        match handler(args, &mut *ctx) {
            Ok(data) => {
                let mut r = result_ok("call", name, &run_id, start.elapsed().as_millis() as u64);
                r.data = Some(data);
                r
            }
            Err(CommandError::UnmappedKey(key)) => {
                tracing::warn!(session_id = %ctx.session_id(), key = %key, "key ignored");
                let mut r = result_skip(
                    "call",
                    name,
                    &run_id,
                    start.elapsed().as_millis() as u64,
                    format!("unmapped key: {}", key),
                );
                r.data = snapshot_value(ctx).ok();
                r
            }
            Err(e) => result_err(
                "call",
                name,
                &run_id,
                start.elapsed().as_millis() as u64,
                e.error_code(),
                e.to_string(),
            ),
        }
    }

    /// Press a sequence of keys in one go. Unmapped keys are skipped and
    /// listed under `ignored_keys` in the returned data.
    pub fn press_keys(&self, keys: &[String], ctx: &mut AppContext) -> CommandResult {
        let run_id = new_run_id();
        let start = Instant::now();
        let mut ignored = Vec::new();

        for key in keys {
            match intent_for_key(key) {
                Some(intent) => ctx.calculator_mut().apply_intent(intent),
                None => {
                    tracing::warn!(session_id = %ctx.session_id(), key = %key, "key ignored");
                    ignored.push(key.clone());
                }
            }
        }

        let total = start.elapsed().as_millis() as u64;
        match snapshot_value(ctx) {
            Ok(mut data) => {
                if !ignored.is_empty() {
                    if let Value::Object(map) = &mut data {
                        map.insert("ignored_keys".into(), serde_json::json!(ignored));
                    }
                }
                let mut r = result_ok("press", &keys.join(" "), &run_id, total);
                r.data = Some(data);
                r
            }
            Err(e) => result_err(
                "press",
                &keys.join(" "),
                &run_id,
                total,
                e.error_code(),
                e.to_string(),
            ),
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot_value(ctx: &AppContext) -> Result<Value, CommandError> {
    Ok(serde_json::to_value(ctx.calculator().snapshot())?)
}

fn apply(ctx: &mut AppContext, intent: Intent) -> Result<Value, CommandError> {
    ctx.calculator_mut().apply_intent(intent);
    snapshot_value(ctx)
}

// ===========================================================================
// Built-in commands
// ===========================================================================

/// `digit` – type one digit.
///
/// Args: `{ "digit": 7 }`
fn cmd_digit(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let raw = args
        .get("digit")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| CommandError::InvalidInput("missing 'digit' integer field".into()))?;
    let digit = u8::try_from(raw)
        .ok()
        .and_then(Digit::new)
        .ok_or_else(|| CommandError::InvalidInput(format!("digit out of range: {}", raw)))?;
    apply(ctx, Intent::Digit(digit))
}

fn cmd_decimal(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    apply(ctx, Intent::Decimal)
}

/// `operator` – press an operator.
///
/// Args: `{ "op": "+" }` (one of `+ - × ÷`, or `* /`)
fn cmd_operator(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let symbol = args
        .get("op")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CommandError::InvalidInput("missing 'op' string field".into()))?;
    let op = Operator::from_symbol(symbol)
        .ok_or_else(|| CommandError::InvalidInput(format!("unknown operator: {}", symbol)))?;
    apply(ctx, Intent::Operator(op))
}

fn cmd_equals(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    apply(ctx, Intent::Equals)
}

fn cmd_clear(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    apply(ctx, Intent::Clear)
}

fn cmd_clear_all(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    apply(ctx, Intent::ClearAll)
}

fn cmd_toggle_history(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    apply(ctx, Intent::ToggleHistory)
}

/// `key` – press a keyboard key through the key map.
///
/// Args: `{ "key": "Enter" }`
fn cmd_key(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let key = args
        .get("key")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CommandError::InvalidInput("missing 'key' string field".into()))?;
    let intent = intent_for_key(key).ok_or_else(|| CommandError::UnmappedKey(key.to_string()))?;
    apply(ctx, intent)
}

/// `intent` – apply an intent given in its JSON form.
///
/// Args: `{ "intent": "operator", "value": "÷" }`
fn cmd_intent(args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    let intent: Intent = serde_json::from_value(args)
        .map_err(|e| CommandError::InvalidInput(format!("bad intent: {}", e)))?;
    apply(ctx, intent)
}

/// `state` – read the snapshot without changing anything.
fn cmd_state(_args: Value, ctx: &mut AppContext) -> Result<Value, CommandError> {
    snapshot_value(ctx)
}

// ===========================================================================
// Tests
// ===========================================================================
