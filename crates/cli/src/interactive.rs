//! Interactive prompt – type keys, see the calculator after every line.

use anyhow::{Context, Result};
use calc_engine::keymap::{intent_for_key, HISTORY_KEY};
use calc_engine::view::{render_keypad, render_panel};
use calc_engine::{AppContext, CommandRegistry, SessionSettings, Snapshot};
use dialoguer::Input;

/// Split a typed line into key names.
///
/// Words containing letters are taken whole (`Enter`, `Escape`, `history`);
/// anything else is one key per character, so `12+3=` is five presses.
pub fn split_keys(line: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for token in line.split_whitespace() {
        if token.chars().any(char::is_alphabetic) {
            keys.push(normalize_named_key(token));
        } else {
            keys.extend(token.chars().map(String::from));
        }
    }
    keys
}

fn normalize_named_key(token: &str) -> String {
    match token.to_ascii_lowercase().as_str() {
        "enter" => "Enter".to_string(),
        "esc" | "escape" => "Escape".to_string(),
        "del" | "delete" => "Delete".to_string(),
        "history" => HISTORY_KEY.to_string(),
        _ => token.to_string(),
    }
}

pub fn run_interactive(settings: SessionSettings, registry: &CommandRegistry) -> Result<()> {
    let mut ctx = AppContext::new(settings);
    println!("{}", render_keypad(ctx.calculator().history_visible()));
    println!("Keys: digits . + - * / = Enter Escape(C) Delete(CE) History; 'quit' to leave.");
    print!("{}", render_panel(&ctx.calculator().snapshot()));

    loop {
        let line: String = Input::new()
            .with_prompt("keys")
            .allow_empty(true)
            .interact_text()
            .context("failed to read keys from terminal")?;

        let line = line.trim();
        if matches!(line, "quit" | "exit") {
            break;
        }

        let keys = split_keys(line);
        let ignored: Vec<&String> = keys.iter().filter(|k| intent_for_key(k).is_none()).collect();
        if !ignored.is_empty() {
            println!("ignored: {:?}", ignored);
        }

        let result = registry.press_keys(&keys, &mut ctx);
        let snapshot: Snapshot = match result.data {
            Some(data) => serde_json::from_value(data).context("malformed snapshot")?,
            None => ctx.calculator().snapshot(),
        };
        print!("{}", render_panel(&snapshot));
    }

    Ok(())
}
