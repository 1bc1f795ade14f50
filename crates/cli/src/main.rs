//! `calcctl` – headless CLI harness for the calculator engine.
//!
//! Drives the same engine a graphical front end would, through key presses,
//! scripted scenarios, an interactive prompt or a Unix-socket daemon.

mod config;
mod interactive;
mod logging;
mod serve;

use calc_engine::types::*;
use calc_engine::view::{render_keypad, render_panel};
use calc_engine::{AppContext, CommandRegistry, CommandResult, SessionSettings};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

// ===========================================================================
// CLI definition
// ===========================================================================

#[derive(Parser)]
#[command(
    name = "calcctl",
    version,
    about = "CLI harness for the calculator engine"
)]
struct Cli {
    /// Extra YAML config file layered over the defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Press keys in a fresh session and print the resulting state.
    Press {
        /// Key names, e.g. `9 / 2 Enter`. Unmapped keys are ignored.
        #[arg(required = true, allow_hyphen_values = true)]
        keys: Vec<String>,
        /// Output as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
        /// Write result JSON to this path.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run a scripted scenario from a YAML file.
    RunScenario {
        /// Path to the scenario YAML file.
        file: PathBuf,
        /// Directory for artifacts output.
        #[arg(long)]
        artifacts: Option<PathBuf>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Type keys at a prompt and watch the display update.
    Interactive,

    /// Print the on-screen keypad layout.
    Keypad,

    /// Start daemon mode over a Unix socket.
    Serve {
        /// Path for the Unix domain socket (defaults to `serve.socket`).
        #[arg(long)]
        socket: Option<PathBuf>,
    },
}

// ===========================================================================
// Main
// ===========================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app_config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };
    logging::init_logging(&app_config.logging);
    tracing::debug!(dev_env = %app_config.dev_env, "configuration loaded");

    let settings = app_config.session.settings();
    let registry = CommandRegistry::new();

    match cli.command {
        Commands::Press { keys, json, out } => cmd_press(&keys, json, out, settings, &registry),
        Commands::RunScenario {
            file,
            artifacts,
            json,
        } => cmd_run_scenario(&file, json, artifacts, settings, &registry),
        Commands::Interactive => {
            if let Err(e) = interactive::run_interactive(settings, &registry) {
                eprintln!("error: {:#}", e);
                std::process::exit(2);
            }
        }
        Commands::Keypad => print!("{}", render_keypad(settings.history_visible)),
        Commands::Serve { socket } => {
            let socket = socket.unwrap_or_else(|| app_config.serve.socket.clone());
            if let Err(e) = serve::run_daemon(socket.clone(), settings, registry).await {
                eprintln!("error: cannot serve on {}: {}", socket.display(), e);
                std::process::exit(2);
            }
        }
    }
}

// ===========================================================================
// Subcommand implementations
// ===========================================================================

fn cmd_press(
    keys: &[String],
    json: bool,
    out: Option<PathBuf>,
    settings: SessionSettings,
    registry: &CommandRegistry,
) {
    let mut ctx = AppContext::new(settings);
    let result = registry.press_keys(keys, &mut ctx);
    if let Some(ref path) = out {
        write_result_file(path, &result);
    }
    output_result(&result, json);
}

fn cmd_run_scenario(
    file: &Path,
    json: bool,
    artifacts: Option<PathBuf>,
    settings: SessionSettings,
    registry: &CommandRegistry,
) {
    let yaml = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &file.display().to_string(),
                &new_run_id(),
                0,
                ErrorCode::IoError,
                format!("cannot read scenario file: {}", e),
            );
            output_result(&r, json);
            return;
        }
    };

    let scenario = match calc_engine::scenario::load_scenario(&yaml) {
        Ok(s) => s,
        Err(e) => {
            let r = result_err(
                "run-scenario",
                &file.display().to_string(),
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                e,
            );
            output_result(&r, json);
            return;
        }
    };

    let mut ctx = AppContext::new(settings);
    let scenario_result = calc_engine::scenario::run_scenario(&scenario, &mut ctx, registry);

    if json {
        let j = serde_json::to_string_pretty(&scenario_result).unwrap_or_default();
        println!("{}", j);
    } else {
        println!(
            "Scenario: {}",
            scenario_result.name.as_deref().unwrap_or("<unnamed>")
        );
        println!("Overall: {:?}", scenario_result.overall_status);
        for (i, sr) in scenario_result.step_results.iter().enumerate() {
            println!(
                "  Step {}: {} {} -> {:?} ({}ms)",
                i, sr.command, sr.target, sr.status, sr.timing_ms.total
            );
            if let Some(ref err) = sr.error {
                println!("    {} – {}", err.code, err.message);
            }
        }
        print!("{}", render_panel(&ctx.calculator().snapshot()));
    }

    if let Some(ref dir) = artifacts {
        write_scenario_artifacts(dir, &scenario_result);
    }

    if scenario_result.overall_status == Status::Fail {
        std::process::exit(1);
    }
}

// ===========================================================================
// Output helpers
// ===========================================================================

fn output_result(result: &CommandResult, json: bool) {
    if json {
        let j = serde_json::to_string_pretty(result).unwrap_or_default();
        println!("{}", j);
    } else {
        print_human(result);
    }

    // Exit with non-zero status on error/fail
    match result.status {
        Status::Pass | Status::Skip => {}
        Status::Fail => std::process::exit(1),
        Status::Error => std::process::exit(2),
    }
}

fn print_human(r: &CommandResult) {
    let status_icon = match r.status {
        Status::Pass => "PASS",
        Status::Fail => "FAIL",
        Status::Skip => "SKIP",
        Status::Error => "ERROR",
    };

    println!("[{}] {} {}", status_icon, r.command, r.target);
    println!("  run_id: {}", r.run_id);
    println!("  timing: {}ms", r.timing_ms.total);

    if let Some(ref err) = r.error {
        println!("  error:  {} – {}", err.code, err.message);
    }

    let Some(ref data) = r.data else {
        return;
    };
    if let Some(ignored) = data.get("ignored_keys") {
        println!("  ignored: {}", ignored);
    }
    match serde_json::from_value::<Snapshot>(data.clone()) {
        Ok(snapshot) => {
            for line in render_panel(&snapshot).lines() {
                println!("  {}", line);
            }
        }
        Err(_) => {
            if let Ok(s) = serde_json::to_string_pretty(data) {
                for line in s.lines() {
                    println!("  {}", line);
                }
            }
        }
    }
}

// ===========================================================================
// Artifact helpers
// ===========================================================================

fn write_result_file(path: &Path, result: &CommandResult) {
    let j = serde_json::to_string_pretty(result).unwrap_or_default();
    if let Err(e) = std::fs::write(path, &j) {
        eprintln!(
            "warning: failed to write result to {}: {}",
            path.display(),
            e
        );
    }
}

fn write_scenario_artifacts(dir: &Path, scenario_result: &ScenarioResult) {
    let art_dir = dir.join(new_run_id());
    if let Err(e) = std::fs::create_dir_all(&art_dir) {
        eprintln!(
            "warning: failed to create artifacts dir {}: {}",
            art_dir.display(),
            e
        );
        return;
    }

    let result_path = art_dir.join("result.json");
    let j = serde_json::to_string_pretty(scenario_result).unwrap_or_default();
    let _ = std::fs::write(&result_path, j);

    // Write per-step results as events.jsonl
    let events_path = art_dir.join("events.jsonl");
    let mut lines = String::new();
    for sr in &scenario_result.step_results {
        if let Ok(line) = serde_json::to_string(sr) {
            lines.push_str(&line);
            lines.push('\n');
        }
    }
    let _ = std::fs::write(&events_path, lines);
}
