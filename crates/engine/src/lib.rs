//! Engine crate – the calculator state machine and the pieces every front
//! end shares.
//!
//! This crate does no I/O and knows nothing about terminals, sockets or
//! windows, so it can sit behind the CLI harness, a daemon connection or a
//! graphical shell alike.

pub mod calculator;
pub mod commands;
pub mod context;
pub mod keymap;
pub mod scenario;
pub mod types;
pub mod view;

// Re-exports for convenience
pub use calculator::{CalculatorEngine, Digit, Operator};
pub use commands::CommandRegistry;
pub use context::{AppContext, SessionSettings};
pub use keymap::Intent;
pub use types::{CommandResult, ErrorCode, ErrorInfo, Snapshot, Status};
