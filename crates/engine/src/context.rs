//! Session context – one calculator plus the settings it was opened with.

use crate::calculator::CalculatorEngine;
use crate::types::new_run_id;

/// Per-session settings supplied by the host (usually from config).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSettings {
    /// Whether the history panel starts out shown.
    pub history_visible: bool,
}

/// Central context passed to all engine commands.
///
/// Each front end session (a CLI run, a scenario, a daemon connection) owns
/// exactly one of these. It is opened when the session starts and dropped
/// when it ends.
pub struct AppContext {
    session_id: String,
    settings: SessionSettings,
    calculator: CalculatorEngine,
}

impl AppContext {
    pub fn new(settings: SessionSettings) -> Self {
        let session_id = new_run_id();
        tracing::debug!(session_id = %session_id, "session opened");
        Self {
            session_id,
            settings,
            calculator: CalculatorEngine::new().with_history_visible(settings.history_visible),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn calculator(&self) -> &CalculatorEngine {
        &self.calculator
    }

    pub fn calculator_mut(&mut self) -> &mut CalculatorEngine {
        &mut self.calculator
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        tracing::debug!(
            session_id = %self.session_id,
            completed = self.calculator.history().len(),
            "session closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_independent() {
        let mut a = AppContext::default();
        let b = AppContext::default();
        a.calculator_mut().toggle_history_view();
        assert!(a.calculator().history_visible());
        assert!(!b.calculator().history_visible());
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_settings_seed_history_view() {
        let ctx = AppContext::new(SessionSettings {
            history_visible: true,
        });
        assert!(ctx.calculator().history_visible());
        assert!(ctx.settings().history_visible);
    }
}
