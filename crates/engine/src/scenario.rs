//! Scenario runner – execute scripted calculator sessions from YAML files.

use crate::commands::CommandRegistry;
use crate::context::AppContext;
use crate::types::*;

/// Load a scenario from a YAML string.
pub fn load_scenario(yaml: &str) -> Result<Scenario, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("failed to parse scenario YAML: {}", e))
}

/// Execute a scenario in `ctx` and return the overall result.
///
/// A step whose status or expectations do not hold is marked `fail`; later
/// steps still run against the same session.
pub fn run_scenario(
    scenario: &Scenario,
    ctx: &mut AppContext,
    registry: &CommandRegistry,
) -> ScenarioResult {
    let mut step_results = Vec::new();
    let mut overall = Status::Pass;

    for (i, step) in scenario.steps.iter().enumerate() {
        let mut mismatches = Vec::new();
        let mut result = match step {
            ScenarioStep::Call {
                call,
                args,
                expect_status,
                ..
            } => {
                let r = registry.execute(call, args.clone(), ctx);
                let actual_status = r.status.as_str();
                if actual_status != expect_status {
                    mismatches.push(format!(
                        "status: expected {:?}, got {:?}",
                        expect_status, actual_status
                    ));
                }
                r
            }
            ScenarioStep::Keys { keys, .. } => registry.press_keys(keys, ctx),
        };

        mismatches.extend(check_expectations(step, ctx));
        if !mismatches.is_empty() {
            tracing::warn!(step = i, ?mismatches, "scenario step expectation mismatch");
            let mut message = mismatches.join("; ");
            if let Some(err) = result.error.take() {
                message = format!("{} ({}: {})", message, err.code, err.message);
            }
            result.status = Status::Fail;
            result.error = Some(ErrorInfo {
                code: ErrorCode::ExpectationFailed,
                message,
                details: serde_json::Value::Null,
            });
            overall = Status::Fail;
        }
        step_results.push(result);
    }

    ScenarioResult {
        name: scenario.name.clone(),
        session_id: ctx.session_id().to_string(),
        overall_status: overall,
        step_results,
    }
}

fn check_expectations(step: &ScenarioStep, ctx: &AppContext) -> Vec<String> {
    let calc = ctx.calculator();
    let mut mismatches = Vec::new();
    if let Some(expected) = step.expect_display() {
        if calc.display() != expected {
            mismatches.push(format!(
                "display: expected {:?}, got {:?}",
                expected,
                calc.display()
            ));
        }
    }
    if let Some(expected) = step.expect_history() {
        if calc.history() != expected {
            mismatches.push(format!(
                "history: expected {:?}, got {:?}",
                expected,
                calc.history()
            ));
        }
    }
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        let yaml = r#"
name: chaining
steps:
  - call: "digit"
    args: { digit: 1 }
    expect_status: "pass"
  - keys: ["+", "1", "+", "1", "Enter"]
    expect_display: "3"
"#;
        let s = load_scenario(yaml).expect("should parse");
        assert_eq!(s.name, Some("chaining".into()));
        assert_eq!(s.steps.len(), 2);
        assert!(matches!(s.steps[1], ScenarioStep::Keys { .. }));
        assert_eq!(s.steps[1].expect_display(), Some("3"));
    }

    #[test]
    fn test_run_scenario_chaining() {
        let yaml = r#"
steps:
  - keys: ["1", "+", "1", "+", "1", "="]
    expect_display: "3"
    expect_history: ["1 + 1 = 2", "2 + 1 = 3"]
  - call: "clear"
    expect_display: "0"
    expect_history: ["1 + 1 = 2", "2 + 1 = 3"]
  - call: "clear_all"
    expect_history: []
"#;
        let scenario = load_scenario(yaml).unwrap();
        let mut ctx = AppContext::default();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(result.overall_status, Status::Pass);
        assert_eq!(result.step_results.len(), 3);
        assert_eq!(result.session_id, ctx.session_id());
    }

    #[test]
    fn test_display_mismatch_fails_run() {
        let yaml = r#"
steps:
  - keys: ["9", "/", "2", "Enter"]
    expect_display: "4"
  - keys: ["Escape"]
    expect_display: "0"
"#;
        let scenario = load_scenario(yaml).unwrap();
        let mut ctx = AppContext::default();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(result.overall_status, Status::Fail);
        assert_eq!(result.step_results[0].status, Status::Fail);
        let err = result.step_results[0].error.as_ref().unwrap();
        assert_eq!(err.code, ErrorCode::ExpectationFailed);
        assert!(err.message.contains("4.5"));
        assert_eq!(result.step_results[1].status, Status::Pass);
    }

    #[test]
    fn test_status_mismatch_fails_step() {
        let yaml = r#"
steps:
  - call: "digit"
    args: { digit: 3 }
    expect_status: "error"
  - call: "digit"
    args: { digit: 30 }
  - call: "state"
    expect_display: "3"
"#;
        let scenario = load_scenario(yaml).unwrap();
        let mut ctx = AppContext::default();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(result.overall_status, Status::Fail);

        let first = &result.step_results[0];
        assert_eq!(first.status, Status::Fail);
        let err = first.error.as_ref().unwrap();
        assert_eq!(err.code, ErrorCode::ExpectationFailed);
        assert!(err.message.contains("status"));

        let second = &result.step_results[1];
        assert_eq!(second.status, Status::Fail);
        let err = second.error.as_ref().unwrap();
        assert_eq!(err.code, ErrorCode::ExpectationFailed);
        assert!(err.message.contains("INVALID_INPUT"));

        assert_eq!(result.step_results[2].status, Status::Pass);
    }

    #[test]
    fn test_expected_error_status() {
        let yaml = r#"
steps:
  - call: "digit"
    args: { digit: 12 }
    expect_status: "error"
"#;
        let scenario = load_scenario(yaml).unwrap();
        let mut ctx = AppContext::default();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &mut ctx, &reg);
        assert_eq!(result.overall_status, Status::Pass);
    }

    #[test]
    fn test_malformed_yaml() {
        let err = load_scenario("steps: 12").unwrap_err();
        assert!(err.starts_with("failed to parse scenario YAML"));
    }
}
