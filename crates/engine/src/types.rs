use crate::calculator::Operator;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Final result JSON – the stable output contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub run_id: String,
    pub command: String,
    pub target: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub timing_ms: TimingInfo,
    /// Session snapshot (or other command-specific payload) on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pass,
    Fail,
    Skip,
    Error,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Fail => "fail",
            Status::Skip => "skip",
            Status::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    Unsupported,
    ExpectationFailed,
    IoError,
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        f.write_str(&s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingInfo {
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Calculator snapshot
// ---------------------------------------------------------------------------

/// Everything a front end needs to render the calculator after an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub display: String,
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_operator: Option<Operator>,
    /// Rendered with the display formatting so non-finite values survive JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulated_value: Option<String>,
    pub awaiting_operand: bool,
    pub history: Vec<String>,
    pub history_visible: bool,
}

// ---------------------------------------------------------------------------
// Scenario types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioStep {
    Call {
        call: String,
        #[serde(default)]
        args: serde_json::Value,
        #[serde(default = "default_expect_status")]
        expect_status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_display: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_history: Option<Vec<String>>,
    },
    Keys {
        keys: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_display: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_history: Option<Vec<String>>,
    },
}

impl ScenarioStep {
    /// Display text the snapshot must show after this step, if asserted.
    pub fn expect_display(&self) -> Option<&str> {
        match self {
            ScenarioStep::Call { expect_display, .. } | ScenarioStep::Keys { expect_display, .. } => {
                expect_display.as_deref()
            }
        }
    }

    /// History the snapshot must hold after this step, if asserted.
    pub fn expect_history(&self) -> Option<&[String]> {
        match self {
            ScenarioStep::Call { expect_history, .. } | ScenarioStep::Keys { expect_history, .. } => {
                expect_history.as_deref()
            }
        }
    }
}

fn default_expect_status() -> String {
    "pass".to_string()
}

// ---------------------------------------------------------------------------
// Scenario result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: Option<String>,
    pub session_id: String,
    pub overall_status: Status,
    pub step_results: Vec<CommandResult>,
}

// ---------------------------------------------------------------------------
// Serve / daemon protocol
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRequest {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a new run ID (UUIDv4).
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn result_with(
    command: &str,
    target: &str,
    run_id: &str,
    total_ms: u64,
    status: Status,
    error: Option<ErrorInfo>,
) -> CommandResult {
    CommandResult {
        run_id: run_id.to_string(),
        command: command.to_string(),
        target: target.to_string(),
        status,
        error,
        timing_ms: TimingInfo { total: total_ms },
        data: None,
    }
}

/// Build a successful CommandResult shell (caller fills in data).
pub fn result_ok(command: &str, target: &str, run_id: &str, total_ms: u64) -> CommandResult {
    result_with(command, target, run_id, total_ms, Status::Pass, None)
}

/// Build an error CommandResult.
pub fn result_err(
    command: &str,
    target: &str,
    run_id: &str,
    total_ms: u64,
    code: ErrorCode,
    message: impl Into<String>,
) -> CommandResult {
    let error = ErrorInfo {
        code,
        message: message.into(),
        details: serde_json::Value::Null,
    };
    result_with(command, target, run_id, total_ms, Status::Error, Some(error))
}

/// Build a skip CommandResult.
pub fn result_skip(
    command: &str,
    target: &str,
    run_id: &str,
    total_ms: u64,
    reason: impl Into<String>,
) -> CommandResult {
    let error = ErrorInfo {
        code: ErrorCode::Unsupported,
        message: reason.into(),
        details: serde_json::Value::Null,
    };
    result_with(command, target, run_id, total_ms, Status::Skip, Some(error))
}
