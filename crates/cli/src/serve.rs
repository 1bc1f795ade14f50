//! Daemon mode – minimal JSON-RPC-ish protocol over a Unix socket.
//!
//! Each connection gets its own calculator session, opened on accept and
//! dropped when the peer hangs up.

use calc_engine::types::*;
use calc_engine::{AppContext, CommandRegistry, SessionSettings};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

pub async fn run_daemon(
    socket_path: PathBuf,
    settings: SessionSettings,
    registry: CommandRegistry,
) -> std::io::Result<()> {
    // Remove stale socket if it exists
    let _ = std::fs::remove_file(&socket_path);

    let listener = UnixListener::bind(&socket_path)?;
    tracing::info!(socket = %socket_path.display(), "calcctl daemon listening");
    eprintln!("calcctl daemon listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => serve_connection(stream, settings, &registry).await,
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
            }
        }
    }
}

/// Serve one client until it closes the connection.
pub async fn serve_connection(
    stream: UnixStream,
    settings: SessionSettings,
    registry: &CommandRegistry,
) {
    let mut ctx = AppContext::new(settings);
    tracing::info!(session_id = %ctx.session_id(), "client connected");

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_request(&line, &mut ctx, registry);
        let mut resp_json = serde_json::to_string(&response).unwrap_or_else(|_| "{}".into());
        resp_json.push('\n');
        if writer.write_all(resp_json.as_bytes()).await.is_err() {
            break;
        }
    }

    tracing::info!(session_id = %ctx.session_id(), "client disconnected");
}

fn error_response(id: String, message: String) -> DaemonResponse {
    DaemonResponse {
        id,
        result: None,
        error: Some(ErrorInfo {
            code: ErrorCode::InvalidInput,
            message,
            details: serde_json::Value::Null,
        }),
    }
}

fn handle_request(line: &str, ctx: &mut AppContext, registry: &CommandRegistry) -> DaemonResponse {
    let req: DaemonRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            return error_response("unknown".into(), format!("invalid JSON request: {}", e));
        }
    };

    let result = match req.method.as_str() {
        "call" => {
            let cmd_name = req.params.get("cmd").and_then(|v| v.as_str()).unwrap_or("");
            let args = req
                .params
                .get("args")
                .cloned()
                .unwrap_or(serde_json::Value::Object(Default::default()));
            registry.execute(cmd_name, args, ctx)
        }
        "press" => {
            let parsed = req
                .params
                .get("keys")
                .cloned()
                .map(serde_json::from_value::<Vec<String>>);
            let keys = match parsed {
                Some(Ok(keys)) => keys,
                _ => {
                    return error_response(req.id, "missing 'keys' string array".into());
                }
            };
            registry.press_keys(&keys, ctx)
        }
        "state" => registry.execute("state", serde_json::Value::Null, ctx),
        other => {
            return error_response(req.id, format!("unknown method: {}", other));
        }
    };

    DaemonResponse {
        id: req.id,
        result: Some(result),
        error: None,
    }
}
