//! MCP (Model Context Protocol) server over stdio.
//!
//! Reads one JSON-RPC message per line from stdin and writes responses to
//! stdout. Logging must never touch stdout.

mod protocol;
mod tools;

use anyhow::{Context, Result};
use ga4_admin_client::AdminClient;
use protocol::{
    INVALID_PARAMS, InitializeParams, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    METHOD_NOT_FOUND, PARSE_ERROR, ServerCapabilities, ServerInfo, ToolCallParams,
    ToolsCapability, ToolsListResult,
};
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

pub use tools::get_tool_definitions;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "google-analytics-admin";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serve MCP on stdin/stdout until stdin closes.
pub async fn serve(client: &AdminClient) -> Result<()> {
    info!(
        base_url = %client.config().base_url,
        "Starting {SERVER_NAME} MCP server"
    );
    run(client, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

async fn run<R, W>(client: &AdminClient, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
    {
        if line.trim().is_empty() {
            continue;
        }

        debug!("Received: {line}");

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {e}");
                let response = JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}"));
                write_response(&mut writer, &response).await?;
                continue;
            }
        };

        if let Some(response) = handle_request(client, &request).await {
            write_response(&mut writer, &response).await?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let mut json = serde_json::to_string(response)?;
    debug!("Sending: {json}");
    json.push('\n');
    writer
        .write_all(json.as_bytes())
        .await
        .context("Failed to write to stdout")?;
    writer.flush().await?;
    Ok(())
}

async fn handle_request(client: &AdminClient, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    match request.method.as_str() {
        "initialize" => Some(handle_initialize(request)),
        "initialized" => {
            debug!("Received initialized notification");
            None
        }
        "tools/list" => Some(JsonRpcResponse::from_result(
            request.id.clone(),
            &ToolsListResult {
                tools: get_tool_definitions(),
            },
        )),
        "tools/call" => Some(handle_tools_call(client, request).await),
        "ping" => Some(JsonRpcResponse::success(request.id.clone(), json!({}))),
        method if method.starts_with("notifications/") => {
            debug!("Received notification: {method}");
            None
        }
        method if request.id.is_none() => {
            debug!("Ignoring unknown notification: {method}");
            None
        }
        method => {
            warn!("Unknown method: {method}");
            Some(JsonRpcResponse::error(
                request.id.clone(),
                METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
            ))
        }
    }
}

fn handle_initialize(request: &JsonRpcRequest) -> JsonRpcResponse {
    let params: InitializeParams = match request.params.clone().map(serde_json::from_value) {
        Some(Ok(p)) => p,
        Some(Err(e)) => {
            return JsonRpcResponse::error(
                request.id.clone(),
                INVALID_PARAMS,
                format!("Invalid params: {e}"),
            );
        }
        None => return JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, "Missing params"),
    };

    if let Some(info) = &params.client_info {
        info!(
            client = %info.name,
            client_version = info.version.as_deref().unwrap_or("-"),
            requested_protocol = params.protocol_version.as_deref().unwrap_or("-"),
            "Client connected"
        );
    }

    JsonRpcResponse::from_result(
        request.id.clone(),
        &InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME,
                version: SERVER_VERSION,
            },
        },
    )
}

async fn handle_tools_call(client: &AdminClient, request: &JsonRpcRequest) -> JsonRpcResponse {
    let params: ToolCallParams = match request.params.clone().map(serde_json::from_value) {
        Some(Ok(p)) => p,
        Some(Err(e)) => {
            return JsonRpcResponse::error(
                request.id.clone(),
                INVALID_PARAMS,
                format!("Invalid params: {e}"),
            );
        }
        None => return JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, "Missing params"),
    };

    info!(tool = %params.name, "Tool call");
    debug!(arguments = ?params.arguments, "Tool arguments");

    let result = tools::handle_tool_call(client, &params.name, params.arguments).await;
    if result.is_error() {
        error!(tool = %params.name, "Tool failed: {}", result.joined_text());
    }
    JsonRpcResponse::from_result(request.id.clone(), &result)
}
