use anyhow::Context as _;
use futures::StreamExt as _;
use serde_json::json;
use std::time::Duration;
use tokio::io::AsyncBufReadExt as _;
use tokio_util::io::StreamReader;

/// Minimal MCP client for the adapter's streamable HTTP endpoint.
///
/// Exists only for integration tests. Every POST carries the optional `Authorization` value so
/// tests can observe what the adapter relays to the backend.
pub struct McpStreamableHttpSession {
    client: reqwest::Client,
    endpoint: String,
    authorization: Option<String>,
    session_id: String,
}

impl McpStreamableHttpSession {
    pub async fn connect(endpoint: &str, authorization: Option<&str>) -> anyhow::Result<Self> {
        let client = reqwest::Client::new();
        let endpoint = endpoint.to_string();
        let authorization = authorization.map(str::to_string);

        let init_resp = post_mcp(
            &client,
            &endpoint,
            authorization.as_deref(),
            None,
            json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "flexo-mms-mcp-integration-tests", "version": "0" }
                }
            }),
        )
        .await?;

        let session_id = init_resp
            .headers()
            .get("Mcp-Session-Id")
            .and_then(|h| h.to_str().ok())
            .context("missing Mcp-Session-Id header")?
            .to_string();

        let init_msg = read_first_event_stream_json_message(init_resp).await?;
        anyhow::ensure!(init_msg.get("id") == Some(&json!(0)), "unexpected init id");

        let initialized_resp = post_mcp(
            &client,
            &endpoint,
            authorization.as_deref(),
            Some(&session_id),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await?;

        anyhow::ensure!(
            initialized_resp.status().as_u16() == 202,
            "notifications/initialized returned {}",
            initialized_resp.status()
        );

        Ok(Self {
            client,
            endpoint,
            authorization,
            session_id,
        })
    }

    pub async fn request(
        &self,
        id: u64,
        method: &str,
        params: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        let resp = post_mcp(
            &self.client,
            &self.endpoint,
            self.authorization.as_deref(),
            Some(&self.session_id),
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }),
        )
        .await?;

        tokio::time::timeout(
            Duration::from_secs(10),
            read_first_event_stream_json_message(resp),
        )
        .await
        .context("timeout waiting for event-stream response")?
    }

    pub async fn list_tool_names(&self) -> anyhow::Result<Vec<String>> {
        let msg = self.request(1, "tools/list", json!({})).await?;
        let tools = msg
            .pointer("/result/tools")
            .and_then(serde_json::Value::as_array)
            .context("tools/list missing result.tools")?;
        Ok(tools
            .iter()
            .filter_map(|t| t.get("name").and_then(serde_json::Value::as_str))
            .map(str::to_string)
            .collect())
    }

    pub async fn call_tool(
        &self,
        id: u64,
        name: &str,
        arguments: serde_json::Value,
    ) -> anyhow::Result<serde_json::Value> {
        self.request(
            id,
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
        )
        .await
    }
}

/// `result.content[0].text` of a tools/call response.
pub fn tool_call_text(msg: &serde_json::Value) -> anyhow::Result<&str> {
    msg.pointer("/result/content/0/text")
        .and_then(serde_json::Value::as_str)
        .context("tools/call missing result.content[0].text")
}

/// `result.isError` of a tools/call response, `false` when absent.
pub fn tool_call_is_error(msg: &serde_json::Value) -> bool {
    msg.pointer("/result/isError")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}

async fn post_mcp(
    client: &reqwest::Client,
    endpoint: &str,
    authorization: Option<&str>,
    session_id: Option<&str>,
    body: serde_json::Value,
) -> anyhow::Result<reqwest::Response> {
    let mut req = client
        .post(endpoint)
        .header("Accept", "application/json, text/event-stream")
        .header("Content-Type", "application/json")
        .json(&body);

    if let Some(authorization) = authorization {
        req = req.header("Authorization", authorization);
    }
    if let Some(session_id) = session_id {
        req = req.header("Mcp-Session-Id", session_id);
    }

    req.send()
        .await
        .with_context(|| format!("POST {endpoint}"))?
        .error_for_status()
        .with_context(|| format!("POST {endpoint} status"))
}

async fn read_first_event_stream_json_message(
    resp: reqwest::Response,
) -> anyhow::Result<serde_json::Value> {
    let mut stream = resp.bytes_stream();
    let byte_stream = futures::stream::poll_fn(move |cx| stream.poll_next_unpin(cx))
        .map(|r| r.map_err(std::io::Error::other));
    let reader = StreamReader::new(byte_stream);
    let mut lines = tokio::io::BufReader::new(reader).lines();

    let mut data_lines: Vec<String> = Vec::new();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim_end().to_string();

        if line.is_empty() {
            if data_lines.iter().all(String::is_empty) {
                data_lines.clear();
                continue;
            }
            let data = data_lines.join("\n");
            return serde_json::from_str(&data).context("parse event-stream data as JSON");
        }

        if let Some(v) = line.strip_prefix("data:") {
            data_lines.push(v.trim().to_string());
        }
    }

    anyhow::bail!("event-stream ended without a JSON message")
}
