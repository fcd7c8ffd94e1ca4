//! rmcp `ServerHandler` exposing the registry as MCP tools.

use crate::error::ToolCallError;
use crate::registry::Registry;
use axum::http::request::Parts;
use flexo_mms_http_tools::runtime::ForwardError;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData, ServerHandler};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const SERVER_NAME: &str = "flexo-mms-mcp";

#[derive(Clone)]
pub struct MmsServer {
    registry: Arc<Registry>,
    read_only: bool,
}

impl MmsServer {
    #[must_use]
    pub fn new(registry: Arc<Registry>, read_only: bool) -> Self {
        Self {
            registry,
            read_only,
        }
    }

    fn instructions(&self) -> String {
        let mode = if self.read_only {
            "Read-only mode: only read and query tools are available."
        } else {
            "Read-write mode: create, update, load and commit tools are available."
        };
        format!(
            "MMS Flexo Layer 1 Service. Each tool forwards one request to the MMS backend and \
             returns the raw response (Turtle, JSON or SPARQL results). {mode}"
        )
    }
}

impl ServerHandler for MmsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(self.instructions()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.registry.tools(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let authorization = inbound_authorization(&context);
        let arguments = request.arguments.unwrap_or_default();

        run_cancellable(
            &context.ct,
            &request.name,
            self.registry
                .call(&request.name, &arguments, authorization.as_ref()),
        )
        .await
    }
}

/// Drive a tool call until it finishes or `ct` fires. On cancellation the call future, and the
/// outbound request with it, is dropped.
async fn run_cancellable(
    ct: &CancellationToken,
    tool: &str,
    call: impl Future<Output = Result<String, ToolCallError>>,
) -> Result<CallToolResult, ErrorData> {
    tokio::select! {
        () = ct.cancelled() => {
            tracing::debug!(tool, "tool call cancelled");
            Err(ErrorData::internal_error("request cancelled", None))
        }
        result = call => into_call_result(result),
    }
}

/// The inbound `Authorization` header, as attached to the request by the HTTP transport.
fn inbound_authorization(context: &RequestContext<RoleServer>) -> Option<HeaderValue> {
    context
        .extensions
        .get::<Parts>()
        .and_then(|parts| parts.headers.get(AUTHORIZATION))
        .cloned()
}

/// Bad requests become JSON-RPC errors; backend failures become `isError` tool results.
fn into_call_result(result: Result<String, ToolCallError>) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(body) => Ok(CallToolResult::success(vec![Content::text(body)])),
        Err(ToolCallError::Forward(e)) => Ok(forward_error_result(&e)),
        Err(
            e @ (ToolCallError::UnknownTool(_)
            | ToolCallError::MissingParam(_)
            | ToolCallError::InvalidParam(_)),
        ) => Err(ErrorData::invalid_params(e.to_string(), None)),
    }
}

fn forward_error_result(err: &ForwardError) -> CallToolResult {
    let mut result = CallToolResult::error(vec![Content::text(err.to_string())]);
    if let ForwardError::Http { status, body } = err {
        result.structured_content = Some(json!({ "status": status, "body": body }));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flexo_mms_http_tools::runtime::{
        BackendResponse, Forwarder, HttpTransport, OutboundRequest, ReqwestTransport,
    };
    use parking_lot::Mutex;
    use rmcp::model::JsonObject;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::oneshot;

    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    /// Never answers; reports when a request starts and when its future is dropped.
    struct StalledTransport {
        started: Mutex<Option<oneshot::Sender<()>>>,
        dropped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl HttpTransport for StalledTransport {
        async fn send(
            &self,
            _request: OutboundRequest,
        ) -> flexo_mms_http_tools::runtime::Result<BackendResponse> {
            let _guard = SetOnDrop(self.dropped.clone());
            if let Some(tx) = self.started.lock().take() {
                let _ = tx.send(());
            }
            std::future::pending().await
        }
    }

    fn text_of(result: &CallToolResult) -> String {
        let v = serde_json::to_value(result).expect("CallToolResult serializes");
        v.get("content")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .expect("content[0].text")
            .to_string()
    }

    #[test]
    fn success_returns_body_unchanged() {
        let body = "<urn:a> <urn:b> \"caf\u{e9}\" .\n";
        let result = into_call_result(Ok(body.to_string())).expect("ok");
        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), body);
    }

    #[test]
    fn unknown_tool_is_invalid_params() {
        let err = into_call_result(Err(ToolCallError::UnknownTool("create_org".to_string())))
            .unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "unknown tool: create_org");
    }

    #[test]
    fn missing_param_is_invalid_params() {
        let err = into_call_result(Err(ToolCallError::MissingParam("org_id"))).unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn upstream_error_carries_status_and_body() {
        let result = into_call_result(Err(ToolCallError::Forward(ForwardError::Http {
            status: 403,
            body: "forbidden: org acme".to_string(),
        })))
        .expect("tool-level error");

        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result.structured_content,
            Some(json!({ "status": 403, "body": "forbidden: org acme" }))
        );
        let text = text_of(&result);
        assert!(text.contains("403"), "{text}");
        assert!(text.contains("forbidden: org acme"), "{text}");
    }

    #[test]
    fn config_error_is_a_tool_error_without_structured_content() {
        let result = into_call_result(Err(ToolCallError::Forward(ForwardError::Config(
            "MMS_URL is not set; no backend to forward to".to_string(),
        ))))
        .expect("tool-level error");
        assert_eq!(result.is_error, Some(true));
        assert!(result.structured_content.is_none());
        assert!(text_of(&result).contains("MMS_URL"));
    }

    #[test]
    fn invalid_param_is_invalid_params() {
        let err = into_call_result(Err(ToolCallError::InvalidParam("org_id"))).unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("scalar"), "{}", err.message);
    }

    #[tokio::test]
    async fn cancellation_drops_the_outbound_request() {
        let (started_tx, started_rx) = oneshot::channel();
        let dropped = Arc::new(AtomicBool::new(false));
        let transport = StalledTransport {
            started: Mutex::new(Some(started_tx)),
            dropped: dropped.clone(),
        };
        let registry = Registry::with_forwarder(
            true,
            Forwarder::new("http://mms.local", Arc::new(transport)),
        );
        let ct = CancellationToken::new();
        let arguments = JsonObject::new();

        let call = run_cancellable(
            &ct,
            "read_all_orgs",
            registry.call("read_all_orgs", &arguments, None),
        );
        let cancel = async {
            started_rx.await.expect("request started");
            assert!(!dropped.load(Ordering::SeqCst));
            ct.cancel();
        };
        let (result, ()) = tokio::join!(call, cancel);

        let err = result.unwrap_err();
        assert_eq!(err.message, "request cancelled");
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn uncancelled_call_completes() {
        let ct = CancellationToken::new();
        let result = run_cancellable(&ct, "read_org", async { Ok("body".to_string()) })
            .await
            .expect("ok");
        assert_eq!(text_of(&result), "body");
    }

    #[test]
    fn server_info_advertises_tools_and_mode() {
        let registry = Arc::new(Registry::with_forwarder(
            true,
            Forwarder::new(
                "",
                Arc::new(ReqwestTransport::new(None).expect("transport")),
            ),
        ));
        let info = MmsServer::new(registry, true).get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(
            info.instructions
                .as_deref()
                .is_some_and(|i| i.contains("Read-only"))
        );
    }
}
