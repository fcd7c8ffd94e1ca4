//! Tool registry and generic executor.
//!
//! The registry is the catalog filtered once by the read-only flag. Tools are dispatched by name
//! to a single executor that binds arguments into the operation's path template and hands the
//! request to the [`Forwarder`].

use crate::catalog::{Capability, OPERATIONS, OperationSpec, ParamSpec};
use crate::config::AdapterConfig;
use crate::error::ToolCallError;
use flexo_mms_http_tools::runtime::{ForwardRequest, Forwarder, HttpTransport};
use flexo_mms_http_tools::semantics::{annotations_for_method, query_annotations};
use reqwest::header::HeaderValue;
use rmcp::model::{JsonObject, Tool};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

pub struct Registry {
    operations: Vec<&'static OperationSpec>,
    forwarder: Forwarder,
}

impl Registry {
    #[must_use]
    pub fn new(config: &AdapterConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_forwarder(
            config.read_only,
            Forwarder::new(config.mms_url.clone(), transport),
        )
    }

    /// Build the exposed operation set. Write operations are left out entirely in read-only mode.
    #[must_use]
    pub fn with_forwarder(read_only: bool, forwarder: Forwarder) -> Self {
        let operations = OPERATIONS
            .iter()
            .filter(|op| !read_only || op.capability == Capability::Read)
            .collect();
        Self {
            operations,
            forwarder,
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static OperationSpec> {
        self.operations.iter().copied().find(|op| op.name == name)
    }

    /// MCP tool descriptors, in catalog order.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.operations.iter().map(|op| tool_for(op)).collect()
    }

    /// Execute `name` with `arguments`, relaying `authorization` to the backend.
    ///
    /// # Errors
    ///
    /// - [`ToolCallError::UnknownTool`] if `name` is not exposed
    /// - [`ToolCallError::MissingParam`] / [`ToolCallError::InvalidParam`] for bad arguments
    /// - [`ToolCallError::Forward`] if forwarding fails
    pub async fn call(
        &self,
        name: &str,
        arguments: &JsonObject,
        authorization: Option<&HeaderValue>,
    ) -> Result<String, ToolCallError> {
        let op = self
            .get(name)
            .ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;

        let path = resolve_path(op, arguments)?;
        let body = op
            .body_param()
            .map(|p| required_arg(arguments, p.name).map(|text| (text, p.kind.content_type())))
            .transpose()?;

        debug!(tool = op.name, method = %op.method, path = %path, "calling MMS tool");

        let mut request =
            ForwardRequest::new(op.method.clone(), &path).authorization(authorization);
        if let Some((text, content_type)) = &body {
            request = request.body(text, *content_type);
        }
        Ok(self.forwarder.forward(request).await?)
    }
}

fn tool_for(op: &OperationSpec) -> Tool {
    let mut tool = Tool::new(op.name, op.description, Arc::new(input_schema(op.params)));
    tool.annotations = Some(match op.capability {
        Capability::Read => query_annotations(),
        Capability::Write => annotations_for_method(&op.method),
    });
    tool
}

fn input_schema(params: &[ParamSpec]) -> JsonObject {
    let mut properties = JsonObject::new();
    for p in params {
        properties.insert(
            p.name.to_string(),
            json!({ "type": "string", "description": p.description }),
        );
    }

    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !params.is_empty() {
        let required: Vec<&str> = params.iter().map(|p| p.name).collect();
        schema.insert("required".to_string(), json!(required));
    }
    schema
}

/// Substitute identifier arguments into the template, segment by segment.
fn resolve_path(op: &OperationSpec, arguments: &JsonObject) -> Result<String, ToolCallError> {
    let mut path = String::with_capacity(op.path.len() + 32);
    for segment in op.path.split('/').skip(1) {
        path.push('/');
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => path.push_str(&required_arg(arguments, name)?),
            None => path.push_str(segment),
        }
    }
    Ok(path)
}

fn required_arg(arguments: &JsonObject, name: &'static str) -> Result<String, ToolCallError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Err(ToolCallError::MissingParam(name)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => Err(ToolCallError::InvalidParam(name)),
    }
}
