//! Error types for the MMS MCP adapter.

use flexo_mms_http_tools::runtime::ForwardError;
use thiserror::Error;

/// Startup-time error.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Invalid `MMS_URL` or other startup settings
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of a single tool call.
#[derive(Error, Debug)]
pub enum ToolCallError {
    /// The tool is not part of the exposed catalog (includes write tools in read-only mode).
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required parameter: {0}")]
    MissingParam(&'static str),

    #[error("invalid parameter '{0}': expected a scalar value")]
    InvalidParam(&'static str),

    /// The forwarder failed (configuration, upstream status or transport).
    #[error(transparent)]
    Forward(#[from] ForwardError),
}

/// Result type alias for adapter startup.
pub type Result<T> = std::result::Result<T, AdapterError>;
