//! Process configuration.
//!
//! Everything is read once at startup from CLI flags, each with an environment fallback, and then
//! frozen into an [`AdapterConfig`] that is passed by reference to whatever needs it.

use crate::error::{AdapterError, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "flexo-mms-mcp",
    version,
    about = "Expose the Flexo MMS layer 1 API as MCP tools over streamable HTTP"
)]
pub struct Cli {
    /// Base URL of the MMS layer 1 service. Tool calls fail while this is empty.
    #[arg(long, env = "MMS_URL", default_value = "")]
    pub mms_url: String,

    /// Only expose read/query tools. Any value other than `true` enables the write tools.
    #[arg(
        long,
        env = "READ_ONLY",
        default_value = "true",
        value_parser = parse_read_only,
        action = ArgAction::Set
    )]
    pub read_only: bool,

    /// Path the MCP endpoint is mounted on.
    #[arg(long, env = "MCPPATH", default_value = "/mcp")]
    pub mcp_path: String,

    /// Listen address.
    #[arg(long, env = "FLEXO_MMS_MCP_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Timeout for each outbound MMS request, in seconds (0 = none).
    #[arg(long, env = "FLEXO_MMS_MCP_REQUEST_TIMEOUT_SECS", default_value_t = 0)]
    pub request_timeout_secs: u64,

    /// Log filter directive (e.g. `info`, `flexo_mms_mcp=debug`).
    #[arg(long, env = "FLEXO_MMS_MCP_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "FLEXO_MMS_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[allow(clippy::unnecessary_wraps)]
fn parse_read_only(s: &str) -> std::result::Result<bool, String> {
    Ok(s.eq_ignore_ascii_case("true"))
}

/// Validated, immutable adapter configuration.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Empty when unset.
    pub mms_url: String,
    pub read_only: bool,
    pub mcp_path: String,
    pub bind: SocketAddr,
    pub request_timeout: Option<Duration>,
}

impl AdapterConfig {
    /// # Errors
    ///
    /// Returns [`AdapterError::Config`] if `MMS_URL` is set but not an `http(s)` URL.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mms_url = cli.mms_url.trim().to_string();
        if !mms_url.is_empty() {
            let parsed = Url::parse(&mms_url)
                .map_err(|e| AdapterError::Config(format!("Invalid MMS_URL '{mms_url}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AdapterError::Config(format!(
                    "Invalid MMS_URL '{mms_url}': scheme must be http or https"
                )));
            }
        }

        Ok(Self {
            mms_url,
            read_only: cli.read_only,
            mcp_path: normalize_mcp_path(&cli.mcp_path),
            bind: cli.bind,
            request_timeout: (cli.request_timeout_secs > 0)
                .then(|| Duration::from_secs(cli.request_timeout_secs)),
        })
    }
}

/// Leading `/`, no trailing `/` (except for the root path itself).
#[must_use]
pub fn normalize_mcp_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    format!("/{trimmed}")
}
