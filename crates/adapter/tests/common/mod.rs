use anyhow::Context as _;
use std::process::{Child, Command};
use std::time::Duration;

pub use flexo_mms_test_support::{KillOnDrop, MockBackend, MockReply};

pub fn pick_unused_port() -> anyhow::Result<u16> {
    flexo_mms_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    flexo_mms_test_support::wait_http_ok(url, timeout_dur).await
}

/// Adapter process settings; everything goes through the environment, as in a deployment.
pub struct AdapterEnv<'a> {
    pub mms_url: &'a str,
    pub read_only: &'a str,
    pub mcp_path: &'a str,
}

impl Default for AdapterEnv<'_> {
    fn default() -> Self {
        Self {
            mms_url: "",
            read_only: "true",
            mcp_path: "/mcp",
        }
    }
}

pub fn spawn_adapter(env: &AdapterEnv<'_>, port: u16) -> anyhow::Result<Child> {
    let bin = env!("CARGO_BIN_EXE_flexo-mms-mcp");
    Command::new(bin)
        .env("MMS_URL", env.mms_url)
        .env("READ_ONLY", env.read_only)
        .env("MCPPATH", env.mcp_path)
        .env("FLEXO_MMS_MCP_BIND", format!("127.0.0.1:{port}"))
        .env("FLEXO_MMS_MCP_LOG", "info")
        .spawn()
        .context("spawn adapter")
}

/// Spawn the adapter and wait until `/health` answers. Returns the adapter's base URL.
pub async fn start_adapter(env: &AdapterEnv<'_>) -> anyhow::Result<(String, KillOnDrop)> {
    let port = pick_unused_port()?;
    let child = KillOnDrop(spawn_adapter(env, port)?);

    let base_url = format!("http://127.0.0.1:{port}");
    wait_http_ok(&format!("{base_url}/health"), Duration::from_secs(20)).await?;

    Ok((base_url, child))
}
