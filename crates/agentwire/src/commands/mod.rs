//! CLI command handlers.

pub mod history;
pub mod run;
pub mod stop;

use agentwire_client::{AgentClient, ClientBuilder};
use anyhow::{Context as _, Result};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Agent service base URL.
    pub agent_url: Option<String>,
    /// Tenant routing identifier override.
    pub tenant_id: Option<String>,
    /// Dispatch route override.
    pub route: Option<String>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build a client from the global flags.
    pub fn client(&self) -> Result<AgentClient> {
        let url = self
            .agent_url
            .as_deref()
            .context("no agent service configured; pass --agent-url or set AGENT_URL")?;

        let mut builder = ClientBuilder::new().base_url(url);
        if let Some(tenant) = &self.tenant_id {
            builder = builder.tenant_id(tenant);
        }
        if let Some(route) = &self.route {
            builder = builder.dispatch_route(route);
        }

        let client = builder.build()?;
        tracing::debug!(base_url = %client.base_url(), "client ready");
        Ok(client)
    }
}

/// Parse a command-line argument as JSON.
pub fn parse_json(raw: &str) -> std::result::Result<serde_json::Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}
