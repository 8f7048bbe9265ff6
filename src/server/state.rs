//! Shared state for the two HTTP surfaces.

use crate::config::ServerConfig;
use crate::registry::Registry;
use crate::transport::{RawTcpClient, ShareProxy, Spooler};

/// Local print agent state.
pub struct AgentState {
    pub raw: RawTcpClient,
    pub spooler: Box<dyn Spooler>,
}

impl AgentState {
    pub fn new(raw: RawTcpClient, spooler: Box<dyn Spooler>) -> Self {
        Self { raw, spooler }
    }
}

/// Designer server state.
pub struct AppState {
    pub config: ServerConfig,
    pub registry: Registry,
    pub proxy: ShareProxy,
    /// For label type REST calls and image downloads.
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        registry: Registry,
        proxy: ShareProxy,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            registry,
            proxy,
            http_client,
        }
    }
}
