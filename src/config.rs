//! Runtime configuration for the print agent and the designer server.
//!
//! Values come from CLI flags with environment fallbacks (see `main.rs`);
//! the structs here are plain data with defaults.

use std::path::PathBuf;

use crate::registry::{JsonFileStore, LabelTypeStore, RestStore};
use crate::transport::CopyCommand;

pub const DEFAULT_AGENT_PORT: u16 = 18080;
pub const DEFAULT_AGENT_HOST: &str = "0.0.0.0";
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_SHARE_HOST: &str = "localhost";
pub const DEFAULT_PRINTER: &str = "ZDesigner";
pub const DEFAULT_LABEL_TYPES: &str = "label_types.json";

/// Local print agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub host: String,
    pub port: u16,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_AGENT_HOST.into(),
            port: DEFAULT_AGENT_PORT,
        }
    }
}

impl AgentConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where label types are persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryConfig {
    File(PathBuf),
    Rest { url: String, api_key: Option<String> },
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_LABEL_TYPES))
    }
}

impl RegistryConfig {
    pub fn into_store(self, client: reqwest::Client) -> Box<dyn LabelTypeStore> {
        match self {
            Self::File(path) => Box::new(JsonFileStore::new(path)),
            Self::Rest { url, api_key } => Box::new(RestStore::new(client, url, api_key)),
        }
    }
}

/// Designer API and server-side print proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Host that shares the printers (Windows copy target)
    pub share_host: String,
    /// Printer used when a proxy request names none
    pub default_printer: String,
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN.into(),
            share_host: DEFAULT_SHARE_HOST.into(),
            default_printer: DEFAULT_PRINTER.into(),
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn copy_command(&self) -> CopyCommand {
        CopyCommand::for_host(&self.share_host)
    }
}
