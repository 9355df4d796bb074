//! Bridge configuration
//!
//! A single required endpoint plus optional predefined task type and
//! version. When the endpoint is not given explicitly it falls back to
//! the `TASKBRIDGE_SERVICE_URL` environment variable; missing both is a
//! construction-time error.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Environment variable consulted when no endpoint is given explicitly
pub const SERVICE_URL_ENV: &str = "TASKBRIDGE_SERVICE_URL";

/// Configuration for a work item bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Base URL of the task execution service
    pub service_url: String,

    /// Predefined task type; takes precedence over the work item's
    /// `task_type` parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    /// Predefined task version; takes precedence over the work item's
    /// `task_version` parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_version: Option<u32>,
}

impl BridgeConfig {
    /// Create a configuration with an explicit service endpoint
    pub fn new(service_url: impl Into<String>) -> Result<Self> {
        let config = Self {
            service_url: service_url.into(),
            task_type: None,
            task_version: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration from the `TASKBRIDGE_SERVICE_URL` variable
    pub fn from_env() -> Result<Self> {
        match std::env::var(SERVICE_URL_ENV) {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => Err(Error::MissingEndpoint),
        }
    }

    /// Predefine the task type and version so work items may omit them
    pub fn with_task(mut self, task_type: impl Into<String>, task_version: u32) -> Self {
        self.task_type = Some(task_type.into());
        self.task_version = Some(task_version);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.service_url.is_empty() {
            return Err(Error::MissingEndpoint);
        }
        self.endpoint()?;
        Ok(())
    }

    /// The service endpoint as a parsed URL
    pub fn endpoint(&self) -> Result<Url> {
        let url = Url::parse(&self.service_url).map_err(|e| Error::InvalidEndpoint {
            url: self.service_url.clone(),
            message: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::InvalidEndpoint {
                url: self.service_url.clone(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
