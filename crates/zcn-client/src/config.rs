use serde::Deserialize;
use std::time::Duration;
use zcn_common::{SchemeKind, ZcnError};

fn default_scheme() -> SchemeKind {
    SchemeKind::Bls0Chain
}
fn default_min_submit() -> f64 {
    0.5
}
fn default_min_confirmation() -> usize {
    1
}
fn default_node_timeout_ms() -> u64 {
    10_000
}
fn default_discovery_retries() -> usize {
    2
}
fn default_poll_interval_ms() -> u64 {
    1_000
}
fn default_max_poll_attempts() -> usize {
    10
}

/// Read-only network configuration handed to every orchestrator.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub chain_id: String,
    #[serde(default = "default_scheme")]
    pub signature_scheme: SchemeKind,
    /// Discovery base URL, `GET {block_worker}/network`.
    #[serde(default)]
    pub block_worker: Option<String>,
    #[serde(default)]
    pub miners: Vec<String>,
    #[serde(default)]
    pub sharders: Vec<String>,
    /// Fraction of miners that must accept a submission.
    #[serde(default = "default_min_submit")]
    pub min_submit: f64,
    /// Matching confirmed records required from sharders.
    #[serde(default = "default_min_confirmation")]
    pub min_confirmation: usize,
    #[serde(default = "default_node_timeout_ms")]
    pub node_timeout_ms: u64,
    #[serde(default = "default_discovery_retries")]
    pub discovery_retries: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: usize,
    #[serde(default)]
    pub confirmation_deadline_ms: Option<u64>,
    /// Authorization service for split-key wallets.
    #[serde(default)]
    pub auth_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            chain_id: String::new(),
            signature_scheme: default_scheme(),
            block_worker: None,
            miners: Vec::new(),
            sharders: Vec::new(),
            min_submit: default_min_submit(),
            min_confirmation: default_min_confirmation(),
            node_timeout_ms: default_node_timeout_ms(),
            discovery_retries: default_discovery_retries(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            confirmation_deadline_ms: None,
            auth_url: None,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ZcnError> {
        let config: ClientConfig =
            serde_yaml::from_str(content).map_err(|e| ZcnError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ZcnError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ZcnError::ConfigError(format!("Failed to read {path}: {e}")))?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ZcnError> {
        if !(self.min_submit > 0.0 && self.min_submit <= 1.0) {
            return Err(ZcnError::ConfigError(format!(
                "min_submit must be in (0, 1], got {}",
                self.min_submit
            )));
        }
        if self.min_confirmation == 0 {
            return Err(ZcnError::ConfigError(
                "min_confirmation must be at least 1".to_string(),
            ));
        }
        if self.max_poll_attempts == 0 {
            return Err(ZcnError::ConfigError(
                "max_poll_attempts must be at least 1".to_string(),
            ));
        }
        if self.node_timeout_ms == 0 {
            return Err(ZcnError::ConfigError(
                "node_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn node_timeout(&self) -> Duration {
        Duration::from_millis(self.node_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_deadline(&self) -> Option<Duration> {
        self.confirmation_deadline_ms.map(Duration::from_millis)
    }
}
