use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use zcn_common::{Discovery, NetworkNodes, Request, Transport, ZcnError};

const NETWORK_PATH: &str = "/network";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Miners,
    Sharders,
}

impl NodeRole {
    fn pick<'a>(&self, nodes: &'a NetworkNodes) -> &'a [String] {
        match self {
            NodeRole::Miners => &nodes.miners,
            NodeRole::Sharders => &nodes.sharders,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Miners => f.write_str("miners"),
            NodeRole::Sharders => f.write_str("sharders"),
        }
    }
}

#[derive(Debug, Default)]
struct CacheEntry {
    generation: u64,
    nodes: Option<NetworkNodes>,
}

/// Discovered endpoint lists shared between every orchestrator built from the
/// same client. Refreshes are serialized by a separate gate so concurrent
/// refreshes collapse into one; the entry lock is only taken to read or store.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryCache {
    inner: Arc<RwLock<CacheEntry>>,
    refreshing: Arc<Mutex<()>>,
}

impl DiscoveryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn nodes(&self) -> Option<NetworkNodes> {
        self.inner.read().await.nodes.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }
}

/// Endpoints currently in use by a [`NodeSet`], tagged with the cache
/// generation they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub generation: u64,
    pub urls: Vec<String>,
}

impl Endpoints {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

fn normalize(urls: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(urls.len());
    for url in urls {
        let url = url.trim().trim_end_matches('/');
        if !url.is_empty() && !out.iter().any(|u| u == url) {
            out.push(url.to_string());
        }
    }
    out
}

/// Ordered endpoint list for one role, with a discovery fallback.
#[derive(Clone)]
pub struct NodeSet {
    role: NodeRole,
    configured: Vec<String>,
    network: Option<String>,
    discovery: Option<Arc<dyn Discovery>>,
    cache: DiscoveryCache,
}

impl fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSet")
            .field("role", &self.role)
            .field("configured", &self.configured)
            .field("network", &self.network)
            .field("discovery", &self.discovery.is_some())
            .finish()
    }
}

impl NodeSet {
    pub fn new(role: NodeRole, configured: &[String]) -> Self {
        NodeSet {
            role,
            configured: normalize(configured),
            network: None,
            discovery: None,
            cache: DiscoveryCache::new(),
        }
    }

    pub fn with_discovery(
        mut self,
        network: impl Into<String>,
        discovery: Arc<dyn Discovery>,
        cache: DiscoveryCache,
    ) -> Self {
        self.network = Some(network.into());
        self.discovery = Some(discovery);
        self.cache = cache;
        self
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn has_discovery(&self) -> bool {
        self.discovery.is_some()
    }

    /// Discovered endpoints once a refresh has happened, the configured ones
    /// before that.
    pub async fn endpoints(&self) -> Endpoints {
        let entry = self.cache.inner.read().await;
        let discovered = entry
            .nodes
            .as_ref()
            .map(|nodes| normalize(self.role.pick(nodes)))
            .filter(|urls| !urls.is_empty());
        Endpoints {
            generation: entry.generation,
            urls: discovered.unwrap_or_else(|| self.configured.clone()),
        }
    }

    /// Re-resolves the endpoint list, giving discovery at most `timeout`. If
    /// another task refreshed the cache since `seen` was read, its result is
    /// reused instead of resolving again.
    pub async fn refresh(&self, seen: &Endpoints, timeout: Duration) -> Result<Endpoints, ZcnError> {
        let (Some(network), Some(discovery)) = (&self.network, &self.discovery) else {
            return Err(ZcnError::ConfigError(format!(
                "no discovery source configured for {}",
                self.role
            )));
        };

        let _gate = self.cache.refreshing.lock().await;
        if self.cache.generation().await == seen.generation {
            let nodes = tokio::time::timeout(timeout, discovery.resolve(network))
                .await
                .map_err(|_| ZcnError::Timeout(format!("discovery from {network} timed out")))??;
            info!(
                "Discovered {} miners and {} sharders from {}",
                nodes.miners.len(),
                nodes.sharders.len(),
                network
            );
            let mut entry = self.cache.inner.write().await;
            entry.nodes = Some(nodes);
            entry.generation += 1;
        }

        let entry = self.cache.inner.read().await;
        let urls = entry
            .nodes
            .as_ref()
            .map(|nodes| normalize(self.role.pick(nodes)))
            .unwrap_or_default();
        if urls.is_empty() {
            warn!("Discovery returned no {} for {}", self.role, network);
        }
        Ok(Endpoints {
            generation: entry.generation,
            urls,
        })
    }
}

/// Resolves the network through a block worker's `/network` endpoint.
pub struct BlockWorkerDiscovery {
    transport: Arc<dyn Transport>,
}

impl BlockWorkerDiscovery {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Discovery for BlockWorkerDiscovery {
    async fn resolve(&self, network: &str) -> Result<NetworkNodes, ZcnError> {
        let url = format!("{}{}", network.trim_end_matches('/'), NETWORK_PATH);
        let response = self.transport.send(Request::get(url)).await?;
        if !response.is_success() {
            return Err(ZcnError::NetworkError(format!(
                "discovery returned HTTP {}: {}",
                response.status, response.body
            )));
        }
        serde_json::from_str(&response.body)
            .map_err(|e| ZcnError::SerializationError(e.to_string()))
    }
}
