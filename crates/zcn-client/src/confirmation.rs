use crate::cancel::Cancellation;
use crate::config::ClientConfig;
use crate::node_set::NodeSet;
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zcn_common::{Request, Transaction, Transport, ZcnError, TXN_STATUS_FAILED, TXN_STATUS_SUCCESS};

pub const TXN_VERIFY_URL: &str = "/v1/transaction/get/confirmation?hash=";

/// Block inclusion record served by a sharder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub version: String,
    pub hash: String,
    #[serde(default)]
    pub block_hash: String,
    #[serde(default)]
    pub round: i64,
    #[serde(default)]
    pub creation_date: i64,
    #[serde(default)]
    pub txn: Option<Transaction>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConfirmationResponse {
    confirmation: Confirmation,
}

impl Confirmation {
    /// True when the record is about `hash` and its embedded transaction
    /// really hashes to it.
    pub fn matches(&self, hash: &str) -> bool {
        match &self.txn {
            Some(txn) => self.hash == hash && txn.hash == hash && txn.digest() == hash,
            None => false,
        }
    }

    pub fn status(&self) -> i32 {
        self.txn.as_ref().map_or(0, |t| t.transaction_status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: usize,
    pub deadline: Option<Duration>,
    pub min_confirmations: usize,
    pub timeout_per_node: Duration,
}

impl PollPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        PollPolicy {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
            deadline: config.confirmation_deadline(),
            min_confirmations: config.min_confirmation,
            timeout_per_node: config.node_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SharderAnswer {
    Included(Confirmation),
    Excluded(Confirmation),
    Nothing,
    /// Transport error or per-node timeout.
    Unreachable,
}

/// Polls sharders until enough of them report the transaction as included.
#[derive(Clone)]
pub struct ConfirmationPoller {
    transport: Arc<dyn Transport>,
    sharders: NodeSet,
    policy: PollPolicy,
}

impl ConfirmationPoller {
    pub fn new(transport: Arc<dyn Transport>, sharders: NodeSet, policy: PollPolicy) -> Self {
        Self {
            transport,
            sharders,
            policy,
        }
    }

    pub async fn poll(&self, hash: &str, cancel: &Cancellation) -> Result<Confirmation, ZcnError> {
        if hash.is_empty() {
            return Err(ZcnError::InvalidTransaction);
        }
        let cancel = match self.policy.deadline {
            Some(deadline) => cancel.clone().with_deadline(Instant::now() + deadline),
            None => cancel.clone(),
        };

        let mut endpoints = self.sharders.endpoints().await;
        let mut discovered = false;
        let mut unreachable = false;

        for attempt in 1..=self.policy.max_attempts {
            if cancel.is_cancelled() {
                break;
            }
            if (endpoints.is_empty() || unreachable) && !discovered && self.sharders.has_discovery() {
                discovered = true;
                let refreshed = tokio::select! {
                    refreshed = self.sharders.refresh(&endpoints, self.policy.timeout_per_node) => refreshed,
                    _ = cancel.cancelled() => break,
                };
                match refreshed {
                    Ok(fresh) if !fresh.is_empty() => endpoints = fresh,
                    Ok(_) => {}
                    Err(e) => warn!("Sharder discovery failed: {}", e),
                }
            }

            if !endpoints.is_empty() {
                let answer = tokio::select! {
                    answer = self.poll_round(hash, &endpoints.urls) => answer,
                    _ = cancel.cancelled() => break,
                };
                match answer {
                    Ok(confirmation) => {
                        info!(
                            "Transaction {} confirmed in block {} (round {})",
                            hash, confirmation.block_hash, confirmation.round
                        );
                        return Ok(confirmation);
                    }
                    Err(ZcnError::ConfirmationRejected(h)) => {
                        warn!("Transaction {} was included as failed", h);
                        return Err(ZcnError::ConfirmationRejected(h));
                    }
                    Err(ZcnError::NetworkError(e)) => {
                        warn!("Confirmation attempt {} for {}: {}", attempt, hash, e);
                        unreachable = true;
                    }
                    Err(e) => debug!("Confirmation attempt {} for {}: {}", attempt, hash, e),
                }
            }

            if attempt < self.policy.max_attempts {
                tokio::select! {
                    _ = tokio::time::sleep(self.policy.interval) => {}
                    _ = cancel.cancelled() => break,
                }
            }
        }

        warn!("No confirmation for {}", hash);
        Err(ZcnError::ConfirmationTimeout(hash.to_string()))
    }

    /// One query to every sharder. Returns as soon as enough matching
    /// records agree either way, and a network error when no sharder answered
    /// at all.
    async fn poll_round(&self, hash: &str, urls: &[String]) -> Result<Confirmation, ZcnError> {
        let required = self.policy.min_confirmations.max(1);
        let mut pending: FuturesUnordered<_> = urls
            .iter()
            .map(|url| async move { (url.as_str(), self.query(url, hash).await) })
            .collect();

        let mut included: Vec<Confirmation> = Vec::new();
        let mut excluded = 0;
        let mut answered = 0;
        while let Some((url, answer)) = pending.next().await {
            if answer != SharderAnswer::Unreachable {
                answered += 1;
            }
            match answer {
                SharderAnswer::Included(confirmation) => {
                    included.push(confirmation);
                    if included.len() >= required {
                        return Ok(included.swap_remove(0));
                    }
                }
                SharderAnswer::Excluded(_) => {
                    excluded += 1;
                    if excluded >= required {
                        return Err(ZcnError::ConfirmationRejected(hash.to_string()));
                    }
                }
                SharderAnswer::Nothing => debug!("Sharder {} has no record of {}", url, hash),
                SharderAnswer::Unreachable => {}
            }
        }
        if answered == 0 {
            return Err(ZcnError::NetworkError(format!(
                "none of {} sharders answered",
                urls.len()
            )));
        }
        Err(ZcnError::ConfirmationTimeout(hash.to_string()))
    }

    async fn query(&self, url: &str, hash: &str) -> SharderAnswer {
        let request = Request::get(format!("{url}{TXN_VERIFY_URL}{hash}"));
        let response =
            match tokio::time::timeout(self.policy.timeout_per_node, self.transport.send(request))
                .await
            {
                Ok(Ok(response)) if response.is_success() => response,
                Ok(Ok(response)) => {
                    debug!("Sharder {} returned HTTP {}", url, response.status);
                    return SharderAnswer::Nothing;
                }
                Ok(Err(e)) => {
                    warn!("Sharder {} unreachable: {}", url, e);
                    return SharderAnswer::Unreachable;
                }
                Err(_) => {
                    warn!("Sharder {} timed out", url);
                    return SharderAnswer::Unreachable;
                }
            };

        let confirmation = match serde_json::from_str::<ConfirmationResponse>(&response.body) {
            Ok(r) => r.confirmation,
            Err(e) => {
                warn!("Sharder {} sent an unreadable confirmation: {}", url, e);
                return SharderAnswer::Nothing;
            }
        };
        if !confirmation.matches(hash) {
            warn!(
                "Sharder {} returned a record for {} when asked for {}",
                url, confirmation.hash, hash
            );
            return SharderAnswer::Nothing;
        }
        match confirmation.status() {
            TXN_STATUS_SUCCESS => SharderAnswer::Included(confirmation),
            TXN_STATUS_FAILED => SharderAnswer::Excluded(confirmation),
            _ => SharderAnswer::Nothing,
        }
    }
}
