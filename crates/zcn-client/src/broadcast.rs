use crate::cancel::Cancellation;
use crate::config::ClientConfig;
use crate::node_set::{Endpoints, NodeSet};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use zcn_common::{Request, Transaction, Transport, ZcnError};

pub const PUT_TRANSACTION: &str = "/v1/transaction/put";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuorumPolicy {
    pub min_success_fraction: f64,
    pub timeout_per_node: Duration,
    /// Extra rounds after the first one.
    pub max_retries: usize,
}

impl QuorumPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        QuorumPolicy {
            min_success_fraction: config.min_submit,
            timeout_per_node: config.node_timeout(),
            max_retries: config.discovery_retries,
        }
    }

    /// `ceil(fraction * total)`, never below one.
    pub fn required(&self, total: usize) -> usize {
        // The epsilon keeps e.g. 0.7 * 10 from rounding up to 8.
        let exact = self.min_success_fraction * total as f64 - 1e-9;
        (exact.ceil().max(1.0) as usize).min(total.max(1))
    }
}

/// What one miner did with the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    /// 2xx echoing the submitted hash; carries the body.
    Accepted(String),
    /// The validator refused the transaction (4xx).
    Rejected(String),
    /// 2xx whose body is not the submitted transaction.
    Violation(String),
    /// Unreachable, timed out, or a server side error.
    Failed(String),
}

impl NodeOutcome {
    /// Rejections and protocol violations are final for that endpoint.
    fn is_final(&self) -> bool {
        matches!(self, NodeOutcome::Rejected(_) | NodeOutcome::Violation(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub accepted: usize,
    pub required: usize,
    pub total: usize,
    pub attempts: usize,
    /// Body returned by one of the accepting miners.
    pub output: String,
}

/// Latest outcome per miner across every round of one broadcast.
#[derive(Debug, Default)]
struct Outcomes {
    by_url: Vec<(String, NodeOutcome)>,
}

impl Outcomes {
    fn record(&mut self, url: String, outcome: NodeOutcome) {
        match self.by_url.iter().position(|(u, _)| *u == url) {
            Some(i) => self.by_url[i].1 = outcome,
            None => self.by_url.push((url, outcome)),
        }
    }

    fn accepted(&self, urls: &[String]) -> usize {
        self.by_url
            .iter()
            .filter(|(url, outcome)| matches!(outcome, NodeOutcome::Accepted(_)) && urls.contains(url))
            .count()
    }

    fn has_accepted(&self, url: &str) -> bool {
        self.by_url
            .iter()
            .any(|(u, outcome)| u == url && matches!(outcome, NodeOutcome::Accepted(_)))
    }

    fn is_final(&self, url: &str) -> bool {
        self.by_url
            .iter()
            .any(|(u, outcome)| u == url && outcome.is_final())
    }

    fn first_output(&self) -> String {
        self.by_url
            .iter()
            .find_map(|(_, outcome)| match outcome {
                NodeOutcome::Accepted(body) => Some(body.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for (url, outcome) in &self.by_url {
            let what = match outcome {
                NodeOutcome::Accepted(_) => continue,
                NodeOutcome::Rejected(e) => format!("rejected: {e}"),
                NodeOutcome::Violation(e) => e.clone(),
                NodeOutcome::Failed(e) => format!("failed: {e}"),
            };
            parts.push(format!("{url} {what}"));
        }
        parts.join("; ")
    }
}

/// Submits a signed transaction to every miner concurrently and decides on
/// acceptance as soon as the outcome can no longer change. A miner that
/// accepted stays accepted for the rest of the broadcast and is not sent the
/// transaction again.
#[derive(Clone)]
pub struct QuorumBroadcaster {
    transport: Arc<dyn Transport>,
    miners: NodeSet,
    policy: QuorumPolicy,
}

impl QuorumBroadcaster {
    pub fn new(transport: Arc<dyn Transport>, miners: NodeSet, policy: QuorumPolicy) -> Self {
        Self {
            transport,
            miners,
            policy,
        }
    }

    pub fn policy(&self) -> &QuorumPolicy {
        &self.policy
    }

    pub async fn broadcast(
        &self,
        txn: &Transaction,
        cancel: &Cancellation,
    ) -> Result<BroadcastReport, ZcnError> {
        txn.ensure_hash_current()?;
        if txn.signature.is_empty() {
            return Err(ZcnError::Validation(
                "transaction must be signed before broadcast".to_string(),
            ));
        }
        let body = txn.to_json()?;

        let mut endpoints = self.miners.endpoints().await;
        let mut discovered = false;
        let mut outcomes = Outcomes::default();
        let mut last_error: String;
        let mut attempts = 0;

        loop {
            if endpoints.is_empty() && !discovered {
                discovered = true;
                endpoints = self.rediscover(&endpoints, &txn.hash, cancel).await?;
            }
            if endpoints.is_empty() {
                last_error = String::from("no miners available");
                break;
            }

            let required = self.policy.required(endpoints.len());
            // A rediscovered list may already hold enough earlier acceptances.
            if outcomes.accepted(&endpoints.urls) >= required {
                return Ok(self.report(txn, &outcomes, &endpoints, required, attempts));
            }
            let targets: Vec<String> = endpoints
                .urls
                .iter()
                .filter(|url| !outcomes.is_final(url) && !outcomes.has_accepted(url))
                .cloned()
                .collect();
            let needed = required - outcomes.accepted(&endpoints.urls);
            attempts += 1;

            let round = tokio::select! {
                round = self.submit_round(&body, &txn.hash, &targets, needed) => round,
                _ = cancel.cancelled() => return Err(cancelled(&txn.hash)),
            };
            for (url, outcome) in round {
                outcomes.record(url, outcome);
            }

            let accepted = outcomes.accepted(&endpoints.urls);
            if accepted >= required {
                return Ok(self.report(txn, &outcomes, &endpoints, required, attempts));
            }

            last_error = format!(
                "{} of {} required miners accepted: {}",
                accepted,
                required,
                outcomes.summary()
            );
            warn!("Broadcast round {} for {} failed: {}", attempts, txn.hash, last_error);

            if attempts > self.policy.max_retries {
                break;
            }
            if !discovered {
                discovered = true;
                endpoints = self.rediscover(&endpoints, &txn.hash, cancel).await?;
            }
        }

        Err(ZcnError::BroadcastFailed(last_error))
    }

    fn report(
        &self,
        txn: &Transaction,
        outcomes: &Outcomes,
        endpoints: &Endpoints,
        required: usize,
        attempts: usize,
    ) -> BroadcastReport {
        let accepted = outcomes.accepted(&endpoints.urls);
        info!(
            "Transaction {} accepted by {}/{} miners (required {})",
            txn.hash,
            accepted,
            endpoints.len(),
            required
        );
        BroadcastReport {
            accepted,
            required,
            total: endpoints.len(),
            attempts,
            output: outcomes.first_output(),
        }
    }

    /// Refreshes from discovery, keeping the current list when that fails.
    /// Only cancellation is an error.
    async fn rediscover(
        &self,
        current: &Endpoints,
        hash: &str,
        cancel: &Cancellation,
    ) -> Result<Endpoints, ZcnError> {
        if !self.miners.has_discovery() {
            return Ok(current.clone());
        }
        let refreshed = tokio::select! {
            refreshed = self.miners.refresh(current, self.policy.timeout_per_node) => refreshed,
            _ = cancel.cancelled() => return Err(cancelled(hash)),
        };
        Ok(match refreshed {
            Ok(fresh) if !fresh.is_empty() => fresh,
            Ok(_) => current.clone(),
            Err(e) => {
                warn!("Miner discovery failed: {}", e);
                current.clone()
            }
        })
    }

    async fn submit_round(
        &self,
        body: &str,
        hash: &str,
        targets: &[String],
        needed: usize,
    ) -> Vec<(String, NodeOutcome)> {
        let mut outcomes = Vec::new();
        if targets.len() < needed {
            return outcomes;
        }
        let mut pending: FuturesUnordered<_> = targets
            .iter()
            .map(|url| async move {
                let outcome = self.submit_to_node(url, body, hash).await;
                (url.clone(), outcome)
            })
            .collect();

        let mut accepted = 0;
        while let Some((url, outcome)) = pending.next().await {
            match &outcome {
                NodeOutcome::Accepted(_) => {
                    debug!("Miner {} accepted {}", url, hash);
                    accepted += 1;
                }
                other => warn!("Miner {} did not accept {}: {:?}", url, hash, other),
            }
            outcomes.push((url, outcome));

            if accepted >= needed {
                break;
            }
            // Stop waiting on stragglers once quorum is out of reach.
            if accepted + pending.len() < needed {
                break;
            }
        }
        outcomes
    }

    async fn submit_to_node(&self, url: &str, body: &str, hash: &str) -> NodeOutcome {
        let request = Request::post_json(format!("{url}{PUT_TRANSACTION}"), body.to_string());
        let response =
            match tokio::time::timeout(self.policy.timeout_per_node, self.transport.send(request))
                .await
            {
                Err(_) => return NodeOutcome::Failed("timed out".to_string()),
                Ok(Err(e)) => return NodeOutcome::Failed(e.to_string()),
                Ok(Ok(response)) => response,
            };

        if response.is_success() {
            match Transaction::from_json(&response.body) {
                Ok(echo) if echo.hash == hash => NodeOutcome::Accepted(response.body),
                Ok(echo) => violation(format!("echoed hash {} instead of {}", echo.hash, hash), url),
                Err(e) => violation(format!("unreadable response: {e}"), url),
            }
        } else if (400..500).contains(&response.status) {
            NodeOutcome::Rejected(format!("HTTP {}: {}", response.status, response.body))
        } else {
            NodeOutcome::Failed(format!("HTTP {}: {}", response.status, response.body))
        }
    }
}

fn cancelled(hash: &str) -> ZcnError {
    warn!("Broadcast of {} cancelled", hash);
    ZcnError::Timeout(format!("broadcast of {hash} cancelled"))
}

fn violation(what: String, url: &str) -> NodeOutcome {
    NodeOutcome::Violation(ZcnError::ProtocolViolation(what, url.to_string()).to_string())
}
