#![allow(dead_code)]

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zcn_client::auth::Authorizer;
use zcn_client::client::{Completion, TransactionCallback};
use zcn_client::config::ClientConfig;
use zcn_client::confirmation::Confirmation;
use zcn_common::{
    new_signature_scheme, Discovery, KeyPair, NetworkNodes, Request, Response, SchemeKind,
    SignatureScheme, Transaction, Transport, Wallet, ZcnError, TXN_STATUS_FAILED,
    TXN_STATUS_SUCCESS,
};

/// What one scripted endpoint does with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    /// Miner: echo the submitted transaction. Sharder: confirm it as included.
    Accept,
    /// Sharder: report the transaction as included but failed.
    IncludeFailed,
    /// Reply with this HTTP status and a short body.
    Status(u16),
    /// Connection refused.
    Fail,
    /// Never answers.
    Hang,
    /// Miner: echo a transaction with a different hash.
    WrongHash,
    /// Sharder: a record that claims the queried hash for different contents.
    Forged,
    /// Sharder: a record for some other transaction.
    Unrelated,
}

/// Scripted transport keyed by endpoint base URL. A script is consumed one
/// step per request; the last step repeats.
#[derive(Default)]
pub struct MockTransport {
    scripts: DashMap<String, Vec<Behavior>>,
    calls: DashMap<String, usize>,
    ledger: DashMap<String, Transaction>,
    log: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, base: &str, steps: Vec<Behavior>) {
        self.scripts.insert(base.to_string(), steps);
    }

    pub fn set(&self, base: &str, behavior: Behavior) {
        self.script(base, vec![behavior]);
    }

    /// Makes sharders aware of a transaction that was not submitted here.
    pub fn remember(&self, txn: &Transaction) {
        self.ledger.insert(txn.hash.clone(), txn.clone());
    }

    pub fn calls_to(&self, base: &str) -> usize {
        self.calls.get(base).map_or(0, |c| *c.value())
    }

    pub fn total_calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }

    fn next_step(&self, url: &str) -> Option<(String, Behavior)> {
        let base = self
            .scripts
            .iter()
            .map(|entry| entry.key().clone())
            .find(|base| url.starts_with(&format!("{base}/")))?;
        let mut steps = self.scripts.get_mut(&base)?;
        let step = if steps.len() > 1 {
            steps.remove(0)
        } else {
            steps.first()?.clone()
        };
        Some((base, step))
    }

    fn confirmation(&self, hash: &str, behavior: &Behavior) -> Response {
        let Some(txn) = self.ledger.get(hash).map(|t| t.value().clone()) else {
            return Response::new(404, "transaction not found");
        };
        let mut record = txn.clone();
        let mut claimed = hash.to_string();
        match behavior {
            Behavior::Accept => record.transaction_status = TXN_STATUS_SUCCESS,
            Behavior::IncludeFailed => record.transaction_status = TXN_STATUS_FAILED,
            Behavior::Forged => {
                record.value += 1_000;
                record.transaction_status = TXN_STATUS_SUCCESS;
            }
            Behavior::Unrelated => {
                record.creation_date += 1;
                record.compute_hash();
                record.transaction_status = TXN_STATUS_SUCCESS;
                claimed = record.hash.clone();
            }
            _ => return Response::new(500, "unexpected"),
        }
        let confirmation = Confirmation {
            version: "1.0".into(),
            hash: claimed,
            block_hash: format!("block-{}", &hash[..8]),
            round: 42,
            creation_date: txn.creation_date,
            txn: Some(record),
        };
        let body = serde_json::json!({ "confirmation": confirmation }).to_string();
        Response::new(200, body)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, ZcnError> {
        self.log.lock().unwrap().push(request.clone());
        let Some((base, behavior)) = self.next_step(&request.url) else {
            return Err(ZcnError::NetworkError(format!("no route to {}", request.url)));
        };
        *self.calls.entry(base).or_insert(0) += 1;

        match behavior {
            Behavior::Fail => Err(ZcnError::NetworkError("connection refused".into())),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Behavior::Status(code) => Ok(Response::new(code, format!("status {code}"))),
            _ => match request.body {
                Some(body) => {
                    let mut txn = Transaction::from_json(&body)?;
                    if behavior == Behavior::WrongHash {
                        txn.hash = "0".repeat(64);
                    } else {
                        self.remember(&txn);
                    }
                    Ok(Response::new(200, txn.to_json()?))
                }
                None => {
                    let hash = request.url.rsplit("hash=").next().unwrap_or_default();
                    Ok(self.confirmation(hash, &behavior))
                }
            },
        }
    }
}

#[derive(Default)]
pub struct MockDiscovery {
    pub nodes: Mutex<NetworkNodes>,
    pub calls: AtomicUsize,
}

impl MockDiscovery {
    pub fn new(miners: &[&str], sharders: &[&str]) -> Arc<Self> {
        Arc::new(MockDiscovery {
            nodes: Mutex::new(NetworkNodes {
                miners: miners.iter().map(|s| s.to_string()).collect(),
                sharders: sharders.iter().map(|s| s.to_string()).collect(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Discovery for MockDiscovery {
    async fn resolve(&self, _network: &str) -> Result<NetworkNodes, ZcnError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.nodes.lock().unwrap().clone())
    }
}

/// A block worker that never answers.
pub struct HangingDiscovery;

#[async_trait]
impl Discovery for HangingDiscovery {
    async fn resolve(&self, _network: &str) -> Result<NetworkNodes, ZcnError> {
        std::future::pending::<Result<NetworkNodes, ZcnError>>().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Cosign,
    /// Signs a different hash.
    WrongHash,
    Refuse,
}

/// Holds the counterpart share of a split BLS key.
pub struct MockAuthorizer {
    scheme: Box<dyn SignatureScheme>,
    mode: AuthMode,
    pub calls: AtomicUsize,
}

impl MockAuthorizer {
    pub fn new(share: &KeyPair, mode: AuthMode) -> Arc<Self> {
        let mut scheme = new_signature_scheme(SchemeKind::Bls0Chain);
        scheme.set_private_key(&share.private_key).unwrap();
        Arc::new(MockAuthorizer {
            scheme,
            mode,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Authorizer for MockAuthorizer {
    async fn authorize(&self, txn: &Transaction) -> Result<String, ZcnError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            AuthMode::Cosign => self.scheme.sign(&txn.hash),
            AuthMode::WrongHash => self.scheme.sign(&"ab".repeat(32)),
            AuthMode::Refuse => Err(ZcnError::AuthorizationFailed("share revoked".into())),
        }
    }
}

#[derive(Default)]
pub struct RecordingCallback {
    pub completions: Mutex<Vec<Completion>>,
}

impl RecordingCallback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.completions.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Completion> {
        self.completions.lock().unwrap().last().cloned()
    }
}

impl TransactionCallback for RecordingCallback {
    fn on_complete(&self, completion: &Completion) {
        self.completions.lock().unwrap().push(completion.clone());
    }
}

pub fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn config(scheme: SchemeKind, miners: &[&str], sharders: &[&str]) -> ClientConfig {
    ClientConfig {
        chain_id: "test-chain".into(),
        signature_scheme: scheme,
        miners: urls(miners),
        sharders: urls(sharders),
        min_submit: 0.51,
        min_confirmation: 1,
        node_timeout_ms: 2_000,
        discovery_retries: 0,
        poll_interval_ms: 100,
        max_poll_attempts: 3,
        ..Default::default()
    }
}

pub fn ed25519_wallet(seed: u8) -> Wallet {
    Wallet::from_seed(SchemeKind::Ed25519, &[seed; 32]).unwrap()
}

/// A split-key wallet and the authorizer's share.
pub fn split_wallet() -> (Wallet, KeyPair) {
    let client_share = new_signature_scheme(SchemeKind::Bls0Chain)
        .generate_keys(&[11u8; 32])
        .unwrap();
    let authorizer_share = new_signature_scheme(SchemeKind::Bls0Chain)
        .generate_keys(&[22u8; 32])
        .unwrap();
    let wallet = Wallet::split(client_share, &authorizer_share.public_key).unwrap();
    (wallet, authorizer_share)
}

/// Signed transfer ready for broadcast.
pub fn signed_transfer(value: i64) -> Transaction {
    let wallet = ed25519_wallet(7);
    let mut scheme = new_signature_scheme(SchemeKind::Ed25519);
    scheme
        .set_private_key(&wallet.primary_key().unwrap().private_key)
        .unwrap();
    let mut txn = Transaction::new(&wallet.client_id, &wallet.client_key, "test-chain");
    txn.to_client_id = "recipient".into();
    txn.value = value;
    txn.transaction_data = r#"{"note":"test"}"#.into();
    txn.compute_hash_and_sign(scheme.as_ref()).unwrap();
    txn
}

pub const SECOND: Duration = Duration::from_secs(1);
