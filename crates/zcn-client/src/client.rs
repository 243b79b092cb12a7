use crate::auth::{Authorizer, HttpAuthorizer};
use crate::broadcast::{QuorumBroadcaster, QuorumPolicy};
use crate::cancel::Cancellation;
use crate::config::ClientConfig;
use crate::confirmation::{Confirmation, ConfirmationPoller, PollPolicy};
use crate::node_set::{BlockWorkerDiscovery, DiscoveryCache, NodeRole, NodeSet};
use crate::smart_contract::*;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::{Arc, Once};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zcn_common::{
    new_signature_scheme, Discovery, SignatureScheme, Transaction, TransactionStatus,
    TransactionType, Transport, VerifyStatus, Wallet, ZcnError,
};

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
    static ref TX_SUBMITTED: IntCounter = IntCounter::new(
        "zcn_tx_submitted_total",
        "Transactions accepted by a miner quorum"
    )
    .unwrap();
    static ref TX_BROADCAST_FAILED: IntCounter = IntCounter::new(
        "zcn_tx_broadcast_failed_total",
        "Transactions that never reached a miner quorum"
    )
    .unwrap();
    static ref TX_CONFIRMED: IntCounter =
        IntCounter::new("zcn_tx_confirmed_total", "Transactions confirmed by sharders").unwrap();
    static ref TX_REJECTED: IntCounter = IntCounter::new(
        "zcn_tx_rejected_total",
        "Transactions included as failed"
    )
    .unwrap();
}

static METRICS: Once = Once::new();

pub fn init_metrics() {
    METRICS.call_once(|| {
        for counter in [&*TX_SUBMITTED, &*TX_BROADCAST_FAILED, &*TX_CONFIRMED, &*TX_REJECTED] {
            if let Err(e) = REGISTRY.register(Box::new(counter.clone())) {
                warn!("Failed to register metric: {}", e);
            }
        }
    });
}

/// Renders every client counter in the text exposition format.
pub fn gather_metrics() -> Result<String, ZcnError> {
    init_metrics();
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| ZcnError::SerializationError(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| ZcnError::SerializationError(e.to_string()))
}

/// Snapshot of a transaction at its terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub hash: String,
    pub status: TransactionStatus,
    pub verify_status: VerifyStatus,
    pub output: String,
    pub error: Option<ZcnError>,
    pub verify_output: Option<Confirmation>,
    pub verify_error: Option<ZcnError>,
}

/// Invoked exactly once per orchestrator, when it reaches a terminal state.
pub trait TransactionCallback: Send + Sync {
    fn on_complete(&self, completion: &Completion);
}

/// Result accessor answer before and after the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability<T> {
    Pending,
    Ready(T),
}

impl<T> Availability<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Availability::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Availability::Ready(value) => Some(value),
            Availability::Pending => None,
        }
    }
}

/// One logical user operation, for the fire-and-forget form.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Send {
        to_client_id: String,
        value: i64,
        description: String,
    },
    StoreData(String),
    Call {
        call: SmartContractCall,
        value: i64,
    },
    Verify,
}

enum Signer {
    Direct(Box<dyn SignatureScheme>),
    /// Split key: `share` holds the client's share, `combined` only the
    /// combined public key.
    Delegated {
        share: Box<dyn SignatureScheme>,
        combined: Box<dyn SignatureScheme>,
        authorizer: Arc<dyn Authorizer>,
    },
}

/// Shared, read-only side of the client: configuration, identity, endpoint
/// sets and collaborators. Hands out one [`TransactionOrchestrator`] per
/// operation.
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    wallet: Arc<Wallet>,
    transport: Arc<dyn Transport>,
    miners: NodeSet,
    sharders: NodeSet,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl Client {
    /// Direct signing, or delegated signing through `auth_url` when the
    /// configuration names one.
    pub fn new(
        config: Arc<ClientConfig>,
        wallet: Wallet,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ZcnError> {
        config.validate()?;
        wallet.primary_key()?;
        init_metrics();

        let mut client = Client {
            miners: NodeSet::new(NodeRole::Miners, &config.miners),
            sharders: NodeSet::new(NodeRole::Sharders, &config.sharders),
            config: config.clone(),
            wallet: Arc::new(wallet),
            transport: transport.clone(),
            authorizer: None,
        };
        if config.block_worker.is_some() {
            client = client.with_discovery(Arc::new(BlockWorkerDiscovery::new(transport.clone())));
        }
        if let Some(auth_url) = &config.auth_url {
            client = client.with_authorizer(Arc::new(HttpAuthorizer::new(transport, auth_url)))?;
        }
        Ok(client)
    }

    /// Replaces the discovery source; both roles share one cache.
    pub fn with_discovery(mut self, discovery: Arc<dyn Discovery>) -> Self {
        let network = self.config.block_worker.clone().unwrap_or_default();
        let cache = DiscoveryCache::new();
        self.miners = NodeSet::new(NodeRole::Miners, &self.config.miners).with_discovery(
            network.clone(),
            discovery.clone(),
            cache.clone(),
        );
        self.sharders = NodeSet::new(NodeRole::Sharders, &self.config.sharders)
            .with_discovery(network, discovery, cache);
        self
    }

    /// Switches to split-key signing. Only schemes that can add signatures
    /// qualify.
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Result<Self, ZcnError> {
        if !self.config.signature_scheme.supports_aggregation() {
            return Err(ZcnError::ConfigError(format!(
                "{} cannot be used for split-key signing",
                self.config.signature_scheme
            )));
        }
        self.authorizer = Some(authorizer);
        Ok(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn is_delegated(&self) -> bool {
        self.authorizer.is_some()
    }

    pub fn transaction(&self) -> Result<TransactionOrchestrator, ZcnError> {
        self.transaction_with_cancel(Cancellation::never())
    }

    pub fn transaction_with_cancel(
        &self,
        cancel: Cancellation,
    ) -> Result<TransactionOrchestrator, ZcnError> {
        let key = self.wallet.primary_key()?;
        if key.private_key.is_empty() {
            return Err(ZcnError::KeyMissing);
        }
        let kind = self.config.signature_scheme;
        let mut share = new_signature_scheme(kind);
        share.set_private_key(&key.private_key)?;

        let signer = match &self.authorizer {
            None => Signer::Direct(share),
            Some(authorizer) => {
                let mut combined = new_signature_scheme(kind);
                combined.set_public_key(&self.wallet.client_key)?;
                Signer::Delegated {
                    share,
                    combined,
                    authorizer: authorizer.clone(),
                }
            }
        };

        Ok(TransactionOrchestrator {
            config: self.config.clone(),
            wallet: self.wallet.clone(),
            signer,
            broadcaster: QuorumBroadcaster::new(
                self.transport.clone(),
                self.miners.clone(),
                QuorumPolicy::from_config(&self.config),
            ),
            poller: ConfirmationPoller::new(
                self.transport.clone(),
                self.sharders.clone(),
                PollPolicy::from_config(&self.config),
            ),
            cancel,
            txn: Transaction::default(),
            fee: None,
            nonce: None,
            callback: None,
            status: TransactionStatus::Unsent,
            verify_status: VerifyStatus::Unknown,
            output: String::new(),
            error: None,
            verify_output: None,
            verify_error: None,
            completed: false,
            notified: false,
        })
    }
}

/// Drives one transaction through hash, sign, broadcast and confirmation.
///
/// All state is owned by the instance. The intent methods can be awaited to
/// the terminal state, or the orchestrator can be moved into a task with
/// [`TransactionOrchestrator::spawn`] and observed through its callback.
pub struct TransactionOrchestrator {
    config: Arc<ClientConfig>,
    wallet: Arc<Wallet>,
    signer: Signer,
    broadcaster: QuorumBroadcaster,
    poller: ConfirmationPoller,
    cancel: Cancellation,
    txn: Transaction,
    fee: Option<i64>,
    nonce: Option<i64>,
    callback: Option<Arc<dyn TransactionCallback>>,
    status: TransactionStatus,
    verify_status: VerifyStatus,
    output: String,
    error: Option<ZcnError>,
    verify_output: Option<Confirmation>,
    verify_error: Option<ZcnError>,
    completed: bool,
    notified: bool,
}

impl TransactionOrchestrator {
    fn untouched(&self) -> bool {
        self.status == TransactionStatus::Unsent && self.txn.hash.is_empty()
    }

    /// Adopts an existing transaction hash so it can be verified.
    pub fn set_transaction_hash(&mut self, hash: &str) -> Result<(), ZcnError> {
        if !self.untouched() {
            return Err(ZcnError::AlreadyExists("transaction hash".to_string()));
        }
        self.txn.hash = hash.to_string();
        Ok(())
    }

    pub fn set_transaction_callback(
        &mut self,
        callback: Arc<dyn TransactionCallback>,
    ) -> Result<(), ZcnError> {
        if self.callback.is_some() || self.completed || self.status != TransactionStatus::Unsent {
            return Err(ZcnError::AlreadyExists("transaction callback".to_string()));
        }
        self.callback = Some(callback);
        Ok(())
    }

    pub fn set_transaction_fee(&mut self, fee: i64) -> Result<(), ZcnError> {
        if self.fee.is_some() || !self.untouched() {
            return Err(ZcnError::AlreadyExists("transaction fee".to_string()));
        }
        self.fee = Some(fee);
        Ok(())
    }

    pub fn set_transaction_nonce(&mut self, nonce: i64) -> Result<(), ZcnError> {
        if self.nonce.is_some() || !self.untouched() {
            return Err(ZcnError::AlreadyExists("transaction nonce".to_string()));
        }
        self.nonce = Some(nonce);
        Ok(())
    }

    pub fn set_cancellation(&mut self, cancel: Cancellation) {
        self.cancel = cancel;
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        (!self.txn.hash.is_empty()).then_some(self.txn.hash.as_str())
    }

    pub fn transaction(&self) -> &Transaction {
        &self.txn
    }

    pub fn transaction_status(&self) -> TransactionStatus {
        self.status
    }

    pub fn verify_status(&self) -> VerifyStatus {
        self.verify_status
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Body returned by an accepting miner.
    pub fn output(&self) -> Availability<&str> {
        self.when_complete(self.output.as_str())
    }

    pub fn transaction_error(&self) -> Availability<Option<&ZcnError>> {
        self.when_complete(self.error.as_ref())
    }

    pub fn verify_output(&self) -> Availability<Option<&Confirmation>> {
        self.when_complete(self.verify_output.as_ref())
    }

    pub fn verify_error(&self) -> Availability<Option<&ZcnError>> {
        self.when_complete(self.verify_error.as_ref())
    }

    fn when_complete<T>(&self, value: T) -> Availability<T> {
        if self.completed {
            Availability::Ready(value)
        } else {
            Availability::Pending
        }
    }

    pub fn completion(&self) -> Completion {
        Completion {
            hash: self.txn.hash.clone(),
            status: self.status,
            verify_status: self.verify_status,
            output: self.output.clone(),
            error: self.error.clone(),
            verify_output: self.verify_output.clone(),
            verify_error: self.verify_error.clone(),
        }
    }

    /// Runs `intent` on a tokio task. The orchestrator comes back through the
    /// handle; every outcome, input errors included, reaches the callback.
    pub fn spawn(mut self, intent: Intent) -> JoinHandle<Self> {
        tokio::spawn(async move {
            if let Err(e) = self.execute(intent).await {
                if !self.completed {
                    self.fail(e);
                }
            }
            self
        })
    }

    pub async fn execute(&mut self, intent: Intent) -> Result<(), ZcnError> {
        match intent {
            Intent::Send {
                to_client_id,
                value,
                description,
            } => self.send(&to_client_id, value, &description).await,
            Intent::StoreData(data) => self.store_data(&data).await,
            Intent::Call { call, value } => self.call(call, value).await,
            Intent::Verify => self.verify().await,
        }
    }

    pub async fn send(
        &mut self,
        to_client_id: &str,
        value: i64,
        description: &str,
    ) -> Result<(), ZcnError> {
        if to_client_id.is_empty() {
            return Err(ZcnError::Validation("send requires a recipient".to_string()));
        }
        if value < 0 {
            return Err(ZcnError::Validation(format!("negative value {value}")));
        }
        let data = serde_json::json!({ "note": description }).to_string();
        self.submit(TransactionType::Send, to_client_id, value, data)
            .await
    }

    pub async fn store_data(&mut self, data: &str) -> Result<(), ZcnError> {
        if data.is_empty() {
            return Err(ZcnError::Validation("no data to store".to_string()));
        }
        self.submit(TransactionType::Data, "", 0, data.to_string())
            .await
    }

    /// Submits any contract call; `value` is the token amount attached.
    pub async fn call(&mut self, call: SmartContractCall, value: i64) -> Result<(), ZcnError> {
        if value < 0 {
            return Err(ZcnError::Validation(format!("negative value {value}")));
        }
        let data = call.encode()?;
        let address = call.address().to_string();
        debug!("Encoded {} for {}", call.name(), address);
        self.submit(call.transaction_type(), &address, value, data)
            .await
    }

    pub async fn execute_smart_contract(
        &mut self,
        address: &str,
        method_name: &str,
        input: serde_json::Value,
        value: i64,
    ) -> Result<(), ZcnError> {
        if address.is_empty() {
            return Err(ZcnError::Validation(
                "smart contract address is empty".to_string(),
            ));
        }
        let call = SmartContractCall::Custom {
            address: address.to_string(),
            name: method_name.to_string(),
            input,
        };
        self.call(call, value).await
    }

    pub async fn execute_faucet(&mut self, method: &str, input: &[u8]) -> Result<(), ZcnError> {
        let call = SmartContractCall::Faucet {
            method: method.to_string(),
            input: input.to_vec(),
        };
        self.call(call, 0).await
    }

    pub async fn lock_tokens(&mut self, value: i64, hours: i64, minutes: i64) -> Result<(), ZcnError> {
        if hours < 0 || !(0..60).contains(&minutes) || hours + minutes == 0 {
            return Err(ZcnError::Validation(format!(
                "invalid lock duration {hours}h{minutes}m"
            )));
        }
        let call = SmartContractCall::LockTokens(LockTokensRequest::new(hours, minutes));
        self.call(call, value).await
    }

    pub async fn unlock_tokens(&mut self, pool_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::UnlockTokens(pool(pool_id)?), 0)
            .await
    }

    pub async fn vesting_add(&mut self, request: VestingAddRequest, value: i64) -> Result<(), ZcnError> {
        self.call(SmartContractCall::VestingAdd(request), value).await
    }

    pub async fn vesting_delete(&mut self, pool_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::VestingDelete(pool(pool_id)?), 0)
            .await
    }

    pub async fn vesting_stop(&mut self, request: VestingStopRequest) -> Result<(), ZcnError> {
        self.call(SmartContractCall::VestingStop(request), 0).await
    }

    pub async fn vesting_trigger(&mut self, pool_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::VestingTrigger(pool(pool_id)?), 0)
            .await
    }

    pub async fn vesting_unlock(&mut self, pool_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::VestingUnlock(pool(pool_id)?), 0)
            .await
    }

    pub async fn vesting_update_config(&mut self, config: VestingConfig) -> Result<(), ZcnError> {
        self.call(SmartContractCall::VestingUpdateConfig(config), 0)
            .await
    }

    pub async fn miner_update_settings(&mut self, settings: MinerSettings) -> Result<(), ZcnError> {
        self.call(SmartContractCall::MinerSettings(settings), 0).await
    }

    pub async fn miner_lock(&mut self, node_id: &str, value: i64) -> Result<(), ZcnError> {
        let request = MinerLockRequest {
            id: node_id.to_string(),
        };
        self.call(SmartContractCall::MinerLock(request), value).await
    }

    pub async fn miner_unlock(&mut self, node_id: &str, pool_id: &str) -> Result<(), ZcnError> {
        let request = MinerUnlockRequest {
            id: node_id.to_string(),
            pool_id: pool_id.to_string(),
        };
        self.call(SmartContractCall::MinerUnlock(request), 0).await
    }

    pub async fn create_allocation(
        &mut self,
        request: CreateAllocationRequest,
        lock: i64,
    ) -> Result<(), ZcnError> {
        self.call(SmartContractCall::CreateAllocation(request), lock)
            .await
    }

    pub async fn update_allocation(
        &mut self,
        request: UpdateAllocationRequest,
        lock: i64,
    ) -> Result<(), ZcnError> {
        self.call(SmartContractCall::UpdateAllocation(request), lock)
            .await
    }

    pub async fn cancel_allocation(&mut self, allocation_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::CancelAllocation(allocation(allocation_id)), 0)
            .await
    }

    pub async fn finalize_allocation(&mut self, allocation_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::FinalizeAllocation(allocation(allocation_id)), 0)
            .await
    }

    pub async fn create_read_pool(&mut self) -> Result<(), ZcnError> {
        self.call(SmartContractCall::CreateReadPool, 0).await
    }

    pub async fn read_pool_lock(&mut self, request: PoolLockRequest, value: i64) -> Result<(), ZcnError> {
        self.call(SmartContractCall::ReadPoolLock(request), value).await
    }

    pub async fn read_pool_unlock(&mut self, pool_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::ReadPoolUnlock(pool(pool_id)?), 0)
            .await
    }

    pub async fn write_pool_lock(&mut self, request: PoolLockRequest, value: i64) -> Result<(), ZcnError> {
        self.call(SmartContractCall::WritePoolLock(request), value).await
    }

    pub async fn write_pool_unlock(&mut self, pool_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::WritePoolUnlock(pool(pool_id)?), 0)
            .await
    }

    pub async fn stake_pool_lock(&mut self, blobber_id: &str, value: i64) -> Result<(), ZcnError> {
        self.call(SmartContractCall::StakePoolLock(blobber(blobber_id)), value)
            .await
    }

    pub async fn stake_pool_unlock(&mut self, blobber_id: &str, pool_id: &str) -> Result<(), ZcnError> {
        let request = StakePoolUnlockRequest {
            blobber_id: blobber_id.to_string(),
            pool_id: pool_id.to_string(),
        };
        self.call(SmartContractCall::StakePoolUnlock(request), 0).await
    }

    pub async fn stake_pool_pay_interests(&mut self, blobber_id: &str) -> Result<(), ZcnError> {
        self.call(SmartContractCall::StakePoolPayInterests(blobber(blobber_id)), 0)
            .await
    }

    pub async fn update_blobber_settings(&mut self, settings: Blobber) -> Result<(), ZcnError> {
        self.call(SmartContractCall::UpdateBlobberSettings(settings), 0)
            .await
    }

    /// Polls sharders for the current hash. Usable after a submission, after
    /// a confirmation timeout, or on a hash adopted with
    /// [`Self::set_transaction_hash`]. A transaction whose broadcast failed
    /// cannot be verified.
    pub async fn verify(&mut self) -> Result<(), ZcnError> {
        if self.txn.hash.is_empty() || self.status == TransactionStatus::Error {
            return Err(ZcnError::InvalidTransaction);
        }
        let result = self.confirm().await;
        self.finish();
        result
    }

    async fn submit(
        &mut self,
        transaction_type: TransactionType,
        to_client_id: &str,
        value: i64,
        data: String,
    ) -> Result<(), ZcnError> {
        if !self.untouched() {
            return Err(ZcnError::Validation(
                "this orchestrator already holds a transaction".to_string(),
            ));
        }

        let mut txn = Transaction::new(
            &self.wallet.client_id,
            &self.wallet.client_key,
            &self.config.chain_id,
        );
        txn.to_client_id = to_client_id.to_string();
        txn.value = value;
        txn.transaction_data = data;
        txn.transaction_type = transaction_type;
        txn.fee = self.fee.unwrap_or_default();
        txn.nonce = self.nonce.unwrap_or_default();
        txn.compute_hash();
        self.txn = txn;
        info!("Built transaction {} ({:?})", self.txn.hash, transaction_type);

        if let Err(e) = self.sign().await {
            warn!("Signing {} failed: {}", self.txn.hash, e);
            return Err(self.fail(e));
        }

        self.status = TransactionStatus::Sent;
        match self.broadcaster.broadcast(&self.txn, &self.cancel).await {
            Ok(report) => {
                TX_SUBMITTED.inc();
                self.status = TransactionStatus::Success;
                self.output = report.output;
            }
            Err(e) => {
                TX_BROADCAST_FAILED.inc();
                warn!("Transaction {} was not accepted: {}", self.txn.hash, e);
                return Err(self.fail(e));
            }
        }

        let result = self.confirm().await;
        self.finish();
        result
    }

    async fn sign(&mut self) -> Result<(), ZcnError> {
        match &self.signer {
            Signer::Direct(scheme) => self.txn.sign(scheme.as_ref()),
            Signer::Delegated {
                share,
                combined,
                authorizer,
            } => {
                self.txn.sign(share.as_ref())?;
                let counterpart = authorizer.authorize(&self.txn).await.map_err(|e| match e {
                    ZcnError::AuthorizationFailed(_) => e,
                    other => ZcnError::AuthorizationFailed(other.to_string()),
                })?;
                let signature = share
                    .add(&counterpart, &self.txn.hash)
                    .map_err(|e| ZcnError::AuthorizationFailed(e.to_string()))?;
                match combined.verify(&signature, &self.txn.hash) {
                    Ok(true) => {}
                    Ok(false) => {
                        return Err(ZcnError::AuthorizationFailed(
                            "combined signature does not verify".to_string(),
                        ))
                    }
                    Err(e) => return Err(ZcnError::AuthorizationFailed(e.to_string())),
                }
                debug!("Combined signature verified for {}", self.txn.hash);
                self.txn.signature = signature;
                Ok(())
            }
        }
    }

    async fn confirm(&mut self) -> Result<(), ZcnError> {
        self.verify_status = VerifyStatus::Pending;
        self.verify_error = None;
        match self.poller.poll(&self.txn.hash, &self.cancel).await {
            Ok(confirmation) => {
                TX_CONFIRMED.inc();
                self.verify_status = VerifyStatus::Success;
                self.verify_output = Some(confirmation);
                Ok(())
            }
            Err(e) => {
                if matches!(e, ZcnError::ConfirmationRejected(_)) {
                    TX_REJECTED.inc();
                }
                self.verify_status = VerifyStatus::Fail;
                self.verify_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn fail(&mut self, error: ZcnError) -> ZcnError {
        self.status = TransactionStatus::Error;
        self.error = Some(error.clone());
        self.finish();
        error
    }

    fn finish(&mut self) {
        self.completed = true;
        info!(
            "Transaction {} finished: {:?} / {:?}",
            self.txn.hash, self.status, self.verify_status
        );
        if self.notified {
            return;
        }
        self.notified = true;
        if let Some(callback) = &self.callback {
            callback.on_complete(&self.completion());
        }
    }
}

fn pool(pool_id: &str) -> Result<PoolRequest, ZcnError> {
    if pool_id.is_empty() {
        return Err(ZcnError::Validation("pool id is empty".to_string()));
    }
    Ok(PoolRequest {
        pool_id: pool_id.to_string(),
    })
}

fn allocation(allocation_id: &str) -> AllocationRequest {
    AllocationRequest {
        allocation_id: allocation_id.to_string(),
    }
}

fn blobber(blobber_id: &str) -> BlobberRequest {
    BlobberRequest {
        blobber_id: blobber_id.to_string(),
    }
}
