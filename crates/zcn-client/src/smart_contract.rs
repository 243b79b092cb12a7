//! Typed smart-contract calls and their `{"name", "input"}` payloads.
//!
//! Every operation is one variant of [`SmartContractCall`]; the contract it
//! targets and the opcode it carries are fixed per variant, so encoding is a
//! total function of the variant.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zcn_common::{TransactionType, ZcnError};

pub const FAUCET_SC_ADDRESS: &str =
    "6dba10422e368813802877a85039d3985d96760ed844092319743fb3a76712d3";
pub const STORAGE_SC_ADDRESS: &str =
    "6dba10422e368813802877a85039d3985d96760ed844092319743fb3a76712d7";
pub const MINER_SC_ADDRESS: &str =
    "6dba10422e368813802877a85039d3985d96760ed844092319743fb3a76712d9";
pub const VESTING_SC_ADDRESS: &str =
    "2bba5b05949ea59c80aed3ac3474d7379d3be737e8eb5a968c52295e48333ead";
pub const INTEREST_POOL_SC_ADDRESS: &str =
    "cf8d0df9bd8cc637a4ff4e792ffe3686da6220c45f0e1103baa609f3f1751ef4";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRequest {
    pub pool_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTokensRequest {
    pub duration: String,
}

impl LockTokensRequest {
    pub fn new(hours: i64, minutes: i64) -> Self {
        LockTokensRequest {
            duration: format!("{hours}h{minutes}m"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingDest {
    pub id: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingAddRequest {
    pub description: String,
    pub start_time: i64,
    pub duration: i64,
    pub destinations: Option<Vec<VestingDest>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingStopRequest {
    pub pool_id: String,
    pub destination: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingConfig {
    pub min_lock: i64,
    pub min_duration: i64,
    pub max_duration: i64,
    pub max_destinations: i64,
    pub max_description_length: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleMiner {
    pub id: String,
    pub n2n_host: String,
    pub host: String,
    pub port: i32,
    pub delegate_wallet: String,
    pub service_charge: i64,
    pub number_of_delegates: i32,
    pub min_stake: i64,
    pub max_stake: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinerSettings {
    pub simple_miner: Option<SimpleMiner>,
    pub pending: Option<BTreeMap<String, serde_json::Value>>,
    pub active: Option<BTreeMap<String, serde_json::Value>>,
    pub deleting: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerLockRequest {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerUnlockRequest {
    pub id: String,
    pub pool_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAllocationRequest {
    pub data_shards: i32,
    pub parity_shards: i32,
    pub size: i64,
    pub expiration_date: i64,
    pub owner_id: String,
    pub owner_public_key: String,
    pub preferred_blobbers: Option<Vec<String>>,
    pub read_price_range: PriceRange,
    pub write_price_range: PriceRange,
    pub max_challenge_completion_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAllocationRequest {
    pub id: String,
    pub size: i64,
    pub expiration_date: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub allocation_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolLockRequest {
    pub duration: i64,
    pub allocation_id: String,
    pub blobber_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobberRequest {
    pub blobber_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePoolUnlockRequest {
    pub blobber_id: String,
    pub pool_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Terms {
    pub read_price: i64,
    pub write_price: i64,
    pub min_lock_demand: f64,
    pub max_offer_duration: i64,
    pub challenge_completion_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePoolSettings {
    pub delegate_wallet: String,
    pub min_stake: i64,
    pub max_stake: i64,
    pub num_delegates: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blobber {
    pub id: String,
    pub url: String,
    pub terms: Terms,
    pub capacity: i64,
    pub used: i64,
    pub last_health_check: i64,
    pub stake_pool_settings: StakePoolSettings,
}

#[derive(Serialize)]
struct Payload<'a, T: Serialize> {
    name: &'a str,
    input: T,
}

/// The closed set of contract operations this client can submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SmartContractCall {
    /// Any method on any contract; `input` is sent as-is.
    Custom {
        address: String,
        name: String,
        input: serde_json::Value,
    },
    Faucet { method: String, input: Vec<u8> },

    LockTokens(LockTokensRequest),
    UnlockTokens(PoolRequest),

    VestingAdd(VestingAddRequest),
    VestingDelete(PoolRequest),
    VestingStop(VestingStopRequest),
    VestingTrigger(PoolRequest),
    VestingUnlock(PoolRequest),
    VestingUpdateConfig(VestingConfig),

    MinerSettings(MinerSettings),
    MinerLock(MinerLockRequest),
    MinerUnlock(MinerUnlockRequest),

    CreateAllocation(CreateAllocationRequest),
    UpdateAllocation(UpdateAllocationRequest),
    CancelAllocation(AllocationRequest),
    FinalizeAllocation(AllocationRequest),
    CreateReadPool,
    ReadPoolLock(PoolLockRequest),
    ReadPoolUnlock(PoolRequest),
    WritePoolLock(PoolLockRequest),
    WritePoolUnlock(PoolRequest),
    StakePoolLock(BlobberRequest),
    StakePoolUnlock(StakePoolUnlockRequest),
    StakePoolPayInterests(BlobberRequest),
    UpdateBlobberSettings(Blobber),
}

impl SmartContractCall {
    /// Opcode placed in the payload's `name` field.
    pub fn name(&self) -> &str {
        use SmartContractCall::*;
        match self {
            Custom { name, .. } => name,
            Faucet { method, .. } => method,
            LockTokens(_) => "lock",
            UnlockTokens(_) => "unlock",
            VestingAdd(_) => "add",
            VestingDelete(_) => "delete",
            VestingStop(_) => "stop",
            VestingTrigger(_) => "trigger",
            VestingUnlock(_) => "unlock",
            VestingUpdateConfig(_) => "update_config",
            MinerSettings(_) => "update_settings",
            MinerLock(_) => "addToDelegatePool",
            MinerUnlock(_) => "deleteFromDelegatePool",
            CreateAllocation(_) => "new_allocation_request",
            UpdateAllocation(_) => "update_allocation_request",
            CancelAllocation(_) => "cancel_allocation",
            FinalizeAllocation(_) => "finalize_allocation",
            CreateReadPool => "new_read_pool",
            ReadPoolLock(_) => "read_pool_lock",
            ReadPoolUnlock(_) => "read_pool_unlock",
            WritePoolLock(_) => "write_pool_lock",
            WritePoolUnlock(_) => "write_pool_unlock",
            StakePoolLock(_) => "stake_pool_lock",
            StakePoolUnlock(_) => "stake_pool_unlock",
            StakePoolPayInterests(_) => "stake_pool_pay_interests",
            UpdateBlobberSettings(_) => "update_blobber_settings",
        }
    }

    /// Contract address used as the transaction's `to_client_id`.
    pub fn address(&self) -> &str {
        use SmartContractCall::*;
        match self {
            Custom { address, .. } => address,
            Faucet { .. } => FAUCET_SC_ADDRESS,
            LockTokens(_) | UnlockTokens(_) => INTEREST_POOL_SC_ADDRESS,
            VestingAdd(_) | VestingDelete(_) | VestingStop(_) | VestingTrigger(_)
            | VestingUnlock(_) | VestingUpdateConfig(_) => VESTING_SC_ADDRESS,
            MinerSettings(_) | MinerLock(_) | MinerUnlock(_) => MINER_SC_ADDRESS,
            CreateAllocation(_)
            | UpdateAllocation(_)
            | CancelAllocation(_)
            | FinalizeAllocation(_)
            | CreateReadPool
            | ReadPoolLock(_)
            | ReadPoolUnlock(_)
            | WritePoolLock(_)
            | WritePoolUnlock(_)
            | StakePoolLock(_)
            | StakePoolUnlock(_)
            | StakePoolPayInterests(_)
            | UpdateBlobberSettings(_) => STORAGE_SC_ADDRESS,
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        TransactionType::SmartContract
    }

    /// Renders the `transaction_data` string.
    pub fn encode(&self) -> Result<String, ZcnError> {
        use SmartContractCall::*;
        let name = self.name();
        match self {
            Custom { input, .. } => payload(name, input),
            Faucet { input, .. } => payload(name, STANDARD.encode(input)),
            LockTokens(r) => payload(name, r),
            UnlockTokens(r) | VestingDelete(r) | VestingTrigger(r) | VestingUnlock(r)
            | ReadPoolUnlock(r) | WritePoolUnlock(r) => payload(name, r),
            VestingAdd(r) => payload(name, r),
            VestingStop(r) => payload(name, r),
            VestingUpdateConfig(r) => payload(name, r),
            MinerSettings(r) => payload(name, r),
            MinerLock(r) => payload(name, r),
            MinerUnlock(r) => payload(name, r),
            CreateAllocation(r) => payload(name, r),
            UpdateAllocation(r) => payload(name, r),
            CancelAllocation(r) | FinalizeAllocation(r) => payload(name, r),
            CreateReadPool => payload(name, Option::<()>::None),
            ReadPoolLock(r) | WritePoolLock(r) => payload(name, r),
            StakePoolLock(r) | StakePoolPayInterests(r) => payload(name, r),
            StakePoolUnlock(r) => payload(name, r),
            UpdateBlobberSettings(r) => payload(name, r),
        }
    }
}

fn payload<T: Serialize>(name: &str, input: T) -> Result<String, ZcnError> {
    if name.is_empty() {
        return Err(ZcnError::Validation(
            "smart contract method name is empty".to_string(),
        ));
    }
    serde_json::to_string(&Payload { name, input })
        .map_err(|e| ZcnError::SerializationError(e.to_string()))
}
