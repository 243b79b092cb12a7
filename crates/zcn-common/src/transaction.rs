use crate::crypto::{sha3_hex, SignatureScheme};
use crate::errors::ZcnError;
use crate::types::TransactionType;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const TRANSACTION_VERSION: &str = "1.0";

/// Ledger inclusion status as reported back in confirmation records.
pub const TXN_STATUS_SUCCESS: i32 = 1;
pub const TXN_STATUS_FAILED: i32 = 2;

/// One ledger operation in its wire form.
///
/// `hash` and `signature` are derived. `hash` covers every other field that the
/// validators hash (see [`Transaction::hash_data`]) and has to be recomputed
/// after any mutation; [`Transaction::sign`] refuses a stale hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_client_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chain_id: String,
    #[serde(default)]
    pub transaction_data: String,
    #[serde(rename = "transaction_value", default)]
    pub value: i64,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub creation_date: i64,
    #[serde(rename = "transaction_fee", default)]
    pub fee: i64,
    #[serde(rename = "transaction_nonce", default)]
    pub nonce: i64,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transaction_output: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub txn_output_hash: String,
    #[serde(default)]
    pub transaction_status: i32,
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

impl Transaction {
    pub fn new(client_id: &str, public_key: &str, chain_id: &str) -> Self {
        Transaction {
            version: TRANSACTION_VERSION.to_string(),
            client_id: client_id.to_string(),
            public_key: public_key.to_string(),
            chain_id: chain_id.to_string(),
            creation_date: now_unix(),
            ..Default::default()
        }
    }

    /// Canonical pre-image of the hash. Field order and the `:` delimiter are
    /// fixed by the validators.
    pub fn hash_data(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}",
            self.creation_date,
            self.nonce,
            self.client_id,
            self.to_client_id,
            self.value,
            sha3_hex(self.transaction_data.as_bytes())
        )
    }

    /// Hash of the current field values, without touching `self.hash`.
    pub fn digest(&self) -> String {
        sha3_hex(self.hash_data().as_bytes())
    }

    pub fn compute_hash(&mut self) -> &str {
        self.hash = self.digest();
        &self.hash
    }

    pub fn is_hash_current(&self) -> bool {
        !self.hash.is_empty() && self.hash == self.digest()
    }

    pub fn ensure_hash_current(&self) -> Result<(), ZcnError> {
        if self.is_hash_current() {
            Ok(())
        } else {
            Err(ZcnError::StaleHash {
                stored: self.hash.clone(),
                computed: self.digest(),
            })
        }
    }

    pub fn sign(&mut self, scheme: &dyn SignatureScheme) -> Result<(), ZcnError> {
        self.ensure_hash_current()?;
        self.signature = scheme.sign(&self.hash)?;
        debug!("Signed transaction {} with {}", self.hash, scheme.kind());
        Ok(())
    }

    pub fn compute_hash_and_sign(&mut self, scheme: &dyn SignatureScheme) -> Result<(), ZcnError> {
        self.compute_hash();
        self.sign(scheme)
    }

    pub fn verify_signature(&self, scheme: &dyn SignatureScheme) -> Result<bool, ZcnError> {
        self.ensure_hash_current()?;
        scheme.verify(&self.signature, &self.hash)
    }

    pub fn to_json(&self) -> Result<String, ZcnError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ZcnError> {
        Ok(serde_json::from_str(json)?)
    }
}
