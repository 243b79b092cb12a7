use crate::crypto::{client_id_from_public_key, combine_public_keys, new_signature_scheme, SchemeKind};
use crate::errors::ZcnError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Ledger operation kind, numeric on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum TransactionType {
    #[default]
    Send,
    LockIn,
    Data,
    SmartContract,
}

impl From<TransactionType> for i32 {
    fn from(t: TransactionType) -> i32 {
        match t {
            TransactionType::Send => 0,
            TransactionType::LockIn => 2,
            TransactionType::Data => 10,
            TransactionType::SmartContract => 1000,
        }
    }
}

impl TryFrom<i32> for TransactionType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TransactionType::Send),
            2 => Ok(TransactionType::LockIn),
            10 => Ok(TransactionType::Data),
            1000 => Ok(TransactionType::SmartContract),
            other => Err(format!("unknown transaction type {other}")),
        }
    }
}

/// Broadcast side of a transaction: `Unsent -> Sent -> {Success, Error}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[default]
    Unsent,
    Sent,
    Success,
    Error,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Success | TransactionStatus::Error)
    }
}

/// Ledger confirmation side: `Unknown -> Pending -> {Success, Fail}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyStatus {
    #[default]
    Unknown,
    Pending,
    Success,
    Fail,
}

impl VerifyStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VerifyStatus::Success | VerifyStatus::Fail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

/// A client identity. `client_key` is the public key transactions are verified
/// against; in a split-key wallet it is the combined key while `keys[0]` holds
/// only the client's share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub client_id: String,
    pub client_key: String,
    pub keys: Vec<KeyPair>,
    #[serde(rename = "mnemonics", default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    #[serde(default)]
    pub version: String,
}

impl Wallet {
    pub fn from_key_pair(pair: KeyPair) -> Result<Self, ZcnError> {
        Ok(Wallet {
            client_id: client_id_from_public_key(&pair.public_key)?,
            client_key: pair.public_key.clone(),
            keys: vec![pair],
            mnemonic: None,
            version: "1.0".to_string(),
        })
    }

    pub fn from_seed(scheme: SchemeKind, seed: &[u8; 32]) -> Result<Self, ZcnError> {
        let pair = new_signature_scheme(scheme).generate_keys(seed)?;
        Self::from_key_pair(pair)
    }

    pub fn random(scheme: SchemeKind) -> Result<Self, ZcnError> {
        let seed: [u8; 32] = rand::random();
        Self::from_seed(scheme, &seed)
    }

    /// Builds a split-key wallet: the client keeps `client_share`, the
    /// counterpart share stays with the authorizer and only its public half is
    /// needed here to derive the combined identity.
    pub fn split(client_share: KeyPair, authorizer_public_key: &str) -> Result<Self, ZcnError> {
        let combined = combine_public_keys(&[&client_share.public_key, authorizer_public_key])?;
        Ok(Wallet {
            client_id: client_id_from_public_key(&combined)?,
            client_key: combined,
            keys: vec![client_share],
            mnemonic: None,
            version: "1.0".to_string(),
        })
    }

    pub fn primary_key(&self) -> Result<&KeyPair, ZcnError> {
        self.keys
            .first()
            .ok_or_else(|| ZcnError::Validation("wallet has no keys".to_string()))
    }
}

/// Capability token for delegated access to a stored object. Only decoded and
/// structurally checked here; its construction lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTicket {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub allocation_id: String,
    #[serde(default)]
    pub file_path_hash: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub reference_type: String,
    #[serde(default)]
    pub expiration: i64,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub signature: String,
}

impl AuthTicket {
    /// Decodes a base64 JSON ticket and checks the fields a lookup needs.
    pub fn decode(encoded: &str) -> Result<Self, ZcnError> {
        if encoded.trim().is_empty() {
            return Err(ZcnError::Validation("empty auth ticket".to_string()));
        }
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ZcnError::Validation(format!("auth ticket is not base64: {e}")))?;
        let ticket: AuthTicket = serde_json::from_slice(&raw)
            .map_err(|e| ZcnError::Validation(format!("auth ticket is not valid json: {e}")))?;
        ticket.validate()?;
        Ok(ticket)
    }

    pub fn validate(&self) -> Result<(), ZcnError> {
        if self.file_name.is_empty() {
            return Err(ZcnError::Validation("auth ticket has no file name".to_string()));
        }
        if self.file_path_hash.is_empty() {
            return Err(ZcnError::Validation("auth ticket has no lookup hash".to_string()));
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<String, ZcnError> {
        Ok(STANDARD.encode(serde_json::to_vec(self)?))
    }
}

/// Endpoint lists served by the discovery source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNodes {
    #[serde(default)]
    pub miners: Vec<String>,
    #[serde(default)]
    pub sharders: Vec<String>,
}
