use crate::{errors::ZcnError, types::KeyPair};
use blst::min_pk::{
    AggregatePublicKey, AggregateSignature, PublicKey as BlsPublicKey, SecretKey as BlsSecretKey,
    Signature as BlsSignature,
};
use blst::BLST_ERROR;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey as PublicKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

/// Domain separation tag for min-pk BLS signatures (signature in G2).
const BLS_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

/// SHA3-256 of `data`, hex encoded.
pub fn sha3_hex(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(data.as_ref());
    hex::encode(hasher.finalize())
}

/// Client ids are the hash of the raw public key bytes.
pub fn client_id_from_public_key(public_key: &str) -> Result<String, ZcnError> {
    let bytes = hex::decode(public_key)
        .map_err(|e| ZcnError::Validation(format!("public key is not hex: {e}")))?;
    Ok(sha3_hex(bytes))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeKind {
    #[serde(rename = "ed25519")]
    Ed25519,
    #[serde(rename = "bls0chain")]
    Bls0Chain,
}

impl SchemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeKind::Ed25519 => "ed25519",
            SchemeKind::Bls0Chain => "bls0chain",
        }
    }

    pub fn supports_aggregation(&self) -> bool {
        matches!(self, SchemeKind::Bls0Chain)
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeKind {
    type Err = ZcnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(SchemeKind::Ed25519),
            "bls0chain" => Ok(SchemeKind::Bls0Chain),
            other => Err(ZcnError::ConfigError(format!(
                "unknown signature scheme: {other}"
            ))),
        }
    }
}

/// Signer/verifier over hex encoded transaction hashes.
///
/// The message that gets signed is the raw digest behind the hex hash. Keys and
/// signatures travel as hex strings.
pub trait SignatureScheme: Send + Sync {
    fn kind(&self) -> SchemeKind;

    /// Sets the signing key. The matching public key is derived and set as well.
    fn set_private_key(&mut self, key: &str) -> Result<(), ZcnError>;

    fn set_public_key(&mut self, key: &str) -> Result<(), ZcnError>;

    fn public_key(&self) -> Option<String>;

    /// Deterministically derives a key pair from `seed` and installs it.
    fn generate_keys(&mut self, seed: &[u8; 32]) -> Result<KeyPair, ZcnError>;

    fn sign(&self, hash: &str) -> Result<String, ZcnError>;

    /// `Ok(false)` on a mismatch or a signature that does not decode to a valid
    /// value; `Err(Verification)` when the input is not hex at all.
    fn verify(&self, signature: &str, hash: &str) -> Result<bool, ZcnError>;

    /// Signs `hash` with the local key and adds the result to `signature`.
    fn add(&self, signature: &str, hash: &str) -> Result<String, ZcnError>;
}

pub fn new_signature_scheme(kind: SchemeKind) -> Box<dyn SignatureScheme> {
    match kind {
        SchemeKind::Ed25519 => Box::new(Ed25519Scheme::default()),
        SchemeKind::Bls0Chain => Box::new(Bls0ChainScheme::default()),
    }
}

fn decode_hash(hash: &str) -> Result<Vec<u8>, ZcnError> {
    hex::decode(hash).map_err(|e| ZcnError::Verification(format!("hash is not hex: {e}")))
}

fn decode_signature(signature: &str) -> Result<Vec<u8>, ZcnError> {
    hex::decode(signature)
        .map_err(|e| ZcnError::Verification(format!("signature is not hex: {e}")))
}

#[derive(Default)]
pub struct Ed25519Scheme {
    signing_key: Option<SigningKey>,
    public_key: Option<PublicKey>,
}

impl Ed25519Scheme {
    fn signing_key_from_hex(key: &str) -> Result<SigningKey, ZcnError> {
        let bytes = hex::decode(key)
            .map_err(|e| ZcnError::Validation(format!("private key is not hex: {e}")))?;
        // Accept both the bare 32 byte seed and the 64 byte seed||public form.
        let seed: [u8; 32] = match bytes.len() {
            32 | 64 => bytes[..32].try_into().map_err(|_| {
                ZcnError::Validation("Failed to deserialize private key".to_string())
            })?,
            n => {
                return Err(ZcnError::Validation(format!(
                    "ed25519 private key must be 32 or 64 bytes, got {n}"
                )))
            }
        };
        Ok(SigningKey::from_bytes(&seed))
    }

    pub fn public_key_from_bytes(bytes: &[u8]) -> Result<PublicKey, ZcnError> {
        let public_key = PublicKey::from_bytes(&bytes.try_into().map_err(|_| {
            ZcnError::SerializationError("Failed to deserialize public key".to_string())
        })?)
        .map_err(|_| ZcnError::SerializationError("Failed to deserialize public key".to_string()))?;
        Ok(public_key)
    }
}

impl SignatureScheme for Ed25519Scheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Ed25519
    }

    fn set_private_key(&mut self, key: &str) -> Result<(), ZcnError> {
        let signing_key = Self::signing_key_from_hex(key)?;
        self.public_key = Some(signing_key.verifying_key());
        self.signing_key = Some(signing_key);
        Ok(())
    }

    fn set_public_key(&mut self, key: &str) -> Result<(), ZcnError> {
        let bytes = hex::decode(key)
            .map_err(|e| ZcnError::Validation(format!("public key is not hex: {e}")))?;
        self.public_key = Some(Self::public_key_from_bytes(&bytes)?);
        Ok(())
    }

    fn public_key(&self) -> Option<String> {
        self.public_key.map(|pk| hex::encode(pk.to_bytes()))
    }

    fn generate_keys(&mut self, seed: &[u8; 32]) -> Result<KeyPair, ZcnError> {
        let signing_key = SigningKey::from_bytes(seed);
        let pair = KeyPair {
            public_key: hex::encode(signing_key.verifying_key().to_bytes()),
            private_key: hex::encode(signing_key.to_bytes()),
        };
        self.public_key = Some(signing_key.verifying_key());
        self.signing_key = Some(signing_key);
        Ok(pair)
    }

    fn sign(&self, hash: &str) -> Result<String, ZcnError> {
        let signing_key = self.signing_key.as_ref().ok_or(ZcnError::KeyMissing)?;
        let message = hex::decode(hash)
            .map_err(|e| ZcnError::Validation(format!("hash is not hex: {e}")))?;
        Ok(hex::encode(signing_key.sign(&message).to_bytes()))
    }

    fn verify(&self, signature: &str, hash: &str) -> Result<bool, ZcnError> {
        let public_key = self.public_key.as_ref().ok_or(ZcnError::KeyMissing)?;
        let sig_bytes = decode_signature(signature)?;
        let message = decode_hash(hash)?;
        let Ok(signature) = Signature::from_slice(&sig_bytes) else {
            return Ok(false);
        };
        Ok(public_key.verify(&message, &signature).is_ok())
    }

    fn add(&self, _signature: &str, _hash: &str) -> Result<String, ZcnError> {
        Err(ZcnError::Unsupported(
            "ed25519 signatures cannot be aggregated".to_string(),
        ))
    }
}

/// BLS12-381 (min-pk) scheme. Signatures over the same hash add up to a
/// signature that verifies under the sum of the signers' public keys, which is
/// what split-key signing relies on.
#[derive(Default)]
pub struct Bls0ChainScheme {
    secret_key: Option<BlsSecretKey>,
    public_key: Option<BlsPublicKey>,
}

fn bls_error(context: &str, e: BLST_ERROR) -> ZcnError {
    ZcnError::Validation(format!("{context}: {e:?}"))
}

impl Bls0ChainScheme {
    fn sign_bytes(&self, message: &[u8]) -> Result<BlsSignature, ZcnError> {
        let secret_key = self.secret_key.as_ref().ok_or(ZcnError::KeyMissing)?;
        Ok(secret_key.sign(message, BLS_DST, &[]))
    }
}

impl SignatureScheme for Bls0ChainScheme {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Bls0Chain
    }

    fn set_private_key(&mut self, key: &str) -> Result<(), ZcnError> {
        let bytes = hex::decode(key)
            .map_err(|e| ZcnError::Validation(format!("private key is not hex: {e}")))?;
        let secret_key =
            BlsSecretKey::from_bytes(&bytes).map_err(|e| bls_error("invalid private key", e))?;
        self.public_key = Some(secret_key.sk_to_pk());
        self.secret_key = Some(secret_key);
        Ok(())
    }

    fn set_public_key(&mut self, key: &str) -> Result<(), ZcnError> {
        let bytes = hex::decode(key)
            .map_err(|e| ZcnError::Validation(format!("public key is not hex: {e}")))?;
        let public_key =
            BlsPublicKey::from_bytes(&bytes).map_err(|e| bls_error("invalid public key", e))?;
        self.public_key = Some(public_key);
        Ok(())
    }

    fn public_key(&self) -> Option<String> {
        self.public_key.as_ref().map(|pk| hex::encode(pk.to_bytes()))
    }

    fn generate_keys(&mut self, seed: &[u8; 32]) -> Result<KeyPair, ZcnError> {
        let secret_key =
            BlsSecretKey::key_gen(seed, &[]).map_err(|e| bls_error("key generation failed", e))?;
        let public_key = secret_key.sk_to_pk();
        let pair = KeyPair {
            public_key: hex::encode(public_key.to_bytes()),
            private_key: hex::encode(secret_key.to_bytes()),
        };
        self.public_key = Some(public_key);
        self.secret_key = Some(secret_key);
        Ok(pair)
    }

    fn sign(&self, hash: &str) -> Result<String, ZcnError> {
        let message = hex::decode(hash)
            .map_err(|e| ZcnError::Validation(format!("hash is not hex: {e}")))?;
        Ok(hex::encode(self.sign_bytes(&message)?.to_bytes()))
    }

    fn verify(&self, signature: &str, hash: &str) -> Result<bool, ZcnError> {
        let public_key = self.public_key.as_ref().ok_or(ZcnError::KeyMissing)?;
        let sig_bytes = decode_signature(signature)?;
        let message = decode_hash(hash)?;
        let Ok(signature) = BlsSignature::from_bytes(&sig_bytes) else {
            return Ok(false);
        };
        let result = signature.verify(true, &message, BLS_DST, &[], public_key, true);
        Ok(result == BLST_ERROR::BLST_SUCCESS)
    }

    fn add(&self, signature: &str, hash: &str) -> Result<String, ZcnError> {
        let own = self.sign(hash)?;
        aggregate_signatures(&[signature, own.as_str()])
    }
}

/// Point addition of BLS signatures.
pub fn aggregate_signatures(signatures: &[&str]) -> Result<String, ZcnError> {
    let (first, rest) = signatures
        .split_first()
        .ok_or_else(|| ZcnError::Validation("no signatures to aggregate".to_string()))?;
    let parse = |s: &str| -> Result<BlsSignature, ZcnError> {
        let bytes = decode_signature(s)?;
        BlsSignature::from_bytes(&bytes).map_err(|e| {
            ZcnError::Verification(format!("signature is not a valid point: {e:?}"))
        })
    };
    let mut aggregate = AggregateSignature::from_signature(&parse(first)?);
    for signature in rest {
        aggregate
            .add_signature(&parse(signature)?, true)
            .map_err(|e| ZcnError::Verification(format!("cannot add signature: {e:?}")))?;
    }
    Ok(hex::encode(aggregate.to_signature().to_bytes()))
}

/// Point addition of BLS public keys; the result verifies aggregated signatures.
pub fn combine_public_keys(public_keys: &[&str]) -> Result<String, ZcnError> {
    let (first, rest) = public_keys
        .split_first()
        .ok_or_else(|| ZcnError::Validation("no public keys to combine".to_string()))?;
    let parse = |s: &str| -> Result<BlsPublicKey, ZcnError> {
        let bytes = hex::decode(s)
            .map_err(|e| ZcnError::Validation(format!("public key is not hex: {e}")))?;
        BlsPublicKey::from_bytes(&bytes).map_err(|e| bls_error("invalid public key", e))
    };
    let mut aggregate = AggregatePublicKey::from_public_key(&parse(first)?);
    for public_key in rest {
        aggregate
            .add_public_key(&parse(public_key)?, true)
            .map_err(|e| bls_error("cannot add public key", e))?;
    }
    Ok(hex::encode(aggregate.to_public_key().to_bytes()))
}
