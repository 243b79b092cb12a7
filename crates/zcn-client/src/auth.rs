use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use zcn_common::{Request, Transaction, Transport, ZcnError};

const AUTH_TRANSACTION_PATH: &str = "/transaction";

/// Remote holder of the counterpart key share.
///
/// Receives the transaction carrying the client's partial signature and
/// returns the authorizer's partial signature over the same hash. Every
/// failure is reported as [`ZcnError::AuthorizationFailed`].
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, txn: &Transaction) -> Result<String, ZcnError>;
}

pub struct HttpAuthorizer {
    transport: Arc<dyn Transport>,
    auth_url: String,
}

impl HttpAuthorizer {
    pub fn new(transport: Arc<dyn Transport>, auth_url: impl Into<String>) -> Self {
        let auth_url: String = auth_url.into();
        Self {
            transport,
            auth_url: auth_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Authorizer for HttpAuthorizer {
    async fn authorize(&self, txn: &Transaction) -> Result<String, ZcnError> {
        let body = txn
            .to_json()
            .map_err(|e| ZcnError::AuthorizationFailed(e.to_string()))?;
        let url = format!("{}{}", self.auth_url, AUTH_TRANSACTION_PATH);
        debug!("Requesting authorization for {} from {}", txn.hash, url);

        let response = self
            .transport
            .send(Request::post_json(url, body))
            .await
            .map_err(|e| ZcnError::AuthorizationFailed(e.to_string()))?;
        if !response.is_success() {
            warn!("Authorizer refused {}: HTTP {}", txn.hash, response.status);
            return Err(ZcnError::AuthorizationFailed(format!(
                "HTTP {}: {}",
                response.status, response.body
            )));
        }

        let signed = Transaction::from_json(&response.body)
            .map_err(|e| ZcnError::AuthorizationFailed(format!("unreadable response: {e}")))?;
        if signed.hash != txn.hash {
            return Err(ZcnError::AuthorizationFailed(format!(
                "authorizer answered for {} instead of {}",
                signed.hash, txn.hash
            )));
        }
        if signed.signature.is_empty() {
            return Err(ZcnError::AuthorizationFailed(
                "authorizer returned no signature".to_string(),
            ));
        }
        Ok(signed.signature)
    }
}
