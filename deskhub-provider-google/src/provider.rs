//! Hands out a valid Google credential, refreshing or re-issuing as needed.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client_secrets::ClientSecrets;
use crate::consent::IssuanceFlow;
use crate::credential::Credential;
use crate::error::AuthError;
use crate::store::CredentialStore;
use crate::token;

pub struct CredentialProvider {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    store: Arc<dyn CredentialStore>,
    flow: Arc<dyn IssuanceFlow>,
    http: reqwest::Client,
    // Held across load, refresh and save so concurrent callers never race on the store.
    lock: Mutex<()>,
}

impl CredentialProvider {
    pub fn new(
        secrets: ClientSecrets,
        scopes: Vec<String>,
        store: Arc<dyn CredentialStore>,
        flow: Arc<dyn IssuanceFlow>,
        http: reqwest::Client,
    ) -> Self {
        CredentialProvider {
            secrets,
            scopes,
            store,
            flow,
            http,
            lock: Mutex::new(()),
        }
    }

    /// Return a credential that is not expired.
    ///
    /// A persisted, unexpired credential is returned as-is. An expired one is
    /// refreshed when it has a refresh token; otherwise (or when nothing is
    /// persisted) the issuance flow runs. Any new credential is persisted
    /// before it is returned.
    pub async fn obtain(&self) -> Result<Credential, AuthError> {
        let _guard = self.lock.lock().await;

        let credential = match self.store.load()? {
            Some(current) if !current.covers(&self.scopes) => {
                info!("Persisted credential lacks required scopes, requesting consent");
                self.issue().await?
            }
            Some(current) if !current.is_expired() => {
                debug!("Using persisted credential");
                return Ok(current);
            }
            Some(current) if current.can_refresh() => self.refresh(&current).await?,
            Some(_) => {
                info!("Credential expired without refresh token, requesting consent");
                self.issue().await?
            }
            None => {
                info!("No persisted credential, requesting consent");
                self.issue().await?
            }
        };

        if credential.is_expired() {
            return Err(AuthError::ExpiredOnIssue);
        }

        self.store.save(&credential)?;

        Ok(credential)
    }

    /// Whether `obtain` would have to run the issuance flow: nothing is
    /// persisted, or the persisted credential lacks scopes or cannot be renewed.
    pub fn needs_issuance(&self) -> Result<bool, AuthError> {
        Ok(match self.store.load()? {
            Some(current) => {
                !current.covers(&self.scopes) || (current.is_expired() && !current.can_refresh())
            }
            None => true,
        })
    }

    async fn refresh(&self, current: &Credential) -> Result<Credential, AuthError> {
        match token::refresh(&self.http, &self.secrets, current).await {
            Ok(refreshed) => {
                info!("Refreshed access token");
                Ok(refreshed)
            }
            // invalid_grant: refresh token revoked or expired
            Err(AuthError::TokenEndpoint { status: 400, body }) => {
                warn!(%body, "Refresh token rejected, requesting consent");
                self.issue().await
            }
            Err(e) => Err(e),
        }
    }

    async fn issue(&self) -> Result<Credential, AuthError> {
        let credential = self.flow.issue(&self.secrets, &self.scopes).await?;
        info!("Issued new credential");
        Ok(credential)
    }
}
