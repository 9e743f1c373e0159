use std::sync::Arc;

use anyhow::{Context, Result};
use deskhub_core::Aggregator;
use deskhub_core::config::DeskhubConfig;
use deskhub_core::sources::PlaceholderTodos;
use deskhub_provider_google::{
    CalendarSource, ClientSecrets, CredentialProvider, FileCredentialStore, GmailSource,
    GoogleApi, IssuanceFlow, UnattendedFlow,
};
use deskhub_provider_openmeteo::OpenMeteoSource;
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Self {
        AppState {
            aggregator: Arc::new(aggregator),
        }
    }

    /// Wire up all four sources from config.
    pub fn from_config(
        config: &DeskhubConfig,
        http: reqwest::Client,
        credentials: Arc<CredentialProvider>,
    ) -> Self {
        let google = Arc::new(GoogleApi::new(http.clone(), &config.google));

        let aggregator = Aggregator::new(
            Arc::new(GmailSource::new(google.clone(), credentials.clone())),
            Arc::new(CalendarSource::new(google, credentials)),
            Arc::new(OpenMeteoSource::new(http, &config.weather)),
            Arc::new(PlaceholderTodos::new(&config.todo)),
        )
        .with_timeout(config.sources.timeout());

        AppState::new(aggregator)
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }
}

/// Credential provider over the configured token file, using `flow` when
/// a new credential has to be issued.
pub fn credential_provider(
    config: &DeskhubConfig,
    http: reqwest::Client,
    flow: Arc<dyn IssuanceFlow>,
) -> Result<CredentialProvider> {
    let secrets_path = config.google.client_secrets_path();
    let secrets = ClientSecrets::load(&secrets_path)
        .with_context(|| format!("Failed to load OAuth client from {}", secrets_path.display()))?;

    let store = Arc::new(FileCredentialStore::new(config.google.token_path()));

    Ok(CredentialProvider::new(
        secrets,
        config.google.scopes.clone(),
        store,
        flow,
        http,
    ))
}

/// Credentials used while serving.
///
/// Consent through `flow` runs only when no usable credential is stored, and
/// failing it is fatal. A stored credential that cannot be refreshed right
/// now is only logged: mail and calendar report `auth` until it recovers.
pub async fn serving_credentials(
    config: &DeskhubConfig,
    http: reqwest::Client,
    flow: Arc<dyn IssuanceFlow>,
) -> Result<Arc<CredentialProvider>> {
    let credentials = Arc::new(credential_provider(
        config,
        http.clone(),
        Arc::new(UnattendedFlow),
    )?);

    let needs_consent = credentials
        .needs_issuance()
        .context("Failed to read stored Google credential")?;

    if needs_consent {
        credential_provider(config, http, flow)?
            .obtain()
            .await
            .context("Google authorization failed")?;
    } else if let Err(e) = credentials.obtain().await {
        warn!(error = %e, "Google credential not usable yet, mail and calendar will degrade");
    }

    Ok(credentials)
}
