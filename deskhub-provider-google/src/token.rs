//! Exchanges against the OAuth token endpoint.

use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::client_secrets::ClientSecrets;
use crate::credential::Credential;
use crate::error::AuthError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Space-separated granted scopes.
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn into_credential(self, previous_refresh: Option<String>, previous_scopes: &[String]) -> Credential {
        let expires_at = self
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| Utc::now() + Duration::seconds(secs));

        // Google usually omits refresh_token on refresh
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .or(previous_refresh);

        let scopes = match self.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => previous_scopes.to_vec(),
        };

        Credential {
            access_token: self.access_token,
            refresh_token,
            expires_at,
            scopes,
        }
    }
}

async fn post_form(
    http: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let response = http.post(token_uri).form(form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::TokenEndpoint {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

/// Use the refresh token of `credential` to get a new access token.
pub async fn refresh(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    credential: &Credential,
) -> Result<Credential, AuthError> {
    let refresh_token = credential
        .refresh_token
        .as_deref()
        .ok_or(AuthError::ConsentRequired)?;

    debug!(token_uri = %secrets.token_uri, "Refreshing access token");

    let response = post_form(
        http,
        &secrets.token_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await?;

    Ok(response.into_credential(credential.refresh_token.clone(), &credential.scopes))
}

/// Trade an authorization code from the consent redirect for tokens.
pub async fn exchange_code(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    code: &str,
    redirect_uri: &str,
    requested_scopes: &[String],
) -> Result<Credential, AuthError> {
    let response = post_form(
        http,
        &secrets.token_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await?;

    Ok(response.into_credential(None, requested_scopes))
}
