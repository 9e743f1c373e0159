//! Interactive issuance of a brand new credential.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::info;

use crate::client_secrets::ClientSecrets;
use crate::credential::Credential;
use crate::error::AuthError;
use crate::token;

/// Produces a fresh credential when there is nothing usable to refresh.
#[async_trait]
pub trait IssuanceFlow: Send + Sync {
    async fn issue(&self, secrets: &ClientSecrets, scopes: &[String]) -> Result<Credential, AuthError>;
}

/// Used while serving requests: never blocks on a human.
pub struct UnattendedFlow;

#[async_trait]
impl IssuanceFlow for UnattendedFlow {
    async fn issue(&self, _secrets: &ClientSecrets, _scopes: &[String]) -> Result<Credential, AuthError> {
        Err(AuthError::ConsentRequired)
    }
}

/// Installed-app consent: opens the browser and waits for the loopback redirect.
pub struct BrowserConsentFlow {
    http: reqwest::Client,
}

impl BrowserConsentFlow {
    pub fn new(http: reqwest::Client) -> Self {
        BrowserConsentFlow { http }
    }
}

pub fn consent_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> Result<url::Url, AuthError> {
    let scope = scopes.join(" ");

    url::Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|e| AuthError::ClientSecretsInvalid(format!("bad auth_uri: {}", e)))
}

#[async_trait]
impl IssuanceFlow for BrowserConsentFlow {
    async fn issue(&self, secrets: &ClientSecrets, scopes: &[String]) -> Result<Credential, AuthError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", listener.local_addr()?.port());
        let state = uuid::Uuid::new_v4().to_string();

        let auth_url = consent_url(secrets, &redirect_uri, scopes, &state)?;

        eprintln!("\nOpen this URL in your browser to authorize deskhub:\n");
        eprintln!("{}\n", auth_url);

        if open::that(auth_url.as_str()).is_err() {
            eprintln!("(Could not open browser automatically, please copy the URL above)");
        }

        let (code, returned_state) = wait_for_callback(listener).await?;

        if returned_state != state {
            return Err(AuthError::Consent("state mismatch in OAuth callback".into()));
        }

        info!("Received authorization code, exchanging for tokens");

        token::exchange_code(&self.http, secrets, &code, &redirect_uri, scopes).await
    }
}

async fn wait_for_callback(listener: TcpListener) -> Result<(String, String), AuthError> {
    let (stream, _) = listener.accept().await?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let (code, state) = parse_callback(&request_line)?;

    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>deskhub is authorized</h1>\
        <p>You can close this window.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;

    Ok((code, state))
}

/// Pull `code` and `state` out of a request line like
/// `GET /callback?code=...&state=... HTTP/1.1`.
fn parse_callback(request_line: &str) -> Result<(String, String), AuthError> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| AuthError::Consent("invalid HTTP request on callback".into()))?;

    let url = url::Url::parse(&format!("http://localhost{}", target))
        .map_err(|e| AuthError::Consent(e.to_string()))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        return Err(AuthError::Consent(format!("consent denied: {}", error)));
    }

    let code = param("code").ok_or_else(|| AuthError::Consent("no code in callback".into()))?;
    let state = param("state").ok_or_else(|| AuthError::Consent("no state in callback".into()))?;

    Ok((code, state))
}
