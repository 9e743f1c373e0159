//! OAuth client descriptor (the `credentials.json` downloaded from Google).

use std::path::Path;

use serde::Deserialize;

use crate::error::AuthError;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Google wraps the client under `installed` (desktop apps) or `web`.
#[derive(Deserialize)]
struct Descriptor {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            return Err(AuthError::ClientSecretsMissing(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, AuthError> {
        let descriptor: Descriptor = serde_json::from_str(contents)
            .map_err(|e| AuthError::ClientSecretsInvalid(e.to_string()))?;

        descriptor.installed.or(descriptor.web).ok_or_else(|| {
            AuthError::ClientSecretsInvalid("expected an \"installed\" or \"web\" client".into())
        })
    }
}
