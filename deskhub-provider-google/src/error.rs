//! Errors raised while obtaining a Google credential.

use std::path::PathBuf;

use deskhub_core::SourceFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(
        "Google OAuth client not found at {0}. Download credentials.json from https://console.cloud.google.com/apis/credentials"
    )]
    ClientSecretsMissing(PathBuf),

    #[error("Invalid OAuth client descriptor: {0}")]
    ClientSecretsInvalid(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Token endpoint returned HTTP {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Interactive consent required; run `deskhub-server auth`")]
    ConsentRequired,

    #[error("Consent flow failed: {0}")]
    Consent(String),

    #[error("Issued credential is already expired")]
    ExpiredOnIssue,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AuthError> for SourceFailure {
    fn from(err: AuthError) -> Self {
        SourceFailure::Auth(err.to_string())
    }
}
