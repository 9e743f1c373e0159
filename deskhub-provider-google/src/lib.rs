//! deskhub-provider-google - Gmail and Google Calendar sources for deskhub
//!
//! Both sources share one `CredentialProvider`, which hands out a valid
//! access token per call. The OAuth client descriptor and the persisted
//! token live at the paths configured in `[google]`:
//!   ~/.config/deskhub/credentials.json
//!   ~/.config/deskhub/token.toml

pub mod api;
pub mod calendar;
pub mod client_secrets;
pub mod consent;
pub mod credential;
pub mod error;
pub mod mail;
pub mod provider;
pub mod store;
pub mod token;

pub use api::GoogleApi;
pub use calendar::CalendarSource;
pub use client_secrets::ClientSecrets;
pub use consent::{BrowserConsentFlow, IssuanceFlow, UnattendedFlow};
pub use credential::Credential;
pub use error::AuthError;
pub use mail::GmailSource;
pub use provider::CredentialProvider;
pub use store::{CredentialStore, FileCredentialStore};
