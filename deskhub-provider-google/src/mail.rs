//! Gmail source: unread count and the subject of the newest unread message.

use std::sync::Arc;

use async_trait::async_trait;
use deskhub_core::{MailStatus, Source, SourceFailure};

use crate::api::GoogleApi;
use crate::provider::CredentialProvider;

/// How many unread messages to list; the count comes from `resultSizeEstimate`.
const MAX_LISTED: u32 = 10;

const NO_SUBJECT: &str = "(no subject)";

pub struct GmailSource {
    api: Arc<GoogleApi>,
    credentials: Arc<CredentialProvider>,
}

impl GmailSource {
    pub fn new(api: Arc<GoogleApi>, credentials: Arc<CredentialProvider>) -> Self {
        GmailSource { api, credentials }
    }
}

#[async_trait]
impl Source for GmailSource {
    type Record = MailStatus;

    fn name(&self) -> &'static str {
        "mail"
    }

    async fn fetch(&self) -> Result<MailStatus, SourceFailure> {
        let credential = self.credentials.obtain().await?;

        let list = self.api.list_unread(&credential, MAX_LISTED).await?;

        let Some(latest) = list.messages.first() else {
            return Ok(MailStatus {
                unread: list.result_size_estimate,
                ..MailStatus::empty_inbox()
            });
        };

        let subject = self
            .api
            .message_subject(&credential, &latest.id)
            .await?
            .unwrap_or_else(|| NO_SUBJECT.to_string());

        Ok(MailStatus {
            unread: list.result_size_estimate,
            latest_subject: subject,
        })
    }
}
