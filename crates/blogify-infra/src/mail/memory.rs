//! In-memory mailer for local runs and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use blogify_core::ports::{EmailMessage, MailError, Mailer};

/// Collects messages instead of delivering them.
#[derive(Default)]
pub struct InMemoryMailer {
    outbox: RwLock<Vec<EmailMessage>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        tracing::info!(to = %message.to, subject = %message.subject, "Mail captured in memory");
        self.outbox.write().await.push(message);
        Ok(())
    }
}
