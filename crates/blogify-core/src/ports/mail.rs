//! Transactional email port.

use async_trait::async_trait;

/// A fully rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Email delivery backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail provider rejected the message: {0}")]
    Rejected(String),

    #[error("Mail transport failed: {0}")]
    Transport(String),
}
