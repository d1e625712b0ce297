//! Resend HTTP API mailer.

use async_trait::async_trait;
use serde::Serialize;

use blogify_core::ports::{EmailMessage, MailError, Mailer};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
}

#[derive(Serialize)]
struct SendEmail<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

impl<'a> From<&'a EmailMessage> for SendEmail<'a> {
    fn from(message: &'a EmailMessage) -> Self {
        Self {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            reply_to: message.reply_to.as_deref(),
        }
    }
}

pub struct ResendMailer {
    config: ResendConfig,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.config.api_key)
            .json(&SendEmail::from(&message))
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Resend rejected message");
            return Err(MailError::Rejected(format!("{status}: {body}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let message = EmailMessage {
            from: "Blogify <team@blogify.dev>".into(),
            to: "reader@example.com".into(),
            reply_to: None,
            subject: "Hello".into(),
            html: "<p>Hi</p>".into(),
        };

        let json = serde_json::to_value(SendEmail::from(&message)).unwrap();

        assert_eq!(json["to"], serde_json::json!(["reader@example.com"]));
        assert_eq!(json["subject"], "Hello");
        assert!(json.get("reply_to").is_none());
    }
}
