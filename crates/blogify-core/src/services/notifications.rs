//! Transactional email: contact form relay and newsletter welcome.

use std::sync::Arc;

use tera::escape_html;

use crate::ports::{EmailMessage, MailError, Mailer};

/// Addresses and links used when composing mail.
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// Sender shown on outgoing mail, e.g. `Blogify Team <team@blogify.dev>`.
    pub from: String,
    /// Inbox receiving contact form messages.
    pub contact_inbox: String,
    /// Public site URL used in links.
    pub base_url: String,
}

/// A message submitted through the contact form.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub topic: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("{0}")]
    Validation(String),

    #[error("Mail delivery is not configured")]
    NotConfigured,

    #[error(transparent)]
    Delivery(#[from] MailError),
}

#[derive(Clone)]
pub struct NotificationService {
    mailer: Option<Arc<dyn Mailer>>,
    settings: MailSettings,
}

impl NotificationService {
    pub fn new(mailer: Option<Arc<dyn Mailer>>, settings: MailSettings) -> Self {
        Self { mailer, settings }
    }

    fn mailer(&self) -> Result<&Arc<dyn Mailer>, NotificationError> {
        self.mailer.as_ref().ok_or(NotificationError::NotConfigured)
    }

    /// Relay a contact form submission to the site inbox.
    pub async fn send_contact(&self, contact: ContactMessage) -> Result<(), NotificationError> {
        if contact.email.trim().is_empty() || contact.message.trim().is_empty() {
            return Err(NotificationError::Validation(
                "Email and message are required.".into(),
            ));
        }
        let mailer = self.mailer()?;

        let message = EmailMessage {
            from: self.settings.from.clone(),
            to: self.settings.contact_inbox.clone(),
            reply_to: Some(contact.email.clone()),
            subject: format!("Blogify Contact: {}", contact.topic),
            html: contact_html(&contact),
        };

        mailer.send(message).await?;
        tracing::info!(topic = %contact.topic, "Contact message relayed");
        Ok(())
    }

    /// Send the newsletter welcome mail to a new subscriber.
    pub async fn send_welcome(&self, email: &str) -> Result<(), NotificationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(NotificationError::Validation("Email is required".into()));
        }
        let mailer = self.mailer()?;

        let message = EmailMessage {
            from: self.settings.from.clone(),
            to: email.to_string(),
            reply_to: None,
            subject: "Welcome to the Blogify Community!".to_string(),
            html: welcome_html(&self.settings.base_url),
        };

        mailer.send(message).await?;
        tracing::info!("Welcome mail sent");
        Ok(())
    }
}

fn contact_html(contact: &ContactMessage) -> String {
    format!(
        "<h3>New Message from {name}</h3>\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Topic:</strong> {topic}</p>\
         <hr>\
         <p>{message}</p>",
        name = escape_html(&contact.name),
        email = escape_html(&contact.email),
        topic = escape_html(&contact.topic),
        message = escape_html(&contact.message),
    )
}

fn welcome_html(base_url: &str) -> String {
    let link = format!("{}/blog/all", base_url.trim_end_matches('/'));
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
           <div style=\"background-color: #111827; padding: 30px; text-align: center;\">\
             <h1 style=\"color: #ffffff; margin: 0;\">Blogify.</h1>\
           </div>\
           <div style=\"padding: 40px;\">\
             <h2>You're on the list!</h2>\
             <p>Thank you for subscribing to our newsletter.</p>\
             <p>Expect the best stories, curated insights, and platform updates in your inbox.</p>\
             <a href=\"{link}\">Start Reading</a>\
           </div>\
         </div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
            self.sent.lock().await.push(message);
            Ok(())
        }
    }

    fn settings() -> MailSettings {
        MailSettings {
            from: "Blogify Team <team@blogify.test>".into(),
            contact_inbox: "inbox@blogify.test".into(),
            base_url: "http://localhost:8000/".into(),
        }
    }

    #[tokio::test]
    async fn test_contact_is_escaped_and_addressed_to_inbox() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = NotificationService::new(Some(mailer.clone()), settings());

        service
            .send_contact(ContactMessage {
                name: "Eve".into(),
                email: "eve@example.com".into(),
                topic: "Hi".into(),
                message: "<script>x</script>".into(),
            })
            .await
            .unwrap();

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "inbox@blogify.test");
        assert_eq!(sent[0].reply_to.as_deref(), Some("eve@example.com"));
        assert_eq!(sent[0].subject, "Blogify Contact: Hi");
        assert!(sent[0].html.contains("&lt;script&gt;"));
        assert!(!sent[0].html.contains("<script>"));
    }

    #[tokio::test]
    async fn test_welcome_links_to_listing() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = NotificationService::new(Some(mailer.clone()), settings());

        service.send_welcome("new@example.com").await.unwrap();

        let sent = mailer.sent.lock().await;
        assert_eq!(sent[0].to, "new@example.com");
        assert!(sent[0].html.contains("http://localhost:8000/blog/all"));
    }

    #[tokio::test]
    async fn test_missing_mailer_reports_not_configured() {
        let service = NotificationService::new(None, settings());
        let err = service.send_welcome("a@b.c").await.unwrap_err();
        assert!(matches!(err, NotificationError::NotConfigured));
    }

    #[tokio::test]
    async fn test_welcome_requires_email() {
        let service = NotificationService::new(None, settings());
        let err = service.send_welcome("  ").await.unwrap_err();
        assert!(matches!(err, NotificationError::Validation(_)));
    }
}
