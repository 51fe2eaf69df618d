//! Notification boundary.
//!
//! Delivery is fire-and-forget from the pipeline's point of view: the result
//! is reported back and logged, never retried.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

/// Delivers a composed alert.
pub trait Notifier {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Plain-text mail over an authenticated STARTTLS SMTP relay.
pub struct SmtpNotifier {
    from: String,
    to: String,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    pub fn new(mail: &MailConfig) -> Result<Self, NotifyError> {
        let transport = SmtpTransport::starttls_relay(&mail.smtp_server)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(mail.smtp_port)
            .credentials(Credentials::new(mail.from.clone(), mail.password.clone()))
            .build();
        Ok(Self {
            from: mail.from.clone(),
            to: mail.to.clone(),
            transport,
        })
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message, NotifyError> {
        build_message(&self.from, &self.to, subject, body)
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = self.build_message(subject, body)?;
        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }
}

fn build_message(from: &str, to: &str, subject: &str, body: &str) -> Result<Message, NotifyError> {
    let parse = |address: &str| {
        address.parse::<Mailbox>().map_err(|e| NotifyError::Address {
            address: address.to_string(),
            reason: e.to_string(),
        })
    };
    Message::builder()
        .from(parse(from)?)
        .to(parse(to)?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| NotifyError::Message(e.to_string()))
}
