//! SMTP Mail Provider
//!
//! lettre-backed implementation of the mail-dispatch boundary.

use async_trait::async_trait;
use lettre::{
    message::{header, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{MailError, MailTransport, OutboundMessage, SendReceipt};
use crate::config::MailConfig;
use crate::utils::error::{AppError, AppResult};

/// Mail dispatch over authenticated SMTP
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from the mail configuration
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Configuration(format!("Failed to configure SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, MailError> {
        let email = Message::builder()
            .from(
                message
                    .from
                    .parse()
                    .map_err(|e| MailError::Address(format!("invalid from address: {}", e)))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| MailError::Address(format!("invalid recipient address: {}", e)))?)
            .subject(&message.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(message.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(message.html_body.clone()),
                    ),
            )
            .map_err(|e| MailError::Transport(format!("failed to build message: {}", e)))?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let detail = response.message().collect::<Vec<_>>().join(" ");
        Ok(SendReceipt {
            message_id: if detail.is_empty() { None } else { Some(detail) },
        })
    }
}
