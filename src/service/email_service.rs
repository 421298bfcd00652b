//! Email Service
//!
//! Renders the verification email from its embedded templates and dispatches
//! it through the mail provider. Rendering failures and delivery failures
//! both fail the sending step, but with distinguishable messages for
//! observability. A configurable test-routing override redirects all
//! outbound mail to a single inbox with a uniquifying timestamp tag in
//! non-production environments.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use tera::{Context, Tera};
use thiserror::Error;

use crate::config::MailConfig;
use crate::providers::{MailTransport, OutboundMessage, SendReceipt};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::split_address;

/// Failures of the notifier, split by phase
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("error rendering email template: {0}")]
    Render(String),

    #[error("error sending email: {0}")]
    Delivery(String),
}

/// Email service for rendering and dispatching the verification message
pub struct EmailService {
    transport: Arc<dyn MailTransport>,
    templates: Tera,
    config: MailConfig,
}

impl EmailService {
    /// Create a new email service with the embedded templates loaded
    pub fn new(config: MailConfig, transport: Arc<dyn MailTransport>) -> AppResult<Self> {
        let mut templates = Tera::default();
        Self::add_embedded_templates(&mut templates)?;

        Ok(Self {
            transport,
            templates,
            config,
        })
    }

    /// Add embedded email templates
    fn add_embedded_templates(tera: &mut Tera) -> AppResult<()> {
        // Verification email template (HTML)
        let verification_html = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Your Sign-In Link</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .header { text-align: center; background: #f8f9fa; padding: 20px; border-radius: 8px 8px 0 0; }
        .content { background: white; padding: 30px; border: 1px solid #dee2e6; }
        .button { display: inline-block; padding: 12px 24px; background: #007bff; color: white; text-decoration: none; border-radius: 4px; margin: 20px 0; }
        .footer { background: #f8f9fa; padding: 20px; border-radius: 0 0 8px 8px; text-align: center; font-size: 12px; color: #666; }
    </style>
</head>
<body>
    <div class="header">
        <h1>Sign in to {{ app_name }}</h1>
    </div>
    <div class="content">
        <p>Your secret sign-in link is ready:</p>

        <p style="text-align: center;"><a class="button" href="{{ verified_url }}">Sign in</a></p>

        <p>Or copy this address into your browser:</p>
        <p><a href="{{ verified_url }}">{{ verified_url }}</a></p>

        <p>This link is valid for <strong>{{ valid_for_hours }} hours</strong> and can only be used once.</p>

        <p>If you didn't request this link, you can safely ignore this email.</p>
    </div>
    <div class="footer">
        <p>© {{ current_year }} {{ app_name }}. All rights reserved.</p>
    </div>
</body>
</html>
        "#;

        // Verification email template (Plain text)
        let verification_text = r#"
Sign in to {{ app_name }}

Your secret sign-in link: {{ verified_url }}

This link is valid for {{ valid_for_hours }} hours and can only be used once.

If you didn't request this link, you can safely ignore this email.

© {{ current_year }} {{ app_name }}. All rights reserved.
        "#;

        tera.add_raw_template("verification_email.html", verification_html)
            .map_err(|e| AppError::Configuration(format!("Failed to add HTML template: {}", e)))?;

        tera.add_raw_template("verification_email.txt", verification_text)
            .map_err(|e| AppError::Configuration(format!("Failed to add text template: {}", e)))?;

        Ok(())
    }

    /// Render and dispatch the verification email carrying the signed link
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        verified_url: &str,
        valid_for_hours: i64,
    ) -> Result<SendReceipt, NotifyError> {
        log::info!("Sending verification email to: {}", to_email);

        let mut context = Context::new();
        context.insert("verified_url", verified_url);
        context.insert("valid_for_hours", &valid_for_hours);
        context.insert("app_name", &self.config.from_name);
        context.insert("current_year", &Utc::now().year());

        let html_body = self
            .templates
            .render("verification_email.html", &context)
            .map_err(|e| NotifyError::Render(e.to_string()))?;

        let text_body = self
            .templates
            .render("verification_email.txt", &context)
            .map_err(|e| NotifyError::Render(e.to_string()))?;

        let destination = fetch_destination(&self.config.test_to_address, to_email);
        if destination != to_email {
            log::info!("Test routing override in effect: {}", destination);
        }

        let message = OutboundMessage {
            from: format!("{} <{}>", self.config.from_name, self.config.from_email),
            to: destination,
            subject: self.config.subject.clone(),
            html_body,
            text_body,
        };

        match self.transport.send(&message).await {
            Ok(receipt) => {
                log::info!("Verification email sent successfully to: {}", message.to);
                Ok(receipt)
            }
            Err(e) => {
                log::error!("Failed to send verification email to {}: {}", message.to, e);
                Err(NotifyError::Delivery(e.to_string()))
            }
        }
    }
}

/// Resolve the destination address, honoring the test-routing override.
///
/// A non-empty, well-formed override address (non-empty local part and a
/// domain) is used instead of the real recipient, with the local part
/// suffixed by a `yyyyMMddHHmm` delivery timestamp tag so one inbox receives
/// uniquely taggable copies of every outbound message. An empty or malformed
/// override leaves the real recipient unchanged.
pub fn fetch_destination(test_to_address: &str, to_addr: &str) -> String {
    if test_to_address.is_empty() {
        return to_addr.to_string();
    }

    let Some((local, domain)) = split_address(test_to_address) else {
        // Invalid override value, use the real recipient
        return to_addr.to_string();
    };
    if local.trim().is_empty() {
        return to_addr.to_string();
    }

    let tag = Utc::now().format("%Y%m%d%H%M");
    format!("{}+{}@{}", local, tag, domain)
}
