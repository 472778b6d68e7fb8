//! Email Service
//!
//! Sends the address-confirmation email carrying an email-verify token.
//! Dispatch is fire-and-forget: callers spawn the send after the HTTP
//! response is returned, and failures are logged, never retried.

use lettre::{
    message::{header, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{error, info};
use tera::{Context, Tera};

use crate::config::MailConfig;
use crate::utils::error::{AppError, AppResult};

/// SMTP-backed notification dispatcher
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    templates: Tera,
    config: MailConfig,
}

impl EmailService {
    /// Create a new email service from SMTP configuration
    pub fn new(config: MailConfig) -> AppResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Configuration(format!("Failed to configure SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let mut templates = Tera::default();
        Self::add_embedded_templates(&mut templates)?;

        Ok(Self {
            transport,
            templates,
            config,
        })
    }

    fn add_embedded_templates(tera: &mut Tera) -> AppResult<()> {
        let confirmation_html = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Confirm your email</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1>Confirm your email</h1>
    <p>Hello {{ username }},</p>
    <p>Thank you for signing up. Please confirm your email address by following the link below:</p>
    <p><a href="{{ host }}/api/auth/confirmed_email/{{ token }}">Confirm email address</a></p>
    <p>The link is valid for 7 days. If you didn't create an account, you can safely ignore this email.</p>
    <p>{{ app_name }}</p>
</body>
</html>
        "#;

        let confirmation_text = r#"
Confirm your email

Hello {{ username }},

Thank you for signing up. Please confirm your email address by opening:

{{ host }}/api/auth/confirmed_email/{{ token }}

The link is valid for 7 days. If you didn't create an account, you can safely ignore this email.

{{ app_name }}
        "#;

        tera.add_raw_template("confirmation_email.html", confirmation_html)
            .map_err(|e| AppError::Configuration(format!("Failed to add HTML template: {}", e)))?;

        tera.add_raw_template("confirmation_email.txt", confirmation_text)
            .map_err(|e| AppError::Configuration(format!("Failed to add text template: {}", e)))?;

        Ok(())
    }

    /// Send the confirmation email with an email-verify token link
    pub async fn send_confirmation_email(
        &self,
        to_email: &str,
        base_url: &str,
        token: &str,
    ) -> AppResult<()> {
        let mut context = Context::new();
        context.insert("username", to_email);
        context.insert("host", base_url.trim_end_matches('/'));
        context.insert("token", token);
        context.insert("app_name", &self.config.from_name);

        let html_body = self
            .templates
            .render("confirmation_email.html", &context)
            .map_err(|e| AppError::Internal(format!("Failed to render HTML template: {}", e)))?;

        let text_body = self
            .templates
            .render("confirmation_email.txt", &context)
            .map_err(|e| AppError::Internal(format!("Failed to render text template: {}", e)))?;

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| AppError::Configuration(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::Validation(format!("Invalid recipient email: {}", e)))?)
            .subject("Confirm your email")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email message: {}", e)))?;

        match self.transport.send(message).await {
            Ok(_) => {
                info!("Confirmation email sent to {}", to_email);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send confirmation email to {}: {}", to_email, e);
                Err(AppError::ExternalService(format!(
                    "Failed to send email: {}",
                    e
                )))
            }
        }
    }
}
