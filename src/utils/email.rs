//! Transactional email: verification links and password reset.
//!
//! Sending happens on a blocking thread via lettre's SMTP transport. When
//! `EMAIL_ENABLED` is false the message is built and logged but not sent.

use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

use projex_auth::temp_token::TEMPORARY_TOKEN_TTL_MINUTES;
use projex_config::EmailConfig;
use projex_core::AppError;

/// Subject, plain-text and HTML bodies of one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/api/v1/users/verify/{}", self.config.base_url, token)
    }

    pub fn password_reset_link(&self, token: &str) -> String {
        format!("{}/api/v1/users/reset-password/{}", self.config.base_url, token)
    }

    pub fn verification_email(&self, username: &str, token: &str) -> EmailContent {
        let link = self.verification_link(token);
        EmailContent {
            subject: "Please verify your email".to_string(),
            text: format!(
                "Hi {username},\n\n\
                 Welcome to ProjeX! Verify your email address by opening the link below:\n\
                 {link}\n\n\
                 The link expires in {TEMPORARY_TOKEN_TTL_MINUTES} minutes.\n\n\
                 The ProjeX Team"
            ),
            html: layout(
                "Verify your email",
                "#4F46E5",
                &format!(
                    "<p>Hi <strong>{username}</strong>,</p>\
                     <p>Welcome to ProjeX! Confirm your email address to start collaborating.</p>\
                     {}\
                     <p>The link expires in {TEMPORARY_TOKEN_TTL_MINUTES} minutes.</p>",
                    button(&link, "Verify email")
                ),
            ),
        }
    }

    pub fn password_reset_email(&self, username: &str, token: &str) -> EmailContent {
        let link = self.password_reset_link(token);
        EmailContent {
            subject: "Reset your password".to_string(),
            text: format!(
                "Hi {username},\n\n\
                 We received a request to reset your password. Use the link below:\n\
                 {link}\n\n\
                 The link expires in {TEMPORARY_TOKEN_TTL_MINUTES} minutes. \
                 If you didn't ask for this, ignore this email.\n\n\
                 The ProjeX Team"
            ),
            html: layout(
                "Reset your password",
                "#4F46E5",
                &format!(
                    "<p>Hi <strong>{username}</strong>,</p>\
                     <p>We received a request to reset your password.</p>\
                     {}\
                     <p>The link expires in {TEMPORARY_TOKEN_TTL_MINUTES} minutes. \
                     If you didn't ask for this, ignore this email.</p>",
                    button(&link, "Reset password")
                ),
            ),
        }
    }

    pub fn password_changed_email(&self, username: &str) -> EmailContent {
        EmailContent {
            subject: "Your password was changed".to_string(),
            text: format!(
                "Hi {username},\n\n\
                 Your ProjeX password was just changed and all sessions were signed out.\n\
                 If this wasn't you, reset your password immediately.\n\n\
                 The ProjeX Team"
            ),
            html: layout(
                "Password changed",
                "#10B981",
                &format!(
                    "<p>Hi <strong>{username}</strong>,</p>\
                     <p>Your ProjeX password was just changed and all sessions were signed out.</p>\
                     <p><strong>If this wasn't you, reset your password immediately.</strong></p>"
                ),
            ),
        }
    }

    #[instrument(skip(self, content), fields(email.subject = %content.subject))]
    pub async fn send(&self, to_email: &str, content: EmailContent) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(email.to = %to_email, "Email disabled, skipping send");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal(anyhow::anyhow!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal(anyhow::anyhow!("Invalid to email: {}", e)))?)
            .subject(content.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(content.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(content.html),
                    ),
            )
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal(anyhow::anyhow!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal(anyhow::anyhow!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to send email: {}", e)))?;

        info!(email.to = %to_email, "Email sent");
        Ok(())
    }
}

fn button(link: &str, label: &str) -> String {
    format!(
        r#"<p style="text-align: center; margin: 30px 0;"><a href="{link}" style="display: inline-block; padding: 14px 40px; background-color: #4F46E5; color: #ffffff; text-decoration: none; border-radius: 6px; font-weight: bold;">{label}</a></p>
<p style="color: #666666; font-size: 14px;">Or paste this link into your browser:<br><span style="color: #4F46E5; word-break: break-all;">{link}</span></p>"#
    )
}

fn layout(title: &str, accent: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" align="center" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
        <tr>
            <td style="background-color: {accent}; padding: 30px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 28px;">ProjeX</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 40px 30px; color: #666666; font-size: 16px; line-height: 1.5;">
                <h2 style="margin: 0 0 20px 0; color: #333333;">{title}</h2>
                {body}
            </td>
        </tr>
        <tr>
            <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; color: #999999; font-size: 12px;">
                This is an automated email from ProjeX. Please do not reply.
            </td>
        </tr>
    </table>
</body>
</html>"#
    )
}
