//! Outbound mail for the contact form.

use crystal_core::MailConfig;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// A message submitted through the contact form.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    #[must_use]
    pub fn subject(&self) -> String {
        format!("Contact Form: {}", self.name)
    }

    #[must_use]
    pub fn body(&self) -> String {
        format!("From: {} <{}>\n\n{}", self.name, self.email, self.message)
    }

    /// The visitor's mailbox, used as `Reply-To`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InvalidAddress`] if `email` is not a valid address.
    pub fn reply_to(&self) -> Result<Mailbox, MailError> {
        let address = self.email.trim().parse::<Address>()?;
        Ok(Mailbox::new(Some(self.name.clone()), address))
    }
}

/// Delivers contact messages.
#[derive(Clone)]
pub enum Mailer {
    /// Sends through an SMTP relay.
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
        to: Mailbox,
    },
    /// Logs messages instead of sending them.
    Log { from: Mailbox },
}

impl Mailer {
    /// Builds the mailer selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if an address does not parse or the relay
    /// cannot be configured.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let from = config.from.parse::<Mailbox>()?;

        let (Some(smtp), Some(to)) = (&config.smtp, &config.to) else {
            return Ok(Self::Log { from });
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?;
        if let Some(username) = &smtp.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                smtp.password.clone().unwrap_or_default(),
            ));
        }

        Ok(Self::Smtp {
            transport: builder.build(),
            from,
            to: to.parse::<Mailbox>()?,
        })
    }

    /// Sends (or logs) a contact message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InvalidAddress`] for an unusable visitor address,
    /// or a build/transport error when sending fails.
    pub async fn send_contact(&self, contact: &ContactMessage) -> Result<(), MailError> {
        let reply_to = contact.reply_to()?;

        match self {
            Self::Smtp {
                transport,
                from,
                to,
            } => {
                let message = build_contact_email(from.clone(), to.clone(), reply_to, contact)?;
                transport.send(message).await?;
                tracing::info!(to = %to, "contact message sent");
            }
            Self::Log { from } => {
                tracing::info!(
                    from = %from,
                    reply_to = %reply_to,
                    subject = %contact.subject(),
                    body = %contact.body(),
                    "contact message (mail transport not configured, not sent)"
                );
            }
        }
        Ok(())
    }
}

/// Builds the outgoing contact email.
///
/// # Errors
///
/// Returns [`MailError::Build`] if the message cannot be assembled.
pub fn build_contact_email(
    from: Mailbox,
    to: Mailbox,
    reply_to: Mailbox,
    contact: &ContactMessage,
) -> Result<Message, MailError> {
    Ok(Message::builder()
        .from(from)
        .reply_to(reply_to)
        .to(to)
        .subject(contact.subject())
        .header(ContentType::TEXT_PLAIN)
        .body(contact.body())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crystal_core::SmtpConfig;

    fn contact(email: &str) -> ContactMessage {
        ContactMessage {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            message: "Do you ship to Lagos?".to_string(),
        }
    }

    #[test]
    fn subject_and_body_follow_contact_format() {
        let msg = contact("ada@example.com");
        assert_eq!(msg.subject(), "Contact Form: Ada Lovelace");
        assert_eq!(
            msg.body(),
            "From: Ada Lovelace <ada@example.com>\n\nDo you ship to Lagos?"
        );
    }

    #[test]
    fn reply_to_rejects_invalid_address() {
        assert!(matches!(
            contact("not-an-address").reply_to(),
            Err(MailError::InvalidAddress(_))
        ));
        let mailbox = contact(" ada@example.com ").reply_to().expect("mailbox");
        assert_eq!(mailbox.email.to_string(), "ada@example.com");
    }

    #[test]
    fn contact_email_sets_reply_to_and_subject() {
        let msg = contact("ada@example.com");
        let email = build_contact_email(
            "Crystal Website Contact <noreply@example.com>".parse().expect("from"),
            "sales@example.com".parse().expect("to"),
            msg.reply_to().expect("reply-to"),
            &msg,
        )
        .expect("build");
        let raw = String::from_utf8(email.formatted()).expect("utf8");
        assert!(raw.contains("Subject: Contact Form: Ada Lovelace"), "{raw}");
        assert!(raw.contains("Reply-To:"), "{raw}");
        assert!(raw.contains("ada@example.com"), "{raw}");
        assert!(raw.contains("Do you ship to Lagos?"), "{raw}");
    }

    #[test]
    fn from_config_without_smtp_logs() {
        let config = MailConfig {
            smtp: None,
            from: "Crystal Website Contact <noreply@example.com>".to_string(),
            to: None,
        };
        assert!(matches!(
            Mailer::from_config(&config),
            Ok(Mailer::Log { .. })
        ));
    }

    #[tokio::test]
    async fn from_config_with_smtp_builds_relay() {
        let config = MailConfig {
            smtp: Some(SmtpConfig {
                host: "smtp.example.com".to_string(),
                username: Some("site@example.com".to_string()),
                password: Some("secret".to_string()),
            }),
            from: "noreply@example.com".to_string(),
            to: Some("sales@example.com".to_string()),
        };
        assert!(matches!(
            Mailer::from_config(&config),
            Ok(Mailer::Smtp { .. })
        ));
    }

    #[tokio::test]
    async fn log_mailer_still_validates_visitor_address() {
        let mailer = Mailer::Log {
            from: "noreply@example.com".parse().expect("from"),
        };
        assert!(mailer.send_contact(&contact("ada@example.com")).await.is_ok());
        assert!(matches!(
            mailer.send_contact(&contact("nope")).await,
            Err(MailError::InvalidAddress(_))
        ));
    }
}
