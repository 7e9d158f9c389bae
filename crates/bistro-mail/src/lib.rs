//! bistro-mail: SMTP adapter for the `Mailer` port, with a warned no-op
//! backend for unconfigured deployments.

use anyhow::Context;
use async_trait::async_trait;
use bistro_types::ports::mailer::{MailError, Mailer};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// true selects implicit TLS; false selects STARTTLS.
    pub secure: bool,
    pub user: String,
    pub password: String,
    pub from: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .context("invalid MAIL_FROM address")?;
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| MailError::Build(format!("invalid recipient {to:?}: {e}")))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Stands in when SMTP settings are incomplete: every send is skipped with
/// a warning instead of failing the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        tracing::warn!(%to, subject, "mail transport not configured, skipping message");
        Ok(())
    }
}

pub enum MailBackend {
    Smtp(SmtpMailer),
    Noop(NoopMailer),
}

pub fn build_mailer(config: Option<&SmtpConfig>) -> anyhow::Result<MailBackend> {
    match config {
        Some(config) => Ok(MailBackend::Smtp(SmtpMailer::new(config)?)),
        None => Ok(MailBackend::Noop(NoopMailer)),
    }
}

#[async_trait]
impl Mailer for MailBackend {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        match self {
            Self::Smtp(mailer) => mailer.send(to, subject, body).await,
            Self::Noop(mailer) => mailer.send(to, subject, body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp_config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            secure: false,
            user: "mailer".into(),
            password: "secret".into(),
            from: "Bistro Aurora <orders@example.com>".into(),
        }
    }

    #[tokio::test]
    async fn noop_mailer_swallows_sends() {
        let mailer = build_mailer(None).unwrap();
        mailer
            .send("guest@example.com", "subject", "body")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn smtp_mailer_builds_from_config() {
        assert!(SmtpMailer::new(&smtp_config()).is_ok());

        let mut secure = smtp_config();
        secure.secure = true;
        secure.port = 465;
        assert!(SmtpMailer::new(&secure).is_ok());
    }

    #[test]
    fn invalid_from_address_is_rejected() {
        let mut config = smtp_config();
        config.from = "not an address".into();
        assert!(SmtpMailer::new(&config).is_err());
    }

    #[tokio::test]
    async fn invalid_recipient_is_a_build_error() {
        let mailer = SmtpMailer::new(&smtp_config()).unwrap();
        let err = mailer.send("not an address", "s", "b").await.unwrap_err();
        assert!(matches!(err, MailError::Build(_)));
    }
}
