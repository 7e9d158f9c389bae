use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum MailError {
    #[error("mail message could not be built: {0}")]
    Build(String),
    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Best-effort plain-text mail dispatch.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
