use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::config::MailConfig;

/// Outbound mail collaborator. Delivery is fire-and-forget: callers never
/// block a response on it, and failures are only logged.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, to: &str, link: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            from: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, to: &str, link: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject("Email Verification for Tabletop Forum")
            .header(ContentType::TEXT_HTML)
            .body(format!(
                "<p>Click <a href=\"{link}\">here</a> to verify your email</p>"
            ))?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Drops mail on the floor; used by tests and local runs without SMTP.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_verification(&self, to: &str, link: &str) -> anyhow::Result<()> {
        debug!(%to, %link, "verification mail suppressed");
        Ok(())
    }
}
