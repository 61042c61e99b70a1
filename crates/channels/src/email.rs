//! SMTP email gateway via `lettre` with TLS support.

use async_trait::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use dunner_core::config::SmtpConfig;

use crate::traits::{CaseRef, ChannelError, EmailGateway};

/// Sends dunning emails through an SMTP relay.
#[derive(Debug)]
pub struct SmtpEmailGateway {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailGateway {
    /// Build a gateway from SMTP configuration.
    ///
    /// Port defaults to 587. Port 465 uses implicit TLS; everything else
    /// uses STARTTLS when TLS is enabled. SMTP credentials are resolved
    /// from the `SMTP_USERNAME` and `SMTP_PASSWORD` environment variables;
    /// when absent the connection is unauthenticated.
    pub fn from_config(cfg: &SmtpConfig) -> Result<Self, ChannelError> {
        let host = cfg
            .host
            .as_deref()
            .ok_or_else(|| ChannelError::Config("SMTP_HOST is not set".to_string()))?;

        let from: Mailbox = cfg
            .from
            .parse()
            .map_err(|e: lettre::address::AddressError| ChannelError::Config(e.to_string()))?;

        let port = cfg.port.unwrap_or(587);

        let mut builder = if port == 465 || cfg.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| ChannelError::Config(e.to_string()))?
                .port(port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port)
        };

        if let (Ok(username), Ok(password)) =
            (std::env::var("SMTP_USERNAME"), std::env::var("SMTP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl EmailGateway for SmtpEmailGateway {
    async fn send_email(
        &self,
        email: &str,
        subject: &str,
        body: &str,
        _template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError> {
        let to: Mailbox = email
            .parse()
            .map_err(|e: lettre::address::AddressError| ChannelError::Config(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(lettre::message::header::ContentType::TEXT_PLAIN)
            .body(format!("{body}\n\nRef: {}", case.case_number))
            .map_err(|e| ChannelError::Smtp(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| ChannelError::Smtp(e.to_string()))
    }

    fn channel_name(&self) -> &str {
        "email"
    }
}
