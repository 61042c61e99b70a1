//! Gateway trait definitions and shared error types.

use async_trait::async_trait;
use dunner_core::Case;
use uuid::Uuid;

/// Errors that can occur during channel delivery.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway rejected request: {0}")]
    Rejected(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Identifying reference passed along with every gateway call so vendor
/// callbacks can be correlated back to the case.
#[derive(Debug, Clone)]
pub struct CaseRef {
    pub case_id: Uuid,
    pub case_number: String,
}

impl CaseRef {
    pub fn of(case: &Case) -> Self {
        Self {
            case_id: case.id,
            case_number: case.case_number.clone(),
        }
    }
}

/// SMS vendor gateway.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send_sms(
        &self,
        mobile: &str,
        message: &str,
        template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError>;

    /// Human-readable name for this gateway (e.g., "sms", "sms-log").
    fn channel_name(&self) -> &str;
}

/// Email gateway.
#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn send_email(
        &self,
        email: &str,
        subject: &str,
        body: &str,
        template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError>;

    fn channel_name(&self) -> &str;
}

/// WhatsApp vendor gateway.
#[async_trait]
pub trait WhatsAppGateway: Send + Sync {
    async fn send_whatsapp(
        &self,
        mobile: &str,
        message: &str,
        template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError>;

    fn channel_name(&self) -> &str;
}

/// Legal/dunning notice creation. Extension point: the default
/// implementation is a logging no-op until a notice vendor is wired in.
#[async_trait]
pub trait NoticeGateway: Send + Sync {
    async fn create_notice(
        &self,
        case: &CaseRef,
        notice_kind: &str,
        template_id: Option<&str>,
    ) -> Result<(), ChannelError>;

    fn channel_name(&self) -> &str;
}

/// Outbound-call scheduling. Extension point, same contract shape.
#[async_trait]
pub trait CallGateway: Send + Sync {
    async fn schedule_call(&self, case: &CaseRef, queue: &str) -> Result<(), ChannelError>;

    fn channel_name(&self) -> &str;
}
