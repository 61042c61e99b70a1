//! Logging no-op gateway.
//!
//! Stands in for any channel whose vendor integration is not configured:
//! always succeeds, logging the would-be delivery. Notice creation and
//! call scheduling ship with this as their only implementation until a
//! vendor is wired in.

use async_trait::async_trait;
use tracing::info;

use crate::traits::{
    CallGateway, CaseRef, ChannelError, EmailGateway, NoticeGateway, SmsGateway, WhatsAppGateway,
};

/// A gateway that logs instead of delivering.
#[derive(Debug)]
pub struct LogGateway {
    name: String,
}

impl LogGateway {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl SmsGateway for LogGateway {
    async fn send_sms(
        &self,
        mobile: &str,
        message: &str,
        _template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError> {
        info!(
            gateway = %self.name,
            mobile,
            case = %case.case_number,
            chars = message.len(),
            "sms delivery skipped (log-only gateway)"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl EmailGateway for LogGateway {
    async fn send_email(
        &self,
        email: &str,
        subject: &str,
        _body: &str,
        _template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError> {
        info!(
            gateway = %self.name,
            email,
            subject,
            case = %case.case_number,
            "email delivery skipped (log-only gateway)"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl WhatsAppGateway for LogGateway {
    async fn send_whatsapp(
        &self,
        mobile: &str,
        message: &str,
        _template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError> {
        info!(
            gateway = %self.name,
            mobile,
            case = %case.case_number,
            chars = message.len(),
            "whatsapp delivery skipped (log-only gateway)"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl NoticeGateway for LogGateway {
    async fn create_notice(
        &self,
        case: &CaseRef,
        notice_kind: &str,
        _template_id: Option<&str>,
    ) -> Result<(), ChannelError> {
        info!(
            gateway = %self.name,
            case = %case.case_number,
            kind = notice_kind,
            "notice creation recorded (log-only gateway)"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl CallGateway for LogGateway {
    async fn schedule_call(&self, case: &CaseRef, queue: &str) -> Result<(), ChannelError> {
        info!(
            gateway = %self.name,
            case = %case.case_number,
            queue,
            "call scheduling recorded (log-only gateway)"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        &self.name
    }
}
