//! Applies one action to one case through the right gateway.
//!
//! The dispatcher extracts the minimum contact attribute each action type
//! requires and raises a typed failure when it is absent. Individual
//! failures never propagate past the (case, action) pair: callers log
//! them, count them, and move on.

use std::sync::Arc;

use dunner_core::{Action, ActionType, Case};
use tracing::{info, warn};

use crate::template::{self, MessageContext, TemplateRenderer};
use crate::traits::{
    CallGateway, CaseRef, ChannelError, EmailGateway, NoticeGateway, SmsGateway, WhatsAppGateway,
};

/// One failed (case, action) application.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("case {case_number} has no {attribute}")]
    MissingContact {
        case_number: String,
        attribute: &'static str,
    },

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// The full set of configured channel gateways.
#[derive(Clone)]
pub struct ChannelSet {
    pub sms: Arc<dyn SmsGateway>,
    pub email: Arc<dyn EmailGateway>,
    pub whatsapp: Arc<dyn WhatsAppGateway>,
    pub notice: Arc<dyn NoticeGateway>,
    pub call: Arc<dyn CallGateway>,
}

impl ChannelSet {
    /// Every channel backed by the logging no-op gateway. Used in dev and
    /// in tests.
    pub fn log_only() -> Self {
        Self {
            sms: Arc::new(crate::noop::LogGateway::new("sms-log")),
            email: Arc::new(crate::noop::LogGateway::new("email-log")),
            whatsapp: Arc::new(crate::noop::LogGateway::new("whatsapp-log")),
            notice: Arc::new(crate::noop::LogGateway::new("notice-log")),
            call: Arc::new(crate::noop::LogGateway::new("call-log")),
        }
    }
}

/// Routes one (case, action) pair to its channel gateway.
pub struct ActionDispatcher {
    channels: ChannelSet,
    renderer: TemplateRenderer,
}

impl ActionDispatcher {
    pub fn new(channels: ChannelSet) -> Self {
        Self {
            channels,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Apply a single action to a single case.
    ///
    /// One logical gateway call per pair, no internal retry.
    pub async fn apply(&self, case: &Case, action: &Action) -> Result<(), DispatchError> {
        let start = std::time::Instant::now();
        let result = self.dispatch(case, action).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => info!(
                case = %case.case_number,
                action = ?action.action_type,
                channel = %action.channel,
                duration_ms,
                "action applied"
            ),
            Err(e) => warn!(
                case = %case.case_number,
                action = ?action.action_type,
                channel = %action.channel,
                error = %e,
                duration_ms,
                "action failed"
            ),
        }

        result
    }

    async fn dispatch(&self, case: &Case, action: &Action) -> Result<(), DispatchError> {
        let ctx = MessageContext::from_case(case);
        let case_ref = CaseRef::of(case);
        let template_id = action.template.as_deref();

        match action.action_type {
            ActionType::SendSms => {
                let mobile = require_contact(case, case.customer.mobile_number.as_deref(), "mobile number")?;
                let body = self.render_body(action, &ctx);
                self.channels
                    .sms
                    .send_sms(mobile, &body, template_id, &case_ref)
                    .await?;
            }
            ActionType::SendWhatsapp => {
                let mobile = require_contact(case, case.customer.mobile_number.as_deref(), "mobile number")?;
                let body = self.render_body(action, &ctx);
                self.channels
                    .whatsapp
                    .send_whatsapp(mobile, &body, template_id, &case_ref)
                    .await?;
            }
            ActionType::SendEmail => {
                let email = require_contact(case, case.customer.email_address.as_deref(), "email address")?;
                let body = self.render_body(action, &ctx);
                let subject = template::default_subject(&ctx);
                self.channels
                    .email
                    .send_email(email, &subject, &body, template_id, &case_ref)
                    .await?;
            }
            ActionType::CreateNotice => {
                self.channels
                    .notice
                    .create_notice(&case_ref, &action.channel, template_id)
                    .await?;
            }
            ActionType::ScheduleCall => {
                self.channels
                    .call
                    .schedule_call(&case_ref, &action.channel)
                    .await?;
            }
        }

        Ok(())
    }

    /// Inline templates (anything with minijinja placeholders) render
    /// against the case; opaque vendor template ids pass through with the
    /// built-in body. Render failures fall back rather than failing the
    /// dispatch.
    fn render_body(&self, action: &Action, ctx: &MessageContext) -> String {
        if let Some(tmpl) = action.template.as_deref() {
            if tmpl.contains("{{") {
                match self.renderer.render(tmpl, ctx) {
                    Ok(body) => return body,
                    Err(e) => warn!(
                        channel = %action.channel,
                        error = %e,
                        "message template failed to render, using default body"
                    ),
                }
            }
        }
        template::default_body(action.action_type, ctx)
    }

    /// Send a synthetic message through one named channel to verify its
    /// configuration.
    pub async fn test_channel(&self, channel: &str, target: &str) -> Result<(), ChannelError> {
        let case_ref = CaseRef {
            case_id: uuid::Uuid::new_v4(),
            case_number: "TEST".to_string(),
        };
        let body = "[TEST] Connectivity check from dunner.";

        match channel {
            "sms" => self.channels.sms.send_sms(target, body, None, &case_ref).await,
            "whatsapp" => {
                self.channels
                    .whatsapp
                    .send_whatsapp(target, body, None, &case_ref)
                    .await
            }
            "email" => {
                self.channels
                    .email
                    .send_email(target, "[TEST] dunner connectivity check", body, None, &case_ref)
                    .await
            }
            "notice" => self.channels.notice.create_notice(&case_ref, target, None).await,
            "call" => self.channels.call.schedule_call(&case_ref, target).await,
            other => Err(ChannelError::Config(format!("unknown channel '{other}'"))),
        }
    }
}

fn require_contact<'a>(
    case: &Case,
    value: Option<&'a str>,
    attribute: &'static str,
) -> Result<&'a str, DispatchError> {
    value.ok_or_else(|| DispatchError::MissingContact {
        case_number: case.case_number.clone(),
        attribute,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dunner_core::{CaseStatus, Customer, Loan};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct MockSms {
        sent: Arc<AtomicUsize>,
        last_body: std::sync::Mutex<Option<String>>,
        should_fail: bool,
    }

    #[async_trait]
    impl SmsGateway for MockSms {
        async fn send_sms(
            &self,
            _mobile: &str,
            message: &str,
            _template_id: Option<&str>,
            _case: &CaseRef,
        ) -> Result<(), ChannelError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            *self.last_body.lock().unwrap() = Some(message.to_string());
            if self.should_fail {
                Err(ChannelError::Rejected("vendor 500".to_string()))
            } else {
                Ok(())
            }
        }
        fn channel_name(&self) -> &str {
            "mock-sms"
        }
    }

    fn channels_with_sms(sms: Arc<dyn SmsGateway>) -> ChannelSet {
        let mut set = ChannelSet::log_only();
        set.sms = sms;
        set
    }

    fn make_case(mobile: Option<&str>) -> Case {
        Case {
            id: Uuid::new_v4(),
            case_number: "CS-77".to_string(),
            status: CaseStatus::Allocated,
            language: None,
            allocation_month: None,
            loan: Loan {
                account_number: "LN-77".to_string(),
                product_code: "TW".to_string(),
                branch_code: None,
                dpd: 12,
                bucket: "B1".to_string(),
                total_outstanding: 54000.0,
                principal_outstanding: 50000.0,
                interest_outstanding: 4000.0,
                emi_amount: 1800.0,
                tenure_months: 24,
                disbursal_date: None,
                last_payment_date: None,
            },
            customer: Customer {
                full_name: "Vikram Shah".to_string(),
                mobile_number: mobile.map(str::to_string),
                email_address: None,
                state: None,
                city: None,
                pincode: None,
                preferred_language: None,
            },
        }
    }

    fn sms_action(template: Option<&str>) -> Action {
        Action {
            id: Uuid::new_v4(),
            action_type: ActionType::SendSms,
            channel: "txn".to_string(),
            template: template.map(str::to_string),
            priority: 0,
            active: true,
        }
    }

    #[tokio::test]
    async fn missing_mobile_never_reaches_the_gateway() {
        let sent = Arc::new(AtomicUsize::new(0));
        let sms = Arc::new(MockSms {
            sent: sent.clone(),
            last_body: std::sync::Mutex::new(None),
            should_fail: false,
        });
        let dispatcher = ActionDispatcher::new(channels_with_sms(sms));

        let err = dispatcher
            .apply(&make_case(None), &sms_action(None))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::MissingContact { attribute: "mobile number", .. }));
        assert_eq!(sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn inline_template_renders_case_fields() {
        let sent = Arc::new(AtomicUsize::new(0));
        let sms = Arc::new(MockSms {
            sent: sent.clone(),
            last_body: std::sync::Mutex::new(None),
            should_fail: false,
        });
        let dispatcher = ActionDispatcher::new(channels_with_sms(sms.clone()));

        dispatcher
            .apply(
                &make_case(Some("9800000001")),
                &sms_action(Some("{{ customer_name }}: {{ dpd }} dpd")),
            )
            .await
            .unwrap();

        assert_eq!(sent.load(Ordering::SeqCst), 1);
        let body = sms.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(body, "Vikram Shah: 12 dpd");
    }

    #[tokio::test]
    async fn broken_template_falls_back_to_default_body() {
        let sent = Arc::new(AtomicUsize::new(0));
        let sms = Arc::new(MockSms {
            sent: sent.clone(),
            last_body: std::sync::Mutex::new(None),
            should_fail: false,
        });
        let dispatcher = ActionDispatcher::new(channels_with_sms(sms.clone()));

        dispatcher
            .apply(&make_case(Some("9800000001")), &sms_action(Some("{{ unclosed")))
            .await
            .unwrap();

        let body = sms.last_body.lock().unwrap().clone().unwrap();
        assert!(body.contains("LN-77"));
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_as_channel_error() {
        let sms = Arc::new(MockSms {
            sent: Arc::new(AtomicUsize::new(0)),
            last_body: std::sync::Mutex::new(None),
            should_fail: true,
        });
        let dispatcher = ActionDispatcher::new(channels_with_sms(sms));

        let err = dispatcher
            .apply(&make_case(Some("9800000001")), &sms_action(None))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Channel(ChannelError::Rejected(_))));
    }

    #[tokio::test]
    async fn notice_and_call_accept_cases_without_contacts() {
        let dispatcher = ActionDispatcher::new(ChannelSet::log_only());
        let case = make_case(None);

        for action_type in [ActionType::CreateNotice, ActionType::ScheduleCall] {
            let action = Action {
                id: Uuid::new_v4(),
                action_type,
                channel: "default".to_string(),
                template: None,
                priority: 0,
                active: true,
            };
            dispatcher.apply(&case, &action).await.unwrap();
        }
    }
}
