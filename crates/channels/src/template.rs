//! Minijinja template rendering for outbound messages.
//!
//! Actions may carry an inline template whose placeholders draw from the
//! case's attributes. Templates are arbitrary strings (not pre-registered),
//! so a fresh [`minijinja::Environment`] is created per render call.

use dunner_core::{ActionType, Case};

use crate::traits::ChannelError;

/// Case data available to message templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MessageContext {
    pub case_number: String,
    pub customer_name: String,
    pub dpd: i64,
    pub bucket: String,
    pub total_outstanding: f64,
    pub emi_amount: f64,
    pub product_code: String,
    pub account_number: String,
    pub language: Option<String>,
}

impl MessageContext {
    pub fn from_case(case: &Case) -> Self {
        Self {
            case_number: case.case_number.clone(),
            customer_name: case.customer.full_name.clone(),
            dpd: case.loan.dpd,
            bucket: case.loan.bucket.clone(),
            total_outstanding: case.loan.total_outstanding,
            emi_amount: case.loan.emi_amount,
            product_code: case.loan.product_code.clone(),
            account_number: case.loan.account_number.clone(),
            language: case
                .language
                .clone()
                .or_else(|| case.customer.preferred_language.clone()),
        }
    }
}

/// Renders message templates using minijinja.
#[derive(Debug, Default)]
pub struct TemplateRenderer {
    _private: (),
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Check template syntax without rendering.
    pub fn validate(&self, template: &str) -> Result<(), ChannelError> {
        let env = minijinja::Environment::new();
        env.template_from_str(template)
            .map(|_| ())
            .map_err(|e| ChannelError::Template(e.to_string()))
    }

    /// Render a template against a case's message context.
    pub fn render(&self, template: &str, ctx: &MessageContext) -> Result<String, ChannelError> {
        let env = minijinja::Environment::new();
        env.render_str(template, ctx)
            .map_err(|e| ChannelError::Template(e.to_string()))
    }
}

/// Built-in message body used when an action has no template or its
/// template fails to render.
pub fn default_body(action_type: ActionType, ctx: &MessageContext) -> String {
    match action_type {
        ActionType::SendSms | ActionType::SendWhatsapp => format!(
            "Dear {}, your {} loan {} is overdue by {} days. Outstanding: {:.2}. Please pay at the earliest to avoid further action.",
            ctx.customer_name, ctx.product_code, ctx.account_number, ctx.dpd, ctx.total_outstanding
        ),
        ActionType::SendEmail => format!(
            "Dear {},\n\nThis is a reminder that your {} loan account {} is overdue by {} days with an outstanding amount of {:.2}.\n\nPlease make the payment at the earliest.\n\nReference: {}",
            ctx.customer_name,
            ctx.product_code,
            ctx.account_number,
            ctx.dpd,
            ctx.total_outstanding,
            ctx.case_number
        ),
        ActionType::CreateNotice | ActionType::ScheduleCall => {
            format!("Case {} ({} dpd)", ctx.case_number, ctx.dpd)
        }
    }
}

/// Default subject line for email actions.
pub fn default_subject(ctx: &MessageContext) -> String {
    format!("Payment reminder for account {}", ctx.account_number)
}
