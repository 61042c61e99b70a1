//! Communication channel gateways and the per-case action dispatcher.
//!
//! This crate provides:
//! - Gateway traits for each channel (SMS, email, WhatsApp, notice, call)
//! - HTTP vendor gateways via reqwest and an SMTP gateway via lettre
//! - Minijinja message template rendering with per-action defaults
//! - [`ActionDispatcher`]: applies one action to one case, raising typed
//!   failures for missing contact attributes so callers can isolate them

pub mod dispatcher;
pub mod email;
pub mod http;
pub mod noop;
pub mod template;
pub mod traits;

pub use dispatcher::{ActionDispatcher, ChannelSet, DispatchError};
pub use template::TemplateRenderer;
pub use traits::{
    CallGateway, CaseRef, ChannelError, EmailGateway, NoticeGateway, SmsGateway, WhatsAppGateway,
};
