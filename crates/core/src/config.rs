use std::env;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
    pub sms: SmsConfig,
    pub whatsapp: WhatsAppConfig,
    pub smtp: SmtpConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            scheduler: SchedulerConfig::from_env(),
            sms: SmsConfig::from_env(),
            whatsapp: WhatsAppConfig::from_env(),
            smtp: SmtpConfig::from_env(),
        }
    }

    /// Log the effective configuration at startup (secrets elided).
    pub fn log_summary(&self) {
        info!(
            host = %self.server.host,
            port = self.server.port,
            "server config"
        );
        info!(
            tick_secs = self.scheduler.tick_secs,
            timezone = %self.scheduler.default_timezone,
            "scheduler config"
        );
        info!(
            sms_gateway = self.sms.gateway_url.is_some(),
            whatsapp_gateway = self.whatsapp.gateway_url.is_some(),
            smtp = self.smtp.host.is_some(),
            "channel gateways configured"
        );
    }
}

// ── Sections ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("DUNNER_HOST", "0.0.0.0"),
            port: env_u16("DUNNER_PORT", 8080),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduler ticks.
    pub tick_secs: u64,
    /// IANA timezone applied to schedules that don't set their own.
    pub default_timezone: String,
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            tick_secs: env_u64("DUNNER_TICK_SECS", 60),
            default_timezone: env_or("DUNNER_TIMEZONE", "UTC"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Vendor gateway endpoint. Unset means SMS falls back to the
    /// log-only gateway (useful in dev).
    pub gateway_url: Option<String>,
    pub api_key: Option<String>,
    /// Registered sender id included in every request.
    pub sender_id: String,
}

impl SmsConfig {
    pub fn from_env() -> Self {
        Self {
            gateway_url: env_opt("SMS_GATEWAY_URL"),
            api_key: env_opt("SMS_API_KEY"),
            sender_id: env_or("SMS_SENDER_ID", "DUNNER"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    pub gateway_url: Option<String>,
    pub api_key: Option<String>,
}

impl WhatsAppConfig {
    pub fn from_env() -> Self {
        Self {
            gateway_url: env_opt("WHATSAPP_GATEWAY_URL"),
            api_key: env_opt("WHATSAPP_API_KEY"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host. Unset means email falls back to the log-only
    /// gateway.
    pub host: Option<String>,
    pub port: Option<u16>,
    pub from: String,
    /// STARTTLS toggle; port 465 always uses implicit TLS.
    pub tls: bool,
}

impl SmtpConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_opt("SMTP_HOST"),
            port: env_opt("SMTP_PORT").and_then(|v| v.parse().ok()),
            from: env_or("SMTP_FROM", "collections@example.com"),
            tls: env_or("SMTP_TLS", "true") != "false",
        }
    }
}
