//! HTTP vendor gateways for SMS and WhatsApp.
//!
//! Both deliver a JSON payload to a configured vendor endpoint with an
//! optional bearer token. The payload shape is the lowest common
//! denominator of transactional messaging vendors: recipient, message,
//! optional vendor template id, and a correlation reference.

use async_trait::async_trait;
use serde_json::json;

use crate::traits::{CaseRef, ChannelError, SmsGateway, WhatsAppGateway};

/// Sends SMS through a JSON-over-HTTP vendor endpoint.
#[derive(Debug)]
pub struct HttpSmsGateway {
    url: String,
    api_key: Option<String>,
    /// Registered sender id included in every request.
    sender_id: String,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl HttpSmsGateway {
    pub fn new(url: String, api_key: Option<String>, sender_id: String) -> Self {
        Self {
            url,
            api_key,
            sender_id,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send_sms(
        &self,
        mobile: &str,
        message: &str,
        template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError> {
        let payload = json!({
            "to": mobile,
            "message": message,
            "sender_id": self.sender_id,
            "template_id": template_id,
            "reference": case.case_number,
        });
        post_json(&self.client, &self.url, self.api_key.as_deref(), &payload).await
    }

    fn channel_name(&self) -> &str {
        "sms"
    }
}

/// Sends WhatsApp messages through a JSON-over-HTTP vendor endpoint.
#[derive(Debug)]
pub struct HttpWhatsAppGateway {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpWhatsAppGateway {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl WhatsAppGateway for HttpWhatsAppGateway {
    async fn send_whatsapp(
        &self,
        mobile: &str,
        message: &str,
        template_id: Option<&str>,
        case: &CaseRef,
    ) -> Result<(), ChannelError> {
        let payload = json!({
            "to": mobile,
            "message": message,
            "template_id": template_id,
            "reference": case.case_number,
        });
        post_json(&self.client, &self.url, self.api_key.as_deref(), &payload).await
    }

    fn channel_name(&self) -> &str {
        "whatsapp"
    }
}

/// POST a JSON payload, mapping non-2xx responses to [`ChannelError::Rejected`].
async fn post_json(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    payload: &serde_json::Value,
) -> Result<(), ChannelError> {
    let mut request = client.post(url).json(payload);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChannelError::Rejected(format!(
            "{url} returned {status}: {body}"
        )));
    }
    Ok(())
}
