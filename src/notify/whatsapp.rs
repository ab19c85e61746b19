use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use serde::Serialize;

use super::ProviderError;
use crate::config::WhatsAppConfig;

#[derive(Debug, Clone, Serialize)]
pub struct WhatsAppMessage {
    pub to: String,
    pub template: String,
    pub document_url: String,
    pub filename: String,
    pub params: Vec<String>,
}

#[async_trait]
pub trait WhatsAppSender: Send + Sync {
    async fn send(&self, message: &WhatsAppMessage) -> Result<(), ProviderError>;
}

/// Template message through a business-messaging HTTP API.
pub struct HttpWhatsAppSender {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl HttpWhatsAppSender {
    pub fn new(config: WhatsAppConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Configuration(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl WhatsAppSender for HttpWhatsAppSender {
    async fn send(&self, message: &WhatsAppMessage) -> Result<(), ProviderError> {
        if !self.config.enabled || self.config.api_url.is_empty() {
            return Err(ProviderError::NotEnabled("whatsapp"));
        }

        let body = serde_json::json!({
            "to": message.to,
            "type": "template",
            "template": {
                "name": message.template,
                "parameters": message.params,
            },
            "document": {
                "link": message.document_url,
                "filename": message.filename,
            },
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::SendFailed(format!("whatsapp api {status}: {text}")));
        }

        tracing::info!(to = %message.to, template = %message.template, "whatsapp message sent");
        Ok(())
    }
}

#[derive(Default)]
pub struct MockWhatsAppSender {
    fail: bool,
    sent: Mutex<Vec<WhatsAppMessage>>,
}

impl MockWhatsAppSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<WhatsAppMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl WhatsAppSender for MockWhatsAppSender {
    async fn send(&self, message: &WhatsAppMessage) -> Result<(), ProviderError> {
        if self.fail {
            return Err(ProviderError::SendFailed("mock whatsapp failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        Ok(())
    }
}
