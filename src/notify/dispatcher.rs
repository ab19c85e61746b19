use std::{fmt::Display, future::Future, sync::Arc, time::Duration};

use backoff::{ExponentialBackoff, future::retry};
use serde::Serialize;

use super::{
    email::{EmailAttachment, EmailMessage, EmailSender},
    storage::{Storage, StorageError, StoredObject},
    whatsapp::{WhatsAppMessage, WhatsAppSender},
};
use crate::pdf::PDF_CONTENT_TYPE;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            current_interval: self.initial_interval,
            max_interval: self.max_interval,
            // The attempt counter bounds the retries, not elapsed time.
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Runs `op` until it succeeds or `policy.max_attempts` attempts have failed.
/// `op` receives the 1-based attempt number.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    retry(policy.backoff(), || {
        attempt += 1;
        let current = attempt;
        let fut = op(current);
        async move {
            fut.await.map_err(|err| {
                tracing::warn!(
                    operation,
                    attempt = current,
                    max_attempts,
                    error = %err,
                    "attempt failed"
                );
                if current >= max_attempts {
                    backoff::Error::permanent(err)
                } else {
                    backoff::Error::transient(err)
                }
            })
        }
    })
    .await
}

/// `bills/X.pdf` becomes `bills/X-share.pdf`.
pub fn share_key(key: &str) -> String {
    match key.strip_suffix(".pdf") {
        Some(stem) => format!("{stem}-share.pdf"),
        None => format!("{key}-share"),
    }
}

/// One rendered document and everyone who should receive it.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub key: String,
    pub filename: String,
    pub pdf: Arc<Vec<u8>>,
    pub subject: String,
    pub html: String,
    pub emails: Vec<String>,
    pub whatsapp_to: Option<String>,
    pub whatsapp_params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "error")]
pub enum StepOutcome {
    Sent,
    Skipped,
    Failed(String),
}

impl StepOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, StepOutcome::Sent)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub email: StepOutcome,
    pub share_upload: StepOutcome,
    pub whatsapp: StepOutcome,
    pub share_url: Option<String>,
}

pub struct Dispatcher {
    storage: Arc<dyn Storage>,
    email: Arc<dyn EmailSender>,
    whatsapp: Arc<dyn WhatsAppSender>,
    retry: RetryPolicy,
    whatsapp_template: String,
}

impl Dispatcher {
    pub fn new(
        storage: Arc<dyn Storage>,
        email: Arc<dyn EmailSender>,
        whatsapp: Arc<dyn WhatsAppSender>,
        retry: RetryPolicy,
        whatsapp_template: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            email,
            whatsapp,
            retry,
            whatsapp_template: whatsapp_template.into(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub async fn upload_pdf(&self, key: &str, bytes: &[u8]) -> Result<StoredObject, StorageError> {
        let stored = with_retry(&self.retry, "pdf_upload", |_| {
            self.storage.upload(key, bytes.to_vec(), PDF_CONTENT_TYPE)
        })
        .await?;
        tracing::info!(key, size = stored.size, "pdf uploaded");
        Ok(stored)
    }

    pub async fn delete_pdf(&self, key: &str) -> Result<(), StorageError> {
        self.storage.delete(key).await
    }

    /// Email, share upload and WhatsApp are attempted independently; a
    /// failure in one step is reported and never stops the others.
    pub async fn deliver(&self, delivery: &Delivery) -> DeliveryReport {
        let email = self.send_email(delivery).await;

        let (share_upload, share_url) = match delivery.whatsapp_to {
            Some(_) => {
                let share_key = share_key(&delivery.key);
                match self.upload_pdf(&share_key, &delivery.pdf).await {
                    Ok(stored) => (StepOutcome::Sent, Some(stored.url)),
                    Err(err) => {
                        tracing::warn!(key = %share_key, error = %err, "share upload failed");
                        (StepOutcome::Failed(err.to_string()), None)
                    }
                }
            }
            None => (StepOutcome::Skipped, None),
        };

        let whatsapp = match (&delivery.whatsapp_to, &share_url) {
            (Some(to), Some(url)) => self.send_whatsapp(delivery, to, url).await,
            (Some(_), None) => StepOutcome::Failed("no shareable document url".to_string()),
            (None, _) => StepOutcome::Skipped,
        };

        DeliveryReport {
            email,
            share_upload,
            whatsapp,
            share_url,
        }
    }

    async fn send_email(&self, delivery: &Delivery) -> StepOutcome {
        if delivery.emails.is_empty() {
            return StepOutcome::Skipped;
        }

        let message = EmailMessage {
            to: delivery.emails.clone(),
            subject: delivery.subject.clone(),
            html: delivery.html.clone(),
            attachment: Some(EmailAttachment {
                filename: delivery.filename.clone(),
                content_type: PDF_CONTENT_TYPE.to_string(),
                data: delivery.pdf.as_ref().clone(),
            }),
        };

        match self.email.send(&message).await {
            Ok(()) => StepOutcome::Sent,
            Err(err) => {
                tracing::warn!(key = %delivery.key, error = %err, "email delivery failed");
                StepOutcome::Failed(err.to_string())
            }
        }
    }

    async fn send_whatsapp(&self, delivery: &Delivery, to: &str, url: &str) -> StepOutcome {
        let message = WhatsAppMessage {
            to: to.to_string(),
            template: self.whatsapp_template.clone(),
            document_url: url.to_string(),
            filename: delivery.filename.clone(),
            params: delivery.whatsapp_params.clone(),
        };

        match self.whatsapp.send(&message).await {
            Ok(()) => StepOutcome::Sent,
            Err(err) => {
                tracing::warn!(key = %delivery.key, error = %err, "whatsapp delivery failed");
                StepOutcome::Failed(err.to_string())
            }
        }
    }
}
