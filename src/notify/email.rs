use std::sync::Mutex;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use super::ProviderError;
use crate::config::SmtpConfig;

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub attachment: Option<EmailAttachment>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<(), ProviderError>;
}

pub struct SmtpEmailSender {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpEmailSender {
    pub fn new(config: SmtpConfig) -> Result<Self, ProviderError> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(config.user.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| ProviderError::Configuration(format!("smtp relay: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }

    fn build(&self, email: &EmailMessage) -> Result<Message, ProviderError> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| ProviderError::Configuration(format!("invalid from address: {e}")))?;

        let mut builder = Message::builder().from(from).subject(&email.subject);
        for to in &email.to {
            let mailbox: Mailbox = to
                .parse()
                .map_err(|e| ProviderError::InvalidRecipient(format!("{to}: {e}")))?;
            builder = builder.to(mailbox);
        }

        let html = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone());

        let message = match &email.attachment {
            Some(file) => {
                let content_type = ContentType::parse(&file.content_type)
                    .map_err(|e| ProviderError::SendFailed(format!("content type: {e}")))?;
                let attachment =
                    Attachment::new(file.filename.clone()).body(file.data.clone(), content_type);
                builder.multipart(MultiPart::mixed().singlepart(html).singlepart(attachment))
            }
            None => builder.singlepart(html),
        };

        message.map_err(|e| ProviderError::SendFailed(format!("build message: {e}")))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: &EmailMessage) -> Result<(), ProviderError> {
        let Some(transport) = self.transport.as_ref() else {
            return Err(ProviderError::NotEnabled("smtp"));
        };
        if email.to.is_empty() {
            return Err(ProviderError::InvalidRecipient("no recipients".to_string()));
        }

        let message = self.build(email)?;
        transport
            .send(message)
            .await
            .map_err(|e| ProviderError::SendFailed(format!("smtp send: {e}")))?;

        tracing::info!(recipients = email.to.len(), subject = %email.subject, "email sent");
        Ok(())
    }
}

/// Records every message; optionally fails every send.
#[derive(Default)]
pub struct MockEmailSender {
    fail: bool,
    sent: Mutex<Vec<EmailMessage>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, email: &EmailMessage) -> Result<(), ProviderError> {
        if self.fail {
            return Err(ProviderError::SendFailed("mock email failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(email.clone());
        Ok(())
    }
}
