//! Document delivery: object storage, email, WhatsApp and the background
//! notification queue that ties them together.

pub mod dispatcher;
pub mod email;
pub mod queue;
pub mod storage;
pub mod whatsapp;

use thiserror::Error;

pub use dispatcher::{Delivery, DeliveryReport, Dispatcher, RetryPolicy, StepOutcome};
pub use email::{EmailMessage, EmailSender, MockEmailSender, SmtpEmailSender};
pub use queue::{
    DirectorLookup, NotificationJob, NotificationQueue, OrmDirectory, StaticDirectory,
};
pub use storage::{LocalStorage, MockStorage, S3Storage, Storage, StorageError, StoredObject};
pub use whatsapp::{HttpWhatsAppSender, MockWhatsAppSender, WhatsAppMessage, WhatsAppSender};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} provider is not enabled")]
    NotEnabled(&'static str),

    #[error("provider configuration error: {0}")]
    Configuration(String),

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("send failed: {0}")]
    SendFailed(String),
}
