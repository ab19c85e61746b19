use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::dispatcher::{Delivery, Dispatcher};
use crate::{
    entity::users,
    error::AppResult,
    models::Role,
    pdf::{InvoiceDocument, PdfRenderer},
};

/// Work handed to the background worker after the HTTP response is sent.
#[derive(Debug, Clone)]
pub enum NotificationJob {
    /// Render an order confirmation and send it to the directors and the client.
    OrderPlaced {
        document: Box<InvoiceDocument>,
        branch_id: Option<Uuid>,
        client_email: Option<String>,
        client_mobile: Option<String>,
    },
    /// Send an already rendered bill to the client.
    BillIssued { delivery: Delivery },
}

impl NotificationJob {
    fn kind(&self) -> &'static str {
        match self {
            NotificationJob::OrderPlaced { .. } => "order_placed",
            NotificationJob::BillIssued { .. } => "bill_issued",
        }
    }
}

#[derive(Debug)]
struct QueuedJob {
    job_id: Uuid,
    job: NotificationJob,
}

#[async_trait]
pub trait DirectorLookup: Send + Sync {
    async fn director_emails(&self, branch_id: Option<Uuid>) -> AppResult<Vec<String>>;
}

/// Directors are users with the `director` role, either unassigned or on the
/// order's branch.
pub struct OrmDirectory {
    orm: DatabaseConnection,
}

impl OrmDirectory {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl DirectorLookup for OrmDirectory {
    async fn director_emails(&self, branch_id: Option<Uuid>) -> AppResult<Vec<String>> {
        let mut branch = Condition::any().add(users::Column::BranchId.is_null());
        if let Some(branch_id) = branch_id {
            branch = branch.add(users::Column::BranchId.eq(branch_id));
        }

        let directors = users::Entity::find()
            .filter(users::Column::Role.eq(Role::Director.as_str()))
            .filter(branch)
            .all(&self.orm)
            .await?;

        Ok(directors.into_iter().map(|u| u.email).collect())
    }
}

#[derive(Default)]
pub struct StaticDirectory {
    emails: Vec<String>,
}

impl StaticDirectory {
    pub fn new(emails: Vec<String>) -> Self {
        Self { emails }
    }
}

#[async_trait]
impl DirectorLookup for StaticDirectory {
    async fn director_emails(&self, _branch_id: Option<Uuid>) -> AppResult<Vec<String>> {
        Ok(self.emails.clone())
    }
}

/// Producer side of the bounded notification queue.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<QueuedJob>,
    shutdown: CancellationToken,
}

impl NotificationQueue {
    /// Spawns the single worker and returns the queue handle plus the
    /// worker's join handle, which completes once the queue has drained
    /// after [`NotificationQueue::shutdown`].
    pub fn start(
        capacity: usize,
        renderer: Arc<PdfRenderer>,
        dispatcher: Arc<Dispatcher>,
        directors: Arc<dyn DirectorLookup>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let shutdown = CancellationToken::new();

        let worker = NotificationWorker {
            rx,
            renderer,
            dispatcher,
            directors,
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(worker.run());

        (Self { tx, shutdown }, handle)
    }

    /// Never blocks; a full or closed queue drops the job with a warning.
    pub fn enqueue(&self, job: NotificationJob) -> Option<Uuid> {
        if self.shutdown.is_cancelled() {
            tracing::warn!(kind = job.kind(), "notification queue shut down, job dropped");
            return None;
        }

        let job_id = Uuid::new_v4();
        let kind = job.kind();
        match self.tx.try_send(QueuedJob { job_id, job }) {
            Ok(()) => {
                tracing::debug!(%job_id, kind, "notification queued");
                Some(job_id)
            }
            Err(err) => {
                tracing::warn!(%job_id, kind, error = %err, "notification queue rejected job");
                None
            }
        }
    }

    pub fn shutdown(&self) {
        tracing::info!("notification queue shutting down");
        self.shutdown.cancel();
    }
}

struct NotificationWorker {
    rx: mpsc::Receiver<QueuedJob>,
    renderer: Arc<PdfRenderer>,
    dispatcher: Arc<Dispatcher>,
    directors: Arc<dyn DirectorLookup>,
    shutdown: CancellationToken,
}

impl NotificationWorker {
    async fn run(mut self) {
        tracing::info!("notification worker started");
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                queued = self.rx.recv() => match queued {
                    Some(queued) => self.process(queued).await,
                    None => break,
                },
            }
        }

        self.rx.close();
        let mut drained = 0usize;
        while let Some(queued) = self.rx.recv().await {
            self.process(queued).await;
            drained += 1;
        }
        tracing::info!(drained, "notification worker stopped");
    }

    async fn process(&self, queued: QueuedJob) {
        let span = tracing::info_span!(
            "notification",
            job_id = %queued.job_id,
            kind = queued.job.kind()
        );
        async move {
            match self.build_delivery(queued.job).await {
                Some(delivery) => {
                    let report = self.dispatcher.deliver(&delivery).await;
                    tracing::info!(
                        key = %delivery.key,
                        email = ?report.email,
                        whatsapp = ?report.whatsapp,
                        "notification processed"
                    );
                }
                None => tracing::debug!("nothing to deliver"),
            }
        }
        .instrument(span)
        .await
    }

    async fn build_delivery(&self, job: NotificationJob) -> Option<Delivery> {
        match job {
            NotificationJob::BillIssued { delivery } => Some(delivery),
            NotificationJob::OrderPlaced {
                document,
                branch_id,
                client_email,
                client_mobile,
            } => {
                let mut emails = match self.directors.director_emails(branch_id).await {
                    Ok(emails) => emails,
                    Err(err) => {
                        tracing::warn!(error = %err, "director lookup failed");
                        Vec::new()
                    }
                };
                emails.extend(client_email);

                if emails.is_empty() && client_mobile.is_none() {
                    return None;
                }

                // Layout is CPU bound; keep it off the worker's executor thread.
                let renderer = self.renderer.clone();
                let rendered = tokio::task::spawn_blocking(move || {
                    let pdf = renderer.render(&document);
                    (document, pdf)
                })
                .await;
                let (document, pdf) = match rendered {
                    Ok((document, Ok(pdf))) => (document, pdf),
                    Ok((document, Err(err))) => {
                        tracing::error!(
                            number = %document.number,
                            error = %err,
                            "order confirmation render failed"
                        );
                        return None;
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "order confirmation render task failed");
                        return None;
                    }
                };

                Some(Delivery {
                    key: format!("orders/{}", document.file_name()),
                    filename: document.file_name(),
                    pdf,
                    subject: format!("Order confirmation {}", document.number),
                    html: format!(
                        "<p>Order <strong>{}</strong> for {} has been placed.</p>\
                         <p>Total: {}</p>",
                        document.number,
                        document.client.name,
                        crate::pdf::format_inr(document.totals.total)
                    ),
                    emails,
                    whatsapp_to: client_mobile,
                    whatsapp_params: vec![document.client.name.clone(), document.number.clone()],
                })
            }
        }
    }
}
