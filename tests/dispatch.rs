mod common;

use std::{sync::Arc, time::Duration};

use jmd_backoffice_api::{
    notify::{
        Delivery, Dispatcher, MockEmailSender, MockStorage, MockWhatsAppSender, NotificationJob,
        NotificationQueue, RetryPolicy, StaticDirectory, StepOutcome, dispatcher::share_key,
    },
    pdf::PdfRenderer,
};

use common::sample_document;

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
    }
}

fn dispatcher(
    storage: Arc<MockStorage>,
    email: Arc<MockEmailSender>,
    whatsapp: Arc<MockWhatsAppSender>,
) -> Dispatcher {
    Dispatcher::new(storage, email, whatsapp, fast_retry(), "bill_document")
}

fn delivery(emails: Vec<String>, whatsapp_to: Option<String>) -> Delivery {
    Delivery {
        key: "bills/JMD-BILL-0001.pdf".into(),
        filename: "JMD-BILL-0001.pdf".into(),
        pdf: Arc::new(b"%PDF-1.4 test".to_vec()),
        subject: "Your bill JMD-BILL-0001".into(),
        html: "<p>Attached.</p>".into(),
        emails,
        whatsapp_to,
        whatsapp_params: vec!["Asha Rao".into(), "JMD-BILL-0001".into()],
    }
}

#[test]
fn share_key_keeps_the_extension() {
    assert_eq!(share_key("bills/X.pdf"), "bills/X-share.pdf");
    assert_eq!(share_key("bills/X"), "bills/X-share");
}

#[tokio::test]
async fn upload_gives_up_after_max_attempts() {
    let storage = Arc::new(MockStorage::failing(5));
    let dispatcher = dispatcher(
        storage.clone(),
        Arc::new(MockEmailSender::new()),
        Arc::new(MockWhatsAppSender::new()),
    );

    let result = dispatcher.upload_pdf("bills/a.pdf", b"%PDF").await;
    assert!(result.is_err());
    assert_eq!(storage.attempts(), 3);
    assert!(storage.uploaded_keys().is_empty());
}

#[tokio::test]
async fn upload_succeeds_on_a_later_attempt() {
    let storage = Arc::new(MockStorage::failing(2));
    let dispatcher = dispatcher(
        storage.clone(),
        Arc::new(MockEmailSender::new()),
        Arc::new(MockWhatsAppSender::new()),
    );

    let stored = dispatcher.upload_pdf("bills/a.pdf", b"%PDF").await.unwrap();
    assert_eq!(storage.attempts(), 3);
    assert_eq!(stored.key, "bills/a.pdf");
    assert!(stored.url.starts_with("https://files.test"));
}

#[tokio::test]
async fn email_failure_does_not_block_whatsapp() {
    let storage = Arc::new(MockStorage::new());
    let whatsapp = Arc::new(MockWhatsAppSender::new());
    let dispatcher = dispatcher(
        storage.clone(),
        Arc::new(MockEmailSender::failing()),
        whatsapp.clone(),
    );

    let report = dispatcher
        .deliver(&delivery(
            vec!["asha@example.com".into()],
            Some("9876543210".into()),
        ))
        .await;

    assert!(matches!(report.email, StepOutcome::Failed(_)));
    assert_eq!(report.share_upload, StepOutcome::Sent);
    assert_eq!(report.whatsapp, StepOutcome::Sent);
    assert_eq!(storage.uploaded_keys(), vec!["bills/JMD-BILL-0001-share.pdf"]);

    let sent = whatsapp.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "9876543210");
    assert_eq!(sent[0].template, "bill_document");
    assert!(sent[0].document_url.ends_with("JMD-BILL-0001-share.pdf"));
}

#[tokio::test]
async fn missing_recipients_are_skipped() {
    let email = Arc::new(MockEmailSender::new());
    let storage = Arc::new(MockStorage::new());
    let dispatcher = dispatcher(
        storage.clone(),
        email.clone(),
        Arc::new(MockWhatsAppSender::new()),
    );

    let report = dispatcher.deliver(&delivery(Vec::new(), None)).await;

    assert_eq!(report.email, StepOutcome::Skipped);
    assert_eq!(report.share_upload, StepOutcome::Skipped);
    assert_eq!(report.whatsapp, StepOutcome::Skipped);
    assert!(email.sent().is_empty());
    assert_eq!(storage.attempts(), 0);
}

#[tokio::test]
async fn failed_share_upload_fails_whatsapp_but_not_email() {
    let email = Arc::new(MockEmailSender::new());
    let whatsapp = Arc::new(MockWhatsAppSender::new());
    let dispatcher = dispatcher(
        Arc::new(MockStorage::failing(10)),
        email.clone(),
        whatsapp.clone(),
    );

    let report = dispatcher
        .deliver(&delivery(
            vec!["asha@example.com".into()],
            Some("9876543210".into()),
        ))
        .await;

    assert_eq!(report.email, StepOutcome::Sent);
    assert!(matches!(report.share_upload, StepOutcome::Failed(_)));
    assert!(matches!(report.whatsapp, StepOutcome::Failed(_)));
    assert_eq!(email.sent().len(), 1);
    assert!(whatsapp.sent().is_empty());
}

#[tokio::test]
async fn queue_drains_pending_jobs_on_shutdown() {
    let email = Arc::new(MockEmailSender::new());
    let whatsapp = Arc::new(MockWhatsAppSender::new());
    let dispatcher = Arc::new(dispatcher(
        Arc::new(MockStorage::new()),
        email.clone(),
        whatsapp.clone(),
    ));
    let (queue, worker) = NotificationQueue::start(
        8,
        Arc::new(PdfRenderer::new(4)),
        dispatcher,
        Arc::new(StaticDirectory::new(vec!["director@jmd.test".into()])),
    );

    queue
        .enqueue(NotificationJob::OrderPlaced {
            document: Box::new(sample_document("JMD-ORD-202403-0001")),
            branch_id: None,
            client_email: Some("asha@example.com".into()),
            client_mobile: None,
        })
        .unwrap();
    queue
        .enqueue(NotificationJob::BillIssued {
            delivery: delivery(Vec::new(), Some("9876543210".into())),
        })
        .unwrap();

    queue.shutdown();
    worker.await.unwrap();

    let sent = email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].to,
        vec!["director@jmd.test".to_string(), "asha@example.com".to_string()]
    );
    assert!(sent[0].attachment.is_some());
    assert_eq!(whatsapp.sent().len(), 1);

    assert!(
        queue
            .enqueue(NotificationJob::BillIssued {
                delivery: delivery(Vec::new(), None),
            })
            .is_none(),
        "jobs are refused after shutdown"
    );
}
