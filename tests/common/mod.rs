#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use chrono::NaiveDate;
use jmd_backoffice_api::{
    cache::CatalogueCache,
    config::{
        AppConfig, CompanyProfile, SmtpConfig, StorageBackend, StorageConfig, WhatsAppConfig,
    },
    db::{create_orm_conn, run_migrations},
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    models::Role,
    notify::{MockEmailSender, MockStorage, MockWhatsAppSender, StaticDirectory},
    pdf::{DocumentKind, DocumentLine, DocumentParty, DocumentTotals, InvoiceDocument},
    state::{AppState, Providers},
};
use rust_decimal_macros::dec;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinHandle,
};
use uuid::Uuid;

// Tests in one binary run concurrently but share one database.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            None
        }
    }
}

pub fn company() -> CompanyProfile {
    CompanyProfile {
        name: "JMD Tailors".into(),
        address: "14 Linking Road, Mumbai".into(),
        phone: "+91 22 5555 0101".into(),
        email: "billing@jmd.test".into(),
        gstin: Some("27ABCDE1234F1Z5".into()),
        bank_name: Some("Example Bank".into()),
        bank_account: Some("001122334455".into()),
        bank_ifsc: Some("EXMP0000123".into()),
        upi_id: Some("jmd@upi".into()),
    }
}

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        jwt_secret: "test-secret".into(),
        default_tax_rate: dec!(18),
        cache_ttl: Duration::from_secs(60),
        pdf_cache_capacity: 8,
        notify_queue_size: 16,
        upload_max_attempts: 3,
        pending_order_ttl_hours: 24,
        storage: StorageConfig {
            backend: StorageBackend::Local,
            local_dir: PathBuf::from("./target/test-storage"),
            public_base_url: "https://files.test".into(),
            s3_bucket: None,
        },
        smtp: SmtpConfig {
            enabled: false,
            host: "localhost".into(),
            port: 25,
            user: String::new(),
            password: String::new(),
            from_email: "billing@jmd.test".into(),
            from_name: "JMD Billing".into(),
        },
        whatsapp: WhatsAppConfig {
            enabled: false,
            api_url: String::new(),
            api_key: String::new(),
            template: "bill_document".into(),
        },
        company: company(),
    }
}

pub struct TestApp {
    pub state: AppState,
    pub worker: JoinHandle<()>,
    pub storage: Arc<MockStorage>,
    pub email: Arc<MockEmailSender>,
    pub whatsapp: Arc<MockWhatsAppSender>,
    _db: MutexGuard<'static, ()>,
}

impl TestApp {
    /// Stops intake and waits until every queued notification is delivered.
    pub async fn drain(self) -> (Arc<MockEmailSender>, Arc<MockWhatsAppSender>, Arc<MockStorage>) {
        self.state.notifications.shutdown();
        let _ = self.worker.await;
        (self.email, self.whatsapp, self.storage)
    }
}

/// Migrated, truncated database with mock delivery providers.
pub async fn setup_app(database_url: &str) -> anyhow::Result<TestApp> {
    let db = DB_LOCK.lock().await;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE invoices, pending_orders, bills, order_items, orders, clients, \
         style_masters, item_masters, fabrics, audit_logs, number_sequences, users, branches \
         RESTART IDENTITY CASCADE",
    ))
    .await?;

    let storage = Arc::new(MockStorage::new());
    let email = Arc::new(MockEmailSender::new());
    let whatsapp = Arc::new(MockWhatsAppSender::new());
    let providers = Providers {
        storage: storage.clone(),
        email: email.clone(),
        whatsapp: whatsapp.clone(),
        directors: Arc::new(StaticDirectory::new(vec!["director@jmd.test".into()])),
    };

    let (state, worker) = AppState::with_providers(
        orm,
        test_config(database_url),
        CatalogueCache::disabled(),
        providers,
    );

    Ok(TestApp {
        state,
        worker,
        storage,
        email,
        whatsapp,
        _db: db,
    })
}

pub async fn create_user(
    state: &AppState,
    role: Role,
    email: &str,
    branch_id: Option<Uuid>,
) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.as_str().to_string()),
        branch_id: Set(branch_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
        branch_id,
    })
}

pub fn sample_document(number: &str) -> InvoiceDocument {
    InvoiceDocument {
        kind: DocumentKind::Bill,
        number: number.to_string(),
        issued_on: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        due_on: NaiveDate::from_ymd_opt(2024, 3, 20),
        order_number: Some("JMD-ORD-202403-0001".into()),
        company: company(),
        client: DocumentParty {
            name: "Asha Rao".into(),
            mobile: Some("9876543210".into()),
            email: Some("asha@example.com".into()),
            address_lines: vec!["12 MG Road".into(), "Pune, 411001".into()],
            gstin: None,
        },
        shipping: None,
        lines: vec![DocumentLine {
            description: "Shirt".into(),
            style: Some("Slim fit".into()),
            fabric: Some("Egyptian Cotton".into()),
            fabric_meters: dec!(2.5),
            quantity: 1,
            unit_price: dec!(950),
            alteration: dec!(0),
            handwork: dec!(50),
            other_charges: dec!(0),
            total: dec!(1000),
        }],
        totals: DocumentTotals {
            subtotal: dec!(1000),
            discount: dec!(100),
            taxable: dec!(900),
            tax_rate: dec!(18),
            tax: dec!(162),
            total: dec!(1062),
            paid: dec!(500),
            balance: dec!(562),
        },
        notes: Some("Deliver before Holi".into()),
    }
}
