use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    cache::CatalogueCache,
    config::{AppConfig, StorageBackend},
    db::OrmConn,
    notify::{
        DirectorLookup, Dispatcher, EmailSender, HttpWhatsAppSender, LocalStorage,
        NotificationQueue, OrmDirectory, RetryPolicy, S3Storage, SmtpEmailSender, Storage,
        WhatsAppSender,
    },
    pdf::PdfRenderer,
};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub cache: CatalogueCache,
    pub renderer: Arc<PdfRenderer>,
    pub dispatcher: Arc<Dispatcher>,
    pub notifications: NotificationQueue,
}

/// Delivery collaborators; production wires real providers, tests wire mocks.
pub struct Providers {
    pub storage: Arc<dyn Storage>,
    pub email: Arc<dyn EmailSender>,
    pub whatsapp: Arc<dyn WhatsAppSender>,
    pub directors: Arc<dyn DirectorLookup>,
}

impl AppState {
    /// Builds providers from configuration and starts the notification worker.
    pub async fn build(orm: OrmConn, config: AppConfig) -> anyhow::Result<(Self, JoinHandle<()>)> {
        let storage: Arc<dyn Storage> = match config.storage.backend {
            StorageBackend::Local => Arc::new(
                LocalStorage::new(
                    config.storage.local_dir.clone(),
                    config.storage.public_base_url.clone(),
                )
                .await?,
            ),
            StorageBackend::S3 => {
                let bucket = config
                    .storage
                    .s3_bucket
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("S3_BUCKET is required for the s3 backend"))?;
                let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                Arc::new(S3Storage::new(
                    aws_sdk_s3::Client::new(&aws),
                    bucket,
                    config.storage.public_base_url.clone(),
                ))
            }
        };

        let providers = Providers {
            storage,
            email: Arc::new(SmtpEmailSender::new(config.smtp.clone())?),
            whatsapp: Arc::new(HttpWhatsAppSender::new(config.whatsapp.clone())?),
            directors: Arc::new(OrmDirectory::new(orm.clone())),
        };
        let cache = CatalogueCache::new(config.cache_ttl);

        Ok(Self::with_providers(orm, config, cache, providers))
    }

    pub fn with_providers(
        orm: OrmConn,
        config: AppConfig,
        cache: CatalogueCache,
        providers: Providers,
    ) -> (Self, JoinHandle<()>) {
        let renderer = Arc::new(PdfRenderer::new(config.pdf_cache_capacity));
        let dispatcher = Arc::new(Dispatcher::new(
            providers.storage,
            providers.email,
            providers.whatsapp,
            RetryPolicy::with_attempts(config.upload_max_attempts),
            config.whatsapp.template.clone(),
        ));
        let (notifications, worker) = NotificationQueue::start(
            config.notify_queue_size,
            renderer.clone(),
            dispatcher.clone(),
            providers.directors,
        );

        let state = Self {
            orm,
            config: Arc::new(config),
            cache,
            renderer,
            dispatcher,
            notifications,
        };
        (state, worker)
    }
}
