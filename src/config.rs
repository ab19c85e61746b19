use std::{env, path::PathBuf, str::FromStr, time::Duration};

use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub default_tax_rate: Decimal,
    pub cache_ttl: Duration,
    pub pdf_cache_capacity: usize,
    pub notify_queue_size: usize,
    pub upload_max_attempts: u32,
    pub pending_order_ttl_hours: i64,
    pub storage: StorageConfig,
    pub smtp: SmtpConfig,
    pub whatsapp: WhatsAppConfig,
    pub company: CompanyProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_dir: PathBuf,
    pub public_base_url: String,
    pub s3_bucket: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: String,
    pub template: String,
}

/// Letterhead and bank block printed on every generated document.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub gstin: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub bank_ifsc: Option<String>,
    pub upi_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_parse("APP_PORT", 3000);

        let backend = match env_or("STORAGE_BACKEND", "local").as_str() {
            "s3" => StorageBackend::S3,
            _ => StorageBackend::Local,
        };
        let storage = StorageConfig {
            backend,
            local_dir: PathBuf::from(env_or("STORAGE_LOCAL_DIR", "./storage")),
            public_base_url: env_or("STORAGE_PUBLIC_BASE_URL", "http://127.0.0.1:3000/files"),
            s3_bucket: env::var("S3_BUCKET").ok(),
        };

        let smtp = SmtpConfig {
            enabled: env_parse("SMTP_ENABLED", false),
            host: env_or("SMTP_HOST", "localhost"),
            port: env_parse("SMTP_PORT", 587),
            user: env_or("SMTP_USER", ""),
            password: env_or("SMTP_PASSWORD", ""),
            from_email: env_or("SMTP_FROM_EMAIL", "billing@example.com"),
            from_name: env_or("SMTP_FROM_NAME", "Billing"),
        };

        let whatsapp = WhatsAppConfig {
            enabled: env_parse("WHATSAPP_ENABLED", false),
            api_url: env_or("WHATSAPP_API_URL", ""),
            api_key: env_or("WHATSAPP_API_KEY", ""),
            template: env_or("WHATSAPP_TEMPLATE", "bill_document"),
        };

        let company = CompanyProfile {
            name: env_or("COMPANY_NAME", "JMD Tailors"),
            address: env_or("COMPANY_ADDRESS", ""),
            phone: env_or("COMPANY_PHONE", ""),
            email: env_or("COMPANY_EMAIL", ""),
            gstin: env::var("COMPANY_GSTIN").ok(),
            bank_name: env::var("BANK_NAME").ok(),
            bank_account: env::var("BANK_ACCOUNT").ok(),
            bank_ifsc: env::var("BANK_IFSC").ok(),
            upi_id: env::var("UPI_ID").ok(),
        };

        Ok(Self {
            database_url,
            host,
            port,
            environment: env_or("APP_ENV", "development"),
            jwt_secret,
            default_tax_rate: env_parse("DEFAULT_TAX_RATE", Decimal::from(18)),
            cache_ttl: Duration::from_secs(env_parse("CACHE_TTL_SECS", 600)),
            pdf_cache_capacity: env_parse("PDF_CACHE_CAPACITY", 50),
            notify_queue_size: env_parse("NOTIFY_QUEUE_SIZE", 256),
            upload_max_attempts: env_parse("UPLOAD_MAX_ATTEMPTS", 3),
            pending_order_ttl_hours: env_parse("PENDING_ORDER_TTL_HOURS", 24),
            storage,
            smtp,
            whatsapp,
            company,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
