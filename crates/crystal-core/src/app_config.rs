use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where uploaded images and the PDF catalogue live.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Files under a local directory, published below `public_base_url`.
    Local {
        dir: PathBuf,
        public_base_url: String,
    },
    /// A Google Cloud Storage bucket reached through the JSON API.
    Gcs {
        bucket: String,
        access_token: Option<String>,
        api_base: String,
    },
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageConfig::Local {
                dir,
                public_base_url,
            } => f
                .debug_struct("Local")
                .field("dir", dir)
                .field("public_base_url", public_base_url)
                .finish(),
            StorageConfig::Gcs {
                bucket,
                access_token,
                api_base,
            } => f
                .debug_struct("Gcs")
                .field("bucket", bucket)
                .field("access_token", &access_token.as_ref().map(|_| "[redacted]"))
                .field("api_base", api_base)
                .finish(),
        }
    }
}

/// SMTP relay credentials for the contact form.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// `None` means contact messages are logged instead of sent.
    pub smtp: Option<SmtpConfig>,
    pub from: String,
    pub to: Option<String>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub public_dir: Option<PathBuf>,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("public_dir", &self.public_dir)
            .field("storage", &self.storage)
            .field("mail", &self.mail)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
