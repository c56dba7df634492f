use crate::app_config::{AppConfig, Environment, MailConfig, SmtpConfig, StorageConfig};
use crate::ConfigError;

const DEFAULT_MAX_UPLOAD_BYTES: &str = "15728640";
const DEFAULT_MAIL_FROM: &str = "Crystal Website Contact <noreply@localhost>";
const DEFAULT_GCS_API_BASE: &str = "https://storage.googleapis.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CRYSTAL_ENV", "development"));

    let bind_addr = parse_addr("CRYSTAL_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CRYSTAL_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("CRYSTAL_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CRYSTAL_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CRYSTAL_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let max_upload_bytes = parse_usize("CRYSTAL_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
    let public_dir = optional("CRYSTAL_PUBLIC_DIR").map(PathBuf::from);
    let rate_limit_per_minute = parse_usize("CRYSTAL_RATE_LIMIT_PER_MINUTE", "120")?;

    let storage = match or_default("CRYSTAL_STORAGE_BACKEND", "local").as_str() {
        "local" => StorageConfig::Local {
            dir: PathBuf::from(or_default("CRYSTAL_LOCAL_UPLOAD_DIR", "./uploads")),
            public_base_url: or_default("CRYSTAL_PUBLIC_BASE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
        },
        "gcs" => StorageConfig::Gcs {
            bucket: require("CRYSTAL_GCS_BUCKET")?,
            access_token: optional("CRYSTAL_GCS_ACCESS_TOKEN"),
            api_base: or_default("CRYSTAL_GCS_API_BASE", DEFAULT_GCS_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        },
        other => {
            return Err(invalid(
                "CRYSTAL_STORAGE_BACKEND",
                format!("expected 'local' or 'gcs', got '{other}'"),
            ))
        }
    };

    let smtp = optional("CRYSTAL_SMTP_HOST").map(|host| SmtpConfig {
        host,
        username: optional("CRYSTAL_SMTP_USERNAME"),
        password: optional("CRYSTAL_SMTP_PASSWORD"),
    });
    let to = optional("CRYSTAL_MAIL_TO");
    if smtp.is_some() && to.is_none() {
        return Err(ConfigError::MissingEnvVar("CRYSTAL_MAIL_TO".to_string()));
    }
    let mail = MailConfig {
        smtp,
        from: or_default("CRYSTAL_MAIL_FROM", DEFAULT_MAIL_FROM),
        to,
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        max_upload_bytes,
        public_dir,
        storage,
        mail,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
