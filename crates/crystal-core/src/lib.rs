pub mod app_config;
pub mod config;
pub mod field_input;
pub mod normalize;
pub mod products;
pub mod serialize;

pub use app_config::{AppConfig, Environment, MailConfig, SmtpConfig, StorageConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use field_input::{FieldInput, Scalar};
pub use normalize::{
    coerce_flag, is_public_image_url, merge_images, normalize_images, normalize_key_features,
    normalize_sizes, MAX_UNWRAP_DEPTH,
};
pub use products::{FeaturedProduct, Product, ProductFields, ProductSummary, SizeEntry};
pub use serialize::{
    canonical_images_text, canonical_key_features_text, canonical_sizes_text, column_input,
    serialize_list,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
