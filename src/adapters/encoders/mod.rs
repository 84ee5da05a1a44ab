//! Text encoder adapters.

pub mod adapter;
pub mod hashing;
pub mod remote;

pub use adapter::EncoderAdapter;
pub use hashing::HashingEncoder;
pub use remote::RemoteEncoder;

use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::models::{EncoderConfig, EncoderKind};
use crate::domain::ports::EncoderModel;

/// Build the encoder model selected by `config`.
pub fn model_from_config(config: &EncoderConfig) -> ServiceResult<Arc<dyn EncoderModel>> {
    match config.kind {
        EncoderKind::Hashing => Ok(Arc::new(HashingEncoder::new(&config.model_name, config.dimension))),
        EncoderKind::Remote => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| ServiceError::Config("encoder.url is required for the remote encoder".to_string()))?;
            Ok(Arc::new(RemoteEncoder::new(
                url,
                &config.model_name,
                config.dimension,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
    }
}
