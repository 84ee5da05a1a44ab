use serde::{Deserialize, Serialize};

/// Aggregated liveness payload. Sub-check failures show up as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub model_loaded: bool,
    pub db_connected: bool,
    pub device: String,
    pub encoder: String,
    pub backend: String,
    pub model_id: String,
}

impl HealthReport {
    pub fn is_fully_healthy(&self) -> bool {
        self.model_loaded && self.db_connected
    }
}
