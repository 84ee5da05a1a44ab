use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Tutorgate
///
/// Read once at startup and immutable for the lifetime of the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Vector store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Text encoder configuration
    #[serde(default)]
    pub encoder: EncoderConfig,

    /// Generation backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Retrieval defaults
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on a single HTTP request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// `SQLite` database URL (e.g. "sqlite:data/tutorgate.db" or "sqlite::memory:")
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Minimum number of pooled connections kept open
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum number of concurrent connection checkouts
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a caller may wait for a free connection, in milliseconds
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

fn default_database_url() -> String {
    "sqlite:.tutorgate/tutorgate.db".to_string()
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_acquire_timeout_ms() -> u64 {
    5_000
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

/// Which encoder model backs the text encoder adapter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EncoderKind {
    /// Deterministic in-process feature hashing encoder
    Hashing,
    /// External embedding service speaking `POST /embed`
    Remote,
}

/// Text encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EncoderConfig {
    #[serde(default = "default_encoder_kind")]
    pub kind: EncoderKind,

    /// Model name recorded alongside stored embeddings
    #[serde(default = "default_encoder_model_name")]
    pub model_name: String,

    /// Fixed output dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Base URL of the embedding service (remote only)
    #[serde(default)]
    pub url: Option<String>,

    /// Device label reported by the health endpoint
    #[serde(default = "default_device")]
    pub device: String,

    #[serde(default = "default_encoder_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_encoder_kind() -> EncoderKind {
    EncoderKind::Hashing
}

fn default_encoder_model_name() -> String {
    "BGE-m3".to_string()
}

const fn default_dimension() -> usize {
    1024
}

fn default_device() -> String {
    "cpu".to_string()
}

const fn default_encoder_timeout_secs() -> u64 {
    30
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            kind: default_encoder_kind(),
            model_name: default_encoder_model_name(),
            dimension: default_dimension(),
            url: None,
            device: default_device(),
            timeout_secs: default_encoder_timeout_secs(),
        }
    }
}

/// Generation backend variants, selected once at startup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Deterministic fixed payloads
    Mock,
    /// `POST {base}/generate` with a flat `{prompt, ...}` body
    Vllm,
    /// `POST {base}/generate` with `{inputs, parameters}`
    Tgi,
    /// OpenAI-style `POST {base}/chat/completions`
    Openai,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Vllm => "vllm",
            Self::Tgi => "tgi",
            Self::Openai => "openai",
        }
    }

    /// Whether this backend talks to a remote server
    pub fn is_remote(self) -> bool {
        !matches!(self, Self::Mock)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    #[serde(default = "default_backend_kind")]
    pub kind: BackendKind,

    /// Base URL of the remote backend (vllm/tgi required, openai optional)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer credential for the chat-compatible backend
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name sent to the chat-compatible backend
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Identifier echoed in every generation response
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Stop sequences used when a request does not supply its own
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,

    /// Outbound request timeout in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of generations allowed to run at once (1 = fully serialized)
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

const fn default_backend_kind() -> BackendKind {
    BackendKind::Mock
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_model_id() -> String {
    "gecko-7b".to_string()
}

fn default_stop() -> Vec<String> {
    vec!["```".to_string()]
}

const fn default_backend_timeout_secs() -> u64 {
    60
}

const fn default_max_in_flight() -> usize {
    1
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            base_url: None,
            api_key: None,
            chat_model: default_chat_model(),
            model_id: default_model_id(),
            stop: default_stop(),
            timeout_secs: default_backend_timeout_secs(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Retrieval defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetrievalConfig {
    /// `top_k` used when a request omits it
    #[serde(default = "default_top_k")]
    pub default_top_k: i64,
}

const fn default_top_k() -> i64 {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Also log to stderr when a log directory is set
    #[serde(default = "default_true")]
    pub enable_console: bool,

    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_console: true,
            rotation: RotationPolicy::default(),
        }
    }
}
