//! Structured logging setup (tracing + tracing-subscriber + tracing-appender).

pub mod logger;

pub use logger::LoggerImpl;
