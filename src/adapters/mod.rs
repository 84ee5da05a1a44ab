//! Adapters implementing the domain ports.

pub mod backends;
pub mod encoders;
pub mod sqlite;
