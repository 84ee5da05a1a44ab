//! SQLite database adapters for tutorgate.

pub mod connection;
pub mod embedding_store;
pub mod migrations;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use embedding_store::SqliteEmbeddingStore;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
