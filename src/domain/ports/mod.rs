//! Port trait definitions (Hexagonal Architecture)
//!
//! - `EncoderModel` / `TextEncoder`: text to vectors
//! - `EmbeddingStore`: vector persistence and nearest-neighbor search
//! - `GenerationBackend`: prompt to text over one wire protocol
//!
//! Services depend only on these traits, so tests can swap in doubles.

pub mod embedding_store;
pub mod generation_backend;
pub mod text_encoder;

pub use embedding_store::EmbeddingStore;
pub use generation_backend::GenerationBackend;
pub use text_encoder::{EncoderModel, TextEncoder};
