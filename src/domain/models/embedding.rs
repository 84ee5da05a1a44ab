//! Embedding and similarity search domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed-length embedding vector.
///
/// Immutable once produced. Vectors returned by the encoder adapter are
/// L2-normalized; [`EmbeddingVector::normalized`] enforces that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// Wrap raw values without normalizing them (e.g. a caller-supplied query).
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Wrap raw values and scale them to unit length.
    ///
    /// A zero vector becomes the uniform unit vector so the result is always
    /// usable for distance computations.
    pub fn normalized(mut values: Vec<f32>) -> Self {
        // f64 accumulator avoids drift over ~1k dimensions
        let magnitude = values
            .iter()
            .map(|x| f64::from(*x) * f64::from(*x))
            .sum::<f64>()
            .sqrt();

        if magnitude > 1e-10 {
            for val in &mut values {
                *val = (f64::from(*val) / magnitude) as f32;
            }
        } else if !values.is_empty() {
            let uniform = 1.0 / (values.len() as f32).sqrt();
            values.iter_mut().for_each(|v| *v = uniform);
        }

        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// L2 norm of the vector.
    pub fn magnitude(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Euclidean distance to `other`, or `None` when dimensions differ.
    pub fn euclidean_distance(&self, other: &[f32]) -> Option<f32> {
        if self.0.len() != other.len() {
            return None;
        }

        let sum: f32 = self
            .0
            .iter()
            .zip(other)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Some(sum.sqrt())
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Little-endian byte encoding used for BLOB storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Decode a BLOB written by [`EmbeddingVector::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() % 4 != 0 {
            return None;
        }

        Some(Self(
            bytes
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        ))
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// A row of the embeddings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEmbedding {
    pub id: i64,
    pub model_name: String,
    pub source: String,
    pub ref_id: Option<i64>,
    pub content: String,
    pub embedding: EmbeddingVector,
    pub created_at: DateTime<Utc>,
}

/// Content to insert into the store together with its vector.
#[derive(Debug, Clone)]
pub struct NewEmbedding {
    pub content: String,
    pub embedding: EmbeddingVector,
    pub model_name: String,
    pub source: String,
    pub ref_id: Option<i64>,
}

/// One nearest-neighbor hit. Smaller distance means more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub content: String,
    pub ref_id: Option<i64>,
    pub distance: f32,
}
