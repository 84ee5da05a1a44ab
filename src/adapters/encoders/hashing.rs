//! Deterministic feature-hashing encoder.
//!
//! Lowercased word tokens and their character trigrams are hashed into a
//! fixed number of signed buckets. Texts sharing vocabulary land close to each
//! other, which is enough for development and tests without model weights.

use async_trait::async_trait;

use crate::domain::errors::ServiceResult;
use crate::domain::ports::EncoderModel;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

pub struct HashingEncoder {
    model_name: String,
    dimension: usize,
}

impl HashingEncoder {
    pub fn new(model_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_name: model_name.into(),
            dimension: dimension.max(1),
        }
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }

    /// Raw (unnormalized) feature vector for one text.
    pub fn encode_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        let lowered = text.to_lowercase();

        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            self.add_feature(&mut vector, token.as_bytes(), 1.0);

            let padded: Vec<char> = format!("#{token}#").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, trigram.as_bytes(), 0.5);
            }
        }

        vector
    }
}

#[async_trait]
impl EncoderModel for HashingEncoder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, texts: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.encode_one(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::EmbeddingVector;
    use proptest::prelude::*;

    fn distance(a: &[f32], b: &[f32]) -> f32 {
        let a = EmbeddingVector::normalized(a.to_vec());
        let b = EmbeddingVector::normalized(b.to_vec());
        a.euclidean_distance(b.as_slice()).unwrap()
    }

    #[test]
    fn test_same_text_same_vector() {
        let encoder = HashingEncoder::new("hash", 64);
        assert_eq!(encoder.encode_one("Pythagorean theorem"), encoder.encode_one("pythagorean THEOREM"));
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let encoder = HashingEncoder::new("hash", 256);
        let query = encoder.encode_one("area of a right triangle");
        let related = encoder.encode_one("right triangle area formula");
        let unrelated = encoder.encode_one("photosynthesis in green plants");

        assert!(distance(&query, &related) < distance(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_encode_batch_preserves_order() {
        let encoder = HashingEncoder::new("hash", 32);
        let texts = vec!["one".to_string(), "two".to_string()];
        let out = encoder.encode(&texts).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], encoder.encode_one("one"));
        assert_eq!(out[1], encoder.encode_one("two"));
    }

    proptest! {
        #[test]
        fn prop_output_has_configured_dimension(text in ".{0,64}", dim in 1usize..512) {
            let encoder = HashingEncoder::new("hash", dim);
            prop_assert_eq!(encoder.encode_one(&text).len(), dim);
        }
    }
}
