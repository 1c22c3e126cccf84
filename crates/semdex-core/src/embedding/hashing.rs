//! Token-hashing embedder.
//!
//! Lowercases the text, splits on whitespace, and counts each token into one
//! of `D` buckets chosen by a stable FNV-1a hash. The histogram is then
//! L2-normalised. Fully deterministic and dependency-free, so it doubles as
//! the fallback when a learned model is unavailable.
//!
//! Lowercasing goes beyond plain whitespace tokenisation, which hashes tokens
//! verbatim. Vectors produced by a case-preserving hasher of the same
//! dimension differ from these for mixed-case text and must be re-indexed.

use semdex_types::error::EmbeddingError;

use super::embedder::Embedder;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-tokens embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub const MODEL_NAME: &'static str = "token-hash";

    /// Create an embedder producing vectors of `dimension` floats.
    ///
    /// A dimension of zero is raised to one.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Embed a single text.
    ///
    /// Empty or whitespace-only text yields the all-zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let bucket = (fnv1a_64(token.as_bytes()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        l2_normalize(&mut vector);
        vector
    }
}

impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_name(&self) -> &str {
        Self::MODEL_NAME
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Scale `vector` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector
        .iter()
        .map(|v| f64::from(*v) * f64::from(*v))
        .sum::<f64>()
        .sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v = (f64::from(*v) / norm) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a_64(b""), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a_64(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_output_has_configured_dimension() {
        let embedder = HashingEmbedder::new(64);
        for text in ["", "one", "a much longer sentence with several tokens"] {
            assert_eq!(embedder.embed_text(text).len(), 64);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = HashingEmbedder::new(384).embed_text("hotel booking confirmation");
        let b = HashingEmbedder::new(384).embed_text("hotel booking confirmation");
        let a_bits: Vec<u32> = a.iter().map(|f| f.to_bits()).collect();
        let b_bits: Vec<u32> = b.iter().map(|f| f.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(16).embed_text("   \n\t ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_non_empty_text_is_unit_length() {
        let v = HashingEmbedder::new(384).embed_text("flight boarding pass");
        assert!((norm(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_case_and_spacing_insensitive() {
        let embedder = HashingEmbedder::new(128);
        assert_eq!(
            embedder.embed_text("Hotel  Booking"),
            embedder.embed_text("hotel booking")
        );
    }

    #[test]
    fn test_repeated_tokens_accumulate() {
        let embedder = HashingEmbedder::new(384);
        let single = embedder.embed_text("hotel");
        let repeated = embedder.embed_text("hotel hotel");
        // Same single bucket, normalised to the same unit vector.
        assert_eq!(single, repeated);
    }

    #[test]
    fn test_zero_dimension_raised_to_one() {
        let embedder = HashingEmbedder::new(0);
        assert_eq!(embedder.dimension(), 1);
        assert_eq!(embedder.embed_text("anything"), vec![1.0]);
    }

    #[tokio::test]
    async fn test_batch_embed_matches_single() {
        let embedder = HashingEmbedder::new(32);
        let texts = vec!["alpha beta".to_string(), String::new()];
        let out = embedder.embed(&texts).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], embedder.embed_text("alpha beta"));
        assert_eq!(out[1], vec![0.0; 32]);
    }
}
