//! Deterministic lexical relatedness.
//!
//! Baseline [`RelatednessScorer`]: texts are embedded by feature hashing
//! their tokens with `blake3`, then compared by cosine similarity. It is
//! not a neural model; it only rewards shared surface tokens, but it is
//! offline and stable across runs.

use blake3::Hasher;

use crate::collaborators::RelatednessScorer;
use crate::error::CollaboratorError;

/// Default embedding dimensionality.
pub const DEFAULT_EMBEDDING_DIM: usize = 64;

fn tokenize(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Deterministic hashed bag-of-words embedding, L2-normalized.
#[must_use]
pub fn lexical_embedding(text: &str, dim: usize) -> Vec<f32> {
    if dim == 0 {
        return Vec::new();
    }

    let mut vec = vec![0.0f32; dim];
    let mut count = 0u32;

    for token in tokenize(&text.to_lowercase()) {
        let mut h = Hasher::new();
        h.update(token.as_bytes());
        let hash = h.finalize();
        let bytes = hash.as_bytes();

        let mut bucket = [0u8; 8];
        bucket.copy_from_slice(&bytes[..8]);
        #[allow(clippy::cast_possible_truncation)]
        let idx = (u64::from_le_bytes(bucket) % dim as u64) as usize;
        let sign = if (bytes[8] & 1) == 0 { 1.0f32 } else { -1.0f32 };
        vec[idx] += sign;
        count = count.saturating_add(1);
    }

    if count == 0 {
        return vec;
    }

    let norm2: f64 = vec.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    if norm2 > 0.0 {
        #[allow(clippy::cast_possible_truncation)]
        let inv = norm2.sqrt().recip() as f32;
        for x in &mut vec {
            *x *= inv;
        }
    }

    vec
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let xf = f64::from(x);
        let yf = f64::from(y);
        dot += xf * yf;
        norm_a += xf * xf;
        norm_b += yf * yf;
    }

    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_finite() {
        sim
    } else {
        0.0
    }
}

/// Cosine similarity of hashed lexical embeddings.
#[derive(Debug, Clone, Copy)]
pub struct LexicalRelatedness {
    dim: usize,
}

impl LexicalRelatedness {
    /// Creates a scorer with the given embedding dimension.
    #[must_use]
    pub const fn with_dim(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for LexicalRelatedness {
    fn default() -> Self {
        Self::with_dim(DEFAULT_EMBEDDING_DIM)
    }
}

impl RelatednessScorer for LexicalRelatedness {
    fn relatedness(&self, question: &str, property: &str) -> Result<f64, CollaboratorError> {
        if self.dim == 0 {
            return Err(CollaboratorError::Relatedness(
                "embedding dimension must be positive".to_string(),
            ));
        }
        let q = lexical_embedding(question, self.dim);
        let p = lexical_embedding(property, self.dim);
        Ok(cosine_similarity(&q, &p))
    }
}
