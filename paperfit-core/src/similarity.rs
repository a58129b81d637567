//! Cosine similarity between two embedding vectors.

/// Compute the cosine similarity between two vectors.
///
/// Accumulates in `f64` so that 1024-dimension `f32` embeddings do not lose
/// precision. The result lies in `[-1.0, 1.0]`. A zero vector yields NaN;
/// callers receive whatever the division produces.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
