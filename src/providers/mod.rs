pub mod groq;
pub mod ollama;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

/// Embedding stand-in for providers without an embeddings endpoint. The
/// data analyst never runs a vector search, so only the shape matters.
pub fn placeholder_embedding(dimensions: usize) -> Vec<f32> {
    vec![0.0; dimensions]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_embedding_has_requested_shape() {
        let embedding = placeholder_embedding(1536);
        assert_eq!(embedding.len(), 1536);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
