use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::database::vector_db::VectorDB;
use crate::providers::traits::CompletionProvider;

/// An indexed collection of document text, queryable by semantic
/// similarity. `load` is the non-destructive reload hook the shells call
/// before every query.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    async fn load(&self, recreate: bool) -> Result<()>;

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<String>>;
}

/// Knowledge base fed from remote documents at fixed URLs, chunked and
/// embedded into a Qdrant collection.
pub struct UrlKnowledge {
    urls: Vec<String>,
    vector_db: VectorDB,
    embedder: Box<dyn CompletionProvider>,
    collection: String,
    vector_size: u64,
    chunk_words: usize,
    http: Client,
}

impl UrlKnowledge {
    pub fn new(
        urls: Vec<String>,
        vector_db: VectorDB,
        embedder: Box<dyn CompletionProvider>,
        collection: String,
        vector_size: u64,
    ) -> Self {
        Self {
            urls,
            vector_db,
            embedder,
            collection,
            vector_size,
            chunk_words: 400,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl KnowledgeSource for UrlKnowledge {
    async fn load(&self, recreate: bool) -> Result<()> {
        if recreate {
            self.vector_db.delete_collection(&self.collection).await?;
        } else if self.vector_db.collection_size(&self.collection).await? > 0 {
            log::debug!(
                "Knowledge collection {} already populated, skipping reload",
                self.collection
            );
            return Ok(());
        }

        self.vector_db
            .create_collection(&self.collection, self.vector_size)
            .await?;

        for url in &self.urls {
            let body = self
                .http
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;

            let chunks = chunk_words(&body, self.chunk_words);
            log::info!("Indexing {} chunks from {}", chunks.len(), url);

            for chunk in chunks {
                let embedding = self.embedder.generate_embedding(&chunk).await?;
                self.vector_db
                    .store_chunk(&self.collection, embedding, &chunk, url)
                    .await?;
            }
        }

        Ok(())
    }

    async fn search(&self, query: &str, limit: u64) -> Result<Vec<String>> {
        let embedding = self.embedder.generate_embedding(query).await?;
        let hits = self
            .vector_db
            .search_chunks(&self.collection, embedding, limit)
            .await?;
        Ok(hits.into_iter().map(|chunk| chunk.text).collect())
    }
}

/// Fixed-size word windows; the embedder has a bounded input length and
/// whole words keep the windows readable when echoed back as context.
pub(crate) fn chunk_words(text: &str, chunk_size: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        start = end;
    }

    chunks
}


#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory knowledge source recording how often it was touched.
    #[derive(Default)]
    pub(crate) struct MockKnowledge {
        pub passages: Vec<String>,
        pub fail_load: bool,
        pub load_calls: AtomicUsize,
        pub search_calls: AtomicUsize,
    }

    impl MockKnowledge {
        pub fn with_passages(passages: &[&str]) -> Self {
            Self {
                passages: passages.iter().map(|p| p.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail_load: true,
                ..Self::default()
            }
        }

        pub fn load_count(&self) -> usize {
            self.load_calls.load(Ordering::SeqCst)
        }

        pub fn search_count(&self) -> usize {
            self.search_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KnowledgeSource for MockKnowledge {
        async fn load(&self, _recreate: bool) -> Result<()> {
            self.load_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_load {
                anyhow::bail!("knowledge backend offline");
            }
            Ok(())
        }

        async fn search(&self, _query: &str, limit: u64) -> Result<Vec<String>> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .passages
                .iter()
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }
}
