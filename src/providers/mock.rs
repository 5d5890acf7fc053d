use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::providers::traits::{CompletionProvider, CompletionStream};

/// Scriptable provider for shell and wrapper tests. Call counters are
/// shared across clones so tests can keep a handle after moving a clone
/// into the component under test.
#[derive(Clone, Default)]
pub(crate) struct MockProvider {
    pub reply: String,
    pub chunks: Vec<String>,
    pub fail: bool,
    pub complete_calls: Arc<AtomicUsize>,
    pub stream_calls: Arc<AtomicUsize>,
    pub embed_calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn with_chunks(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst) + self.stream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("mock completion failure"));
        }
        Ok(self.reply.clone())
    }

    async fn complete_streaming(&self, _prompt: &str) -> Result<CompletionStream> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("mock streaming failure"));
        }
        let chunks = self.chunks.clone();
        Ok(Box::pin(futures::stream::iter(
            chunks.into_iter().map(Ok::<String, anyhow::Error>),
        )))
    }

    async fn generate_embedding(&self, _text: &str) -> Result<Vec<f32>> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0.0; 8])
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok("mock".to_string())
    }

    fn get_system_message(&self) -> String {
        String::new()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider> {
        Box::new(self.clone())
    }
}
