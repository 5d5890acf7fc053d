use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Ordered fragments of a completion. Chunks are appended in arrival order;
/// nothing is buffered or reordered.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    async fn complete_streaming(&self, prompt: &str) -> Result<CompletionStream>;

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>>;

    async fn get_model_info(&self) -> Result<String>;

    fn get_system_message(&self) -> String;

    fn clone_box(&self) -> Box<dyn CompletionProvider>;
}

impl Clone for Box<dyn CompletionProvider> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
