use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};

use crate::config::AssistantConfig;
use crate::providers::traits::{CompletionProvider, CompletionStream};

/// Chat and embeddings against a local Ollama server. The chat model and
/// the embedding model are separate; the documentation assistant uses
/// `gpt-oss:latest` for answers and `snowflake-arctic-embed2` for indexing.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    system_message: Arc<RwLock<String>>,
    client: Client,
    model: String,
    embedding_model: String,
    embedding_dimensions: usize,
}

impl OllamaProvider {
    pub fn new(config: &AssistantConfig, system_message: String) -> Self {
        Self {
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            system_message: Arc::new(RwLock::new(system_message)),
            client: Client::new(),
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            embedding_dimensions: config.embedding_dimensions,
        }
    }

    fn chat_body(&self, prompt: &str, stream: bool) -> Result<Value> {
        let system_message = self
            .system_message
            .read()
            .map_err(|e| anyhow!("Failed to read system message: {}", e))?
            .clone();

        Ok(json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": system_message
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "stream": stream
        }))
    }

    async fn send_chat(&self, prompt: &str, stream: bool) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&self.chat_body(prompt, stream)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "Ollama request failed: Status {}, Body: {}",
                status,
                error_text
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self.send_chat(prompt, false).await?;
        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(anyhow!("Ollama returned error: {}", error));
        }

        response_json
            .get("message")
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                let debug_json = serde_json::to_string_pretty(&response_json).unwrap_or_default();
                anyhow!("Invalid response format. Response JSON: {}", debug_json)
            })
    }

    async fn complete_streaming(&self, prompt: &str) -> Result<CompletionStream> {
        let response = self.send_chat(prompt, true).await?;

        // Ollama streams newline-delimited JSON objects; each carries one
        // content fragment and the final one sets "done".
        let (tx, rx) = tokio::sync::mpsc::channel::<Result<String>>(32);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(e.into())).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();
                    if line.is_empty() {
                        continue;
                    }

                    let value: Value = match serde_json::from_str(&line) {
                        Ok(value) => value,
                        Err(e) => {
                            let _ = tx.send(Err(anyhow!("Invalid stream payload: {}", e))).await;
                            return;
                        }
                    };

                    if let Some(error) = value.get("error") {
                        let _ = tx.send(Err(anyhow!("Ollama returned error: {}", error))).await;
                        return;
                    }

                    let content = value
                        .get("message")
                        .and_then(|message| message.get("content"))
                        .and_then(|content| content.as_str())
                        .unwrap_or_default();
                    if !content.is_empty() && tx.send(Ok(content.to_string())).await.is_err() {
                        return;
                    }

                    if value.get("done").and_then(|d| d.as_bool()).unwrap_or(false) {
                        return;
                    }
                }
            }
        });

        Ok(Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&json!({
                "model": self.embedding_model,
                "input": text
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "Embedding request failed: Status {}, Body: {}",
                status,
                error_text
            ));
        }

        let response_json: Value = response.json().await?;
        let embedding: Vec<f32> = response_json
            .get("embeddings")
            .and_then(|e| e.get(0))
            .and_then(|e| e.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect()
            })
            .ok_or_else(|| anyhow!("No embedding returned from Ollama"))?;

        if embedding.len() != self.embedding_dimensions {
            return Err(anyhow!(
                "Generated embedding has wrong size: {} (expected {})",
                embedding.len(),
                self.embedding_dimensions
            ));
        }

        Ok(embedding)
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(self.model.clone())
    }

    fn get_system_message(&self) -> String {
        self.system_message.read().unwrap().clone()
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider> {
        Box::new(self.clone())
    }
}
