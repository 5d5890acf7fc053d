use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::config::{AnalystConfig, ConfigError};
use crate::providers::placeholder_embedding;
use crate::providers::traits::{CompletionProvider, CompletionStream};

/// Hosted chat-completion client for the data analyst. Construction fails
/// with a typed error when the credential is absent; callers must not
/// proceed without a client.
#[derive(Clone)]
pub struct GroqProvider {
    api_key: String,
    system_message: Arc<RwLock<String>>,
    client: Client,
    model: String,
    temperature: f32,
    api_url: String,
}

impl GroqProvider {
    pub fn new(config: &AnalystConfig, system_message: String) -> Result<Self, ConfigError> {
        let api_key = config.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ConfigError::Initialization(e.to_string()))?;

        Ok(Self {
            api_key,
            system_message: Arc::new(RwLock::new(system_message)),
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let system_message = self
            .system_message
            .read()
            .map_err(|e| anyhow!("Failed to read system message: {}", e))?
            .clone();

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
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
                "temperature": self.temperature
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(anyhow!(
                "API request failed: Status {}, Body: {}",
                status,
                error_text
            ));
        }

        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(anyhow!("API returned error: {}", error));
        }

        response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                let debug_json = serde_json::to_string_pretty(&response_json).unwrap_or_default();
                anyhow!("Invalid response format. Response JSON: {}", debug_json)
            })
    }

    async fn complete_streaming(&self, prompt: &str) -> Result<CompletionStream> {
        // The analyst answers in a single round trip; expose the full
        // response as a one-chunk stream.
        let response = self.complete(prompt).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<String, anyhow::Error>(response)
        })))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        // Groq exposes no embeddings endpoint.
        let _ = text;
        Ok(placeholder_embedding(1536))
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
