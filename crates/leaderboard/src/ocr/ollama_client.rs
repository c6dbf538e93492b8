use crate::error::LeaderboardError;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llava:7b";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct OllamaGenerateResponse {
    pub model: String,
    pub response: String,
    pub done: bool,
    #[serde(default)]
    pub total_duration: Option<i64>,
    #[serde(default)]
    pub eval_duration: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModel {
    pub name: String,
    pub size: i64,
    pub digest: String,
    pub modified_at: String,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModelsResponse {
    pub models: Vec<OllamaModel>,
}

/// Client for a vision model served by Ollama
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    default_options: OllamaOptions,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Vision model name (e.g., "llava:7b")
    pub fn new(base_url: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        // Screenshots hold little text; transcribe it verbatim
        let default_options = OllamaOptions {
            temperature: Some(0.0),
            top_p: Some(0.9),
            top_k: Some(40),
            num_predict: Some(1024),
        };

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            default_options,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_json_from_image(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        image_base64: &str,
        custom_options: Option<OllamaOptions>,
    ) -> Result<String> {
        let request = serde_json::json!({
            "model": self.model,
            "prompt": user_prompt,
            "system": system_prompt,
            "stream": false,
            "format": "json",
            "images": [image_base64],
            "options": custom_options.unwrap_or_else(|| self.default_options.clone()),
        });

        tracing::debug!(
            "Sending image to Ollama (model: {}, {} base64 chars)",
            self.model,
            image_base64.len()
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| LeaderboardError::ExtractionError(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LeaderboardError::ExtractionError(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let ollama_response: OllamaGenerateResponse = response.json().await.map_err(|e| {
            LeaderboardError::ExtractionError(format!("Failed to parse Ollama response: {}", e))
        })?;

        if let Some(total) = ollama_response.total_duration {
            tracing::debug!(
                "Ollama recognition complete: {:.2}s total, {} chars output",
                total as f64 / 1_000_000_000.0,
                ollama_response.response.len()
            );
        }

        Ok(ollama_response.response)
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<OllamaModel>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| LeaderboardError::ExtractionError(format!("Failed to list models: {}", e)))?;

        let models_response: OllamaModelsResponse = response.json().await.map_err(|e| {
            LeaderboardError::ExtractionError(format!("Failed to parse models response: {}", e))
        })?;

        Ok(models_response.models)
    }

    /// Check if Ollama service is available
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| LeaderboardError::ExtractionError(format!("Health check failed: {}", e)))?;

        Ok(response.status().is_success())
    }

    /// Verify the configured model is available
    pub async fn verify_model(&self) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.name.starts_with(&self.model)))
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(
            DEFAULT_OLLAMA_URL.to_string(),
            DEFAULT_OLLAMA_MODEL.to_string(),
        )
    }
}
