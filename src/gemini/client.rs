//! Thin HTTP client for Gemini image generation.
//!
//! `generate` posts the uploaded image plus an icon instruction to
//! `{base_url}/models/{model}:generateContent` and returns the base64 PNG from
//! the first inline image part of the answer.
use reqwest::Client;

use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::generation::IconGenerator;
use crate::prompt::constructor::PromptConstructor;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    prompts: PromptConstructor,
}

impl GeminiClient {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        GeminiClient {
            client: Client::new(),
            base_url: base,
            model,
            api_key,
            prompts: PromptConstructor::default(),
        }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = Self::new(config.gemini_url.clone(), config.gemini_model.clone(), config.gemini_api_key.clone());
        match &config.prompt_template {
            Some(t) => Ok(client.with_prompts(PromptConstructor::new(t.clone())?)),
            None => Ok(client),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptConstructor) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Turn an HTTP status and body into either the image payload or a
    /// human-readable failure.
    fn interpret(status: reqwest::StatusCode, body: &str) -> AppResult<String> {
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(body)
                .map(|e| e.error.message)
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Image generation failed with status {}", status));
            tracing::error!(%status, "Gemini returned an error: {}", message);
            return Err(AppError::Generation(message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
            tracing::error!("Malformed Gemini response: {}", e);
            AppError::Generation(format!("Malformed response from image service: {}", e))
        })?;

        if let Some(image) = parsed.first_image() {
            if image.data.is_empty() {
                return Err(AppError::Generation("Image service returned an empty image.".to_string()));
            }
            return Ok(image.data.clone());
        }
        if let Some(reason) = parsed.block_reason() {
            return Err(AppError::Generation(format!("Request was blocked by the image service ({}).", reason)));
        }
        let text = parsed.text();
        if text.is_empty() {
            Err(AppError::Generation("No image was returned by the image service.".to_string()))
        } else {
            Err(AppError::Generation(format!("No image was returned by the image service: {}", text)))
        }
    }
}

impl IconGenerator for GeminiClient {
    async fn generate(&self, base64_data: &str, mime_type: &str, prompt_text: &str) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Generation("GEMINI_API_KEY is not set.".to_string()))?;
        if base64_data.is_empty() {
            return Err(AppError::Generation("No image data to send.".to_string()));
        }

        let instruction = self.prompts.icon_instruction(prompt_text)?;
        let body = GenerateContentRequest::image_edit(base64_data, mime_type, &instruction);
        let url = self.endpoint();
        tracing::info!("Sending icon request to Gemini at URL: {}", url);
        tracing::debug!(payload_len = base64_data.len(), mime = %mime_type, "Gemini request payload");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("HTTP request to Gemini failed: {}", e);
                AppError::Generation(format!("Could not reach the image service: {}", e))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to read image service response: {}", e)))?;
        Self::interpret(status, &text)
    }
}
