use crate::config::LlmConfig;
use crate::models::*;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

pub struct GeminiService {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_output_tokens: Option<u32>,
}

impl GeminiService {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub async fn generate_response(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent::user_text(prompt)],
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            }),
        };

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Gemini API error {}: {}", status, error_text));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        match gemini_response.first_text() {
            Some(text) => Ok(text),
            None => match gemini_response.block_reason() {
                Some(reason) => Err(anyhow!("Gemini blocked the prompt: {}", reason)),
                None => Ok(String::new()),
            },
        }
    }
}

#[async_trait]
impl CompletionProvider for GeminiService {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.generate_response(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
