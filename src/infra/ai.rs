use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::config::AppConfig;

/// Thin client for the generative-language REST API. The service layer owns
/// the prompts; this only ships text out and back.
#[derive(Clone)]
pub struct GenerativeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenerativeClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.ai_base_url.clone(),
            api_key: config.ai_api_key.clone(),
            model: config.ai_model.clone(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload: Value = response.json().await?;
        if !status.is_success() {
            return Err(anyhow!("generation request failed with status {}", status));
        }

        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("generation response carried no text"))?;

        Ok(text.trim().to_string())
    }
}
