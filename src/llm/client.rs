use crate::error::{Result, SubtextError};
use crate::provider::{Provider, ResolvedProvider};

/// Multi-provider generation gateway.
pub struct LlmClient {
    provider: Provider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(resolved: &ResolvedProvider, temperature: f32) -> Self {
        Self {
            provider: resolved.provider,
            endpoint: resolved.endpoint.clone(),
            model: resolved.model.clone(),
            api_key: resolved.api_key.clone(),
            temperature,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One generation call: fixed behavioral instructions, the grounding
    /// directive from the hint composer, and the (already truncated) user
    /// statement. Returns the generated text.
    pub async fn complete(&self, system: &str, directive: &str, user: &str) -> Result<String> {
        match self.provider {
            Provider::Anthropic => self.complete_anthropic(system, directive, user).await,
            Provider::OpenAI | Provider::Ollama => {
                self.complete_openai_compat(system, directive, user).await
            }
        }
    }

    /// Anthropic Messages API. The directive rides in the system block since
    /// the API takes a single system string.
    async fn complete_anthropic(
        &self,
        system: &str,
        directive: &str,
        user: &str,
    ) -> Result<String> {
        let url = format!("{}/v1/messages", self.endpoint);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "system": format!("{}\n\n{}", system, directive),
            "messages": [
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
        });

        let mut req = self.client.post(&url).json(&body);

        if let Some(ref key) = self.api_key {
            req = req
                .header("x-api-key", key)
                .header("anthropic-version", "2023-06-01");
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SubtextError::Config(format!(
                "model returned {}: {}",
                status, text
            )));
        }

        let json: serde_json::Value = response.json().await?;

        json.get("content")
            .and_then(|c| c.get(0))
            .and_then(|b| b.get("text"))
            .and_then(|t| t.as_str())
            .map(|s| s.to_string())
            .ok_or(SubtextError::EmptyResponse)
    }

    /// OpenAI-compatible chat API (OpenAI, Ollama). The directive is a second
    /// system message, mirroring how the grounding context is kept apart from
    /// the behavioral instructions.
    async fn complete_openai_compat(
        &self,
        system: &str,
        directive: &str,
        user: &str,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "system", "content": directive },
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
            "max_tokens": 1024,
        });

        let mut req = self.client.post(&url).json(&body);

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SubtextError::Config(format!(
                "model returned {}: {}",
                status, text
            )));
        }

        let json: serde_json::Value = response.json().await?;

        json.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or(SubtextError::EmptyResponse)
    }
}
