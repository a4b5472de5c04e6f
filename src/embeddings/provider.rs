use serde::Deserialize;

use crate::error::{Result, SubtextError};

/// Embedding gateway. One instance is shared by the index builder and the
/// matcher so every vector in a comparison comes from the same model.
pub enum EmbeddingProvider {
    OpenAI { api_key: String, model: String },
    Gemini { api_key: String, model: String },
    Ollama { endpoint: String, model: String },
}

impl EmbeddingProvider {
    /// Pick a backend from the environment: OpenAI, then Gemini, then the
    /// local Ollama fallback.
    pub fn from_env() -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            return Self::OpenAI {
                api_key: key,
                model: "text-embedding-3-small".to_string(),
            };
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            return Self::Gemini {
                api_key: key,
                model: "text-embedding-004".to_string(),
            };
        }
        Self::Ollama {
            endpoint: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
        }
    }

    /// The fixed model identifier behind this provider.
    pub fn model_id(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Gemini { model, .. } | Self::Ollama { model, .. } => {
                model
            }
        }
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let batch = self.embed_batch(&[text.to_string()]).await?;
        batch
            .into_iter()
            .next()
            .ok_or_else(|| SubtextError::Config("no embedding returned".into()))
    }

    /// Embed a batch of texts, preserving order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::OpenAI { api_key, model } => embed_openai(texts, api_key, model).await,
            Self::Gemini { api_key, model } => embed_gemini(texts, api_key, model).await,
            Self::Ollama { endpoint, model } => embed_ollama(texts, endpoint, model).await,
        }
    }
}

async fn embed_openai(texts: &[String], api_key: &str, model: &str) -> Result<Vec<Vec<f32>>> {
    #[derive(Deserialize)]
    struct EmbeddingResponse {
        data: Vec<EmbeddingData>,
    }

    #[derive(Deserialize)]
    struct EmbeddingData {
        embedding: Vec<f32>,
    }

    let client = reqwest::Client::new();
    let response = client
        .post("https://api.openai.com/v1/embeddings")
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&serde_json::json!({
            "model": model,
            "input": texts,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(SubtextError::Config(format!("OpenAI API error: {}", text)));
    }

    let result: EmbeddingResponse = response.json().await?;
    Ok(result.data.into_iter().map(|d| d.embedding).collect())
}

async fn embed_gemini(texts: &[String], api_key: &str, model: &str) -> Result<Vec<Vec<f32>>> {
    let client = reqwest::Client::new();
    let mut embeddings = Vec::new();

    for text in texts {
        let response = client
            .post(format!(
                "https://generativelanguage.googleapis.com/v1/models/{}:embedContent?key={}",
                model, api_key
            ))
            .json(&serde_json::json!({
                "content": { "parts": [{ "text": text }] }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SubtextError::Config(format!("Gemini API error: {}", text)));
        }

        let result: serde_json::Value = response.json().await?;
        let embedding: Vec<f32> = result
            .get("embedding")
            .and_then(|e| e.get("values"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| SubtextError::Config("invalid Gemini embedding response".into()))?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        embeddings.push(embedding);
    }

    Ok(embeddings)
}

async fn embed_ollama(texts: &[String], endpoint: &str, model: &str) -> Result<Vec<Vec<f32>>> {
    let client = reqwest::Client::new();
    let mut embeddings = Vec::new();

    for text in texts {
        let response = client
            .post(format!("{}/api/embeddings", endpoint))
            .json(&serde_json::json!({
                "model": model,
                "prompt": text,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SubtextError::Config(format!("Ollama API error: {}", text)));
        }

        let result: serde_json::Value = response.json().await?;
        let embedding: Vec<f32> = result
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| SubtextError::Config("invalid Ollama embedding response".into()))?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        embeddings.push(embedding);
    }

    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_reflects_backend() {
        let provider = EmbeddingProvider::Ollama {
            endpoint: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
        };
        assert_eq!(provider.model_id(), "nomic-embed-text");
    }
}
