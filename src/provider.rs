use std::fmt;

use colored::Colorize;

use crate::error::{Result, SubtextError};

/// Text-generation backends the gateway can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
    Ollama,
}

impl Provider {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-5-20250929",
            Provider::OpenAI => "gpt-4.1-mini",
            Provider::Ollama => "gemma3:4b",
        }
    }

    pub fn requires_auth(&self) -> bool {
        match self {
            Provider::Anthropic | Provider::OpenAI => true,
            Provider::Ollama => false,
        }
    }

    pub fn env_var_name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Ollama => "",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic (Claude)",
            Provider::OpenAI => "OpenAI",
            Provider::Ollama => "Ollama (local)",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Provider> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Provider::Anthropic),
            "openai" | "gpt" => Some(Provider::OpenAI),
            "ollama" | "local" => Some(Provider::Ollama),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::OpenAI => write!(f, "openai"),
            Provider::Ollama => write!(f, "ollama"),
        }
    }
}

/// A fully resolved generation backend. `api_key` may be absent for a cloud
/// provider: that is reported once at startup, the interaction still runs and
/// the failed call is surfaced as visible text.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub provider: Provider,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Resolve the generation provider: explicit CLI arg > env-var detection >
/// local Ollama fallback.
pub fn resolve_provider(
    explicit: Option<&str>,
    env_endpoint: Option<String>,
    env_model: Option<String>,
) -> Result<ResolvedProvider> {
    let provider = match explicit {
        Some(name) => Provider::from_str_loose(name).ok_or_else(|| {
            SubtextError::Config(format!(
                "Unknown provider: {}. Use: anthropic, openai, ollama",
                name
            ))
        })?,
        None => detect_from_env().unwrap_or(Provider::Ollama),
    };

    let api_key = if provider.env_var_name().is_empty() {
        None
    } else {
        std::env::var(provider.env_var_name()).ok()
    };

    if provider.requires_auth() && api_key.is_none() {
        eprintln!(
            "{} No API key found for {}. Set {} before generating; calls will fail until then.",
            "Warning:".yellow(),
            provider.display_name(),
            provider.env_var_name()
        );
    }

    let endpoint = env_endpoint.unwrap_or_else(|| provider.default_endpoint().to_string());
    let model = env_model.unwrap_or_else(|| provider.default_model().to_string());

    Ok(ResolvedProvider {
        provider,
        endpoint,
        model,
        api_key,
    })
}

fn detect_from_env() -> Option<Provider> {
    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        return Some(Provider::Anthropic);
    }
    if std::env::var("OPENAI_API_KEY").is_ok() {
        return Some(Provider::OpenAI);
    }
    None
}
