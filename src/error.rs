use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model returned empty response")]
    EmptyResponse,

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SubtextError>;
