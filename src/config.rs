use std::path::PathBuf;

use crate::error::Result;
use crate::provider::{self, ResolvedProvider};

/// Library file name looked for in the working directory and the user config
/// dir when no explicit path is given.
pub const LIBRARY_FILE: &str = "library.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the curated library lives
    pub library_path: PathBuf,
    /// Resolved generation backend
    pub llm: ResolvedProvider,
    pub temperature: f32,
    pub threshold: f32,
    pub daily_limit: u32,
}

impl Config {
    pub fn load(
        provider_override: Option<&str>,
        model_override: Option<String>,
        library_override: Option<PathBuf>,
        temperature: f32,
        threshold: f32,
        daily_limit: u32,
    ) -> Result<Self> {
        let env_endpoint = std::env::var("SUBTEXT_LLM_ENDPOINT").ok();
        let env_model = model_override.or_else(|| std::env::var("SUBTEXT_LLM_MODEL").ok());

        let llm = provider::resolve_provider(provider_override, env_endpoint, env_model)?;

        Ok(Config {
            library_path: resolve_library_path(library_override),
            llm,
            temperature,
            threshold,
            daily_limit,
        })
    }
}

/// Resolve the library file: explicit flag > SUBTEXT_LIBRARY env > ./library.json
/// > <config dir>/subtext/library.json. The last candidate is returned even if
/// nothing exists; the loader degrades to an empty library with a diagnostic.
pub fn resolve_library_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if let Ok(path) = std::env::var("SUBTEXT_LIBRARY") {
        return PathBuf::from(path);
    }

    let cwd_candidate = PathBuf::from(LIBRARY_FILE);
    if cwd_candidate.exists() {
        return cwd_candidate;
    }

    dirs::config_dir()
        .map(|dir| dir.join("subtext").join(LIBRARY_FILE))
        .unwrap_or(cwd_candidate)
}
