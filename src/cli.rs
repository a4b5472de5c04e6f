use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::matcher::DEFAULT_THRESHOLD;
use crate::session::DAILY_LIMIT;

#[derive(Parser)]
#[command(
    name = "subtext",
    about = "Surface the assumptions and values beneath strongly held views",
    version
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(global = true, long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Unpack a single statement into a reflective response
    Unpack {
        /// The statement, judgment, or belief to unpack
        statement: String,

        /// Path to the library file
        #[arg(long)]
        library: Option<PathBuf>,

        /// Generation provider override (anthropic, openai, ollama)
        #[arg(long)]
        provider: Option<String>,

        /// Generation model override
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature for generation
        #[arg(long, default_value_t = 0.2)]
        temperature: f32,

        /// Minimum cosine similarity to accept a library match
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,
    },

    /// Interactive session: statements in, reflections out
    Session {
        /// Path to the library file
        #[arg(long)]
        library: Option<PathBuf>,

        /// Generation provider override (anthropic, openai, ollama)
        #[arg(long)]
        provider: Option<String>,

        /// Generation model override
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature for generation
        #[arg(long, default_value_t = 0.2)]
        temperature: f32,

        /// Minimum cosine similarity to accept a library match
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Requests allowed per day in this session
        #[arg(long, default_value_t = DAILY_LIMIT)]
        daily_limit: u32,
    },

    /// Inspect the library file: sections, counts, parse diagnostics
    Library {
        /// Path to the library file
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// Build the embedding index and print its stats
    Index {
        /// Path to the library file
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// Show the best library match for a query without generating
    Match {
        /// Query text to match against the library
        query: String,

        /// Path to the library file
        #[arg(long)]
        library: Option<PathBuf>,

        /// Minimum cosine similarity to accept a library match
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,
    },
}
