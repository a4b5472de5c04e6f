use std::sync::Arc;

use colored::Colorize;

use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::error::{Result, SubtextError};
use crate::hint;
use crate::index::{IndexCache, LibraryIndex};
use crate::library::{Library, LoadedLibrary};
use crate::llm::prompts::SYSTEM_REFLECTOR;
use crate::llm::LlmClient;
use crate::matcher;
use crate::session::{truncate_input, UsageGuard};

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SubtextError::Config(format!("tokio runtime: {}", e)))
}

pub(crate) fn report_diagnostics(loaded: &LoadedLibrary) {
    for diagnostic in &loaded.diagnostics {
        eprintln!("{} {}", "Library:".yellow(), diagnostic);
    }
}

/// One-shot interaction: match, compose hint, generate, print.
pub fn cmd_unpack(config: &Config, statement: &str, verbose: bool) -> Result<()> {
    let mut usage = UsageGuard::new(config.daily_limit);
    let cache = IndexCache::new();

    let loaded = Library::load(&config.library_path);
    report_diagnostics(&loaded);
    let library = Arc::new(loaded.library);

    run_interaction(config, &mut usage, &cache, &library, statement, verbose)
}

/// Interactive loop over statements. `reset` clears the usage counter,
/// drops the cached index and reloads the library; an empty line exits.
pub fn cmd_session(config: &Config, verbose: bool) -> Result<()> {
    use dialoguer::{theme::ColorfulTheme, Input};

    let mut usage = UsageGuard::new(config.daily_limit);
    let cache = IndexCache::new();

    let loaded = Library::load(&config.library_path);
    report_diagnostics(&loaded);
    let mut library = Arc::new(loaded.library);

    println!(
        "{} {} entries, {} principles loaded. Type a statement to unpack; 'reset' clears the session; an empty line exits.",
        "Session:".green().bold(),
        library.entries.len(),
        library.general_principles.len()
    );

    loop {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Statement")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| SubtextError::Config(format!("prompt input: {}", e)))?;

        match line.trim() {
            "" | "exit" | "quit" => break,
            "reset" => {
                usage.reset();
                cache.invalidate();
                let reloaded = Library::load(&config.library_path);
                report_diagnostics(&reloaded);
                library = Arc::new(reloaded.library);
                println!("{} Session state cleared.", "Reset:".green());
            }
            statement => {
                run_interaction(config, &mut usage, &cache, &library, statement, verbose)?
            }
        }
    }

    Ok(())
}

/// The single-submission flow: usage guard, truncation, index (cached),
/// match, hint, generation, display. At most two blocking external calls.
pub(crate) fn run_interaction(
    config: &Config,
    usage: &mut UsageGuard,
    cache: &IndexCache,
    library: &Arc<Library>,
    statement: &str,
    verbose: bool,
) -> Result<()> {
    if statement.trim().is_empty() {
        println!("{} Please enter a statement to unpack.", "Note:".yellow());
        return Ok(());
    }

    // Checked before any external call
    if !usage.try_acquire() {
        println!(
            "{} Daily limit reached. Please try again tomorrow.",
            "Limit:".red()
        );
        return Ok(());
    }

    let input = truncate_input(statement);

    let rt = runtime()?;
    let embedder = EmbeddingProvider::from_env();

    let fingerprint = library.fingerprint();
    let index = cache.get_or_build(&fingerprint, || {
        rt.block_on(LibraryIndex::build(Arc::clone(library), &embedder, None))
    });

    let client = LlmClient::new(&config.llm, config.temperature);

    let output = rt.block_on(async {
        let matched = matcher::find_match(&index, &embedder, &input, config.threshold).await;
        let hint = hint::compose(matched.as_ref());

        if verbose {
            match &matched {
                Some(m) => eprintln!(
                    "{} {} (score {:.2})",
                    "Match:".cyan(),
                    hint.label,
                    m.score
                ),
                None => eprintln!("{} {}", "Match:".cyan(), hint.label),
            }
        }

        match client
            .complete(SYSTEM_REFLECTOR, &hint.directive, &input)
            .await
        {
            Ok(text) => text,
            // Terminal step of the interaction: the failure is the response
            Err(e) => format!("Error: {}", e),
        }
    });

    println!("{}", output);
    println!(
        "{}",
        format!(
            "Requests this session: {}/{}",
            usage.used(),
            usage.limit()
        )
        .dimmed()
    );

    Ok(())
}
