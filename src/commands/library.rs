use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::commands::unpack::runtime;
use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::hint;
use crate::index::{LibraryIndex, LibraryItem};
use crate::library::Library;
use crate::matcher;

/// Inspect the library file: parse diagnostics and section counts.
pub fn cmd_library(library_path: &Path, verbose: bool) -> Result<()> {
    println!("{} {}", "Library:".green().bold(), library_path.display());

    if verbose {
        if let Ok(raw) = std::fs::read_to_string(library_path) {
            let peek: String = raw.chars().take(300).collect();
            println!("{}", "First 300 chars:".dimmed());
            println!("{}", peek.dimmed());
        }
    }

    let loaded = Library::load(library_path);
    for diagnostic in &loaded.diagnostics {
        println!("{} {}", "Warning:".yellow(), diagnostic);
    }

    println!("  principles: {}", loaded.library.general_principles.len());
    println!("  entries: {}", loaded.library.entries.len());

    if verbose {
        for entry in &loaded.library.entries {
            println!(
                "  {} {} [{}]",
                ">".green(),
                entry.topic,
                entry.tags.join(", ").cyan()
            );
        }
        for principle in &loaded.library.general_principles {
            println!("  {} principle: {}", ">".green(), principle.name);
        }
    }

    Ok(())
}

/// Build the embedding index eagerly and print its stats.
pub fn cmd_index(library_path: &Path, _verbose: bool) -> Result<()> {
    let loaded = Library::load(library_path);
    for diagnostic in &loaded.diagnostics {
        println!("{} {}", "Warning:".yellow(), diagnostic);
    }
    let library = Arc::new(loaded.library);

    if library.is_empty() {
        println!("{} Library is empty; nothing to index.", "Index:".yellow());
        return Ok(());
    }

    let rt = runtime()?;
    let provider = EmbeddingProvider::from_env();

    println!(
        "{} Building embedding index with {}...",
        "Indexing".green().bold(),
        provider.model_id()
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let index = rt.block_on(LibraryIndex::build(
        Arc::clone(&library),
        &provider,
        Some(&pb),
    ));

    println!("{} Index built:", "Done!".green().bold());
    println!("  items indexed: {}", index.len());
    println!("  items skipped: {}", index.skipped);
    if let Some(first) = index.items.first() {
        println!("  dimension: {}", first.embedding.len());
    }
    println!("  fingerprint: {}", &library.fingerprint()[..16]);

    Ok(())
}

/// Run only the matcher and show the best item with its score, the threshold
/// verdict, and the label the hint composer would produce.
pub fn cmd_match(library_path: &Path, query: &str, threshold: f32, verbose: bool) -> Result<()> {
    if query.trim().is_empty() {
        println!("{} Query is empty; nothing to match.", "Match:".yellow());
        return Ok(());
    }

    let loaded = Library::load(library_path);
    for diagnostic in &loaded.diagnostics {
        eprintln!("{} {}", "Warning:".yellow(), diagnostic);
    }
    let library = Arc::new(loaded.library);

    if library.is_empty() {
        println!("{} Library is empty; nothing to match.", "Match:".yellow());
        return Ok(());
    }

    let rt = runtime()?;
    let provider = EmbeddingProvider::from_env();

    let index = rt.block_on(LibraryIndex::build(Arc::clone(&library), &provider, None));
    if index.is_empty() {
        println!(
            "{} No library items could be indexed; nothing to match.",
            "Match:".yellow()
        );
        return Ok(());
    }

    let query_embedding = match rt.block_on(provider.embed(query)) {
        Ok(embedding) => embedding,
        Err(e) => {
            println!("{} query embedding failed: {}", "Error:".red(), e);
            return Ok(());
        }
    };

    // Rank with an always-accepting floor so the best candidate is shown
    // even when it falls short of the configured threshold
    let Some(best) = matcher::best_match(&index, &query_embedding, -1.0) else {
        println!("{} No candidates scored.", "Match:".yellow());
        return Ok(());
    };

    let name = match best.item {
        LibraryItem::Entry(entry) => entry.topic.as_str(),
        LibraryItem::Principle(principle) => principle.name.as_str(),
    };

    let accepted = best.score >= threshold;
    let verdict = if accepted {
        "accepted".green()
    } else {
        "below threshold".yellow()
    };
    println!(
        "{} {} (score {:.3}, threshold {:.2}) [{}]",
        "Best:".green().bold(),
        name,
        best.score,
        threshold,
        verdict
    );

    let label = if accepted {
        hint::compose(Some(&best)).label
    } else {
        hint::compose(None).label
    };
    println!("  label: {}", label);

    if verbose {
        println!("  indexed items: {}", index.len());
        println!("  embedding model: {}", provider.model_id());
    }

    Ok(())
}
