use std::sync::{Arc, Mutex};

use colored::Colorize;
use indicatif::ProgressBar;

use crate::embeddings::EmbeddingProvider;
use crate::library::{Entry, Library, Principle};

/// Which collection an indexed item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Entry,
    Principle,
}

/// A borrowed view of the library item behind an index slot or a match.
#[derive(Debug, Clone, Copy)]
pub enum LibraryItem<'a> {
    Entry(&'a Entry),
    Principle(&'a Principle),
}

/// One library item with its embedding. Holds an index into the library
/// snapshot rather than a copy; the snapshot is never mutated.
#[derive(Debug, Clone)]
pub struct IndexedItem {
    pub kind: ItemKind,
    pub item_idx: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Embeddings for one library snapshot, in declared order: entries first,
/// then principles, each in file order.
pub struct LibraryIndex {
    pub library: Arc<Library>,
    pub items: Vec<IndexedItem>,
    /// Items dropped during the build: empty composite text or a failed
    /// embedding request.
    pub skipped: usize,
}

impl LibraryIndex {
    /// Composite texts in index order. Items that trim to empty are omitted
    /// here so no embedding is ever requested for them.
    pub fn composite_texts(library: &Library) -> Vec<(ItemKind, usize, String)> {
        let mut texts = Vec::new();

        for (i, entry) in library.entries.iter().enumerate() {
            let text = entry_text(entry);
            if !text.is_empty() {
                texts.push((ItemKind::Entry, i, text));
            }
        }
        for (i, principle) in library.general_principles.iter().enumerate() {
            let text = principle_text(principle);
            if !text.is_empty() {
                texts.push((ItemKind::Principle, i, text));
            }
        }

        texts
    }

    /// Embed every library item. Never fails as a whole: the batch request is
    /// the fast path, and if it errors each item is retried individually with
    /// failures skipped under a warning.
    pub async fn build(
        library: Arc<Library>,
        provider: &EmbeddingProvider,
        progress: Option<&ProgressBar>,
    ) -> Self {
        let texts = Self::composite_texts(&library);
        let total_items = library.entries.len() + library.general_principles.len();
        let mut skipped = total_items - texts.len();
        let mut items = Vec::with_capacity(texts.len());

        // Nothing to embed: no request leaves the process
        if texts.is_empty() {
            return LibraryIndex {
                library,
                items,
                skipped,
            };
        }

        if let Some(pb) = progress {
            pb.set_length(texts.len() as u64);
        }

        let batch: Vec<String> = texts.iter().map(|(_, _, t)| t.clone()).collect();
        match provider.embed_batch(&batch).await {
            Ok(embeddings) if embeddings.len() == texts.len() => {
                for ((kind, item_idx, text), embedding) in texts.into_iter().zip(embeddings) {
                    items.push(IndexedItem {
                        kind,
                        item_idx,
                        text,
                        embedding,
                    });
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                }
            }
            _ => {
                // Per-item fallback: one bad item must not empty the index
                for (kind, item_idx, text) in texts {
                    match provider.embed(&text).await {
                        Ok(embedding) => items.push(IndexedItem {
                            kind,
                            item_idx,
                            text,
                            embedding,
                        }),
                        Err(e) => {
                            eprintln!(
                                "{} embedding failed, item skipped: {}",
                                "Warning:".yellow(),
                                e
                            );
                            skipped += 1;
                        }
                    }
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        LibraryIndex {
            library,
            items,
            skipped,
        }
    }

    /// Resolve an index slot back to its library item.
    pub fn item(&self, indexed: &IndexedItem) -> LibraryItem<'_> {
        match indexed.kind {
            ItemKind::Entry => LibraryItem::Entry(&self.library.entries[indexed.item_idx]),
            ItemKind::Principle => {
                LibraryItem::Principle(&self.library.general_principles[indexed.item_idx])
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

fn entry_text(entry: &Entry) -> String {
    let mut parts = vec![entry.topic.clone()];
    parts.push(entry.tags.join(" "));
    parts.push(entry.sample_claim.join(" "));
    parts.retain(|p| !p.trim().is_empty());
    parts.join(" ").trim().to_string()
}

fn principle_text(principle: &Principle) -> String {
    format!("{} {}", principle.name, principle.description)
        .trim()
        .to_string()
}

/// Memoizes the index per library snapshot, keyed by content fingerprint.
/// The lock is held across a build so concurrent first access runs exactly
/// one build; repeated calls with an unchanged library return the cached
/// index without any embedding request.
#[derive(Default)]
pub struct IndexCache {
    slot: Mutex<Option<(String, Arc<LibraryIndex>)>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build<F>(&self, fingerprint: &str, build: F) -> Arc<LibraryIndex>
    where
        F: FnOnce() -> LibraryIndex,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());

        if let Some((key, index)) = slot.as_ref() {
            if key == fingerprint {
                return Arc::clone(index);
            }
        }

        let index = Arc::new(build());
        *slot = Some((fingerprint.to_string(), Arc::clone(&index)));
        index
    }

    /// Drop the cached index so the next access rebuilds.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}
