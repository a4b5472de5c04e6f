use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// A named general value or assumption (fairness, autonomy, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Principle {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

/// A topic-specific library item with tags, sample claims, reflection text
/// and probing questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    #[serde(deserialize_with = "lenient_string")]
    pub topic: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
    /// Accepts a bare string or a list in the source document.
    #[serde(deserialize_with = "lenient_strings")]
    pub sample_claim: Vec<String>,
    /// Accepts a bare string or a list in the source document.
    #[serde(deserialize_with = "lenient_strings")]
    pub reflection: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub questions: Vec<String>,
}

/// The curated collection used to ground responses. Read-only after load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Library {
    pub general_principles: Vec<Principle>,
    pub entries: Vec<Entry>,
}

/// Result of loading a library file. Loading never fails outright: every
/// problem degrades to empty collections plus a diagnostic, since a partially
/// valid library beats none at all.
#[derive(Debug, Default)]
pub struct LoadedLibrary {
    pub library: Library,
    pub diagnostics: Vec<String>,
}

impl Library {
    /// Load and validate a library file.
    ///
    /// Missing file, malformed JSON (reported with line and column) and
    /// wrong-typed fields all degrade to empty collections; malformed
    /// elements are skipped individually so the rest of the file survives.
    pub fn load(path: &Path) -> LoadedLibrary {
        let mut loaded = LoadedLibrary::default();

        if !path.exists() {
            loaded
                .diagnostics
                .push(format!("library file not found at: {}", path.display()));
            return loaded;
        }

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                loaded
                    .diagnostics
                    .push(format!("error reading {}: {}", path.display(), e));
                return loaded;
            }
        };

        Self::parse(&raw, &mut loaded.diagnostics, &mut loaded.library);
        loaded
    }

    fn parse(raw: &str, diagnostics: &mut Vec<String>, library: &mut Library) {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                diagnostics.push(format!(
                    "library is not valid JSON (line {}, column {}): {}",
                    e.line(),
                    e.column(),
                    e
                ));
                return;
            }
        };

        let serde_json::Value::Object(sections) = value else {
            diagnostics.push("library root must be a JSON object".to_string());
            return;
        };

        library.general_principles =
            collect_section(&sections, "general_principles", diagnostics);
        library.entries = collect_section(&sections, "entries", diagnostics);
    }

    /// SHA-256 over the canonical JSON form. Keys the embedding-index cache:
    /// a reloaded-but-unchanged library maps to the same index.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn is_empty(&self) -> bool {
        self.general_principles.is_empty() && self.entries.is_empty()
    }
}

/// Pull one top-level section out as a typed vector, skipping malformed
/// elements with a diagnostic each.
fn collect_section<T: serde::de::DeserializeOwned>(
    sections: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    diagnostics: &mut Vec<String>,
) -> Vec<T> {
    let Some(value) = sections.get(key) else {
        return Vec::new();
    };

    let serde_json::Value::Array(elements) = value else {
        diagnostics.push(format!("'{}' is not a list; section ignored", key));
        return Vec::new();
    };

    let mut items = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        match serde_json::from_value::<T>(element.clone()) {
            Ok(item) => items.push(item),
            Err(e) => diagnostics.push(format!("{}[{}] skipped: {}", key, i, e)),
        }
    }
    items
}

/// Coerce a value to a string: non-strings degrade to empty.
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// Coerce a value to a list of strings: a bare string becomes a one-element
/// list, non-string elements are dropped, anything else degrades to empty.
fn lenient_strings<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<String>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(match value {
        serde_json::Value::String(s) => vec![s],
        serde_json::Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_str(raw: &str) -> LoadedLibrary {
        let mut loaded = LoadedLibrary::default();
        Library::parse(raw, &mut loaded.diagnostics, &mut loaded.library);
        loaded
    }

    // ── degradation paths ───────────────────────────────────────────────────

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let loaded = Library::load(Path::new("/nonexistent/library.json"));
        assert!(loaded.library.is_empty());
        assert_eq!(loaded.diagnostics.len(), 1);
        assert!(loaded.diagnostics[0].contains("not found"));
    }

    #[test]
    fn test_malformed_json_reports_location() {
        let loaded = load_str("{ \"entries\": [ }");
        assert!(loaded.library.is_empty());
        assert!(loaded.diagnostics[0].contains("line 1"));
        assert!(loaded.diagnostics[0].contains("column"));
    }

    #[test]
    fn test_non_object_root_degrades() {
        let loaded = load_str("[1, 2, 3]");
        assert!(loaded.library.is_empty());
        assert!(loaded.diagnostics[0].contains("object"));
    }

    #[test]
    fn test_wrong_typed_section_ignored() {
        let loaded = load_str(r#"{"entries": "oops", "general_principles": []}"#);
        assert!(loaded.library.entries.is_empty());
        assert_eq!(loaded.diagnostics.len(), 1);
    }

    #[test]
    fn test_malformed_element_skipped_rest_survive() {
        let loaded = load_str(
            r#"{"entries": [
                {"topic": "fairness", "tags": ["fairness"]},
                42,
                {"topic": "autonomy"}
            ]}"#,
        );
        assert_eq!(loaded.library.entries.len(), 2);
        assert_eq!(loaded.library.entries[0].topic, "fairness");
        assert_eq!(loaded.library.entries[1].topic, "autonomy");
        assert_eq!(loaded.diagnostics.len(), 1);
        assert!(loaded.diagnostics[0].contains("entries[1]"));
    }

    // ── lenient coercion ────────────────────────────────────────────────────

    #[test]
    fn test_bare_string_sample_claim_becomes_list() {
        let loaded = load_str(
            r#"{"entries": [{"topic": "equity", "sample_claim": "everyone deserves the same"}]}"#,
        );
        assert_eq!(
            loaded.library.entries[0].sample_claim,
            vec!["everyone deserves the same"]
        );
    }

    #[test]
    fn test_wrong_typed_fields_degrade_to_empty() {
        let loaded = load_str(
            r#"{"entries": [{"topic": 7, "tags": 99, "questions": [1, "valid?"]}]}"#,
        );
        let entry = &loaded.library.entries[0];
        assert_eq!(entry.topic, "");
        assert!(entry.tags.is_empty());
        assert_eq!(entry.questions, vec!["valid?"]);
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let loaded = load_str(r#"{"general_principles": [{"name": "humility"}]}"#);
        let p = &loaded.library.general_principles[0];
        assert_eq!(p.name, "humility");
        assert_eq!(p.description, "");
    }

    #[test]
    fn test_well_formed_library_loads_fully() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        write!(
            tmp.as_file(),
            r#"{{
                "general_principles": [{{"name": "fairness", "description": "equal treatment"}}],
                "entries": [{{
                    "topic": "speech",
                    "tags": ["speech", "expression"],
                    "sample_claim": ["speech should be free"],
                    "reflection": "speech trades off against harm",
                    "questions": ["What harms count?"]
                }}]
            }}"#
        )
        .unwrap();

        let loaded = Library::load(tmp.path());
        assert!(loaded.diagnostics.is_empty());
        assert_eq!(loaded.library.general_principles.len(), 1);
        assert_eq!(loaded.library.entries.len(), 1);
        assert_eq!(
            loaded.library.entries[0].reflection,
            vec!["speech trades off against harm"]
        );
    }

    // ── fingerprint ─────────────────────────────────────────────────────────

    #[test]
    fn test_fingerprint_stable_for_same_content() {
        let a = load_str(r#"{"entries": [{"topic": "fairness"}]}"#).library;
        let b = load_str(r#"{"entries": [{"topic": "fairness"}]}"#).library;
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = load_str(r#"{"entries": [{"topic": "fairness"}]}"#).library;
        let b = load_str(r#"{"entries": [{"topic": "autonomy"}]}"#).library;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
