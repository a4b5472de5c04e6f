use crate::index::LibraryItem;
use crate::matcher::MatchResult;

/// Grounding directive for one generation call. The label states whether the
/// response is library-based or inferred; the directive is advisory context
/// for the model and is never shown verbatim to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Hint {
    pub label: String,
    pub directive: String,
}

/// Turn a match result (or its absence) into the grounding directive.
pub fn compose(result: Option<&MatchResult<'_>>) -> Hint {
    let Some(result) = result else {
        let label = "Inferred (no close library match)".to_string();
        let directive = format!("{}: No obvious library match; proceed normally.", label);
        return Hint { label, directive };
    };

    match result.item {
        LibraryItem::Entry(entry) => {
            let label = format!("Library-based ({})", entry.topic);
            let questions = entry
                .questions
                .iter()
                .take(2)
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            let reflection = entry
                .reflection
                .iter()
                .take(2)
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            let directive = format!(
                "{}: Use the entry's spirit. Paraphrase briefly, then ask one or two \
                 open-ended questions in this spirit: {}. \
                 (Background for you, not to quote: {})",
                label, questions, reflection
            );
            Hint { label, directive }
        }
        LibraryItem::Principle(principle) => {
            let label = format!("Library-based (principle: {})", principle.name);
            let directive = format!(
                "{}: Ground the reflection in this principle's description. \
                 (Background for you, not to quote: {})",
                label, principle.description
            );
            Hint { label, directive }
        }
    }
}
