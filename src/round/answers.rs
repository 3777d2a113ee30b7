use std::collections::HashSet;

use crate::catalog::Item;

/// Accepted spellings of a round's answer
///
/// Both the canonical and the localized display name are accepted. Matching
/// ignores case and surrounding whitespace, nothing else: plurals and typos
/// are wrong answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    forms: HashSet<String>,
}

impl AnswerSet {
    pub fn for_item(item: &Item) -> Self {
        let forms = [&item.display_name, &item.localized_display_name]
            .into_iter()
            .map(|name| normalize_guess(name))
            .filter(|form| !form.is_empty())
            .collect();

        Self { forms }
    }

    pub fn matches(&self, guess: &str) -> bool {
        self.forms.contains(&normalize_guess(guess))
    }

    #[cfg(test)]
    pub(crate) fn forms(&self) -> impl Iterator<Item = &str> {
        self.forms.iter().map(String::as_str)
    }
}

pub fn normalize_guess(raw: &str) -> String {
    raw.trim().to_lowercase()
}
