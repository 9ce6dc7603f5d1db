//! False-positive exclusions
//!
//! An override names one forbidden term and the texts in which a match on
//! that term is not a real violation. It can only remove matches, never add
//! them, and never touches matches on any other term.

use diet_guard_rules::normalize_term;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeOverride {
    pub id: String,
    pub forbidden_term: String,
    pub exclude_if_contains: Vec<String>,
    pub active: bool,
}

impl ExcludeOverride {
    pub fn new<I, S>(id: impl Into<String>, forbidden_term: impl Into<String>, exclude_if_contains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            forbidden_term: normalize_term(&forbidden_term.into()),
            exclude_if_contains: exclude_if_contains
                .into_iter()
                .map(|s| normalize_term(&s.into()))
                .collect(),
            active: true,
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Whether this override suppresses a match on `matched_term` found in
    /// the ingredient `text`.
    pub fn suppresses(&self, matched_term: &str, text: &str) -> bool {
        if !self.active || normalize_term(&self.forbidden_term) != normalize_term(matched_term) {
            return false;
        }
        let text = normalize_term(text);
        self.exclude_if_contains
            .iter()
            .map(|e| normalize_term(e))
            .any(|e| !e.is_empty() && text.contains(&e))
    }
}

/// First active override that suppresses the match, if any.
pub fn find_suppressing<'a>(
    overrides: impl IntoIterator<Item = &'a ExcludeOverride>,
    matched_term: &str,
    text: &str,
) -> Option<&'a ExcludeOverride> {
    overrides
        .into_iter()
        .find(|o| o.suppresses(matched_term, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweet_potato() -> ExcludeOverride {
        ExcludeOverride::new("ovr-1", "aardappel", ["zoete aardappel"])
    }

    #[test]
    fn suppresses_only_its_own_term() {
        let o = sweet_potato();
        assert!(o.suppresses("aardappel", "gebakken zoete aardappel"));
        assert!(!o.suppresses("bloem", "gebakken zoete aardappel met bloem"));
    }

    #[test]
    fn needs_exclusion_text() {
        let o = sweet_potato();
        assert!(!o.suppresses("aardappel", "gekookte aardappel"));
    }

    #[test]
    fn term_comparison_ignores_case() {
        let o = sweet_potato();
        assert!(o.suppresses("Aardappel", "Zoete  Aardappel puree"));
    }

    #[test]
    fn inactive_never_suppresses() {
        let o = sweet_potato().deactivated();
        assert!(!o.suppresses("aardappel", "zoete aardappel"));
    }

    #[test]
    fn blank_exclusion_is_ignored() {
        let o = ExcludeOverride::new("ovr-2", "rijst", [" "]);
        assert!(!o.suppresses("rijst", "witte rijst"));
    }
}
