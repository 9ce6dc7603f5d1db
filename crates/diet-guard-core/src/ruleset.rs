//! Guard rule set
//!
//! The evaluation-ready union of compiled diet rules, admin rules and
//! household rules, with the admin table version and a content hash.

use diet_guard_types::{ContentHash, DietKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::context::EvaluationMode;
use crate::error::{CoreError, Result};
use crate::rule::{GuardRule, RuleCheck};

/// Rules ready for evaluation.
///
/// Rules are kept ordered by priority (highest first), then id. The content
/// hash covers the rules only and does not depend on insertion order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardRuleSet {
    pub diet_key: DietKey,
    rules: Vec<GuardRule>,
    /// Admin rule table version
    pub version: u64,
    pub content_hash: ContentHash,
}

impl GuardRuleSet {
    pub fn new(diet_key: DietKey, rules: Vec<GuardRule>, version: u64) -> Result<Self> {
        let mut set = Self {
            diet_key,
            rules,
            version,
            content_hash: ContentHash::zero(),
        };
        set.reindex()?;
        Ok(set)
    }

    /// Add rules from another source. Additive only: existing rules are
    /// never replaced, and a clashing id is an error.
    pub fn merge(mut self, extra: impl IntoIterator<Item = GuardRule>) -> Result<Self> {
        self.rules.extend(extra);
        self.reindex()?;
        Ok(self)
    }

    pub fn rules(&self) -> &[GuardRule] {
        &self.rules
    }

    /// Rules in evaluation order that apply in `mode`
    pub fn rules_for(&self, mode: EvaluationMode) -> impl Iterator<Item = &GuardRule> {
        self.rules.iter().filter(move |r| r.applies_in(mode))
    }

    pub fn rule(&self, id: &str) -> Option<&GuardRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn reindex(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(CoreError::DuplicateRuleId(rule.id.clone()));
            }
            if let RuleCheck::Ingredient(matcher) = &rule.check {
                if matcher.is_empty() {
                    return Err(CoreError::InvalidRule {
                        id: rule.id.clone(),
                        reason: "ingredient rule has no terms or identifiers".into(),
                    });
                }
            }
        }
        self.rules
            .sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        self.content_hash = content_hash(&self.rules)?;
        Ok(())
    }
}

/// BLAKE3 over the canonical JSON of the rules ordered by id.
pub fn content_hash(rules: &[GuardRule]) -> Result<ContentHash> {
    let mut by_id: Vec<&GuardRule> = rules.iter().collect();
    by_id.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(ContentHash::of_json(&by_id)?)
}
