//! Guardrails decision
//!
//! The single outcome of one evaluation, with the matches behind it and the
//! ruleset version and hash it was computed against.

use chrono::{DateTime, NaiveDate, Utc};
use diet_guard_types::{ConstraintType, ContentHash, MealSlot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::context::EvaluationMode;
use crate::rule::RuleSource;

/// Three-way outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Allowed,
    Warned,
    Blocked,
}

impl Outcome {
    /// `Blocked` if any strictness is hard, `Warned` if any is soft,
    /// otherwise `Allowed`.
    pub fn from_strictness(strictness: impl IntoIterator<Item = ConstraintType>) -> Self {
        strictness.into_iter().fold(Outcome::Allowed, |acc, s| {
            acc.max(match s {
                ConstraintType::Hard => Outcome::Blocked,
                ConstraintType::Soft => Outcome::Warned,
            })
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allowed => "allowed",
            Outcome::Warned => "warned",
            Outcome::Blocked => "blocked",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    /// Raw matches before override suppression
    pub matches: usize,
    /// Matches that survived suppression and count toward the outcome
    pub applied: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Ingredient,
    Meal,
    Week,
}

/// One rule matching one target
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub rule_id: String,
    pub rule_code: String,
    pub label: String,
    pub strictness: ConstraintType,
    pub priority: u32,
    pub source: RuleSource,
    pub target: TargetKind,
    pub date: Option<NaiveDate>,
    pub slot: Option<MealSlot>,
    pub meal_id: Option<String>,
    /// Matched term, or a description of the violated bound
    pub detail: String,
    /// Override that suppressed this match
    pub suppressed_by: Option<String>,
}

impl RuleMatch {
    pub fn is_applied(&self) -> bool {
        self.suppressed_by.is_none()
    }

    pub fn is_hard(&self) -> bool {
        self.strictness.is_hard()
    }
}

/// Per-ingredient view: the highest-priority rule's metadata, plus whether
/// any matching rule was hard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlaggedIngredient {
    pub date: NaiveDate,
    pub slot: MealSlot,
    pub meal_id: String,
    pub text: String,
    pub rule_id: String,
    pub rule_code: String,
    pub label: String,
    pub blocking: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardrailsDecision {
    /// `outcome != Blocked`
    pub ok: bool,
    pub outcome: Outcome,
    /// Deduplicated, highest-priority rule first
    pub reason_codes: Vec<String>,
    pub summary: String,
    pub ruleset_version: u64,
    pub content_hash: ContentHash,
    pub counts: MatchCounts,
    /// Every raw match, suppressed ones included
    pub matches: Vec<RuleMatch>,
    pub flagged_ingredients: Vec<FlaggedIngredient>,
    /// Day with the most hard matches, then most matches, then earliest
    pub worst_day: Option<NaiveDate>,
    pub mode: EvaluationMode,
    pub evaluated_at: DateTime<Utc>,
}

impl GuardrailsDecision {
    pub fn is_blocked(&self) -> bool {
        self.outcome == Outcome::Blocked
    }

    pub fn applied_matches(&self) -> impl Iterator<Item = &RuleMatch> {
        self.matches.iter().filter(|m| m.is_applied())
    }

    pub fn has_reason(&self, code: &str) -> bool {
        self.reason_codes.iter().any(|c| c == code)
    }
}

/// Reason codes of applied matches in priority order, first occurrence wins.
pub(crate) fn reason_codes(matches: &[RuleMatch]) -> Vec<String> {
    let mut applied: Vec<&RuleMatch> = matches.iter().filter(|m| m.is_applied()).collect();
    applied.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.rule_id.cmp(&b.rule_id)));
    let mut codes: Vec<String> = Vec::new();
    for m in applied {
        if !codes.contains(&m.rule_code) {
            codes.push(m.rule_code.clone());
        }
    }
    codes
}

pub(crate) fn worst_day(matches: &[RuleMatch]) -> Option<NaiveDate> {
    let mut per_day: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for m in matches.iter().filter(|m| m.is_applied()) {
        if let Some(date) = m.date {
            let entry = per_day.entry(date).or_default();
            if m.is_hard() {
                entry.0 += 1;
            }
            entry.1 += 1;
        }
    }
    // Ties go to the earliest date.
    per_day
        .into_iter()
        .max_by(|(da, a), (db, b)| a.cmp(b).then_with(|| db.cmp(da)))
        .map(|(date, _)| date)
}

pub(crate) fn summary(outcome: Outcome, matches: &[RuleMatch]) -> String {
    let applied: Vec<&RuleMatch> = matches.iter().filter(|m| m.is_applied()).collect();
    let suppressed = matches.len() - applied.len();
    let hard = applied.iter().filter(|m| m.is_hard()).count();
    let soft = applied.len() - hard;

    let top = applied
        .iter()
        .filter(|m| outcome != Outcome::Blocked || m.is_hard())
        .max_by(|a, b| a.priority.cmp(&b.priority).then_with(|| b.rule_id.cmp(&a.rule_id)));

    let mut text = match (outcome, top) {
        (Outcome::Allowed, _) | (_, None) => "No guardrail violations".to_string(),
        (Outcome::Blocked, Some(top)) => format!(
            "Blocked by {} hard violation{}{}: {}",
            hard,
            plural(hard),
            if soft > 0 { format!(" and {soft} warning{}", plural(soft)) } else { String::new() },
            describe(top)
        ),
        (Outcome::Warned, Some(top)) => format!(
            "{} warning{}: {}",
            soft,
            plural(soft),
            describe(top)
        ),
    };
    if suppressed > 0 {
        text.push_str(&format!(" ({suppressed} suppressed by overrides)"));
    }
    text
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn describe(m: &RuleMatch) -> String {
    let mut out = format!("{} ({})", m.label, m.detail);
    match (m.date, m.slot) {
        (Some(date), Some(slot)) => out.push_str(&format!(" on {date} at {slot}")),
        (Some(date), None) => out.push_str(&format!(" on {date}")),
        _ => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rule_id: &str, code: &str, priority: u32, strictness: ConstraintType, day: Option<u32>) -> RuleMatch {
        RuleMatch {
            rule_id: rule_id.into(),
            rule_code: code.into(),
            label: code.to_lowercase(),
            strictness,
            priority,
            source: RuleSource::Diet,
            target: TargetKind::Ingredient,
            date: day.map(|d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap()),
            slot: None,
            meal_id: None,
            detail: "x".into(),
            suppressed_by: None,
        }
    }

    #[test]
    fn test_outcome_from_strictness() {
        use ConstraintType::*;
        assert_eq!(Outcome::from_strictness(std::iter::empty()), Outcome::Allowed);
        assert_eq!(Outcome::from_strictness([Soft]), Outcome::Warned);
        assert_eq!(Outcome::from_strictness([Soft, Hard, Soft]), Outcome::Blocked);
    }

    #[test]
    fn test_reason_codes_dedup_in_priority_order() {
        let matches = vec![
            m("a", "DISLIKED_INGREDIENT", 500, ConstraintType::Soft, None),
            m("b", "HOUSEHOLD_AVOID", 1000, ConstraintType::Hard, None),
            m("c", "DISLIKED_INGREDIENT", 500, ConstraintType::Soft, None),
        ];
        assert_eq!(reason_codes(&matches), vec!["HOUSEHOLD_AVOID", "DISLIKED_INGREDIENT"]);
    }

    #[test]
    fn test_suppressed_matches_have_no_reason() {
        let mut suppressed = m("a", "FORBIDDEN_CATEGORY_STARCHY_VEGETABLES", 800, ConstraintType::Hard, Some(2));
        suppressed.suppressed_by = Some("ovr-1".into());
        assert!(reason_codes(&[suppressed.clone()]).is_empty());
        assert_eq!(worst_day(&[suppressed]), None);
    }

    #[test]
    fn test_worst_day_prefers_hard_then_count_then_earliest() {
        let soft = ConstraintType::Soft;
        let hard = ConstraintType::Hard;
        let matches = vec![
            m("a", "X", 1, soft, Some(2)),
            m("b", "X", 1, soft, Some(2)),
            m("c", "X", 1, hard, Some(4)),
        ];
        assert_eq!(worst_day(&matches), NaiveDate::from_ymd_opt(2026, 3, 4));

        let tied = vec![m("a", "X", 1, soft, Some(5)), m("b", "X", 1, soft, Some(3))];
        assert_eq!(worst_day(&tied), NaiveDate::from_ymd_opt(2026, 3, 3));
    }

    #[test]
    fn test_summary_names_top_hard_match() {
        let matches = vec![
            m("a", "DISLIKED_INGREDIENT", 500, ConstraintType::Soft, Some(2)),
            m("b", "FORBIDDEN_CATEGORY_GRAINS", 800, ConstraintType::Hard, Some(2)),
        ];
        let text = summary(Outcome::Blocked, &matches);
        assert!(text.starts_with("Blocked by 1 hard violation and 1 warning"));
        assert!(text.contains("forbidden_category_grains"));
        assert_eq!(summary(Outcome::Allowed, &[]), "No guardrail violations");
    }
}
